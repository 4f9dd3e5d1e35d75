//! Remote container monitoring: inspection commands, parsing,
//! formatting, and the poll cycle
//!
//! The remote side is a best-effort text producer: the two fixed Docker
//! command lines are sent verbatim and only their documented plain-text
//! shapes are relied on. Malformed lines are dropped, never fatal.

pub mod parser;
pub mod poll;
pub mod status;

pub use parser::{
    CONTAINER_STATES_COMMAND, ContainerResourceSample, ContainerStateCounts,
    RESOURCE_USAGE_COMMAND, parse_container_states, parse_resource_usage,
};
pub use poll::{PollError, poll_once};
pub use status::format_status;
