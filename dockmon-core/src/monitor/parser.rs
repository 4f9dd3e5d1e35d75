//! Parsers for the two Docker report formats
//!
//! Both transforms are pure and stateless. A malformed line is skipped,
//! not fatal, and blank input yields an empty mapping: the remote side
//! is an uncontrolled text producer, so parsing is best-effort.

use std::collections::HashMap;

/// Counts containers grouped by state, one `<count> <state>` line each
pub const CONTAINER_STATES_COMMAND: &str = "docker ps -a --format '{{.State}}' | sort | uniq -c";

/// Samples per-container CPU/memory, one `<id>: <cpu> <mem>` line each
pub const RESOURCE_USAGE_COMMAND: &str =
    "docker stats --no-stream --format \"{{.Container}}: {{.CPUPerc}} {{.MemPerc}}\"";

/// Mapping from container state-word to container count
pub type ContainerStateCounts = HashMap<String, u64>;

/// Mapping from container id to a formatted "CPU/Mem" string
pub type ContainerResourceSample = HashMap<String, String>;

/// Parses `uniq -c` style output: lines of `<count> <state-word>`.
///
/// Lines without exactly two whitespace-separated fields are skipped.
/// An unparseable count defaults that line to zero rather than
/// aborting. The last occurrence of a repeated state-word wins.
#[must_use]
pub fn parse_container_states(input: &str) -> ContainerStateCounts {
    let mut states = ContainerStateCounts::new();
    for line in input.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if let [count, state] = fields[..] {
            states.insert(state.to_string(), count.parse().unwrap_or(0));
        }
    }
    states
}

/// Parses `docker stats` output: lines of `<id>: <cpu> <mem>`.
///
/// Lines with fewer than three whitespace-separated tokens are skipped.
/// The trailing colon on the id token is stripped; the two fields are
/// passed through verbatim, percent signs included.
#[must_use]
pub fn parse_resource_usage(input: &str) -> ContainerResourceSample {
    let mut usage = ContainerResourceSample::new();
    for line in input.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if let [id, cpu, mem, ..] = fields[..] {
            let id = id.strip_suffix(':').unwrap_or(id);
            usage.insert(id.to_string(), format!("CPU: {cpu}, Mem: {mem}"));
        }
    }
    usage
}
