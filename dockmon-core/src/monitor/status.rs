//! One-line status rendering
//!
//! The preamble always lists the same five named states; states absent
//! from the counts render as zero. Sample fragments are sorted by
//! container id so consecutive polls render identically.

use std::fmt::Write;

use super::parser::{ContainerResourceSample, ContainerStateCounts};

/// Container id prefix length shown in sample fragments
const ID_PREFIX_LEN: usize = 6;

/// Renders the one-line health summary. Never fails; missing states
/// default to zero and an empty sample map yields no fragments.
#[must_use]
pub fn format_status(states: &ContainerStateCounts, usage: &ContainerResourceSample) -> String {
    let count = |state: &str| states.get(state).copied().unwrap_or(0);
    let mut output = format!(
        "\u{1f433} U: {}, D: {}, S: {}, F: {}, X: {} | ",
        count("running"),
        count("exited"),
        count("stopped"),
        count("failed"),
        count("dead"),
    );

    let mut samples: Vec<(&str, &str)> = usage
        .iter()
        .map(|(id, resources)| (id.as_str(), resources.as_str()))
        .collect();
    samples.sort_unstable_by_key(|&(id, _)| id);

    for (id, resources) in samples {
        let short: String = id.chars().take(ID_PREFIX_LEN).collect();
        let _ = write!(output, "{short} ({resources}) ");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preamble_with_no_samples() {
        let mut states = ContainerStateCounts::new();
        states.insert("running".to_string(), 2);
        states.insert("exited".to_string(), 1);

        let line = format_status(&states, &ContainerResourceSample::new());
        assert_eq!(line, "\u{1f433} U: 2, D: 1, S: 0, F: 0, X: 0 | ");
    }

    #[test]
    fn test_all_states_absent_render_zero() {
        let line = format_status(
            &ContainerStateCounts::new(),
            &ContainerResourceSample::new(),
        );
        assert_eq!(line, "\u{1f433} U: 0, D: 0, S: 0, F: 0, X: 0 | ");
    }

    #[test]
    fn test_unknown_states_ignored() {
        let mut states = ContainerStateCounts::new();
        states.insert("paused".to_string(), 4);
        states.insert("dead".to_string(), 1);

        let line = format_status(&states, &ContainerResourceSample::new());
        assert_eq!(line, "\u{1f433} U: 0, D: 0, S: 0, F: 0, X: 1 | ");
    }

    #[test]
    fn test_samples_sorted_and_truncated() {
        let mut states = ContainerStateCounts::new();
        states.insert("running".to_string(), 2);

        let mut usage = ContainerResourceSample::new();
        usage.insert(
            "def456789abc".to_string(),
            "CPU: 3.00%, Mem: 8.00%".to_string(),
        );
        usage.insert(
            "abc123456def".to_string(),
            "CPU: 5.00%, Mem: 10.00%".to_string(),
        );

        let line = format_status(&states, &usage);
        assert_eq!(
            line,
            "\u{1f433} U: 2, D: 0, S: 0, F: 0, X: 0 | \
             abc123 (CPU: 5.00%, Mem: 10.00%) def456 (CPU: 3.00%, Mem: 8.00%) "
        );
    }

    #[test]
    fn test_short_id_not_padded() {
        let mut usage = ContainerResourceSample::new();
        usage.insert("ab".to_string(), "CPU: 1%, Mem: 2%".to_string());

        let line = format_status(&ContainerStateCounts::new(), &usage);
        assert!(line.ends_with("ab (CPU: 1%, Mem: 2%) "));
    }

    #[test]
    fn test_deterministic_across_calls() {
        let mut usage = ContainerResourceSample::new();
        for id in ["zzz999", "mmm555", "aaa111"] {
            usage.insert(id.to_string(), "CPU: 1%, Mem: 1%".to_string());
        }
        let states = ContainerStateCounts::new();

        let first = format_status(&states, &usage);
        let second = format_status(&states, &usage);
        assert_eq!(first, second);
        let a = first.find("aaa111").unwrap();
        let m = first.find("mmm555").unwrap();
        let z = first.find("zzz999").unwrap();
        assert!(a < m && m < z);
    }
}
