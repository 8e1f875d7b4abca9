use crate::error::Result;
use crate::timespan::time_difference;

/// Substrings delimiting a phase inside a job log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseMarkers {
    pub begin: String,
    pub end: String,
}

impl PhaseMarkers {
    pub fn new(begin: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            begin: begin.into(),
            end: end.into(),
        }
    }
}

/// Measures the phase delimited by `markers` in a log, in whole seconds.
///
/// Log lines are expected to start with a `HH:MM:SS` timestamp, e.g.
/// `09:08:44 INFO - Running...`. When a marker occurs several times the last
/// matching line wins. Returns `Ok(None)` unless both markers were seen; a
/// timestamp is only parsed once both are found.
pub fn measure<S: AsRef<str>>(lines: &[S], markers: &PhaseMarkers) -> Result<Option<i64>> {
    let mut begin_time: Option<&str> = None;
    let mut end_time: Option<&str> = None;

    for line in lines {
        let line = line.as_ref();
        if line.contains(markers.begin.as_str()) {
            begin_time = leading_token(line);
        }
        if line.contains(markers.end.as_str()) {
            end_time = leading_token(line);
        }
    }

    match (begin_time, end_time) {
        (Some(begin), Some(end)) => time_difference(begin, end).map(Some),
        _ => Ok(None),
    }
}

fn leading_token(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> PhaseMarkers {
        PhaseMarkers::new("start X", "end X")
    }

    #[test]
    fn test_last_begin_marker_wins() {
        let lines = [
            "09:00:00 start X\n",
            "09:00:05 start X\n",
            "09:00:10 end X\n",
        ];

        assert_eq!(measure(&lines, &markers()).unwrap(), Some(5));
    }

    #[test]
    fn test_last_end_marker_wins() {
        let lines = [
            "09:00:00 start X\n",
            "09:00:10 end X\n",
            "09:00:42 INFO - unrelated\n",
            "09:01:00 end X\n",
        ];

        assert_eq!(measure(&lines, &markers()).unwrap(), Some(60));
    }

    #[test]
    fn test_missing_end_marker_is_no_measurement() {
        let lines = ["09:00:00 start X\n", "09:00:05 INFO - still going\n"];

        assert_eq!(measure(&lines, &markers()).unwrap(), None);
    }

    #[test]
    fn test_missing_end_marker_skips_timestamp_parsing() {
        let lines = ["garbage start X\n"];

        assert_eq!(measure(&lines, &markers()).unwrap(), None);
    }

    #[test]
    fn test_empty_log_is_no_measurement() {
        let lines: [&str; 0] = [];

        assert_eq!(measure(&lines, &markers()).unwrap(), None);
    }

    #[test]
    fn test_zero_duration_is_a_measurement() {
        let lines = ["09:00:00 start X\n", "09:00:00 end X\n"];

        assert_eq!(measure(&lines, &markers()).unwrap(), Some(0));
    }

    #[test]
    fn test_end_before_begin_is_not_rejected() {
        let lines = ["09:00:10 end X\n", "09:00:30 start X\n"];

        assert_eq!(measure(&lines, &markers()).unwrap(), Some(-20));
    }

    #[test]
    fn test_malformed_timestamp_is_an_error() {
        let lines = ["[taskcluster] start X\n", "09:00:10 end X\n"];

        assert!(measure(&lines, &markers()).is_err());
    }

    #[test]
    fn test_works_with_owned_lines() {
        let lines: Vec<String> = vec![
            "10:00:00     INFO - Running command: start X\n".to_string(),
            "10:02:30     INFO - Return code: 0 end X\n".to_string(),
        ];

        assert_eq!(measure(&lines, &markers()).unwrap(), Some(150));
    }
}
