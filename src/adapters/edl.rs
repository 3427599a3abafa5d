//! Edit decision list (EDL) parsing.
//!
//! One segment per line: `start end action`, seconds as decimals. The action
//! code is mapped to a label through the configured table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{normalize_label, Provenance};

use super::source::RawSegment;

/// Label for action codes missing from the mapping
pub const UNMAPPED_LABEL: &str = "segment";

/// How EDL action codes become labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdlOptions {
    /// Action code to label (labels are normalized on use)
    #[serde(default = "default_action_mapping")]
    pub action_mapping: HashMap<i32, String>,

    /// Drop lines whose action code is not in the mapping
    #[serde(default)]
    pub ignore_unmapped: bool,
}

fn default_action_mapping() -> HashMap<i32, String> {
    // 3 is the commercial-break action in common EDL tooling
    HashMap::from([(3, "commercial".to_string())])
}

impl Default for EdlOptions {
    fn default() -> Self {
        Self {
            action_mapping: default_action_mapping(),
            ignore_unmapped: false,
        }
    }
}

impl EdlOptions {
    /// Resolve the label for an action code, `None` when the line is dropped
    pub fn label_for(&self, action: i32) -> Option<String> {
        match self.action_mapping.get(&action) {
            Some(label) => Some(normalize_label(label)),
            None if self.ignore_unmapped => None,
            None => Some(UNMAPPED_LABEL.to_string()),
        }
    }
}

/// Parse EDL content. Lines without exactly three fields are ignored; a
/// three-field line that does not parse fails the whole file.
pub fn parse_edl(content: &str, options: &EdlOptions) -> Result<Vec<RawSegment>, String> {
    let mut segments = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 3 {
            continue;
        }

        let start: f64 = parts[0]
            .parse()
            .map_err(|e| format!("line {}: bad start '{}': {}", line_no + 1, parts[0], e))?;
        let end: f64 = parts[1]
            .parse()
            .map_err(|e| format!("line {}: bad end '{}': {}", line_no + 1, parts[1], e))?;
        let action: i32 = parts[2]
            .parse()
            .map_err(|e| format!("line {}: bad action '{}': {}", line_no + 1, parts[2], e))?;

        let Some(label) = options.label_for(action) else {
            debug!(action, "Ignoring unmapped EDL action");
            continue;
        };

        debug!(start, end, action, label = %label, "Parsed EDL line");
        segments.push(RawSegment {
            start,
            end,
            label,
            action_code: Some(action),
            provenance: Provenance::Edl,
        });
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_mapping() {
        let options = EdlOptions {
            action_mapping: HashMap::from([(4, "Intro".to_string()), (5, "credits".to_string())]),
            ignore_unmapped: false,
        };
        let content = "0.0 90.5 4\n\n1300 1400 5\n2000 2100 9\n";

        let segments = parse_edl(content, &options).unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].label, "intro");
        assert_eq!(segments[0].end, 90.5);
        assert_eq!(segments[1].label, "credits");
        assert_eq!(segments[2].label, UNMAPPED_LABEL);
        assert_eq!(segments[2].action_code, Some(9));
    }

    #[test]
    fn test_ignore_unmapped() {
        let options = EdlOptions {
            action_mapping: HashMap::from([(4, "intro".to_string())]),
            ignore_unmapped: true,
        };

        let segments = parse_edl("0 10 4\n20 30 0\n", &options).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].label, "intro");
    }

    #[test]
    fn test_short_lines_are_skipped() {
        let segments = parse_edl("# comment\n5 15\n5 15 3\n", &EdlOptions::default()).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].label, "commercial");
    }

    #[test]
    fn test_malformed_line_fails() {
        let err = parse_edl("0 abc 4\n", &EdlOptions::default()).unwrap_err();
        assert!(err.contains("line 1"));
    }
}
