//! Text shown by a skip dialog.

use serde::Serialize;

use crate::domain::Segment;

use super::countdown::format_clock;

/// Everything a surface needs to render the prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogView {
    /// Main button, e.g. `Skip Intro (1m30s)`
    pub button_label: String,

    /// Chained target, e.g. `Skip to Recap at 01:23`; only set for chained segments
    pub jump_label: Option<String>,

    /// Where accepting the prompt seeks to
    pub skip_target: f64,

    /// Whether the surface should accept input at all
    pub allow_input: bool,
}

impl DialogView {
    pub fn for_segment(segment: &Segment) -> Self {
        let duration = format_duration(segment.duration());
        let button_label = format!("Skip {} ({})", title_case(segment.label()), duration);

        let jump_label = segment.next_jump().map(|jump| {
            let clock = format_clock(jump.start);
            match quoted_label(&jump.info) {
                Some(label) => format!("Skip to {} at {}", title_case(label), clock),
                None => format!("Skip to next segment at {}", clock),
            }
        });

        Self {
            button_label,
            jump_label,
            skip_target: segment.jump_target(),
            allow_input: segment.allow_input(),
        }
    }
}

/// Layout resource for a configured dialog position (`Bottom Right` → `SkipDialog_BottomRight.xml`)
pub fn layout_name(position: &str) -> String {
    let compact: String = position.chars().filter(|c| !c.is_whitespace()).collect();
    format!("SkipDialog_{}.xml", compact)
}

/// `1m30s`, or `45s` under a minute
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let (m, s) = (total / 60, total % 60);
    if m > 0 {
        format!("{}m{}s", m, s)
    } else {
        format!("{}s", s)
    }
}

/// Capitalize the first letter of every word
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Text between the first pair of single quotes
fn quoted_label(info: &str) -> Option<&str> {
    let start = info.find('\'')? + 1;
    let len = info[start..].find('\'')?;
    let label = &info[start..start + len];
    (!label.is_empty()).then_some(label)
}
