//! Playback metadata and category inference.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Kind of media being played; preferences are keyed by it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackCategory {
    Movie,
    Episode,
}

impl PlaybackCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackCategory::Movie => "movie",
            PlaybackCategory::Episode => "episode",
        }
    }
}

impl fmt::Display for PlaybackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata the host player reports for the current item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackItem {
    #[serde(default)]
    pub file: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub show_title: Option<String>,

    #[serde(default)]
    pub episode: Option<i32>,
}

fn episode_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)s\d{2}e\d{2}").expect("static regex"))
}

impl PlaybackItem {
    /// Metadata is usable once the player reports a title
    pub fn is_ready(&self) -> bool {
        self.title.is_some()
    }

    /// Infer whether this item is a movie or a TV episode
    pub fn category(&self) -> PlaybackCategory {
        if self.show_title.as_deref().is_some_and(|s| !s.is_empty()) {
            return PlaybackCategory::Episode;
        }
        if self.episode.is_some_and(|e| e > 0) {
            return PlaybackCategory::Episode;
        }
        if episode_pattern().is_match(&self.file) {
            return PlaybackCategory::Episode;
        }
        PlaybackCategory::Movie
    }
}
