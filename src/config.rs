//! Configuration for skippy.
//!
//! Configuration sources (highest priority first):
//! 1. `SKIPPY_CONFIG` environment variable (path to a YAML file)
//! 2. Config file (.skippy/config.yaml) in the current directory or a parent
//! 3. User config (`<config dir>/skippy/config.yaml`)
//! 4. Defaults
//!
//! Every field has a default, so a config file only needs the keys it changes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::EdlOptions;
use crate::core::policy::{SkipMode, SkipPolicy};
use crate::dialog::view::layout_name;
use crate::dialog::ModalOptions;
use crate::domain::{normalize_label, PlaybackCategory};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Config file schema (matches YAML structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub skip: SkipSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub dialog: DialogSettings,
    #[serde(default)]
    pub edl: EdlOptions,
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipSettings {
    /// Labels skipped automatically (entries may be comma-separated)
    #[serde(default)]
    pub always: Vec<String>,
    /// Labels that show the dialog
    #[serde(default)]
    pub ask: Vec<String>,
    /// Labels never skipped
    #[serde(default)]
    pub never: Vec<String>,
    #[serde(default)]
    pub movies: CategorySettings,
    #[serde(default)]
    pub episodes: CategorySettings,
    #[serde(default = "default_rewind_threshold")]
    pub rewind_threshold_seconds: f64,
    /// Drop segments overlapping an earlier one
    #[serde(default)]
    pub eliminate_overlaps: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub dialog: bool,
    #[serde(default)]
    pub missing_file_toast: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub overlap_advisory: bool,
    #[serde(default = "default_true")]
    pub skipped_segment: bool,
    #[serde(default)]
    pub icon: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogSettings {
    /// Screen corner, e.g. "Bottom Right"
    #[serde(default = "default_position")]
    pub position: String,
    #[serde(default = "default_true")]
    pub show_progress_bar: bool,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log at debug level unless RUST_LOG says otherwise
    #[serde(default)]
    pub verbose: bool,
}

fn default_version() -> String {
    "1".to_string()
}
fn default_true() -> bool {
    true
}
fn default_rewind_threshold() -> f64 {
    8.0
}
fn default_position() -> String {
    "Bottom Right".to_string()
}
fn default_debounce_ms() -> u64 {
    300
}
fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            skip: SkipSettings::default(),
            notifications: NotificationSettings::default(),
            dialog: DialogSettings::default(),
            edl: EdlOptions::default(),
            monitor: MonitorSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for SkipSettings {
    fn default() -> Self {
        Self {
            always: Vec::new(),
            ask: Vec::new(),
            never: Vec::new(),
            movies: CategorySettings::default(),
            episodes: CategorySettings::default(),
            rewind_threshold_seconds: default_rewind_threshold(),
            eliminate_overlaps: false,
        }
    }
}

impl Default for CategorySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dialog: true,
            missing_file_toast: false,
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            overlap_advisory: false,
            skipped_segment: true,
            icon: None,
        }
    }
}

impl Default for DialogSettings {
    fn default() -> Self {
        Self {
            position: default_position(),
            show_progress_bar: true,
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Settings {
    /// Parse settings from YAML content
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse config YAML")
    }

    pub fn category(&self, category: PlaybackCategory) -> &CategorySettings {
        match category {
            PlaybackCategory::Movie => &self.skip.movies,
            PlaybackCategory::Episode => &self.skip.episodes,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.monitor.poll_interval_ms)
    }

    /// Dialog presentation derived from the `dialog` section
    pub fn modal_options(&self) -> ModalOptions {
        ModalOptions {
            layout: layout_name(&self.dialog.position),
            show_progress: self.dialog.show_progress_bar,
            ..ModalOptions::default()
        }
    }
}

/// Normalized label set; list entries may hold comma-separated labels
fn label_set(entries: &[String]) -> HashSet<String> {
    entries
        .iter()
        .flat_map(|entry| entry.split(','))
        .map(normalize_label)
        .filter(|label| !label.is_empty())
        .collect()
}

impl SkipPolicy for Settings {
    fn skip_mode(&self, label: &str) -> SkipMode {
        let label = normalize_label(label);

        if label_set(&self.skip.always).contains(&label) {
            SkipMode::Auto
        } else if label_set(&self.skip.ask).contains(&label) {
            SkipMode::Ask
        } else if label_set(&self.skip.never).contains(&label) {
            SkipMode::Never
        } else {
            SkipMode::Ask
        }
    }

    fn skip_enabled(&self, category: PlaybackCategory) -> bool {
        self.category(category).enabled
    }

    fn dialog_enabled(&self, category: PlaybackCategory) -> bool {
        let settings = self.category(category);
        settings.enabled && settings.dialog
    }

    fn rewind_threshold_secs(&self) -> f64 {
        self.skip.rewind_threshold_seconds
    }

    fn eliminate_overlaps(&self) -> bool {
        self.skip.eliminate_overlaps
    }

    fn overlap_advisory(&self) -> bool {
        self.notifications.overlap_advisory
    }

    fn missing_file_toast(&self, category: PlaybackCategory) -> bool {
        self.category(category).missing_file_toast
    }

    fn skipped_toast(&self) -> bool {
        self.notifications.skipped_segment
    }

    fn dialog_debounce(&self) -> Duration {
        Duration::from_millis(self.dialog.debounce_ms)
    }

    fn icon(&self) -> Option<PathBuf> {
        self.notifications.icon.clone()
    }
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub settings: Settings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".skippy").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("skippy").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    Settings::from_yaml(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = match std::env::var("SKIPPY_CONFIG") {
        Ok(path) => Some(PathBuf::from(path)),
        Err(_) => find_config_file(),
    };

    let settings = match config_file {
        Some(ref path) => load_config_file(path)?,
        None => Settings::default(),
    };

    Ok(ResolvedConfig {
        settings,
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert_eq!(settings.version, "1");
        assert_eq!(settings.skip.rewind_threshold_seconds, 8.0);
        assert!(settings.skip.movies.enabled);
        assert!(settings.skip.episodes.dialog);
        assert_eq!(settings.dialog.position, "Bottom Right");
        assert_eq!(settings.poll_interval(), Duration::from_secs(1));
        assert_eq!(settings.edl.action_mapping.get(&3).map(String::as_str), Some("commercial"));
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1"
skip:
  always: ["Intro, Recap"]
  never: [credits]
  episodes:
    missing_file_toast: true
  rewind_threshold_seconds: 12
edl:
  action_mapping:
    4: Intro
  ignore_unmapped: true
dialog:
  debounce_ms: 0
"#
        )
        .unwrap();

        let settings = load_config_file(&config_path).unwrap();
        assert_eq!(settings.skip.rewind_threshold_seconds, 12.0);
        assert!(settings.skip.episodes.missing_file_toast);
        assert!(settings.skip.episodes.enabled);
        assert!(!settings.skip.movies.missing_file_toast);
        assert!(settings.edl.ignore_unmapped);
        assert_eq!(settings.dialog_debounce(), Duration::ZERO);
        // Unspecified sections keep their defaults
        assert!(settings.notifications.skipped_segment);

        // The env var points the resolver at the same file
        std::env::set_var("SKIPPY_CONFIG", &config_path);
        let resolved = reload_config();
        std::env::remove_var("SKIPPY_CONFIG");

        let resolved = resolved.unwrap();
        assert_eq!(resolved.config_file.as_deref(), Some(config_path.as_path()));
        assert_eq!(resolved.settings, settings);
    }

    #[test]
    fn test_skip_mode_resolution() {
        let settings = Settings::from_yaml(
            r#"
skip:
  always: ["intro,recap"]
  ask: [credits]
  never: [Preview]
"#,
        )
        .unwrap();

        assert_eq!(settings.skip_mode("Intro"), SkipMode::Auto);
        assert_eq!(settings.skip_mode(" recap "), SkipMode::Auto);
        assert_eq!(settings.skip_mode("credits"), SkipMode::Ask);
        assert_eq!(settings.skip_mode("preview"), SkipMode::Never);
        assert_eq!(settings.skip_mode("unknown"), SkipMode::Ask);
    }

    #[test]
    fn test_dialog_requires_skip_enabled() {
        let mut settings = Settings::default();
        settings.skip.movies.enabled = false;

        assert!(!settings.skip_enabled(PlaybackCategory::Movie));
        assert!(!settings.dialog_enabled(PlaybackCategory::Movie));
        assert!(settings.dialog_enabled(PlaybackCategory::Episode));
    }

    #[test]
    fn test_modal_options_from_dialog_section() {
        let settings = Settings::from_yaml(
            r#"
dialog:
  position: Top Left
  show_progress_bar: false
"#,
        )
        .unwrap();

        let options = settings.modal_options();
        assert_eq!(options.layout, "SkipDialog_TopLeft.xml");
        assert!(!options.show_progress);
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let settings = Settings::from_yaml("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }
}
