//! Headless driver: scripted collaborators and YAML timelines.
//!
//! A [`Timeline`] describes a playback session as a list of steps (position,
//! pause, stop, elapsed wall time) plus the answers a user gives to skip
//! dialogs. [`Timeline::run`] feeds it through a real [`PlaybackMonitor`] and
//! reports what each tick did.
//!
//! ```yaml
//! video: /media/Show.S01E01.mkv
//! segments:
//!   - { start: 0, end: 30, label: intro }
//!   - { start: 10, end: 20, label: recap }
//! answers: [skip]
//! steps:
//!   - at: 1
//!   - at: 12
//!     wait_secs: 3
//! ```

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::adapters::{
    FileSegmentSource, LogNotifier, Notification, Notifier, Player, PlayerError, RawSegment,
    SegmentSource, SourceError,
};
use crate::config::Settings;
use crate::core::{PlaybackMonitor, TickOutcome};
use crate::dialog::{DeclineReason, DialogError, PromptOutcome, SkipPrompt};
use crate::domain::{PlaybackItem, Provenance, Segment, SegmentId};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Observable state of a [`ScriptedPlayer`]
#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    pub playing: bool,
    pub paused: bool,
    pub time: f64,
    pub file: Option<PathBuf>,
    pub item: Option<PlaybackItem>,
    /// Make position and metadata reads fail
    pub unavailable: bool,
    /// Make seeks fail
    pub reject_seeks: bool,
    /// Every seek target requested, in order
    pub seeks: Vec<f64>,
}

/// In-memory [`Player`] whose state is set by the caller
#[derive(Debug, Default)]
pub struct ScriptedPlayer {
    state: Mutex<PlayerState>,
}

impl ScriptedPlayer {
    /// A player already playing `file` at position 0
    pub fn playing(file: impl Into<PathBuf>) -> Self {
        let player = Self::default();
        player.load(file);
        player
    }

    /// Start playing a new file from the top; the title is the file stem
    pub fn load(&self, file: impl Into<PathBuf>) {
        let file = file.into();
        let title = file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut state = lock(&self.state);
        state.item = Some(PlaybackItem {
            file: file.to_string_lossy().into_owned(),
            title: Some(title),
            ..Default::default()
        });
        state.file = Some(file);
        state.playing = true;
        state.paused = false;
        state.time = 0.0;
    }

    pub fn set_time(&self, time: f64) {
        lock(&self.state).time = time;
    }

    pub fn set_paused(&self, paused: bool) {
        lock(&self.state).paused = paused;
    }

    pub fn stop(&self) {
        let mut state = lock(&self.state);
        state.playing = false;
        state.file = None;
        state.item = None;
    }

    pub fn set_item(&self, item: Option<PlaybackItem>) {
        lock(&self.state).item = item;
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        lock(&self.state).unavailable = unavailable;
    }

    pub fn set_reject_seeks(&self, reject: bool) {
        lock(&self.state).reject_seeks = reject;
    }

    pub fn seeks(&self) -> Vec<f64> {
        lock(&self.state).seeks.clone()
    }

    pub fn state(&self) -> PlayerState {
        lock(&self.state).clone()
    }
}

impl Player for ScriptedPlayer {
    fn is_playing_video(&self) -> bool {
        lock(&self.state).playing
    }

    fn is_paused(&self) -> bool {
        lock(&self.state).paused
    }

    fn time(&self) -> Result<f64, PlayerError> {
        let state = lock(&self.state);
        if state.unavailable || !state.playing {
            return Err(PlayerError::Unavailable("no position".to_string()));
        }
        Ok(state.time)
    }

    fn seek(&self, seconds: f64) -> Result<(), PlayerError> {
        let mut state = lock(&self.state);
        state.seeks.push(seconds);
        if state.reject_seeks {
            return Err(PlayerError::SeekFailed {
                target: seconds,
                reason: "seek rejected".to_string(),
            });
        }
        state.time = seconds;
        Ok(())
    }

    fn playing_file(&self) -> Result<Option<PathBuf>, PlayerError> {
        let state = lock(&self.state);
        if state.unavailable {
            return Err(PlayerError::Unavailable("no file".to_string()));
        }
        Ok(state.file.clone())
    }

    fn playing_item(&self) -> Result<Option<PlaybackItem>, PlayerError> {
        let state = lock(&self.state);
        if state.unavailable {
            return Err(PlayerError::Unavailable("no item".to_string()));
        }
        Ok(state.item.clone())
    }
}

/// How a simulated user answers a skip dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptedAnswer {
    Skip,
    Dismiss,
    Timeout,
    SegmentEnded,
    /// The dialog fails to open
    Fail,
}

/// [`SkipPrompt`] that replays queued answers; an empty queue times out
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<ScriptedAnswer>>,
    asked: Mutex<Vec<SegmentId>>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = ScriptedAnswer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, answer: ScriptedAnswer) {
        lock(&self.answers).push_back(answer);
    }

    /// Segments prompted so far, in order
    pub fn asked(&self) -> Vec<SegmentId> {
        lock(&self.asked).clone()
    }
}

#[async_trait]
impl SkipPrompt for ScriptedPrompt {
    async fn prompt(&self, segment: &Segment) -> Result<PromptOutcome, DialogError> {
        lock(&self.asked).push(segment.id());
        let answer = lock(&self.answers)
            .pop_front()
            .unwrap_or(ScriptedAnswer::Timeout);

        match answer {
            ScriptedAnswer::Skip => Ok(PromptOutcome::Accepted {
                jump_target: segment.jump_target(),
            }),
            ScriptedAnswer::Dismiss => Ok(PromptOutcome::Declined(DeclineReason::UserCancelled)),
            ScriptedAnswer::Timeout => Ok(PromptOutcome::Declined(DeclineReason::TimedOut)),
            ScriptedAnswer::SegmentEnded => Ok(PromptOutcome::Declined(DeclineReason::SegmentEnded)),
            ScriptedAnswer::Fail => Err(DialogError::Create("scripted failure".to_string())),
        }
    }
}

/// [`Notifier`] that keeps every toast
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.notifications).clone()
    }

    pub fn messages(&self) -> Vec<String> {
        lock(&self.notifications)
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        LogNotifier.notify(notification);
        lock(&self.notifications).push(notification.clone());
    }
}

/// [`SegmentSource`] serving a fixed list, or reporting no file at all
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    segments: Option<Vec<RawSegment>>,
}

impl StaticSource {
    pub fn new(segments: Vec<RawSegment>) -> Self {
        Self {
            segments: Some(segments),
        }
    }

    /// A source for which no segment file exists
    pub fn missing() -> Self {
        Self { segments: None }
    }
}

#[async_trait]
impl SegmentSource for StaticSource {
    async fn load(&self, _video: &Path) -> Result<Option<Vec<RawSegment>>, SourceError> {
        Ok(self.segments.clone())
    }
}

/// Inline segment in a timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineSegment {
    pub start: f64,
    pub end: f64,
    pub label: String,
}

impl From<TimelineSegment> for RawSegment {
    fn from(segment: TimelineSegment) -> Self {
        RawSegment {
            start: segment.start,
            end: segment.end,
            label: segment.label,
            action_code: None,
            provenance: Provenance::Other("timeline".to_string()),
        }
    }
}

/// One poll of a timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineStep {
    /// Position before the tick; defaults to the previous position plus `wait_secs`
    #[serde(default)]
    pub at: Option<f64>,

    #[serde(default)]
    pub paused: bool,

    /// Playback stopped
    #[serde(default)]
    pub stopped: bool,

    /// Wall time elapsed since the previous step
    #[serde(default = "default_wait_secs")]
    pub wait_secs: f64,
}

fn default_wait_secs() -> f64 {
    1.0
}

/// A scripted playback session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    pub video: PathBuf,

    /// Inline segments; when absent, segment files next to `video` are read
    #[serde(default)]
    pub segments: Option<Vec<TimelineSegment>>,

    #[serde(default)]
    pub answers: Vec<ScriptedAnswer>,

    pub steps: Vec<TimelineStep>,
}

/// What happened at one step
#[derive(Debug, Clone)]
pub struct TickRecord {
    pub step: usize,
    pub position: f64,
    pub outcome: TickOutcome,
}

/// Result of running a timeline
#[derive(Debug, Clone, Default)]
pub struct SimulationReport {
    pub ticks: Vec<TickRecord>,
    pub seeks: Vec<f64>,
    pub notifications: Vec<Notification>,
}

impl Timeline {
    /// Parse a timeline from YAML content
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse timeline YAML")
    }

    /// Load a timeline file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read timeline: {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid timeline: {}", path.display()))
    }

    /// Drive a monitor through every step
    pub async fn run(&self, settings: Settings) -> Result<SimulationReport> {
        let player = Arc::new(ScriptedPlayer::playing(&self.video));
        let prompt = Arc::new(ScriptedPrompt::new(self.answers.iter().copied()));
        let notifier = Arc::new(RecordingNotifier::default());
        let source: Arc<dyn SegmentSource> = match self.segments {
            Some(ref segments) => Arc::new(StaticSource::new(
                segments.iter().cloned().map(RawSegment::from).collect(),
            )),
            None => Arc::new(FileSegmentSource::new(settings.edl.clone())),
        };

        let mut monitor = PlaybackMonitor::new(
            player.clone(),
            source,
            prompt,
            notifier.clone(),
            Arc::new(settings),
        );

        let started = Instant::now();
        let mut elapsed = Duration::ZERO;
        let mut report = SimulationReport::default();

        for (index, step) in self.steps.iter().enumerate() {
            if !step.wait_secs.is_finite() || step.wait_secs < 0.0 {
                anyhow::bail!("Step {}: wait_secs must be a non-negative number", index + 1);
            }
            elapsed += Duration::from_secs_f64(step.wait_secs);

            let position = {
                let state = player.state();
                if step.stopped {
                    player.stop();
                } else if !state.playing {
                    player.load(&self.video);
                }
                let position = step.at.unwrap_or_else(|| {
                    if state.paused {
                        state.time
                    } else {
                        state.time + step.wait_secs
                    }
                });
                player.set_time(position);
                player.set_paused(step.paused);
                position
            };

            let outcome = monitor.tick(started + elapsed).await;
            report.ticks.push(TickRecord {
                step: index + 1,
                position,
                outcome,
            });
        }

        report.seeks = player.seeks();
        report.notifications = notifier.notifications();
        Ok(report)
    }
}
