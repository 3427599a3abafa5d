//! Playback monitor: the per-tick skip state machine.
//!
//! Each tick reads the player once and walks a fixed sequence:
//! 1. Do nothing while stopped or paused
//! 2. Start a new session when the source changes
//! 3. Detect replays and rewinds, re-arm parents after nested exits
//! 4. Re-evaluate jump points against the current position
//! 5. Wait for playback to become ready, emit one-shot toasts
//! 6. Decide for the first eligible active segment: auto-skip, prompt, or suppress
//!
//! Ticks are strictly serial. The monitor owns its session and is driven
//! either directly (tests, simulations) or by [`PlaybackMonitor::spawn`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, field, info, instrument, warn, Span};

use crate::adapters::{Notification, Notifier, Player, PlayerError, SegmentSource, APP_HEADING};
use crate::dialog::view::title_case;
use crate::dialog::{DeclineReason, PromptOutcome, SkipPrompt};
use crate::domain::{PlaybackCategory, PlaybackItem, Segment, SegmentId};

use super::linker::{has_container, link, nested_jump_target, reevaluate, superseded_by};
use super::policy::{SkipMode, SkipPolicy};
use super::session::{LoadedSegments, MonitorSession};

/// A position below this may be a replay from the top
const REPLAY_WINDOW_SECS: f64 = 5.0;

/// Playback must have been ready this long before a replay is recognized
const REPLAY_SETTLE: Duration = Duration::from_secs(5);

/// Delay after readiness before the missing-file toast
const MISSING_TOAST_DELAY: Duration = Duration::from_secs(2);

/// Minimum gap between engine toasts
const TOAST_COOLDOWN: Duration = Duration::from_secs(6);

const SKIPPED_TOAST_MS: u64 = 2000;
const MISSING_TOAST_MS: u64 = 3000;
const ADVISORY_TOAST_MS: u64 = 4000;

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing is playing. The session is kept until a different source plays
    NoSession,

    /// Playback is paused; nothing was evaluated
    Paused,

    /// The player could not be read or metadata is not ready yet
    Unavailable,

    /// Waiting for playback to report a position
    Initializing,

    /// Tracking, no segment needed a decision
    Idle,

    Action(TickAction),
}

/// The decision taken for a segment
#[derive(Debug, Clone, PartialEq)]
pub enum TickAction {
    AutoSkipped { id: SegmentId, target: f64 },
    Prompted { id: SegmentId, result: PromptResult },
    Suppressed { id: SegmentId, reason: SuppressReason },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PromptResult {
    Accepted { target: f64 },
    Declined(DeclineReason),
    /// The dialog could not be shown
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    DialogsDisabled,
    SkippingDisabled,
    PlaybackStopped,
}

struct Snapshot {
    file: PathBuf,
    category: PlaybackCategory,
    time: f64,
}

/// The skip engine's state machine
pub struct PlaybackMonitor {
    player: Arc<dyn Player>,
    source: Arc<dyn SegmentSource>,
    prompt: Arc<dyn SkipPrompt>,
    notifier: Arc<dyn Notifier>,
    policy: Arc<dyn SkipPolicy>,
    session: Option<MonitorSession>,
}

impl PlaybackMonitor {
    pub fn new(
        player: Arc<dyn Player>,
        source: Arc<dyn SegmentSource>,
        prompt: Arc<dyn SkipPrompt>,
        notifier: Arc<dyn Notifier>,
        policy: Arc<dyn SkipPolicy>,
    ) -> Self {
        Self {
            player,
            source,
            prompt,
            notifier,
            policy,
            session: None,
        }
    }

    /// The current session, if a video is being tracked
    pub fn session(&self) -> Option<&MonitorSession> {
        self.session.as_ref()
    }

    /// Run one poll cycle
    #[instrument(skip(self, now), fields(session = field::Empty))]
    pub async fn tick(&mut self, now: Instant) -> TickOutcome {
        if !self.player.is_playing_video() {
            return TickOutcome::NoSession;
        }

        if self.player.is_paused() {
            return TickOutcome::Paused;
        }

        let snapshot = match self.snapshot() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                debug!("Playback metadata not ready, skipping tick");
                return TickOutcome::Unavailable;
            }
            Err(e) => {
                debug!(error = %e, "Player unavailable, skipping tick");
                return TickOutcome::Unavailable;
            }
        };

        let mut session = match self.session.take() {
            Some(session) if session.source() == snapshot.file.as_path() => session,
            previous => {
                if let Some(previous) = previous {
                    info!(session = %previous.id, "Source changed, session ended");
                }
                self.start_session(&snapshot).await
            }
        };
        Span::current().record("session", field::display(session.id));

        let outcome = self.track(&mut session, snapshot.time, now).await;
        self.session = Some(session);
        outcome
    }

    /// Poll on `interval` until the returned handle is stopped
    pub fn spawn(mut self, interval: Duration) -> MonitorHandle {
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(?interval, "Playback monitor started");

            loop {
                tokio::select! {
                    _ = stop_rx.recv() => break,
                    _ = ticker.tick() => {
                        let outcome = self.tick(Instant::now()).await;
                        if let TickOutcome::Action(action) = outcome {
                            debug!(?action, "Tick acted");
                        }
                    }
                }
            }

            info!("Playback monitor stopped");
        });

        MonitorHandle { stop_tx, task }
    }

    fn snapshot(&self) -> Result<Option<Snapshot>, PlayerError> {
        let Some(file) = self.player.playing_file()? else {
            return Ok(None);
        };
        let Some(item) = self.player.playing_item()?.filter(PlaybackItem::is_ready) else {
            return Ok(None);
        };
        let time = self.player.time()?;

        Ok(Some(Snapshot {
            file,
            category: item.category(),
            time,
        }))
    }

    async fn start_session(&self, snapshot: &Snapshot) -> MonitorSession {
        let loaded = self.load_segments(&snapshot.file, snapshot.time).await;
        let session = MonitorSession::new(snapshot.file.clone(), snapshot.category, loaded);

        info!(
            session = %session.id,
            video = %snapshot.file.display(),
            category = %snapshot.category,
            segments = session.segments().len(),
            "Session started"
        );
        session
    }

    /// Load, validate, and link the segments for `video`
    #[instrument(skip(self, video), fields(video = %video.display()))]
    async fn load_segments(&self, video: &Path, reference_time: f64) -> LoadedSegments {
        let (raw, file_found) = match self.source.load(video).await {
            Ok(Some(raw)) => (raw, true),
            Ok(None) => {
                info!("No segment file found");
                (Vec::new(), false)
            }
            Err(e) => {
                warn!(error = %e, "Segment file unusable, continuing without segments");
                (Vec::new(), true)
            }
        };

        let segments = raw
            .into_iter()
            .filter_map(|raw| match raw.into_segment() {
                Ok(segment) => Some(segment),
                Err(e) => {
                    warn!(error = %e, "Rejected segment");
                    None
                }
            })
            .collect();

        let linked = link(segments, Some(reference_time), self.policy.eliminate_overlaps());
        LoadedSegments {
            segments: linked.segments,
            file_found,
            has_relations: linked.has_relations,
        }
    }

    async fn track(&self, session: &mut MonitorSession, time: f64, now: Instant) -> TickOutcome {
        let last = session.last_known_time;

        if is_replay(session, time, now) {
            info!(from = last, to = time, "Replay detected, tracking reset");
            let loaded = self.load_segments(session.source(), time).await;
            session.restart(loaded);
        } else if last > 0.0 && last - time > self.policy.rewind_threshold_secs() {
            info!(from = last, to = time, "Rewind detected, tracking cleared");
            session.clear_tracking();
        }

        reconcile_nested_exits(session, time);
        reevaluate(&mut session.segments, time);

        if session.ready_at.is_none() && time > 0.0 {
            debug!(time, "Playback ready");
            session.ready_at = Some(now);
        }

        self.missing_file_toast(session, now);

        session.last_known_time = time;
        if !session.is_ready() {
            return TickOutcome::Initializing;
        }

        self.overlap_advisory(session, now);

        match self.decide(session, time).await {
            Some(action) => TickOutcome::Action(action),
            None => TickOutcome::Idle,
        }
    }

    /// First decision wins; later eligible segments wait for the next tick
    async fn decide(&self, session: &mut MonitorSession, time: f64) -> Option<TickAction> {
        let category = session.category();

        for index in 0..session.segments.len() {
            let id = session.segments[index].id();
            if session.dismissed.contains(&id)
                || session.prompted.contains(&id)
                || !session.segments[index].is_active(time)
            {
                continue;
            }

            if let Some(later) = superseded_by(&session.segments, index, time) {
                debug!(%id, later = %later, "Later active segment takes priority");
                continue;
            }

            if session
                .skipped_to_nested
                .get(&id)
                .is_some_and(|nested| nested.is_active(time))
            {
                continue;
            }

            let segment = session.segments[index].clone();
            let mode = self.policy.skip_mode(segment.label());

            if !self.policy.dialog_enabled(category) {
                debug!(%id, %category, "Dialogs disabled");
                session.prompted.insert(id);
                return Some(TickAction::Suppressed {
                    id,
                    reason: SuppressReason::DialogsDisabled,
                });
            }

            if mode == SkipMode::Never {
                debug!(%id, label = segment.label(), "Never skipped");
                continue;
            }

            if !self.policy.skip_enabled(category) {
                session.prompted.insert(id);
                return Some(TickAction::Suppressed {
                    id,
                    reason: SuppressReason::SkippingDisabled,
                });
            }

            let jump_to = forward_target(&segment, time);
            info!(segment = %segment, ?mode, jump_to, "Active segment");

            let action = match mode {
                SkipMode::Auto => {
                    self.skip(session, index, &segment, jump_to);
                    TickAction::AutoSkipped {
                        id,
                        target: jump_to,
                    }
                }
                _ => self.ask(session, index, &segment, jump_to).await,
            };
            return Some(action);
        }

        None
    }

    async fn ask(
        &self,
        session: &mut MonitorSession,
        index: usize,
        segment: &Segment,
        jump_to: f64,
    ) -> TickAction {
        let id = segment.id();

        if !self.player.is_playing_video() {
            session.prompted.insert(id);
            return TickAction::Suppressed {
                id,
                reason: SuppressReason::PlaybackStopped,
            };
        }

        let debounce = self.policy.dialog_debounce();
        if !debounce.is_zero() {
            tokio::time::sleep(debounce).await;
        }

        let result = match self.prompt.prompt(segment).await {
            Ok(PromptOutcome::Accepted { .. }) => {
                info!(%id, "Skip accepted");
                self.skip(session, index, segment, jump_to);
                PromptResult::Accepted { target: jump_to }
            }
            Ok(PromptOutcome::Declined(reason)) => {
                info!(%id, ?reason, "Skip declined");
                session.dismiss(id);
                PromptResult::Declined(reason)
            }
            Err(e) => {
                warn!(%id, error = %e, "Skip dialog failed");
                session.prompted.insert(id);
                PromptResult::Failed
            }
        };

        TickAction::Prompted { id, result }
    }

    fn skip(&self, session: &mut MonitorSession, index: usize, segment: &Segment, jump_to: f64) {
        let id = segment.id();

        if let Err(e) = self.player.seek(jump_to) {
            warn!(%id, error = %e, "Seek failed");
        }
        session.prompted.insert(id);

        if let Some(target) = nested_jump_target(&session.segments, index)
            .filter(|nested| nested.start() == jump_to)
            .cloned()
        {
            debug!(%id, nested = %target, "Skipped into nested segment");
            session.divert_to_nested(id, target);
        }
        session.last_known_time = jump_to;

        if self.policy.skipped_toast() {
            self.toast(
                "Skipped",
                format!("{} skipped", title_case(segment.label())),
                SKIPPED_TOAST_MS,
            );
        }
    }

    fn missing_file_toast(&self, session: &mut MonitorSession, now: Instant) {
        if session.segment_file_found || session.missing_toast_handled {
            return;
        }
        if !session.ready_for(now).is_some_and(|ready| ready >= MISSING_TOAST_DELAY) {
            return;
        }

        let category = session.category();
        if !self.policy.missing_file_toast(category) {
            debug!(%category, "Missing-file toast disabled");
            session.missing_toast_handled = true;
            return;
        }
        if session.toast_cooling_down(now, TOAST_COOLDOWN) {
            debug!("Missing-file toast deferred by cooldown");
            return;
        }

        self.toast(
            APP_HEADING,
            format!("No skip segments found for this {}.", category),
            MISSING_TOAST_MS,
        );
        session.missing_toast_handled = true;
        session.last_toast_at = Some(now);
    }

    fn overlap_advisory(&self, session: &mut MonitorSession, now: Instant) {
        if session.overlap_advisory_shown
            || !session.has_relations
            || !session.dismissed.is_empty()
            || !self.policy.overlap_advisory()
        {
            return;
        }

        self.toast(APP_HEADING, "Overlapping/Nested segments detected.", ADVISORY_TOAST_MS);
        session.overlap_advisory_shown = true;
        session.last_toast_at = Some(now);
    }

    fn toast(&self, heading: &str, message: impl Into<String>, duration_ms: u64) {
        let notification = Notification::new(heading, message, duration_ms).with_icon(self.policy.icon());
        self.notifier.notify(&notification);
    }
}

/// Back near the start of the same video after having played a while
fn is_replay(session: &MonitorSession, time: f64, now: Instant) -> bool {
    let settled = session
        .ready_for(now)
        .is_some_and(|ready| ready > REPLAY_SETTLE);
    let last = session.last_known_time;

    settled && time < REPLAY_WINDOW_SECS && (last > 10.0 || (last >= 5.0 && time < 2.0))
}

/// The segment's jump target, or just past its end when the chained target
/// lies behind the playback position
fn forward_target(segment: &Segment, time: f64) -> f64 {
    let target = segment.jump_target();
    if target < time {
        debug!(segment = %segment, target, time, "Chained target is behind playback, skipping to end");
        segment.end() + 1.0
    } else {
        target
    }
}

/// Lift dismissals of nested segments already passed and re-arm parents
/// whose nested diversion has ended.
fn reconcile_nested_exits(session: &mut MonitorSession, time: f64) {
    let passed: Vec<SegmentId> = (0..session.segments.len())
        .filter(|&i| session.segments[i].end() < time && has_container(&session.segments, i))
        .map(|i| session.segments[i].id())
        .collect();
    for id in passed {
        if session.dismissed.remove(&id) {
            debug!(%id, "Passed nested segment, dismissal lifted");
        }
    }

    let exited: Vec<SegmentId> = session
        .skipped_to_nested
        .iter()
        .filter(|(_, nested)| !nested.is_active(time))
        .map(|(id, _)| *id)
        .collect();

    for id in exited {
        session.skipped_to_nested.remove(&id);
        if session.dismissed.contains(&id) {
            continue;
        }

        session.prompted.remove(&id);
        info!(%id, "Left nested segment, parent re-armed");
    }
}

/// Handle to a spawned monitor loop
pub struct MonitorHandle {
    stop_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Stop the loop and wait for the current tick to finish
    pub async fn stop(self) -> Result<()> {
        let _ = self.stop_tx.send(()).await;
        self.task.await?;
        Ok(())
    }
}
