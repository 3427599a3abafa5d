//! The modal skip dialog and its `SkipPrompt` adapter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::adapters::Player;
use crate::domain::Segment;

use super::countdown::{Countdown, Expiry};
use super::timer::{CountdownTimer, COUNTDOWN_INTERVAL};
use super::view::DialogView;
use super::{DeclineReason, DialogChoice, DialogError, DialogSurface, PromptOutcome, SkipPrompt};

impl From<Expiry> for DeclineReason {
    fn from(expiry: Expiry) -> Self {
        match expiry {
            Expiry::SegmentEnded => DeclineReason::SegmentEnded,
            Expiry::TimedOut => DeclineReason::TimedOut,
            Expiry::PlaybackStopped => DeclineReason::PlaybackStopped,
        }
    }
}

/// Presentation options shared by every dialog
#[derive(Debug, Clone)]
pub struct ModalOptions {
    pub layout: String,
    pub show_progress: bool,
    pub countdown_interval: Duration,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            layout: super::view::layout_name("Bottom Right"),
            show_progress: true,
            countdown_interval: COUNTDOWN_INTERVAL,
        }
    }
}

/// One prompt for one segment
#[derive(Debug, Clone)]
pub struct SkipDialog {
    segment: Segment,
    layout: String,
}

impl SkipDialog {
    pub fn new(segment: Segment, layout: impl Into<String>) -> Self {
        Self {
            segment,
            layout: layout.into(),
        }
    }

    /// Show the dialog and wait for an answer, a segment end, or a timeout.
    ///
    /// The countdown task is stopped and joined on every exit path.
    pub async fn show_modal(
        &self,
        surface: Arc<dyn DialogSurface>,
        player: Arc<dyn Player>,
        show_progress: bool,
        countdown_interval: Duration,
    ) -> Result<PromptOutcome, DialogError> {
        let view = DialogView::for_segment(&self.segment);
        surface.open(&self.layout, &view).await?;
        info!(segment = %self.segment, layout = %self.layout, "Skip dialog opened");

        let mut timer = CountdownTimer::spawn(
            player,
            surface.clone(),
            Countdown::for_segment(&self.segment),
            show_progress,
            countdown_interval,
        );

        let outcome = tokio::select! {
            choice = surface.wait_for_choice() => match choice {
                Ok(DialogChoice::Skip) => Ok(PromptOutcome::Accepted { jump_target: view.skip_target }),
                Ok(DialogChoice::Dismiss) => Ok(PromptOutcome::Declined(DeclineReason::UserCancelled)),
                Err(e) => Err(e),
            },
            expiry = timer.expired() => Ok(PromptOutcome::Declined(expiry.into())),
        };

        timer.stop().await;
        surface.close().await;
        debug!(?outcome, "Skip dialog closed");

        outcome
    }
}

/// [`SkipPrompt`] that shows a [`SkipDialog`] on a surface
pub struct ModalPrompt {
    surface: Arc<dyn DialogSurface>,
    player: Arc<dyn Player>,
    options: ModalOptions,
}

impl ModalPrompt {
    pub fn new(surface: Arc<dyn DialogSurface>, player: Arc<dyn Player>, options: ModalOptions) -> Self {
        Self {
            surface,
            player,
            options,
        }
    }
}

#[async_trait]
impl SkipPrompt for ModalPrompt {
    async fn prompt(&self, segment: &Segment) -> Result<PromptOutcome, DialogError> {
        let dialog = SkipDialog::new(segment.clone(), self.options.layout.clone());
        dialog
            .show_modal(
                self.surface.clone(),
                self.player.clone(),
                self.options.show_progress,
                self.options.countdown_interval,
            )
            .await
    }
}
