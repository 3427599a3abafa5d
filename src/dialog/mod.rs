//! Skip dialog interaction protocol.
//!
//! The monitor awaits a [`SkipPrompt`] for `ask` segments. The reference
//! implementation, [`ModalPrompt`], renders a [`SkipDialog`] on a host
//! [`DialogSurface`] while a background [`CountdownTimer`] declines on its own
//! when the segment ends or the dialog times out.
//!
//! ```text
//! Monitor ──prompt()──▶ SkipDialog ──open/close──▶ DialogSurface
//!                           │
//!                           └─spawn/stop─▶ CountdownTimer ──oneshot──▶ Expiry
//! ```

pub mod countdown;
pub mod modal;
pub mod timer;
pub mod view;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Segment;

pub use countdown::{Countdown, CountdownState, Expiry};
pub use modal::{ModalOptions, ModalPrompt, SkipDialog};
pub use timer::CountdownTimer;
pub use view::DialogView;

/// Errors creating or running a dialog; the monitor treats them as a decline
#[derive(Debug, Clone, Error)]
pub enum DialogError {
    #[error("Dialog could not be created: {0}")]
    Create(String),

    #[error("Dialog display failed: {0}")]
    Display(String),
}

/// A user's explicit answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogChoice {
    Skip,
    Dismiss,
}

/// Why a prompt ended without a skip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineReason {
    UserCancelled,
    SegmentEnded,
    TimedOut,
    PlaybackStopped,
}

/// Result of a prompt
#[derive(Debug, Clone, PartialEq)]
pub enum PromptOutcome {
    /// The user chose to skip; seek to `jump_target`
    Accepted { jump_target: f64 },

    Declined(DeclineReason),
}

/// What the monitor calls for `ask` segments
#[async_trait]
pub trait SkipPrompt: Send + Sync {
    async fn prompt(&self, segment: &Segment) -> Result<PromptOutcome, DialogError>;
}

/// Host UI that renders a dialog.
///
/// `wait_for_choice` must be cancel safe: it is dropped when the countdown
/// wins the race.
#[async_trait]
pub trait DialogSurface: Send + Sync {
    async fn open(&self, layout: &str, view: &DialogView) -> Result<(), DialogError>;

    fn update_countdown(&self, remaining: &str, progress: Option<u8>);

    async fn wait_for_choice(&self) -> Result<DialogChoice, DialogError>;

    async fn close(&self);
}
