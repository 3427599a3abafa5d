//! Pure countdown/timeout calculation for an open skip dialog.

use std::time::Duration;

use crate::domain::Segment;

/// Extra time past the segment length before an unanswered dialog declines
pub const TIMEOUT_GRACE_SECS: f64 = 5.0;

/// Playback this close to the segment end counts as having reached it
pub const END_TOLERANCE_SECS: f64 = 0.5;

/// Why a dialog closed without an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    SegmentEnded,
    TimedOut,
    PlaybackStopped,
}

/// Result of one countdown evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum CountdownState {
    Running {
        /// Time left in the segment as `MM:SS`
        remaining: String,
        /// Elapsed share of the segment, 0-100
        percent: u8,
    },
    Expired(Expiry),
}

/// Countdown for one segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    start: f64,
    end: f64,
    timeout: Duration,
}

impl Countdown {
    pub fn for_segment(segment: &Segment) -> Self {
        Self::new(segment.start(), segment.end())
    }

    pub fn new(start: f64, end: f64) -> Self {
        let duration = (end - start).max(0.0);
        Self {
            start,
            end,
            timeout: Duration::from_secs_f64(duration + TIMEOUT_GRACE_SECS),
        }
    }

    /// Wall-clock budget for the dialog: segment length plus grace
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Evaluate at playback `position` after `elapsed` wall time
    pub fn evaluate(&self, position: f64, elapsed: Duration) -> CountdownState {
        if position >= self.end - END_TOLERANCE_SECS {
            return CountdownState::Expired(Expiry::SegmentEnded);
        }
        if elapsed > self.timeout {
            return CountdownState::Expired(Expiry::TimedOut);
        }

        CountdownState::Running {
            remaining: format_clock(self.end - position),
            percent: self.percent(position),
        }
    }

    fn percent(&self, position: f64) -> u8 {
        let duration = self.end - self.start;
        if duration <= 0.0 {
            return 100;
        }
        let elapsed = (position - self.start).max(0.0);
        ((elapsed / duration) * 100.0).clamp(0.0, 100.0) as u8
    }
}

/// Format whole seconds as `MM:SS`, clamping negatives to zero
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
