//! Background countdown task for an open dialog.
//!
//! The task polls the player on its own cadence, pushes countdown text to the
//! surface, and posts a single terminal [`Expiry`] through a oneshot channel.
//! It is always stopped and joined before the dialog returns.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::adapters::Player;

use super::countdown::{Countdown, CountdownState, Expiry};
use super::DialogSurface;

/// Default polling cadence while a dialog is open
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_millis(250);

/// Handle to a running countdown task
pub struct CountdownTimer {
    stop_tx: mpsc::Sender<()>,
    result_rx: oneshot::Receiver<Expiry>,
    task: JoinHandle<()>,
}

impl CountdownTimer {
    /// Spawn the countdown task
    pub fn spawn(
        player: Arc<dyn Player>,
        surface: Arc<dyn DialogSurface>,
        countdown: Countdown,
        show_progress: bool,
        interval: Duration,
    ) -> Self {
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        let (result_tx, result_rx) = oneshot::channel::<Expiry>();

        let task = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let expiry = loop {
                tokio::select! {
                    _ = stop_rx.recv() => break None,
                    _ = ticker.tick() => {
                        if !player.is_playing_video() {
                            break Some(Expiry::PlaybackStopped);
                        }
                        let Ok(position) = player.time() else {
                            break Some(Expiry::PlaybackStopped);
                        };

                        match countdown.evaluate(position, started.elapsed()) {
                            CountdownState::Running { remaining, percent } => {
                                surface.update_countdown(&remaining, show_progress.then_some(percent));
                            }
                            CountdownState::Expired(reason) => break Some(reason),
                        }
                    }
                }
            };

            match expiry {
                Some(reason) => {
                    debug!(?reason, "Countdown expired");
                    let _ = result_tx.send(reason);
                }
                None => debug!("Countdown stopped"),
            }
        });

        Self {
            stop_tx,
            result_rx,
            task,
        }
    }

    /// Resolve when the countdown expires. Never resolves once stopped.
    pub async fn expired(&mut self) -> Expiry {
        match (&mut self.result_rx).await {
            Ok(reason) => reason,
            Err(_) => std::future::pending().await,
        }
    }

    /// Stop the task and wait for it to finish
    pub async fn stop(self) {
        // The task may already have exited after posting its result
        let _ = self.stop_tx.send(()).await;
        let _ = self.task.await;
    }
}
