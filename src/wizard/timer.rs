//! One-shot auto-reset timer for the success screen
//!
//! The timer never touches wizard state. When it fires it posts a
//! [`WizardEvent`] to the wizard's event channel and the host applies it with
//! [`Wizard::handle_event`](super::Wizard::handle_event). Dropping the handle
//! cancels the task.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

/// Events produced by the wizard's deferred work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardEvent {
    /// The success screen's reset delay elapsed
    ResetElapsed { generation: u64 },
}

/// Handle to a scheduled reset; cancelling happens on drop
#[derive(Debug)]
pub struct ResetTimer {
    generation: u64,
    token: CancellationToken,
    _guard: DropGuard,
}

impl ResetTimer {
    /// Schedule a reset on the current tokio runtime.
    ///
    /// Returns `None` when called outside a runtime; the success screen then
    /// stays until the host resets the wizard explicitly.
    pub fn schedule(
        delay: Duration,
        generation: u64,
        events: UnboundedSender<WizardEvent>,
    ) -> Option<Self> {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!("no tokio runtime, auto-reset disabled");
                return None;
            }
        };

        let token = CancellationToken::new();
        let task_token = token.clone();
        handle.spawn(async move {
            tokio::select! {
                _ = task_token.cancelled() => {
                    debug!(generation, "auto-reset cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    debug!(generation, "auto-reset elapsed");
                    let _ = events.send(WizardEvent::ResetElapsed { generation });
                }
            }
        });

        debug!(generation, delay_ms = delay.as_millis() as u64, "auto-reset scheduled");
        Some(Self {
            generation,
            _guard: token.clone().drop_guard(),
            token,
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = ResetTimer::schedule(Duration::from_secs(8), 3, tx).unwrap();
        assert_eq!(timer.generation(), 3);
        let event = rx.recv().await.unwrap();
        assert_eq!(event, WizardEvent::ResetElapsed { generation: 3 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = ResetTimer::schedule(Duration::from_secs(8), 1, tx).unwrap();
        drop(timer);
        // The task exits without sending and drops the only sender
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn test_schedule_outside_runtime() {
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(ResetTimer::schedule(Duration::from_secs(1), 1, tx).is_none());
    }
}
