//! Tokio-backed settle timers.
//!
//! Each armed timer is a spawned task that sleeps for the settle delay and
//! then posts [`HostEvent::SettleElapsed`] back onto the host's event queue.
//! The instance therefore sees the completion on the same loop as every other
//! signal, never concurrently with another handler.
//!
//! Cancelling aborts the task.  A completion that was already queued before
//! the abort is harmless: the instance no longer holds that token.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{trace, warn};

use crate::application::settle::{SettleScheduler, SettleToken};
use crate::domain::events::InstanceId;
use crate::infrastructure::host::HostEvent;

/// [`SettleScheduler`] that runs timers on the current tokio runtime.
///
/// `schedule` must be called from within a runtime context.
#[derive(Debug, Clone)]
pub struct TokioSettleScheduler {
    events: mpsc::UnboundedSender<HostEvent>,
    timers: Arc<Mutex<HashMap<SettleToken, AbortHandle>>>,
}

impl TokioSettleScheduler {
    pub fn new(events: mpsc::UnboundedSender<HostEvent>) -> Self {
        Self {
            events,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of timers armed and not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.timers.lock().map(|timers| timers.len()).unwrap_or(0)
    }
}

impl SettleScheduler for TokioSettleScheduler {
    fn schedule(&self, instance: InstanceId, token: SettleToken, delay: Duration) {
        let Ok(mut timers) = self.timers.lock() else {
            warn!(%instance, "settle timer registry poisoned; timer not armed");
            return;
        };

        let events = self.events.clone();
        let registry = Arc::clone(&self.timers);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Ok(mut timers) = registry.lock() {
                timers.remove(&token);
            }
            if events
                .send(HostEvent::SettleElapsed { instance, token })
                .is_err()
            {
                trace!(%instance, "host loop gone; settle completion dropped");
            }
        });

        // The task cannot remove its entry before this insert: it needs the
        // lock held here.
        timers.insert(token, task.abort_handle());
    }

    fn cancel(&self, token: SettleToken) {
        let handle = match self.timers.lock() {
            Ok(mut timers) => timers.remove(&token),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            handle.abort();
            trace!(?token, "settle timer cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> (TokioSettleScheduler, mpsc::UnboundedReceiver<HostEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TokioSettleScheduler::new(tx), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_delay() {
        // Arrange
        let (scheduler, mut rx) = scheduler();
        let instance = InstanceId::new();
        let token = SettleToken::next();

        // Act
        scheduler.schedule(instance, token, Duration::from_millis(500));
        tokio::time::sleep(Duration::from_millis(499)).await;
        let early = rx.try_recv();
        let event = rx.recv().await;

        // Assert
        assert!(early.is_err());
        assert!(matches!(
            event,
            Some(HostEvent::SettleElapsed { instance: i, token: t }) if i == instance && t == token
        ));
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        let (scheduler, mut rx) = scheduler();
        let token = SettleToken::next();

        scheduler.schedule(InstanceId::new(), token, Duration::from_millis(500));
        assert_eq!(scheduler.pending(), 1);
        scheduler.cancel(token);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_unknown_token_is_noop() {
        let (scheduler, mut rx) = scheduler();
        let kept = SettleToken::next();
        scheduler.schedule(InstanceId::new(), kept, Duration::from_millis(100));

        scheduler.cancel(SettleToken::next());

        assert!(matches!(
            rx.recv().await,
            Some(HostEvent::SettleElapsed { token, .. }) if token == kept
        ));
    }
}
