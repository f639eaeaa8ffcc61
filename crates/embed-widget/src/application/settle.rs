//! Deferred settle action after the frame finishes loading.
//!
//! Hiding the loading overlay the instant the frame reports `load` causes a
//! visible flash while the embedded page lays itself out.  The instance
//! instead arms a short timer and hides the overlay when it fires.
//!
//! # Cancellation model
//!
//! Each armed timer is identified by a [`SettleToken`].  The instance keeps
//! the token of its one pending timer.  Unmounting or re-rendering cancels
//! that token through the [`SettleScheduler`], and a completion that still
//! arrives for a token the instance no longer holds is ignored.  Both halves
//! are needed: cancellation stops the timer task, and the token check covers
//! a completion that was already queued when cancellation happened.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::events::InstanceId;

/// Delay between frame load and hiding the loading overlay.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Identifies one armed settle timer.  Unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettleToken(u64);

impl SettleToken {
    /// Allocates a token that has never been handed out before.
    pub fn next() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

/// Arms and cancels settle timers on behalf of instances.
///
/// When a timer fires, the implementation must route the completion back to
/// the owning instance's `on_settle_elapsed` on the host's event loop, never
/// concurrently with another handler.
#[cfg_attr(test, mockall::automock)]
pub trait SettleScheduler: Send + Sync {
    /// Arms a timer that completes after `delay`.
    fn schedule(&self, instance: InstanceId, token: SettleToken, delay: Duration);

    /// Cancels a pending timer.  Unknown or already-fired tokens are ignored.
    fn cancel(&self, token: SettleToken);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique() {
        let a = SettleToken::next();
        let b = SettleToken::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_default_delay_is_500ms() {
        assert_eq!(DEFAULT_SETTLE_DELAY, Duration::from_millis(500));
    }
}
