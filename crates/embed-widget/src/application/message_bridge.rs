//! MessageBridge: the instance's link to the page-wide message channel.
//!
//! The bridge has two jobs:
//!
//! 1. **Lifecycle** – hold exactly one channel subscription while the
//!    instance is mounted.  [`MessageBridge::attach`] and
//!    [`MessageBridge::detach`] are idempotent; the subscription handle is the
//!    ownership flag, so a second attach cannot create a second subscription
//!    and a second detach cannot remove someone else's.
//!
//! 2. **Filtering and translation** – every message on the channel reaches
//!    every mounted embed, so each one is checked before it can have any
//!    effect:
//!
//! ```text
//! InboundMessage
//!   │ bridge detached?                       → drop
//!   │ origin not the scheduling service?     → drop
//!   │ source frame known and not ours?       → drop   (when correlation is on)
//!   │ not {event:"calendly.<known>", ...}?   → drop
//!   ▼
//! page_height             → BridgeAction::UpdateHeight(payload.height)
//! event_scheduled         → BridgeAction::Emit("scheduled")
//! date_and_time_selected  → BridgeAction::Emit("datetime-selected")
//! event_type_viewed       → BridgeAction::Emit("viewed")
//! ```
//!
//! # Known limitation
//!
//! The service's messages carry no per-instance correlation id.  When the
//! host cannot say which frame posted a message (`source` is `None`), two
//! embeds on the same page both react to it.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use embed_core::{classify, EmbedEvent, FrameId, InboundMessage, OriginPolicy};

use crate::domain::channel::{MessageChannel, SubscriptionId};
use crate::domain::events::{InstanceId, OutboundEvent, OutboundEventKind};

// ── Host capability ───────────────────────────────────────────────────────────

/// The host's ability to receive events emitted by an embed.
///
/// Injected into the bridge so the filtering and translation logic does not
/// depend on how a particular host propagates events.
#[cfg_attr(test, mockall::automock)]
pub trait EventDispatcher: Send + Sync {
    /// Delivers one outbound event to the host.
    fn dispatch(&self, event: OutboundEvent);
}

// ── Bridge ────────────────────────────────────────────────────────────────────

/// What the instance should do with an accepted message.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeAction {
    /// Pass the raw reported height to the height controller.
    UpdateHeight(Option<Value>),
    /// Dispatch an event to the host.
    Emit(OutboundEvent),
}

/// Per-instance subscription and message filter.
pub struct MessageBridge {
    policy: OriginPolicy,
    correlate_frames: bool,
    subscription: Option<SubscriptionId>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl MessageBridge {
    /// Creates a detached bridge.
    ///
    /// With `correlate_frames`, a message that names its source frame is only
    /// accepted when that frame is the instance's current one.
    pub fn new(
        policy: OriginPolicy,
        correlate_frames: bool,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            policy,
            correlate_frames,
            subscription: None,
            dispatcher,
        }
    }

    /// Subscribes `instance` to the channel.
    ///
    /// Returns `false` without touching the channel if already attached.
    pub fn attach(&mut self, channel: &mut MessageChannel, instance: InstanceId) -> bool {
        if self.subscription.is_some() {
            return false;
        }
        self.subscription = Some(channel.subscribe(instance));
        true
    }

    /// Removes this bridge's subscription.
    ///
    /// Returns `false` if the bridge was not attached.
    pub fn detach(&mut self, channel: &mut MessageChannel) -> bool {
        match self.subscription.take() {
            Some(id) => {
                channel.unsubscribe(id);
                true
            }
            None => false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }

    /// Filters and translates one message.
    ///
    /// `current_frame` is the frame in the instance's current structure, if
    /// any.  Returns `None` for every message that must have no effect.
    pub fn interpret(
        &self,
        message: &InboundMessage,
        current_frame: Option<FrameId>,
    ) -> Option<BridgeAction> {
        if !self.is_attached() {
            return None;
        }
        if !self.policy.is_trusted(&message.origin) {
            trace!(origin = %message.origin, "dropping message from untrusted origin");
            return None;
        }
        if self.correlate_frames {
            if let Some(source) = message.source {
                if Some(source) != current_frame {
                    trace!(%source, "dropping message from another frame");
                    return None;
                }
            }
        }
        let Some(event) = classify(&message.data) else {
            trace!("dropping unrecognized message");
            return None;
        };

        let action = match event {
            EmbedEvent::PageHeight { height } => BridgeAction::UpdateHeight(height),
            EmbedEvent::EventScheduled(payload) => {
                BridgeAction::Emit(OutboundEvent::new(OutboundEventKind::Scheduled, payload))
            }
            EmbedEvent::DateAndTimeSelected(payload) => BridgeAction::Emit(OutboundEvent::new(
                OutboundEventKind::DatetimeSelected,
                payload,
            )),
            EmbedEvent::EventTypeViewed(payload) => {
                BridgeAction::Emit(OutboundEvent::new(OutboundEventKind::Viewed, payload))
            }
        };
        Some(action)
    }

    /// Hands an event to the host.
    pub fn forward(&self, event: OutboundEvent) {
        self.dispatcher.dispatch(event);
    }
}

impl fmt::Debug for MessageBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBridge")
            .field("policy", &self.policy)
            .field("correlate_frames", &self.correlate_frames)
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
