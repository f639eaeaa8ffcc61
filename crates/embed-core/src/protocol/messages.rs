//! Inbound message envelope and event vocabulary.
//!
//! The embedded page posts JSON objects of the form:
//!
//! ```json
//! {"event":"calendly.page_height","payload":{"height":1350}}
//! {"event":"calendly.event_scheduled","payload":{"event":{"uri":"..."}}}
//! ```
//!
//! Event names are namespaced with the `calendly.` prefix.  Only four names
//! are recognized; anything else, including well-formed messages from other
//! widgets sharing the channel, classifies to `None` and is dropped.
//!
//! # Why classify into an enum?
//!
//! The channel is shared with arbitrary third-party scripts, so the raw JSON
//! is untrusted.  Converting it once into [`EmbedEvent`] keeps every later
//! decision a simple `match`, and makes it a compile-time error to forget a
//! recognized event in the dispatch table.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ids::FrameId;

/// Namespace prefix carried by every event name the service emits.
pub const EVENT_PREFIX: &str = "calendly.";

// ── Envelope ──────────────────────────────────────────────────────────────────

/// One message received on the cross-document channel.
///
/// Not persisted: it is handed to every subscriber and then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Origin of the posting document, e.g. `"https://calendly.com"`.
    pub origin: String,

    /// The posted data, expected to be `{ "event": ..., "payload": ... }`.
    pub data: Value,

    /// The frame that posted the message, when the host can tell.
    ///
    /// The service's own protocol carries no per-instance correlation id, so
    /// this is the only way to tell two embeds on one page apart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<FrameId>,
}

impl InboundMessage {
    pub fn new(origin: impl Into<String>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            data,
            source: None,
        }
    }

    /// Attaches the posting frame's id.
    pub fn with_source(mut self, frame: FrameId) -> Self {
        self.source = Some(frame);
        self
    }
}

/// The `{event, payload}` shape the service posts.
#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    payload: Value,
}

// ── Event vocabulary ──────────────────────────────────────────────────────────

/// A recognized event from the embedded page.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedEvent {
    /// The page's content height changed.
    ///
    /// `height` is left uninterpreted here; the height policy decides whether
    /// it is usable.
    PageHeight {
        /// The raw `payload.height` value, if any.
        height: Option<Value>,
    },
    /// The invitee completed a booking.
    EventScheduled(Value),
    /// The invitee picked a date and time.
    DateAndTimeSelected(Value),
    /// The invitee opened an event type page.
    EventTypeViewed(Value),
}

impl EmbedEvent {
    /// The unprefixed wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PageHeight { .. } => "page_height",
            Self::EventScheduled(_) => "event_scheduled",
            Self::DateAndTimeSelected(_) => "date_and_time_selected",
            Self::EventTypeViewed(_) => "event_type_viewed",
        }
    }
}

/// Classifies posted message data into a recognized event.
///
/// Returns `None` for anything that is not an object with a string `event`
/// field carrying the [`EVENT_PREFIX`] and one of the four known names.  A
/// missing `payload` is treated as `null`.
///
/// # Example
///
/// ```rust
/// use embed_core::{classify, EmbedEvent};
/// use serde_json::json;
///
/// let data = json!({"event": "calendly.event_scheduled", "payload": {"foo": 1}});
/// assert_eq!(classify(&data), Some(EmbedEvent::EventScheduled(json!({"foo": 1}))));
/// assert_eq!(classify(&json!({"event": "other.page_height"})), None);
/// ```
pub fn classify(data: &Value) -> Option<EmbedEvent> {
    let Envelope { event, payload } = Envelope::deserialize(data).ok()?;
    let name = event.strip_prefix(EVENT_PREFIX)?;

    let event = match name {
        "page_height" => EmbedEvent::PageHeight {
            height: payload.get("height").cloned(),
        },
        "event_scheduled" => EmbedEvent::EventScheduled(payload),
        "date_and_time_selected" => EmbedEvent::DateAndTimeSelected(payload),
        "event_type_viewed" => EmbedEvent::EventTypeViewed(payload),
        _ => return None,
    };
    Some(event)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
