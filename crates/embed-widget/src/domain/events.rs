//! Outbound application events and instance identity.
//!
//! When the invitee interacts with the embedded page, the embed re-announces
//! a few of those interactions to the host as its own events:
//!
//! | inbound event            | outbound event      |
//! |--------------------------|---------------------|
//! | `event_scheduled`        | `scheduled`         |
//! | `date_and_time_selected` | `datetime-selected` |
//! | `event_type_viewed`      | `viewed`            |
//!
//! The payload is forwarded untouched.  Events are marked `bubbles` and
//! `composed` so listeners on any ancestor of the embed, outside its
//! render-isolation boundary, receive them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Identifies one embed instance on a host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget-{}", self.0.simple())
    }
}

/// The three event names the embed emits to its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutboundEventKind {
    Scheduled,
    DatetimeSelected,
    Viewed,
}

impl OutboundEventKind {
    /// The host-visible event name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::DatetimeSelected => "datetime-selected",
            Self::Viewed => "viewed",
        }
    }
}

impl fmt::Display for OutboundEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An event the embed dispatches to its host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEvent {
    #[serde(rename = "event")]
    pub kind: OutboundEventKind,
    /// The inbound payload, unchanged.
    pub payload: Value,
    /// Propagates up through ancestors.
    pub bubbles: bool,
    /// Crosses the render-isolation boundary.
    pub composed: bool,
}

impl OutboundEvent {
    /// Creates an event that bubbles and crosses the isolation boundary.
    pub fn new(kind: OutboundEventKind, payload: Value) -> Self {
        Self {
            kind,
            payload,
            bubbles: true,
            composed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_names_match_serde_names() {
        for kind in [
            OutboundEventKind::Scheduled,
            OutboundEventKind::DatetimeSelected,
            OutboundEventKind::Viewed,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
        }
    }

    #[test]
    fn test_new_event_escapes_isolation_boundary() {
        let ev = OutboundEvent::new(OutboundEventKind::Viewed, json!({"a": 1}));
        assert!(ev.bubbles);
        assert!(ev.composed);
    }

    #[test]
    fn test_event_serializes_with_event_field() {
        let ev = OutboundEvent::new(OutboundEventKind::DatetimeSelected, json!({"foo": 1}));
        let value = serde_json::to_value(&ev).unwrap();
        assert_eq!(
            value,
            json!({"event": "datetime-selected", "payload": {"foo": 1}, "bubbles": true, "composed": true})
        );
    }
}
