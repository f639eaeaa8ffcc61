//! Host-side event delivery.
//!
//! [`HostEventTarget`] is the [`EventDispatcher`] handed to each instance.
//! It tags every outbound event with the widget's name and forwards it on an
//! mpsc channel, where the host (the `embed-host` binary prints them as JSON
//! lines) picks it up.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::application::message_bridge::EventDispatcher;
use crate::domain::events::OutboundEvent;

/// An outbound event as observed by the host, tagged with its source widget.
///
/// Serializes flat:
/// `{"widget":"sales","event":"scheduled","payload":{..},"bubbles":true,"composed":true}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchedEvent {
    pub widget: String,
    #[serde(flatten)]
    pub event: OutboundEvent,
}

/// Delivers one widget's events to the host sink.
#[derive(Debug, Clone)]
pub struct HostEventTarget {
    widget: String,
    sink: mpsc::UnboundedSender<DispatchedEvent>,
}

impl HostEventTarget {
    pub fn new(widget: impl Into<String>, sink: mpsc::UnboundedSender<DispatchedEvent>) -> Self {
        Self {
            widget: widget.into(),
            sink,
        }
    }
}

impl EventDispatcher for HostEventTarget {
    fn dispatch(&self, event: OutboundEvent) {
        debug!(widget = %self.widget, event = event.kind.name(), "dispatching event to host");
        let dispatched = DispatchedEvent {
            widget: self.widget.clone(),
            event,
        };
        if self.sink.send(dispatched).is_err() {
            warn!(widget = %self.widget, "host event sink closed; event lost");
        }
    }
}
