//! JSON-line commands accepted by `embed-host run` on stdin.
//!
//! One JSON object per line, discriminated by `"type"`:
//!
//! ```text
//! {"type":"mount","widget":"sales","attributes":{"url":"https://calendly.com/acme"}}
//! {"type":"set_attribute","widget":"sales","attribute":"height","value":"900"}
//! {"type":"frame_loaded","widget":"sales"}
//! {"type":"message","origin":"https://calendly.com","data":{"event":"calendly.page_height","payload":{"height":1200}},"source":"sales"}
//! {"type":"render","widget":"sales"}
//! {"type":"unmount","widget":"sales"}
//! ```
//!
//! `source` on a message names the widget whose frame posted it.  Omit it to
//! simulate a message the host cannot attribute to a frame.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

use embed_core::{InboundMessage, WidgetAttributes};

use crate::infrastructure::host::{HostEvent, WidgetSnapshot};

/// One line of host input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostCommand {
    Mount {
        widget: String,
        #[serde(default)]
        attributes: WidgetAttributes,
    },
    SetAttribute {
        widget: String,
        attribute: String,
        /// `null` or absent removes the attribute.
        #[serde(default)]
        value: Option<String>,
    },
    Message {
        origin: String,
        data: Value,
        #[serde(default)]
        source: Option<String>,
    },
    FrameLoaded {
        widget: String,
    },
    Unmount {
        widget: String,
    },
    Render {
        widget: String,
    },
}

/// Receives the answer to a [`HostCommand::Render`].
pub type SnapshotReply = oneshot::Receiver<Option<WidgetSnapshot>>;

impl HostCommand {
    /// Parses one input line.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the line is not a valid command.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Converts the command into a host event.  `Render` also returns the
    /// receiver its snapshot will arrive on.
    pub fn into_event(self) -> (HostEvent, Option<SnapshotReply>) {
        match self {
            Self::Mount { widget, attributes } => (
                HostEvent::Mount {
                    name: widget,
                    attributes,
                },
                None,
            ),
            Self::SetAttribute {
                widget,
                attribute,
                value,
            } => (
                HostEvent::SetAttribute {
                    name: widget,
                    attribute,
                    value,
                },
                None,
            ),
            Self::Message {
                origin,
                data,
                source,
            } => (
                HostEvent::PostMessage {
                    message: InboundMessage::new(origin, data),
                    from_widget: source,
                },
                None,
            ),
            Self::FrameLoaded { widget } => (
                HostEvent::FrameLoaded {
                    name: widget,
                    frame: None,
                },
                None,
            ),
            Self::Unmount { widget } => (HostEvent::Unmount { name: widget }, None),
            Self::Render { widget } => {
                let (reply, rx) = oneshot::channel();
                (HostEvent::Snapshot { name: widget, reply }, Some(rx))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_mount_with_attributes() {
        // Arrange
        let line = r#"{"type":"mount","widget":"sales","attributes":{"url":"https://calendly.com/acme","height":"900"}}"#;

        // Act
        let cmd = HostCommand::parse(line).unwrap();

        // Assert
        match cmd {
            HostCommand::Mount { widget, attributes } => {
                assert_eq!(widget, "sales");
                assert_eq!(attributes.get("height"), Some("900"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_set_attribute_without_value_removes() {
        let cmd = HostCommand::parse(r#"{"type":"set_attribute","widget":"w","attribute":"url"}"#).unwrap();
        assert_eq!(
            cmd,
            HostCommand::SetAttribute {
                widget: "w".into(),
                attribute: "url".into(),
                value: None
            }
        );
    }

    #[test]
    fn test_message_becomes_post_message_event() {
        let cmd = HostCommand::parse(
            r#"{"type":"message","origin":"https://calendly.com","data":{"event":"calendly.page_height"},"source":"w"}"#,
        )
        .unwrap();

        let (event, reply) = cmd.into_event();

        assert!(reply.is_none());
        match event {
            HostEvent::PostMessage {
                message,
                from_widget,
            } => {
                assert_eq!(message.origin, "https://calendly.com");
                assert_eq!(message.data, json!({"event": "calendly.page_height"}));
                assert_eq!(from_widget.as_deref(), Some("w"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_render_returns_reply_receiver() {
        let (event, reply) = HostCommand::Render { widget: "w".into() }.into_event();
        assert!(matches!(event, HostEvent::Snapshot { ref name, .. } if name == "w"));
        assert!(reply.is_some());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(HostCommand::parse(r#"{"type":"explode"}"#).is_err());
        assert!(HostCommand::parse("not json").is_err());
    }
}
