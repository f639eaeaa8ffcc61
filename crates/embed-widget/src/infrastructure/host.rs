//! HostPage: the page all embed instances live on.
//!
//! # Single-threaded event loop
//!
//! A browser page runs every handler on one thread, one at a time.  The host
//! page reproduces that with a single tokio mpsc queue of [`HostEvent`]s
//! consumed by [`HostPage::run`]:
//!
//! ```text
//! stdin reader ──┐
//! settle timers ─┼──► mpsc::UnboundedSender<HostEvent> ──► HostPage::run
//! tests ─────────┘                                          │
//!                                                           ├─ WidgetInstance "sales"
//!                                                           ├─ WidgetInstance "support"
//!                                                           └─ MessageChannel
//! ```
//!
//! Because only the loop touches instances, no instance state is ever behind a
//! lock, and a settle completion can never interleave with a message handler.
//!
//! # Message broadcast
//!
//! [`HostEvent::PostMessage`] is delivered to every instance subscribed to the
//! channel at the moment it is handled.  Each instance decides for itself
//! whether the message is trusted and meant for it.

use std::collections::{BTreeMap, HashMap};
use std::ops::ControlFlow;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use embed_core::{FrameId, InboundMessage, WidgetAttributes};

use crate::application::instance::{WidgetInstance, WidgetSettings};
use crate::application::settle::{SettleScheduler, SettleToken};
use crate::domain::channel::MessageChannel;
use crate::domain::events::InstanceId;
use crate::domain::state::InstanceState;
use crate::infrastructure::dispatcher::{DispatchedEvent, HostEventTarget};

// ── Events and errors ─────────────────────────────────────────────────────────

/// Everything that can happen on the host page.
#[derive(Debug)]
pub enum HostEvent {
    /// Create and mount a widget under a page-unique name.
    Mount {
        name: String,
        attributes: WidgetAttributes,
    },
    /// Set (`Some`) or remove (`None`) one attribute of a mounted widget.
    SetAttribute {
        name: String,
        attribute: String,
        value: Option<String>,
    },
    /// A message posted on the page channel.  `from_widget` names the widget
    /// whose frame posted it, when the host knows.
    PostMessage {
        message: InboundMessage,
        from_widget: Option<String>,
    },
    /// A widget's frame finished loading.  `None` means its current frame.
    FrameLoaded {
        name: String,
        frame: Option<FrameId>,
    },
    /// A settle timer fired.
    SettleElapsed {
        instance: InstanceId,
        token: SettleToken,
    },
    /// Unmount and discard a widget.
    Unmount { name: String },
    /// Report a widget's current state and markup.
    Snapshot {
        name: String,
        reply: oneshot::Sender<Option<WidgetSnapshot>>,
    },
    /// Unmount everything and stop the loop.
    Shutdown,
}

/// Error type for host page operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("no widget named {0:?} is mounted")]
    UnknownWidget(String),

    #[error("a widget named {0:?} is already mounted")]
    DuplicateName(String),

    #[error("host event loop has stopped")]
    QueueClosed,
}

/// Point-in-time view of one widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetSnapshot {
    pub name: String,
    pub instance: InstanceId,
    pub state: InstanceState,
    pub html: String,
}

// ── Handle ────────────────────────────────────────────────────────────────────

/// Cloneable sender side of a running [`HostPage`].
#[derive(Debug, Clone)]
pub struct HostHandle {
    events: mpsc::UnboundedSender<HostEvent>,
}

impl HostHandle {
    pub fn new(events: mpsc::UnboundedSender<HostEvent>) -> Self {
        Self { events }
    }

    /// Queues an event for the loop.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::QueueClosed`] once the loop has stopped.
    pub fn send(&self, event: HostEvent) -> Result<(), HostError> {
        self.events.send(event).map_err(|_| HostError::QueueClosed)
    }

    /// Requests a snapshot of `name` and waits for the loop to answer.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::QueueClosed`] if the loop stopped before replying.
    pub async fn snapshot(&self, name: &str) -> Result<Option<WidgetSnapshot>, HostError> {
        let (reply, rx) = oneshot::channel();
        self.send(HostEvent::Snapshot {
            name: name.to_string(),
            reply,
        })?;
        rx.await.map_err(|_| HostError::QueueClosed)
    }
}

// ── Host page ─────────────────────────────────────────────────────────────────

/// Owns the page channel and every mounted instance.
pub struct HostPage {
    settings: WidgetSettings,
    channel: MessageChannel,
    instances: HashMap<InstanceId, WidgetInstance>,
    names: BTreeMap<String, InstanceId>,
    scheduler: Arc<dyn SettleScheduler>,
    outbound: mpsc::UnboundedSender<DispatchedEvent>,
}

impl HostPage {
    pub fn new(
        settings: WidgetSettings,
        scheduler: Arc<dyn SettleScheduler>,
        outbound: mpsc::UnboundedSender<DispatchedEvent>,
    ) -> Self {
        Self {
            settings,
            channel: MessageChannel::new(),
            instances: HashMap::new(),
            names: BTreeMap::new(),
            scheduler,
            outbound,
        }
    }

    /// Creates and mounts a widget.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::DuplicateName`] if `name` is already mounted.
    pub fn mount(&mut self, name: &str, attributes: WidgetAttributes) -> Result<InstanceId, HostError> {
        if self.names.contains_key(name) {
            return Err(HostError::DuplicateName(name.to_string()));
        }
        let id = InstanceId::new();
        let dispatcher = Arc::new(HostEventTarget::new(name, self.outbound.clone()));
        let mut instance = WidgetInstance::new(
            id,
            attributes,
            &self.settings,
            dispatcher,
            Arc::clone(&self.scheduler),
        );
        instance.mount(&mut self.channel);
        self.names.insert(name.to_string(), id);
        self.instances.insert(id, instance);
        info!(widget = name, instance = %id, "widget mounted");
        Ok(id)
    }

    /// Unmounts and discards a widget.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnknownWidget`] if `name` is not mounted.
    pub fn unmount(&mut self, name: &str) -> Result<(), HostError> {
        let id = self
            .names
            .remove(name)
            .ok_or_else(|| HostError::UnknownWidget(name.to_string()))?;
        if let Some(mut instance) = self.instances.remove(&id) {
            instance.unmount(&mut self.channel);
        }
        info!(widget = name, "widget unmounted");
        Ok(())
    }

    /// Sets or removes one attribute.  Returns `true` if the widget re-rendered.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnknownWidget`] if `name` is not mounted.
    pub fn set_attribute(
        &mut self,
        name: &str,
        attribute: &str,
        value: Option<&str>,
    ) -> Result<bool, HostError> {
        Ok(self.instance_mut(name)?.set_attribute(attribute, value))
    }

    /// Broadcasts a message to every subscribed instance.
    ///
    /// Returns how many instances acted on it.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnknownWidget`] if `from_widget` names a widget
    /// that is not mounted.
    pub fn post_message(
        &mut self,
        mut message: InboundMessage,
        from_widget: Option<&str>,
    ) -> Result<usize, HostError> {
        if let Some(sender) = from_widget {
            if let Some(frame) = self.instance(sender)?.structure().frame_id() {
                message = message.with_source(frame);
            }
        }

        let mut accepted = 0;
        for id in self.channel.subscribers() {
            if let Some(instance) = self.instances.get_mut(&id) {
                if instance.on_message(&message) {
                    accepted += 1;
                }
            }
        }
        debug!(origin = %message.origin, accepted, "message broadcast");
        Ok(accepted)
    }

    /// Signals that a widget's frame loaded.  Returns `true` if it was the
    /// widget's current frame and the widget was loading.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnknownWidget`] if `name` is not mounted.
    pub fn frame_loaded(&mut self, name: &str, frame: Option<FrameId>) -> Result<bool, HostError> {
        let instance = self.instance_mut(name)?;
        let frame = frame.or_else(|| instance.structure().frame_id());
        Ok(frame.is_some_and(|frame| instance.on_frame_load(frame)))
    }

    /// Routes a settle completion to its instance.  Completions for discarded
    /// instances are ignored.
    pub fn settle_elapsed(&mut self, instance: InstanceId, token: SettleToken) -> bool {
        match self.instances.get_mut(&instance) {
            Some(target) => target.on_settle_elapsed(token),
            None => false,
        }
    }

    pub fn snapshot(&self, name: &str) -> Option<WidgetSnapshot> {
        let instance = self.instance(name).ok()?;
        Some(WidgetSnapshot {
            name: name.to_string(),
            instance: instance.id(),
            state: instance.state(),
            html: instance.structure().to_html(),
        })
    }

    /// Looks up a mounted widget by name.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnknownWidget`] if `name` is not mounted.
    pub fn instance(&self, name: &str) -> Result<&WidgetInstance, HostError> {
        self.names
            .get(name)
            .and_then(|id| self.instances.get(id))
            .ok_or_else(|| HostError::UnknownWidget(name.to_string()))
    }

    /// Names of all mounted widgets, in order.
    pub fn widget_names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    pub fn channel(&self) -> &MessageChannel {
        &self.channel
    }

    /// Handles one event.  Returns `Break` on [`HostEvent::Shutdown`].
    pub fn handle_event(&mut self, event: HostEvent) -> ControlFlow<()> {
        let result = match event {
            HostEvent::Mount { name, attributes } => self.mount(&name, attributes).map(drop),
            HostEvent::SetAttribute {
                name,
                attribute,
                value,
            } => self
                .set_attribute(&name, &attribute, value.as_deref())
                .map(drop),
            HostEvent::PostMessage {
                message,
                from_widget,
            } => self.post_message(message, from_widget.as_deref()).map(drop),
            HostEvent::FrameLoaded { name, frame } => self.frame_loaded(&name, frame).map(drop),
            HostEvent::SettleElapsed { instance, token } => {
                self.settle_elapsed(instance, token);
                Ok(())
            }
            HostEvent::Unmount { name } => self.unmount(&name),
            HostEvent::Snapshot { name, reply } => {
                // The requester may have given up waiting.
                let _ = reply.send(self.snapshot(&name));
                Ok(())
            }
            HostEvent::Shutdown => return ControlFlow::Break(()),
        };
        if let Err(error) = result {
            warn!(%error, "host event rejected");
        }
        ControlFlow::Continue(())
    }

    /// Runs the event loop until [`HostEvent::Shutdown`] or every sender is
    /// dropped, then unmounts all widgets.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<HostEvent>) {
        info!("host page running");
        while let Some(event) = events.recv().await {
            if self.handle_event(event).is_break() {
                break;
            }
        }
        self.shutdown();
        info!("host page stopped");
    }

    fn shutdown(&mut self) {
        let names: Vec<String> = self.names.keys().cloned().collect();
        for name in names {
            // Names come from the map itself.
            let _ = self.unmount(&name);
        }
    }

    fn instance_mut(&mut self, name: &str) -> Result<&mut WidgetInstance, HostError> {
        self.names
            .get(name)
            .and_then(|id| self.instances.get_mut(id))
            .ok_or_else(|| HostError::UnknownWidget(name.to_string()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use embed_core::EmbedContext;
    use serde_json::json;

    use crate::domain::events::OutboundEventKind;
    use crate::domain::state::RenderState;

    const TRUSTED: &str = "https://calendly.com";

    /// Records scheduled timers so tests can fire them by hand.
    #[derive(Default)]
    struct ManualScheduler {
        armed: Mutex<Vec<(InstanceId, SettleToken)>>,
        cancelled: Mutex<Vec<SettleToken>>,
    }

    impl ManualScheduler {
        fn armed(&self) -> Vec<(InstanceId, SettleToken)> {
            self.armed.lock().unwrap().clone()
        }
    }

    impl SettleScheduler for ManualScheduler {
        fn schedule(&self, instance: InstanceId, token: SettleToken, _delay: Duration) {
            self.armed.lock().unwrap().push((instance, token));
        }

        fn cancel(&self, token: SettleToken) {
            self.cancelled.lock().unwrap().push(token);
        }
    }

    fn page() -> (HostPage, Arc<ManualScheduler>, mpsc::UnboundedReceiver<DispatchedEvent>) {
        let scheduler = Arc::new(ManualScheduler::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let settings = WidgetSettings::new(EmbedContext::new("host.example"));
        (HostPage::new(settings, scheduler.clone(), tx), scheduler, rx)
    }

    fn attrs(url: &str) -> WidgetAttributes {
        WidgetAttributes::new().with("url", url)
    }

    fn event(name: &str, payload: serde_json::Value) -> InboundMessage {
        InboundMessage::new(TRUSTED, json!({ "event": format!("calendly.{name}"), "payload": payload }))
    }

    #[test]
    fn test_mount_registers_widget_on_channel() {
        // Arrange
        let (mut page, _, _rx) = page();

        // Act
        let id = page.mount("sales", attrs("https://calendly.com/acme")).unwrap();

        // Assert
        assert_eq!(page.channel().subscription_count(id), 1);
        assert_eq!(page.widget_names().collect::<Vec<_>>(), vec!["sales"]);
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let (mut page, _, _rx) = page();
        page.mount("sales", attrs("https://calendly.com/acme")).unwrap();

        let err = page.mount("sales", attrs("https://calendly.com/other")).unwrap_err();

        assert_eq!(err, HostError::DuplicateName("sales".into()));
        assert_eq!(page.channel().len(), 1);
    }

    #[test]
    fn test_unknown_widget_is_reported() {
        let (mut page, _, _rx) = page();
        assert_eq!(page.unmount("nope"), Err(HostError::UnknownWidget("nope".into())));
        assert!(page.set_attribute("nope", "url", None).is_err());
        assert!(page.snapshot("nope").is_none());
    }

    #[test]
    fn test_unmount_removes_subscription() {
        let (mut page, _, _rx) = page();
        page.mount("sales", attrs("https://calendly.com/acme")).unwrap();

        page.unmount("sales").unwrap();

        assert!(page.channel().is_empty());
        assert_eq!(page.widget_names().count(), 0);
    }

    #[test]
    fn test_broadcast_reaches_every_widget() {
        // Arrange
        let (mut page, _, mut rx) = page();
        page.mount("a", attrs("https://calendly.com/a")).unwrap();
        page.mount("b", attrs("https://calendly.com/b")).unwrap();

        // Act
        let accepted = page
            .post_message(event("event_type_viewed", json!({"n": 1})), None)
            .unwrap();

        // Assert
        assert_eq!(accepted, 2);
        let mut widgets = vec![rx.try_recv().unwrap().widget, rx.try_recv().unwrap().widget];
        widgets.sort();
        assert_eq!(widgets, vec!["a", "b"]);
    }

    #[test]
    fn test_message_from_known_widget_reaches_only_that_widget() {
        let (mut page, _, mut rx) = page();
        page.mount("a", attrs("https://calendly.com/a")).unwrap();
        page.mount("b", attrs("https://calendly.com/b")).unwrap();

        let accepted = page
            .post_message(event("event_scheduled", json!({})), Some("b"))
            .unwrap();

        assert_eq!(accepted, 1);
        let got = rx.try_recv().unwrap();
        assert_eq!(got.widget, "b");
        assert_eq!(got.event.kind, OutboundEventKind::Scheduled);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_frame_load_and_settle_hide_overlay() {
        // Arrange
        let (mut page, scheduler, _rx) = page();
        let id = page.mount("sales", attrs("https://calendly.com/acme")).unwrap();

        // Act
        assert!(page.frame_loaded("sales", None).unwrap());
        let (armed_for, token) = scheduler.armed()[0];
        let hidden = page.settle_elapsed(armed_for, token);

        // Assert
        assert_eq!(armed_for, id);
        assert!(hidden);
        let snap = page.snapshot("sales").unwrap();
        assert_eq!(snap.state.render_state, RenderState::Ready);
        assert!(!snap.html.contains("embed-loading"));
    }

    #[test]
    fn test_settle_for_discarded_instance_is_ignored() {
        let (mut page, scheduler, _rx) = page();
        page.mount("sales", attrs("https://calendly.com/acme")).unwrap();
        page.frame_loaded("sales", None).unwrap();
        let (id, token) = scheduler.armed()[0];

        page.unmount("sales").unwrap();

        assert!(!page.settle_elapsed(id, token));
        assert_eq!(scheduler.cancelled.lock().unwrap().as_slice(), &[token]);
    }

    #[test]
    fn test_handle_event_stops_on_shutdown_only() {
        let (mut page, _, _rx) = page();

        assert!(page
            .handle_event(HostEvent::Unmount { name: "missing".into() })
            .is_continue());
        assert!(page.handle_event(HostEvent::Shutdown).is_break());
    }

    #[tokio::test]
    async fn test_run_answers_snapshots_and_unmounts_on_shutdown() {
        // Arrange
        let (page, _, _rx) = page();
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = HostHandle::new(tx);
        let task = tokio::spawn(page.run(rx));

        // Act
        handle
            .send(HostEvent::Mount {
                name: "sales".into(),
                attributes: attrs("https://calendly.com/acme"),
            })
            .unwrap();
        let snap = handle.snapshot("sales").await.unwrap().unwrap();
        handle.send(HostEvent::Shutdown).unwrap();
        task.await.unwrap();

        // Assert
        assert_eq!(snap.name, "sales");
        assert_eq!(snap.state.render_state, RenderState::Loading);
        assert!(snap.html.contains("<iframe"));
        assert_eq!(handle.send(HostEvent::Shutdown), Err(HostError::QueueClosed));
    }
}
