//! WidgetInstance: one embed on a host page, from mount to unmount.
//!
//! The instance ties the pieces together:
//!
//! ```text
//! set_attribute ──► resolve ──► render ─────────────┐
//!                                                    ▼
//! on_frame_load ──► Ready + arm settle timer   RenderedStructure
//! on_settle_elapsed ──► hide loading overlay ───────▲
//! on_message ──► MessageBridge ──► HeightController ┘
//!                              └─► EventDispatcher (host)
//! ```
//!
//! # Handler discipline
//!
//! Every `on_*` method runs to completion and returns whether it changed
//! anything.  Signals that no longer apply are ignored rather than treated as
//! errors:
//!
//! - any signal while the instance is not mounted,
//! - a frame-load for a frame that a re-render has since replaced,
//! - a settle completion whose token was cancelled or superseded.
//!
//! Reconfiguring re-renders but never touches the message subscription, so an
//! instance stays subscribed, exactly once, across any number of attribute
//! changes.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use embed_core::{
    resolve, EmbedContext, FrameId, InboundMessage, OriginPolicy, WidgetAttributes,
    WidgetConfiguration,
};

use crate::application::height_controller::HeightController;
use crate::application::message_bridge::{BridgeAction, EventDispatcher, MessageBridge};
use crate::application::render_engine::{dismiss_loading, render, render_state_for};
use crate::application::settle::{SettleScheduler, SettleToken, DEFAULT_SETTLE_DELAY};
use crate::domain::channel::MessageChannel;
use crate::domain::events::InstanceId;
use crate::domain::state::{InstanceState, RenderState};
use crate::domain::structure::RenderedStructure;

/// Page-level settings shared by every instance on a host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSettings {
    /// Identifies the embedding page in request URLs.
    pub context: EmbedContext,
    /// Which message origins are the scheduling service.
    pub policy: OriginPolicy,
    /// Drop messages whose known source frame is not the instance's own.
    pub correlate_frames: bool,
    /// Delay between frame load and hiding the loading overlay.
    pub settle_delay: Duration,
}

impl WidgetSettings {
    pub fn new(context: EmbedContext) -> Self {
        Self {
            context,
            policy: OriginPolicy::default(),
            correlate_frames: true,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// One embed instance and all of its per-instance state.
pub struct WidgetInstance {
    id: InstanceId,
    attributes: WidgetAttributes,
    configuration: WidgetConfiguration,
    context: EmbedContext,
    settle_delay: Duration,
    structure: RenderedStructure,
    render_state: RenderState,
    current_height: u32,
    bridge: MessageBridge,
    scheduler: Arc<dyn SettleScheduler>,
    pending_settle: Option<SettleToken>,
    mounted: bool,
    // Structure no longer reflects the attributes or was shown before.
    stale: bool,
}

impl WidgetInstance {
    /// Creates an unmounted instance and renders its initial structure.
    pub fn new(
        id: InstanceId,
        attributes: WidgetAttributes,
        settings: &WidgetSettings,
        dispatcher: Arc<dyn EventDispatcher>,
        scheduler: Arc<dyn SettleScheduler>,
    ) -> Self {
        let configuration = attributes.to_configuration();
        let resolution = resolve(&configuration, &settings.context);
        let structure = render(&resolution, configuration.min_height);
        Self {
            id,
            current_height: configuration.min_height,
            render_state: render_state_for(&resolution),
            attributes,
            configuration,
            context: settings.context.clone(),
            settle_delay: settings.settle_delay,
            structure,
            bridge: MessageBridge::new(settings.policy.clone(), settings.correlate_frames, dispatcher),
            scheduler,
            pending_settle: None,
            mounted: false,
            stale: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Mounts the instance and subscribes it to the page channel.
    ///
    /// Remounting after an unmount re-renders from the current attributes so
    /// no structure from the previous mount survives.  Returns `false` if the
    /// instance was already mounted.
    pub fn mount(&mut self, channel: &mut MessageChannel) -> bool {
        if self.mounted {
            return false;
        }
        if self.stale {
            self.rerender();
            self.stale = false;
        }
        self.mounted = true;
        self.bridge.attach(channel, self.id);
        info!(instance = %self.id, state = ?self.render_state, "embed mounted");
        true
    }

    /// Unmounts the instance: detaches from the channel and cancels any
    /// pending settle timer.  Returns `false` if it was not mounted.
    pub fn unmount(&mut self, channel: &mut MessageChannel) -> bool {
        if !self.mounted {
            return false;
        }
        self.bridge.detach(channel);
        self.cancel_settle();
        self.mounted = false;
        self.stale = true;
        info!(instance = %self.id, "embed unmounted");
        true
    }

    /// Sets or removes one attribute and re-renders if the configuration
    /// changed.
    ///
    /// Attributes the embed does not read (`class`, `style`, ...) are
    /// recorded but never re-render.  While unmounted the value takes effect
    /// at the next mount.  Returns `true` if a re-render happened.
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) -> bool {
        if !self.attributes.set(name, value) {
            return false;
        }
        self.apply_attributes()
    }

    /// Replaces all attributes at once and re-renders if the configuration
    /// changed.
    pub fn reconfigure(&mut self, attributes: WidgetAttributes) -> bool {
        if attributes == self.attributes {
            return false;
        }
        self.attributes = attributes;
        self.apply_attributes()
    }

    // ── Host signals ──────────────────────────────────────────────────────────

    /// The frame finished loading its page.
    ///
    /// Moves `Loading` → `Ready` and arms the settle timer.  Ignored for a
    /// frame that is not the current one, or when not loading.
    pub fn on_frame_load(&mut self, frame: FrameId) -> bool {
        if !self.mounted
            || self.render_state != RenderState::Loading
            || self.structure.frame_id() != Some(frame)
        {
            debug!(instance = %self.id, %frame, "ignoring stale frame load");
            return false;
        }
        self.render_state = RenderState::Ready;
        self.cancel_settle();
        let token = SettleToken::next();
        self.scheduler.schedule(self.id, token, self.settle_delay);
        self.pending_settle = Some(token);
        debug!(instance = %self.id, %frame, delay = ?self.settle_delay, "frame loaded; settle armed");
        true
    }

    /// The settle timer identified by `token` fired.
    pub fn on_settle_elapsed(&mut self, token: SettleToken) -> bool {
        if !self.mounted || self.pending_settle != Some(token) {
            debug!(instance = %self.id, ?token, "ignoring stale settle completion");
            return false;
        }
        self.pending_settle = None;
        dismiss_loading(&mut self.structure)
    }

    /// A message arrived on the page channel.
    ///
    /// Returns `true` if it resized the embed or was forwarded to the host.
    pub fn on_message(&mut self, message: &InboundMessage) -> bool {
        if !self.mounted {
            return false;
        }
        match self.bridge.interpret(message, self.structure.frame_id()) {
            Some(BridgeAction::UpdateHeight(candidate)) => self.apply_height(candidate.as_ref()),
            Some(BridgeAction::Emit(event)) => {
                debug!(instance = %self.id, event = event.kind.name(), "forwarding event to host");
                self.bridge.forward(event);
                true
            }
            None => false,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn attributes(&self) -> &WidgetAttributes {
        &self.attributes
    }

    pub fn configuration(&self) -> &WidgetConfiguration {
        &self.configuration
    }

    /// The structure the host should currently display.
    pub fn structure(&self) -> &RenderedStructure {
        &self.structure
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Token of the armed settle timer, if any.
    pub fn pending_settle(&self) -> Option<SettleToken> {
        self.pending_settle
    }

    pub fn state(&self) -> InstanceState {
        InstanceState {
            render_state: self.render_state,
            current_height: self.current_height,
            subscription_active: self.bridge.is_attached(),
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn apply_attributes(&mut self) -> bool {
        let configuration = self.attributes.to_configuration();
        if configuration == self.configuration {
            return false;
        }
        self.configuration = configuration;
        if !self.mounted {
            self.stale = true;
            return false;
        }
        self.rerender();
        true
    }

    fn rerender(&mut self) {
        self.cancel_settle();
        self.configuration = self.attributes.to_configuration();
        let resolution = resolve(&self.configuration, &self.context);
        self.structure = render(&resolution, self.configuration.min_height);
        self.render_state = render_state_for(&resolution);
        self.current_height = self.configuration.min_height;
        match &resolution {
            Ok(request) => debug!(instance = %self.id, url = %request, "rendered embed"),
            Err(error) => info!(instance = %self.id, %error, "rendered configuration notice"),
        }
    }

    fn apply_height(&mut self, candidate: Option<&Value>) -> bool {
        let controller = HeightController::new(self.configuration.min_height);
        match controller.update_height(&mut self.structure, candidate) {
            Some(height) => {
                let changed = height != self.current_height;
                self.current_height = height;
                changed
            }
            None => false,
        }
    }

    fn cancel_settle(&mut self) {
        if let Some(token) = self.pending_settle.take() {
            self.scheduler.cancel(token);
        }
    }
}

impl fmt::Debug for WidgetInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetInstance")
            .field("id", &self.id)
            .field("render_state", &self.render_state)
            .field("current_height", &self.current_height)
            .field("mounted", &self.mounted)
            .field("pending_settle", &self.pending_settle)
            .field("bridge", &self.bridge)
            .finish_non_exhaustive()
    }
}
