//! Application layer for embed-widget.
//!
//! The application layer knows *what* an embed instance does in response to
//! each host signal, and delegates *how* side effects happen (dispatching an
//! event to the host, arming a timer) to capabilities injected from the
//! infrastructure layer.
//!
//! # Responsibilities
//!
//! - Rendering a resolved configuration into a structure description
//! - Filtering and translating inbound channel messages
//! - Clamping reported heights and writing them to the current structure
//! - The per-instance lifecycle: mount, reconfigure, frame load, settle, unmount
//!
//! # What does NOT belong here?
//!
//! - Spawning tokio tasks or sleeping (that is infrastructure)
//! - Reading configuration files or stdin (that is `main.rs` and infrastructure)

pub mod height_controller;
pub mod instance;
pub mod message_bridge;
pub mod render_engine;
pub mod settle;

pub use height_controller::HeightController;
pub use instance::{WidgetInstance, WidgetSettings};
pub use message_bridge::{BridgeAction, EventDispatcher, MessageBridge};
pub use render_engine::{dismiss_loading, render, render_state_for};
pub use settle::{SettleScheduler, SettleToken, DEFAULT_SETTLE_DELAY};
