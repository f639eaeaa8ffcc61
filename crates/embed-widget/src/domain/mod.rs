//! Domain layer for embed-widget.
//!
//! Pure types describing one embed instance and the page it lives on.  Nothing
//! here spawns tasks, sleeps, or talks to the host.
//!
//! # What belongs in the domain layer?
//!
//! - The rendered structure description (container, loading overlay, frame)
//! - Per-instance state (`InstanceState`)
//! - The subscriber registry of the shared message channel
//! - Outbound application events and instance identifiers

pub mod channel;
pub mod events;
pub mod state;
pub mod structure;

pub use channel::{MessageChannel, SubscriptionId};
pub use events::{InstanceId, OutboundEvent, OutboundEventKind};
pub use state::{InstanceState, RenderState};
pub use structure::{ContainerNode, EmbedStructure, FrameNode, LoadingIndicator, RenderedStructure};
