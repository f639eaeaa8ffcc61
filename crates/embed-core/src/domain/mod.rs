//! Domain layer for embed-core.
//!
//! Pure business-logic types with no dependencies on I/O, timers, or the host
//! page.
//!
//! # What belongs in the domain layer?
//!
//! - The host-facing attribute map and its typed interpretation
//! - Identifier newtypes shared between crates
//! - The height clamping rule

pub mod attributes;
pub mod height;
pub mod ids;

pub use attributes::{WidgetAttributes, WidgetConfiguration};
pub use ids::FrameId;
