//! # embed-core
//!
//! Shared library for the inline scheduling embed containing the configuration
//! resolver, the origin trust policy, the inbound message protocol, and the
//! height clamping policy.
//!
//! This crate has zero dependencies on async runtimes, host pages, or timers.
//! Everything in it is a pure function of its inputs.
//!
//! # Architecture overview (for beginners)
//!
//! The embed shows a third-party scheduling page inside a sandboxed frame on
//! a host page.  Three problems have to be solved, and this crate holds the
//! pure half of each:
//!
//! - **`domain`** – What the host configured.  Raw string attributes
//!   (`url`, `height`, `hide-details`, ...) are parsed into a typed
//!   [`WidgetConfiguration`] with safe defaults, and the height clamping rule
//!   lives here.
//!
//! - **`resolver`** – How a configuration becomes the frame's request URL.
//!   The result is either a [`ResolvedRequest`] or a [`ConfigError`].
//!
//! - **`protocol`** – What the embedded frame says back.  Messages arrive on a
//!   shared, unauthenticated channel, so they are checked against an
//!   [`OriginPolicy`] and then classified into a small fixed vocabulary of
//!   [`EmbedEvent`]s.

pub mod domain;
pub mod protocol;
pub mod resolver;

// Re-export the most-used types at the crate root so callers can write
// `embed_core::WidgetConfiguration` instead of the full module path.
pub use domain::attributes::{WidgetAttributes, WidgetConfiguration, DEFAULT_MIN_HEIGHT};
pub use domain::height::clamp_height;
pub use domain::ids::FrameId;
pub use protocol::messages::{classify, EmbedEvent, InboundMessage};
pub use protocol::origin::{OriginPolicy, DEFAULT_TRUSTED_DOMAIN};
pub use resolver::{resolve, ConfigError, EmbedContext, ResolvedRequest};
