//! Inbound cross-document message protocol.
//!
//! The embedded scheduling page talks to its host over a process-wide,
//! unauthenticated broadcast channel.  Every listener on the page sees every
//! message, whichever frame it came from and whoever it was meant for.  This
//! module holds the two pure checks applied to each message:
//!
//! - [`origin`] – is the sender the scheduling service at all?
//! - [`messages`] – is the payload one of the few events we understand?

pub mod messages;
pub mod origin;

pub use messages::{classify, EmbedEvent, InboundMessage, EVENT_PREFIX};
pub use origin::{OriginPolicy, DEFAULT_TRUSTED_DOMAIN};
