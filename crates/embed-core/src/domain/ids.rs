//! Identifier newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one rendered embedded frame.
///
/// A fresh id is minted on every render, so an id captured before a re-render
/// never matches the current frame again.  Hosts that can tell which frame
/// posted a message attach this id as the message `source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(Uuid);

impl FrameId {
    /// Mints a new random frame id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for FrameId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for FrameId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame-{}", self.0.simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_frame_ids_are_distinct() {
        assert_ne!(FrameId::new(), FrameId::new());
    }

    #[test]
    fn test_display_uses_frame_prefix() {
        let id = FrameId::from(Uuid::nil());
        assert_eq!(id.to_string(), "frame-00000000000000000000000000000000");
    }
}
