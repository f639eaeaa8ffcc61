//! HeightController: writes clamped height reports to the current structure.
//!
//! The clamping rule itself is [`embed_core::clamp_height`].  This module
//! owns the "write" half: the container and the frame always receive the
//! same height, so the frame never scrolls inside a box that is too small or
//! leaves a gap in one that is too large.

use serde_json::Value;

use embed_core::clamp_height;

use crate::domain::structure::RenderedStructure;

/// Applies height reports for one embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightController {
    min_height: u32,
}

impl HeightController {
    pub fn new(min_height: u32) -> Self {
        Self { min_height }
    }

    pub fn min_height(&self) -> u32 {
        self.min_height
    }

    /// Applies a reported height to `structure`.
    ///
    /// Returns the height now shown, or `None` if the report was unusable or
    /// there is no frame to size.  Writing the same height twice leaves the
    /// structure exactly as it was after the first write.
    pub fn update_height(
        &self,
        structure: &mut RenderedStructure,
        candidate: Option<&Value>,
    ) -> Option<u32> {
        let height = clamp_height(candidate, self.min_height)?;
        let embed = structure.embed_mut()?;
        embed.container.height_px = height;
        embed.frame.height_px = height;
        Some(height)
    }
}
