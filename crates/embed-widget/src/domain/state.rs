//! Per-instance state.

use serde::{Deserialize, Serialize};

/// Where an instance is in its render lifecycle.
///
/// ```text
///              ┌──────── reconfigure ────────┐
///              ▼                             │
/// mount ─► Unconfigured / Error        Loading ──frame load──► Ready
///              │          ▲               ▲                     │
///              └─reconfig─┴── reconfigure ┴──── reconfigure ────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderState {
    /// No `url` attribute; a notice is shown.
    Unconfigured,
    /// The frame exists and its page has not finished loading.
    Loading,
    /// The frame's page has loaded.  The loading overlay is hidden once the
    /// settle delay elapses.
    Ready,
    /// The `url` attribute is present but unusable; a notice is shown.
    Error,
}

/// Snapshot of one mounted embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceState {
    pub render_state: RenderState,
    /// Last height written to the rendered structure; never below the
    /// configured minimum.
    pub current_height: u32,
    /// Whether the instance is subscribed to the shared message channel.
    pub subscription_active: bool,
}
