//! Render engine: resolved configuration → structure description.
//!
//! [`render`] is a pure function.  Every call mints a new [`FrameId`] and
//! returns a complete [`RenderedStructure`] that replaces whatever was shown
//! before.  Anything captured from an older render (a frame id, a settle
//! token) stops matching, which is how stale frame-load signals and stale
//! timers are recognized and ignored by the instance.
//!
//! # Loading → ready
//!
//! A fresh embed always starts with the loading overlay visible.  The
//! instance hides it with [`dismiss_loading`] once the frame has loaded and
//! the settle delay has elapsed.

use embed_core::{ConfigError, FrameId, ResolvedRequest};

use crate::domain::state::RenderState;
use crate::domain::structure::{
    ContainerNode, EmbedStructure, FrameNode, LoadingIndicator, RenderedStructure,
};

/// Renders the outcome of configuration resolution.
///
/// - `Ok(request)` → container and frame sized to `min_height`, overlay shown.
/// - `Err(error)` → a human-readable notice, no frame.
pub fn render(
    resolution: &Result<ResolvedRequest, ConfigError>,
    min_height: u32,
) -> RenderedStructure {
    match resolution {
        Ok(request) => RenderedStructure::Embed(EmbedStructure {
            container: ContainerNode {
                height_px: min_height,
            },
            loading: LoadingIndicator { visible: true },
            frame: FrameNode {
                id: FrameId::new(),
                src: request.as_str().to_string(),
                height_px: min_height,
            },
        }),
        Err(error) => RenderedStructure::Notice {
            message: notice_text(error),
        },
    }
}

/// The render state a freshly rendered resolution starts in.
pub fn render_state_for(resolution: &Result<ResolvedRequest, ConfigError>) -> RenderState {
    match resolution {
        Ok(_) => RenderState::Loading,
        Err(ConfigError::MissingUrl) => RenderState::Unconfigured,
        Err(ConfigError::InvalidUrl { .. }) => RenderState::Error,
    }
}

/// Hides the loading overlay.  Returns `true` if it was visible.
pub fn dismiss_loading(structure: &mut RenderedStructure) -> bool {
    match structure.embed_mut() {
        Some(embed) if embed.loading.visible => {
            embed.loading.visible = false;
            true
        }
        _ => false,
    }
}

fn notice_text(error: &ConfigError) -> String {
    match error {
        ConfigError::MissingUrl => {
            "No scheduling page configured. Set the `url` attribute to your scheduling link."
                .to_string()
        }
        ConfigError::InvalidUrl { url, .. } => {
            format!("The scheduling link {url:?} is not a valid web address.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embed_core::{resolve, EmbedContext, WidgetAttributes};

    fn resolution(url: Option<&str>) -> Result<ResolvedRequest, ConfigError> {
        let mut attrs = WidgetAttributes::new();
        attrs.set("url", url);
        resolve(&attrs.to_configuration(), &EmbedContext::new("host.example"))
    }

    #[test]
    fn test_successful_resolution_renders_loading_frame() {
        // Arrange
        let res = resolution(Some("https://calendly.com/acme"));

        // Act
        let s = render(&res, 700);

        // Assert
        let embed = s.embed().expect("frame must be rendered");
        assert_eq!(embed.container.height_px, 700);
        assert_eq!(embed.frame.height_px, 700);
        assert!(embed.loading.visible);
        assert_eq!(embed.frame.src, res.unwrap().as_str());
    }

    #[test]
    fn test_each_render_mints_a_new_frame_id() {
        let res = resolution(Some("https://calendly.com/acme"));
        assert_ne!(render(&res, 700).frame_id(), render(&res, 700).frame_id());
    }

    #[test]
    fn test_missing_url_renders_notice_and_unconfigured() {
        let res = resolution(None);
        let s = render(&res, 700);
        assert!(matches!(s, RenderedStructure::Notice { ref message } if message.contains("`url`")));
        assert_eq!(render_state_for(&res), RenderState::Unconfigured);
    }

    #[test]
    fn test_invalid_url_renders_notice_and_error() {
        let res = resolution(Some("not a url"));
        let s = render(&res, 700);
        assert!(matches!(s, RenderedStructure::Notice { ref message } if message.contains("not a url")));
        assert_eq!(render_state_for(&res), RenderState::Error);
    }

    #[test]
    fn test_dismiss_loading_only_once() {
        let mut s = render(&resolution(Some("https://calendly.com/acme")), 700);
        assert!(dismiss_loading(&mut s));
        assert!(!s.is_loading_visible());
        assert!(!dismiss_loading(&mut s));
    }

    #[test]
    fn test_dismiss_loading_on_notice_is_noop() {
        let mut s = render(&resolution(None), 700);
        assert!(!dismiss_loading(&mut s));
    }
}
