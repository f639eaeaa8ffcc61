//! Description of the structure an embed renders.
//!
//! Rendering does not hand out live node handles.  It produces a value, a
//! [`RenderedStructure`], that fully describes what the host should display.
//! Re-rendering replaces the whole value, so there is nothing stale to hold
//! on to: code that needs to touch the frame is given the current structure.
//!
//! ```text
//! Embed:                                  Notice:
//! ┌ container (height ≥ min) ──────┐      ┌ notice ─────────────────┐
//! │ ┌ loading overlay (visible?) ┐ │      │ human-readable message  │
//! │ └────────────────────────────┘ │      └─────────────────────────┘
//! │ ┌ frame (src, same height) ──┐ │
//! │ └────────────────────────────┘ │
//! └────────────────────────────────┘
//! ```

use std::fmt::Write as _;

use embed_core::FrameId;

/// Accessible title given to the embedded frame.
pub const FRAME_TITLE: &str = "Select a Date & Time - Calendly";

/// The outer box that reserves space on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerNode {
    pub height_px: u32,
}

/// The overlay shown until the embedded page has settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingIndicator {
    pub visible: bool,
}

/// The sandboxed frame hosting the scheduling page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameNode {
    /// Minted fresh by every render.
    pub id: FrameId,
    /// The resolved request URL.
    pub src: String,
    pub height_px: u32,
}

/// Container, overlay, and frame of a successfully configured embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedStructure {
    pub container: ContainerNode,
    pub loading: LoadingIndicator,
    pub frame: FrameNode,
}

/// Everything one render of an embed produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedStructure {
    /// Configuration is missing or invalid; no frame exists.
    Notice { message: String },
    /// A frame was created for the resolved request.
    Embed(EmbedStructure),
}

impl RenderedStructure {
    /// The embed parts, or `None` for a notice.
    pub fn embed(&self) -> Option<&EmbedStructure> {
        match self {
            Self::Embed(e) => Some(e),
            Self::Notice { .. } => None,
        }
    }

    /// Mutable access to the embed parts.
    pub fn embed_mut(&mut self) -> Option<&mut EmbedStructure> {
        match self {
            Self::Embed(e) => Some(e),
            Self::Notice { .. } => None,
        }
    }

    /// Id of the current frame, if one was rendered.
    pub fn frame_id(&self) -> Option<FrameId> {
        self.embed().map(|e| e.frame.id)
    }

    /// Height currently written to the container.
    pub fn height(&self) -> Option<u32> {
        self.embed().map(|e| e.container.height_px)
    }

    /// Whether the loading overlay is showing.
    pub fn is_loading_visible(&self) -> bool {
        self.embed().is_some_and(|e| e.loading.visible)
    }

    /// Serializes the description to markup a host page can insert.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        match self {
            Self::Notice { message } => {
                // Writing to a String cannot fail.
                let _ = write!(
                    out,
                    r#"<div class="embed-notice" role="alert">{}</div>"#,
                    escape(message)
                );
            }
            Self::Embed(e) => {
                let _ = write!(
                    out,
                    r#"<div class="embed-container" style="height: {h}px;">"#,
                    h = e.container.height_px
                );
                if e.loading.visible {
                    out.push_str(
                        r#"<div class="embed-loading" role="progressbar"><div class="embed-spinner"></div></div>"#,
                    );
                }
                let _ = write!(
                    out,
                    r#"<iframe id="{id}" src="{src}" title="{title}" width="100%" height="{h}" frameborder="0"></iframe>"#,
                    id = e.frame.id,
                    src = escape(&e.frame.src),
                    title = escape(FRAME_TITLE),
                    h = e.frame.height_px
                );
                out.push_str("</div>");
            }
        }
        out
    }
}

/// Escapes text for use in HTML content and double-quoted attributes.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn embed(height: u32, loading: bool) -> RenderedStructure {
        RenderedStructure::Embed(EmbedStructure {
            container: ContainerNode { height_px: height },
            loading: LoadingIndicator { visible: loading },
            frame: FrameNode {
                id: FrameId::from(Uuid::nil()),
                src: "https://calendly.com/acme?embed_domain=a.example&embed_type=Inline".into(),
                height_px: height,
            },
        })
    }

    #[test]
    fn test_notice_has_no_frame() {
        let s = RenderedStructure::Notice { message: "x".into() };
        assert_eq!(s.frame_id(), None);
        assert_eq!(s.height(), None);
        assert!(!s.is_loading_visible());
    }

    #[test]
    fn test_embed_accessors() {
        let s = embed(700, true);
        assert_eq!(s.frame_id(), Some(FrameId::from(Uuid::nil())));
        assert_eq!(s.height(), Some(700));
        assert!(s.is_loading_visible());
    }

    #[test]
    fn test_embed_html_escapes_query_separator_and_sizes_both_nodes() {
        // Arrange
        let s = embed(900, false);

        // Act
        let html = s.to_html();

        // Assert
        assert!(html.starts_with(r#"<div class="embed-container" style="height: 900px;">"#));
        assert!(html.contains(r#"src="https://calendly.com/acme?embed_domain=a.example&amp;embed_type=Inline""#));
        assert!(html.contains(r#"height="900""#));
        assert!(!html.contains("embed-loading"));
        assert!(html.ends_with("</div>"));
    }

    #[test]
    fn test_loading_overlay_rendered_when_visible() {
        assert!(embed(700, true).to_html().contains(r#"class="embed-loading""#));
    }

    #[test]
    fn test_notice_html_escapes_message() {
        let s = RenderedStructure::Notice { message: r#"bad "url" <here>"#.into() };
        assert_eq!(
            s.to_html(),
            r#"<div class="embed-notice" role="alert">bad &quot;url&quot; &lt;here&gt;</div>"#
        );
    }
}
