//! Configuration resolver: [`WidgetConfiguration`] → request URL.
//!
//! The embedded frame is loaded from the configured scheduling URL plus a set
//! of query parameters that tell the service how to present itself and who is
//! embedding it.
//!
//! # Parameters
//!
//! ```text
//! hide_event_type_details=1   when hide-details="true"
//! hide_gdpr_banner=1          when hide-gdpr="true"
//! background_color=<raw>      when background-color is supplied
//! text_color=<raw>            when text-color is supplied
//! primary_color=<raw>         when primary-color is supplied
//! embed_domain=<host name>    always
//! embed_type=Inline           always
//! ```
//!
//! Parameters are *set*, not appended: a pre-existing query parameter with one
//! of these names is replaced.  Everything else in the URL (path, other query
//! parameters, fragment) is kept byte for byte, including valueless flags and
//! the original percent-encoding.
//!
//! # Purity
//!
//! [`resolve`] reads only its two arguments.  The current host name is passed
//! in through [`EmbedContext`] instead of being looked up, so the same inputs
//! always produce the same URL.

use std::fmt;

use thiserror::Error;
use url::{form_urlencoded, Url};

use crate::domain::attributes::WidgetConfiguration;

/// Value of the `embed_type` parameter for frames rendered inline in the page.
pub const EMBED_TYPE_INLINE: &str = "Inline";

// ── Error type ────────────────────────────────────────────────────────────────

/// Reasons a configuration cannot produce a request URL.
///
/// Never surfaced to the host as a failure: the render engine turns it into a
/// visible notice in place of the frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No `url` attribute, or an empty one.
    #[error("no scheduling URL configured; set the `url` attribute")]
    MissingUrl,

    /// The `url` attribute is present but is not an absolute http(s) URL.
    #[error("invalid scheduling URL {url:?}: {reason}")]
    InvalidUrl {
        /// The rejected attribute value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

// ── Inputs and outputs ────────────────────────────────────────────────────────

/// Facts about the embedding page that end up in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedContext {
    /// Host name of the page embedding the widget (e.g. `"www.example.com"`).
    pub host_name: String,
}

impl EmbedContext {
    pub fn new(host_name: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
        }
    }
}

/// A fully parameterized request URL for the embedded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    url: Url,
}

impl ResolvedRequest {
    /// The request URL as a string.
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// The parsed request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Looks up a query parameter on the resolved URL.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

impl fmt::Display for ResolvedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// Resolves a configuration into the frame's request URL.
///
/// # Errors
///
/// - [`ConfigError::MissingUrl`] if `url` is absent, empty, or only whitespace.
/// - [`ConfigError::InvalidUrl`] if `url` does not parse as an absolute URL,
///   or uses a scheme other than `http`/`https`.
///
/// # Example
///
/// ```rust
/// use embed_core::{resolve, EmbedContext, WidgetAttributes};
///
/// let cfg = WidgetAttributes::new()
///     .with("url", "https://calendly.com/acme/intro")
///     .with("hide-details", "true")
///     .to_configuration();
/// let req = resolve(&cfg, &EmbedContext::new("shop.example")).unwrap();
/// assert_eq!(
///     req.as_str(),
///     "https://calendly.com/acme/intro?hide_event_type_details=1&embed_domain=shop.example&embed_type=Inline"
/// );
/// ```
pub fn resolve(
    config: &WidgetConfiguration,
    context: &EmbedContext,
) -> Result<ResolvedRequest, ConfigError> {
    let raw = config
        .url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::MissingUrl)?;

    let mut url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    // A frame pointed at `javascript:` or `data:` would run arbitrary content
    // in the host's name; only web URLs are loadable.
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme `{}`", url.scheme()),
        });
    }

    let params = request_params(config, context);

    let mut query = retained_query(url.query(), &params);
    let added = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(&params)
        .finish();
    if !query.is_empty() {
        query.push('&');
    }
    query.push_str(&added);
    url.set_query(Some(&query));

    Ok(ResolvedRequest { url })
}

/// Copies the raw `&`-separated segments of `existing` whose decoded name is
/// not one of `params`.  Kept segments are not re-encoded.
fn retained_query(existing: Option<&str>, params: &[(&str, &str)]) -> String {
    let Some(existing) = existing else {
        return String::new();
    };
    existing
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter(|segment| {
            let name = form_urlencoded::parse(segment.as_bytes())
                .next()
                .map(|(name, _)| name.into_owned())
                .unwrap_or_default();
            !params.iter().any(|(param, _)| *param == name)
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Builds the ordered list of parameters for a configuration.
fn request_params<'a>(
    config: &'a WidgetConfiguration,
    context: &'a EmbedContext,
) -> Vec<(&'static str, &'a str)> {
    let mut params = Vec::with_capacity(7);
    if config.hide_details {
        params.push(("hide_event_type_details", "1"));
    }
    if config.hide_gdpr_banner {
        params.push(("hide_gdpr_banner", "1"));
    }
    if let Some(c) = &config.background_color {
        params.push(("background_color", c.as_str()));
    }
    if let Some(c) = &config.text_color {
        params.push(("text_color", c.as_str()));
    }
    if let Some(c) = &config.primary_color {
        params.push(("primary_color", c.as_str()));
    }
    params.push(("embed_domain", context.host_name.as_str()));
    params.push(("embed_type", EMBED_TYPE_INLINE));
    params
}

// ── Tests ─────────────────────────────────────────────────────────────────────
