//! Host-facing attributes and their typed interpretation.
//!
//! The host configures an embed with plain string attributes, exactly as a
//! page author would write them on an element:
//!
//! ```text
//! url="https://calendly.com/acme/intro" height="900" hide-details="true"
//! ```
//!
//! [`WidgetAttributes`] stores that raw map.  [`WidgetConfiguration`] is the
//! typed view derived from it.  Only `url` can make a configuration invalid,
//! and that check belongs to the resolver; every other attribute falls back to
//! a safe default when it is absent or malformed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Minimum embed height in pixels when the `height` attribute is absent or
/// not a positive integer.
pub const DEFAULT_MIN_HEIGHT: u32 = 700;

/// Attribute names understood by the embed.
pub mod names {
    pub const URL: &str = "url";
    pub const HEIGHT: &str = "height";
    pub const HIDE_DETAILS: &str = "hide-details";
    pub const HIDE_GDPR: &str = "hide-gdpr";
    pub const BACKGROUND_COLOR: &str = "background-color";
    pub const TEXT_COLOR: &str = "text-color";
    pub const PRIMARY_COLOR: &str = "primary-color";
}

// ── Raw attributes ────────────────────────────────────────────────────────────

/// The raw attribute map supplied by the host.
///
/// Ordered (`BTreeMap`) so that debug output and serialized snapshots are
/// stable.  Unknown attribute names are kept but ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetAttributes(BTreeMap<String, String>);

impl WidgetAttributes {
    /// Creates an empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper used mostly by tests and the CLI.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }

    /// Sets (`Some`) or removes (`None`) an attribute.
    ///
    /// Returns `true` when the stored value actually changed, so callers can
    /// skip a re-render when the host writes the same value twice.
    pub fn set(&mut self, name: &str, value: Option<&str>) -> bool {
        match value {
            Some(v) => self.0.insert(name.to_string(), v.to_string()).as_deref() != Some(v),
            None => self.0.remove(name).is_some(),
        }
    }

    /// Returns the raw value of an attribute, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Interprets the raw attributes as a typed configuration.
    pub fn to_configuration(&self) -> WidgetConfiguration {
        WidgetConfiguration {
            url: self.get(names::URL).map(str::to_string),
            min_height: parse_min_height(self.get(names::HEIGHT)),
            hide_details: is_true(self.get(names::HIDE_DETAILS)),
            hide_gdpr_banner: is_true(self.get(names::HIDE_GDPR)),
            background_color: non_empty(self.get(names::BACKGROUND_COLOR)),
            text_color: non_empty(self.get(names::TEXT_COLOR)),
            primary_color: non_empty(self.get(names::PRIMARY_COLOR)),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for WidgetAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ── Typed configuration ───────────────────────────────────────────────────────

/// Typed configuration for one embed instance.
///
/// `url` is kept as the raw string: whether it is usable is decided by
/// [`crate::resolver::resolve`], which reports a [`crate::ConfigError`]
/// instead of failing here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfiguration {
    /// Scheduling page URL.  Required for a usable embed.
    pub url: Option<String>,
    /// Lower bound for the rendered height, in pixels.  Always positive.
    pub min_height: u32,
    /// Hide the event type details panel.
    pub hide_details: bool,
    /// Hide the cookie consent banner.
    pub hide_gdpr_banner: bool,
    /// Background color as a hex string without the leading `#`.
    pub background_color: Option<String>,
    /// Text color as a hex string without the leading `#`.
    pub text_color: Option<String>,
    /// Primary (accent) color as a hex string without the leading `#`.
    pub primary_color: Option<String>,
}

impl Default for WidgetConfiguration {
    fn default() -> Self {
        Self {
            url: None,
            min_height: DEFAULT_MIN_HEIGHT,
            hide_details: false,
            hide_gdpr_banner: false,
            background_color: None,
            text_color: None,
            primary_color: None,
        }
    }
}

// ── Parsing helpers ───────────────────────────────────────────────────────────

fn parse_min_height(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|h| *h > 0)
        .unwrap_or(DEFAULT_MIN_HEIGHT)
}

fn is_true(raw: Option<&str>) -> bool {
    raw == Some("true")
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !s.is_empty()).map(str::to_string)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
