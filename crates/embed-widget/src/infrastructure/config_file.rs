//! TOML host configuration for the `embed-host` binary.
//!
//! Describes the page the embeds live on and the widgets to mount at start-up:
//!
//! ```toml
//! [host]
//! host_name = "www.example.com"
//! log_level = "info"
//!
//! [embed]
//! trusted_domain = "calendly.com"
//! allow_subdomains = true
//! settle_delay_ms = 500
//! correlate_frames = true
//!
//! [[widgets]]
//! name = "sales"
//! [widgets.attributes]
//! url = "https://calendly.com/acme/intro"
//! height = "800"
//! ```
//!
//! # Serde default values
//!
//! Every field has a `#[serde(default = "...")]`, so an empty file (or no file
//! at all) yields [`HostConfig::default`].  Widget attributes are the same
//! string map the component receives, so they go through the exact same
//! parsing as attributes set at runtime.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use embed_core::{EmbedContext, OriginPolicy, WidgetAttributes, DEFAULT_TRUSTED_DOMAIN};

use crate::application::instance::WidgetSettings;
use crate::application::settle::DEFAULT_SETTLE_DELAY;

/// Error type for host configuration files.
#[derive(Debug, Error)]
pub enum HostConfigError {
    /// A file system I/O error other than "not found".
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level host configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HostConfig {
    #[serde(default)]
    pub host: HostSection,
    #[serde(default)]
    pub embed: EmbedSection,
    #[serde(default)]
    pub widgets: Vec<WidgetEntry>,
}

/// The embedding page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostSection {
    /// Reported to the service as `embed_domain`.
    #[serde(default = "default_host_name")]
    pub host_name: String,
    /// `tracing` level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Embed behavior shared by every widget on the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedSection {
    /// Registrable domain whose origins may post messages.
    #[serde(default = "default_trusted_domain")]
    pub trusted_domain: String,
    /// Also trust `https://<sub>.<trusted_domain>`.
    #[serde(default = "default_true")]
    pub allow_subdomains: bool,
    /// Delay between frame load and hiding the loading overlay.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Drop messages known to come from another widget's frame.
    #[serde(default = "default_true")]
    pub correlate_frames: bool,
}

/// A widget mounted at start-up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WidgetEntry {
    pub name: String,
    #[serde(default)]
    pub attributes: WidgetAttributes,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_host_name() -> String {
    "localhost".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_trusted_domain() -> String {
    DEFAULT_TRUSTED_DOMAIN.to_string()
}
fn default_true() -> bool {
    true
}
fn default_settle_delay_ms() -> u64 {
    u64::try_from(DEFAULT_SETTLE_DELAY.as_millis()).unwrap_or(u64::MAX)
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            host_name: default_host_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for EmbedSection {
    fn default() -> Self {
        Self {
            trusted_domain: default_trusted_domain(),
            allow_subdomains: default_true(),
            settle_delay_ms: default_settle_delay_ms(),
            correlate_frames: default_true(),
        }
    }
}

impl HostConfig {
    /// Page-level settings for every instance created from this config.
    pub fn widget_settings(&self) -> WidgetSettings {
        WidgetSettings {
            context: EmbedContext::new(self.host.host_name.clone()),
            policy: OriginPolicy::new(self.embed.trusted_domain.clone(), self.embed.allow_subdomains),
            correlate_frames: self.embed.correlate_frames,
            settle_delay: Duration::from_millis(self.embed.settle_delay_ms),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Parses configuration from TOML text.
///
/// # Errors
///
/// Returns [`HostConfigError::Parse`] if the TOML is malformed.
pub fn parse_config(content: &str) -> Result<HostConfig, HostConfigError> {
    Ok(toml::from_str(content)?)
}

/// Loads configuration from `path`, returning [`HostConfig::default`] if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`HostConfigError::Io`] for file-system errors other than "not
/// found", and [`HostConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<HostConfig, HostConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HostConfig::default()),
        Err(source) => Err(HostConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        // Arrange / Act
        let cfg = parse_config("").unwrap();

        // Assert
        assert_eq!(cfg, HostConfig::default());
        assert_eq!(cfg.host.host_name, "localhost");
        assert_eq!(cfg.host.log_level, "info");
        assert_eq!(cfg.embed.trusted_domain, "calendly.com");
        assert_eq!(cfg.embed.settle_delay_ms, 500);
        assert!(cfg.embed.correlate_frames);
        assert!(cfg.widgets.is_empty());
    }

    #[test]
    fn test_default_settle_delay_matches_instance_default() {
        let settings = HostConfig::default().widget_settings();
        assert_eq!(settings.settle_delay, DEFAULT_SETTLE_DELAY);
    }

    #[test]
    fn test_empty_trusted_domain_trusts_no_origin() {
        let cfg = parse_config("[embed]\ntrusted_domain = \"\"\n").unwrap();

        let policy = cfg.widget_settings().policy;

        assert!(!policy.is_trusted("https://evil.com."));
        assert!(!policy.is_trusted("https://calendly.com"));
    }

    #[test]
    fn test_widgets_and_attributes_are_parsed() {
        let cfg = parse_config(
            r#"
            [host]
            host_name = "www.example.com"

            [[widgets]]
            name = "sales"
            [widgets.attributes]
            url = "https://calendly.com/acme/intro"
            height = "800"
            hide-details = "true"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.widgets.len(), 1);
        let widget = &cfg.widgets[0];
        assert_eq!(widget.name, "sales");
        let parsed = widget.attributes.to_configuration();
        assert_eq!(parsed.url.as_deref(), Some("https://calendly.com/acme/intro"));
        assert_eq!(parsed.min_height, 800);
        assert!(parsed.hide_details);
    }

    #[test]
    fn test_widget_settings_reflect_embed_section() {
        let cfg = parse_config(
            r#"
            [host]
            host_name = "shop.example"
            [embed]
            trusted_domain = "scheduler.test"
            allow_subdomains = false
            settle_delay_ms = 250
            correlate_frames = false
            "#,
        )
        .unwrap();

        let settings = cfg.widget_settings();

        assert_eq!(settings.context, EmbedContext::new("shop.example"));
        assert_eq!(settings.settle_delay, Duration::from_millis(250));
        assert!(!settings.correlate_frames);
        assert!(settings.policy.is_trusted("https://scheduler.test"));
        assert!(!settings.policy.is_trusted("https://a.scheduler.test"));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_config("[host\nhost_name = ").unwrap_err();
        assert!(matches!(err, HostConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_yields_default() {
        let path = std::env::temp_dir().join(format!("embed-host-missing-{}.toml", uuid::Uuid::new_v4()));
        assert_eq!(load_config(&path).unwrap(), HostConfig::default());
    }

    #[test]
    fn test_existing_file_is_loaded() {
        let path = std::env::temp_dir().join(format!("embed-host-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[embed]\nsettle_delay_ms = 10\n").unwrap();

        let cfg = load_config(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(cfg.embed.settle_delay_ms, 10);
    }
}
