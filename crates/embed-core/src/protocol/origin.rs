//! Origin trust policy for inbound messages.
//!
//! A message's origin is the `scheme://host[:port]` of the document that sent
//! it.  The naive check "origin contains `calendly.com`" also accepts
//! `https://calendly.com.attacker.net` and `https://notcalendly.com`, so the
//! policy here parses the origin and compares hosts label by label:
//!
//! ```text
//! https://calendly.com             trusted   (exact host)
//! https://assets.calendly.com      trusted   (subdomain, if allowed)
//! https://calendly.com.evil.net    rejected  (suffix is not the domain)
//! https://evilcalendly.com         rejected  (no label boundary)
//! http://calendly.com              rejected  (not https)
//! null                             rejected  (opaque origin)
//! ```

use url::Url;

/// The domain of the scheduling service.
pub const DEFAULT_TRUSTED_DOMAIN: &str = "calendly.com";

/// Decides whether a message origin identifies the embedding service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginPolicy {
    trusted_domain: String,
    allow_subdomains: bool,
}

impl OriginPolicy {
    /// Trusts `domain` and, when `allow_subdomains` is set, any host below it.
    pub fn new(domain: impl Into<String>, allow_subdomains: bool) -> Self {
        Self {
            trusted_domain: domain.into().trim_matches('.').to_ascii_lowercase(),
            allow_subdomains,
        }
    }

    /// The trusted domain, lowercased.
    pub fn trusted_domain(&self) -> &str {
        &self.trusted_domain
    }

    /// Returns `true` if `origin` is an `https` origin on the trusted domain.
    ///
    /// An empty trusted domain trusts nothing.
    pub fn is_trusted(&self, origin: &str) -> bool {
        if self.trusted_domain.is_empty() {
            return false;
        }
        let Ok(parsed) = Url::parse(origin) else {
            return false;
        };
        if parsed.scheme() != "https" {
            return false;
        }
        // `Url` lowercases and punycode-normalizes hosts for us.
        let Some(host) = parsed.host_str() else {
            return false;
        };
        if host == self.trusted_domain {
            return true;
        }
        self.allow_subdomains
            && host
                .strip_suffix(self.trusted_domain.as_str())
                .is_some_and(|prefix| prefix.len() > 1 && prefix.ends_with('.'))
    }
}

impl Default for OriginPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TRUSTED_DOMAIN, true)
    }
}
