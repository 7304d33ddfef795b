//! Sync run configuration.

use crate::error::{Result, SyncError};
use std::path::PathBuf;
use std::time::Duration;

/// Default destination for the rendered hosts file.
pub const DEFAULT_OUTPUT_FILE: &str = "/output/hosts";

/// Tailnet identifier meaning "the tailnet the credentials belong to".
pub const DEFAULT_TAILNET: &str = "-";

/// Default Tailscale API origin.
pub const DEFAULT_API_URL: &str = "https://api.tailscale.com";

/// Default timeout for each network call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved options for a single sync run. Built once, then only read.
///
/// # Example
///
/// ```
/// use tailscale_hosts_sync::SyncConfig;
///
/// let config = SyncConfig::new("client-id", "client-secret")
///     .with_domain_suffix("tailnetname.ts.net")
///     .with_strip_suffix(false);
///
/// assert_eq!(config.tailnet, "-");
/// assert_eq!(config.domain_suffix.as_deref(), Some("tailnetname.ts.net"));
/// assert!(config.use_fqdn);
/// assert!(!config.strip_suffix);
/// ```
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// OAuth client identifier.
    pub client_id: String,

    /// OAuth client secret.
    pub client_secret: String,

    /// Where the hosts file is written.
    pub output_file: PathBuf,

    /// Tailnet to list devices from (`-` selects the credential's default).
    pub tailnet: String,

    /// Explicit domain suffix. `None` means auto-detect from device names.
    pub domain_suffix: Option<String>,

    /// Strip a trailing `-<digits>` disambiguation suffix from hostnames.
    pub strip_suffix: bool,

    /// Derive names from the provider FQDN instead of the raw hostname.
    pub use_fqdn: bool,

    /// API origin, without a trailing slash.
    pub api_url: String,

    /// Timeout applied to each network call.
    pub timeout: Duration,
}

impl SyncConfig {
    /// Creates a config with the given credentials and defaults for everything else.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            tailnet: DEFAULT_TAILNET.to_string(),
            domain_suffix: None,
            strip_suffix: true,
            use_fqdn: true,
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the output file path.
    #[must_use]
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = path.into();
        self
    }

    /// Overrides the tailnet.
    #[must_use]
    pub fn with_tailnet(mut self, tailnet: impl Into<String>) -> Self {
        self.tailnet = tailnet.into();
        self
    }

    /// Sets an explicit domain suffix. Empty input keeps auto-detection.
    #[must_use]
    pub fn with_domain_suffix(mut self, suffix: impl AsRef<str>) -> Self {
        let suffix = suffix.as_ref().trim().trim_start_matches('.');
        self.domain_suffix = (!suffix.is_empty()).then(|| suffix.to_string());
        self
    }

    #[must_use]
    pub const fn with_strip_suffix(mut self, strip: bool) -> Self {
        self.strip_suffix = strip;
        self
    }

    #[must_use]
    pub const fn with_use_fqdn(mut self, use_fqdn: bool) -> Self {
        self.use_fqdn = use_fqdn;
        self
    }

    /// Overrides the API origin (useful for testing).
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Checks that both credentials are present.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] naming the missing variables.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() || self.client_secret.trim().is_empty() {
            return Err(SyncError::Config(
                "TAILSCALE_CLIENT_ID and TAILSCALE_CLIENT_SECRET are required".into(),
            ));
        }
        if self.tailnet.is_empty() {
            return Err(SyncError::Config("TAILNET must not be empty".into()));
        }
        Ok(())
    }
}

/// Parses an on/off setting. `true`, `1` and `yes` (any case) are on.
#[must_use]
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_defaults() {
        let c = SyncConfig::new("id", "secret");
        assert_eq!(c.output_file, PathBuf::from("/output/hosts"));
        assert_eq!(c.tailnet, "-");
        assert_eq!(c.domain_suffix, None);
        assert!(c.strip_suffix);
        assert!(c.use_fqdn);
        assert_eq!(c.api_url, "https://api.tailscale.com");
        assert_eq!(c.timeout, Duration::from_secs(30));
    }

    #[test]
    fn empty_domain_suffix_means_autodetect() {
        let c = SyncConfig::new("id", "secret").with_domain_suffix("");
        assert_eq!(c.domain_suffix, None);

        let c = SyncConfig::new("id", "secret").with_domain_suffix(".example.ts.net");
        assert_eq!(c.domain_suffix.as_deref(), Some("example.ts.net"));
    }

    #[test]
    fn api_url_trailing_slash_trimmed() {
        let c = SyncConfig::new("id", "secret").with_api_url("http://127.0.0.1:8080/");
        assert_eq!(c.api_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn validate_requires_credentials() {
        assert!(SyncConfig::new("id", "secret").validate().is_ok());
        assert!(matches!(
            SyncConfig::new("", "secret").validate(),
            Err(SyncError::Config(_))
        ));
        assert!(matches!(
            SyncConfig::new("id", "  ").validate(),
            Err(SyncError::Config(_))
        ));
    }

    #[test]
    fn flag_values() {
        for on in ["true", "TRUE", "1", "yes", "Yes"] {
            assert!(parse_flag(on), "{on}");
        }
        for off in ["false", "0", "no", "", "on"] {
            assert!(!parse_flag(off), "{off}");
        }
    }
}
