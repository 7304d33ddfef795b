//! Hosts file rendering and persistence.
//!
//! Rendering is pure: the same entries, header and timestamp always give the
//! same bytes. Writing is a separate step so it can be tested on its own.

use crate::api::Device;
use crate::config::SyncConfig;
use crate::error::Result;
use crate::normalize::{HostEntry, normalize_devices, resolve_domain_suffix};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// First line prefix of every generated file.
const TITLE_MARKER: &str = "# Tailscale hosts - Generated";

/// Timestamp layout used in the header.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Metadata written as comments above the entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsHeader {
    /// When the run produced the document.
    pub generated_at: DateTime<Utc>,

    /// Domain suffix applied to every name.
    pub domain_suffix: String,

    pub strip_suffix: bool,

    pub use_fqdn: bool,

    /// Devices returned by the API, including skipped ones.
    pub device_count: usize,
}

impl HostsHeader {
    /// Captures the effective settings of a run.
    #[must_use]
    pub fn new(
        config: &SyncConfig,
        domain_suffix: impl Into<String>,
        device_count: usize,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            generated_at,
            domain_suffix: domain_suffix.into(),
            strip_suffix: config.strip_suffix,
            use_fqdn: config.use_fqdn,
            device_count,
        }
    }
}

/// Renders the hosts file.
///
/// ```text
/// # Tailscale hosts - Generated 2026-01-02T03:04:05Z
/// # Source: Tailscale API (OAuth)
/// # Domain suffix: tailnetname.ts.net
/// # Strip numeric suffixes: true
/// # Use FQDN: true
/// # Devices: 2
///
/// 100.1.2.3 blocky.tailnetname.ts.net
/// fd7a::1 blocky.tailnetname.ts.net
/// ```
#[must_use]
pub fn render_hosts(header: &HostsHeader, entries: &[HostEntry]) -> String {
    let mut lines = vec![
        format!(
            "{TITLE_MARKER} {}",
            header.generated_at.format(TIMESTAMP_FORMAT)
        ),
        "# Source: Tailscale API (OAuth)".to_string(),
        format!("# Domain suffix: {}", header.domain_suffix),
        format!("# Strip numeric suffixes: {}", header.strip_suffix),
        format!("# Use FQDN: {}", header.use_fqdn),
        format!("# Devices: {}", header.device_count),
        String::new(),
    ];
    lines.extend(entries.iter().map(ToString::to_string));

    let mut content = lines.join("\n");
    content.push('\n');
    content
}

/// Runs normalization over `devices` and renders the result.
///
/// The domain suffix is resolved over the whole device list before any
/// name is built.
#[must_use]
pub fn generate_hosts(
    config: &SyncConfig,
    devices: &[Device],
    generated_at: DateTime<Utc>,
) -> String {
    let domain_suffix = resolve_domain_suffix(config, devices);
    let entries = normalize_devices(devices, config, &domain_suffix);
    let header = HostsHeader::new(config, domain_suffix, devices.len(), generated_at);
    render_hosts(&header, &entries)
}

/// Destination of the rendered document.
pub struct HostsFile {
    path: PathBuf,
}

impl HostsFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `content`, creating the parent directory if needed, and
    /// returns the path written.
    ///
    /// The previous file is replaced in place; a failure part-way can leave
    /// it truncated.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Io`](crate::SyncError::Io) if the directory cannot
    /// be created or the file cannot be written.
    pub fn write(&self, content: &str) -> Result<&Path> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(&self.path, content)?;

        tracing::info!(
            path = %self.path.display(),
            bytes = content.len(),
            "Wrote hosts file"
        );
        Ok(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    fn header(device_count: usize) -> HostsHeader {
        let config = SyncConfig::new("id", "secret");
        HostsHeader::new(&config, "tailnetname.ts.net", device_count, fixed_time())
    }

    #[test]
    fn render_full_document() {
        let entries = vec![
            HostEntry::new("100.1.2.3", "blocky.tailnetname.ts.net"),
            HostEntry::new("fd7a::1", "blocky.tailnetname.ts.net"),
        ];
        let content = render_hosts(&header(3), &entries);

        assert_eq!(
            content,
            "# Tailscale hosts - Generated 2026-01-02T03:04:05Z\n\
             # Source: Tailscale API (OAuth)\n\
             # Domain suffix: tailnetname.ts.net\n\
             # Strip numeric suffixes: true\n\
             # Use FQDN: true\n\
             # Devices: 3\n\
             \n\
             100.1.2.3 blocky.tailnetname.ts.net\n\
             fd7a::1 blocky.tailnetname.ts.net\n"
        );
    }

    #[test]
    fn render_without_entries_ends_with_blank_line() {
        let content = render_hosts(&header(0), &[]);
        assert!(content.ends_with("# Devices: 0\n\n"));
    }

    #[test]
    fn header_reflects_flags() {
        let config = SyncConfig::new("id", "secret")
            .with_strip_suffix(false)
            .with_use_fqdn(false);
        let header = HostsHeader::new(&config, "ts.net", 1, fixed_time());
        let content = render_hosts(&header, &[]);

        assert!(content.contains("# Strip numeric suffixes: false\n"));
        assert!(content.contains("# Use FQDN: false\n"));
        assert!(content.contains("# Domain suffix: ts.net\n"));
    }

    #[test]
    fn render_is_deterministic() {
        let entries = vec![HostEntry::new("100.0.0.1", "a.ts.net")];
        assert_eq!(
            render_hosts(&header(1), &entries),
            render_hosts(&header(1), &entries)
        );
    }

    #[test]
    fn generate_counts_devices_not_entries() {
        let config = SyncConfig::new("id", "secret");
        let devices = vec![
            Device::new("blocky-1.mytailnet.ts.net", "blocky-1", ["100.1.2.3"]),
            Device::new("blocky-2.mytailnet.ts.net", "blocky-2", ["100.1.2.3"]),
            Device::new("offline.mytailnet.ts.net", "offline", Vec::<String>::new()),
        ];
        let content = generate_hosts(&config, &devices, fixed_time());

        assert!(content.contains("# Domain suffix: mytailnet.ts.net\n"));
        assert!(content.contains("# Devices: 3\n"));
        assert_eq!(content.matches("100.1.2.3 blocky.mytailnet.ts.net\n").count(), 1);
        assert!(!content.contains("offline"));
    }

    #[test]
    fn generate_twice_is_identical() {
        let config = SyncConfig::new("id", "secret").with_use_fqdn(false);
        let devices = vec![Device::new("", "nginx-proxy-2", ["100.1.2.3", "fd7a::1"])];
        assert_eq!(
            generate_hosts(&config, &devices, fixed_time()),
            generate_hosts(&config, &devices, fixed_time())
        );
    }

    #[test]
    fn write_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("hosts");
        let file = HostsFile::new(&path);

        let written = file.write("100.0.0.1 a.ts.net\n").unwrap();
        assert_eq!(written, path.as_path());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "100.0.0.1 a.ts.net\n"
        );
        assert_eq!(file.path(), path.as_path());
    }

    #[test]
    fn write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let file = HostsFile::new(dir.path().join("hosts"));

        file.write("old\n").unwrap();
        file.write("new\n").unwrap();
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "new\n");
    }

    #[test]
    fn write_into_file_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let file = HostsFile::new(blocker.join("hosts"));
        let err = file.write("x\n").unwrap_err();
        assert!(matches!(err, crate::SyncError::Io(_)));
    }
}
