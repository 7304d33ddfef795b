//! Hostname normalization.
//!
//! Turns raw [`Device`] records into `(address, canonical name)` pairs. The
//! canonical name is `<label>.<domain suffix>`, where the label comes either
//! from the first component of the provider FQDN or from the raw hostname,
//! optionally with a trailing `-<digits>` disambiguation suffix removed.

use crate::api::Device;
use crate::config::SyncConfig;
use std::collections::HashSet;
use std::fmt;

/// Root domain of every Tailscale MagicDNS name.
pub const ROOT_DOMAIN: &str = "ts.net";

/// One line of the hosts file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostEntry {
    pub address: String,
    pub name: String,
}

impl HostEntry {
    #[must_use]
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for HostEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.address, self.name)
    }
}

/// Removes one trailing `-<digits>` suffix.
///
/// ```
/// use tailscale_hosts_sync::normalize::strip_numeric_suffix;
///
/// assert_eq!(strip_numeric_suffix("blocky-1"), "blocky");
/// assert_eq!(strip_numeric_suffix("nginx-proxy-2"), "nginx-proxy");
/// assert_eq!(strip_numeric_suffix("myserver"), "myserver");
/// ```
#[must_use]
pub fn strip_numeric_suffix(hostname: &str) -> &str {
    let digits = hostname.bytes().rev().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return hostname;
    }
    hostname[..hostname.len() - digits]
        .strip_suffix('-')
        .unwrap_or(hostname)
}

/// Finds the tailnet-wide suffix from the first device FQDN under [`ROOT_DOMAIN`].
///
/// Returns everything after the first `.` of that name, or `None` if no
/// device qualifies.
#[must_use]
pub fn detect_domain_suffix(devices: &[Device]) -> Option<String> {
    devices.iter().find_map(|device| {
        let name = trim_root(&device.name);
        if !is_under_root(name) {
            return None;
        }
        name.split_once('.')
            .map(|(_, rest)| rest)
            .filter(|rest| !rest.is_empty())
            .map(str::to_string)
    })
}

/// Returns the suffix used for every canonical name in this run.
///
/// An explicit suffix wins, then auto-detection, then [`ROOT_DOMAIN`].
#[must_use]
pub fn resolve_domain_suffix(config: &SyncConfig, devices: &[Device]) -> String {
    if let Some(explicit) = &config.domain_suffix {
        return explicit.clone();
    }
    detect_domain_suffix(devices).map_or_else(
        || {
            tracing::debug!("No tailnet FQDN found, falling back to root domain");
            ROOT_DOMAIN.to_string()
        },
        |detected| {
            tracing::debug!(suffix = %detected, "Detected tailnet domain suffix");
            detected
        },
    )
}

/// Maps devices to host entries in device order, then address order.
///
/// Devices without addresses or without the relevant name field are
/// skipped, as are FQDN-mode names without a `.`. An `(address, name)`
/// pair already emitted earlier in the run is suppressed.
#[must_use]
pub fn normalize_devices(
    devices: &[Device],
    config: &SyncConfig,
    domain_suffix: &str,
) -> Vec<HostEntry> {
    let mut seen: HashSet<(&str, String)> = HashSet::new();
    let mut entries = Vec::new();

    for device in devices {
        let Some(label) = candidate_label(device, config) else {
            continue;
        };
        let name = format!("{label}.{domain_suffix}");

        for address in &device.addresses {
            if !seen.insert((address.as_str(), name.clone())) {
                tracing::debug!(address = %address, host = %name, "Skipping duplicate entry");
                continue;
            }
            entries.push(HostEntry::new(address.as_str(), name.as_str()));
        }
    }
    entries
}

/// Picks and strips the label for one device, or `None` if it is skipped.
fn candidate_label<'a>(device: &'a Device, config: &SyncConfig) -> Option<&'a str> {
    if device.addresses.is_empty() {
        tracing::debug!(
            device = %device.name,
            hostname = %device.hostname,
            "Skipping device without addresses"
        );
        return None;
    }

    let raw = if config.use_fqdn {
        let fqdn = trim_root(&device.name);
        match fqdn.split_once('.') {
            Some((label, _)) => label,
            None => {
                tracing::debug!(device = %device.name, "Skipping device without a dotted name");
                return None;
            }
        }
    } else {
        device.hostname.trim()
    };

    let label = if config.strip_suffix {
        strip_numeric_suffix(raw)
    } else {
        raw
    };

    if label.is_empty() {
        tracing::debug!(
            device = %device.name,
            hostname = %device.hostname,
            "Skipping device without a usable name"
        );
        return None;
    }
    Some(label)
}

fn trim_root(name: &str) -> &str {
    name.trim().trim_end_matches('.')
}

fn is_under_root(name: &str) -> bool {
    name.strip_suffix(ROOT_DOMAIN)
        .is_some_and(|head| head.len() > 1 && head.ends_with('.'))
}
