//! # tailscale-hosts-sync
//!
//! Render the devices of a Tailscale tailnet into a static hosts file for a
//! local DNS resolver (Blocky, Pi-hole, dnsmasq, CoreDNS `hosts` plugin).
//!
//! A run is a single linear pass with no state carried between runs:
//!
//! 1. [`ApiClient::exchange_token`] trades OAuth client credentials for a
//!    short-lived bearer token.
//! 2. [`ApiClient::fetch_devices`] lists every device in the tailnet.
//! 3. [`normalize::normalize_devices`] derives one canonical name per device
//!    and emits each `(address, name)` pair once.
//! 4. [`render_hosts`] serializes the entries under a comment header and
//!    [`HostsFile::write`] puts the document on disk.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use tailscale_hosts_sync::{ApiClient, HostsFile, SyncConfig, generate_hosts};
//!
//! let config = SyncConfig::new(client_id, client_secret)
//!     .with_output_file("/etc/blocky/hosts");
//! config.validate()?;
//!
//! let api = ApiClient::new(&config)?;
//! let token = api.exchange_token(&config.client_id, &config.client_secret)?;
//! let devices = api.fetch_devices(&token, &config.tailnet)?;
//!
//! let content = generate_hosts(&config, &devices, chrono::Utc::now());
//! HostsFile::new(&config.output_file).write(&content)?;
//! ```
//!
//! ## Naming
//!
//! With `use_fqdn` (the default) the label is the first component of the
//! MagicDNS name, e.g. `blocky-1` from `blocky-1.tailnetname.ts.net`.
//! Otherwise the raw `hostname` field is used. With `strip_suffix` a single
//! trailing `-<digits>` is removed, so `blocky-1` and `blocky-2` both resolve
//! as `blocky.<suffix>`.
//!
//! When no domain suffix is configured it is detected from the first device
//! name under `ts.net`, falling back to `ts.net` itself.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod error;
pub mod hosts_file;
pub mod normalize;

pub use api::{ApiClient, Device};
pub use config::{SyncConfig, parse_flag};
pub use error::{Result, SyncError};
pub use hosts_file::{HostsFile, HostsHeader, generate_hosts, render_hosts};
pub use normalize::HostEntry;
