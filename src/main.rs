use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tailscale_hosts_sync::config::{DEFAULT_API_URL, DEFAULT_OUTPUT_FILE, DEFAULT_TAILNET};
use tailscale_hosts_sync::{
    ApiClient, HostsFile, Result, SyncConfig, generate_hosts, parse_flag,
};
use tracing_subscriber::EnvFilter;

/// Sync Tailscale device names into a hosts file.
///
/// Every option can also be set through the environment variable shown.
#[derive(Debug, Parser)]
#[command(name = "tailscale-hosts-sync", version, about)]
struct Cli {
    /// OAuth client ID.
    #[arg(long, env = "TAILSCALE_CLIENT_ID", hide_env_values = true)]
    client_id: Option<String>,

    /// OAuth client secret.
    #[arg(long, env = "TAILSCALE_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Path of the hosts file to write.
    #[arg(long, env = "OUTPUT_FILE", default_value = DEFAULT_OUTPUT_FILE)]
    output_file: PathBuf,

    /// Tailnet name; `-` selects the tailnet of the credentials.
    #[arg(long, env = "TAILNET", default_value = DEFAULT_TAILNET)]
    tailnet: String,

    /// Domain suffix for every name; empty means auto-detect.
    #[arg(long, env = "DOMAIN_SUFFIX", default_value = "")]
    domain_suffix: String,

    /// Strip numeric suffixes like -1, -2 (true/1/yes).
    #[arg(long, env = "STRIP_SUFFIX", default_value = "true", action = ArgAction::Set, value_parser = flag)]
    strip_suffix: bool,

    /// Derive names from the MagicDNS name instead of the hostname (true/1/yes).
    #[arg(long, env = "USE_FQDN", default_value = "true", action = ArgAction::Set, value_parser = flag)]
    use_fqdn: bool,

    /// Tailscale API origin.
    #[arg(long, env = "TAILSCALE_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Timeout for each API request, in seconds.
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,
}

#[allow(clippy::unnecessary_wraps)]
fn flag(value: &str) -> std::result::Result<bool, String> {
    Ok(parse_flag(value))
}

impl Cli {
    fn into_config(self) -> Result<SyncConfig> {
        let config = SyncConfig::new(
            self.client_id.unwrap_or_default(),
            self.client_secret.unwrap_or_default(),
        )
        .with_output_file(self.output_file)
        .with_tailnet(self.tailnet)
        .with_domain_suffix(self.domain_suffix)
        .with_strip_suffix(self.strip_suffix)
        .with_use_fqdn(self.use_fqdn)
        .with_api_url(self.api_url)
        .with_timeout(Duration::from_secs(self.timeout_secs));

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    init_logging();

    let (config, api) = match Cli::parse()
        .into_config()
        .and_then(|config| ApiClient::new(&config).map(|api| (config, api)))
    {
        Ok(setup) => setup,
        Err(e) => {
            println!("ERROR: {e}");
            return ExitCode::from(e.exit_code());
        }
    };

    match run(&config, &api) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("   FAILED - {e}");
            tracing::error!(error = %e, timeout = e.is_timeout(), "Sync failed");
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(config: &SyncConfig, api: &ApiClient) -> Result<()> {
    let rule = "=".repeat(40);
    println!("Tailscale Hosts Sync");
    println!("{rule}");

    println!("1. Authenticating with Tailscale API...");
    let token = api.exchange_token(&config.client_id, &config.client_secret)?;
    println!("   OK - Got access token");

    println!("2. Fetching devices from tailnet...");
    let devices = api.fetch_devices(&token, &config.tailnet)?;
    println!("   OK - Found {} devices", devices.len());

    println!(
        "3. Generating hosts file (strip_suffix={}, use_fqdn={})...",
        config.strip_suffix, config.use_fqdn
    );
    let content = generate_hosts(config, &devices, chrono::Utc::now());

    let hosts = HostsFile::new(&config.output_file);
    println!("4. Writing to {}...", hosts.path().display());
    let written = hosts.write(&content)?;
    println!("   OK - Hosts file written to {}", written.display());

    println!();
    println!("Generated hosts:");
    println!("{}", "-".repeat(40));
    println!("{content}");
    println!("{rule}");
    println!("Sync complete");
    Ok(())
}
