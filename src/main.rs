use anyhow::{Context, Result};
use axis_discover::{Discovery, DiscoveryConfig, DEFAULT_FETCH_TIMEOUT, SSDP_MULTICAST_V4, SSDP_PORT};
use clap::{ArgAction, Parser};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Find Axis devices on the local network and list them by model
#[derive(Parser, Debug)]
#[command(name = "axis-discover", version, about, disable_version_flag = true)]
struct Args {
    /// Broadcast or multicast address to send the discovery query to
    #[arg(default_value_t = SSDP_MULTICAST_V4.to_string())]
    address: String,

    /// Port the discovery query is sent to
    #[arg(short, long, default_value_t = SSDP_PORT)]
    port: u16,

    /// How long to wait for replies, in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    timeout: u64,

    /// Time allowed for each descriptor download, in milliseconds
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT.as_millis() as u64)]
    fetch_timeout: u64,

    /// Maximum number of descriptor downloads running at once
    #[arg(short, long, default_value_t = axis_discover::DEFAULT_MAX_CONCURRENT_FETCHES)]
    jobs: usize,

    /// Print one JSON object per device instead of columns
    #[arg(long)]
    json: bool,

    /// Log discovery progress to stderr
    #[arg(long)]
    verbose: bool,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = DiscoveryConfig::default()
        .with_target(args.address.as_str())
        .with_port(args.port)
        .with_window(Duration::from_millis(args.timeout))
        .with_fetch_timeout(Duration::from_millis(args.fetch_timeout))
        .with_max_concurrent_fetches(args.jobs);

    let registry = Discovery::new(config)
        .run()
        .await
        .with_context(|| format!("Discovery via {} failed", args.address))?;

    for device in registry.drain() {
        if args.json {
            println!("{}", device.to_json()?);
        } else {
            println!("{}", device);
        }
    }

    Ok(())
}
