use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use alert_transports::config::Config;
use alert_transports::device::StaticDeviceCache;
use alert_transports::transport::{dingtalk::DingtalkTransport, TransportRegistry};
use alert_transports::types::AlertEvent;

#[derive(Parser, Debug)]
#[command(name = "alert-send", version, about = "Deliver a normalized alert event through the configured transports")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "/etc/alert-transports/config.toml")]
    config: String,

    /// Path to the alert event JSON ("-" reads stdin)
    #[arg(short, long, default_value = "-")]
    alert: String,

    /// Validate config and exit
    #[arg(long)]
    check: bool,

    /// Print transport configuration templates as JSON and exit
    #[arg(long)]
    schema: bool,
}

#[tokio::main(worker_threads = 2)]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.schema {
        let templates = serde_json::json!({
            "dingtalk": DingtalkTransport::config_template(),
        });
        println!("{}", serde_json::to_string_pretty(&templates)?);
        return Ok(());
    }

    // Load configuration
    let config = Config::load(&cli.config)?;

    if cli.check {
        println!("Configuration is valid.");
        return Ok(());
    }

    // Initialize logging
    init_logging(&config)?;

    let alert = read_alert(&cli.alert)?;

    let resolver = Arc::new(StaticDeviceCache::new(&config.devices));
    let registry = TransportRegistry::new(&config, resolver)?;
    if registry.is_empty() {
        anyhow::bail!("No transports enabled in configuration");
    }

    info!(
        hostname = %alert.hostname,
        state = alert.state,
        "Dispatching alert"
    );

    if !registry.dispatch(&alert).await {
        error!("One or more transports failed to deliver the alert");
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(config: &Config) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(&config.agent.log_level)
        });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    Ok(())
}

fn read_alert(path: &str) -> Result<AlertEvent> {
    let raw = if path == "-" {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read alert from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read alert file: {}", path))?
    };
    serde_json::from_str(&raw).context("Failed to parse alert event JSON")
}
