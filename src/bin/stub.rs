//! QR API stub server
//!
//! Local stand-in for the hosted QR API, used for development and tests.
//!
//! Run with: cargo run --bin qrpanel-stub
//!
//! # Configuration
//!
//! Reads the `[stub]` and `[logging]` sections of the config file given with
//! `--config` (default: <config dir>/qrpanel/config.toml). Environment
//! variables override it:
//! - `QRPANEL_STUB_HOST`: Host to bind to (default: 127.0.0.1)
//! - `QRPANEL_STUB_PORT`: Port to listen on (default: 5000)
//! - `QRPANEL_LOG_LEVEL`: Log level (default: info)
//! - `RUST_LOG`: Overrides the log level

use clap::Parser;
use std::path::PathBuf;

use qrpanel::config::Config;
use qrpanel::stub::{serve, StubState};
use qrpanel::telemetry::init_tracing;

#[derive(Parser)]
#[command(name = "qrpanel-stub")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Local stub of the QR code management API")]
struct Args {
    /// Config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Extra API key to accept, as its own account (repeatable)
    #[arg(short = 'k', long = "api-key")]
    api_keys: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let path = args.config.unwrap_or_else(Config::default_path);
    let mut config = Config::load_with_env(&path)?;
    init_tracing(&config.logging);

    if let Some(port) = args.port {
        config.stub.port = port;
    }
    config.stub.api_keys.extend(args.api_keys);

    tracing::info!("Starting QR stub server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Plan limit: {} QR codes, rate limit: {} requests/min",
        config.stub.plan_limit,
        config.stub.rate_limit_per_minute
    );
    for key in &config.stub.api_keys {
        tracing::info!("Accepting API key {}", qrpanel::model::mask_key(key));
    }

    serve(StubState::new(config.stub)).await?;
    Ok(())
}
