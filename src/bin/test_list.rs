//! qr-test-list
//!
//! List the first five QR codes against `API_URL` using `API_KEY`.

use clap::Parser;

use qrpanel::config::LoggingConfig;
use qrpanel::scripts::{run, Script};
use qrpanel::telemetry::init_tracing;

#[derive(Parser)]
#[command(name = "qr-test-list")]
#[command(about = "List the first five QR codes")]
struct Args {}

#[tokio::main]
async fn main() {
    Args::parse();
    init_tracing(&LoggingConfig {
        level: "warn".to_string(),
        ..Default::default()
    });

    std::process::exit(run(Script::List, None).await);
}
