//! qr-test-create
//!
//! Create a test QR code against `API_URL` using `API_KEY`.

use clap::Parser;

use qrpanel::config::LoggingConfig;
use qrpanel::scripts::{run, Script};
use qrpanel::telemetry::init_tracing;

#[derive(Parser)]
#[command(name = "qr-test-create")]
#[command(about = "Create a test QR code")]
struct Args {}

#[tokio::main]
async fn main() {
    Args::parse();
    init_tracing(&LoggingConfig {
        level: "warn".to_string(),
        ..Default::default()
    });

    std::process::exit(run(Script::Create, None).await);
}
