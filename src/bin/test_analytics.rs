//! qr-test-analytics
//!
//! Show scan analytics of a QR code against `API_URL` using `API_KEY`.

use clap::Parser;

use qrpanel::config::LoggingConfig;
use qrpanel::scripts::{run, Script};
use qrpanel::telemetry::init_tracing;

#[derive(Parser)]
#[command(name = "qr-test-analytics")]
#[command(about = "Show scan analytics of a QR code")]
struct Args {
    /// QR code ID
    id: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(&LoggingConfig {
        level: "warn".to_string(),
        ..Default::default()
    });

    std::process::exit(run(Script::Analytics, args.id).await);
}
