//! qr-test-delete
//!
//! Delete a QR code against `API_URL` using `API_KEY`.

use clap::Parser;

use qrpanel::config::LoggingConfig;
use qrpanel::scripts::{run, Script};
use qrpanel::telemetry::init_tracing;

#[derive(Parser)]
#[command(name = "qr-test-delete")]
#[command(about = "Delete a QR code")]
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

    std::process::exit(run(Script::Delete, args.id).await);
}
