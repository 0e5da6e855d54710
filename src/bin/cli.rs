//! qrpanel CLI
//!
//! Command-line dashboard for the QR code management API:
//! - Configure and verify the API key
//! - Create, list, update and delete QR codes
//! - Inspect scan analytics
//! - Manage API keys
//! - Browse the API reference and per-type guides

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use qrpanel::client::{QrApi, QrApiClient};
use qrpanel::config::{generate_default_config, Config};
use qrpanel::dashboard::{
    self, AnalyticsPanel, ConnectionSettings, CreateForm, DashboardError, QrListView,
    MISSING_KEY_MESSAGE,
};
use qrpanel::docs::{ApiReference, TypeGuide};
use qrpanel::model::{
    mask_key, ApiKey, CreateApiKeyRequest, CustomDesign, ErrorCorrectionLevel, QrCode,
    QrCodeType, UpdateApiKeyRequest, UpdateQrRequest,
};
use qrpanel::render::{self, OutputFormat};
use qrpanel::telemetry::init_tracing;

#[derive(Parser)]
#[command(name = "qrpanel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dashboard for a hosted QR code management API")]
#[command(long_about = "qrpanel manages dynamic QR codes through the public QR API.\nCreate codes of 19 types, track their scans and manage your API keys.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: <config dir>/qrpanel/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Test an API key and save it on success
    Configure {
        /// API key
        api_key: String,
        /// API base URL (default: the saved one)
        #[arg(long)]
        url: Option<String>,
    },

    /// Show the configured connection and check the key
    Status,

    /// Create a QR code
    Create {
        /// Display name
        name: String,
        /// QR type (see `qrpanel types`)
        #[arg(short = 't', long = "type", default_value = "URL")]
        qr_type: QrCodeType,
        /// Destination URL for URL-like types
        #[arg(short, long)]
        url: Option<String>,
        /// qrData field in key=value format, e.g. -F ssid=Office
        #[arg(short = 'F', long = "field")]
        fields: Vec<String>,
        /// Custom short code (3-50 chars of letters, digits, '-' and '_')
        #[arg(long)]
        short_code: Option<String>,
        /// Password required to open the code
        #[arg(long)]
        password: Option<String>,
        /// Expiry, e.g. 2025-01-31T18:00 (UTC) or RFC 3339
        #[arg(long)]
        expires: Option<String>,
        /// Deactivate after this many scans
        #[arg(long)]
        scan_limit: Option<String>,
        #[command(flatten)]
        design: DesignArgs,
    },

    /// List QR codes
    List {
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Page size
        #[arg(short, long, default_value = "10")]
        limit: u32,
        /// Filter by name, short code or URL
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one QR code
    Get {
        id: String,
    },

    /// Update a QR code
    Update {
        id: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New destination URL
        #[arg(short, long)]
        url: Option<String>,
        /// Reactivate the code
        #[arg(long, conflicts_with = "deactivate")]
        activate: bool,
        /// Stop the code from resolving
        #[arg(long)]
        deactivate: bool,
    },

    /// Delete a QR code
    Delete {
        id: String,
    },

    /// Show scan analytics of a QR code
    Analytics {
        id: String,
    },

    /// Manage API keys
    Keys {
        #[command(subcommand)]
        command: KeyCommands,
    },

    /// Print the API reference, or the guide of one type
    Docs {
        /// QR type to describe
        #[arg(short = 't', long = "type")]
        qr_type: Option<QrCodeType>,
    },

    /// List the supported QR types
    Types,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum KeyCommands {
    /// Create an API key; the full key is shown only once
    Create {
        name: String,
        /// Expiry, e.g. 2025-12-31T00:00 (UTC) or RFC 3339
        #[arg(long)]
        expires: Option<String>,
    },
    /// List API keys
    List,
    /// Show one API key
    Get { id: String },
    /// Rename an API key or change its expiry
    Update {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        expires: Option<String>,
    },
    /// Revoke an API key
    Revoke { id: String },
}

/// Advanced design options; any of them enables a custom design
#[derive(Args, Default)]
pub struct DesignArgs {
    /// Use the default custom design (white background, black modules)
    #[arg(long)]
    design: bool,
    /// Background color, e.g. #FFFFFF
    #[arg(long)]
    bg_color: Option<String>,
    /// Foreground color, e.g. #000000
    #[arg(long)]
    fg_color: Option<String>,
    /// Quiet zone in modules
    #[arg(long)]
    margin: Option<u32>,
    /// Image width in pixels (100-2000)
    #[arg(long)]
    width: Option<u32>,
    /// Error correction level (L, M, Q, H)
    #[arg(long)]
    ecc: Option<ErrorCorrectionLevel>,
    /// Dot style, e.g. rounded
    #[arg(long)]
    dots_type: Option<String>,
    /// Logo image URL
    #[arg(long)]
    logo: Option<String>,
    /// Logo size as a fraction of the image (0.1-0.5)
    #[arg(long)]
    logo_size: Option<f32>,
}

impl DesignArgs {
    fn into_design(self) -> Option<CustomDesign> {
        let any = self.design
            || self.bg_color.is_some()
            || self.fg_color.is_some()
            || self.margin.is_some()
            || self.width.is_some()
            || self.ecc.is_some()
            || self.dots_type.is_some()
            || self.logo.is_some()
            || self.logo_size.is_some();
        if !any {
            return None;
        }

        let mut design = CustomDesign::dashboard_default();
        if let Some(c) = self.bg_color {
            design.background_color = Some(c);
        }
        if let Some(c) = self.fg_color {
            design.foreground_color = Some(c);
        }
        if let Some(m) = self.margin {
            design.margin = Some(m);
        }
        if let Some(w) = self.width {
            design.width = Some(w);
        }
        design.error_correction_level = self.ecc;
        design.dots_type = self.dots_type;
        design.image_url = self.logo;
        design.image_size = self.logo_size;
        Some(design)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_with_env(&config_path)?;
    init_tracing(&config.logging);

    let format = cli.format;

    match cli.command {
        Commands::Configure { api_key, url } => {
            let mut settings = ConnectionSettings::load(&config_path)?;
            let url = url.unwrap_or_else(|| settings.api().base_url.clone());

            match settings.test_and_save(&api_key, &url).await {
                Ok(()) => {
                    println!("API key verified and saved to {:?}", settings.path());
                    println!("  URL: {}", settings.api().base_url);
                    println!("  Key: {}", mask_key(&api_key));
                }
                Err(e) => fail(&e),
            }
        }

        Commands::Status => {
            println!("qrpanel v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Config:   {:?}", config_path);
            println!("API URL:  {}", config.api.base_url);
            println!("Auth:     {}", config.api.auth_scheme);

            let Some(key) = config.api.api_key() else {
                println!("API key:  not set");
                println!();
                println!("Set one with:");
                println!("  qrpanel configure <api-key>");
                return Ok(());
            };
            println!("API key:  {}", mask_key(key));

            let client = require_client(&config)?;
            match client.verify_key().await {
                Ok(()) => println!("Status:   connected"),
                Err(e) => {
                    eprintln!("Status:   {}", e.display_message("Cannot reach the QR service"));
                    std::process::exit(1);
                }
            }
        }

        Commands::Create {
            name,
            qr_type,
            url,
            fields,
            short_code,
            password,
            expires,
            scan_limit,
            design,
        } => {
            let client = require_client(&config)?;

            let mut form = CreateForm::new(qr_type);
            form.name = name;
            form.destination_url = url.unwrap_or_default();
            form.short_code = short_code.unwrap_or_default();
            form.password = password.unwrap_or_default();
            form.expires_at = expires.unwrap_or_default();
            form.scan_limit = scan_limit.unwrap_or_default();
            form.design = design.into_design();

            let allowed = CreateForm::field_keys(qr_type);
            for field in fields {
                let Some((key, value)) = field.split_once('=') else {
                    eprintln!("Invalid field '{}': expected key=value", field);
                    std::process::exit(1);
                };
                if !allowed.contains(&key) {
                    eprintln!("Unknown field '{}' for {} codes", key, qr_type);
                    if !allowed.is_empty() {
                        eprintln!("Fields: {}", allowed.join(", "));
                    }
                    std::process::exit(1);
                }
                form.set_field(key, value);
            }

            match form.submit(Some(&client)).await {
                Ok(qr) => {
                    if format == OutputFormat::Table {
                        println!("QR code created successfully");
                        println!();
                    }
                    print_qr(&qr, format)?;
                }
                Err(e) => fail(&e),
            }
        }

        Commands::List {
            page,
            limit,
            search,
        } => {
            let client = require_client(&config)?;
            let mut view = QrListView::new(limit.clamp(1, 100));
            view.set_search(search);

            if let Err(e) = view.fetch_page(Some(&client), page).await {
                fail(&e);
            }

            let meta = view.meta();
            match format {
                OutputFormat::Json => {
                    let body = serde_json::json!({ "data": view.items(), "meta": meta });
                    println!("{}", render::json(&body)?);
                }
                OutputFormat::Csv => print!("{}", render::qr_csv(view.items())?),
                OutputFormat::Table => {
                    println!("{}", render::qr_table(view.items(), Some(&meta)));
                    if view.items().is_empty() && meta.page == 1 {
                        println!();
                        println!("Create your first QR code with:");
                        println!("  qrpanel create \"My website\" --url https://example.com");
                    }
                }
            }
        }

        Commands::Get { id } => {
            let client = require_client(&config)?;
            match client.get_qr(&id).await {
                Ok(qr) => print_qr(&qr, format)?,
                Err(e) => fail(&DashboardError::request(e, "Failed to fetch QR code")),
            }
        }

        Commands::Update {
            id,
            name,
            url,
            activate,
            deactivate,
        } => {
            let client = require_client(&config)?;
            let update = UpdateQrRequest {
                name,
                destination_url: url,
                is_active: match (activate, deactivate) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
            };
            if update.is_empty() {
                eprintln!("Nothing to update: pass --name, --url, --activate or --deactivate");
                std::process::exit(1);
            }

            let mut view = QrListView::default();
            match view.update(Some(&client), &id, &update).await {
                Ok(qr) => {
                    if format == OutputFormat::Table {
                        println!("QR code updated successfully");
                        println!();
                    }
                    print_qr(&qr, format)?;
                }
                Err(e) => fail(&e),
            }
        }

        Commands::Delete { id } => {
            let client = require_client(&config)?;
            let mut view = QrListView::default();
            match view.delete(Some(&client), &id).await {
                Ok(()) => println!("QR code deleted successfully"),
                Err(e) => fail(&e),
            }
        }

        Commands::Analytics { id } => {
            let client = require_client(&config)?;
            let mut panel = AnalyticsPanel::new();
            let analytics = match panel.load(Some(&client), &id).await {
                Ok(a) => a,
                Err(e) => fail(&e),
            };

            match format {
                OutputFormat::Json => println!("{}", render::json(analytics)?),
                OutputFormat::Csv => print!("{}", render::analytics_csv(analytics)?),
                OutputFormat::Table => println!("{}", render::analytics_text(analytics)),
            }
        }

        Commands::Keys { command } => {
            let client = require_client(&config)?;
            run_key_command(&client, command, format).await?;
        }

        Commands::Docs { qr_type } => match qr_type {
            Some(t) => println!("{}", TypeGuide::for_type(t)),
            None => println!(
                "{}",
                ApiReference {
                    base_url: &config.api.base_url
                }
            ),
        },

        Commands::Types => {
            println!("{:<14} {:<18} {}", "Type", "Name", "Description");
            println!("{}", "-".repeat(80));
            for guide in TypeGuide::all() {
                println!(
                    "{:<14} {:<18} {}",
                    guide.qr_type.as_str(),
                    guide.name,
                    guide.description
                );
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();

            if let Some(path) = output {
                std::fs::write(&path, &content)?;
                println!("Config written to {:?}", path);
            } else {
                println!("{}", content);
            }
        }
    }

    Ok(())
}

async fn run_key_command(
    client: &QrApiClient,
    command: KeyCommands,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        KeyCommands::Create { name, expires } => {
            let request = CreateApiKeyRequest {
                name,
                expires_at: parse_expiry(expires.as_deref()),
            };
            match client.create_api_key(&request).await {
                Ok(key) => {
                    if format == OutputFormat::Json {
                        println!("{}", render::json(&key)?);
                    } else {
                        println!("API key created: {}", key.name);
                        println!();
                        println!("  {}", key.key);
                        println!();
                        println!("Copy it now; it will not be shown again.");
                    }
                }
                Err(e) => fail(&DashboardError::request(e, "Failed to create API key")),
            }
        }

        KeyCommands::List => match client.list_api_keys().await {
            Ok(keys) => print_keys(&keys, format)?,
            Err(e) => fail(&DashboardError::request(e, "Failed to fetch API keys")),
        },

        KeyCommands::Get { id } => match client.get_api_key(&id).await {
            Ok(key) => print_keys(&[key], format)?,
            Err(e) => fail(&DashboardError::request(e, "Failed to fetch API key")),
        },

        KeyCommands::Update { id, name, expires } => {
            let update = UpdateApiKeyRequest {
                name,
                expires_at: parse_expiry(expires.as_deref()),
            };
            match client.update_api_key(&id, &update).await {
                Ok(key) => print_keys(&[key], format)?,
                Err(e) => fail(&DashboardError::request(e, "Failed to update API key")),
            }
        }

        KeyCommands::Revoke { id } => match client.revoke_api_key(&id).await {
            Ok(()) => println!("API key revoked"),
            Err(e) => fail(&DashboardError::request(e, "Failed to revoke API key")),
        },
    }

    Ok(())
}

/// Client for the configured key, or exit with the missing-key message
fn require_client(config: &Config) -> anyhow::Result<QrApiClient> {
    match dashboard::connect(&config.api)? {
        Some(client) => Ok(client),
        None => {
            eprintln!("{}", MISSING_KEY_MESSAGE);
            eprintln!();
            eprintln!("  qrpanel configure <api-key>");
            std::process::exit(1);
        }
    }
}

fn parse_expiry(value: Option<&str>) -> Option<chrono::DateTime<chrono::Utc>> {
    let value = value?;
    match dashboard::create_form::parse_timestamp(value) {
        Ok(at) => Some(at),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn fail(error: &DashboardError) -> ! {
    eprintln!("{}", error);
    if let Some(client_error) = error.client_error() {
        for field in client_error.field_errors() {
            eprintln!("  {}: {}", field.path, field.message);
        }
    }
    std::process::exit(1);
}

fn print_qr(qr: &QrCode, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", render::json(qr)?),
        OutputFormat::Csv => print!("{}", render::qr_csv(std::slice::from_ref(qr))?),
        OutputFormat::Table => println!("{}", render::qr_detail(qr)),
    }
    Ok(())
}

fn print_keys(keys: &[ApiKey], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let masked: Vec<ApiKey> = keys
                .iter()
                .map(|k| ApiKey {
                    key: k.masked(),
                    ..k.clone()
                })
                .collect();
            println!("{}", render::json(&masked)?);
        }
        OutputFormat::Csv => print!("{}", render::api_keys_csv(keys)?),
        OutputFormat::Table => println!("{}", render::api_keys_table(keys)),
    }
    Ok(())
}
