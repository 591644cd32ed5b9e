//! ShopLocal configuration inspector
//!
//! Resolves the storefront configuration the same way the application does
//! and prints parts of it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shoplocal_config::{
    config::{ApiService, BuildMode, Config, Feature},
    FileTokenStore, NoTokenStore, TokenStore,
};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// ShopLocal configuration inspector
#[derive(Parser, Debug)]
#[command(name = "shoplocal-config")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Build mode: dev, prod (defaults to the mode this binary was built in)
    #[arg(short, long, global = true)]
    mode: Option<BuildMode>,

    /// Directory holding the .env files
    #[arg(long, global = true, default_value = ".")]
    env_dir: PathBuf,

    /// Read the process environment only, ignoring .env files
    #[arg(long, global = true)]
    no_dotenv: bool,

    /// Log level: trace, debug, info, warn, error (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved configuration as JSON, secrets omitted
    Show {
        #[arg(long)]
        pretty: bool,
    },
    /// Print the Authorization header value
    AuthHeader {
        /// JSON file holding persisted session values
        #[arg(long)]
        token_file: Option<PathBuf>,
    },
    /// Print whether a feature is enabled
    Feature { name: Feature },
    /// Print the base URL of a backend API
    ApiUrl { service: ApiService },
    /// Validate the configuration
    Check,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level);

    let mode = args.mode.unwrap_or_else(BuildMode::current);
    let config = if args.no_dotenv {
        Config::from_process_env(mode)
    } else {
        Config::load(&args.env_dir, mode)
    };

    tracing::debug!(
        mode = %mode,
        env_dir = %args.env_dir.display(),
        dotenv = !args.no_dotenv,
        "Configuration loaded"
    );

    match args.command {
        Command::Show { pretty } => {
            let json = if pretty {
                serde_json::to_string_pretty(&config)
            } else {
                serde_json::to_string(&config)
            }
            .context("Failed to serialize configuration")?;
            println!("{}", json);
        }
        Command::AuthHeader { token_file } => {
            let store: Box<dyn TokenStore> = match token_file {
                Some(path) => Box::new(FileTokenStore::new(path)),
                None => Box::new(NoTokenStore),
            };
            println!("{}", config.auth_header(&*store));
        }
        Command::Feature { name } => {
            println!("{}", config.is_feature_enabled(name));
        }
        Command::ApiUrl { service } => {
            println!("{}", config.api_url(service));
        }
        Command::Check => {
            config.validate().context("Configuration is invalid")?;
            println!("ok");
        }
    }

    Ok(())
}

/// Initialize tracing on stderr so stdout stays machine-readable
fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let console_layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(console_layer).init();
}
