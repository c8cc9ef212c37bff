//! Spotbook CLI server
//!
//! Headless booking engine suitable for a systemd service, a container,
//! or a standalone process.
//!
//! ```sh
//! # Run with default config (~/.config/spotbook/config.toml)
//! spotbook
//!
//! # Custom config path
//! spotbook --config /etc/spotbook/config.toml
//!
//! # Validate config without starting
//! spotbook --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use spotbook::config::AppConfig;
use spotbook::server::{init_tracing, ServerHandle, ServerOptions};

/// Spotbook: booking lifecycle and availability service for parking spots.
#[derive(Parser, Debug)]
#[command(
    name = "spotbook",
    version,
    about = "Parking spot booking service",
    long_about = "Spotbook REST API server for booking shared parking spots.\n\n\
                  Default config: ~/.config/spotbook/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "SPOTBOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(spotbook::default_config_path);

    let loaded = AppConfig::load(&config_path);
    if cli.check {
        return match loaded {
            Ok(config) => {
                println!("Configuration is valid");
                println!("   Config file : {}", config_path.display());
                println!("   API address : {}", config.api_address());
                println!("   Database    : {}", config.database.url);
                println!("   Log level   : {}", config.logging.level);
                Ok(())
            }
            Err(e) => Err(e.into()),
        };
    }

    let mut config = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", config_path.display(), e);
            eprintln!("Using default configuration.");
            AppConfig::default()
        }
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    if let Some(port) = cli.api_port {
        info!("CLI override: api_port = {}", port);
        config.server.api_port = port;
    }

    let handle = match ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start server: {}", e);
            return Err(e);
        }
    };

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
