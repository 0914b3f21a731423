//! filedrop
//!
//! Minimal HTTP file-sharing service.

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use server::config::{default_config_path, Config};
use server::{AppState, FileServer};
use tracing_subscriber::EnvFilter;

/// filedrop - share a directory over HTTP with token-authorized uploads.
#[derive(Parser, Debug)]
#[command(name = "filedrop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the share root over HTTP
    Serve(ServeArgs),

    /// Write a configuration file with default values
    InitConfig {
        /// Destination file (defaults to the standard config path)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

/// Overrides for `serve`. These win over the config file and environment.
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Directory to share
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// TCP port to listen on
    #[arg(long, short)]
    pub port: Option<u16>,

    /// IP address to bind
    #[arg(long)]
    pub bind: Option<IpAddr>,
}

impl ServeArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(root) = &self.root {
            config.storage.root = root.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(bind) = self.bind {
            config.server.bind_address = bind.to_string();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => Config::load(config_path)?,
        None => Config::load_default()?,
    };

    // Initialize tracing before overrides are applied so their messages show
    init_tracing(&config.startup_log_level(), cli.verbose);
    if let Some(config_path) = &cli.config {
        tracing::info!("Using config file: {:?}", config_path);
    }

    match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => {
            config.apply_env_overrides();
            args.apply(&mut config);
            config.validate()?;

            let state = AppState::from_config(&config)?;
            let addr = config.socket_addr()?;
            let server = FileServer::bind(addr, state)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;

            server.run().await?;
        }
        Commands::InitConfig { output, force } => {
            let path = output.or(cli.config).unwrap_or_else(default_config_path);
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }

            config.save(&path)?;
            println!("Wrote configuration to {}", path.display());
        }
    }

    Ok(())
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `--verbose` selects debug and
/// `level` applies.
fn init_tracing(level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { level };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
