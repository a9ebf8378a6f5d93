//! Terraform Provider for Citrix ITM
//!
//! Command-line driver for the resource handlers. Each subcommand runs one
//! lifecycle operation and prints the resulting state as JSON on stdout.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use citrixitm_provider::{CitrixItmProvider, ProviderConfig};

#[derive(Parser)]
#[command(name = "terraform-provider-citrixitm")]
#[command(about = "Manage Citrix ITM platforms and DNS applications")]
#[command(version)]
struct Cli {
    /// Provider configuration file
    #[arg(short, long, env = "CITRIXITM_CONFIG", default_value = "citrixitm.toml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a resource from its desired state
    Create {
        /// Resource type, e.g. citrixitm_dns_app
        resource_type: String,
        /// JSON file with the desired state
        #[arg(long)]
        desired: PathBuf,
    },
    /// Refresh a resource from the API
    Read {
        resource_type: String,
        /// JSON file with the current state
        #[arg(long)]
        state: PathBuf,
    },
    /// Push changed attributes of a resource
    Update {
        resource_type: String,
        /// JSON file with the last-known state
        #[arg(long)]
        state: PathBuf,
        /// JSON file with the desired state
        #[arg(long)]
        desired: PathBuf,
    },
    /// Delete a resource
    Delete {
        resource_type: String,
        /// JSON file with the current state
        #[arg(long)]
        state: PathBuf,
    },
    /// Build the state of an existing remote object
    Import {
        resource_type: String,
        /// Numeric identifier of the remote object
        id: String,
    },
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr, stdout carries the resulting state
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    info!("Citrix ITM provider v{}", citrixitm_common::VERSION);

    let config = ProviderConfig::load(&cli.config)?.apply_env();
    let provider = CitrixItmProvider::new(&config)?;

    let new_state = match cli.command {
        Command::Create {
            resource_type,
            desired,
        } => {
            let planned = read_json(&desired)?;
            provider
                .apply_resource_change(&resource_type, None, Some(&planned))
                .await?
        }
        Command::Read {
            resource_type,
            state,
        } => {
            let current = read_json(&state)?;
            provider.read_resource(&resource_type, &current).await?
        }
        Command::Update {
            resource_type,
            state,
            desired,
        } => {
            let prior = read_json(&state)?;
            let planned = read_json(&desired)?;
            provider
                .apply_resource_change(&resource_type, Some(&prior), Some(&planned))
                .await?
        }
        Command::Delete {
            resource_type,
            state,
        } => {
            let prior = read_json(&state)?;
            provider
                .apply_resource_change(&resource_type, Some(&prior), None)
                .await?
        }
        Command::Import { resource_type, id } => {
            provider.import_resource_state(&resource_type, &id).await?
        }
    };

    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, &new_state)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
