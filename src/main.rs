//! CLI entry point - the composition root.
//!
//! This is the only place where infrastructure is wired together: the JSON
//! settings file provider, the reqwest transport and the tracing log sink
//! are assembled here and handed to the endpoint from stas-runtime.

mod config;
mod host;
mod sink;
mod transport;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stas_runtime::supervisor::ServerConfig;
use stas_runtime::TranslationEndpoint;
use std::path::PathBuf;
use std::sync::Arc;

use config::JsonSettingsProvider;
use host::CliHostContext;
use sink::TracingLogSink;
use transport::ReqwestTransport;

/// Supervisor and HTTP bridge for the stas offline translation server.
#[derive(Parser)]
#[command(name = "stas-bridge", version, about)]
struct Cli {
    /// Path to the settings file.
    #[arg(long, default_value = "stas-bridge.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server, translate the given texts and print the results
    Translate {
        /// Japanese texts to translate, one result line per input
        texts: Vec<String>,
    },

    /// Check the configured executable and models folder
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let provider = JsonSettingsProvider::load(&cli.config)?;

    match cli.command {
        Commands::Translate { texts } => handle_translate(&provider, texts).await,
        Commands::Doctor => handle_doctor(&provider),
    }
}

async fn handle_translate(provider: &JsonSettingsProvider, texts: Vec<String>) -> Result<()> {
    if texts.is_empty() {
        anyhow::bail!("nothing to translate; pass at least one text");
    }

    let host = CliHostContext::default();
    let endpoint = TranslationEndpoint::initialize(
        &host,
        provider,
        Arc::new(ReqwestTransport::new()?),
        Arc::new(TracingLogSink),
    )?;

    let result = endpoint.translate(&texts).await;
    endpoint.shutdown().await;

    for line in result? {
        println!("{line}");
    }
    Ok(())
}

fn handle_doctor(provider: &JsonSettingsProvider) -> Result<()> {
    let settings = stas_core::EndpointSettings::load(provider)
        .context("settings file did not validate")?;

    if !settings.is_configured() {
        println!("Status: Not configured");
        println!();
        println!("Set StasServerExePath and ModelsFolderPath in the settings file.");
        return Ok(());
    }

    println!("Executable: {}", settings.exe_path);
    println!("Models:     {}", settings.models_path);
    println!("Endpoint:   {}", settings.endpoint_url());

    match ServerConfig::from_settings(&settings).validate() {
        Ok(()) => println!("Health: paths look good"),
        Err(e) => println!("Health: error - {e}"),
    }
    Ok(())
}
