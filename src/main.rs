mod app;
mod backend;
mod config;
mod engine;
mod util;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::backend::BackendClient;
use crate::config::Config;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the knowledge backend; overrides the config file.
    #[arg(long)]
    backend_url: Option<String>,

    /// Collection (notebook) to open; all collections when omitted.
    #[arg(long)]
    collection: Option<String>,

    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("constellation=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(url) = args.backend_url {
        config.backend.base_url = url;
    }

    let client = BackendClient::new(
        &config.backend.base_url,
        &config.backend.push_path,
        Duration::from_secs(config.backend.request_timeout_secs),
    )
    .context("failed to set up backend client")?;
    info!(backend = client.base_url(), collection = ?args.collection, "starting constellation");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    let collection = args.collection;
    eframe::run_native(
        "constellation",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ConstellationApp::new(
                cc,
                client,
                config,
                collection,
            )))
        }),
    )
    .map_err(|error| anyhow!("window failed: {error}"))
}
