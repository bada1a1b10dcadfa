//! Terminal client for the FRA claims atlas.
//!
//! Runs single actions against the backend, or an interactive session that
//! mirrors the dashboard controls.

mod config;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use fra_atlas::api::AtlasClient;
use fra_atlas::dashboard::{Dashboard, StderrAlerts};
use fra_atlas::map::MapViewport;
use fra_atlas::models::{LayerKey, Level, Selection};
use fra_atlas::render;
use fra_atlas::session::Session;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "atlas")]
#[command(about = "FRA claims atlas client")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Selected state
    #[arg(long)]
    state: Option<String>,

    /// Selected administrative level
    #[arg(long)]
    level: Option<Level>,

    /// Log filter, used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the layer name for the current selection
    LayerName {
        #[arg(long, default_value = "IFR")]
        key: LayerKey,
    },
    /// Load the WFS layer and print the GeoJSON
    Wfs {
        /// Write the GeoJSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upload a scanned document for OCR and entity extraction
    Scan { file: PathBuf },
    /// Request DSS recommendations for a village
    Recommend { village: String },
    /// Interactive session (default)
    Session,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("Invalid log level")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    let base_url = args.api_url.clone().unwrap_or(config.api.base_url.clone());
    let timeout = config.api.timeout();
    let client = AtlasClient::new(&base_url, timeout).context("Failed to create API client")?;
    info!("Using atlas backend at {}", client.base_url());

    let selection = selection_from(&args, &config)?;
    let viewport = MapViewport {
        center: config.map.center,
        zoom: config.map.zoom,
        tile_url: config.map.tile_url.clone(),
    };
    let dashboard = Dashboard::new(client, selection, Arc::new(StderrAlerts));

    match args.command.unwrap_or(Commands::Session) {
        Commands::LayerName { key } => {
            println!("{}", dashboard.snapshot().selection().layer_name(key));
        }
        Commands::Wfs { output } => {
            dashboard.load_layer().await?;
            let state = dashboard.snapshot();
            if let Some(payload) = state.geo_payload() {
                let json = serde_json::to_string_pretty(&payload.value)?;
                match output {
                    Some(path) => {
                        std::fs::write(&path, json)
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        eprint!("{}", render::map_panel(&viewport, &state));
                    }
                    None => println!("{}", json),
                }
            }
        }
        Commands::Scan { file } => {
            dashboard.upload_document(Some(&file)).await?;
            print!("{}", render::documents_panel(&dashboard.snapshot()));
        }
        Commands::Recommend { village } => {
            dashboard.request_recommendation(Some(&village)).await?;
            print!("{}", render::recommendation_panel(&dashboard.snapshot()));
        }
        Commands::Session => run_session(Session::new(dashboard, viewport)).await?,
    }

    Ok(())
}

fn selection_from(args: &Args, config: &Config) -> Result<Selection> {
    let mut selection = Selection::default();
    if let Some(state) = args.state.as_ref().or(config.selection.state.as_ref()) {
        selection.state = state.clone();
    }
    if let Some(level) = args.level {
        selection.level = level;
    } else if let Some(level) = &config.selection.level {
        selection.level = level
            .parse::<Level>()
            .map_err(anyhow::Error::msg)
            .context("Invalid level in config file")?;
    }
    Ok(selection)
}

async fn run_session(session: Session) -> Result<()> {
    println!("FRA Atlas. Type 'help' for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("atlas> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let reply = session.handle_line(&line).await;
        if !reply.output.is_empty() {
            println!("{}", reply.output.trim_end());
        }
        if reply.quit {
            break;
        }
    }

    Ok(())
}
