use std::sync::Arc;

use clap::Parser;
use notes_core::{JsonFileStore, NotesConfig, NotesService};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use notes_server::http::{self, HttpState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "notes.toml")]
    config: String,

    /// Override `http.port`
    #[arg(short, long)]
    port: Option<u16>,

    /// Override `storage.data_file`
    #[arg(long)]
    data_file: Option<String>,

    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let mut config = match NotesConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };
    if let Some(port) = args.port {
        config.http.port = port;
    }
    if let Some(data_file) = args.data_file {
        config.storage.data_file = data_file;
    }

    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level));
    fmt().with_env_filter(filter).init();

    let store = JsonFileStore::new(&config.storage.data_file);

    if args.health {
        let service = NotesService::open(store);
        println!("✅ Notes file: {}", config.storage.data_file);
        println!("✅ Notes loaded: {}", service.len());
        println!("✅ Environment: {}", config.service.environment);
        return Ok(());
    }

    let service = NotesService::open(store);
    let state = Arc::new(HttpState::new(service, config));

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    http::start_http_server(state, tx.subscribe()).await?;

    Ok(())
}
