// Business Map - Web Server
// Serves the Leaflet page plus the filter/render API

use anyhow::{Context, Result};
use business_map::config::AppConfig;
use business_map::server::{router, AppState};
use business_map::{BusinessMap, DataSource};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    name = "business-map-server",
    version,
    about = "Serve the business map over HTTP"
)]
struct ServerArgs {
    /// TOML configuration file (defaults to ./business-map.toml when present)
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Data file path or http(s) URL, overrides the configuration
    #[arg(short = 'd', long = "data", value_name = "SOURCE")]
    data: Option<DataSource>,

    /// Address to listen on, overrides the configuration
    #[arg(short = 'b', long = "bind", value_name = "ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();
    business_map::init_logging("business_map=info,tower_http=info");

    println!("🌐 Business Map - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    let source = args.data.unwrap_or_else(|| config.data_source());

    // Load once; a failure keeps the server up so the page can report it
    let state = match source.load_async().await {
        Ok(dataset) => {
            println!("✓ Loaded {} businesses from {}", dataset.len(), source);
            let map = BusinessMap::new(dataset, &config);
            AppState::loaded(map, config.clone())
        }
        Err(e) => {
            error!("Error loading business data: {}", e);
            AppState::failed(e.user_message(&source.to_string()), config.clone())
        }
    };

    let app = router(state);

    // Start server
    let addr = config.server.bind.as_str();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;

    info!("Listening on {}", addr);
    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/render", addr);
    println!("   UI:  http://{}", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
