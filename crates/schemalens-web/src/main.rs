//! SchemaLens server: builds a concept snapshot and serves it over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use schemalens_core::query::SharedQueryService;
use schemalens_core::InMemoryGraph;
use schemalens_neo4j::Neo4jQueryService;
use schemalens_web::{create_router, AppState, Config};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "schemalens-web")]
#[command(about = "SchemaLens - browse the label hierarchy of a graph database")]
struct Cli {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Neo4j server URL
    #[arg(long)]
    neo4j_url: Option<String>,

    /// Path to schemalens.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serve the built-in sample graph instead of Neo4j
    #[arg(long)]
    demo: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(url) = cli.neo4j_url {
        config.neo4j.url = url;
    }

    let queries: SharedQueryService = if cli.demo {
        info!("Serving the built-in sample graph");
        InMemoryGraph::sample().into_shared()
    } else {
        info!(url = %config.neo4j.url, "Connecting to Neo4j");
        Arc::new(
            Neo4jQueryService::new(config.neo4j.clone())
                .context("Failed to create Neo4j client")?,
        )
    };

    let state = AppState::new(
        queries,
        config.type_hierarchy(),
        config.build.to_build_config(),
    );
    state
        .rebuild()
        .await
        .context("Failed to build the initial concept snapshot")?;

    let app = create_router(state, config.server.static_dir.clone());

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Open http://{} in your browser", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
