//! MindMirror server - single-user journaling form with generated reflections.

mod page;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use clap::Parser;
use mirror::io::config::{load_config, resolve_api_key};
use mirror::io::journal_store::JournalStore;
use mirror::io::reflection::ChatCompletionsReflector;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "mirror-ui")]
#[command(about = "Daily self-check-in journal with generated reflections")]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value = "3001")]
    port: u16,

    /// Config file (TOML). Missing file means defaults.
    #[arg(long, default_value = "mirror.toml")]
    config: PathBuf,

    /// Journal CSV path (overrides `store_path` from the config)
    #[arg(long)]
    store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mirror::logging::init(mirror::logging::DEFAULT_FILTER);

    let args = Args::parse();

    let mut cfg = load_config(&args.config)?;
    if let Some(store) = args.store {
        cfg.store_path = store;
    }
    cfg.validate()?;

    let api_key = resolve_api_key(&cfg.reflection)?;
    let reflector = ChatCompletionsReflector::new(&cfg.reflection, api_key)
        .context("build reflection client")?;
    info!(
        endpoint = reflector.endpoint(),
        model = %cfg.reflection.model,
        timeout_secs = cfg.reflection.timeout_secs,
        "reflection client ready"
    );

    let store = JournalStore::new(&cfg.store_path);
    let journal = store.load_all()?;
    info!(
        store = %store.path().display(),
        entries = journal.len(),
        "journal loaded"
    );

    let state = AppState::new(store, Arc::new(reflector));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", routes::api_router())
        .merge(page::page_router())
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
