use anyhow::Result;
use axum::Router;
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};
use triage_core::{FileStore, IndexStore, MemoryStore, SledStore, DEFAULT_INDEX_PATH};
use triage_server::{build_app, ServerOptions};
use tokio::net::TcpListener;

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    File,
    Sled,
    Memory,
}

#[derive(Parser)]
struct Args {
    /// Index location (file path, or database directory for the sled backend)
    #[arg(long, default_value = DEFAULT_INDEX_PATH)]
    index: String,
    /// Storage backend holding the index
    #[arg(long, value_enum, default_value_t = Backend::File)]
    backend: Backend,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let store: Arc<dyn IndexStore> = match args.backend {
        Backend::File => Arc::new(FileStore::new(&args.index)),
        Backend::Sled => Arc::new(SledStore::open(&args.index)?),
        Backend::Memory => Arc::new(MemoryStore::new()),
    };
    let app: Router = build_app(store, ServerOptions::from_env());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, index = %args.index, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
