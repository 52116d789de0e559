use anyhow::Result;
use axum::Router;
use clap::Parser;
use search_core::{CorpusFormat, Ranking};
use server::{build_app, ServerConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus path (file or directory)
    #[arg(long)]
    corpus: String,
    /// Corpus format: auto, jsonl or reuters
    #[arg(long, default_value_t = CorpusFormat::Auto)]
    format: CorpusFormat,
    /// Default result order when a request does not choose one
    #[arg(long, default_value_t = Ranking::FirstTerm)]
    ranking: Ranking,
    /// Re-read the corpus for every fetched result instead of keeping documents in memory
    #[arg(long, default_value_t = false)]
    no_cache: bool,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = ServerConfig { corpus: args.corpus, format: args.format, ranking: args.ranking, cache: !args.no_cache };
    // The index is complete before the listener accepts anything.
    let app: Router = build_app(&config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
