use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use groqchat_server::server::routes::build_routes;
use groqchat_server::server::state::{AppState, Config};

#[derive(Parser, Debug)]
#[command(
    name = "groqchat-server",
    about = "Chat proxy with a sandboxed file-attachment API"
)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Directory the file-browser endpoints are confined to
    #[arg(long, env = "FILE_ROOT", default_value = ".")]
    root: PathBuf,

    /// Character ceiling for one extraction pass
    #[arg(long, default_value_t = 1_000_000)]
    max_file_chars: usize,

    /// Hard ceiling on a single chunk request's length
    #[arg(long, default_value_t = 200_000)]
    max_chunk_length: usize,

    /// Request body size limit in bytes
    #[arg(long, default_value_t = 1024 * 1024)]
    max_body_bytes: usize,

    /// Default model when the client does not pick one
    #[arg(long, env = "GROQ_MODEL", default_value = "llama-3.1-8b-instant")]
    model: String,

    /// Upstream completion API key
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Upstream completion API base URL
    #[arg(long, env = "GROQ_API_BASE", default_value = "https://api.groq.com/openai/v1")]
    api_base: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let root = args
        .root
        .canonicalize()
        .with_context(|| format!("root directory {:?} is not accessible", args.root))?;

    let config = Config {
        root,
        max_file_chars: args.max_file_chars,
        max_chunk_len: args.max_chunk_length,
        default_model: args.model,
        api_key: args.api_key,
        api_base: args.api_base,
    };

    if config.api_key.is_none() {
        warn!("GROQ_API_KEY is not set; /api/chat will answer with a configuration notice");
    }

    info!("serving files under {}", config.root.display());
    info!("default model: {}", config.default_model);

    let state = AppState::new(config)?;

    let app = build_routes(state)
        .layer(axum::extract::DefaultBodyLimit::max(args.max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("invalid host/port")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
