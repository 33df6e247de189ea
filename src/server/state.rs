use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

/// Process-wide configuration, fixed at startup. Tuning values carry the
/// defaults they shipped with but stay overridable from the CLI.
#[derive(Debug, Clone)]
pub struct Config {
    /// Canonicalized directory the file endpoints are confined to.
    pub root: PathBuf,
    /// Character ceiling applied once per extraction pass.
    pub max_file_chars: usize,
    /// Hard ceiling on a single chunk request's `length`.
    pub max_chunk_len: usize,
    /// Model used when the client does not pick one.
    pub default_model: String,
    /// Upstream completion API credential. Optional: without it the chat
    /// endpoint degrades to a configuration notice.
    pub api_key: Option<String>,
    /// Base URL of the upstream OpenAI-compatible API.
    pub api_base: String,
}

pub struct StateInner {
    pub config: Config,
    pub http: reqwest::Client,
}

#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<StateInner>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        // Upstream calls should not hold a connection open indefinitely.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            inner: Arc::new(StateInner { config, http }),
        })
    }
}
