use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::ops::{chat, chunk, listing};
use crate::server::errors::AppError;
use crate::server::state::AppState;

// ---------------------------------------------------------------------------
// Router construction
// ---------------------------------------------------------------------------

pub fn build_routes(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/api/health", get(health))
        // Chat
        .route("/api/chat", post(chat_handler))
        .route("/api/models", get(list_models))
        // Sandboxed filesystem
        .route("/api/fs/list", get(fs_list))
        .route("/api/fs/read", get(fs_read))
        .route("/api/fs/readChunk", get(fs_read_chunk))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

async fn list_models(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "models": chat::AVAILABLE_MODELS,
        "defaultModel": state.inner.config.default_model,
    }))
}

#[derive(Deserialize)]
struct ChatBody {
    /// Legacy single-message form.
    message: Option<String>,
    /// Full conversation history.
    messages: Option<Vec<IncomingMessage>>,
    model: Option<String>,
}

/// Client messages may carry extra fields (timestamps etc.); everything but
/// role/content is dropped here, since the upstream accepts only those two.
#[derive(Deserialize)]
struct IncomingMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: String,
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<Value>, AppError> {
    let history: Vec<chat::ChatMessage> = match (body.messages, body.message) {
        (Some(messages), _) => messages
            .into_iter()
            .map(|m| chat::ChatMessage {
                role: m.role,
                content: m.content,
            })
            .collect(),
        (None, Some(message)) if !message.is_empty() => vec![chat::ChatMessage {
            role: "user".into(),
            content: message,
        }],
        _ => {
            return Err(AppError::BadRequest(
                "provide a message string or a non-empty messages array".into(),
            ));
        }
    };
    chat::validate_history(&history).map_err(AppError::BadRequest)?;

    let model = body
        .model
        .unwrap_or_else(|| state.inner.config.default_model.clone());
    let reply = chat::complete(&state, &history, &model).await;

    Ok(Json(json!({
        "reply": reply,
        "model": model,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

// ---------------------------------------------------------------------------
// Sandboxed filesystem
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    path: String,
}

async fn fs_list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let cfg = state.inner.config.clone();
    let rel = params.path.clone();
    let items = tokio::task::spawn_blocking(move || listing::list(&cfg.root, &rel))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(Json(json!({
        "root": state.inner.config.root.display().to_string(),
        "path": params.path,
        "items": items,
    })))
}

#[derive(Deserialize)]
struct ReadQuery {
    path: String,
    enc: Option<String>,
}

async fn fs_read(
    State(state): State<AppState>,
    Query(params): Query<ReadQuery>,
) -> Result<Json<Value>, AppError> {
    let cfg = state.inner.config.clone();
    let rel = params.path.clone();
    let enc = params.enc.clone();

    // Extraction is CPU-bound (PDF/DOCX parsing, candidate decodes); keep it
    // off the async workers so concurrent requests don't serialize.
    let result = tokio::task::spawn_blocking(move || chunk::read_full(&cfg, &rel, enc.as_deref()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(Json(json!({
        "root": state.inner.config.root.display().to_string(),
        "path": params.path,
        "size": result.size,
        "truncated": result.truncated,
        "text": result.text,
    })))
}

#[derive(Deserialize)]
struct ReadChunkQuery {
    path: String,
    #[serde(default)]
    offset: usize,
    length: Option<usize>,
    enc: Option<String>,
}

async fn fs_read_chunk(
    State(state): State<AppState>,
    Query(params): Query<ReadChunkQuery>,
) -> Result<Json<Value>, AppError> {
    let cfg = state.inner.config.clone();
    let rel = params.path.clone();
    let enc = params.enc.clone();
    let offset = params.offset;
    let length = params.length.unwrap_or(cfg.max_chunk_len);

    let result = tokio::task::spawn_blocking(move || {
        chunk::read_chunk(&cfg, &rel, offset, length, enc.as_deref())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(Json(json!({
        "root": state.inner.config.root.display().to_string(),
        "path": params.path,
        "size": result.size,
        "offset": result.offset,
        "length": result.length,
        "totalChars": result.total_chars,
        "done": result.done,
        "nextOffset": result.next_offset,
        "chunk": result.chunk,
    })))
}
