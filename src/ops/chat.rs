use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::server::state::AppState;

/// Persona instruction prepended to every forwarded conversation.
const SYSTEM_PROMPT: &str = "You are a friendly, professional AI assistant. \
Answer the user's questions clearly, concisely and helpfully.";

pub const ALLOWED_ROLES: &[&str] = &["user", "assistant", "system"];

/// Models the upstream provider currently serves. Kept as a static table
/// because the provider renames and decommissions identifiers without
/// notice, and a stale id should produce an actionable message instead of
/// an opaque upstream failure.
pub const AVAILABLE_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "llama-3.1-8b-instant",
        name: "Llama 3.1 8B Instant",
        description: "Fast responses, suited to everyday conversation",
        recommended: true,
        category: "Text to Text",
    },
    ModelInfo {
        id: "llama-3.3-70b-versatile",
        name: "Llama 3.3 70B Versatile",
        description: "Large 70B parameter model for complex tasks",
        recommended: false,
        category: "Text to Text",
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub recommended: bool,
    pub category: &'static str,
}

pub fn is_known_model(id: &str) -> bool {
    AVAILABLE_MODELS.iter().any(|m| m.id == id)
}

/// The only two fields the upstream API accepts per message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Check conversation shape before forwarding. Errors here become 400s.
pub fn validate_history(messages: &[ChatMessage]) -> Result<(), String> {
    if messages.is_empty() {
        return Err("conversation history must not be empty".into());
    }
    for msg in messages {
        if msg.role.is_empty() || msg.content.is_empty() {
            return Err("every message must carry a role and content".into());
        }
        if !ALLOWED_ROLES.contains(&msg.role.as_str()) {
            return Err("message role must be one of user, assistant or system".into());
        }
    }
    Ok(())
}

/// Forward a validated history to the upstream completion API. Never fails:
/// configuration problems and upstream errors all degrade to an explanatory
/// reply string, so the caller always has something to show the user.
pub async fn complete(state: &AppState, history: &[ChatMessage], model: &str) -> String {
    let cfg = &state.inner.config;

    let Some(api_key) = cfg.api_key.as_deref() else {
        return "⚠️ No upstream API key is configured. Set GROQ_API_KEY and restart the server."
            .to_string();
    };

    if !is_known_model(model) {
        return format!(
            "⚠️ Unknown model '{model}'. Pick one of the models listed by /api/models, \
             e.g. \"llama-3.1-8b-instant\"."
        );
    }

    let mut outgoing = vec![ChatMessage {
        role: "system".into(),
        content: SYSTEM_PROMPT.into(),
    }];
    outgoing.extend(history.iter().cloned());

    let body = json!({
        "model": model,
        "messages": outgoing,
        "temperature": 0.7,
        "max_tokens": 1024,
    });

    let url = format!("{}/chat/completions", cfg.api_base.trim_end_matches('/'));
    let res = match state
        .inner
        .http
        .post(&url)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
    {
        Ok(res) => res,
        Err(e) => {
            error!("upstream request failed: {e}");
            return "⚠️ Could not reach the completion API. Please try again later.".to_string();
        }
    };

    let status = res.status();
    if status.is_success() {
        return match res.json::<serde_json::Value>().await {
            Ok(v) => v["choices"][0]["message"]["content"]
                .as_str()
                .unwrap_or("Sorry, the model returned no reply.")
                .to_string(),
            Err(e) => {
                error!("malformed upstream response: {e}");
                "⚠️ The completion API returned an unreadable response.".to_string()
            }
        };
    }

    let detail = res.text().await.unwrap_or_default();
    error!("upstream error {status}: {detail}");
    match status.as_u16() {
        401 => "⚠️ The upstream API key was rejected. Check GROQ_API_KEY.".to_string(),
        429 => "⚠️ The completion API is rate limiting requests. Try again shortly.".to_string(),
        400 if detail.contains("model") || detail.contains("decommissioned") => format!(
            "⚠️ Model '{model}' is unavailable or has been decommissioned. \
             Try \"llama-3.1-8b-instant\" or another listed model."
        ),
        _ => format!("⚠️ The completion API returned an error (status {status})."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(role: &str, content: &str) -> ChatMessage {
        ChatMessage {
            role: role.into(),
            content: content.into(),
        }
    }

    #[test]
    fn accepts_well_formed_history() {
        let history = vec![
            msg("system", "be brief"),
            msg("user", "hi"),
            msg("assistant", "hello"),
            msg("user", "how are you?"),
        ];
        assert!(validate_history(&history).is_ok());
    }

    #[test]
    fn rejects_empty_history() {
        assert!(validate_history(&[]).is_err());
    }

    #[test]
    fn rejects_unknown_role() {
        let err = validate_history(&[msg("other", "hi")]).unwrap_err();
        assert!(err.contains("role"));
    }

    #[test]
    fn rejects_empty_content() {
        assert!(validate_history(&[msg("user", "")]).is_err());
        assert!(validate_history(&[msg("", "hi")]).is_err());
    }

    #[test]
    fn model_allow_list() {
        assert!(is_known_model("llama-3.1-8b-instant"));
        assert!(is_known_model("llama-3.3-70b-versatile"));
        assert!(!is_known_model("gpt-oss-120b"));
        assert!(!is_known_model(""));
    }
}
