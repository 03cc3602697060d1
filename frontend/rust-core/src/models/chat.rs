use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Ai,
}

/// A finalized message in the in-memory transcript. Streaming text lives in
/// the simulator until it is committed, so a message never appears twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Ai,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatSession {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub session_type: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ChatSession {
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("active")
    }
}

/// One stored message as returned by `GET /ai/sessions/{id}/`.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredMessage {
    pub sender: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatSessionDetail {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionRequest {
    pub session_type: String,
    pub project: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub message: String,
    pub execute_action: bool,
    pub current_page: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiResponseEnvelope {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageResponse {
    /// Newer backends nest the reply; older ones return it flat.
    #[serde(default)]
    pub ai_response: Option<AiResponseEnvelope>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub action: Option<AiAction>,
}

impl SendMessageResponse {
    /// The AI reply text, wherever the backend put it.
    pub fn reply_text(&self) -> Option<&str> {
        self.ai_response
            .as_ref()
            .and_then(|env| env.message.as_deref())
            .or(self.response.as_deref())
    }
}

/// Side effect requested by the assistant. Acting on these (navigation,
/// toasts, result rendering) is the host UI's job; the core only decodes
/// and forwards them.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AiAction {
    SearchResults {
        #[serde(default)]
        results: Value,
    },
    Navigate {
        #[serde(default)]
        url: Option<String>,
    },
    Enrolled {
        #[serde(default)]
        data: Value,
    },
    ProjectCreated {
        #[serde(default)]
        data: Value,
    },
    PostCreated {
        #[serde(default)]
        data: Value,
    },
    ConfirmationRequired {
        #[serde(default)]
        action_type: Option<String>,
        #[serde(default)]
        data: Value,
    },
    Cancelled,
    Error {
        #[serde(default)]
        message: Option<String>,
    },
    Info {
        #[serde(default)]
        message: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_text_prefers_nested_envelope() {
        let resp: SendMessageResponse = serde_json::from_value(serde_json::json!({
            "ai_response": { "message": "nested" },
            "response": "flat"
        }))
        .unwrap();
        assert_eq!(resp.reply_text(), Some("nested"));
    }

    #[test]
    fn reply_text_falls_back_to_flat_field() {
        let resp: SendMessageResponse =
            serde_json::from_value(serde_json::json!({ "response": "flat" })).unwrap();
        assert_eq!(resp.reply_text(), Some("flat"));
    }

    #[test]
    fn unknown_action_types_decode_to_unknown() {
        let action: AiAction =
            serde_json::from_value(serde_json::json!({ "type": "brand_new_thing" })).unwrap();
        assert!(matches!(action, AiAction::Unknown));
    }

    #[test]
    fn search_results_action_carries_payload() {
        let action: AiAction = serde_json::from_value(serde_json::json!({
            "type": "search_results",
            "results": { "modules": [] }
        }))
        .unwrap();
        match action {
            AiAction::SearchResults { results } => assert!(results.get("modules").is_some()),
            other => panic!("unexpected action: {:?}", other),
        }
    }
}
