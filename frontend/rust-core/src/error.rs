use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the backend API client.
///
/// The taxonomy mirrors how the UI reacts: transport failures get a generic
/// toast, a 404 on a session fetch triggers re-creation, and the known
/// "attempts exhausted" 400 gets its own message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {status}: {detail}")]
    Status { status: StatusCode, detail: String },

    #[error("maximum quiz attempts reached")]
    AttemptsExhausted,
}

impl ApiError {
    /// Build the right variant from a non-success response status and the
    /// human-readable detail string extracted from its body.
    pub fn from_status(status: StatusCode, detail: String) -> Self {
        if status == StatusCode::BAD_REQUEST && detail.contains("Maximum attempts") {
            ApiError::AttemptsExhausted
        } else {
            ApiError::Status { status, detail }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::Status {
                status: StatusCode::NOT_FOUND,
                ..
            }
        )
    }

    pub fn is_attempts_exhausted(&self) -> bool {
        matches!(self, ApiError::AttemptsExhausted)
    }

    /// Message suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => "Network error, please try again".to_string(),
            ApiError::AttemptsExhausted => {
                "You have used all your attempts for this quiz.".to_string()
            }
            ApiError::Status { detail, .. } if !detail.is_empty() => detail.clone(),
            ApiError::Status { status, .. } => format!("Request failed ({})", status),
        }
    }
}
