use crate::error::ApiError;
use crate::models::chat::{
    ChatSession, ChatSessionDetail, CreateSessionRequest, SendMessageRequest, SendMessageResponse,
};
use crate::models::progress::ModuleProgress;
use crate::models::quiz::{AttemptRecord, QuizSubmission};
use crate::models::settings::AppSettings;
use crate::storage::UserStorage;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Thin JSON client for the backend REST API. Attaches the bearer token from
/// the injected storage on every request, mirroring the request interceptor
/// in the web client. No client-side timeout and no automatic retry; callers
/// decide what a failure means.
pub struct ApiClient {
    http: Client,
    base_url: String,
    storage: UserStorage,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, storage: UserStorage) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            storage,
        }
    }

    pub fn storage(&self) -> &UserStorage {
        &self.storage
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, url);
        if let Some(token) = self.storage.token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send_expect_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let detail = extract_detail(response.json::<Value>().await.ok());
            tracing::debug!(%status, %detail, "API request failed");
            Err(ApiError::from_status(status, detail))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_expect_json(self.request(Method::GET, path)).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_expect_json(self.request(Method::POST, path).json(body))
            .await
    }

    // ---- Module progress ----

    pub async fn get_module_progress(&self, module_id: &str) -> Result<ModuleProgress, ApiError> {
        self.get_json(&format!("/learning/modules/{}/get_progress/", module_id))
            .await
    }

    pub async fn save_module_progress(
        &self,
        module_id: &str,
        progress: &ModuleProgress,
    ) -> Result<(), ApiError> {
        let _: Value = self
            .post_json(
                &format!("/learning/modules/{}/save_progress/", module_id),
                progress,
            )
            .await?;
        Ok(())
    }

    // ---- Quiz ----

    pub async fn submit_quiz(
        &self,
        quiz_id: &str,
        submission: &QuizSubmission,
    ) -> Result<AttemptRecord, ApiError> {
        self.post_json(
            &format!("/learning/quizzes/{}/submit_simple/", quiz_id),
            submission,
        )
        .await
    }

    // ---- Settings / feature flags ----

    pub async fn get_settings(&self) -> Result<AppSettings, ApiError> {
        self.get_json("/settings/").await
    }

    // ---- AI mentor sessions ----

    pub async fn list_chat_sessions(&self) -> Result<Vec<ChatSession>, ApiError> {
        // Paginated backends wrap the list in {"results": [...]}.
        let value: Value = self.get_json("/ai/sessions/").await?;
        let list = value
            .get("results")
            .cloned()
            .unwrap_or(value);
        serde_json::from_value(list).map_err(|e| ApiError::Status {
            status: reqwest::StatusCode::OK,
            detail: format!("unexpected session list shape: {}", e),
        })
    }

    pub async fn get_chat_session(&self, session_id: &str) -> Result<ChatSessionDetail, ApiError> {
        self.get_json(&format!("/ai/sessions/{}/", session_id)).await
    }

    pub async fn create_chat_session(&self) -> Result<ChatSession, ApiError> {
        self.post_json(
            "/ai/sessions/",
            &CreateSessionRequest {
                session_type: "general_chat".to_string(),
                project: None,
            },
        )
        .await
    }

    pub async fn update_chat_session_title(
        &self,
        session_id: &str,
        title: &str,
    ) -> Result<ChatSession, ApiError> {
        self.send_expect_json(
            self.request(Method::PATCH, &format!("/ai/sessions/{}/", session_id))
                .json(&serde_json::json!({ "title": title })),
        )
        .await
    }

    pub async fn delete_chat_session(&self, session_id: &str) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/ai/sessions/{}/", session_id))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let detail = extract_detail(response.json::<Value>().await.ok());
            Err(ApiError::from_status(status, detail))
        }
    }

    pub async fn send_chat_message(
        &self,
        session_id: &str,
        request: &SendMessageRequest,
    ) -> Result<SendMessageResponse, ApiError> {
        self.post_json(
            &format!("/ai/sessions/{}/send_message/", session_id),
            request,
        )
        .await
    }
}

/// Pull the human-readable message out of an error body. Backends disagree
/// on the field name, so check the usual suspects.
fn extract_detail(body: Option<Value>) -> String {
    body.as_ref()
        .and_then(|v| {
            v.get("detail")
                .or_else(|| v.get("error"))
                .or_else(|| v.get("message"))
        })
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}
