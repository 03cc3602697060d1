//! AI mentor chat: session lifecycle against the backend and the local
//! typewriter reveal.
//!
//! The backend returns complete responses; the "stream" is a cosmetic
//! reveal on a fixed tick. It is modelled as an explicit cancelable task:
//! one task per active stream, starting a new one cancels the old, and an
//! explicit stop commits whatever was revealed so nothing is lost.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::chat::{AiAction, ChatMessage, SendMessageRequest};
use crate::storage::UserStorage;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

const SESSION_ID_KEY: &str = "ai_mentor_session_id";
const GREETING: &str = "Hi! I'm your AI Mentor. How can I help you today?";
const SEND_FALLBACK: &str = "I'm your AI assistant! How can I help you?";
const TITLE_MAX_CHARS: usize = 35;

#[derive(Default)]
struct StreamState {
    revealed: String,
    pending: String,
    active: bool,
    /// Set under the lock by whichever path commits first (natural
    /// completion or stop), guaranteeing exactly one finalized append.
    finalized: bool,
}

/// Reveals a complete text char-by-char on a fixed tick, appending it to the
/// shared transcript when it finishes or is stopped.
pub struct StreamSimulator {
    tick: Duration,
    messages: Arc<Mutex<Vec<ChatMessage>>>,
    state: Arc<Mutex<StreamState>>,
    task: Option<JoinHandle<()>>,
}

impl StreamSimulator {
    pub fn new(tick: Duration, messages: Arc<Mutex<Vec<ChatMessage>>>) -> Self {
        Self {
            tick,
            messages,
            state: Arc::new(Mutex::new(StreamState::default())),
            task: None,
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.state.lock().unwrap().active
    }

    /// Snapshot of the partially revealed text, for rendering.
    pub fn revealed(&self) -> String {
        self.state.lock().unwrap().revealed.clone()
    }

    /// Begin revealing `text`. Any prior stream is cancelled without being
    /// committed.
    pub fn start(&mut self, text: impl Into<String>) {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let text = text.into();
        {
            let mut state = self.state.lock().unwrap();
            state.revealed.clear();
            state.pending = text.clone();
            state.active = true;
            state.finalized = false;
        }

        let state = self.state.clone();
        let messages = self.messages.clone();
        let tick = self.tick;
        let chars: Vec<char> = text.chars().collect();

        self.task = Some(tokio::spawn(async move {
            let mut index = 0usize;
            loop {
                tokio::time::sleep(tick).await;
                let mut guard = state.lock().unwrap();
                if guard.finalized || !guard.active {
                    break;
                }
                if index < chars.len() {
                    guard.revealed.push(chars[index]);
                    index += 1;
                }
                if index >= chars.len() {
                    guard.finalized = true;
                    guard.active = false;
                    guard.revealed.clear();
                    guard.pending.clear();
                    drop(guard);
                    if !text.is_empty() {
                        messages.lock().unwrap().push(ChatMessage::ai(text.clone()));
                    }
                    break;
                }
            }
        }));
    }

    /// Halt the reveal and commit the prefix shown so far, or the full
    /// pending text if nothing was revealed yet. Idempotent; a stream that
    /// already completed is left alone.
    pub fn stop(&mut self) {
        let final_text = {
            let mut state = self.state.lock().unwrap();
            if state.finalized || !state.active {
                return;
            }
            state.finalized = true;
            state.active = false;
            let text = if !state.revealed.is_empty() {
                std::mem::take(&mut state.revealed)
            } else {
                std::mem::take(&mut state.pending)
            };
            state.revealed.clear();
            state.pending.clear();
            text
        };

        if let Some(task) = self.task.take() {
            task.abort();
        }

        if !final_text.is_empty() {
            self.messages.lock().unwrap().push(ChatMessage::ai(final_text));
        }
    }

    /// Test hook: wait for the in-flight reveal task to finish naturally.
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for StreamSimulator {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// One user's mentor conversation: a persisted session id, the in-memory
/// transcript, and the reveal simulator.
pub struct ChatThread {
    client: Arc<ApiClient>,
    storage: UserStorage,
    messages: Arc<Mutex<Vec<ChatMessage>>>,
    stream: StreamSimulator,
    session_id: Option<String>,
    first_message: bool,
    current_page: Option<String>,
}

impl ChatThread {
    pub fn new(client: Arc<ApiClient>, storage: UserStorage, stream_tick: Duration) -> Self {
        let messages: Arc<Mutex<Vec<ChatMessage>>> = Arc::new(Mutex::new(Vec::new()));
        let stream = StreamSimulator::new(stream_tick, messages.clone());
        // Pick up the session persisted for this user, if any.
        let session_id = storage.get(SESSION_ID_KEY);
        Self {
            client,
            storage,
            messages,
            stream,
            session_id,
            first_message: true,
            current_page: None,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn set_current_page(&mut self, page: impl Into<String>) {
        self.current_page = Some(page.into());
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.is_streaming()
    }

    pub fn streaming_text(&self) -> String {
        self.stream.revealed()
    }

    pub fn stop_streaming(&mut self) {
        self.stream.stop();
    }

    /// Test/teardown hook: wait for any active reveal to run to completion.
    pub async fn finish_streaming(&mut self) {
        self.stream.join().await;
    }

    /// Open the panel: adopt the persisted or active server-side session, or
    /// start a fresh one, then load its transcript.
    pub async fn open(&mut self) -> Result<(), ApiError> {
        if self.session_id.is_none() {
            match self.client.list_chat_sessions().await {
                Ok(sessions) if !sessions.is_empty() => {
                    let adopted = sessions
                        .iter()
                        .find(|s| s.is_active())
                        .unwrap_or(&sessions[0]);
                    self.adopt_session(adopted.id.clone());
                }
                Ok(_) => {
                    self.create_session().await?;
                    self.greet();
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to list chat sessions");
                    return Err(e);
                }
            }
        }
        self.load_messages().await
    }

    /// Start a brand-new conversation, discarding the local transcript.
    pub async fn new_conversation(&mut self) -> Result<(), ApiError> {
        self.create_session().await?;
        self.messages.lock().unwrap().clear();
        self.first_message = true;
        self.greet();
        Ok(())
    }

    async fn load_messages(&mut self) -> Result<(), ApiError> {
        let Some(session_id) = self.session_id.clone() else {
            return Ok(());
        };

        match self.client.get_chat_session(&session_id).await {
            Ok(detail) => {
                let restored: Vec<ChatMessage> = detail
                    .messages
                    .iter()
                    .map(|m| {
                        if m.sender == "user" {
                            ChatMessage::user(m.message.clone())
                        } else {
                            ChatMessage::ai(m.message.clone())
                        }
                    })
                    .collect();
                self.first_message = !detail.messages.iter().any(|m| m.sender == "user");

                if restored.is_empty() {
                    self.messages.lock().unwrap().clear();
                    self.greet();
                } else {
                    *self.messages.lock().unwrap() = restored;
                }
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                // Stale persisted session: drop it and start over.
                tracing::info!(session = %session_id, "stored chat session gone, creating a new one");
                self.storage.remove(SESSION_ID_KEY);
                self.session_id = None;
                self.messages.lock().unwrap().clear();
                self.first_message = true;
                self.create_session().await?;
                self.greet();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load chat history");
                self.messages.lock().unwrap().clear();
                self.first_message = true;
                self.greet();
                Ok(())
            }
        }
    }

    /// Send a user message. The user's text is appended locally before the
    /// network call; the AI reply is revealed through the simulator. Any
    /// action the assistant requested is returned for the host to act on.
    pub async fn send(&mut self, text: &str) -> Result<Option<AiAction>, ApiError> {
        let text = text.trim();
        if text.is_empty() || self.stream.is_streaming() {
            return Ok(None);
        }

        self.messages
            .lock()
            .unwrap()
            .push(ChatMessage::user(text.to_string()));

        if self.first_message && self.session_id.is_some() {
            self.auto_name(text).await;
        }

        if self.session_id.is_none() {
            self.create_session().await?;
        }
        let session_id = self
            .session_id
            .clone()
            .expect("session id present after create");

        let request = SendMessageRequest {
            message: text.to_string(),
            execute_action: false,
            current_page: self.current_page.clone(),
        };

        match self.client.send_chat_message(&session_id, &request).await {
            Ok(response) => {
                let reply = response
                    .reply_text()
                    .unwrap_or(SEND_FALLBACK)
                    .to_string();
                self.stream.start(reply);
                Ok(response.action)
            }
            Err(e) => {
                // Degrade to a streamed fallback so the thread stays usable;
                // the caller still sees the error for its own notification.
                let fallback = match &e {
                    ApiError::Status { detail, .. } if !detail.is_empty() => detail.clone(),
                    _ => SEND_FALLBACK.to_string(),
                };
                tracing::warn!(error = %e, "chat send failed");
                self.stream.start(fallback);
                Err(e)
            }
        }
    }

    async fn create_session(&mut self) -> Result<(), ApiError> {
        let session = self.client.create_chat_session().await?;
        self.adopt_session(session.id);
        self.first_message = true;
        Ok(())
    }

    fn adopt_session(&mut self, id: String) {
        self.storage.set(SESSION_ID_KEY, &id);
        self.session_id = Some(id);
    }

    fn greet(&mut self) {
        self.stream.start(GREETING);
    }

    /// Title the conversation after its first user message.
    async fn auto_name(&mut self, query: &str) {
        let Some(session_id) = self.session_id.clone() else {
            return;
        };
        let title = truncate_title(query);
        match self
            .client
            .update_chat_session_title(&session_id, &title)
            .await
        {
            Ok(_) => self.first_message = false,
            Err(e) => tracing::warn!(error = %e, "failed to auto-name conversation"),
        }
    }
}

fn truncate_title(query: &str) -> String {
    let trimmed = query.trim();
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        let cut: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", cut.trim_end())
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulator(tick_ms: u64) -> (StreamSimulator, Arc<Mutex<Vec<ChatMessage>>>) {
        let messages: Arc<Mutex<Vec<ChatMessage>>> = Arc::new(Mutex::new(Vec::new()));
        (
            StreamSimulator::new(Duration::from_millis(tick_ms), messages.clone()),
            messages,
        )
    }

    #[tokio::test]
    async fn reveal_runs_to_completion_and_appends_once() {
        let (mut stream, messages) = simulator(1);
        stream.start("hello");
        assert!(stream.is_streaming());
        stream.join().await;
        let messages = messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], ChatMessage::ai("hello"));
    }

    #[tokio::test]
    async fn stop_before_any_tick_commits_the_full_text() {
        let (mut stream, messages) = simulator(10_000);
        stream.start("full text");
        stream.stop();
        let messages = messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "full text");
    }

    #[tokio::test]
    async fn stop_mid_reveal_commits_the_prefix() {
        let (mut stream, messages) = simulator(1);
        stream.start("abcdefghij");
        // Let a few ticks elapse.
        tokio::time::sleep(Duration::from_millis(20)).await;
        stream.stop();
        let messages = messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        let content = &messages[0].content;
        assert!(!content.is_empty());
        assert!("abcdefghij".starts_with(content.as_str()));
    }

    #[tokio::test]
    async fn stop_after_completion_is_a_no_op() {
        let (mut stream, messages) = simulator(1);
        stream.start("hi");
        stream.join().await;
        stream.stop();
        stream.stop();
        assert_eq!(messages.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn starting_a_new_stream_cancels_the_old_without_commit() {
        let (mut stream, messages) = simulator(10_000);
        stream.start("first");
        stream.start("second");
        stream.stop();
        let messages = messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "second");
    }

    #[tokio::test]
    async fn empty_text_never_appends_an_empty_message() {
        let (mut stream, messages) = simulator(1);
        stream.start("");
        stream.join().await;
        stream.stop();
        assert!(messages.lock().unwrap().is_empty());
    }

    #[test]
    fn titles_are_truncated_at_35_chars() {
        let long = "how do I enroll in the data structures learning path today";
        let title = truncate_title(long);
        assert!(title.ends_with("..."));
        assert!(title.chars().count() <= TITLE_MAX_CHARS + 3);

        assert_eq!(truncate_title("  short  "), "short");
    }
}
