pub mod chat_service;
pub mod content_parser;
pub mod progress_service;
pub mod quiz_service;
pub mod settings_service;

pub use chat_service::{ChatThread, StreamSimulator};
pub use content_parser::{parse_questions, parse_slides};
pub use progress_service::{ProgressGate, ProgressSync};
pub use quiz_service::{calculate_score, Answer, AnswerSheet, QuizAttempt, QuizState};
pub use settings_service::SettingsService;
