pub mod chat;
pub mod content;
pub mod progress;
pub mod quiz;
pub mod settings;

pub use chat::{AiAction, ChatMessage, ChatRole, ChatSession};
pub use content::{Choice, Question, QuestionType, Slide};
pub use progress::ModuleProgress;
pub use quiz::{AttemptRecord, QuizSubmission, ScoreSummary};
pub use settings::AppSettings;
