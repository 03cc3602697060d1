//! Core engine for the CodeHub learner client: module content parsing,
//! slide progress gating, quiz scoring, the AI mentor chat flow, and the
//! HTTP client the UI layer drives. All business logic and persistence
//! live behind the backend API; this crate keeps the client-side state
//! machines honest.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use client::ApiClient;
pub use config::Config;
pub use error::ApiError;
