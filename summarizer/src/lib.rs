pub mod config;
pub mod conversation;
pub mod document_processor;
pub mod error;
pub mod gemini_service;
pub mod models;
pub mod retry;
pub mod summarizer_service;
pub mod summary;
pub mod upload_store;

pub use config::AppConfig;
pub use document_processor::DocumentProcessor;
pub use error::{ConfigError, ModelError, SummarizerError};
pub use gemini_service::{ChatModel, GeminiService};
pub use models::*;
pub use summarizer_service::Summarizer;
pub use upload_store::UploadStore;
