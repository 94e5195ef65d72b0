// Texnel - desktop host for document threat scanning and sanitization
// Module re-exports

pub mod channel;
pub mod commands;
pub mod engine;
pub mod error;
pub mod export;
pub mod models;
pub mod orchestrator;
pub mod security;
pub mod utils;

// Re-export commonly used types
pub use models::{
    Detection, SanitizeRequest, SanitizeResult, ScanRequestItem, ScanResult,
    ProgressEvent, ResultEvent, CompletionEvent,
};

pub use channel::{Dispatcher, Registrar, Request, Response};
pub use engine::{EngineLocator, RuntimeCommand, RuntimeResolver};
pub use error::{ChannelError, EngineError};
pub use orchestrator::{SanitizeOrchestrator, ScanOrchestrator};
pub use utils::AppConfig;
