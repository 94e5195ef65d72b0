// Texnel data model shared by the orchestrators and the IPC layer

pub mod detection;
pub mod events;
pub mod sanitize;
pub mod scan;

// Re-exports for convenience
pub use detection::{normalize_detections, Detection};
pub use events::{CompletionEvent, ProgressEvent, ResultEvent};
pub use sanitize::{SanitizeRequest, SanitizeResult};
pub use scan::{ScanRequestItem, ScanResult};
