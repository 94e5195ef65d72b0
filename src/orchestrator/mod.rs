//! Scan and sanitize orchestration on top of the engine plumbing

pub mod sanitize;
pub mod scan;

pub use sanitize::SanitizeOrchestrator;
pub use scan::ScanOrchestrator;
