//! External engine plumbing
//!
//! Runtime resolution, staging of uploads, and child process execution.
//! Nothing here knows what a scan or a sanitize request means.

pub mod locator;
pub mod resolver;
pub mod runner;
pub mod staging;

pub use locator::{EngineCommand, EngineKind, EngineLocator};
pub use resolver::{RuntimeCommand, RuntimeResolver, VersionProbe};
pub use runner::{Invocation, ProcessRunner};
pub use staging::{StagedFile, StagingArea};

/// Keeps engine children from flashing a console window
#[cfg(windows)]
pub(crate) const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Fixed text encoding for engine I/O, independent of the host locale
pub const ENCODING_ENV: (&str, &str) = ("PYTHONIOENCODING", "utf-8");
