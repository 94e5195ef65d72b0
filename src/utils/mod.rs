//! Utility functions for the Texnel host
//!
//! Provides environment variable handling and host configuration.

pub mod env;

pub use env::{load_env, AppConfig};
