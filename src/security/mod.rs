//! Security module
//!
//! Validation of paths handed across the UI/host boundary

pub mod path_validation;
