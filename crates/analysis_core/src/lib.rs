//! Core types for WalkSafe
//!
//! Data model shared by the relay services and the CLI: the analysis
//! request the browser submits, the analysis result the vision model
//! returns, and an opt-in sanitizer for that result.

pub mod sanitize;
pub mod types;

pub use sanitize::{sanitize, SanitizeError};
pub use types::*;
