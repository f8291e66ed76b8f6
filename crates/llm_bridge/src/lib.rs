//! LLM Bridge for Groq integration
//!
//! Provides the relay between an inbound pavement photo and a hosted
//! vision model reached through Groq's chat-completions API.
//!
//! Copyright (c) 2025 Michael A Wright

pub mod error;
pub mod groq;
pub mod vision;

pub use error::RelayError;
pub use groq::{GroqClient, GroqConfig};
pub use vision::{ImageAnalyzer, PavementAnalyzer};
