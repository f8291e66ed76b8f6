//! WalkSafe relay services
//!
//! Two small HTTP services: the analysis service relays pavement photos to
//! a hosted vision model, the page service only renders the static page.
//!
//! Copyright (c) 2025 Michael A Wright

pub mod config;
pub mod error;
pub mod page;
pub mod routes;
pub mod startup;

pub use config::{ServerConfig, ServiceKind};
pub use routes::{analysis_router, page_router, AppState};
