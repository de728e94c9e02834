//! CLI library for testing purposes

pub mod config;
pub mod export;
pub mod server;

pub use config::{ConfigError, Settings};
pub use export::{ExportRequest, export_file, run_export, run_push};
pub use server::{ApiError, AppState, router};
