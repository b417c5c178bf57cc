//! Core domain library for pastecan (config, storage, lifecycle, models).

/// Content classification for inbound payloads.
pub mod classify;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Database access layer.
pub mod db;
/// Client-side passphrase encryption envelope.
pub mod envelope;
/// Application error types (storage/domain).
pub mod error;
/// Slug and capability-id allocation.
pub mod ident;
/// Paste lifecycle orchestration (create/read/update/delete/sweep).
pub mod lifecycle;
/// Data models for requests and persistence.
pub mod models;

pub use config::{AuthMode, Config};
pub use constants::DEFAULT_PORT;
pub use db::Database;
pub use error::AppError;
pub use lifecycle::PasteService;
