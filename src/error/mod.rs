//! Error types and handling for `ticketry`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration at the application boundary
//! - Keeps the attachment failure taxonomy distinct: `InvalidPath`
//!   (failed the path-safety rule), `Io` (filesystem step failed), and
//!   `NotPersisted` (filesystem step succeeded, metadata commit failed)
//!   so callers can alert on the one state the store cannot self-heal

use thiserror::Error;

/// Primary error type for `ticketry` operations.
#[derive(Error, Debug)]
pub enum TicketryError {
    // === Storage Errors ===
    /// `SQLite` database error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // === Entity Errors ===
    /// Ticket with the specified ID was not found.
    #[error("Ticket not found: {id}")]
    TicketNotFound { id: String },

    /// Attachment row with the specified ID was not found.
    #[error("Attachment not found: {id}")]
    AttachmentNotFound { id: i64 },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Invalid role value.
    #[error("Invalid role: {role}")]
    InvalidRole { role: String },

    /// Invalid notification message value.
    #[error("Invalid notification message: {message}")]
    InvalidMessage { message: String },

    // === Notification Errors ===
    /// A dispatch write was rejected by the store. `index` identifies the
    /// failing intent within the batch; earlier intents are not rolled
    /// back by the dispatcher (the enclosing transaction owns that).
    #[error("Dispatch failed for intent {index} ({message})")]
    DispatchFailed {
        index: usize,
        message: String,
        #[source]
        source: rusqlite::Error,
    },

    // === Attachment Errors ===
    /// Path failed the attachment path-safety rule.
    #[error("Unsafe attachment path: '{path}'")]
    InvalidPath { path: String },

    /// The filesystem step succeeded but the metadata commit failed.
    /// The file at `path` (relative to the media root) has no matching
    /// row, or the row is stale; callers should alert or reconcile.
    #[error("Attachment file step succeeded but metadata was not persisted for '{path}'")]
    NotPersisted {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    // === Configuration Errors ===
    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error for callers composing with other crates.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TicketryError {
    /// Can the user fix this without code changes?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TicketNotFound { .. }
                | Self::AttachmentNotFound { .. }
                | Self::Validation { .. }
                | Self::InvalidRole { .. }
                | Self::InvalidMessage { .. }
                | Self::InvalidPath { .. }
        )
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type using `TicketryError`.
pub type Result<T> = std::result::Result<T, TicketryError>;
