//! Error types for KEEL.

use std::io;

/// Errors produced by the KEEL framework.
#[derive(Debug, thiserror::Error)]
pub enum KeelError {
    #[error("config error: {0}")]
    Config(String),

    #[error("handler error: {0}")]
    Handler(String),

    #[error("unknown command handler: {0}")]
    UnknownHandler(String),

    #[error("unknown manifest: {0}")]
    UnknownManifest(String),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("mailbox closed: {0}")]
    MailboxClosed(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, KeelError>;
