//! Error types for imref-core

use thiserror::Error;

use crate::config::ConfigError;
use crate::import::RenderError;
use crate::remote::RemoteError;
use crate::vault::VaultError;

/// Result type alias for import operations
pub type Result<T> = std::result::Result<T, ImportError>;

/// Upper bound on the length of a user-visible failure notice
pub const NOTICE_LIMIT: usize = 240;

/// Main error type for import operations
#[derive(Error, Debug)]
pub enum ImportError {
    /// Settings are incomplete; the pipeline never starts
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Search produced no importable candidates
    #[error("no matching items found")]
    NoResults,

    /// The selected item has no detail record on the remote side
    #[error("item {0} is no longer available in the remote library")]
    MissingDetail(String),

    /// Remote transport or payload error
    #[error("remote library error: {0}")]
    Remote(#[from] RemoteError),

    /// Template rendering error
    #[error("template error: {0}")]
    Render(#[from] RenderError),

    /// Document store error
    #[error("vault error: {0}")]
    Vault(#[from] VaultError),
}

/// Clamp a failure message to [`NOTICE_LIMIT`] characters for display.
pub fn summarize_for_notice(message: &str) -> String {
    let message = message.trim();
    if message.chars().count() <= NOTICE_LIMIT {
        return message.to_string();
    }
    let mut clamped: String = message.chars().take(NOTICE_LIMIT - 1).collect();
    clamped.push('…');
    clamped
}
