//! # Error Handling
//!
//! This module defines the centralized error type for `create-openfort`. It
//! uses `thiserror` to describe every failure the scaffolding pipeline can
//! surface to the command-line driver.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Programmer errors (`NotInitialized`), fatal
//!   configuration errors (`TemplateNotFound`), categorized download failures
//!   (`Download`) and user cancellation (`Cancelled`) are kept apart so the
//!   driver can decide how to present each of them.
//!
//! - **`DownloadError`**: The categorized error produced by the remote
//!   fetcher. Raw process output is classified once, at the download boundary,
//!   into a [`DownloadErrorKind`] with a human-readable message and the raw
//!   details kept for verbose output.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Nothing in the library retries; errors bubble up unmodified to the driver,
//! which prints them and exits non-zero.

use std::fmt;

use thiserror::Error;

/// Main error type for create-openfort operations
#[derive(Error, Debug)]
pub enum Error {
    /// A workspace method was called before `Workspace::initialize` succeeded.
    #[error("Workspace not initialized")]
    NotInitialized,

    /// The raw template directory for the requested framework does not exist.
    #[error("Template '{framework}' not found at {path}")]
    TemplateNotFound { framework: String, path: String },

    /// A template download failed and was categorized.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The user cancelled an interactive prompt. Not a failure.
    #[error("{message}")]
    Cancelled { message: String },

    /// A package name supplied by the user is not a valid package.json name.
    #[error("Invalid package.json name: {name}")]
    InvalidPackageName { name: String },

    /// A template name that is not part of the registry.
    #[error("Unknown template '{name}'")]
    UnknownTemplate { name: String },

    /// A filesystem operation failed with additional context.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An interactive prompt could not be shown.
    #[error("Prompt error: {message}")]
    Prompt { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A pattern built at runtime did not compile.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// The default cancellation error.
    pub fn cancelled() -> Self {
        Self::Cancelled {
            message: "Operation cancelled".to_string(),
        }
    }

    /// Whether this error is a user-initiated cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Category of a failed template download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadErrorKind {
    RepoNotFound,
    NetworkError,
    RateLimit,
    SpawnNotFound,
    Timeout,
    Unknown,
}

impl DownloadErrorKind {
    /// Stable machine-readable code for the category.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RepoNotFound => "REPO_NOT_FOUND",
            Self::NetworkError => "NETWORK_ERROR",
            Self::RateLimit => "RATE_LIMIT",
            Self::SpawnNotFound => "SPAWN_NOT_FOUND",
            Self::Timeout => "TIMEOUT",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for DownloadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A download failure classified into a fixed taxonomy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DownloadError {
    pub kind: DownloadErrorKind,
    /// Human-readable, actionable message
    pub message: String,
    /// Raw process output or exception text the category was derived from
    pub details: String,
}

impl DownloadError {
    pub fn new(kind: DownloadErrorKind, message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: details.into(),
        }
    }

    /// The download did not reach a terminal event in time.
    pub fn timeout(timeout_secs: f64) -> Self {
        Self::new(
            DownloadErrorKind::Timeout,
            format!(
                "Template download timed out after {}s. \
                 This might be due to network issues or the repository being unavailable. \
                 Please check your internet connection and try again.",
                timeout_secs
            ),
            format!("Timeout: {}s", timeout_secs),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_initialized() {
        let display = format!("{}", Error::NotInitialized);
        assert_eq!(display, "Workspace not initialized");
    }

    #[test]
    fn test_error_display_template_not_found() {
        let error = Error::TemplateNotFound {
            framework: "vite".to_string(),
            path: "/templates/raw-templates/template-vite".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Template 'vite' not found"));
        assert!(display.contains("raw-templates/template-vite"));
    }

    #[test]
    fn test_error_display_download_is_transparent() {
        let error: Error = DownloadError::new(
            DownloadErrorKind::RateLimit,
            "GitHub rate limit exceeded. Please try again later.",
            "rate limit",
        )
        .into();
        assert_eq!(
            format!("{}", error),
            "GitHub rate limit exceeded. Please try again later."
        );
    }

    #[test]
    fn test_cancelled_is_not_a_failure_kind() {
        let error = Error::cancelled();
        assert!(error.is_cancelled());
        assert_eq!(format!("{}", error), "Operation cancelled");
        assert!(!Error::NotInitialized.is_cancelled());
    }

    #[test]
    fn test_timeout_error_mentions_seconds_and_connectivity() {
        let error = DownloadError::timeout(60.0);
        assert_eq!(error.kind, DownloadErrorKind::Timeout);
        assert!(error.message.contains("timed out after 60s"));
        assert!(error.message.contains("check your internet connection"));
        assert_eq!(error.details, "Timeout: 60s");
    }

    #[test]
    fn test_timeout_error_fractional_seconds() {
        let error = DownloadError::timeout(0.1);
        assert!(error.message.contains("after 0.1s"));
    }

    #[test]
    fn test_download_error_kind_codes() {
        assert_eq!(DownloadErrorKind::RepoNotFound.code(), "REPO_NOT_FOUND");
        assert_eq!(DownloadErrorKind::NetworkError.code(), "NETWORK_ERROR");
        assert_eq!(DownloadErrorKind::RateLimit.code(), "RATE_LIMIT");
        assert_eq!(DownloadErrorKind::SpawnNotFound.code(), "SPAWN_NOT_FOUND");
        assert_eq!(DownloadErrorKind::Timeout.code(), "TIMEOUT");
        assert_eq!(DownloadErrorKind::Unknown.to_string(), "UNKNOWN_ERROR");
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        let error: Error = json_error.into();
        assert!(format!("{}", error).contains("JSON error"));
    }

    #[test]
    fn test_error_from_regex_error() {
        let regex_error = regex::Regex::new("(unclosed").unwrap_err();
        let error: Error = regex_error.into();
        assert!(matches!(error, Error::Regex(_)));
        assert!(error.to_string().starts_with("Regex error:"));
    }
}
