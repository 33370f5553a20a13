//! Error types for the EKS review compiler.
//!
//! Library crates use [`EksReviewError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! [`RenderError`] is kept separate: a chart failure degrades the document
//! instead of aborting it, so the assembler matches on it locally.

use std::path::PathBuf;

/// Top-level error type for all review operations.
#[derive(Debug, thiserror::Error)]
pub enum EksReviewError {
    /// Missing or invalid configuration / credentials.
    #[error("config error: {message}")]
    Config { message: String },

    /// Chart backend failure.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Layout or artifact write failure. Fatal for the whole compile.
    #[error("assembly error: {message}")]
    Assembly { message: String },

    /// Documentation lookup failure (optional enrichment only).
    #[error("lookup error: {0}")]
    Lookup(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid input snapshot or data.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// JSON/TOML encode or decode error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EksReviewError>;

impl EksReviewError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an assembly error from any displayable message.
    pub fn assembly(msg: impl Into<String>) -> Self {
        Self::Assembly {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the compiler may keep going after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Render(_) | Self::Lookup(_))
    }
}

/// Failure of the risk chart backend.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The chart backend could not produce an image.
    #[error("chart backend failed: {0}")]
    Backend(String),

    /// Chart input was not usable (e.g. zero-sized canvas).
    #[error("invalid chart input: {0}")]
    InvalidInput(String),

    /// The temporary image file could not be created or written.
    #[error("chart asset I/O at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = EksReviewError::config("missing AWS credentials");
        assert_eq!(err.to_string(), "config error: missing AWS credentials");

        let err = EksReviewError::assembly("destination not writable");
        assert!(err.to_string().contains("destination not writable"));
    }

    #[test]
    fn render_errors_convert_and_are_recoverable() {
        let err: EksReviewError = RenderError::Backend("no encoder".into()).into();
        assert!(err.to_string().starts_with("render error"));
        assert!(err.is_recoverable());
        assert!(EksReviewError::Lookup("search down".into()).is_recoverable());
        assert!(!EksReviewError::assembly("boom").is_recoverable());
    }
}
