//! Error types for parsing and rewriting DRL

use thiserror::Error;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Location, Severity};
use crate::tree::{NodeHandle, TreeId};

/// Main error type of the DRL core
///
/// Lexical and syntax errors are never returned as `DrlError`; they are
/// recovered and reported as diagnostics. These errors stop one call.
#[derive(Debug, Error)]
pub enum DrlError {
    /// Empty input while `parser.reject_empty` is set
    #[error("Empty input: '{source_id}' contains no DRL")]
    EmptyInput { source_id: String },

    /// Input bytes that are not UTF-8
    #[error("Invalid UTF-8 in '{source_id}' at byte {offset}")]
    InvalidUtf8 { source_id: String, offset: usize },

    /// A handle that does not belong to the tree it is applied to
    #[error("Stale node handle {handle}: {reason}")]
    StaleHandle { handle: NodeHandle, reason: String },

    /// Another rewrite batch holds the tree
    #[error("Concurrent rewrite of tree {tree}")]
    ConcurrentRewrite { tree: TreeId },

    /// Replacement text that does not parse as the requested fragment
    #[error("Invalid {fragment} replacement: {reason}")]
    InvalidReplacement { fragment: String, reason: String },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Handle,
    Concurrency,
    Replacement,
    Config,
    Internal,
}

impl DrlError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DrlError::EmptyInput { .. } | DrlError::InvalidUtf8 { .. } => ErrorKind::Input,
            DrlError::StaleHandle { .. } => ErrorKind::Handle,
            DrlError::ConcurrentRewrite { .. } => ErrorKind::Concurrency,
            DrlError::InvalidReplacement { .. } => ErrorKind::Replacement,
            DrlError::Config { .. } => ErrorKind::Config,
            DrlError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Check if processing of other files (or other recipes) can continue
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Input | ErrorKind::Concurrency | ErrorKind::Replacement
        )
    }

    /// Report this error as a diagnostic against `source_id`
    pub fn to_diagnostic(&self, source_id: &str) -> Diagnostic {
        let kind = match self {
            DrlError::StaleHandle { .. } => DiagnosticKind::StaleHandle,
            DrlError::EmptyInput { .. } | DrlError::InvalidUtf8 { .. } => DiagnosticKind::LexError,
            DrlError::ConcurrentRewrite { .. } => DiagnosticKind::RewriteConflict,
            DrlError::InvalidReplacement { .. }
            | DrlError::Config { .. }
            | DrlError::Internal { .. } => DiagnosticKind::Internal,
        };
        let span = match self {
            DrlError::InvalidUtf8 { offset, .. } => *offset..*offset,
            _ => 0..0,
        };
        Diagnostic::new(
            Severity::Error,
            kind,
            self.to_string(),
            Location::new(source_id, span, 1, 1),
        )
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub(crate) fn stale_handle(handle: NodeHandle, reason: impl Into<String>) -> Self {
        Self::StaleHandle {
            handle,
            reason: reason.into(),
        }
    }
}

impl From<toml::de::Error> for DrlError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = DrlError::EmptyInput {
            source_id: "a.drl".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Input);
        assert!(err.is_recoverable());
        assert!(!DrlError::internal_error("boom").is_recoverable());
        assert_eq!(
            DrlError::config_error("bad key").to_string(),
            "Configuration error: bad key"
        );
    }

    #[test]
    fn test_invalid_utf8_diagnostic_points_at_offset() {
        let err = DrlError::InvalidUtf8 {
            source_id: "a.drl".to_string(),
            offset: 7,
        };
        let diagnostic = err.to_diagnostic("a.drl");
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.location.span, 7..7);
        assert!(diagnostic.message.contains("byte 7"));
    }
}
