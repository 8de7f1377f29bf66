//! Result type alias for DRL operations

use tracing::{error, warn};

use crate::diagnostics::Diagnostic;
use crate::error::DrlError;

/// Standard Result type for DRL operations
pub type Result<T> = std::result::Result<T, DrlError>;

/// Extension trait for callers that process many sources and keep going
pub trait ResultExt<T> {
    /// Log the error and turn it into a diagnostic reported against `source_id`
    fn or_diagnostic(self, source_id: &str) -> std::result::Result<T, Diagnostic>;
}

impl<T> ResultExt<T> for Result<T> {
    fn or_diagnostic(self, source_id: &str) -> std::result::Result<T, Diagnostic> {
        self.map_err(|err| {
            if err.is_recoverable() {
                warn!(source_id, "Continuing after error: {err}");
            } else {
                error!(source_id, "Fatal error: {err}");
            }
            err.to_diagnostic(source_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;

    #[test]
    fn test_ok_passes_through() {
        let ok: Result<u32> = Ok(3);
        assert_eq!(ok.or_diagnostic("a.drl").ok(), Some(3));
    }

    #[test]
    fn test_error_becomes_diagnostic() {
        let empty: Result<u32> = Err(DrlError::EmptyInput {
            source_id: "a.drl".to_string(),
        });
        let diagnostic = empty.or_diagnostic("a.drl").unwrap_err();
        assert!(diagnostic.is_error());
        assert_eq!(diagnostic.kind, DiagnosticKind::LexError);
        assert_eq!(diagnostic.location.source_id, "a.drl");

        let fatal: Result<u32> = Err(DrlError::internal_error("bug"));
        let diagnostic = fatal.or_diagnostic("b.drl").unwrap_err();
        assert_eq!(diagnostic.kind, DiagnosticKind::Internal);
    }
}
