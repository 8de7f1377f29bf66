//! Diagnostics for DRL parsing and rewriting
//!
//! A `Diagnostic` carries a severity, a kind, a stable code, a message and a
//! location (byte span, 1-based line and column, opaque source id).
//! Diagnostics are collected per invocation; nothing here is global.

mod renderer;

pub use renderer::{DiagnosticRenderer, OutputFormat};

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::cst::{LexerError, ParseError};

/// Severity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational messages
    Info,
    /// Warnings that do not make the input invalid
    Warning,
    /// Errors: the input is not valid DRL or an operation failed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// What produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    LexError,
    SyntaxError,
    SemanticWarning,
    RewriteConflict,
    StaleHandle,
    /// Failures of the surrounding machinery (bad replacement, bad config)
    Internal,
}

impl DiagnosticKind {
    /// Stable code shown in reports
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::LexError => "DRL001",
            DiagnosticKind::SyntaxError => "DRL002",
            DiagnosticKind::SemanticWarning => "DRL003",
            DiagnosticKind::RewriteConflict => "DRL004",
            DiagnosticKind::StaleHandle => "DRL005",
            DiagnosticKind::Internal => "DRL099",
        }
    }
}

/// Location information for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    /// Opaque source identifier, usually a file path
    pub source_id: String,
    /// Byte range in the source
    pub span: Range<usize>,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in chars)
    pub column: usize,
}

impl Location {
    pub fn new(source_id: impl Into<String>, span: Range<usize>, line: usize, column: usize) -> Self {
        Self {
            source_id: source_id.into(),
            span,
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source_id, self.line, self.column)
    }
}

/// A diagnostic message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Stable code derived from `kind`
    pub code: String,
    pub message: String,
    pub location: Location,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(
        severity: Severity,
        kind: DiagnosticKind,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            severity,
            kind,
            code: kind.code().to_string(),
            message: message.into(),
            location,
        }
    }

    pub fn error(kind: DiagnosticKind, message: impl Into<String>, location: Location) -> Self {
        Self::new(Severity::Error, kind, message, location)
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>, location: Location) -> Self {
        Self::new(Severity::Warning, kind, message, location)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Diagnostic for a lexer error
    pub fn from_lexer_error(error: &LexerError, source_id: &str, map: &SourceMap, source: &str) -> Self {
        Self::error(
            DiagnosticKind::LexError,
            error.message.clone(),
            map.location(source_id, error.span.clone(), source),
        )
    }

    /// Diagnostic for a parse error; unknown attributes become warnings
    pub fn from_parse_error(error: &ParseError, source_id: &str, map: &SourceMap, source: &str) -> Self {
        let location = map.location(source_id, error.span.clone(), source);
        if error.is_warning() {
            Self::warning(DiagnosticKind::SemanticWarning, error.message.clone(), location)
        } else {
            Self::error(DiagnosticKind::SyntaxError, error.message.clone(), location)
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}[{}] {}",
            self.location, self.severity, self.code, self.message
        )
    }
}

/// Append-only diagnostic sink for one invocation
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics ordered by offset; equal offsets keep insertion order
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by_key(|d| d.location.span.start);
        self.diagnostics
    }
}

impl Extend<Diagnostic> for DiagnosticCollector {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.diagnostics.extend(iter);
    }
}

/// Byte offset to line/column mapping
///
/// Built once per source in O(n); lookups are a binary search over line starts.
#[derive(Debug, Clone)]
pub struct SourceMap {
    /// Byte offset of the start of each line
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let bytes = source.as_bytes();
        for (idx, &byte) in bytes.iter().enumerate() {
            match byte {
                b'\n' => line_starts.push(idx + 1),
                // a lone `\r` ends a line too
                b'\r' if bytes.get(idx + 1) != Some(&b'\n') => line_starts.push(idx + 1),
                _ => {}
            }
        }
        Self { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 1-based `(line, column)` of a byte offset; columns count chars
    pub fn offset_to_position(&self, offset: usize, source: &str) -> (usize, usize) {
        let offset = offset.min(source.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.line_starts[line_idx];
        let column = source
            .get(line_start..offset)
            .map(|text| text.chars().count())
            .unwrap_or(offset - line_start);
        (line_idx + 1, column + 1)
    }

    pub fn location(&self, source_id: &str, span: Range<usize>, source: &str) -> Location {
        let (line, column) = self.offset_to_position(span.start, source);
        Location::new(source_id, span, line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_map_positions() {
        let source = "rule R\nwhen\r\n  Person()\rthen";
        let map = SourceMap::new(source);
        assert_eq!(map.line_count(), 4);
        assert_eq!(map.offset_to_position(0, source), (1, 1));
        assert_eq!(map.offset_to_position(5, source), (1, 6));
        assert_eq!(map.offset_to_position(7, source), (2, 1));
        assert_eq!(map.offset_to_position(15, source), (3, 3));
        assert_eq!(map.offset_to_position(24, source), (4, 1));
    }

    #[test]
    fn test_unicode_columns() {
        let source = "rule \"日本\" when";
        let map = SourceMap::new(source);
        // 'w' is after 5 ASCII chars, a quote, two wide chars, a quote and a space
        let offset = source.find("when").unwrap();
        assert_eq!(map.offset_to_position(offset, source), (1, 11));
    }

    #[test]
    fn test_collector_sorts_stably_by_offset() {
        let loc = |start: usize| Location::new("a.drl", start..start + 1, 1, start + 1);
        let mut collector = DiagnosticCollector::new();
        collector.push(Diagnostic::error(DiagnosticKind::SyntaxError, "third", loc(9)));
        collector.push(Diagnostic::error(DiagnosticKind::LexError, "first", loc(2)));
        collector.push(Diagnostic::warning(
            DiagnosticKind::RewriteConflict,
            "second",
            loc(2),
        ));
        assert!(collector.has_errors());

        let messages: Vec<_> = collector
            .into_sorted()
            .into_iter()
            .map(|d| d.message)
            .collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_diagnostic_display_and_json() {
        let diagnostic = Diagnostic::warning(
            DiagnosticKind::SemanticWarning,
            "unknown rule attribute 'priority'",
            Location::new("rules.drl", 7..15, 2, 5),
        );
        assert_eq!(
            diagnostic.to_string(),
            "rules.drl:2:5: warning[DRL003] unknown rule attribute 'priority'"
        );

        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["kind"], "semantic-warning");
        assert_eq!(json["location"]["span"]["start"], 7);
    }
}
