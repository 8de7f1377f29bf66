//! Diagnostic rendering: ariadne reports for terminals, JSON for tools

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};

use super::{Diagnostic, Severity};

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report with source snippets
    Text,
    /// JSON array, one object per diagnostic
    Json,
    /// JSON with pretty-printing
    JsonPretty,
}

/// Renders diagnostics of one source
#[derive(Debug, Clone)]
pub struct DiagnosticRenderer {
    output_format: OutputFormat,
    colors: bool,
}

impl DiagnosticRenderer {
    /// Text output with colors
    pub fn new() -> Self {
        Self {
            output_format: OutputFormat::Text,
            colors: true,
        }
    }

    /// Text output without ANSI colors
    pub fn no_colors() -> Self {
        Self {
            output_format: OutputFormat::Text,
            colors: false,
        }
    }

    pub fn with_format(format: OutputFormat) -> Self {
        Self {
            output_format: format,
            colors: format == OutputFormat::Text,
        }
    }

    pub fn set_colors(&mut self, colors: bool) {
        self.colors = colors && self.output_format == OutputFormat::Text;
    }

    pub fn format(&self) -> OutputFormat {
        self.output_format
    }

    /// Render all diagnostics of `source` in the configured format
    pub fn render(&self, diagnostics: &[Diagnostic], source: &str) -> String {
        match self.output_format {
            OutputFormat::Text => diagnostics
                .iter()
                .map(|d| self.render_text(d, source))
                .collect(),
            OutputFormat::Json => self.render_json(diagnostics, false),
            OutputFormat::JsonPretty => self.render_json(diagnostics, true),
        }
    }

    fn render_text(&self, diagnostic: &Diagnostic, source: &str) -> String {
        let id = diagnostic.location.source_id.as_str();
        let span = clamp_span(&diagnostic.location.span, source);
        let (kind, color) = match diagnostic.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
            Severity::Info => (ReportKind::Advice, Color::Blue),
        };

        let config = Config::default()
            .with_color(self.colors)
            .with_index_type(IndexType::Byte);
        let report = Report::build(kind, (id, span.clone()))
            .with_config(config)
            .with_code(&diagnostic.code)
            .with_message(&diagnostic.message)
            .with_label(
                Label::new((id, span))
                    .with_message(&diagnostic.message)
                    .with_color(color),
            )
            .finish();

        let mut out = Vec::new();
        match report.write((id, Source::from(source)), &mut out) {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            // Fall back to the one-line form if the report cannot be laid out
            Err(_) => format!("{diagnostic}\n"),
        }
    }

    fn render_json(&self, diagnostics: &[Diagnostic], pretty: bool) -> String {
        let rendered = if pretty {
            serde_json::to_string_pretty(diagnostics)
        } else {
            serde_json::to_string(diagnostics)
        };
        rendered.unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {e}\"}}"))
    }
}

impl Default for DiagnosticRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep spans inside the source so the report can always be drawn
fn clamp_span(span: &std::ops::Range<usize>, source: &str) -> std::ops::Range<usize> {
    let start = span.start.min(source.len());
    let end = span.end.clamp(start, source.len());
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticKind, Location};

    fn sample() -> (Diagnostic, &'static str) {
        let source = "rule R\n    priority 5\nwhen then end\n";
        let diagnostic = Diagnostic::warning(
            DiagnosticKind::SemanticWarning,
            "unknown rule attribute 'priority'",
            Location::new("rules.drl", 11..19, 2, 5),
        );
        (diagnostic, source)
    }

    #[test]
    fn test_render_text_without_colors() {
        let (diagnostic, source) = sample();
        let output = DiagnosticRenderer::no_colors().render(&[diagnostic], source);
        assert!(output.contains("DRL003"));
        assert!(output.contains("unknown rule attribute 'priority'"));
        assert!(output.contains("rules.drl"));
        assert!(!output.contains("\u{1b}["));
    }

    #[test]
    fn test_render_json() {
        let (diagnostic, source) = sample();
        let output = DiagnosticRenderer::with_format(OutputFormat::Json).render(&[diagnostic], source);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["code"], "DRL003");
        assert_eq!(value[0]["location"]["line"], 2);
    }

    #[test]
    fn test_span_past_end_is_clamped() {
        assert_eq!(clamp_span(&(5..50), "abcdefg"), 5..7);
        assert_eq!(clamp_span(&(40..50), "abc"), 3..3);
    }
}
