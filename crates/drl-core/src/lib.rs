//! DRL Core
//!
//! Lossless parsing and rewriting of DRL (Drools Rule Language) sources.
//! This crate provides the lexer, the rowan-based concrete syntax tree, a
//! visitor framework and the rewrite engine that migration recipes build on.
//!
//! ```rust
//! let source = "rule \"R\" when $a : Person( age > 18 ) then System.out.println($a); end";
//! let output = drl_core::parse(source, "rules.drl").unwrap();
//! assert!(output.diagnostics.is_empty());
//! assert_eq!(output.tree.text(), source);
//! ```

pub mod config;
pub mod cst; // Concrete Syntax Tree (lossless, Rowan-based)
pub mod diagnostics;
pub mod error;
pub mod result;
pub mod rewrite;
pub mod tree;
pub mod visitor;

use rayon::prelude::*;
use tracing::{debug, warn};

// Re-export commonly used types
pub use config::{DrlConfig, MigrationOptions, ParserConfig, RewriteConfig};
pub use cst::{DrlSyntaxElement, DrlSyntaxKind, DrlSyntaxNode, DrlSyntaxToken, parse_drl};
pub use diagnostics::{
    Diagnostic, DiagnosticCollector, DiagnosticKind, DiagnosticRenderer, Location, OutputFormat,
    Severity, SourceMap,
};
pub use error::{DrlError, ErrorKind};
pub use result::{Result, ResultExt};
pub use rewrite::{Edit, EditAction, Replacement, RewriteEngine, RewriteOutput};
pub use tree::{NodeHandle, NodeIndex, SyntaxTree, TreeId};
pub use visitor::{
    VisitAction, VisitContext, Visitor, VisitorRegistry, WalkOutcome, walk, walk_parallel,
};

/// A parsed source: the tree plus its diagnostics sorted by offset
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub tree: SyntaxTree,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Parse DRL source with the default parser configuration
pub fn parse(source: &str, source_id: &str) -> Result<ParseOutput> {
    parse_with_config(source, source_id, &ParserConfig::default())
}

/// Parse DRL source
///
/// Syntax and lexical errors never fail the call; they become diagnostics
/// and the tree still re-serializes to `source`.
pub fn parse_with_config(source: &str, source_id: &str, config: &ParserConfig) -> Result<ParseOutput> {
    if config.reject_empty && source.trim().is_empty() {
        return Err(DrlError::EmptyInput {
            source_id: source_id.to_string(),
        });
    }

    let (green, lexer_errors, parse_errors) = cst::parse_green(source, config.max_errors);
    let map = SourceMap::new(source);
    let mut collector = DiagnosticCollector::new();
    collector.extend(
        lexer_errors
            .iter()
            .map(|e| Diagnostic::from_lexer_error(e, source_id, &map, source)),
    );
    collector.extend(
        parse_errors
            .iter()
            .map(|e| Diagnostic::from_parse_error(e, source_id, &map, source)),
    );
    if collector.has_errors() {
        warn!(
            source_id,
            lexer_errors = lexer_errors.len(),
            parse_errors = parse_errors.len(),
            "recovered from syntax errors"
        );
    }

    let tree = SyntaxTree::new(green, source_id);
    debug!(source_id, tree = %tree.id(), len = source.len(), "parsed");
    Ok(ParseOutput {
        tree,
        diagnostics: collector.into_sorted(),
    })
}

/// Parse raw bytes; fails with [`DrlError::InvalidUtf8`] on undecodable input
pub fn parse_bytes(bytes: &[u8], source_id: &str, config: &ParserConfig) -> Result<ParseOutput> {
    let source = std::str::from_utf8(bytes).map_err(|e| DrlError::InvalidUtf8 {
        source_id: source_id.to_string(),
        offset: e.valid_up_to(),
    })?;
    parse_with_config(source, source_id, config)
}

/// Parse many `(source_id, source)` inputs in parallel
///
/// Results are returned in input order.
pub fn parse_many<S, I>(inputs: &[(I, S)], config: &ParserConfig) -> Vec<Result<ParseOutput>>
where
    S: AsRef<str> + Sync,
    I: AsRef<str> + Sync,
{
    inputs
        .par_iter()
        .map(|(source_id, source)| parse_with_config(source.as_ref(), source_id.as_ref(), config))
        .collect()
}

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    init_tracing_with("drl=info");
}

/// Initialize tracing with `default_filter` unless `RUST_LOG` is set
///
/// Events go to stderr so that stdout stays free for command output.
pub fn init_tracing_with(default_filter: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
