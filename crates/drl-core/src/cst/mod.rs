//! Concrete Syntax Tree (CST) for DRL
//!
//! A lossless syntax tree built on rowan. Every byte of the input, including
//! whitespace, comments and unparseable text, ends up in a token of the tree,
//! so `parse_drl(source).0.text() == source` holds for any input.
//!
//! ## Architecture
//!
//! - **Green tree**: immutable, position independent, `Arc` shared. Rewrites
//!   build new green nodes and reuse every untouched subtree.
//! - **Red tree**: a view over the green tree with parent pointers and
//!   offsets, built on demand for navigation.
//!
//! ## Trivia
//!
//! Top-level declarations own the trivia before them and the trivia up to the
//! first newline after them. Inner nodes start and end at significant tokens;
//! see [`trivia`].
//!
//! ## Example
//!
//! ```rust
//! use drl_core::cst::{DrlSyntaxKind, parse_drl};
//!
//! let source = "rule R\nwhen\n    Person( age > 18 ) // adults\nthen\nend\n";
//! let (cst, _lexer_errors, errors) = parse_drl(source);
//! assert!(errors.is_empty());
//! assert_eq!(cst.text().to_string(), source);
//!
//! let comments = cst
//!     .descendants_with_tokens()
//!     .filter_map(|e| e.into_token())
//!     .filter(|t| t.kind() == DrlSyntaxKind::CommentLine)
//!     .count();
//! assert_eq!(comments, 1);
//! ```

mod builder;
mod language;
mod lexer;
mod nodes;
mod parser;
mod syntax_kind;

pub mod ast;
pub mod make;
pub mod printer;
pub mod trivia;

pub use builder::CstBuilder;
pub use language::DrlLanguage;
pub use lexer::{CstLexResult, CstSpan, CstToken, Lexer, LexerError, lex_with_trivia};
pub use nodes::*;
pub use parser::{ParseError, ParseErrorKind, parse_drl};
pub use syntax_kind::DrlSyntaxKind;

pub(crate) use parser::{Fragment, parse_fragment, parse_green};

#[cfg(test)]
mod ast_tests;
