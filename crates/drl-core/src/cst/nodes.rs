//! Type aliases for DRL CST nodes
//!
//! These types are built on top of Rowan's generic tree types, parameterized with
//! `DrlLanguage`. Red nodes are `!Send`; share a [`crate::tree::SyntaxTree`]
//! (which holds the green tree) across threads instead.

use super::DrlLanguage;

/// A node in the DRL concrete syntax tree
///
/// # Example
///
/// ```rust
/// use drl_core::cst::{DrlSyntaxKind, parse_drl};
///
/// let (root, _, _) = parse_drl("rule R when then end");
/// let rule = root.first_child().unwrap();
/// assert_eq!(rule.kind(), DrlSyntaxKind::RuleDecl);
/// assert_eq!(rule.text().to_string(), "rule R when then end");
/// ```
pub type DrlSyntaxNode = rowan::SyntaxNode<DrlLanguage>;

/// A token (leaf) in the DRL concrete syntax tree
pub type DrlSyntaxToken = rowan::SyntaxToken<DrlLanguage>;

/// Either a node or a token
pub type DrlSyntaxElement = rowan::SyntaxElement<DrlLanguage>;

/// Iterator over the children of a node
pub type DrlSyntaxNodeChildren = rowan::SyntaxNodeChildren<DrlLanguage>;

/// Iterator over the child nodes and tokens of a node
pub type DrlSyntaxElementChildren = rowan::SyntaxElementChildren<DrlLanguage>;
