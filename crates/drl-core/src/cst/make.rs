//! Constructors for replacement subtrees
//!
//! Fragment constructors parse a piece of DRL on its own and return the green
//! node it produced, ready to be used as a [`crate::rewrite::Replacement`].
//! They fail with [`DrlError::InvalidReplacement`] when the text does not
//! parse as exactly one fragment of the requested kind.
//!
//! ```rust
//! use drl_core::cst::{DrlSyntaxKind, make};
//!
//! let pattern = make::pattern("$p : Person( age > 18 )").unwrap();
//! assert_eq!(pattern.to_string(), "$p : Person( age > 18 )");
//! assert!(make::pattern("Person( age > )").is_err());
//!
//! let keyword = make::token(DrlSyntaxKind::AndKw, "and");
//! assert_eq!(keyword.text(), "and");
//! ```

use rowan::{GreenNode, GreenToken, NodeOrToken};

use super::{DrlSyntaxKind, Fragment, parse_fragment};
use crate::error::DrlError;
use crate::Result;

fn fragment(source: &str, fragment: Fragment) -> Result<GreenNode> {
    parse_fragment(source, fragment).map_err(|reason| DrlError::InvalidReplacement {
        fragment: format!("{fragment:?}").to_lowercase(),
        reason,
    })
}

/// `[$var :] Type( constraints ) [from ...]`
pub fn pattern(source: &str) -> Result<GreenNode> {
    fragment(source, Fragment::Pattern)
}

/// `[$var :] expression`
pub fn constraint(source: &str) -> Result<GreenNode> {
    fragment(source, Fragment::Constraint)
}

/// Any constraint expression; the node kind depends on the text
pub fn expression(source: &str) -> Result<GreenNode> {
    fragment(source, Fragment::Expression)
}

/// A rule attribute such as `salience 10`
pub fn attribute(source: &str) -> Result<GreenNode> {
    fragment(source, Fragment::Attribute)
}

/// A complete `rule ... end` declaration
pub fn rule(source: &str) -> Result<GreenNode> {
    fragment(source, Fragment::Rule)
}

/// A single token; the text is not checked against the kind
pub fn token(kind: DrlSyntaxKind, text: &str) -> GreenToken {
    GreenToken::new(kind.into(), text)
}

/// A node of `kind` holding one token of `token_kind`
pub fn token_node(kind: DrlSyntaxKind, token_kind: DrlSyntaxKind, text: &str) -> GreenNode {
    GreenNode::new(
        kind.into(),
        [NodeOrToken::Token(token(token_kind, text))],
    )
}

/// A node of `kind` holding `text` verbatim, unparsed
pub fn verbatim_node(kind: DrlSyntaxKind, text: &str) -> GreenNode {
    token_node(kind, DrlSyntaxKind::Verbatim, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::DrlSyntaxNode;

    fn kind_of(node: &GreenNode) -> Option<DrlSyntaxKind> {
        DrlSyntaxKind::from_raw(node.kind().0)
    }

    #[test]
    fn test_fragments_have_expected_kinds() {
        assert_eq!(
            kind_of(&pattern("Person( name == \"Mark\" )").unwrap()),
            Some(DrlSyntaxKind::Pattern)
        );
        assert_eq!(
            kind_of(&constraint("$n : name").unwrap()),
            Some(DrlSyntaxKind::Constraint)
        );
        assert_eq!(
            kind_of(&attribute("ruleflow-group \"g\"").unwrap()),
            Some(DrlSyntaxKind::Attribute)
        );
        assert_eq!(
            kind_of(&expression("age > 18").unwrap()),
            Some(DrlSyntaxKind::RelationalExpr)
        );
        assert_eq!(
            kind_of(&rule("rule X when then end").unwrap()),
            Some(DrlSyntaxKind::RuleDecl)
        );
    }

    #[test]
    fn test_fragment_text_is_preserved() {
        let source = "$p : Person(  age>18 ) from $people";
        let node = DrlSyntaxNode::new_root(pattern(source).unwrap());
        assert_eq!(node.text().to_string(), source);
    }

    #[test]
    fn test_invalid_fragments() {
        let err = pattern("Person(").unwrap_err();
        assert!(matches!(err, DrlError::InvalidReplacement { .. }));
        assert!(constraint("age >").is_err());
        assert!(attribute("salience 10 extra").is_err());
        assert!(rule("rule X when").is_err());
        assert!(expression("a +").is_err());
    }

    #[test]
    fn test_token_node() {
        let node = DrlSyntaxNode::new_root(verbatim_node(DrlSyntaxKind::Pattern, "Foo()"));
        assert_eq!(node.kind(), DrlSyntaxKind::Pattern);
        let token = node.first_token().unwrap();
        assert_eq!(token.kind(), DrlSyntaxKind::Verbatim);
        assert_eq!(token.text(), "Foo()");
    }
}
