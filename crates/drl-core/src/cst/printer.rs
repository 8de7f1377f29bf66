//! Indented debug dump of a CST, used by `drl-rewrite tree`
//!
//! ```text
//! RuleDecl@0..20
//!   RuleKw@0..4 "rule"
//!   Whitespace@4..5 " "
//!   RuleName@5..6
//!     Ident@5..6 "R"
//! ```

use std::fmt::Write;

use rowan::{NodeOrToken, WalkEvent};

use super::DrlSyntaxNode;

/// Options for [`debug_tree`]
#[derive(Debug, Clone, Copy)]
pub struct TreePrinterOptions {
    /// Print whitespace, newline and comment tokens
    pub include_trivia: bool,
    /// Spaces per nesting level
    pub indent: usize,
}

impl Default for TreePrinterOptions {
    fn default() -> Self {
        Self {
            include_trivia: true,
            indent: 2,
        }
    }
}

/// Render `node` and everything below it, one element per line
pub fn debug_tree(node: &DrlSyntaxNode, options: TreePrinterOptions) -> String {
    let mut out = String::new();
    let mut depth = 0usize;

    for event in node.preorder_with_tokens() {
        match event {
            WalkEvent::Enter(element) => {
                let pad = " ".repeat(depth * options.indent);
                match element {
                    NodeOrToken::Node(node) => {
                        // Writing to a String cannot fail
                        let _ = writeln!(out, "{pad}{:?}@{:?}", node.kind(), node.text_range());
                        depth += 1;
                    }
                    NodeOrToken::Token(token) => {
                        if options.include_trivia || !token.kind().is_trivia() {
                            let _ = writeln!(
                                out,
                                "{pad}{:?}@{:?} {:?}",
                                token.kind(),
                                token.text_range(),
                                token.text()
                            );
                        }
                    }
                }
            }
            WalkEvent::Leave(NodeOrToken::Node(_)) => depth = depth.saturating_sub(1),
            WalkEvent::Leave(NodeOrToken::Token(_)) => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_drl;

    #[test]
    fn test_debug_tree_layout() {
        let (cst, _, _) = parse_drl("rule R when then end");
        let dump = debug_tree(&cst, TreePrinterOptions::default());
        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines[0], "CompilationUnit@0..20");
        assert_eq!(lines[1], "  RuleDecl@0..20");
        assert_eq!(lines[2], "    RuleKw@0..4 \"rule\"");
        assert_eq!(lines[3], "    Whitespace@4..5 \" \"");
        assert_eq!(lines[4], "    RuleName@5..6");
        assert_eq!(lines[5], "      Ident@5..6 \"R\"");
    }

    #[test]
    fn test_debug_tree_without_trivia() {
        let (cst, _, _) = parse_drl("rule R when then end");
        let options = TreePrinterOptions {
            include_trivia: false,
            ..Default::default()
        };
        let dump = debug_tree(&cst, options);
        assert!(!dump.contains("Whitespace"));
        assert!(dump.contains("EndKw@17..20 \"end\""));
    }
}
