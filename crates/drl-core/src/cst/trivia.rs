//! Trivia ownership
//!
//! Whitespace, newlines and comments are ordinary tokens in the tree. Which
//! node they "belong" to follows two rules:
//!
//! - top-level declarations contain their trivia: the blank lines and
//!   comments before them are their first tokens and everything up to the
//!   first newline after them is their last
//! - inner nodes have no trivia at their edges; their trailing trivia is the
//!   sibling trivia after them up to and including the first newline, their
//!   leading trivia is the sibling trivia before them that is not the previous
//!   sibling's trailing trivia
//!
//! ```rust
//! use drl_core::cst::{DrlSyntaxKind, parse_drl, trivia};
//!
//! let (cst, _, _) = parse_drl("// header\nrule R when then end // done\n");
//! let rule = cst.first_child().unwrap();
//! let leading: String = trivia::leading_trivia(&rule).iter().map(|t| t.text().to_string()).collect();
//! let trailing: String = trivia::trailing_trivia(&rule).iter().map(|t| t.text().to_string()).collect();
//! assert_eq!(leading, "// header\n");
//! assert_eq!(trailing, " // done\n");
//! ```

use super::{DrlSyntaxElement, DrlSyntaxKind, DrlSyntaxNode, DrlSyntaxToken};

fn as_trivia(element: DrlSyntaxElement) -> Option<DrlSyntaxToken> {
    element.into_token().filter(|t| t.kind().is_trivia())
}

/// Trivia that belongs in front of `node`, in source order
pub fn leading_trivia(node: &DrlSyntaxNode) -> Vec<DrlSyntaxToken> {
    if node.kind().is_top_level_decl() {
        return node
            .children_with_tokens()
            .map_while(as_trivia)
            .collect();
    }

    let mut run = Vec::new();
    let mut cursor = node.prev_sibling_or_token();
    let mut after_significant = false;
    while let Some(element) = cursor {
        match as_trivia(element.clone()) {
            Some(token) => {
                run.push(token);
                cursor = element.prev_sibling_or_token();
            }
            None => {
                after_significant = true;
                break;
            }
        }
    }
    run.reverse();

    if after_significant {
        // The first newline and the trivia before it trail the previous sibling
        match run.iter().position(|t| t.kind() == DrlSyntaxKind::Newline) {
            Some(newline) => {
                run.drain(..=newline);
            }
            None => run.clear(),
        }
    }
    run
}

/// Trivia that belongs after `node`, in source order
pub fn trailing_trivia(node: &DrlSyntaxNode) -> Vec<DrlSyntaxToken> {
    if node.kind().is_top_level_decl() {
        let mut trailing: Vec<_> = node
            .children_with_tokens()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .map_while(as_trivia)
            .collect();
        trailing.reverse();
        // Leading trivia of an empty declaration is not trailing trivia
        if trailing.len() == node.children_with_tokens().count() {
            return Vec::new();
        }
        return trailing;
    }

    let mut trailing = Vec::new();
    let mut cursor = node.next_sibling_or_token();
    while let Some(token) = cursor.and_then(as_trivia) {
        let is_newline = token.kind() == DrlSyntaxKind::Newline;
        cursor = token.next_sibling_or_token();
        trailing.push(token);
        if is_newline {
            break;
        }
    }
    trailing
}

/// Comment tokens anywhere inside `node`
pub fn comments(node: &DrlSyntaxNode) -> Vec<DrlSyntaxToken> {
    node.descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| {
            matches!(
                t.kind(),
                DrlSyntaxKind::CommentLine | DrlSyntaxKind::CommentBlock
            )
        })
        .collect()
}
