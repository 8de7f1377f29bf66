//! Batch rewriting of syntax trees
//!
//! Edits name their target with a [`NodeHandle`]. The engine validates the
//! batch, resolves overlapping edits and rebuilds the green tree bottom-up:
//! only the ancestors of edited elements get new green nodes, every other
//! subtree is shared with the input tree.
//!
//! Conflict policy:
//! - two edits on the same element: the first in batch order wins
//! - an edit inside the target of another edit: the outer edit wins
//!
//! Dropped edits are reported as `RewriteConflict` warnings.

use std::collections::{HashMap, HashSet};
use std::fmt;

use rowan::{GreenNode, GreenToken, NodeOrToken};
use tracing::{debug, trace, warn};

use crate::Result;
use crate::config::RewriteConfig;
use crate::cst::{DrlSyntaxElement, DrlSyntaxKind, DrlSyntaxNode, make};
use crate::diagnostics::{Diagnostic, DiagnosticKind, SourceMap};
use crate::error::DrlError;
use crate::tree::{NodeHandle, SyntaxTree};

/// New content for an edited element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// Unparsed text; becomes a node of the target's kind holding one
    /// `Verbatim` token, or a `Verbatim` token when the target is a token
    Text(String),
    /// A subtree, usually built with [`crate::cst::make`]
    Node(GreenNode),
    /// A single token, see [`make::token`]
    Token(GreenToken),
}

impl Replacement {
    /// Text the replacement will serialize to
    pub fn text(&self) -> String {
        match self {
            Replacement::Text(text) => text.clone(),
            Replacement::Node(node) => node.to_string(),
            Replacement::Token(token) => token.text().to_string(),
        }
    }

    /// Short form used in diagnostics
    fn summary(&self) -> String {
        const MAX: usize = 40;
        let text = self.text();
        let mut summary: String = text.chars().take(MAX).collect();
        if text.chars().count() > MAX {
            summary.push_str("...");
        }
        format!("{summary:?}")
    }

    fn render(&self, target: &DrlSyntaxElement) -> NodeOrToken<GreenNode, GreenToken> {
        match (self, target) {
            (Replacement::Text(text), NodeOrToken::Node(node)) => {
                NodeOrToken::Node(make::verbatim_node(node.kind(), text))
            }
            (Replacement::Text(text), NodeOrToken::Token(_)) => {
                NodeOrToken::Token(make::token(DrlSyntaxKind::Verbatim, text))
            }
            (Replacement::Node(node), _) => NodeOrToken::Node(node.clone()),
            (Replacement::Token(token), _) => NodeOrToken::Token(token.clone()),
        }
    }
}

impl From<String> for Replacement {
    fn from(text: String) -> Self {
        Replacement::Text(text)
    }
}

impl From<&str> for Replacement {
    fn from(text: &str) -> Self {
        Replacement::Text(text.to_string())
    }
}

impl From<GreenNode> for Replacement {
    fn from(node: GreenNode) -> Self {
        Replacement::Node(node)
    }
}

impl From<GreenToken> for Replacement {
    fn from(token: GreenToken) -> Self {
        Replacement::Token(token)
    }
}

/// What to do with the target of an edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    Replace(Replacement),
    Delete,
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditAction::Replace(replacement) => write!(f, "replace with {}", replacement.summary()),
            EditAction::Delete => write!(f, "delete"),
        }
    }
}

/// One requested change to a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub handle: NodeHandle,
    pub action: EditAction,
}

impl Edit {
    pub fn new(handle: NodeHandle, action: EditAction) -> Self {
        Self { handle, action }
    }

    pub fn replace(handle: NodeHandle, replacement: impl Into<Replacement>) -> Self {
        Self::new(handle, EditAction::Replace(replacement.into()))
    }

    pub fn delete(handle: NodeHandle) -> Self {
        Self::new(handle, EditAction::Delete)
    }
}

/// Result of one rewrite batch
#[derive(Debug, Clone)]
pub struct RewriteOutput {
    /// The rewritten tree (the input tree itself when nothing changed)
    pub tree: SyntaxTree,
    /// Serialized text of `tree`
    pub text: String,
    /// Conflict warnings, sorted by offset
    pub diagnostics: Vec<Diagnostic>,
    /// Number of edits applied
    pub applied: usize,
    /// Number of edits dropped because of conflicts
    pub dropped: usize,
}

/// Applies edit batches to syntax trees
#[derive(Debug, Clone, Default)]
pub struct RewriteEngine {
    config: RewriteConfig,
}

impl RewriteEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RewriteConfig) -> Self {
        Self { config }
    }

    /// Apply `edits` to `tree` and return the new tree and its text
    ///
    /// Fails with [`DrlError::ConcurrentRewrite`] while another batch holds
    /// the tree and with [`DrlError::StaleHandle`] if any handle does not
    /// belong to `tree`.
    pub fn apply(&self, tree: &SyntaxTree, edits: Vec<Edit>) -> Result<RewriteOutput> {
        let _guard = tree
            .try_lock()
            .ok_or(DrlError::ConcurrentRewrite { tree: tree.id() })?;

        if edits.is_empty() {
            return Ok(RewriteOutput {
                tree: tree.clone(),
                text: tree.text(),
                diagnostics: Vec::new(),
                applied: 0,
                dropped: 0,
            });
        }

        let index = tree.index();
        let mut resolved = Vec::with_capacity(edits.len());
        for edit in edits {
            let element = index.resolve(edit.handle)?.clone();
            resolved.push((element, edit));
        }

        let source = tree.text();
        let map = SourceMap::new(&source);
        let mut conflicts = Vec::new();

        // Same target twice: keep the first
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(resolved.len());
        for (element, edit) in resolved {
            if seen.insert(edit.handle) {
                unique.push((element, edit));
            } else {
                conflicts.push((element, edit, "another edit of the same element came first"));
            }
        }

        // Nested targets: keep the outermost
        let targets: HashSet<NodeHandle> = unique.iter().map(|(_, edit)| edit.handle).collect();
        let mut accepted: HashMap<DrlSyntaxElement, EditAction> = HashMap::new();
        let mut dirty: HashSet<DrlSyntaxNode> = HashSet::new();
        for (element, edit) in unique {
            let covered = ancestors(&element)
                .any(|node| index.handle_of(node).is_some_and(|h| targets.contains(&h)));
            if covered {
                conflicts.push((element, edit, "an edit of an enclosing element wins"));
                continue;
            }
            trace!(handle = %edit.handle, kind = ?element.kind(), action = %edit.action, "accepted edit");
            dirty.extend(ancestors(&element));
            accepted.insert(element, edit.action);
        }

        let mut diagnostics = Vec::new();
        for (element, edit, reason) in &conflicts {
            let range = element.text_range();
            let span = usize::from(range.start())..usize::from(range.end());
            let message = format!(
                "dropped edit ({}) of {:?} at {}..{}: {}",
                edit.action, element.kind(), span.start, span.end, reason
            );
            warn!(source_id = tree.source_id(), "{message}");
            if self.config.report_conflicts {
                diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::RewriteConflict,
                    message,
                    map.location(tree.source_id(), span, &source),
                ));
            }
        }
        diagnostics.sort_by_key(|d| d.location.span.start);

        let root = tree.root();
        let green = match accepted.get(&NodeOrToken::Node(root.clone())) {
            Some(action) => rebuild_root(action),
            None => rebuild(&root, &accepted, &dirty),
        };

        let applied = accepted.len();
        let dropped = conflicts.len();
        let rewritten = SyntaxTree::new(green, tree.shared_source_id());
        let text = rewritten.text();
        debug!(
            source_id = tree.source_id(),
            applied,
            dropped,
            from = %tree.id(),
            to = %rewritten.id(),
            "applied rewrite batch"
        );

        Ok(RewriteOutput {
            tree: rewritten,
            text,
            diagnostics,
            applied,
            dropped,
        })
    }
}

/// Strict ancestors of an element, innermost first
fn ancestors(element: &DrlSyntaxElement) -> impl Iterator<Item = DrlSyntaxNode> {
    let parent = match element {
        NodeOrToken::Node(node) => node.parent(),
        NodeOrToken::Token(token) => token.parent(),
    };
    std::iter::successors(parent, |node| node.parent())
}

fn rebuild(
    node: &DrlSyntaxNode,
    edits: &HashMap<DrlSyntaxElement, EditAction>,
    dirty: &HashSet<DrlSyntaxNode>,
) -> GreenNode {
    if !dirty.contains(node) {
        return node.green().into_owned();
    }

    let mut children = Vec::new();
    for child in node.children_with_tokens() {
        match edits.get(&child) {
            Some(EditAction::Delete) => {}
            Some(EditAction::Replace(replacement)) => children.push(replacement.render(&child)),
            None => match child {
                NodeOrToken::Node(child) => children.push(NodeOrToken::Node(rebuild(&child, edits, dirty))),
                NodeOrToken::Token(token) => children.push(NodeOrToken::Token(token.green().to_owned())),
            },
        }
    }
    GreenNode::new(node.kind().into(), children)
}

/// The root stays a `CompilationUnit`
fn rebuild_root(action: &EditAction) -> GreenNode {
    let unit = DrlSyntaxKind::CompilationUnit;
    match action {
        EditAction::Delete => GreenNode::new(unit.into(), std::iter::empty()),
        EditAction::Replace(Replacement::Text(text)) => make::verbatim_node(unit, text),
        EditAction::Replace(Replacement::Node(node))
            if DrlSyntaxKind::from_raw(node.kind().0) == Some(unit) =>
        {
            node.clone()
        }
        EditAction::Replace(Replacement::Node(node)) => {
            GreenNode::new(unit.into(), [NodeOrToken::Node(node.clone())])
        }
        EditAction::Replace(Replacement::Token(token)) => {
            GreenNode::new(unit.into(), [NodeOrToken::Token(token.clone())])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_drl;

    fn tree(source: &str) -> SyntaxTree {
        let (root, _, _) = parse_drl(source);
        SyntaxTree::new(root.green().into_owned(), "test.drl")
    }

    fn nth_of_kind(tree: &SyntaxTree, kind: DrlSyntaxKind, nth: usize) -> NodeHandle {
        let node = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == kind)
            .nth(nth)
            .unwrap();
        tree.index().handle_of(node).unwrap()
    }

    #[test]
    fn test_zero_edits_is_identity() {
        let source = "rule R when\n  Person()   // x\nthen\nend\n";
        let tree = tree(source);
        let output = RewriteEngine::new().apply(&tree, Vec::new()).unwrap();
        assert_eq!(output.text, source);
        assert_eq!(output.applied, 0);
    }

    #[test]
    fn test_replace_with_fragment() {
        let tree = tree("rule R when\n    Person( age > 18 )\nthen\nend\n");
        let handle = nth_of_kind(&tree, DrlSyntaxKind::Pattern, 0);
        let replacement = make::pattern("Person( age >= 21 )").unwrap();
        let output = RewriteEngine::new()
            .apply(&tree, vec![Edit::replace(handle, replacement)])
            .unwrap();
        assert_eq!(output.text, "rule R when\n    Person( age >= 21 )\nthen\nend\n");
        assert_eq!(output.applied, 1);
        let reparsed = output.tree.root();
        assert!(
            reparsed
                .descendants()
                .any(|n| n.kind() == DrlSyntaxKind::RelationalExpr)
        );
    }

    #[test]
    fn test_replace_token() {
        let tree = tree("rule R when A() && B() then end");
        let token = tree
            .root()
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == DrlSyntaxKind::AmpAmp)
            .unwrap();
        let handle = tree.index().handle_of(token).unwrap();
        let output = RewriteEngine::new()
            .apply(
                &tree,
                vec![Edit::replace(handle, make::token(DrlSyntaxKind::AndKw, "and"))],
            )
            .unwrap();
        assert_eq!(output.text, "rule R when A() and B() then end");
    }

    #[test]
    fn test_outer_edit_wins() {
        let tree = tree("rule R when Person() then end");
        let pattern = nth_of_kind(&tree, DrlSyntaxKind::Pattern, 0);
        let rule = nth_of_kind(&tree, DrlSyntaxKind::RuleDecl, 0);
        let output = RewriteEngine::new()
            .apply(
                &tree,
                vec![
                    Edit::replace(pattern, "Pet()"),
                    Edit::replace(rule, "rule X when then end"),
                ],
            )
            .unwrap();
        assert_eq!(output.text, "rule X when then end");
        assert_eq!((output.applied, output.dropped), (1, 1));
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::RewriteConflict);
        assert!(output.diagnostics[0].message.contains("Pattern"));
    }

    #[test]
    fn test_first_edit_of_same_node_wins() {
        let tree = tree("rule R when Person() then end");
        let pattern = nth_of_kind(&tree, DrlSyntaxKind::Pattern, 0);
        let output = RewriteEngine::new()
            .apply(
                &tree,
                vec![Edit::replace(pattern, "A()"), Edit::replace(pattern, "B()")],
            )
            .unwrap();
        assert_eq!(output.text, "rule R when A() then end");
        assert_eq!(output.dropped, 1);
    }

    #[test]
    fn test_conflicts_can_be_silenced() {
        let tree = tree("rule R when Person() then end");
        let pattern = nth_of_kind(&tree, DrlSyntaxKind::Pattern, 0);
        let engine = RewriteEngine::with_config(RewriteConfig {
            report_conflicts: false,
        });
        let output = engine
            .apply(&tree, vec![Edit::delete(pattern), Edit::delete(pattern)])
            .unwrap();
        assert_eq!(output.dropped, 1);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_root_replacement_stays_a_compilation_unit() {
        let tree = tree("rule R when then end");
        let root = tree.index().handle_of(tree.root()).unwrap();
        let output = RewriteEngine::new()
            .apply(&tree, vec![Edit::replace(root, "// nothing left\n")])
            .unwrap();
        assert_eq!(output.text, "// nothing left\n");
        assert_eq!(output.tree.root().kind(), DrlSyntaxKind::CompilationUnit);

        let deleted = RewriteEngine::new()
            .apply(&tree, vec![Edit::delete(root)])
            .unwrap();
        assert_eq!(deleted.text, "");
        assert_eq!(deleted.tree.root().kind(), DrlSyntaxKind::CompilationUnit);
    }

    #[test]
    fn test_stale_handle_fails_the_batch() {
        let a = tree("rule A when then end");
        let b = tree("rule A when then end");
        let foreign = nth_of_kind(&b, DrlSyntaxKind::RuleDecl, 0);
        let own = nth_of_kind(&a, DrlSyntaxKind::RuleDecl, 0);
        let err = RewriteEngine::new()
            .apply(&a, vec![Edit::delete(own), Edit::delete(foreign)])
            .unwrap_err();
        assert!(matches!(err, DrlError::StaleHandle { .. }));
        // the latch was released
        assert!(RewriteEngine::new().apply(&a, Vec::new()).is_ok());
    }

    #[test]
    fn test_concurrent_rewrite_fails_fast() {
        let tree = tree("rule A when then end");
        let _held = tree.try_lock().unwrap();
        let err = RewriteEngine::new().apply(&tree.clone(), Vec::new()).unwrap_err();
        assert!(matches!(err, DrlError::ConcurrentRewrite { .. }));
    }
}
