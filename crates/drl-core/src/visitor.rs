//! Traversal of syntax trees with enter/leave hooks
//!
//! A [`Visitor`] is driven depth-first in source order by [`walk`]. Hooks do
//! not mutate the tree; they register edits through the [`VisitContext`],
//! which [`walk`] hands back in a [`WalkOutcome`] for the rewrite engine.
//!
//! [`VisitorRegistry`] dispatches closures by node kind, for passes that
//! only care about a handful of kinds.
//!
//! ```rust
//! use drl_core::cst::DrlSyntaxKind;
//! use drl_core::visitor::{VisitAction, VisitorRegistry, walk};
//!
//! let tree = drl_core::parse("rule R when A() B() then end", "doc.drl").unwrap().tree;
//! let mut patterns = 0;
//! let mut registry = VisitorRegistry::new();
//! registry.on_enter(DrlSyntaxKind::Pattern, |_, _| {
//!     patterns += 1;
//!     VisitAction::Continue
//! });
//! walk(&tree, &mut registry);
//! drop(registry);
//! assert_eq!(patterns, 2);
//! ```

use std::collections::HashMap;

use rayon::prelude::*;
use rowan::{NodeOrToken, WalkEvent};
use tracing::trace;

use crate::cst::{DrlSyntaxElement, DrlSyntaxKind, DrlSyntaxNode, DrlSyntaxToken};
use crate::rewrite::{Edit, Replacement};
use crate::tree::{NodeHandle, NodeIndex, SyntaxTree};

/// What the walker does after a hook returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum VisitAction {
    /// Descend into the children
    #[default]
    Continue,
    /// Do not visit the children; `leave` is still called for the node
    SkipChildren,
    /// End the traversal
    Stop,
}

impl VisitAction {
    /// The stronger of two actions (`Stop` > `SkipChildren` > `Continue`)
    pub fn merge(self, other: VisitAction) -> VisitAction {
        self.max(other)
    }
}

/// State shared with the hooks of one walk
pub struct VisitContext<'t> {
    tree: &'t SyntaxTree,
    index: &'t NodeIndex,
    edits: Vec<Edit>,
}

impl<'t> VisitContext<'t> {
    pub fn new(tree: &'t SyntaxTree, index: &'t NodeIndex) -> Self {
        Self {
            tree,
            index,
            edits: Vec::new(),
        }
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn source_id(&self) -> &'t str {
        self.tree.source_id()
    }

    pub fn index(&self) -> &'t NodeIndex {
        self.index
    }

    pub fn handle_of(&self, element: impl Into<DrlSyntaxElement>) -> Option<NodeHandle> {
        self.index.handle_of(element)
    }

    /// Register a replacement of a node or token
    ///
    /// Returns the handle of the target, or `None` (and registers nothing)
    /// when the element does not belong to the walked tree.
    pub fn replace(
        &mut self,
        element: impl Into<DrlSyntaxElement>,
        replacement: impl Into<Replacement>,
    ) -> Option<NodeHandle> {
        let handle = self.index.handle_of(element)?;
        self.edits.push(Edit::replace(handle, replacement));
        Some(handle)
    }

    /// Register the removal of a node or token
    pub fn delete(&mut self, element: impl Into<DrlSyntaxElement>) -> Option<NodeHandle> {
        let handle = self.index.handle_of(element)?;
        self.edits.push(Edit::delete(handle));
        Some(handle)
    }

    /// Register an already built edit
    pub fn push_edit(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// Edits registered so far
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn into_edits(self) -> Vec<Edit> {
        self.edits
    }
}

/// A read-only pass over a syntax tree
pub trait Visitor {
    /// Called before the children of `node`
    fn enter(&mut self, _node: &DrlSyntaxNode, _ctx: &mut VisitContext<'_>) -> VisitAction {
        VisitAction::Continue
    }

    /// Called after the children of `node`
    fn leave(&mut self, _node: &DrlSyntaxNode, _ctx: &mut VisitContext<'_>) {}

    /// Called for every token (trivia included) in source order
    ///
    /// Only `Stop` has an effect; tokens have no children to skip.
    fn visit_token(&mut self, _token: &DrlSyntaxToken, _ctx: &mut VisitContext<'_>) -> VisitAction {
        VisitAction::Continue
    }
}

impl<V: Visitor + ?Sized> Visitor for &mut V {
    fn enter(&mut self, node: &DrlSyntaxNode, ctx: &mut VisitContext<'_>) -> VisitAction {
        (**self).enter(node, ctx)
    }

    fn leave(&mut self, node: &DrlSyntaxNode, ctx: &mut VisitContext<'_>) {
        (**self).leave(node, ctx)
    }

    fn visit_token(&mut self, token: &DrlSyntaxToken, ctx: &mut VisitContext<'_>) -> VisitAction {
        (**self).visit_token(token, ctx)
    }
}

impl<V: Visitor + ?Sized> Visitor for Box<V> {
    fn enter(&mut self, node: &DrlSyntaxNode, ctx: &mut VisitContext<'_>) -> VisitAction {
        (**self).enter(node, ctx)
    }

    fn leave(&mut self, node: &DrlSyntaxNode, ctx: &mut VisitContext<'_>) {
        (**self).leave(node, ctx)
    }

    fn visit_token(&mut self, token: &DrlSyntaxToken, ctx: &mut VisitContext<'_>) -> VisitAction {
        (**self).visit_token(token, ctx)
    }
}

type EnterHook<'a> = Box<dyn FnMut(&DrlSyntaxNode, &mut VisitContext<'_>) -> VisitAction + 'a>;
type LeaveHook<'a> = Box<dyn FnMut(&DrlSyntaxNode, &mut VisitContext<'_>) + 'a>;
type TokenHook<'a> = Box<dyn FnMut(&DrlSyntaxToken, &mut VisitContext<'_>) -> VisitAction + 'a>;

/// Dispatch table from syntax kinds to hooks
///
/// Several hooks may be registered for one kind; they run in registration
/// order and the strongest returned action wins.
#[derive(Default)]
pub struct VisitorRegistry<'a> {
    enter: HashMap<DrlSyntaxKind, Vec<EnterHook<'a>>>,
    leave: HashMap<DrlSyntaxKind, Vec<LeaveHook<'a>>>,
    token: HashMap<DrlSyntaxKind, Vec<TokenHook<'a>>>,
}

impl<'a> VisitorRegistry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_enter<F>(&mut self, kind: DrlSyntaxKind, hook: F) -> &mut Self
    where
        F: FnMut(&DrlSyntaxNode, &mut VisitContext<'_>) -> VisitAction + 'a,
    {
        self.enter.entry(kind).or_default().push(Box::new(hook));
        self
    }

    pub fn on_leave<F>(&mut self, kind: DrlSyntaxKind, hook: F) -> &mut Self
    where
        F: FnMut(&DrlSyntaxNode, &mut VisitContext<'_>) + 'a,
    {
        self.leave.entry(kind).or_default().push(Box::new(hook));
        self
    }

    pub fn on_token<F>(&mut self, kind: DrlSyntaxKind, hook: F) -> &mut Self
    where
        F: FnMut(&DrlSyntaxToken, &mut VisitContext<'_>) -> VisitAction + 'a,
    {
        self.token.entry(kind).or_default().push(Box::new(hook));
        self
    }

    /// Whether no hook is registered
    pub fn is_empty(&self) -> bool {
        self.enter.is_empty() && self.leave.is_empty() && self.token.is_empty()
    }
}

impl Visitor for VisitorRegistry<'_> {
    fn enter(&mut self, node: &DrlSyntaxNode, ctx: &mut VisitContext<'_>) -> VisitAction {
        let mut action = VisitAction::Continue;
        if let Some(hooks) = self.enter.get_mut(&node.kind()) {
            for hook in hooks {
                action = action.merge(hook(node, ctx));
            }
        }
        action
    }

    fn leave(&mut self, node: &DrlSyntaxNode, ctx: &mut VisitContext<'_>) {
        if let Some(hooks) = self.leave.get_mut(&node.kind()) {
            for hook in hooks {
                hook(node, ctx);
            }
        }
    }

    fn visit_token(&mut self, token: &DrlSyntaxToken, ctx: &mut VisitContext<'_>) -> VisitAction {
        let mut action = VisitAction::Continue;
        if let Some(hooks) = self.token.get_mut(&token.kind()) {
            for hook in hooks {
                action = action.merge(hook(token, ctx));
            }
        }
        action
    }
}

/// Result of one walk
#[derive(Debug, Clone, Default)]
pub struct WalkOutcome {
    /// Edits registered by the hooks, in registration order
    pub edits: Vec<Edit>,
    /// Whether a hook returned `Stop`
    pub stopped: bool,
}

/// Walk `tree` depth-first in source order
pub fn walk<V: Visitor + ?Sized>(tree: &SyntaxTree, visitor: &mut V) -> WalkOutcome {
    let index = tree.index();
    walk_with_index(tree, &index, visitor)
}

/// Like [`walk`], reusing an index built for `tree`
pub fn walk_with_index<V: Visitor + ?Sized>(
    tree: &SyntaxTree,
    index: &NodeIndex,
    visitor: &mut V,
) -> WalkOutcome {
    let mut ctx = VisitContext::new(tree, index);
    let Some(root) = index.root() else {
        return WalkOutcome::default();
    };

    let mut stopped = false;
    let mut events = root.preorder_with_tokens();
    while let Some(event) = events.next() {
        match event {
            WalkEvent::Enter(NodeOrToken::Node(node)) => match visitor.enter(&node, &mut ctx) {
                VisitAction::Continue => {}
                VisitAction::SkipChildren => events.skip_subtree(),
                VisitAction::Stop => {
                    stopped = true;
                    break;
                }
            },
            WalkEvent::Enter(NodeOrToken::Token(token)) => {
                if visitor.visit_token(&token, &mut ctx) == VisitAction::Stop {
                    stopped = true;
                    break;
                }
            }
            WalkEvent::Leave(NodeOrToken::Node(node)) => visitor.leave(&node, &mut ctx),
            WalkEvent::Leave(NodeOrToken::Token(_)) => {}
        }
    }

    let edits = ctx.into_edits();
    trace!(
        source_id = tree.source_id(),
        edits = edits.len(),
        stopped,
        "walk finished"
    );
    WalkOutcome { edits, stopped }
}

/// Run independent passes over the same tree in parallel
///
/// Every pass gets its own red tree. Outcomes are returned in the order of
/// `visitors`.
pub fn walk_parallel<V>(tree: &SyntaxTree, visitors: &mut [V]) -> Vec<WalkOutcome>
where
    V: Visitor + Send,
{
    visitors
        .par_iter_mut()
        .map(|visitor| walk(tree, visitor))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_drl;
    use crate::rewrite::RewriteEngine;

    fn tree(source: &str) -> SyntaxTree {
        let (root, _, _) = parse_drl(source);
        SyntaxTree::new(root.green().into_owned(), "visit.drl")
    }

    /// Records enter/leave events of the interesting kinds
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        skip: Option<DrlSyntaxKind>,
        stop_at: Option<DrlSyntaxKind>,
    }

    impl Recorder {
        fn interesting(kind: DrlSyntaxKind) -> bool {
            matches!(
                kind,
                DrlSyntaxKind::RuleDecl
                    | DrlSyntaxKind::WhenClause
                    | DrlSyntaxKind::Pattern
                    | DrlSyntaxKind::Constraint
                    | DrlSyntaxKind::ThenClause
            )
        }
    }

    impl Visitor for Recorder {
        fn enter(&mut self, node: &DrlSyntaxNode, _ctx: &mut VisitContext<'_>) -> VisitAction {
            if Self::interesting(node.kind()) {
                self.events.push(format!("enter {:?}", node.kind()));
            }
            if Some(node.kind()) == self.stop_at {
                VisitAction::Stop
            } else if Some(node.kind()) == self.skip {
                VisitAction::SkipChildren
            } else {
                VisitAction::Continue
            }
        }

        fn leave(&mut self, node: &DrlSyntaxNode, _ctx: &mut VisitContext<'_>) {
            if Self::interesting(node.kind()) {
                self.events.push(format!("leave {:?}", node.kind()));
            }
        }
    }

    const RULE: &str = "rule R when Person( age > 18 ) then end";

    #[test]
    fn test_enter_and_leave_are_balanced_in_source_order() {
        let tree = tree(RULE);
        let mut recorder = Recorder::default();
        let outcome = walk(&tree, &mut recorder);
        assert!(!outcome.stopped);
        assert!(outcome.edits.is_empty());
        assert_eq!(
            recorder.events,
            vec![
                "enter RuleDecl",
                "enter WhenClause",
                "enter Pattern",
                "enter Constraint",
                "leave Constraint",
                "leave Pattern",
                "leave WhenClause",
                "enter ThenClause",
                "leave ThenClause",
                "leave RuleDecl",
            ]
        );
    }

    #[test]
    fn test_skip_children_still_leaves() {
        let tree = tree(RULE);
        let mut recorder = Recorder {
            skip: Some(DrlSyntaxKind::Pattern),
            ..Recorder::default()
        };
        walk(&tree, &mut recorder);
        assert!(!recorder.events.iter().any(|e| e.contains("Constraint")));
        assert!(recorder.events.contains(&"leave Pattern".to_string()));
        assert!(recorder.events.contains(&"enter ThenClause".to_string()));
    }

    #[test]
    fn test_stop_ends_the_walk() {
        let tree = tree(RULE);
        let mut recorder = Recorder {
            stop_at: Some(DrlSyntaxKind::Pattern),
            ..Recorder::default()
        };
        let outcome = walk(&tree, &mut recorder);
        assert!(outcome.stopped);
        assert_eq!(
            recorder.events.last().map(String::as_str),
            Some("enter Pattern")
        );
        assert!(!recorder.events.iter().any(|e| e.starts_with("leave")));
    }

    #[test]
    fn test_tokens_are_visited_in_order() {
        let source = "rule R when then end";
        let tree = tree(source);
        let mut text = String::new();
        let mut registry = VisitorRegistry::new();
        registry.on_token(DrlSyntaxKind::Whitespace, |token, _| {
            text.push_str(token.text());
            VisitAction::Continue
        });
        walk(&tree, &mut registry);
        drop(registry);
        assert_eq!(text, "    ");
    }

    #[test]
    fn test_registry_collects_edits_for_the_engine() {
        let tree = tree("rule R when A() && B() then end");
        let mut registry = VisitorRegistry::new();
        registry.on_token(DrlSyntaxKind::AmpAmp, |token, ctx| {
            ctx.replace(token.clone(), "and");
            VisitAction::Continue
        });
        let outcome = walk(&tree, &mut registry);
        assert_eq!(outcome.edits.len(), 1);

        let output = RewriteEngine::new().apply(&tree, outcome.edits).unwrap();
        assert_eq!(output.text, "rule R when A() and B() then end");
    }

    #[test]
    fn test_strongest_action_wins() {
        let tree = tree(RULE);
        let mut constraints = 0;
        let mut registry = VisitorRegistry::new();
        registry
            .on_enter(DrlSyntaxKind::Pattern, |_, _| VisitAction::Continue)
            .on_enter(DrlSyntaxKind::Pattern, |_, _| VisitAction::SkipChildren)
            .on_enter(DrlSyntaxKind::Constraint, |_, _| {
                constraints += 1;
                VisitAction::Continue
            });
        walk(&tree, &mut registry);
        drop(registry);
        assert_eq!(constraints, 0);
    }

    #[test]
    fn test_foreign_elements_are_not_registered() {
        let a = tree(RULE);
        let b = tree(RULE);
        let foreign = b.root();
        let mut registry = VisitorRegistry::new();
        registry.on_enter(DrlSyntaxKind::RuleDecl, |_, ctx| {
            assert!(ctx.delete(foreign.clone()).is_none());
            VisitAction::Stop
        });
        let outcome = walk(&a, &mut registry);
        assert!(outcome.edits.is_empty());
    }

    #[test]
    fn test_context_exposes_source_id_and_handles() {
        let tree = tree(RULE);
        let mut seen = None;
        let mut registry = VisitorRegistry::new();
        registry.on_enter(DrlSyntaxKind::Pattern, |node, ctx| {
            let handle = ctx.handle_of(node.clone()).unwrap();
            assert_eq!(ctx.index().kind(handle), Some(DrlSyntaxKind::Pattern));
            seen = Some(ctx.source_id().to_string());
            VisitAction::Continue
        });
        walk(&tree, &mut registry);
        drop(registry);
        assert_eq!(seen.as_deref(), Some("visit.drl"));
    }

    /// Counts nodes of one kind
    struct Counter {
        kind: DrlSyntaxKind,
        count: usize,
    }

    impl Visitor for Counter {
        fn enter(&mut self, node: &DrlSyntaxNode, _ctx: &mut VisitContext<'_>) -> VisitAction {
            if node.kind() == self.kind {
                self.count += 1;
            }
            VisitAction::Continue
        }
    }

    #[test]
    fn test_parallel_passes_keep_their_order() {
        let tree = tree("rule A when X() Y() then end\nrule B when Z() then end\n");
        let mut visitors = vec![
            Counter {
                kind: DrlSyntaxKind::RuleDecl,
                count: 0,
            },
            Counter {
                kind: DrlSyntaxKind::Pattern,
                count: 0,
            },
        ];
        let outcomes = walk_parallel(&tree, &mut visitors);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(visitors[0].count, 2);
        assert_eq!(visitors[1].count, 3);
    }
}
