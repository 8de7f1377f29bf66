//! Parsed trees, node handles and the per-tree write latch
//!
//! A [`SyntaxTree`] owns an immutable green tree and can be shared across
//! threads. Red nodes (`DrlSyntaxNode`) are built per thread from it.
//!
//! Nodes and tokens are addressed across API boundaries with a
//! [`NodeHandle`]: the id of the tree plus the preorder index of the
//! element. A [`NodeIndex`] maps between handles and red elements.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rowan::{GreenNode, NodeOrToken, WalkEvent};

use crate::Result;
use crate::cst::{DrlSyntaxElement, DrlSyntaxKind, DrlSyntaxNode};
use crate::error::DrlError;
use crate::rewrite::{Edit, EditAction, RewriteEngine};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one parsed (or rewritten) tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(u64);

impl TreeId {
    fn next() -> Self {
        Self(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Address of a node or token inside one specific tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle {
    tree: TreeId,
    index: u32,
}

impl NodeHandle {
    pub fn tree(&self) -> TreeId {
        self.tree
    }

    /// Preorder position of the element; the root is 0
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tree, self.index)
    }
}

/// An immutable, thread-safe DRL syntax tree
///
/// Cloning is cheap and keeps the identity: clones share the tree id and the
/// write latch. Every rewrite produces a new tree with a new id.
#[derive(Clone)]
pub struct SyntaxTree {
    green: GreenNode,
    id: TreeId,
    source_id: Arc<str>,
    latch: Arc<AtomicBool>,
}

impl SyntaxTree {
    pub fn new(green: GreenNode, source_id: impl Into<Arc<str>>) -> Self {
        Self {
            green,
            id: TreeId::next(),
            source_id: source_id.into(),
            latch: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub(crate) fn shared_source_id(&self) -> Arc<str> {
        Arc::clone(&self.source_id)
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// Red root for navigation on the current thread
    pub fn root(&self) -> DrlSyntaxNode {
        DrlSyntaxNode::new_root(self.green.clone())
    }

    /// Re-serialize the tree: every token text in order
    pub fn text(&self) -> String {
        self.green.to_string()
    }

    pub fn text_len(&self) -> usize {
        u32::from(self.green.text_len()) as usize
    }

    /// Preorder index of all nodes and tokens
    pub fn index(&self) -> NodeIndex {
        NodeIndex::build(self)
    }

    /// Apply one edit and return the new tree
    ///
    /// This tree is left untouched; untouched subtrees are shared with the
    /// result.
    pub fn replace(&self, handle: NodeHandle, action: EditAction) -> Result<SyntaxTree> {
        let output = RewriteEngine::new().apply(self, vec![Edit::new(handle, action)])?;
        Ok(output.tree)
    }

    /// Take the write latch; `None` while another rewrite holds it
    pub(crate) fn try_lock(&self) -> Option<WriteGuard> {
        self.latch
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| WriteGuard {
                latch: Arc::clone(&self.latch),
            })
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("id", &self.id)
            .field("source_id", &self.source_id)
            .field("len", &self.text_len())
            .finish()
    }
}

/// Held while a rewrite batch runs; releases the latch on drop
pub(crate) struct WriteGuard {
    latch: Arc<AtomicBool>,
}

impl Drop for WriteGuard {
    fn drop(&mut self) {
        self.latch.store(false, Ordering::Release);
    }
}

/// Transient preorder index of one tree
///
/// Maps handles to red elements and back. Built from a red root, so it is
/// tied to the thread that built it.
pub struct NodeIndex {
    tree: TreeId,
    elements: Vec<DrlSyntaxElement>,
    positions: HashMap<DrlSyntaxElement, u32>,
}

impl NodeIndex {
    pub fn build(tree: &SyntaxTree) -> Self {
        Self::from_root(tree.id(), tree.root())
    }

    fn from_root(tree: TreeId, root: DrlSyntaxNode) -> Self {
        let mut elements = Vec::new();
        for event in root.preorder_with_tokens() {
            if let WalkEvent::Enter(element) = event {
                elements.push(element);
            }
        }
        let positions = elements
            .iter()
            .enumerate()
            .map(|(idx, element)| (element.clone(), idx as u32))
            .collect();
        Self {
            tree,
            elements,
            positions,
        }
    }

    pub fn tree_id(&self) -> TreeId {
        self.tree
    }

    /// Number of nodes and tokens
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn root(&self) -> Option<DrlSyntaxNode> {
        self.elements.first().and_then(|e| e.clone().into_node())
    }

    /// Handle of a node or token of this tree
    pub fn handle_of(&self, element: impl Into<DrlSyntaxElement>) -> Option<NodeHandle> {
        self.positions
            .get(&element.into())
            .map(|&index| NodeHandle {
                tree: self.tree,
                index,
            })
    }

    /// Element behind a handle; `None` for handles of other trees
    pub fn get(&self, handle: NodeHandle) -> Option<&DrlSyntaxElement> {
        if handle.tree != self.tree {
            return None;
        }
        self.elements.get(handle.index as usize)
    }

    pub fn node(&self, handle: NodeHandle) -> Option<DrlSyntaxNode> {
        self.get(handle).and_then(|e| e.clone().into_node())
    }

    pub fn kind(&self, handle: NodeHandle) -> Option<DrlSyntaxKind> {
        self.get(handle).map(|e| e.kind())
    }

    /// Like [`NodeIndex::get`] but explains why a handle does not resolve
    pub fn resolve(&self, handle: NodeHandle) -> Result<&DrlSyntaxElement> {
        if handle.tree != self.tree {
            return Err(DrlError::stale_handle(
                handle,
                format!("handle belongs to tree {}, not {}", handle.tree, self.tree),
            ));
        }
        self.elements.get(handle.index as usize).ok_or_else(|| {
            DrlError::stale_handle(
                handle,
                format!("index out of range, tree has {} elements", self.elements.len()),
            )
        })
    }

    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        let parent = match self.get(handle)? {
            NodeOrToken::Node(node) => node.parent()?,
            NodeOrToken::Token(token) => token.parent()?,
        };
        self.handle_of(parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_drl;
    use crate::rewrite::Replacement;

    fn tree(source: &str) -> SyntaxTree {
        let (root, _, _) = parse_drl(source);
        SyntaxTree::new(root.green().into_owned(), "test.drl")
    }

    #[test]
    fn test_tree_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyntaxTree>();
    }

    #[test]
    fn test_ids_are_unique_and_shared_by_clones() {
        let a = tree("rule A when then end");
        let b = tree("rule A when then end");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
        assert_eq!(a.text(), "rule A when then end");
    }

    #[test]
    fn test_index_handles_roundtrip() {
        let tree = tree("rule R when Person() then end");
        let index = tree.index();
        let root = tree.root();
        assert_eq!(index.handle_of(root.clone()).unwrap().index(), 0);

        for node in root.descendants() {
            let handle = index.handle_of(node.clone()).unwrap();
            assert_eq!(index.node(handle).unwrap(), node);
        }
        let token = root.first_token().unwrap();
        let handle = index.handle_of(token.clone()).unwrap();
        assert_eq!(
            index.get(handle).and_then(|e| e.clone().into_token()),
            Some(token)
        );
    }

    #[test]
    fn test_parent_lookup() {
        let tree = tree("rule R when Person() then end");
        let index = tree.index();
        let pattern = tree
            .root()
            .descendants()
            .find(|n| n.kind() == DrlSyntaxKind::Pattern)
            .unwrap();
        let handle = index.handle_of(pattern).unwrap();
        let parent = index.parent(handle).unwrap();
        assert_eq!(index.kind(parent), Some(DrlSyntaxKind::WhenClause));
        assert_eq!(index.parent(NodeHandle { tree: tree.id(), index: 0 }), None);
    }

    #[test]
    fn test_foreign_handles_do_not_resolve() {
        let a = tree("rule A when then end");
        let b = tree("rule A when then end");
        let handle = a.index().handle_of(a.root()).unwrap();
        let index_b = b.index();
        assert!(index_b.get(handle).is_none());
        assert!(matches!(
            index_b.resolve(handle),
            Err(DrlError::StaleHandle { .. })
        ));

        let out_of_range = NodeHandle {
            tree: b.id(),
            index: 10_000,
        };
        assert!(matches!(
            index_b.resolve(out_of_range),
            Err(DrlError::StaleHandle { .. })
        ));
    }

    #[test]
    fn test_replace_is_persistent() {
        let original = tree("rule A when Person() then end\nrule B when then end\n");
        let index = original.index();
        let pattern = original
            .root()
            .descendants()
            .find(|n| n.kind() == DrlSyntaxKind::Pattern)
            .unwrap();
        let handle = index.handle_of(pattern).unwrap();

        let rewritten = original
            .replace(handle, EditAction::Replace(Replacement::Text("Pet()".into())))
            .unwrap();
        assert_eq!(rewritten.text(), "rule A when Pet() then end\nrule B when then end\n");
        assert_eq!(original.text(), "rule A when Person() then end\nrule B when then end\n");
        assert_ne!(rewritten.id(), original.id());

        // rule B was not touched and is shared between both trees
        fn second_rule(tree: &SyntaxTree) -> *const rowan::GreenNodeData {
            tree.green().children().nth(1).unwrap().into_node().unwrap()
        }
        assert!(std::ptr::eq(second_rule(&original), second_rule(&rewritten)));
    }

    #[test]
    fn test_latch() {
        let tree = tree("rule A when then end");
        let guard = tree.try_lock().unwrap();
        assert!(tree.clone().try_lock().is_none());
        drop(guard);
        assert!(tree.try_lock().is_some());
    }
}
