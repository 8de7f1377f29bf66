//! Thin wrapper over rowan's `GreenNodeBuilder` speaking `DrlSyntaxKind`

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder};

use super::{CstToken, DrlSyntaxKind, DrlSyntaxNode};

/// Incremental CST builder used by the parser and the fragment constructors
pub struct CstBuilder {
    builder: GreenNodeBuilder<'static>,
}

impl CstBuilder {
    pub fn new() -> Self {
        Self {
            builder: GreenNodeBuilder::new(),
        }
    }

    pub fn start_node(&mut self, kind: DrlSyntaxKind) {
        self.builder.start_node(kind.into());
    }

    /// Wrap everything added since `checkpoint` into a new node of `kind`
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: DrlSyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.builder.checkpoint()
    }

    pub fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub fn token(&mut self, kind: DrlSyntaxKind, text: &str) {
        self.builder.token(kind.into(), text);
    }

    pub fn add_token(&mut self, token: &CstToken) {
        self.token(token.kind, &token.text);
    }

    /// Finish building and return the green tree
    pub fn finish_green(self) -> GreenNode {
        self.builder.finish()
    }

    /// Finish building and return a red root node
    pub fn finish(self) -> DrlSyntaxNode {
        DrlSyntaxNode::new_root(self.finish_green())
    }
}

impl Default for CstBuilder {
    fn default() -> Self {
        Self::new()
    }
}
