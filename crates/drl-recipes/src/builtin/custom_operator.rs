//! `##` prefix for custom operators
//!
//! DRL 10 requires custom (pluggable) operators to be marked with `##`:
//! `addresses supersetOf $x` becomes `addresses ##supersetOf $x`. Operators
//! DRL itself defines are left alone.

use std::collections::HashSet;

use drl_core::cst::ast::{AstNode, Operator};
use drl_core::{DrlSyntaxKind, DrlSyntaxNode, VisitAction, VisitContext, Visitor};

use crate::Recipe;

/// Recipe ID for the custom operator rewrite
pub const PREFIX_CUSTOM_OPERATOR: &str = "drl/prefix-custom-operator";

/// Operators built into DRL, lowercase
pub const BUILT_IN_OPERATORS: &[&str] = &[
    "contains",
    "excludes",
    "matches",
    "memberof",
    "soundslike",
    "str",
    "after",
    "before",
    "coincides",
    "during",
    "finishedby",
    "finishes",
    "includes",
    "meets",
    "metby",
    "overlappedby",
    "overlaps",
    "startedby",
    "starts",
];

#[derive(Debug, Clone)]
pub struct PrefixCustomOperator {
    built_ins: HashSet<String>,
}

impl PrefixCustomOperator {
    pub fn new() -> Self {
        Self::with_builtins(std::iter::empty::<String>())
    }

    /// Treat `extra` as built-in operators too (matched case-insensitively)
    pub fn with_builtins<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let built_ins = BUILT_IN_OPERATORS
            .iter()
            .map(|op| op.to_string())
            .chain(extra.into_iter().map(|op| op.as_ref().to_lowercase()))
            .collect();
        Self { built_ins }
    }

    pub fn is_built_in(&self, name: &str) -> bool {
        self.built_ins.contains(&name.to_lowercase())
    }
}

impl Default for PrefixCustomOperator {
    fn default() -> Self {
        Self::new()
    }
}

impl Recipe for PrefixCustomOperator {
    fn id(&self) -> &'static str {
        PREFIX_CUSTOM_OPERATOR
    }

    fn display_name(&self) -> &'static str {
        "Prefix custom operators with ##"
    }

    fn description(&self) -> &'static str {
        "Adds the ## prefix to identifier operators that are not built into DRL."
    }

    fn visitor(&self) -> Box<dyn Visitor + '_> {
        Box::new(CustomOperatorVisitor { recipe: self })
    }
}

struct CustomOperatorVisitor<'r> {
    recipe: &'r PrefixCustomOperator,
}

impl Visitor for CustomOperatorVisitor<'_> {
    fn enter(&mut self, node: &DrlSyntaxNode, ctx: &mut VisitContext<'_>) -> VisitAction {
        match node.kind() {
            DrlSyntaxKind::Operator => {
                if let Some(operator) = Operator::cast(node.clone())
                    && !operator.is_prefixed()
                    && operator.is_identifier()
                    && let Some(token) = operator.token()
                    && !self.recipe.is_built_in(token.text())
                {
                    let prefixed = format!("##{}", token.text());
                    ctx.replace(token, prefixed);
                }
                VisitAction::SkipChildren
            }
            DrlSyntaxKind::ThenClause | DrlSyntaxKind::FunctionDecl => VisitAction::SkipChildren,
            _ => VisitAction::Continue,
        }
    }
}
