//! Half constraints
//!
//! `name == "Mark" || == "Mario"` leaves out the left operand of the second
//! comparison. DRL 10 requires it, so it is copied from the anchoring
//! comparison: the left-most comparison of the `||`/`&&` chain.

use drl_core::cst::ast::{AstNode, Expr, RelationalExpr};
use drl_core::cst::make;
use drl_core::{
    DrlSyntaxKind, DrlSyntaxNode, Replacement, VisitAction, VisitContext, Visitor,
};
use tracing::debug;

use crate::Recipe;

/// Recipe ID for the half-constraint rewrite
pub const HALF_CONSTRAINT: &str = "drl/half-constraint";

#[derive(Debug, Clone, Copy, Default)]
pub struct HalfConstraintRecipe;

impl Recipe for HalfConstraintRecipe {
    fn id(&self) -> &'static str {
        HALF_CONSTRAINT
    }

    fn display_name(&self) -> &'static str {
        "Rewrite half-constraints"
    }

    fn description(&self) -> &'static str {
        "Fills in the missing left operand of comparisons chained with || or &&."
    }

    fn visitor(&self) -> Box<dyn Visitor + '_> {
        Box::new(HalfConstraintVisitor)
    }
}

struct HalfConstraintVisitor;

impl Visitor for HalfConstraintVisitor {
    fn enter(&mut self, node: &DrlSyntaxNode, ctx: &mut VisitContext<'_>) -> VisitAction {
        match node.kind() {
            DrlSyntaxKind::HalfConstraint => {
                let Some(operand) = anchor_operand(node) else {
                    debug!(
                        source_id = ctx.source_id(),
                        offset = u32::from(node.text_range().start()),
                        "half constraint without an anchoring comparison"
                    );
                    return VisitAction::SkipChildren;
                };
                let text = format!("{operand} {}", node.text());
                let replacement = match make::expression(&text) {
                    Ok(green) => Replacement::Node(green),
                    Err(_) => Replacement::Text(text),
                };
                ctx.replace(node.clone(), replacement);
                VisitAction::SkipChildren
            }
            DrlSyntaxKind::ThenClause | DrlSyntaxKind::FunctionDecl => VisitAction::SkipChildren,
            _ => VisitAction::Continue,
        }
    }
}

/// `||` or `&&` expression
fn is_logical(node: &DrlSyntaxNode) -> bool {
    Expr::cast(node.clone())
        .and_then(|expr| expr.binary_operator())
        .is_some_and(|op| matches!(op.kind(), DrlSyntaxKind::PipePipe | DrlSyntaxKind::AmpAmp))
}

/// Left operand text of the comparison anchoring `half`
fn anchor_operand(half: &DrlSyntaxNode) -> Option<String> {
    let mut chain = half.clone();
    while let Some(parent) = chain.parent().filter(is_logical) {
        chain = parent;
    }

    let mut cursor = chain;
    while is_logical(&cursor) {
        cursor = cursor.children().find(|n| Expr::can_cast(n.kind()))?;
    }
    let lhs = RelationalExpr::cast(cursor)?.lhs()?;
    Some(lhs.syntax().text().to_string())
}
