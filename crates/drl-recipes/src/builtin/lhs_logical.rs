//! `&&`/`||` between patterns
//!
//! Infix `&&` and `||` that combine conditional elements of a `when` clause
//! become `and` and `or`. The same operators inside constraints and in the
//! consequence are a different language level and stay as they are.

use drl_core::cst::make;
use drl_core::{DrlSyntaxKind, DrlSyntaxToken, VisitAction, VisitContext, Visitor, VisitorRegistry};

use crate::Recipe;

/// Recipe ID for the LHS logical operator rewrite
pub const LHS_LOGICAL_OPERATORS: &str = "drl/lhs-logical-operators";

#[derive(Debug, Clone, Copy, Default)]
pub struct LhsLogicalOperators;

impl Recipe for LhsLogicalOperators {
    fn id(&self) -> &'static str {
        LHS_LOGICAL_OPERATORS
    }

    fn display_name(&self) -> &'static str {
        "Replace &&/|| between patterns"
    }

    fn description(&self) -> &'static str {
        "Rewrites infix && and || that combine patterns to and/or; constraints and consequences are untouched."
    }

    fn visitor(&self) -> Box<dyn Visitor + '_> {
        let mut registry = VisitorRegistry::new();
        registry
            .on_token(DrlSyntaxKind::AmpAmp, |token, ctx| {
                replace_in_lhs(token, ctx, DrlSyntaxKind::LhsAnd, DrlSyntaxKind::AndKw, "and")
            })
            .on_token(DrlSyntaxKind::PipePipe, |token, ctx| {
                replace_in_lhs(token, ctx, DrlSyntaxKind::LhsOr, DrlSyntaxKind::OrKw, "or")
            })
            .on_enter(DrlSyntaxKind::Pattern, |_, _| VisitAction::SkipChildren)
            .on_enter(DrlSyntaxKind::LhsEval, |_, _| VisitAction::SkipChildren)
            .on_enter(DrlSyntaxKind::ThenClause, |_, _| VisitAction::SkipChildren);
        Box::new(registry)
    }
}

fn replace_in_lhs(
    token: &DrlSyntaxToken,
    ctx: &mut VisitContext<'_>,
    parent: DrlSyntaxKind,
    keyword: DrlSyntaxKind,
    text: &str,
) -> VisitAction {
    if token.parent().is_some_and(|p| p.kind() == parent) {
        ctx.replace(token.clone(), make::token(keyword, text));
    }
    VisitAction::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::apply;

    fn when(lhs: &str) -> String {
        format!("rule R\nwhen\n    {lhs}\nthen\nend\n")
    }

    #[test]
    fn test_replaces_between_patterns() {
        assert_eq!(
            apply(&LhsLogicalOperators, &when("(Person() && Pet())")),
            when("(Person() and Pet())")
        );
    }

    #[test]
    fn test_replaces_nested_groups() {
        assert_eq!(
            apply(&LhsLogicalOperators, &when("(Person() && Pet())\n    || (Car() && House())")),
            when("(Person() and Pet())\n    or (Car() and House())")
        );
    }

    #[test]
    fn test_constraint_operators_are_untouched() {
        for lhs in [
            "Person(name == \"Mark\" || name == \"Mario\")",
            "Person( (name == \"Mark\" && age > 30) || (name == \"Mark\" && age < 20) )",
            "eval( a && b )",
        ] {
            let source = when(lhs);
            assert_eq!(apply(&LhsLogicalOperators, &source), source, "{lhs}");
        }
    }

    #[test]
    fn test_consequence_is_untouched() {
        let source = "rule R\nwhen\n    A() and B()\nthen\n    boolean ok = (a && b) || (c && d);\nend\n";
        assert_eq!(apply(&LhsLogicalOperators, source), source);
    }
}
