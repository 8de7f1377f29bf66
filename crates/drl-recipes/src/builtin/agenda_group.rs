//! `agenda-group` to `ruleflow-group`
//!
//! DRL 10 drops the `agenda-group` attribute. The attribute keyword is
//! replaced; its value is kept as written.

use drl_core::cst::ast::{AstNode, Attribute};
use drl_core::cst::make;
use drl_core::{DrlSyntaxKind, VisitAction, Visitor, VisitorRegistry};

use crate::Recipe;

/// Recipe ID for the agenda-group rewrite
pub const AGENDA_GROUP_TO_RULEFLOW_GROUP: &str = "drl/agenda-group-to-ruleflow-group";

#[derive(Debug, Clone, Copy, Default)]
pub struct AgendaGroupToRuleflowGroup;

impl Recipe for AgendaGroupToRuleflowGroup {
    fn id(&self) -> &'static str {
        AGENDA_GROUP_TO_RULEFLOW_GROUP
    }

    fn display_name(&self) -> &'static str {
        "Replace agenda-group with ruleflow-group"
    }

    fn description(&self) -> &'static str {
        "Rewrites the agenda-group rule attribute to ruleflow-group, keeping its value."
    }

    fn visitor(&self) -> Box<dyn Visitor + '_> {
        let mut registry = VisitorRegistry::new();
        registry
            .on_enter(DrlSyntaxKind::Attribute, |node, ctx| {
                let key = Attribute::cast(node.clone()).and_then(|attr| attr.key_token());
                if let Some(key) = key.filter(|k| k.kind() == DrlSyntaxKind::AgendaGroupKw) {
                    ctx.replace(
                        key,
                        make::token(DrlSyntaxKind::RuleflowGroupKw, "ruleflow-group"),
                    );
                }
                VisitAction::SkipChildren
            })
            .on_enter(DrlSyntaxKind::WhenClause, |_, _| VisitAction::SkipChildren)
            .on_enter(DrlSyntaxKind::ThenClause, |_, _| VisitAction::SkipChildren);
        Box::new(registry)
    }
}
