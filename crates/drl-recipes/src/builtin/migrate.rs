//! The DRL 10 migration: every built-in rewrite in one recipe

use drl_core::MigrationOptions;

use super::{AgendaGroupToRuleflowGroup, HalfConstraintRecipe, LhsLogicalOperators, PrefixCustomOperator};
use crate::Recipe;

/// Recipe ID for the composite migration
pub const MIGRATE_DRL10: &str = "drl/migrate-drl10";

/// Runs agenda-group, half-constraint, LHS logical operator and custom
/// operator rewrites, in that order, as enabled by [`MigrationOptions`]
pub struct DrlMigration {
    steps: Vec<Box<dyn Recipe>>,
}

impl DrlMigration {
    pub fn new(options: &MigrationOptions) -> Self {
        let mut steps: Vec<Box<dyn Recipe>> = Vec::new();
        if options.rewrite_agenda_group {
            steps.push(Box::new(AgendaGroupToRuleflowGroup));
        }
        if options.rewrite_half_constraints {
            steps.push(Box::new(HalfConstraintRecipe));
        }
        if options.replace_lhs_logical_infix {
            steps.push(Box::new(LhsLogicalOperators));
        }
        if options.prefix_custom_operators {
            steps.push(Box::new(PrefixCustomOperator::with_builtins(
                &options.extra_builtin_operators,
            )));
        }
        Self { steps }
    }
}

impl Default for DrlMigration {
    fn default() -> Self {
        Self::new(&MigrationOptions::default())
    }
}

impl Recipe for DrlMigration {
    fn id(&self) -> &'static str {
        MIGRATE_DRL10
    }

    fn display_name(&self) -> &'static str {
        "Migrate DRL to DRL 10"
    }

    fn description(&self) -> &'static str {
        "Applies the DRL 10 syntax migrations: ruleflow-group, explicit half constraints, and/or between patterns, ## custom operators."
    }

    fn recipe_list(&self) -> &[Box<dyn Recipe>] {
        &self.steps
    }
}
