//! Built-in DRL migration recipes

mod agenda_group;
mod custom_operator;
mod half_constraint;
mod lhs_logical;
mod migrate;

pub use agenda_group::{AGENDA_GROUP_TO_RULEFLOW_GROUP, AgendaGroupToRuleflowGroup};
pub use custom_operator::{BUILT_IN_OPERATORS, PREFIX_CUSTOM_OPERATOR, PrefixCustomOperator};
pub use half_constraint::{HALF_CONSTRAINT, HalfConstraintRecipe};
pub use lhs_logical::{LHS_LOGICAL_OPERATORS, LhsLogicalOperators};
pub use migrate::{DrlMigration, MIGRATE_DRL10};

use drl_core::MigrationOptions;

use crate::{Recipe, RecipeError, Result};

/// Ids of all built-in recipes
pub const RECIPE_IDS: &[&str] = &[
    AGENDA_GROUP_TO_RULEFLOW_GROUP,
    HALF_CONSTRAINT,
    LHS_LOGICAL_OPERATORS,
    PREFIX_CUSTOM_OPERATOR,
    MIGRATE_DRL10,
];

/// Look up a built-in recipe by id
pub fn recipe_by_id(id: &str, options: &MigrationOptions) -> Result<Box<dyn Recipe>> {
    let recipe: Box<dyn Recipe> = match id {
        AGENDA_GROUP_TO_RULEFLOW_GROUP => Box::new(AgendaGroupToRuleflowGroup),
        HALF_CONSTRAINT => Box::new(HalfConstraintRecipe),
        LHS_LOGICAL_OPERATORS => Box::new(LhsLogicalOperators),
        PREFIX_CUSTOM_OPERATOR => Box::new(PrefixCustomOperator::with_builtins(
            &options.extra_builtin_operators,
        )),
        MIGRATE_DRL10 => Box::new(DrlMigration::new(options)),
        _ => {
            return Err(RecipeError::UnknownRecipe { id: id.to_string() });
        }
    };
    Ok(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_id_resolves() {
        let options = MigrationOptions::default();
        for id in RECIPE_IDS {
            assert_eq!(recipe_by_id(id, &options).unwrap().id(), *id);
        }
        assert!(matches!(
            recipe_by_id("drl/nope", &options),
            Err(RecipeError::UnknownRecipe { .. })
        ));
    }
}
