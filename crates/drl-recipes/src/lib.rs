//! DRL Recipes
//!
//! Migration recipes for DRL sources. Each recipe inspects a parsed tree
//! through a [`drl_core::Visitor`] and returns edits. The [`RecipeRunner`]
//! applies them with the rewrite engine and re-parses between recipes, so
//! every recipe sees the output of the one before it.
//!
//! ```rust
//! use drl_recipes::{DrlMigration, Recipe, RecipeRunner};
//!
//! let source = "rule R when A() && B() then end";
//! let recipes: Vec<Box<dyn Recipe>> = vec![Box::new(DrlMigration::default())];
//! let output = RecipeRunner::new().run(source, "rules.drl", &recipes).unwrap();
//! assert_eq!(output.text, "rule R when A() and B() then end");
//! ```

pub mod builtin;
pub mod error;
pub mod recipe;
pub mod runner;

pub use builtin::{
    AGENDA_GROUP_TO_RULEFLOW_GROUP, AgendaGroupToRuleflowGroup, BUILT_IN_OPERATORS, DrlMigration,
    HALF_CONSTRAINT, HalfConstraintRecipe, LHS_LOGICAL_OPERATORS, LhsLogicalOperators,
    MIGRATE_DRL10, PREFIX_CUSTOM_OPERATOR, PrefixCustomOperator, RECIPE_IDS, recipe_by_id,
};
pub use error::{RecipeError, Result};
pub use recipe::{Recipe, RecipeDescriptor, flatten};
pub use runner::{DEFAULT_MAX_CYCLES, RecipeRunner, RunOutput};
