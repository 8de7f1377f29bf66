//! The recipe interface

use drl_core::{Edit, SyntaxTree, Visitor, VisitorRegistry, walk};
use serde::Serialize;

/// A migration step over one DRL source
///
/// A recipe is a read-only pass: it inspects the tree and returns the
/// edits it wants. Composite recipes return their steps from
/// [`Recipe::recipe_list`] and produce no edits of their own.
pub trait Recipe: Send + Sync {
    /// Stable identifier, e.g. `drl/half-constraint`
    fn id(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Visitor that registers this recipe's edits
    fn visitor(&self) -> Box<dyn Visitor + '_> {
        Box::new(VisitorRegistry::new())
    }

    /// Edits this recipe wants on `tree`
    fn visit(&self, tree: &SyntaxTree) -> Vec<Edit> {
        let mut visitor = self.visitor();
        walk(tree, &mut visitor).edits
    }

    /// Steps of a composite recipe, in the order they run
    fn recipe_list(&self) -> &[Box<dyn Recipe>] {
        &[]
    }

    fn descriptor(&self) -> RecipeDescriptor {
        RecipeDescriptor {
            id: self.id(),
            display_name: self.display_name(),
            description: self.description(),
            steps: self.recipe_list().iter().map(|r| r.descriptor()).collect(),
        }
    }
}

/// Serializable summary of a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeDescriptor {
    pub id: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<RecipeDescriptor>,
}

/// Leaf recipes of `recipes`, composites expanded in order
pub fn flatten(recipes: &[Box<dyn Recipe>]) -> Vec<&dyn Recipe> {
    let mut leaves = Vec::new();
    for recipe in recipes {
        push_leaves(recipe.as_ref(), &mut leaves);
    }
    leaves
}

fn push_leaves<'a>(recipe: &'a dyn Recipe, leaves: &mut Vec<&'a dyn Recipe>) {
    let steps = recipe.recipe_list();
    if steps.is_empty() {
        leaves.push(recipe);
    } else {
        for step in steps {
            push_leaves(step.as_ref(), leaves);
        }
    }
}
