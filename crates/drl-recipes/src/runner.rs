//! Runs recipes over a source until nothing changes

use drl_core::{Diagnostic, DrlConfig, ParserConfig, RewriteEngine, SyntaxTree, parse_with_config};
use serde::Serialize;
use tracing::{debug, warn};

use crate::recipe::flatten;
use crate::{Recipe, Result};

/// Upper bound on full passes over the recipe list
pub const DEFAULT_MAX_CYCLES: usize = 3;

/// Result of running recipes over one source
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    /// Final text
    pub text: String,
    /// Parse diagnostics of the input, then rewrite diagnostics and the parse
    /// errors each recipe introduced, in run order
    pub diagnostics: Vec<Diagnostic>,
    /// Whether `text` differs from the input
    pub changed: bool,
    /// Number of passes over the recipe list that changed the text
    pub cycles: usize,
    /// Ids of the recipes that changed the text, in run order
    pub applied: Vec<String>,
}

/// Applies recipes one after another, re-parsing in between
///
/// Composite recipes are expanded into their steps. Each step sees the text
/// produced by the previous one. The whole list is repeated until a pass
/// changes nothing, at most `max_cycles` times.
#[derive(Debug, Clone)]
pub struct RecipeRunner {
    parser: ParserConfig,
    engine: RewriteEngine,
    max_cycles: usize,
}

impl RecipeRunner {
    pub fn new() -> Self {
        Self::from_config(&DrlConfig::default())
    }

    pub fn from_config(config: &DrlConfig) -> Self {
        Self {
            parser: config.parser.clone(),
            engine: RewriteEngine::with_config(config.rewrite.clone()),
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }

    pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles.max(1);
        self
    }

    pub fn run(&self, source: &str, source_id: &str, recipes: &[Box<dyn Recipe>]) -> Result<RunOutput> {
        let initial = parse_with_config(source, source_id, &self.parser)?;
        let mut tree_errors = errors_of(&initial.diagnostics);
        let mut diagnostics = initial.diagnostics;
        let mut tree = initial.tree;
        let mut text = source.to_string();

        // Rewritten text may legitimately be empty (every rule deleted)
        let reparse_config = ParserConfig {
            reject_empty: false,
            ..self.parser.clone()
        };

        let steps = flatten(recipes);
        let mut applied = Vec::new();
        let mut cycles = 0;
        let mut converged = false;

        for cycle in 0..self.max_cycles {
            let mut changed = false;
            for recipe in &steps {
                let edits = recipe.visit(&tree);
                if edits.is_empty() {
                    continue;
                }

                let output = self.engine.apply(&tree, edits)?;
                diagnostics.extend(output.diagnostics);
                if output.text == text {
                    continue;
                }

                debug!(
                    source_id,
                    recipe = recipe.id(),
                    cycle,
                    edits = output.applied,
                    "recipe changed source"
                );
                let reparsed = parse_with_config(&output.text, source_id, &reparse_config)?;
                let introduced = new_errors(&tree_errors, &reparsed.diagnostics);
                if !introduced.is_empty() {
                    warn!(
                        source_id,
                        recipe = recipe.id(),
                        errors = introduced.len(),
                        "rewrite produced invalid DRL"
                    );
                    diagnostics.extend(introduced.into_iter().map(|mut diagnostic| {
                        diagnostic.message =
                            format!("{} (introduced by recipe {})", diagnostic.message, recipe.id());
                        diagnostic
                    }));
                }
                tree_errors = errors_of(&reparsed.diagnostics);
                tree = reparsed.tree;
                text = output.text;
                applied.push(recipe.id().to_string());
                changed = true;
            }

            if !changed {
                converged = true;
                break;
            }
            cycles += 1;
        }

        if !converged {
            warn!(
                source_id,
                max_cycles = self.max_cycles,
                "recipes still changing the source after the last cycle"
            );
        }

        Ok(RunOutput {
            changed: text != source,
            text,
            diagnostics,
            cycles,
            applied,
        })
    }

    /// Run recipes over an already parsed tree
    pub fn run_tree(&self, tree: &SyntaxTree, recipes: &[Box<dyn Recipe>]) -> Result<RunOutput> {
        self.run(&tree.text(), tree.source_id(), recipes)
    }
}

impl Default for RecipeRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn errors_of(diagnostics: &[Diagnostic]) -> Vec<Diagnostic> {
    diagnostics.iter().filter(|d| d.is_error()).cloned().collect()
}

/// Errors of a re-parse that the tree before the step did not have.
/// Spans move with every rewrite, so errors are matched by code and message.
fn new_errors(before: &[Diagnostic], after: &[Diagnostic]) -> Vec<Diagnostic> {
    let mut known: Vec<&Diagnostic> = before.iter().collect();
    let mut introduced = Vec::new();
    for diagnostic in after.iter().filter(|d| d.is_error()) {
        let seen = known
            .iter()
            .position(|k| k.code == diagnostic.code && k.message == diagnostic.message);
        match seen {
            Some(idx) => {
                known.swap_remove(idx);
            }
            None => introduced.push(diagnostic.clone()),
        }
    }
    introduced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{AgendaGroupToRuleflowGroup, HalfConstraintRecipe, LhsLogicalOperators};
    use crate::RecipeError;
    use drl_core::{DiagnosticKind, DrlError, DrlSyntaxKind, VisitAction, Visitor, VisitorRegistry};

    #[test]
    fn test_no_matching_construct_leaves_text_unchanged() {
        let source = "rule R\n    salience 10\nwhen\n    Person( age > 18 )\nthen\n    a();\nend\n";
        let recipes: Vec<Box<dyn Recipe>> = vec![
            Box::new(AgendaGroupToRuleflowGroup),
            Box::new(HalfConstraintRecipe),
            Box::new(LhsLogicalOperators),
        ];
        let output = RecipeRunner::new().run(source, "plain.drl", &recipes).unwrap();
        assert_eq!(output.text, source);
        assert!(!output.changed);
        assert_eq!(output.cycles, 0);
        assert!(output.applied.is_empty());
    }

    #[test]
    fn test_later_recipes_see_earlier_output() {
        let source = "rule R agenda-group \"g\" when A() && B(x == 1 || == 2) then end";
        let recipes: Vec<Box<dyn Recipe>> = vec![
            Box::new(AgendaGroupToRuleflowGroup),
            Box::new(HalfConstraintRecipe),
            Box::new(LhsLogicalOperators),
        ];
        let output = RecipeRunner::new().run(source, "chain.drl", &recipes).unwrap();
        assert_eq!(
            output.text,
            "rule R ruleflow-group \"g\" when A() and B(x == 1 || x == 2) then end"
        );
        assert_eq!(output.cycles, 1);
        assert_eq!(
            output.applied,
            vec![
                "drl/agenda-group-to-ruleflow-group",
                "drl/half-constraint",
                "drl/lhs-logical-operators",
            ]
        );
    }

    /// Rewrites every pattern into one that does not parse
    struct BreakPatterns;

    impl Recipe for BreakPatterns {
        fn id(&self) -> &'static str {
            "test/break-patterns"
        }

        fn display_name(&self) -> &'static str {
            "Break patterns"
        }

        fn description(&self) -> &'static str {
            "Replaces each pattern with an incomplete constraint."
        }

        fn visitor(&self) -> Box<dyn Visitor + '_> {
            let mut registry = VisitorRegistry::new();
            registry.on_enter(DrlSyntaxKind::Pattern, |node, ctx| {
                ctx.replace(node.clone(), "Person( age > )");
                VisitAction::SkipChildren
            });
            Box::new(registry)
        }
    }

    #[test]
    fn test_errors_introduced_by_a_recipe_are_reported() {
        let source = "rule R when Person( age > 18 ) then end\n";
        let recipes: Vec<Box<dyn Recipe>> = vec![Box::new(BreakPatterns)];
        let output = RecipeRunner::new().run(source, "broken.drl", &recipes).unwrap();
        assert_eq!(output.text, "rule R when Person( age > ) then end\n");
        assert_eq!(output.applied, vec!["test/break-patterns"]);

        let errors: Vec<_> = output.diagnostics.iter().filter(|d| d.is_error()).collect();
        assert_eq!(errors.len(), 1, "diagnostics: {:?}", output.diagnostics);
        assert_eq!(errors[0].kind, DiagnosticKind::SyntaxError);
        assert!(errors[0].message.contains("test/break-patterns"));
    }

    #[test]
    fn test_parse_diagnostics_are_carried_over() {
        let source = "rule A when X( a > ) then end\nrule B agenda-group \"g\" when then end\n";
        let recipes: Vec<Box<dyn Recipe>> = vec![Box::new(AgendaGroupToRuleflowGroup)];
        let output = RecipeRunner::new().run(source, "broken.drl", &recipes).unwrap();
        // the input error is reported once, not again after the rewrite
        let errors: Vec<_> = output.diagnostics.iter().filter(|d| d.is_error()).collect();
        assert_eq!(errors.len(), 1, "diagnostics: {:?}", output.diagnostics);
        assert!(!errors[0].message.contains("introduced by"));
        assert!(output.text.contains("ruleflow-group \"g\""));
        assert!(output.text.starts_with("rule A when X( a > ) then end\n"));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let recipes: Vec<Box<dyn Recipe>> = vec![Box::new(AgendaGroupToRuleflowGroup)];
        let err = RecipeRunner::new().run("", "empty.drl", &recipes).unwrap_err();
        assert!(matches!(err, RecipeError::Core(DrlError::EmptyInput { .. })));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_output_serializes() {
        let recipes: Vec<Box<dyn Recipe>> = vec![Box::new(AgendaGroupToRuleflowGroup)];
        let output = RecipeRunner::new()
            .run("rule R agenda-group \"g\" when then end", "json.drl", &recipes)
            .unwrap();
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["changed"], true);
        assert_eq!(value["cycles"], 1);
    }
}
