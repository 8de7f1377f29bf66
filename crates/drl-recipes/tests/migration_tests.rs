//! Migration tests through the public API
//!
//! This module tests:
//! - A realistic five-rule batch migrated in one cycle
//! - Consequences left byte-identical
//! - Inputs with nothing to migrate come back unchanged
//! - Recipe lookup and descriptors

use drl_core::{DrlConfig, MigrationOptions};
use drl_recipes::{
    DrlMigration, HalfConstraintRecipe, MIGRATE_DRL10, Recipe, RecipeError, RecipeRunner,
    recipe_by_id,
};

const BATCH_BEFORE: &str = r#"rule R1
agenda-group "customers"
when
    Person(name == "Mark" || == "Mario")
    Address(city == "Boston")
then
    // RHS should not change
    System.out.println(name == "Mark" || == "Mario");
end

rule R2
agenda-group "orders"
when
    Person(addresses supersetOf $alice.addresses)
    Order(total > 100 && status == "NEW")
then
    // RHS should not change
    if (order.supersetOf($alice.addresses) && status == "NEW") { doSomething(); }
end

rule R3
when
    (Person() && Pet())
    Car(model == "Civic" || == "Accord")
then
    // RHS should not change
    boolean ok = (a && b) || (c && d);
end

rule R4
when
    Person(name == "Bob" || name == "Alice")
    Account(balance > 1000 || == 500)
then
    // RHS should not change
    if (balance > 1000 || balance == 500) { reward(); }
end

rule R5
agenda-group "vip"
when
    Order(items subsetOf $catalog.items || == $vip.items)
    Customer(score > 80 || < 60)
then
    // RHS should not change
    log.info("subsetOf? {}", items subsetOf $catalog.items || == $vip.items);
end
"#;

const BATCH_AFTER: &str = r#"rule R1
ruleflow-group "customers"
when
    Person(name == "Mark" || name == "Mario")
    Address(city == "Boston")
then
    // RHS should not change
    System.out.println(name == "Mark" || == "Mario");
end

rule R2
ruleflow-group "orders"
when
    Person(addresses ##supersetOf $alice.addresses)
    Order(total > 100 && status == "NEW")
then
    // RHS should not change
    if (order.supersetOf($alice.addresses) && status == "NEW") { doSomething(); }
end

rule R3
when
    (Person() and Pet())
    Car(model == "Civic" || model == "Accord")
then
    // RHS should not change
    boolean ok = (a && b) || (c && d);
end

rule R4
when
    Person(name == "Bob" || name == "Alice")
    Account(balance > 1000 || balance == 500)
then
    // RHS should not change
    if (balance > 1000 || balance == 500) { reward(); }
end

rule R5
ruleflow-group "vip"
when
    Order(items ##subsetOf $catalog.items || items == $vip.items)
    Customer(score > 80 || score < 60)
then
    // RHS should not change
    log.info("subsetOf? {}", items subsetOf $catalog.items || == $vip.items);
end
"#;

fn migration() -> Vec<Box<dyn Recipe>> {
    vec![Box::new(DrlMigration::default())]
}

/// Text between `then` and `end` of every rule
fn consequences(source: &str) -> Vec<String> {
    source
        .split("then\n")
        .skip(1)
        .filter_map(|rest| rest.split("end\n").next())
        .map(str::to_string)
        .collect()
}

#[test]
fn test_realistic_batch_migrates_in_one_cycle() {
    let output = RecipeRunner::new()
        .run(BATCH_BEFORE, "batch.drl", &migration())
        .unwrap();
    assert_eq!(output.text, BATCH_AFTER);
    assert!(output.changed);
    assert_eq!(output.cycles, 1);
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
}

#[test]
fn test_consequences_are_untouched() {
    let output = RecipeRunner::new()
        .run(BATCH_BEFORE, "batch.drl", &migration())
        .unwrap();
    assert_eq!(consequences(&output.text), consequences(BATCH_BEFORE));
    assert_eq!(consequences(BATCH_BEFORE).len(), 5);
}

#[test]
fn test_migrated_output_is_a_fixed_point() {
    let runner = RecipeRunner::new();
    let once = runner.run(BATCH_BEFORE, "batch.drl", &migration()).unwrap();
    let twice = runner.run(&once.text, "batch.drl", &migration()).unwrap();
    assert_eq!(twice.text, once.text);
    assert!(!twice.changed);
    assert_eq!(twice.cycles, 0);
}

#[test]
fn test_nothing_to_migrate() {
    let sources = [
        "rule R when Person( age > 18 ) then end",
        "package p;\n\nimport a.B;\n\nrule \"R\"\n    salience 10\n    ruleflow-group \"g\"\nwhen\n    $p : Person( name matches \"M.*\" )\n    not Pet( owner == $p )\nthen\n    update($p);\nend\n",
        "query \"adults\" Person( age >= 18 ) end",
        "function int twice(int x) { return x && x || x; }\n",
    ];
    for source in sources {
        let output = RecipeRunner::new().run(source, "noop.drl", &migration()).unwrap();
        assert_eq!(output.text, source);
        assert!(!output.changed, "unexpected change in {source:?}");
    }
}

#[test]
fn test_disabled_steps_are_skipped() {
    let config = DrlConfig {
        migration: MigrationOptions {
            rewrite_agenda_group: false,
            ..MigrationOptions::default()
        },
        ..DrlConfig::default()
    };
    let recipe = recipe_by_id(MIGRATE_DRL10, &config.migration).unwrap();
    let output = RecipeRunner::from_config(&config)
        .run(
            "rule R agenda-group \"g\" when A() || B() then end",
            "options.drl",
            &[recipe],
        )
        .unwrap();
    assert_eq!(output.text, "rule R agenda-group \"g\" when A() or B() then end");
}

#[test]
fn test_single_recipe_run() {
    let recipes: Vec<Box<dyn Recipe>> = vec![Box::new(HalfConstraintRecipe)];
    let output = RecipeRunner::new()
        .run("rule R when A( x > 1 && < 5 ) && B() then end", "single.drl", &recipes)
        .unwrap();
    assert_eq!(output.text, "rule R when A( x > 1 && x < 5 ) && B() then end");
    assert_eq!(output.applied, vec!["drl/half-constraint"]);
}

#[test]
fn test_unknown_recipe_id() {
    let Err(err) = recipe_by_id("drl/unknown", &MigrationOptions::default()) else {
        panic!("drl/unknown resolved to a recipe");
    };
    assert!(matches!(err, RecipeError::UnknownRecipe { ref id } if id == "drl/unknown"));
    assert!(err.to_string().contains("drl/unknown"));
}

#[test]
fn test_composite_descriptor_lists_steps() {
    let descriptor = DrlMigration::default().descriptor();
    assert_eq!(descriptor.id, MIGRATE_DRL10);
    assert_eq!(descriptor.steps.len(), 4);

    let json = serde_json::to_value(&descriptor).unwrap();
    assert_eq!(json["steps"][0]["id"], "drl/agenda-group-to-ruleflow-group");
    assert!(json["steps"][0].get("steps").is_none());
}
