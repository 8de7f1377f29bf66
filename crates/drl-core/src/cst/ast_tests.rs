//! Tests for the typed AST layer

use super::ast::*;
use super::{DrlSyntaxKind, parse_drl};

fn unit(source: &str) -> CompilationUnit {
    let (cst, _, errors) = parse_drl(source);
    assert!(
        errors.iter().all(|e| e.is_warning()),
        "parse errors: {errors:?}"
    );
    CompilationUnit::cast(cst).unwrap()
}

const SAMPLE: &str = r#"package org.example.rules;

import org.example.model.Person;
import static org.example.Util.*;

global java.util.List<String> names;

function String greet(String name) {
    return "Hello " + name;
}

query "people over" (int minAge)
    $p : Person( age > minAge )
end

declare Address
    street : String
    zip : int
end

rule "Adults" extends "Base"
    salience 10
    no-loop
when
    $p : Person( $n : name, age > 18 )
    not Pet( owner == $p ) from $pets
then
    names.add($n);
end
"#;

#[test]
fn test_compilation_unit_declarations() {
    let unit = unit(SAMPLE);
    assert_eq!(unit.package().unwrap().name().unwrap(), "org.example.rules");

    let imports: Vec<_> = unit.imports().collect();
    assert_eq!(imports.len(), 2);
    assert_eq!(imports[0].path().unwrap(), "org.example.model.Person");
    assert!(!imports[0].is_static());
    assert_eq!(imports[1].path().unwrap(), "org.example.Util.*");
    assert!(imports[1].is_static());

    let global = unit.globals().next().unwrap();
    assert_eq!(global.type_name().unwrap(), "java.util.List<String>");
    assert_eq!(global.name().unwrap(), "names");

    let function = unit.functions().next().unwrap();
    assert_eq!(function.name().unwrap(), "greet");
    assert_eq!(function.return_type().unwrap(), "String");
    assert_eq!(function.parameters(), vec!["name"]);
    assert!(function.body().unwrap().contains("return"));

    let query = unit.queries().next().unwrap();
    assert_eq!(query.name().unwrap(), "people over");
    assert_eq!(query.parameters(), vec!["minAge"]);
    assert_eq!(query.patterns().count(), 1);

    let declare = unit.declares().next().unwrap();
    assert_eq!(declare.name().unwrap(), "Address");
    assert_eq!(
        declare.fields(),
        vec![
            ("street".to_string(), "String".to_string()),
            ("zip".to_string(), "int".to_string())
        ]
    );
    assert_eq!(unit.errors().count(), 0);
}

#[test]
fn test_rule_accessors() {
    let unit = unit(SAMPLE);
    let rule = unit.rules().next().unwrap();
    assert_eq!(rule.name().unwrap(), "Adults");
    assert_eq!(rule.parent().unwrap(), "Base");

    let keys: Vec<_> = rule.attributes().filter_map(|a| a.key()).collect();
    assert_eq!(keys, vec!["salience", "no-loop"]);
    let salience = rule.attribute("salience").unwrap();
    assert!(salience.is_known());
    assert_eq!(salience.value().unwrap(), "10");
    assert!(rule.attribute("no-loop").unwrap().value().is_none());

    let when = rule.when_clause().unwrap();
    assert_eq!(when.elements().count(), 2);
    let patterns: Vec<_> = when.patterns().collect();
    assert_eq!(patterns.len(), 2);
    assert_eq!(patterns[0].binding().unwrap(), "$p");
    assert_eq!(patterns[0].type_name().unwrap(), "Person");
    assert!(patterns[1].from_clause().is_some());

    let constraints: Vec<_> = patterns[0].constraints().collect();
    assert_eq!(constraints.len(), 2);
    assert_eq!(constraints[0].binding().unwrap(), "$n");
    assert_eq!(
        constraints[1].expr().unwrap().kind(),
        DrlSyntaxKind::RelationalExpr
    );

    let action = rule.then_clause().unwrap().action().unwrap();
    assert_eq!(action.text(), "names.add($n);");
}

#[test]
fn test_empty_consequence() {
    let unit = unit("rule R when then end");
    let action = unit
        .rules()
        .next()
        .and_then(|r| r.then_clause())
        .and_then(|t| t.action())
        .unwrap();
    assert!(action.is_empty());
    assert_eq!(action.text(), "");
}

#[test]
fn test_unknown_attribute_is_not_known() {
    let unit = unit("rule R priority 5 when then end");
    let attribute = unit.rules().next().unwrap().attributes().next().unwrap();
    assert_eq!(attribute.key().unwrap(), "priority");
    assert!(!attribute.is_known());
}

#[test]
fn test_relational_and_operator_accessors() {
    let unit = unit("rule R when Person( name not ##likes[fuzzy] \"Mark\" ) then end");
    let pattern = unit.rules().next().unwrap().when_clause().unwrap().patterns().next().unwrap();
    let expr = pattern.constraints().next().unwrap().expr().unwrap();
    let relational = expr.as_relational().unwrap();

    assert_eq!(relational.lhs().unwrap().syntax().text().to_string(), "name");
    assert_eq!(relational.rhs().unwrap().text().to_string(), "\"Mark\"");

    let operator = relational.operator().unwrap();
    assert!(operator.is_negated());
    assert!(operator.is_prefixed());
    assert!(operator.is_identifier());
    assert_eq!(operator.name().unwrap(), "likes");
    assert_eq!(operator.params().unwrap(), "[fuzzy]");
}

#[test]
fn test_half_constraint_accessors() {
    let unit = unit("rule R when Person( age > 30 || < 20 ) then end");
    let pattern = unit.rules().next().unwrap().when_clause().unwrap().patterns().next().unwrap();
    let expr = pattern.constraints().next().unwrap().expr().unwrap();
    assert_eq!(expr.binary_operator().unwrap().text(), "||");

    let operands: Vec<_> = expr.operands().collect();
    assert_eq!(operands.len(), 2);
    let half = operands[1].as_half_constraint().unwrap();
    assert_eq!(half.operator().unwrap().name().unwrap(), "<");
    assert_eq!(half.rhs().unwrap().text().to_string(), "20");
}
