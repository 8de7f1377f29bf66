//! Parser tests through the public API
//!
//! This module tests:
//! - Lossless round trips of realistic DRL files
//! - Error recovery bounded to one declaration
//! - Rule order and the typed AST view of a parsed file
//! - Hard failures for empty and undecodable input

use drl_core::cst::ast::{AstNode, CompilationUnit};
use drl_core::{DiagnosticKind, DrlError, DrlSyntaxKind, ParserConfig, parse, parse_bytes, parse_many};

const ROUND_TRIP_SAMPLES: &[&str] = &[
    "",
    "rule R when then end",
    "rule \"R\" when $a : Person( age > 18 ) then System.out.println($a); end",
    "package org.example;\r\n\r\nimport org.example.Person;\r\nrule R\r\n  salience 10\r\nwhen\r\n  Person()\r\nthen\r\nend\r\n",
    "/* header */\n// line\n\n\nrule   \"spaced\"   when   then   end   \n\n",
    "rule R\n    date-effective \"1-Jan-2020\"\n    timer (int: 1s 5m)\n    calendars \"weekdays\", \"holidays\"\nwhen\n    $p : Person( name matches \"M.*\", age in (18, 21), this != null )\n    exists Pet( owner == $p )\n    accumulate( Order( $v : value ); $total : sum( $v ) )\nthen\n    if ($p != null) {\n        modify($p) { setAge(1) };\n    }\nend\n",
    "rule R when\n  $e : Event() over window:time( 5m )\n  $t : Ticket( this after[1s,10s] $e ) from entry-point \"tickets\"\nthen end",
    "rule R when Person( age > 30 || < 20 && != 25 ) then end",
    "rule broken when Person( age > ) then end\nrule ok when then end",
    "rule \"unterminated string\" when Person( name == \"abc ) then end",
    "garbage ### tokens\0 \u{1f600}\nrule R when then end",
    "rule R when then end /* open comment",
];

#[test]
fn test_round_trip_is_exact() {
    let config = ParserConfig {
        reject_empty: false,
        ..ParserConfig::default()
    };
    for source in ROUND_TRIP_SAMPLES {
        let output = drl_core::parse_with_config(source, "sample.drl", &config).unwrap();
        assert_eq!(&output.tree.text(), source, "round trip failed for {source:?}");
        assert_eq!(output.tree.text_len(), source.len());
    }
}

#[test]
fn test_parsing_is_deterministic() {
    let source = "rule A when Person( age > ) then end\nrule B when X() then end\n";
    let first = parse(source, "a.drl").unwrap();
    let second = parse(source, "a.drl").unwrap();
    assert_eq!(first.tree.green(), second.tree.green());
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn test_concrete_rule() {
    let source = "rule \"R\" when $a : Person( age > 18 ) then System.out.println($a); end";
    let output = parse(source, "concrete.drl").unwrap();
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.tree.text(), source);

    let unit = CompilationUnit::cast(output.tree.root()).unwrap();
    let rules: Vec<_> = unit.rules().collect();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].name().as_deref(), Some("R"));

    let patterns: Vec<_> = rules[0].when_clause().unwrap().patterns().collect();
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].binding().as_deref(), Some("$a"));
    assert_eq!(patterns[0].type_name().as_deref(), Some("Person"));

    let constraints: Vec<_> = patterns[0].constraints().collect();
    assert_eq!(constraints.len(), 1);
    assert_eq!(constraints[0].syntax().text().to_string(), "age > 18");
    let relational = constraints[0].expr().unwrap().as_relational().unwrap();
    assert_eq!(relational.lhs().unwrap().syntax().text().to_string(), "age");
    assert_eq!(relational.operator().unwrap().syntax().text().to_string(), ">");

    let action = rules[0].then_clause().unwrap().action().unwrap();
    assert_eq!(action.text(), "System.out.println($a);");
}

#[test]
fn test_rule_order_is_preserved() {
    let source = "rule R1 when then end\nrule R2 when then end\nrule R3 when then end\n";
    let output = parse(source, "order.drl").unwrap();
    let unit = CompilationUnit::cast(output.tree.root()).unwrap();
    let names: Vec<_> = unit.rules().filter_map(|r| r.name()).collect();
    assert_eq!(names, vec!["R1", "R2", "R3"]);
}

#[test]
fn test_one_bad_pattern_is_one_diagnostic() {
    let with_error = "rule A when\n    Person( age > 18 )\nthen\n    a();\nend\n\n\
                      rule B when\n    Person( age > )\nthen\n    b();\nend\n\n\
                      rule C when\n    Pet()\nthen\n    c();\nend\n";
    let output = parse(with_error, "errors.drl").unwrap();
    let errors: Vec<_> = output.diagnostics.iter().filter(|d| d.is_error()).collect();
    assert_eq!(errors.len(), 1, "diagnostics: {:?}", output.diagnostics);
    assert_eq!(errors[0].kind, DiagnosticKind::SyntaxError);
    assert_eq!(errors[0].location.line, 8);

    // rule B keeps its consequence
    let unit = CompilationUnit::cast(output.tree.root()).unwrap();
    let rule_b = unit.rules().nth(1).unwrap();
    assert_eq!(rule_b.then_clause().unwrap().action().unwrap().text(), "b();");

    // the other rules parse exactly as they do without rule B
    let without_b = "rule A when\n    Person( age > 18 )\nthen\n    a();\nend\n\n\
                     rule C when\n    Pet()\nthen\n    c();\nend\n";
    let clean = parse(without_b, "clean.drl").unwrap();
    assert!(clean.diagnostics.is_empty());
    let clean_unit = CompilationUnit::cast(clean.tree.root()).unwrap();

    let texts = |unit: &CompilationUnit| -> Vec<String> {
        unit.rules()
            .filter(|r| r.name().as_deref() != Some("B"))
            .map(|r| r.syntax().text().to_string().trim().to_string())
            .collect()
    };
    assert_eq!(texts(&unit), texts(&clean_unit));
}

#[test]
fn test_unknown_attribute_is_a_warning() {
    let output = parse("rule R\n    priority 5\nwhen then end", "attr.drl").unwrap();
    assert_eq!(output.diagnostics.len(), 1);
    let diagnostic = &output.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::SemanticWarning);
    assert!(!diagnostic.is_error());
    assert!(!output.has_errors());
    assert_eq!(diagnostic.location.line, 2);
    assert_eq!(diagnostic.location.column, 5);
}

#[test]
fn test_lexer_errors_are_reported() {
    let source = "rule R when Person( name == \"abc ) then end";
    let output = parse(source, "lex.drl").unwrap();
    assert!(
        output
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::LexError)
    );
    assert_eq!(output.tree.text(), source);
}

#[test]
fn test_diagnostics_are_sorted_by_offset() {
    let source = "rule A when Person( age > ) then end\nrule B\n  priority 1\nwhen then end\n";
    let output = parse(source, "sorted.drl").unwrap();
    let starts: Vec<_> = output
        .diagnostics
        .iter()
        .map(|d| d.location.span.start)
        .collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
    assert!(starts.len() >= 2);
}

#[test]
fn test_empty_input_is_a_hard_failure() {
    for source in ["", "   \n\t"] {
        let err = parse(source, "empty.drl").unwrap_err();
        assert!(matches!(err, DrlError::EmptyInput { ref source_id } if source_id == "empty.drl"));
    }

    let lenient = ParserConfig {
        reject_empty: false,
        ..ParserConfig::default()
    };
    let output = drl_core::parse_with_config("", "empty.drl", &lenient).unwrap();
    assert_eq!(output.tree.root().kind(), DrlSyntaxKind::CompilationUnit);
    assert_eq!(output.tree.text(), "");
}

#[test]
fn test_invalid_utf8_is_a_hard_failure() {
    let bytes = b"rule R when \xff then end";
    let err = parse_bytes(bytes, "bytes.drl", &ParserConfig::default()).unwrap_err();
    assert!(matches!(err, DrlError::InvalidUtf8 { offset: 12, .. }));

    let ok = parse_bytes(b"rule R when then end", "bytes.drl", &ParserConfig::default()).unwrap();
    assert_eq!(ok.tree.text(), "rule R when then end");
}

#[test]
fn test_max_errors_limits_reported_errors() {
    let source = "rule A when X( a > ) then end\nrule B when Y( b > ) then end\nrule C when Z( c > ) then end\n";
    let config = ParserConfig {
        max_errors: 1,
        ..ParserConfig::default()
    };
    let output = drl_core::parse_with_config(source, "limit.drl", &config).unwrap();
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.tree.text(), source);
}

#[test]
fn test_parse_many_keeps_input_order() {
    let inputs = vec![
        ("a.drl".to_string(), "rule A when then end".to_string()),
        ("b.drl".to_string(), String::new()),
        ("c.drl".to_string(), "rule C when X( ) then end".to_string()),
    ];
    let results = parse_many(&inputs, &ParserConfig::default());
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().tree.source_id(), "a.drl");
    assert!(matches!(results[1], Err(DrlError::EmptyInput { .. })));
    assert_eq!(
        results[2].as_ref().unwrap().tree.text(),
        "rule C when X( ) then end"
    );
}
