//! Property-based tests for lossless lexing and parsing
//!
//! Arbitrary input must never panic, token texts must concatenate back to
//! the input with contiguous spans, and the parsed tree must re-serialize
//! to the input byte for byte.

use drl_core::cst::{DrlSyntaxKind, lex_with_trivia, parse_drl};
use proptest::prelude::*;

/// Fragments that push the lexer and parser through their interesting states
fn drl_soup() -> impl Strategy<Value = String> {
    let pieces = prop::sample::select(vec![
        "rule ", "\"R\" ", "when", " then ", " end", "\n", "\r\n", "\r", "$p : ", "Person(", ")",
        "age > 18", " || ", " && ", "< 20", ", ", "not ", "##", "supersetOf", "salience 10 ",
        "agenda-group \"g\" ", "no-loop ", "// c\n", "/* b */", "/*", "\"open", "'x'", "{", "}",
        "foo();", "from ", "accumulate(", "1.5e3d", "0x1F", "10s", "\u{e9}", "\u{1f600}", "@",
        "#", "!.", "..", "-", "a-b", "query ", "declare ", "function ", "import ", "package ",
    ]);
    prop::collection::vec(pieces, 0..40).prop_map(|pieces| pieces.concat())
}

proptest! {
    #[test]
    fn lexer_is_lossless_on_arbitrary_strings(input in any::<String>()) {
        let (tokens, _errors) = lex_with_trivia(&input);
        let text: String = tokens.iter().map(|t| t.text.as_str()).collect();
        prop_assert_eq!(&text, &input);

        let mut offset = 0;
        for token in &tokens {
            prop_assert_eq!(token.span.start, offset);
            prop_assert_eq!(&input[token.span.clone()], token.text.as_str());
            offset = token.span.end;
        }
        prop_assert_eq!(offset, input.len());
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(DrlSyntaxKind::Eof));
    }

    #[test]
    fn lexer_is_lossless_on_drl_like_input(input in drl_soup()) {
        let (tokens, _errors) = lex_with_trivia(&input);
        let text: String = tokens.iter().map(|t| t.text.as_str()).collect();
        prop_assert_eq!(text, input);
    }

    #[test]
    fn parser_round_trips_arbitrary_strings(input in any::<String>()) {
        let (cst, _, _) = parse_drl(&input);
        prop_assert_eq!(cst.text().to_string(), input);
    }

    #[test]
    fn parser_round_trips_drl_like_input(input in drl_soup()) {
        let (cst, _, _) = parse_drl(&input);
        prop_assert_eq!(cst.kind(), DrlSyntaxKind::CompilationUnit);
        prop_assert_eq!(cst.text().to_string(), input);
    }
}
