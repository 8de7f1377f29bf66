//! Hierarchical parser for DRL
//!
//! A hand-written recursive descent parser that builds a lossless CST from the
//! token stream. Grammar decisions look only at significant tokens; trivia is
//! still added to the tree in source order.
//!
//! Trivia ownership:
//! - top-level declarations own the blank lines and comments before them and
//!   the trivia up to and including the first newline after them
//! - inner nodes start at their first significant token and end at their last
//!
//! Error recovery records one `ParseError`, wraps the offending tokens in an
//! `Error` node and resynchronizes at the next boundary keyword (inside a
//! `when` clause it tries `then` first).

mod expressions;
mod lhs;

use rowan::{Checkpoint, GreenNode};
use tracing::debug;

use super::lexer::{CstSpan, LexerError};
use super::{CstBuilder, CstToken, DrlSyntaxKind, DrlSyntaxNode, lex_with_trivia};

/// Kind of syntax error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A token that does not fit the grammar at this point
    UnexpectedToken,
    /// A required token is absent
    MissingToken,
    /// The input ended inside a declaration
    UnexpectedEof,
    /// An identifier in rule attribute position that is not a known attribute
    UnknownAttribute,
}

/// A syntax error (or warning) found while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub span: CstSpan,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    /// Warnings do not make the input invalid
    pub fn is_warning(&self) -> bool {
        self.kind == ParseErrorKind::UnknownAttribute
    }
}

/// Parse DRL source into a hierarchical CST
///
/// # Example
///
/// ```rust
/// use drl_core::cst::parse_drl;
///
/// let source = "rule \"R\" when $a : Person( age > 18 ) then System.out.println($a); end";
/// let (cst, lexer_errors, parse_errors) = parse_drl(source);
/// assert!(lexer_errors.is_empty() && parse_errors.is_empty());
/// assert_eq!(cst.text().to_string(), source);
/// ```
pub fn parse_drl(source: &str) -> (DrlSyntaxNode, Vec<LexerError>, Vec<ParseError>) {
    let (green, lexer_errors, parse_errors) = parse_green(source, usize::MAX);
    (DrlSyntaxNode::new_root(green), lexer_errors, parse_errors)
}

/// Parse DRL source into a green tree, recording at most `max_errors` syntax errors
pub(crate) fn parse_green(
    source: &str,
    max_errors: usize,
) -> (GreenNode, Vec<LexerError>, Vec<ParseError>) {
    let (tokens, lexer_errors) = lex_with_trivia(source);
    let mut parser = Parser::new(&tokens, max_errors);
    parser.parse_compilation_unit();
    let (green, parse_errors) = parser.finish();
    debug!(
        tokens = tokens.len(),
        lexer_errors = lexer_errors.len(),
        parse_errors = parse_errors.len(),
        "parsed DRL source"
    );
    (green, lexer_errors, parse_errors)
}

/// Entry points for parsing a standalone fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fragment {
    Pattern,
    Constraint,
    Expression,
    Attribute,
    Rule,
}

impl Fragment {
    /// Node kind the fragment must produce; expressions may produce any
    pub(crate) fn expected_kind(self) -> Option<DrlSyntaxKind> {
        match self {
            Fragment::Pattern => Some(DrlSyntaxKind::Pattern),
            Fragment::Constraint => Some(DrlSyntaxKind::Constraint),
            Fragment::Expression => None,
            Fragment::Attribute => Some(DrlSyntaxKind::Attribute),
            Fragment::Rule => Some(DrlSyntaxKind::RuleDecl),
        }
    }
}

/// Parse a fragment and return the green node it produced
///
/// Fails when the fragment has syntax errors or leaves tokens unconsumed.
pub(crate) fn parse_fragment(source: &str, fragment: Fragment) -> Result<GreenNode, String> {
    let (tokens, lexer_errors) = lex_with_trivia(source);
    if let Some(error) = lexer_errors.first() {
        return Err(error.message.clone());
    }

    let mut parser = Parser::new(&tokens, usize::MAX);
    parser.builder.start_node(DrlSyntaxKind::CompilationUnit);
    match fragment {
        Fragment::Pattern => parser.parse_pattern(),
        Fragment::Constraint => parser.parse_constraint(),
        Fragment::Expression => parser.parse_expr(),
        Fragment::Attribute => parser.parse_attribute(),
        Fragment::Rule => parser.parse_rule(),
    }
    if !parser.at(DrlSyntaxKind::Eof) {
        let found = parser.current();
        return Err(format!("unexpected {found} after fragment"));
    }
    parser.eat_trivia();
    parser.builder.finish_node();
    let (green, errors) = parser.finish();
    if let Some(error) = errors.iter().find(|e| !e.is_warning()) {
        return Err(error.message.clone());
    }

    let root = DrlSyntaxNode::new_root(green);
    root.children()
        .next()
        .filter(|node| {
            fragment
                .expected_kind()
                .is_none_or(|kind| node.kind() == kind)
        })
        .map(|node| node.green().into_owned())
        .ok_or_else(|| format!("fragment did not produce a {fragment:?}"))
}

/// Token stream parser
struct Parser<'a> {
    tokens: &'a [CstToken],
    pos: usize,
    builder: CstBuilder,
    errors: Vec<ParseError>,
    max_errors: usize,
    /// Set after a syntax error until the parser resynchronizes
    recovering: bool,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [CstToken], max_errors: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: CstBuilder::new(),
            errors: Vec::new(),
            max_errors,
            recovering: false,
        }
    }

    fn finish(self) -> (GreenNode, Vec<ParseError>) {
        (self.builder.finish_green(), self.errors)
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// Parse the top-level compilation unit
    fn parse_compilation_unit(&mut self) {
        self.builder.start_node(DrlSyntaxKind::CompilationUnit);

        loop {
            self.recovering = false;
            match self.current() {
                DrlSyntaxKind::Eof => break,
                DrlSyntaxKind::PackageKw => self.parse_package(),
                DrlSyntaxKind::ImportKw => self.parse_import(),
                DrlSyntaxKind::GlobalKw => self.parse_global(),
                DrlSyntaxKind::FunctionKw => self.parse_function(),
                DrlSyntaxKind::QueryKw => self.parse_query(),
                DrlSyntaxKind::DeclareKw => self.parse_declare(),
                DrlSyntaxKind::RuleKw => self.parse_rule(),
                _ => self.parse_top_level_error(),
            }
        }

        // Trailing trivia of the file
        self.eat_trivia();
        self.builder.finish_node(); // COMPILATION_UNIT
    }

    /// Grammar: package a.b.c ;?
    fn parse_package(&mut self) {
        self.builder.start_node(DrlSyntaxKind::PackageDecl);
        self.bump(); // package
        self.parse_qualified_name();
        self.eat(DrlSyntaxKind::Semicolon);
        self.eat_trailing_trivia();
        self.builder.finish_node(); // PACKAGE_DECL
    }

    /// Grammar: import [static | function] a.b.C[.*] ;?
    fn parse_import(&mut self) {
        self.builder.start_node(DrlSyntaxKind::ImportDecl);
        self.bump(); // import
        if !self.eat(DrlSyntaxKind::StaticKw) {
            self.eat(DrlSyntaxKind::FunctionKw);
        }
        self.parse_qualified_name();
        if self.at(DrlSyntaxKind::Dot) && self.nth(1) == DrlSyntaxKind::Star {
            self.bump();
            self.bump();
        }
        self.eat(DrlSyntaxKind::Semicolon);
        self.eat_trailing_trivia();
        self.builder.finish_node(); // IMPORT_DECL
    }

    /// Grammar: global Type name ;?
    fn parse_global(&mut self) {
        self.builder.start_node(DrlSyntaxKind::GlobalDecl);
        self.bump(); // global
        self.parse_type_ref();
        self.expect_name("global name");
        self.eat(DrlSyntaxKind::Semicolon);
        self.eat_trailing_trivia();
        self.builder.finish_node(); // GLOBAL_DECL
    }

    /// Grammar: function Type name ( params ) { body }
    fn parse_function(&mut self) {
        self.builder.start_node(DrlSyntaxKind::FunctionDecl);
        self.bump(); // function
        self.parse_type_ref();
        self.expect_name("function name");
        if self.at(DrlSyntaxKind::LParen) {
            self.parse_parameter_list();
        } else {
            self.error(ParseErrorKind::MissingToken, "expected '(' after function name");
        }

        if self.at(DrlSyntaxKind::LBrace) {
            self.start_node(DrlSyntaxKind::FunctionBody);
            self.bump_balanced();
            self.builder.finish_node(); // FUNCTION_BODY
        } else {
            self.error(ParseErrorKind::MissingToken, "expected '{' to open the function body");
            self.recover_to(&[]);
        }

        self.eat_trailing_trivia();
        self.builder.finish_node(); // FUNCTION_DECL
    }

    /// Grammar: query "name" ( params )? conditional-element* end
    fn parse_query(&mut self) {
        self.builder.start_node(DrlSyntaxKind::QueryDecl);
        self.bump(); // query
        self.parse_decl_name("query name");
        if self.at(DrlSyntaxKind::LParen) {
            self.parse_parameter_list();
        }
        self.parse_lhs_elements();
        self.expect_end("query");
        self.eat_trailing_trivia();
        self.builder.finish_node(); // QUERY_DECL
    }

    /// Grammar: declare [trait] Name [extends Super] annotation* field* end
    fn parse_declare(&mut self) {
        self.builder.start_node(DrlSyntaxKind::DeclareDecl);
        self.bump(); // declare
        self.eat(DrlSyntaxKind::TraitKw);
        self.parse_qualified_name();

        if self.at(DrlSyntaxKind::ExtendsKw) {
            self.bump();
            self.parse_qualified_name();
            while self.eat(DrlSyntaxKind::Comma) {
                self.parse_qualified_name();
            }
        }

        while self.at(DrlSyntaxKind::At) {
            self.parse_annotation();
        }

        loop {
            let current = self.current();
            if current == DrlSyntaxKind::Eof || current.is_boundary_keyword() {
                break;
            }
            if self.at_name() && self.nth(1) == DrlSyntaxKind::Colon {
                self.parse_field();
            } else {
                self.error(
                    ParseErrorKind::UnexpectedToken,
                    format!("expected field declaration, found {current}"),
                );
                self.recover_to(&[]);
            }
        }

        self.expect_end("declare");
        self.eat_trailing_trivia();
        self.builder.finish_node(); // DECLARE_DECL
    }

    /// Grammar: name : Type (= init)? annotation*
    fn parse_field(&mut self) {
        self.start_node(DrlSyntaxKind::FieldDecl);
        self.bump(); // name
        self.bump(); // :
        self.parse_type_ref();
        if self.eat(DrlSyntaxKind::Eq) {
            self.parse_expr();
        }
        while self.at(DrlSyntaxKind::At) {
            self.parse_annotation();
        }
        self.builder.finish_node(); // FIELD_DECL
    }

    /// Grammar: rule name [extends parent] annotation* attributes? when lhs then action end
    fn parse_rule(&mut self) {
        self.builder.start_node(DrlSyntaxKind::RuleDecl);
        self.bump(); // rule
        self.parse_decl_name("rule name");

        if self.at(DrlSyntaxKind::ExtendsKw) {
            self.start_node(DrlSyntaxKind::RuleExtends);
            self.bump();
            if self.at(DrlSyntaxKind::StringLit) || self.at_name() {
                self.bump();
            } else {
                self.error(ParseErrorKind::MissingToken, "expected parent rule name");
            }
            self.builder.finish_node(); // RULE_EXTENDS
        }

        while self.at(DrlSyntaxKind::At) {
            self.parse_annotation();
        }

        if self.at_attribute_start() {
            self.parse_attribute_list();
        }

        if !self.at(DrlSyntaxKind::WhenKw) {
            let found = self.current();
            self.error(
                ParseErrorKind::MissingToken,
                format!("expected 'when', found {found}"),
            );
            self.recover_to(&[DrlSyntaxKind::WhenKw, DrlSyntaxKind::ThenKw]);
        }
        if self.at(DrlSyntaxKind::WhenKw) {
            self.parse_when_clause();
        }

        if !self.at(DrlSyntaxKind::ThenKw) {
            let found = self.current();
            self.error(
                ParseErrorKind::MissingToken,
                format!("expected 'then', found {found}"),
            );
            self.recover_to(&[DrlSyntaxKind::ThenKw]);
        }
        if self.at(DrlSyntaxKind::ThenKw) {
            self.parse_then_clause();
        }

        self.expect_end("rule");
        self.eat_trailing_trivia();
        self.builder.finish_node(); // RULE_DECL
    }

    /// Rule or query name: a string literal or an identifier
    fn parse_decl_name(&mut self, what: &str) {
        if self.at(DrlSyntaxKind::StringLit) || self.at_name() {
            self.start_node(DrlSyntaxKind::RuleName);
            self.bump();
            self.builder.finish_node(); // RULE_NAME
        } else {
            let found = self.current();
            self.error(
                ParseErrorKind::MissingToken,
                format!("expected {what}, found {found}"),
            );
        }
    }

    fn at_attribute_start(&self) -> bool {
        let current = self.current();
        current.is_attribute_keyword() || current == DrlSyntaxKind::Ident
    }

    /// Attributes between the rule header and `when`
    fn parse_attribute_list(&mut self) {
        self.start_node(DrlSyntaxKind::AttributeList);
        loop {
            match self.current() {
                DrlSyntaxKind::AttributesKw => {
                    self.bump();
                    self.eat(DrlSyntaxKind::Colon);
                }
                DrlSyntaxKind::Comma => self.bump(),
                kind if kind.is_attribute_keyword() || kind == DrlSyntaxKind::Ident => {
                    self.parse_attribute();
                }
                _ => break,
            }
        }
        self.builder.finish_node(); // ATTRIBUTE_LIST
    }

    /// Grammar: key value?
    ///
    /// Values are string lists (`calendars "a", "b"`), numbers (optionally
    /// negative), booleans, or balanced parenthesized text.
    fn parse_attribute(&mut self) {
        self.start_node(DrlSyntaxKind::Attribute);

        let key = self.current();
        if key == DrlSyntaxKind::Ident {
            let (text, span) = self
                .current_token()
                .map(|t| (t.text.clone(), t.span.clone()))
                .unwrap_or_default();
            self.warning(format!("unknown rule attribute '{text}'"), span);
        }
        self.bump(); // key

        match self.current() {
            DrlSyntaxKind::StringLit => {
                self.start_node(DrlSyntaxKind::AttributeValue);
                self.bump();
                while self.at(DrlSyntaxKind::Comma) && self.nth(1) == DrlSyntaxKind::StringLit {
                    self.bump();
                    self.bump();
                }
                self.builder.finish_node(); // ATTRIBUTE_VALUE
            }
            DrlSyntaxKind::IntLit
            | DrlSyntaxKind::FloatLit
            | DrlSyntaxKind::TrueKw
            | DrlSyntaxKind::FalseKw => {
                self.start_node(DrlSyntaxKind::AttributeValue);
                self.bump();
                self.builder.finish_node(); // ATTRIBUTE_VALUE
            }
            DrlSyntaxKind::Minus
                if matches!(self.nth(1), DrlSyntaxKind::IntLit | DrlSyntaxKind::FloatLit) =>
            {
                self.start_node(DrlSyntaxKind::AttributeValue);
                self.bump();
                self.bump();
                self.builder.finish_node(); // ATTRIBUTE_VALUE
            }
            DrlSyntaxKind::LParen => {
                self.start_node(DrlSyntaxKind::AttributeValue);
                self.bump_balanced();
                self.builder.finish_node(); // ATTRIBUTE_VALUE
            }
            _ => {}
        }

        self.builder.finish_node(); // ATTRIBUTE
    }

    /// Grammar: when conditional-element*
    fn parse_when_clause(&mut self) {
        self.start_node(DrlSyntaxKind::WhenClause);
        self.bump(); // when
        self.eat(DrlSyntaxKind::Colon);
        self.parse_lhs_elements();
        self.builder.finish_node(); // WHEN_CLAUSE
    }

    /// Grammar: then action-text?
    fn parse_then_clause(&mut self) {
        self.start_node(DrlSyntaxKind::ThenClause);
        self.bump(); // then
        self.start_node(DrlSyntaxKind::ActionBlock);
        if self.at(DrlSyntaxKind::ActionText) {
            self.bump();
        }
        self.builder.finish_node(); // ACTION_BLOCK
        self.builder.finish_node(); // THEN_CLAUSE
    }

    fn expect_end(&mut self, what: &str) {
        if self.eat(DrlSyntaxKind::EndKw) {
            return;
        }
        if self.at(DrlSyntaxKind::Eof) {
            self.error(
                ParseErrorKind::UnexpectedEof,
                format!("unexpected end of file, {what} is missing 'end'"),
            );
        } else {
            let found = self.current();
            self.error(
                ParseErrorKind::MissingToken,
                format!("expected 'end' to close {what}, found {found}"),
            );
        }
    }

    /// Grammar: @ name ( balanced )?
    fn parse_annotation(&mut self) {
        self.start_node(DrlSyntaxKind::Annotation);
        self.bump(); // @
        self.parse_qualified_name();
        if self.at(DrlSyntaxKind::LParen) {
            self.bump_balanced();
        }
        self.builder.finish_node(); // ANNOTATION
    }

    /// Grammar: ( (Type? name) (, Type? name)* )
    fn parse_parameter_list(&mut self) {
        self.start_node(DrlSyntaxKind::ParameterList);
        self.bump(); // (
        if !self.at(DrlSyntaxKind::RParen) {
            loop {
                self.start_node(DrlSyntaxKind::Parameter);
                self.parse_type_ref();
                if self.at_name() {
                    self.bump();
                }
                self.builder.finish_node(); // PARAMETER
                if !self.eat(DrlSyntaxKind::Comma) {
                    break;
                }
            }
        }
        self.expect(DrlSyntaxKind::RParen);
        self.builder.finish_node(); // PARAMETER_LIST
    }

    /// Grammar: name (. name)*
    fn parse_qualified_name(&mut self) {
        if !self.at_name() {
            let found = self.current();
            self.error(
                ParseErrorKind::MissingToken,
                format!("expected name, found {found}"),
            );
            return;
        }
        self.start_node(DrlSyntaxKind::QualifiedName);
        self.bump();
        while self.at(DrlSyntaxKind::Dot) && self.nth_is_name(1) {
            self.bump();
            self.bump();
        }
        self.builder.finish_node(); // QUALIFIED_NAME
    }

    /// Grammar: QualifiedName (< ... >)? ([ ])*
    fn parse_type_ref(&mut self) {
        if !self.at_name() {
            let found = self.current();
            self.error(
                ParseErrorKind::MissingToken,
                format!("expected type, found {found}"),
            );
            return;
        }
        self.start_node(DrlSyntaxKind::TypeRef);
        self.parse_qualified_name();
        if self.at(DrlSyntaxKind::Lt) {
            let mut depth = 0usize;
            loop {
                match self.current() {
                    DrlSyntaxKind::Lt => depth += 1,
                    DrlSyntaxKind::Gt => depth = depth.saturating_sub(1),
                    DrlSyntaxKind::Eof => break,
                    _ => {}
                }
                self.bump();
                if depth == 0 {
                    break;
                }
            }
        }
        while self.at(DrlSyntaxKind::LBracket) && self.nth(1) == DrlSyntaxKind::RBracket {
            self.bump();
            self.bump();
        }
        self.builder.finish_node(); // TYPE_REF
    }

    fn expect_name(&mut self, what: &str) {
        if self.at_name() {
            self.bump();
        } else {
            let found = self.current();
            self.error(
                ParseErrorKind::MissingToken,
                format!("expected {what}, found {found}"),
            );
        }
    }

    /// Unknown top-level content: consume it as an error up to the next declaration
    fn parse_top_level_error(&mut self) {
        self.builder.start_node(DrlSyntaxKind::Error);
        let found = self.current();
        self.error(
            ParseErrorKind::UnexpectedToken,
            format!("expected a declaration, found {found}"),
        );
        self.bump();
        while !self.at(DrlSyntaxKind::Eof) && !self.at_declaration_start() {
            self.bump();
        }
        self.eat_trailing_trivia();
        self.builder.finish_node(); // ERROR
    }

    fn at_declaration_start(&self) -> bool {
        let current = self.current();
        current.is_boundary_keyword() && current != DrlSyntaxKind::EndKw
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    /// Index of the n-th significant token from the current position
    fn nth_index(&self, n: usize) -> Option<usize> {
        self.tokens
            .iter()
            .enumerate()
            .skip(self.pos)
            .filter(|(_, t)| !t.is_trivia())
            .nth(n)
            .map(|(idx, _)| idx)
    }

    fn nth(&self, n: usize) -> DrlSyntaxKind {
        self.nth_index(n)
            .map(|idx| self.tokens[idx].kind)
            .unwrap_or(DrlSyntaxKind::Eof)
    }

    fn current(&self) -> DrlSyntaxKind {
        self.nth(0)
    }

    fn current_token(&self) -> Option<&CstToken> {
        self.nth_index(0).map(|idx| &self.tokens[idx])
    }

    fn at(&self, kind: DrlSyntaxKind) -> bool {
        self.current() == kind
    }

    fn is_name(kind: DrlSyntaxKind) -> bool {
        kind == DrlSyntaxKind::Ident || kind.is_soft_keyword()
    }

    fn at_name(&self) -> bool {
        Self::is_name(self.current())
    }

    fn nth_is_name(&self, n: usize) -> bool {
        Self::is_name(self.nth(n))
    }

    /// True when the current significant token directly follows the previous
    /// one, with no trivia in between
    fn current_is_adjacent(&self) -> bool {
        self.tokens.get(self.pos).is_some_and(|t| !t.is_trivia())
    }

    /// Add pending trivia to the currently open node
    fn eat_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.is_trivia() {
                break;
            }
            self.builder.add_token(token);
            self.pos += 1;
        }
    }

    /// Trivia after a top-level declaration, up to and including the first newline
    fn eat_trailing_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            match token.kind {
                DrlSyntaxKind::Whitespace
                | DrlSyntaxKind::CommentLine
                | DrlSyntaxKind::CommentBlock => {
                    self.builder.add_token(token);
                    self.pos += 1;
                }
                DrlSyntaxKind::Newline => {
                    self.builder.add_token(token);
                    self.pos += 1;
                    break;
                }
                _ => break,
            }
        }
    }

    /// Add the current significant token (and the trivia before it)
    fn bump(&mut self) {
        self.eat_trivia();
        if let Some(token) = self.tokens.get(self.pos)
            && token.kind != DrlSyntaxKind::Eof
        {
            self.builder.add_token(token);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: DrlSyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: DrlSyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        let found = self.current();
        self.error(
            ParseErrorKind::MissingToken,
            format!("expected {kind}, found {found}"),
        );
        false
    }

    /// Bump a bracketed group as raw tokens, including the closing bracket
    fn bump_balanced(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current() {
                DrlSyntaxKind::LParen | DrlSyntaxKind::LBrace | DrlSyntaxKind::LBracket => {
                    depth += 1
                }
                DrlSyntaxKind::RParen | DrlSyntaxKind::RBrace | DrlSyntaxKind::RBracket => {
                    depth = depth.saturating_sub(1)
                }
                DrlSyntaxKind::Eof => {
                    self.error(
                        ParseErrorKind::UnexpectedEof,
                        "unexpected end of file inside brackets",
                    );
                    return;
                }
                _ => {}
            }
            self.bump();
            if depth == 0 {
                return;
            }
        }
    }

    /// Bump raw tokens until the closing bracket of the current group (not included)
    fn bump_until_close(&mut self, close: DrlSyntaxKind) {
        let mut depth = 0usize;
        loop {
            let current = self.current();
            match current {
                DrlSyntaxKind::Eof => return,
                kind if kind == close && depth == 0 => return,
                DrlSyntaxKind::LParen | DrlSyntaxKind::LBrace | DrlSyntaxKind::LBracket => {
                    depth += 1
                }
                DrlSyntaxKind::RParen | DrlSyntaxKind::RBrace | DrlSyntaxKind::RBracket => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.bump();
        }
    }

    fn start_node(&mut self, kind: DrlSyntaxKind) {
        self.eat_trivia();
        self.builder.start_node(kind);
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.eat_trivia();
        self.builder.checkpoint()
    }

    // ========================================================================
    // Errors
    // ========================================================================

    fn current_span(&self) -> CstSpan {
        match self.current_token() {
            Some(token) => token.span.clone(),
            None => {
                let end = self.tokens.last().map(|t| t.span.end).unwrap_or(0);
                end..end
            }
        }
    }

    /// Record a syntax error unless the parser is already recovering from one
    fn error(&mut self, kind: ParseErrorKind, message: impl Into<String>) {
        if self.recovering {
            return;
        }
        self.recovering = true;
        if self.errors.len() >= self.max_errors {
            return;
        }
        let error = ParseError::new(kind, message, self.current_span());
        debug!(message = %error.message, span = ?error.span, "syntax error");
        self.errors.push(error);
    }

    fn warning(&mut self, message: impl Into<String>, span: CstSpan) {
        if self.errors.len() < self.max_errors {
            self.errors
                .push(ParseError::new(ParseErrorKind::UnknownAttribute, message, span));
        }
    }

    /// Wrap tokens in an `Error` node until one of `stops`, a boundary keyword
    /// or the end of input. Recovery ends only when a `stops` token is reached;
    /// a boundary keyword leaves the enclosing declaration to finish quietly.
    fn recover_to(&mut self, stops: &[DrlSyntaxKind]) {
        let at_stop = |p: &Self| {
            let current = p.current();
            current == DrlSyntaxKind::Eof || stops.contains(&current) || current.is_boundary_keyword()
        };

        if !at_stop(self) {
            self.start_node(DrlSyntaxKind::Error);
            while !at_stop(self) {
                self.bump();
            }
            self.builder.finish_node(); // ERROR
        }

        if stops.contains(&self.current()) {
            self.recovering = false;
        }
    }

    /// Inside a parenthesized group, wrap the rest of a malformed operand in
    /// an `Error` node up to the group's closing paren. Only applies when that
    /// paren comes before `then` or the next declaration; `end` is skipped
    /// like any other token here.
    fn recover_in_parens(&mut self) {
        if !self.recovering {
            return;
        }
        let Some(count) = self.tokens_before_close_paren() else {
            return;
        };
        if count > 0 {
            self.start_node(DrlSyntaxKind::Error);
            for _ in 0..count {
                self.bump();
            }
            self.builder.finish_node(); // ERROR
        }
        self.recovering = false;
    }

    /// Significant tokens before the closing paren of the current group
    fn tokens_before_close_paren(&self) -> Option<usize> {
        let mut depth = 0usize;
        let significant = self.tokens[self.pos..].iter().filter(|t| !t.is_trivia());
        for (count, token) in significant.enumerate() {
            match token.kind {
                DrlSyntaxKind::RParen if depth == 0 => return Some(count),
                DrlSyntaxKind::LParen | DrlSyntaxKind::LBrace | DrlSyntaxKind::LBracket => {
                    depth += 1
                }
                DrlSyntaxKind::RParen | DrlSyntaxKind::RBrace | DrlSyntaxKind::RBracket => {
                    depth = depth.saturating_sub(1)
                }
                DrlSyntaxKind::Eof | DrlSyntaxKind::ThenKw => return None,
                kind if kind.is_boundary_keyword() && kind != DrlSyntaxKind::EndKw => {
                    return None;
                }
                _ => {}
            }
        }
        None
    }
}
