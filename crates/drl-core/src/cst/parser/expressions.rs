//! Constraint expressions
//!
//! Precedence, lowest first: ternary, `||`, `&&`, `|`, `^`, `&`, relational
//! (comparisons, word and custom operators, `instanceof`, `in`), additive,
//! multiplicative, unary and casts, postfix, primary.
//!
//! A comparison without its left operand directly after `||` or `&&`
//! (`age > 30 || < 20`) is a `HalfConstraint`.

use super::{ParseErrorKind, Parser};
use crate::cst::DrlSyntaxKind;

const PRIMITIVE_TYPES: &[&str] = &[
    "int", "long", "short", "byte", "char", "boolean", "float", "double",
];

impl Parser<'_> {
    pub(super) fn parse_expr(&mut self) {
        self.parse_ternary();
    }

    fn parse_ternary(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_logical_or();
        if self.at(DrlSyntaxKind::Question) {
            self.builder.start_node_at(checkpoint, DrlSyntaxKind::TernaryExpr);
            self.bump(); // ?
            self.parse_expr();
            self.expect(DrlSyntaxKind::Colon);
            self.parse_expr();
            self.builder.finish_node(); // TERNARY_EXPR
        }
    }

    fn parse_logical_or(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_logical_and(false);
        while self.at(DrlSyntaxKind::PipePipe) {
            self.builder.start_node_at(checkpoint, DrlSyntaxKind::BinaryExpr);
            self.bump();
            self.parse_logical_and(true);
            self.builder.finish_node(); // BINARY_EXPR
        }
    }

    fn parse_logical_and(&mut self, allow_half: bool) {
        let checkpoint = self.checkpoint();
        self.parse_bit_or(allow_half);
        while self.at(DrlSyntaxKind::AmpAmp) {
            self.builder.start_node_at(checkpoint, DrlSyntaxKind::BinaryExpr);
            self.bump();
            self.parse_bit_or(true);
            self.builder.finish_node(); // BINARY_EXPR
        }
    }

    fn parse_bit_or(&mut self, allow_half: bool) {
        let checkpoint = self.checkpoint();
        self.parse_bit_xor(allow_half);
        while self.at(DrlSyntaxKind::Pipe) {
            self.builder.start_node_at(checkpoint, DrlSyntaxKind::BinaryExpr);
            self.bump();
            self.parse_bit_xor(false);
            self.builder.finish_node(); // BINARY_EXPR
        }
    }

    fn parse_bit_xor(&mut self, allow_half: bool) {
        let checkpoint = self.checkpoint();
        self.parse_bit_and(allow_half);
        while self.at(DrlSyntaxKind::Caret) {
            self.builder.start_node_at(checkpoint, DrlSyntaxKind::BinaryExpr);
            self.bump();
            self.parse_bit_and(false);
            self.builder.finish_node(); // BINARY_EXPR
        }
    }

    fn parse_bit_and(&mut self, allow_half: bool) {
        let checkpoint = self.checkpoint();
        self.parse_relational(allow_half);
        while self.at(DrlSyntaxKind::Amp) {
            self.builder.start_node_at(checkpoint, DrlSyntaxKind::BinaryExpr);
            self.bump();
            self.parse_relational(false);
            self.builder.finish_node(); // BINARY_EXPR
        }
    }

    fn parse_relational(&mut self, allow_half: bool) {
        if allow_half && self.at_half_constraint_start() {
            self.start_node(DrlSyntaxKind::HalfConstraint);
            let operator = self.parse_operator();
            self.parse_relational_rhs(operator);
            self.builder.finish_node(); // HALF_CONSTRAINT
            return;
        }

        let checkpoint = self.checkpoint();
        self.parse_additive();
        while self.at_relational_operator() {
            self.builder
                .start_node_at(checkpoint, DrlSyntaxKind::RelationalExpr);
            let operator = self.parse_operator();
            self.parse_relational_rhs(operator);
            self.builder.finish_node(); // RELATIONAL_EXPR
        }
    }

    fn parse_relational_rhs(&mut self, operator: DrlSyntaxKind) {
        match operator {
            DrlSyntaxKind::InKw if self.at(DrlSyntaxKind::LParen) => self.parse_arg_list(),
            DrlSyntaxKind::InstanceofKw => self.parse_type_ref(),
            _ => self.parse_additive(),
        }
    }

    /// Operators that can sit between two operands
    fn at_relational_operator(&self) -> bool {
        match self.current() {
            kind if kind.is_comparison() || kind.is_word_operator() => true,
            DrlSyntaxKind::InKw | DrlSyntaxKind::InstanceofKw | DrlSyntaxKind::HashHash => true,
            // custom operator: `addresses supersetOf $other.addresses`. The
            // name must be followed by an operand or by operator params, so a
            // stray name after an operand is left for the caller to report.
            DrlSyntaxKind::Ident => Self::is_operand_start(self.nth(1)),
            DrlSyntaxKind::NotKw => {
                let next = self.nth(1);
                next.is_word_operator()
                    || matches!(
                        next,
                        DrlSyntaxKind::InKw | DrlSyntaxKind::Ident | DrlSyntaxKind::HashHash
                    )
            }
            _ => false,
        }
    }

    fn is_operand_start(kind: DrlSyntaxKind) -> bool {
        Self::is_name(kind)
            || matches!(
                kind,
                DrlSyntaxKind::StringLit
                    | DrlSyntaxKind::IntLit
                    | DrlSyntaxKind::FloatLit
                    | DrlSyntaxKind::TrueKw
                    | DrlSyntaxKind::FalseKw
                    | DrlSyntaxKind::NullKw
                    | DrlSyntaxKind::NewKw
                    | DrlSyntaxKind::LParen
                    | DrlSyntaxKind::LBracket
                    | DrlSyntaxKind::Bang
                    | DrlSyntaxKind::Minus
                    | DrlSyntaxKind::Plus
                    | DrlSyntaxKind::Tilde
            )
    }

    /// Operators that can start a half constraint. Bare identifiers are
    /// excluded: after `||` they start a full expression.
    fn at_half_constraint_start(&self) -> bool {
        match self.current() {
            kind if kind.is_comparison() || kind.is_word_operator() => true,
            DrlSyntaxKind::InKw | DrlSyntaxKind::HashHash => true,
            DrlSyntaxKind::NotKw => {
                let next = self.nth(1);
                next.is_word_operator() || matches!(next, DrlSyntaxKind::InKw | DrlSyntaxKind::HashHash)
            }
            _ => false,
        }
    }

    /// Grammar: not? (## name | name | comparison | word-op) params?
    ///
    /// Returns the kind of the operator token itself.
    fn parse_operator(&mut self) -> DrlSyntaxKind {
        self.start_node(DrlSyntaxKind::Operator);
        self.eat(DrlSyntaxKind::NotKw);

        let operator = if self.eat(DrlSyntaxKind::HashHash) {
            self.expect(DrlSyntaxKind::Ident);
            DrlSyntaxKind::Ident
        } else {
            let kind = self.current();
            self.bump();
            kind
        };

        let takes_params = matches!(operator, DrlSyntaxKind::Ident | DrlSyntaxKind::StrKw);
        if takes_params && self.at(DrlSyntaxKind::LBracket) {
            self.start_node(DrlSyntaxKind::OperatorParams);
            self.bump(); // [
            self.bump_until_close(DrlSyntaxKind::RBracket);
            self.expect(DrlSyntaxKind::RBracket);
            self.builder.finish_node(); // OPERATOR_PARAMS
        }

        self.builder.finish_node(); // OPERATOR
        operator
    }

    fn parse_additive(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_multiplicative();
        while self.at(DrlSyntaxKind::Plus) || self.at(DrlSyntaxKind::Minus) {
            self.builder.start_node_at(checkpoint, DrlSyntaxKind::BinaryExpr);
            self.bump();
            self.parse_multiplicative();
            self.builder.finish_node(); // BINARY_EXPR
        }
    }

    fn parse_multiplicative(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_unary();
        while matches!(
            self.current(),
            DrlSyntaxKind::Star | DrlSyntaxKind::Slash | DrlSyntaxKind::Percent
        ) {
            self.builder.start_node_at(checkpoint, DrlSyntaxKind::BinaryExpr);
            self.bump();
            self.parse_unary();
            self.builder.finish_node(); // BINARY_EXPR
        }
    }

    fn parse_unary(&mut self) {
        match self.current() {
            DrlSyntaxKind::Bang
            | DrlSyntaxKind::Minus
            | DrlSyntaxKind::Plus
            | DrlSyntaxKind::Tilde
            | DrlSyntaxKind::PlusPlus
            | DrlSyntaxKind::MinusMinus => {
                self.start_node(DrlSyntaxKind::UnaryExpr);
                self.bump();
                self.parse_unary();
                self.builder.finish_node(); // UNARY_EXPR
            }
            DrlSyntaxKind::LParen if self.at_cast() => {
                self.start_node(DrlSyntaxKind::CastExpr);
                self.bump(); // (
                self.parse_type_ref();
                self.expect(DrlSyntaxKind::RParen);
                self.parse_unary();
                self.builder.finish_node(); // CAST_EXPR
            }
            _ => self.parse_postfix_expr(),
        }
    }

    /// `(Type) operand`: the type is a primitive or starts with an uppercase
    /// letter, and an operand follows the closing paren
    fn at_cast(&self) -> bool {
        let Some(name_idx) = self.nth_index(1) else {
            return false;
        };
        let name = &self.tokens[name_idx];
        let looks_like_type = name.kind == DrlSyntaxKind::Ident
            && (PRIMITIVE_TYPES.contains(&name.text.as_str())
                || name.text.chars().next().is_some_and(char::is_uppercase));
        if !looks_like_type {
            return false;
        }

        let mut n = 2;
        while self.nth(n) == DrlSyntaxKind::Dot && self.nth(n + 1) == DrlSyntaxKind::Ident {
            n += 2;
        }
        while self.nth(n) == DrlSyntaxKind::LBracket && self.nth(n + 1) == DrlSyntaxKind::RBracket {
            n += 2;
        }
        if self.nth(n) != DrlSyntaxKind::RParen {
            return false;
        }
        matches!(
            self.nth(n + 1),
            DrlSyntaxKind::Ident
                | DrlSyntaxKind::StringLit
                | DrlSyntaxKind::IntLit
                | DrlSyntaxKind::FloatLit
                | DrlSyntaxKind::TrueKw
                | DrlSyntaxKind::FalseKw
                | DrlSyntaxKind::NullKw
                | DrlSyntaxKind::NewKw
                | DrlSyntaxKind::LParen
        )
    }

    /// Primary followed by field accesses, calls, indexing and inline casts
    pub(super) fn parse_postfix_expr(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_primary();

        loop {
            match self.current() {
                DrlSyntaxKind::Dot | DrlSyntaxKind::BangDot if self.nth_is_name(1) => {
                    self.bump(); // . or !.
                    self.bump(); // name
                    let kind = if self.at(DrlSyntaxKind::LParen) {
                        self.parse_arg_list();
                        DrlSyntaxKind::MethodCall
                    } else {
                        DrlSyntaxKind::FieldAccess
                    };
                    self.builder.start_node_at(checkpoint, kind);
                    self.builder.finish_node();
                }
                DrlSyntaxKind::Hash if self.nth_is_name(1) => {
                    self.bump(); // #
                    self.parse_qualified_name();
                    self.builder.start_node_at(checkpoint, DrlSyntaxKind::InlineCast);
                    self.builder.finish_node(); // INLINE_CAST
                }
                DrlSyntaxKind::LBracket => {
                    self.bump(); // [
                    self.parse_expr();
                    self.expect(DrlSyntaxKind::RBracket);
                    self.builder.start_node_at(checkpoint, DrlSyntaxKind::IndexExpr);
                    self.builder.finish_node(); // INDEX_EXPR
                }
                DrlSyntaxKind::PlusPlus | DrlSyntaxKind::MinusMinus if self.current_is_adjacent() => {
                    self.bump();
                    self.builder.start_node_at(checkpoint, DrlSyntaxKind::UnaryExpr);
                    self.builder.finish_node(); // UNARY_EXPR
                }
                _ => break,
            }
        }
    }

    fn parse_primary(&mut self) {
        match self.current() {
            DrlSyntaxKind::StringLit
            | DrlSyntaxKind::IntLit
            | DrlSyntaxKind::FloatLit
            | DrlSyntaxKind::TrueKw
            | DrlSyntaxKind::FalseKw
            | DrlSyntaxKind::NullKw => {
                self.start_node(DrlSyntaxKind::Literal);
                self.bump();
                self.builder.finish_node(); // LITERAL
            }
            DrlSyntaxKind::NewKw => self.parse_new(),
            DrlSyntaxKind::LParen => {
                self.start_node(DrlSyntaxKind::ParenExpr);
                self.bump();
                self.parse_expr();
                self.recover_in_parens();
                self.expect(DrlSyntaxKind::RParen);
                self.builder.finish_node(); // PAREN_EXPR
            }
            DrlSyntaxKind::LBracket => self.parse_array_init(),
            kind if Self::is_name(kind) => {
                let checkpoint = self.checkpoint();
                self.start_node(DrlSyntaxKind::NameRef);
                self.bump();
                self.builder.finish_node(); // NAME_REF
                // `foo(x)`: a call only when the paren directly follows the name
                if self.at(DrlSyntaxKind::LParen) && self.current_is_adjacent() {
                    self.parse_arg_list();
                    self.builder.start_node_at(checkpoint, DrlSyntaxKind::MethodCall);
                    self.builder.finish_node(); // METHOD_CALL
                }
            }
            found => self.error(
                ParseErrorKind::UnexpectedToken,
                format!("expected expression, found {found}"),
            ),
        }
    }

    /// Grammar: new Type ( args ) | new Type [ dims ] { init }?
    fn parse_new(&mut self) {
        self.start_node(DrlSyntaxKind::NewExpr);
        self.bump(); // new
        self.parse_type_ref();
        match self.current() {
            DrlSyntaxKind::LParen => self.parse_arg_list(),
            DrlSyntaxKind::LBracket => {
                while self.at(DrlSyntaxKind::LBracket) {
                    self.bump_balanced();
                }
                if self.at(DrlSyntaxKind::LBrace) {
                    self.bump_balanced();
                }
            }
            _ => {
                self.error(
                    ParseErrorKind::MissingToken,
                    "expected '(' or '[' after the type in a new expression",
                );
            }
        }
        self.builder.finish_node(); // NEW_EXPR
    }

    /// Grammar: [ (expr (: expr)?) (, expr (: expr)?)* ]
    fn parse_array_init(&mut self) {
        self.start_node(DrlSyntaxKind::ArrayInit);
        self.bump(); // [
        if !self.at(DrlSyntaxKind::RBracket) {
            loop {
                self.parse_expr();
                if self.eat(DrlSyntaxKind::Colon) {
                    self.parse_expr();
                }
                if !self.eat(DrlSyntaxKind::Comma) {
                    break;
                }
            }
        }
        self.expect(DrlSyntaxKind::RBracket);
        self.builder.finish_node(); // ARRAY_INIT
    }

    /// Grammar: ( (expr (, expr)*)? )
    fn parse_arg_list(&mut self) {
        self.start_node(DrlSyntaxKind::ArgList);
        self.bump(); // (
        if !self.at(DrlSyntaxKind::RParen) {
            loop {
                self.parse_expr();
                if !self.eat(DrlSyntaxKind::Comma) {
                    break;
                }
            }
        }
        self.recover_in_parens();
        self.expect(DrlSyntaxKind::RParen);
        self.builder.finish_node(); // ARG_LIST
    }
}
