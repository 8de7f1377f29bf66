//! Left-hand side of rules and queries: conditional elements and patterns
//!
//! ```text
//! lhsOr    := lhsAnd (("or" | "||") lhsAnd)*
//! lhsAnd   := lhsUnary (("and" | "&&") lhsUnary)*
//! lhsUnary := "not" lhsUnary | "exists" lhsUnary | "eval" "(" expr ")"
//!           | "forall" "(" lhsOr* ")" | "(" ("and" | "or") lhsUnary+ ")"
//!           | "(" lhsOr ")" | "accumulate" "(" ... ")" | pattern
//! pattern  := [$var :] [?] QualifiedName "(" constraints? ")" [over window] [from source]
//! ```

use super::{ParseErrorKind, Parser};
use crate::cst::DrlSyntaxKind;

impl Parser<'_> {
    /// Conditional elements up to `then`, `end` or another boundary
    pub(super) fn parse_lhs_elements(&mut self) {
        loop {
            let current = self.current();
            if current == DrlSyntaxKind::ThenKw
                || current == DrlSyntaxKind::Eof
                || current.is_boundary_keyword()
            {
                break;
            }

            if self.at_lhs_start() {
                self.parse_lhs_or();
                self.eat(DrlSyntaxKind::Semicolon);
            } else {
                self.error(
                    ParseErrorKind::UnexpectedToken,
                    format!("expected a pattern or conditional element, found {current}"),
                );
            }

            if self.recovering {
                self.recover_to(&[DrlSyntaxKind::ThenKw]);
            }
        }
    }

    fn at_lhs_start(&self) -> bool {
        matches!(
            self.current(),
            DrlSyntaxKind::NotKw
                | DrlSyntaxKind::ExistsKw
                | DrlSyntaxKind::EvalKw
                | DrlSyntaxKind::ForallKw
                | DrlSyntaxKind::AccumulateKw
                | DrlSyntaxKind::LParen
                | DrlSyntaxKind::Question
                | DrlSyntaxKind::Ident
        )
    }

    fn parse_lhs_or(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_lhs_and();
        if self.at(DrlSyntaxKind::OrKw) || self.at(DrlSyntaxKind::PipePipe) {
            self.builder.start_node_at(checkpoint, DrlSyntaxKind::LhsOr);
            while self.at(DrlSyntaxKind::OrKw) || self.at(DrlSyntaxKind::PipePipe) {
                self.bump();
                self.parse_lhs_and();
            }
            self.builder.finish_node(); // LHS_OR
        }
    }

    fn parse_lhs_and(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_lhs_unary();
        if self.at(DrlSyntaxKind::AndKw) || self.at(DrlSyntaxKind::AmpAmp) {
            self.builder.start_node_at(checkpoint, DrlSyntaxKind::LhsAnd);
            while self.at(DrlSyntaxKind::AndKw) || self.at(DrlSyntaxKind::AmpAmp) {
                self.bump();
                self.parse_lhs_unary();
            }
            self.builder.finish_node(); // LHS_AND
        }
    }

    fn parse_lhs_unary(&mut self) {
        match self.current() {
            DrlSyntaxKind::NotKw => {
                self.start_node(DrlSyntaxKind::LhsNot);
                self.bump();
                self.parse_lhs_unary();
                self.builder.finish_node(); // LHS_NOT
            }
            DrlSyntaxKind::ExistsKw => {
                self.start_node(DrlSyntaxKind::LhsExists);
                self.bump();
                self.parse_lhs_unary();
                self.builder.finish_node(); // LHS_EXISTS
            }
            DrlSyntaxKind::EvalKw => {
                self.start_node(DrlSyntaxKind::LhsEval);
                self.bump();
                if self.expect(DrlSyntaxKind::LParen) {
                    self.parse_expr();
                    self.expect(DrlSyntaxKind::RParen);
                }
                self.builder.finish_node(); // LHS_EVAL
            }
            DrlSyntaxKind::ForallKw => {
                self.start_node(DrlSyntaxKind::LhsForall);
                self.bump();
                if self.expect(DrlSyntaxKind::LParen) {
                    while !self.at(DrlSyntaxKind::RParen) && self.at_lhs_start() {
                        self.parse_lhs_or();
                        if self.recovering {
                            break;
                        }
                    }
                    self.expect(DrlSyntaxKind::RParen);
                }
                self.builder.finish_node(); // LHS_FORALL
            }
            DrlSyntaxKind::AccumulateKw => self.parse_accumulate(),
            DrlSyntaxKind::LParen => self.parse_lhs_paren(),
            DrlSyntaxKind::Ident | DrlSyntaxKind::Question => self.parse_pattern(),
            found => self.error(
                ParseErrorKind::UnexpectedToken,
                format!("expected a pattern or conditional element, found {found}"),
            ),
        }
    }

    /// `( lhsOr )` or the prefix forms `(and a b)` / `(or a b)`
    fn parse_lhs_paren(&mut self) {
        self.start_node(DrlSyntaxKind::LhsParen);
        self.bump(); // (

        let prefix = match self.current() {
            DrlSyntaxKind::AndKw => Some(DrlSyntaxKind::LhsAnd),
            DrlSyntaxKind::OrKw => Some(DrlSyntaxKind::LhsOr),
            _ => None,
        };

        match prefix {
            Some(kind) => {
                self.start_node(kind);
                self.bump(); // and | or
                while !self.at(DrlSyntaxKind::RParen) && self.at_lhs_start() {
                    self.parse_lhs_unary();
                    if self.recovering {
                        break;
                    }
                }
                self.builder.finish_node();
            }
            None => self.parse_lhs_or(),
        }

        self.expect(DrlSyntaxKind::RParen);
        self.builder.finish_node(); // LHS_PAREN
    }

    /// Grammar: [$var :] [?] Type ( constraints? ) [over window] [from source]
    pub(super) fn parse_pattern(&mut self) {
        self.start_node(DrlSyntaxKind::Pattern);

        if self.at(DrlSyntaxKind::Ident) && self.nth(1) == DrlSyntaxKind::Colon {
            self.parse_binding();
        }
        self.eat(DrlSyntaxKind::Question);
        self.parse_qualified_name();

        if self.expect(DrlSyntaxKind::LParen) {
            if !self.at(DrlSyntaxKind::RParen) {
                loop {
                    self.parse_constraint();
                    if !self.eat(DrlSyntaxKind::Comma) {
                        break;
                    }
                }
            }
            self.recover_in_parens();
        }
        self.expect(DrlSyntaxKind::RParen);

        if self.at(DrlSyntaxKind::OverKw) {
            self.parse_window();
        }
        if self.at(DrlSyntaxKind::FromKw) {
            self.parse_from();
        }

        self.builder.finish_node(); // PATTERN
    }

    /// Grammar: name (":" | ":=")
    fn parse_binding(&mut self) {
        self.start_node(DrlSyntaxKind::Binding);
        self.bump(); // name
        self.bump(); // : or :=
        self.builder.finish_node(); // BINDING
    }

    /// Grammar: [$var :] expression
    pub(super) fn parse_constraint(&mut self) {
        self.start_node(DrlSyntaxKind::Constraint);
        if self.at_name()
            && matches!(self.nth(1), DrlSyntaxKind::Colon | DrlSyntaxKind::ColonEq)
        {
            self.parse_binding();
        }
        self.parse_expr();
        self.builder.finish_node(); // CONSTRAINT
    }

    /// Grammar: over window : name ( args )
    fn parse_window(&mut self) {
        self.start_node(DrlSyntaxKind::WindowClause);
        self.bump(); // over
        if self.expect(DrlSyntaxKind::WindowKw) && self.expect(DrlSyntaxKind::Colon) {
            self.expect_name("window type");
            if self.at(DrlSyntaxKind::LParen) {
                self.start_node(DrlSyntaxKind::ArgList);
                self.bump_balanced();
                self.builder.finish_node(); // ARG_LIST
            }
        }
        self.builder.finish_node(); // WINDOW_CLAUSE
    }

    /// Grammar: from (accumulate | collect | entry-point | expression)
    ///
    /// The source expression is parsed as a postfix expression only, so the
    /// next pattern on the following line is never taken as an operand.
    fn parse_from(&mut self) {
        self.start_node(DrlSyntaxKind::FromClause);
        self.bump(); // from
        match self.current() {
            DrlSyntaxKind::AccumulateKw => self.parse_accumulate(),
            DrlSyntaxKind::CollectKw => {
                self.start_node(DrlSyntaxKind::CollectClause);
                self.bump();
                if self.expect(DrlSyntaxKind::LParen) {
                    self.parse_lhs_or();
                    self.expect(DrlSyntaxKind::RParen);
                }
                self.builder.finish_node(); // COLLECT_CLAUSE
            }
            DrlSyntaxKind::EntryPointKw => {
                self.start_node(DrlSyntaxKind::EntryPoint);
                self.bump();
                if self.at(DrlSyntaxKind::StringLit) {
                    self.bump();
                } else {
                    self.parse_qualified_name();
                }
                self.builder.finish_node(); // ENTRY_POINT
            }
            _ => self.parse_postfix_expr(),
        }
        self.builder.finish_node(); // FROM_CLAUSE
    }

    /// Grammar: accumulate ( lhs (, | ;) functions ... )
    ///
    /// The source conditional element is parsed; the accumulate functions and
    /// custom init/action/result blocks are kept as raw tokens.
    fn parse_accumulate(&mut self) {
        self.start_node(DrlSyntaxKind::AccumulateClause);
        self.bump(); // accumulate
        if self.expect(DrlSyntaxKind::LParen) {
            self.parse_lhs_or();
            if self.eat(DrlSyntaxKind::Comma) || self.eat(DrlSyntaxKind::Semicolon) {
                self.bump_until_close(DrlSyntaxKind::RParen);
            }
            self.expect(DrlSyntaxKind::RParen);
        }
        self.builder.finish_node(); // ACCUMULATE_CLAUSE
    }
}
