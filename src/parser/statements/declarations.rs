//! Variable declarations
//!
//! `var`/`let`/`const` declarator lists. Patterns require an initializer
//! except in a `for-in`/`for-of` head, and `const` requires one everywhere
//! outside those heads.

use crate::ast::{Pattern, Statement, VariableDeclaration, VariableDeclarator, VariableKind};
use crate::error::ParseResult;
use crate::token::Token;

use super::super::{BindingKind, ForInitCtx, Parser};

impl<'a> Parser<'a> {
    pub(crate) fn parse_var_statement(
        &mut self,
        start: usize,
        kind: VariableKind,
    ) -> ParseResult<Statement> {
        self.advance(); // `var`/`const` keyword or the `let` identifier
        let mut declaration = self.parse_var(start, false, kind)?;
        self.semicolon()?;
        declaration.span = self.finish_span(start);
        Ok(Statement::VariableDecl(declaration))
    }

    /// Parse the declarator list; `is_for` relaxes the initializer rules
    /// for `in`/`of` heads
    pub(crate) fn parse_var(
        &mut self,
        start: usize,
        is_for: bool,
        kind: VariableKind,
    ) -> ParseResult<VariableDeclaration> {
        let mut declarations = Vec::new();
        loop {
            let decl_start = self.cur_start();
            let id = self.parse_binding_atom()?;
            let binding = if kind == VariableKind::Var {
                BindingKind::Var
            } else {
                BindingKind::Lexical
            };
            self.check_lval_pattern(&id, binding, None)?;
            let init = if self.eat(&Token::Eq) {
                let ctx = if is_for {
                    ForInitCtx::Init
                } else {
                    ForInitCtx::None
                };
                Some(self.parse_maybe_assign(ctx, None)?)
            } else {
                let at_in_of = self.check(&Token::KwIn)
                    || (self.ecma_at_least(6) && self.is_contextual("of"));
                if kind == VariableKind::Const && !at_in_of {
                    return self.unexpected();
                }
                if !matches!(id, Pattern::Identifier(_)) && !(is_for && at_in_of) {
                    return self.raise(
                        self.span_at(self.last_tok_end),
                        "Complex binding patterns require an initialization value",
                    );
                }
                None
            };
            declarations.push(VariableDeclarator {
                span: self.finish_span(decl_start),
                id,
                init,
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(VariableDeclaration {
            span: self.finish_span(start),
            kind,
            declarations,
        })
    }
}
