//! Iteration statements
//!
//! The `for` head is the grammar's busiest junction: after `(` the parser
//! must settle between a C-style loop, `for-in`, `for-of` and `for await`,
//! with a declaration or an expression (possibly a destructuring target) on
//! the left. The head is parsed tentatively and the following token decides.

use crate::ast::{Expression, ForInit, ForTarget, Pattern, Statement, VariableKind};
use crate::error::ParseResult;
use crate::token::Token;

use super::super::lvalue::DestructuringErrors;
use super::super::{BindingKind, ForInitCtx, Label, LabelKind, Parser, ScopeFlags};
use super::{ContextKind, StatementContext};

impl<'a> Parser<'a> {
    pub(crate) fn parse_for_statement(&mut self, start: usize) -> ParseResult<Statement> {
        self.advance();
        let await_at = if self.ecma_at_least(9) && self.can_await() && self.eat_contextual("await")
        {
            Some(self.last_tok_start)
        } else {
            None
        };
        self.labels.push(Label {
            name: None,
            kind: LabelKind::Loop,
            statement_start: usize::MAX,
        });
        self.enter_scope(ScopeFlags::empty());
        self.expect(Token::LParen)?;

        if self.check(&Token::Semicolon) {
            if let Some(at) = await_at {
                return self.unexpected_at(at);
            }
            return self.parse_for_rest(start, None);
        }

        let is_let = self.is_let(None);
        if self.check(&Token::KwVar) || self.check(&Token::KwConst) || is_let {
            let kind = if is_let {
                VariableKind::Let
            } else if self.check(&Token::KwConst) {
                VariableKind::Const
            } else {
                VariableKind::Var
            };
            let init_start = self.cur_start();
            self.advance();
            let declaration = self.parse_var(init_start, true, kind)?;
            if (self.check(&Token::KwIn) || (self.ecma_at_least(6) && self.is_contextual("of")))
                && declaration.declarations.len() == 1
            {
                if self.check(&Token::KwIn) {
                    if let Some(at) = await_at {
                        return self.unexpected_at(at);
                    }
                }
                return self.parse_for_in_of(
                    start,
                    ForTarget::Declaration(declaration),
                    await_at.is_some(),
                );
            }
            if let Some(at) = await_at {
                return self.unexpected_at(at);
            }
            return self.parse_for_rest(start, Some(ForInit::Declaration(declaration)));
        }

        let starts_with_let = self.is_contextual("let");
        let contains_esc = self.current.as_ref().is_some_and(|t| t.contains_esc());
        let mut errs = DestructuringErrors::new();
        let init_pos = self.cur_start();
        let init = if await_at.is_some() {
            self.parse_expr_subscripts(Some(&mut errs), ForInitCtx::Await)?
        } else {
            self.parse_expression(ForInitCtx::Init, Some(&mut errs))?
        };

        let is_for_of = self.ecma_at_least(6) && self.is_contextual("of");
        if self.check(&Token::KwIn) || is_for_of {
            let mut is_await = false;
            if let Some(at) = await_at {
                if self.check(&Token::KwIn) {
                    return self.unexpected_at(at);
                }
                is_await = true;
            } else if is_for_of && self.ecma_at_least(8) {
                // `for (async of …)` is reserved for async arrows
                if init.span().start == init_pos
                    && !contains_esc
                    && matches!(&init, Expression::Identifier(id) if id.name == "async")
                {
                    return self.unexpected();
                }
            }
            if starts_with_let && is_for_of {
                return self.raise(
                    init.span(),
                    "The left-hand side of a for-of loop may not start with 'let'.",
                );
            }
            let pattern = self.to_assignable(init, false, Some(&errs))?;
            self.check_lval_pattern(&pattern, BindingKind::None, None)?;
            return self.parse_for_in_of(start, ForTarget::Pattern(pattern), is_await);
        }

        self.check_expression_errors(Some(&errs), true)?;
        if let Some(at) = await_at {
            return self.unexpected_at(at);
        }
        self.parse_for_rest(start, Some(ForInit::Expression(init)))
    }

    /// C-style tail: `init ; test ; update ) body`
    fn parse_for_rest(&mut self, start: usize, init: Option<ForInit>) -> ParseResult<Statement> {
        self.expect(Token::Semicolon)?;
        let test = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expression(ForInitCtx::None, None)?)
        };
        self.expect(Token::Semicolon)?;
        let update = if self.check(&Token::RParen) {
            None
        } else {
            Some(self.parse_expression(ForInitCtx::None, None)?)
        };
        self.expect(Token::RParen)?;
        let body = Box::new(
            self.parse_statement(Some(StatementContext::of(ContextKind::For)), false)?,
        );
        self.exit_scope();
        self.labels.pop();
        Ok(Statement::For {
            span: self.finish_span(start),
            init,
            test,
            update,
            body,
        })
    }

    /// `in`/`of` tail; `left` is settled, the `in`/`of` token is current
    fn parse_for_in_of(
        &mut self,
        start: usize,
        left: ForTarget,
        is_await: bool,
    ) -> ParseResult<Statement> {
        let is_for_in = self.check(&Token::KwIn);
        self.advance();

        if let ForTarget::Declaration(d) = &left {
            let first = &d.declarations[0];
            // only the legacy sloppy `for (var x = 0 in y)` keeps an
            // initializer
            if first.init.is_some()
                && (!is_for_in
                    || !self.ecma_at_least(8)
                    || self.strict
                    || d.kind != VariableKind::Var
                    || !matches!(first.id, Pattern::Identifier(_)))
            {
                let label = if is_for_in { "for-in" } else { "for-of" };
                return self.raise(
                    d.span,
                    format!("{} loop variable declaration may not have an initializer", label),
                );
            }
        }

        let right = if is_for_in {
            self.parse_expression(ForInitCtx::None, None)?
        } else {
            self.parse_maybe_assign(ForInitCtx::None, None)?
        };
        self.expect(Token::RParen)?;
        let body = Box::new(
            self.parse_statement(Some(StatementContext::of(ContextKind::For)), false)?,
        );
        self.exit_scope();
        self.labels.pop();
        let span = self.finish_span(start);
        Ok(if is_for_in {
            Statement::ForIn {
                span,
                left,
                right,
                body,
            }
        } else {
            Statement::ForOf {
                span,
                is_await,
                left,
                right,
                body,
            }
        })
    }

    pub(crate) fn parse_while_statement(&mut self, start: usize) -> ParseResult<Statement> {
        self.advance();
        let test = self.parse_paren_expression()?;
        self.labels.push(Label {
            name: None,
            kind: LabelKind::Loop,
            statement_start: usize::MAX,
        });
        let body = Box::new(
            self.parse_statement(Some(StatementContext::of(ContextKind::While)), false)?,
        );
        self.labels.pop();
        Ok(Statement::While {
            span: self.finish_span(start),
            test,
            body,
        })
    }

    pub(crate) fn parse_do_statement(&mut self, start: usize) -> ParseResult<Statement> {
        self.labels.push(Label {
            name: None,
            kind: LabelKind::Loop,
            statement_start: usize::MAX,
        });
        self.advance();
        let body = Box::new(
            self.parse_statement(Some(StatementContext::of(ContextKind::Do)), false)?,
        );
        self.labels.pop();
        self.expect(Token::KwWhile)?;
        let test = self.parse_paren_expression()?;
        if self.ecma_at_least(6) {
            // the closing `)` of do-while accepts a bare `;` or nothing
            self.eat(&Token::Semicolon);
        } else {
            self.semicolon()?;
        }
        Ok(Statement::DoWhile {
            span: self.finish_span(start),
            body,
            test,
        })
    }
}
