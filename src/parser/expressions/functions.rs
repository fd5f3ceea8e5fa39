//! Function parsing: declarations, expressions, methods, bodies
//!
//! Bodies re-enter the statement parser. The `yield`/`await` bookkeeping
//! positions are saved and zeroed around every parameter list so that a
//! `yield` or `await` inside a default value can be reported once the
//! construct is known to be a function header.

use std::collections::HashSet;

use crate::ast::{
    ArrowBody, BlockStatement, Expression, Function, Identifier, Pattern, Statement,
};
use crate::error::ParseResult;
use crate::token::Token;

use super::super::{BindingKind, ForInitCtx, Parser, ScopeFlags};

/// Statement-position particulars of a function being parsed
#[derive(Debug, Clone, Copy)]
pub(crate) struct FuncStatementFlags {
    /// Body of a sloppy-mode `if`/label statement: the name is not declared
    pub(crate) hanging: bool,
    /// `export default function` may omit the name
    pub(crate) nullable_id: bool,
}

impl<'a> Parser<'a> {
    /// Parse a function declaration; the `function` keyword is current and
    /// any `async` prefix already consumed
    pub(crate) fn parse_function_statement(
        &mut self,
        start: usize,
        is_async: bool,
        declaration_position: bool,
    ) -> ParseResult<Statement> {
        self.advance();
        let flags = FuncStatementFlags {
            hanging: !declaration_position,
            nullable_id: false,
        };
        let function = self.parse_function_rest(start, Some(flags), is_async, ForInitCtx::None)?;
        Ok(Statement::FunctionDecl(Box::new(function)))
    }

    /// Parse a function expression; the `function` keyword is consumed
    pub(crate) fn parse_function_expression_rest(
        &mut self,
        start: usize,
        is_async: bool,
    ) -> ParseResult<Expression> {
        let function = self.parse_function_rest(start, None, is_async, ForInitCtx::None)?;
        Ok(Expression::Function(Box::new(function)))
    }

    /// Shared tail of function parsing, from the optional `*` on
    pub(crate) fn parse_function_rest(
        &mut self,
        start: usize,
        statement: Option<FuncStatementFlags>,
        is_async: bool,
        for_init: ForInitCtx,
    ) -> ParseResult<Function> {
        let is_generator = self.ecma_at_least(6) && self.eat(&Token::Star);

        let mut id: Option<Identifier> = None;
        if let Some(flags) = statement {
            id = if flags.nullable_id && !self.check(&Token::Identifier) {
                None
            } else {
                Some(self.parse_ident(false)?)
            };
            if let Some(id) = &id {
                if !flags.hanging {
                    // generators and async functions always bind lexically;
                    // plain functions follow Annex-B in sloppy scopes
                    let kind = if self.strict || is_generator || is_async {
                        if self.treat_functions_as_var() {
                            BindingKind::Var
                        } else {
                            BindingKind::Lexical
                        }
                    } else {
                        BindingKind::Function
                    };
                    let id = id.clone();
                    self.check_lval_pattern(&Pattern::Identifier(id), kind, None)?;
                }
            }
        }

        let old_yield = self.yield_pos;
        let old_await = self.await_pos;
        let old_await_ident = self.await_ident_pos;
        self.yield_pos = 0;
        self.await_pos = 0;
        self.await_ident_pos = 0;
        self.enter_scope(ScopeFlags::function(is_async, is_generator));

        if statement.is_none() {
            id = if self.check(&Token::Identifier) {
                Some(self.parse_ident(false)?)
            } else {
                None
            };
        }

        let params = self.parse_function_params()?;
        let body =
            self.parse_function_body_block(start, id.as_ref(), &params, false, for_init)?;

        self.yield_pos = old_yield;
        self.await_pos = old_await;
        self.await_ident_pos = old_await_ident;
        Ok(Function {
            span: self.finish_span(start),
            id,
            params,
            body,
            is_generator,
            is_async,
        })
    }

    pub(crate) fn parse_function_params(&mut self) -> ParseResult<Vec<Pattern>> {
        self.expect(Token::LParen)?;
        let list = self.parse_binding_list(&Token::RParen, false, self.ecma_at_least(8))?;
        Ok(list.into_iter().flatten().collect())
    }

    /// Parse a method value: parameter list and body in a fresh
    /// super-enabled scope
    pub(crate) fn parse_method(
        &mut self,
        is_generator: bool,
        is_async: bool,
        allow_direct_super: bool,
    ) -> ParseResult<Function> {
        let start = self.cur_start();
        let old_yield = self.yield_pos;
        let old_await = self.await_pos;
        let old_await_ident = self.await_ident_pos;
        self.yield_pos = 0;
        self.await_pos = 0;
        self.await_ident_pos = 0;

        let mut flags = ScopeFlags::function(is_async, is_generator) | ScopeFlags::SUPER;
        if allow_direct_super {
            flags |= ScopeFlags::DIRECT_SUPER;
        }
        self.enter_scope(flags);

        let params = self.parse_function_params()?;
        self.check_yield_await_in_default_params()?;
        let body = self.parse_function_body_block(start, None, &params, true, ForInitCtx::None)?;

        self.yield_pos = old_yield;
        self.await_pos = old_await;
        self.await_ident_pos = old_await_ident;
        Ok(Function {
            span: self.finish_span(start),
            id: None,
            params,
            body,
            is_generator,
            is_async,
        })
    }

    fn parse_function_body_block(
        &mut self,
        fn_start: usize,
        id: Option<&Identifier>,
        params: &[Pattern],
        is_method: bool,
        for_init: ForInitCtx,
    ) -> ParseResult<BlockStatement> {
        match self.parse_function_body(fn_start, id, params, false, is_method, for_init)? {
            ArrowBody::Block(block) => Ok(block),
            ArrowBody::Expression(_) => unreachable!("non-arrow bodies are blocks"),
        }
    }

    /// Parse a function body, handling the strict-mode prologue, parameter
    /// validation and label isolation. Exits the function scope.
    pub(crate) fn parse_function_body(
        &mut self,
        fn_start: usize,
        id: Option<&Identifier>,
        params: &[Pattern],
        is_arrow: bool,
        is_method: bool,
        for_init: ForInitCtx,
    ) -> ParseResult<ArrowBody> {
        let is_expression = is_arrow && !self.check(&Token::LBrace);
        let old_strict = self.strict;

        let body = if is_expression {
            self.check_params(params, false)?;
            let expr = self.parse_maybe_assign(for_init, None)?;
            ArrowBody::Expression(Box::new(expr))
        } else {
            let non_simple = self.ecma_at_least(7) && !is_simple_param_list(params);
            let mut use_strict = false;
            if !old_strict || non_simple {
                use_strict = self.strict_directive(self.cur_span().end);
                if use_strict && non_simple {
                    return self.raise(
                        self.span_at(fn_start),
                        "Illegal 'use strict' directive in function with non-simple parameter list",
                    );
                }
            }
            let old_labels = std::mem::take(&mut self.labels);
            if use_strict {
                self.strict = true;
            }
            let allow_duplicates = !old_strict
                && !use_strict
                && !is_arrow
                && !is_method
                && is_simple_param_list(params);
            self.check_params(params, allow_duplicates)?;
            if self.strict {
                if let Some(id) = id {
                    let id = id.clone();
                    self.check_lval_simple_expr(
                        &Expression::Identifier(id),
                        BindingKind::Outside,
                        None,
                    )?;
                }
            }
            let mut block = self.parse_block(false)?;
            Self::adapt_directive_prologue(self.source, &mut block.body);
            self.labels = old_labels;
            ArrowBody::Block(block)
        };

        self.exit_scope();
        self.strict = old_strict;
        Ok(body)
    }

    /// Declare every parameter, rejecting duplicates unless the sloppy
    /// simple-list exemption applies
    pub(crate) fn check_params(
        &mut self,
        params: &[Pattern],
        allow_duplicates: bool,
    ) -> ParseResult<()> {
        let mut clashes: Option<HashSet<String>> = if allow_duplicates {
            None
        } else {
            Some(HashSet::new())
        };
        for param in params {
            self.check_lval_inner_pattern(param, BindingKind::Var, clashes.as_mut())?;
        }
        Ok(())
    }
}

fn is_simple_param_list(params: &[Pattern]) -> bool {
    params.iter().all(|p| matches!(p, Pattern::Identifier(_)))
}
