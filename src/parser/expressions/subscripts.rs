//! Subscript chains: member access, calls, optional chaining, tagged
//! templates
//!
//! An atom is wrapped repeatedly until no subscript token follows. When any
//! link in the chain was optional (`?.`), the whole chain is wrapped in a
//! ChainExpression to delimit the short-circuit scope.

use crate::ast::{Expression, MemberExpression};
use crate::error::ParseResult;
use crate::token::Token;

use super::super::lvalue::DestructuringErrors;
use super::super::{ForInitCtx, Parser};
use super::ParenItem;

/// One step of the subscript loop: either the chain continues with a new
/// head, or it is finished
enum SubscriptStep {
    More(Expression, bool),
    Done(Expression),
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr_subscripts(
        &mut self,
        mut ref_errs: Option<&mut DestructuringErrors>,
        for_init: ForInitCtx,
    ) -> ParseResult<Expression> {
        let start = self.cur_start();
        let expr = self.parse_expr_atom(ref_errs.as_deref_mut(), for_init, false)?;
        if matches!(expr, Expression::Arrow(_))
            && &self.source[self.last_tok_start..self.last_tok_end] != ")"
        {
            return Ok(expr);
        }
        let result = self.parse_subscripts(expr, start, false, for_init)?;
        if let Some(errs) = ref_errs {
            if matches!(result, Expression::Member(_)) {
                let result_start = result.span().start;
                if errs.parenthesized_assign.is_some_and(|p| p >= result_start) {
                    errs.parenthesized_assign = None;
                }
                if errs.parenthesized_bind.is_some_and(|p| p >= result_start) {
                    errs.parenthesized_bind = None;
                }
                if errs.trailing_comma.is_some_and(|p| p >= result_start) {
                    errs.trailing_comma = None;
                }
            }
        }
        Ok(result)
    }

    pub(crate) fn parse_subscripts(
        &mut self,
        base: Expression,
        start: usize,
        no_calls: bool,
        for_init: ForInitCtx,
    ) -> ParseResult<Expression> {
        let maybe_async_arrow = self.ecma_at_least(8)
            && matches!(&base, Expression::Identifier(id) if id.name == "async")
            && self.last_tok_end == base.span().end
            && !self.can_insert_semicolon()
            && base.span().end - base.span().start == "async".len()
            && self.potential_arrow_at == Some(base.span().start);
        let mut optional_chained = false;
        let mut base = base;
        loop {
            match self.parse_subscript(
                base,
                start,
                no_calls,
                maybe_async_arrow,
                optional_chained,
                for_init,
            )? {
                SubscriptStep::More(element, was_optional) => {
                    if was_optional {
                        optional_chained = true;
                    }
                    base = element;
                }
                SubscriptStep::Done(element) => {
                    if optional_chained {
                        return Ok(Expression::Chain {
                            span: self.finish_span(start),
                            expression: Box::new(element),
                        });
                    }
                    return Ok(element);
                }
            }
        }
    }

    fn parse_subscript(
        &mut self,
        base: Expression,
        start: usize,
        no_calls: bool,
        maybe_async_arrow: bool,
        optional_chained: bool,
        for_init: ForInitCtx,
    ) -> ParseResult<SubscriptStep> {
        let optional_supported = self.ecma_at_least(11);
        let optional = optional_supported && self.eat(&Token::QuestionDot);
        if no_calls && optional {
            return self.raise(
                self.span_at(self.last_tok_start),
                "Optional chaining cannot appear in the callee of new expressions",
            );
        }

        let computed = self.eat(&Token::LBracket);
        if computed
            || (optional && !self.check(&Token::LParen) && !self.check(&Token::Backtick))
            || self.eat(&Token::Dot)
        {
            let property = if computed {
                let property = self.parse_expression(ForInitCtx::None, None)?;
                self.expect(Token::RBracket)?;
                property
            } else if self.check(&Token::PrivateName)
                && !matches!(base, Expression::Super { .. })
            {
                Expression::PrivateIdentifier(self.parse_private_ident()?)
            } else {
                Expression::Identifier(self.parse_ident(true)?)
            };
            let member = Expression::Member(Box::new(MemberExpression {
                span: self.finish_span(start),
                object: base,
                property,
                computed,
                optional,
            }));
            return Ok(SubscriptStep::More(member, optional));
        }

        if !no_calls && self.check(&Token::LParen) {
            let old_yield = self.yield_pos;
            let old_await = self.await_pos;
            let old_await_ident = self.await_ident_pos;
            self.yield_pos = 0;
            self.await_pos = 0;
            self.await_ident_pos = 0;
            let mut errs = DestructuringErrors::new();
            self.advance();
            let args = self.parse_expr_list(
                &Token::RParen,
                self.ecma_at_least(8),
                false,
                Some(&mut errs),
            )?;
            if maybe_async_arrow && !self.can_insert_semicolon() && self.eat(&Token::Arrow) {
                self.check_pattern_errors(Some(&errs), false)?;
                self.check_yield_await_in_default_params()?;
                if self.await_ident_pos > 0 {
                    return self.raise(
                        self.span_at(self.await_ident_pos),
                        "Cannot use 'await' as identifier inside an async function",
                    );
                }
                self.yield_pos = old_yield;
                self.await_pos = old_await;
                self.await_ident_pos = old_await_ident;
                let params = args
                    .into_iter()
                    .flatten()
                    .map(ParenItem::Expr)
                    .collect();
                let arrow = self.parse_arrow_expression(start, params, true, for_init)?;
                return Ok(SubscriptStep::Done(arrow));
            }
            self.check_expression_errors(Some(&errs), true)?;
            if old_yield != 0 {
                self.yield_pos = old_yield;
            }
            if old_await != 0 {
                self.await_pos = old_await;
            }
            if old_await_ident != 0 {
                self.await_ident_pos = old_await_ident;
            }
            let call = Expression::Call {
                span: self.finish_span(start),
                callee: Box::new(base),
                arguments: args.into_iter().flatten().collect(),
                optional,
            };
            return Ok(SubscriptStep::More(call, optional));
        }

        if self.check(&Token::Backtick) {
            if optional || optional_chained {
                return self.raise(
                    self.cur_span(),
                    "Optional chaining cannot appear in the tag of tagged template expressions",
                );
            }
            let quasi = self.parse_template_literal(true)?;
            let tagged = Expression::TaggedTemplate {
                span: self.finish_span(start),
                tag: Box::new(base),
                quasi,
            };
            return Ok(SubscriptStep::More(tagged, false));
        }

        Ok(SubscriptStep::Done(base))
    }

    /// Parse a comma-separated expression list up to `close`; `allow_empty`
    /// admits array holes
    pub(crate) fn parse_expr_list(
        &mut self,
        close: &Token,
        allow_trailing_comma: bool,
        allow_empty: bool,
        mut ref_errs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Vec<Option<Expression>>> {
        let mut elements = Vec::new();
        let mut first = true;
        while !self.eat(close) {
            if !first {
                self.expect(Token::Comma)?;
                if allow_trailing_comma && self.after_trailing_comma(close, false) {
                    break;
                }
            } else {
                first = false;
            }
            let element = if allow_empty && self.check(&Token::Comma) {
                None
            } else if self.check(&Token::Ellipsis) {
                let spread = self.parse_spread(ref_errs.as_deref_mut())?;
                if let Some(errs) = ref_errs.as_deref_mut() {
                    if self.check(&Token::Comma) && errs.trailing_comma.is_none() {
                        errs.trailing_comma = Some(self.cur_start());
                    }
                }
                Some(spread)
            } else {
                Some(self.parse_maybe_assign(ForInitCtx::None, ref_errs.as_deref_mut())?)
            };
            elements.push(element);
        }
        Ok(elements)
    }

    pub(crate) fn parse_spread(
        &mut self,
        ref_errs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Expression> {
        let start = self.cur_start();
        self.advance();
        let argument = self.parse_maybe_assign(ForInitCtx::None, ref_errs)?;
        Ok(Expression::Spread {
            span: self.finish_span(start),
            argument: Box::new(argument),
        })
    }
}
