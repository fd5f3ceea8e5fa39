//! Atomic expressions and the constructs that start from them
//!
//! Terminal dispatch by token type, the parenthesized-expression /
//! arrow-parameter disambiguation, `new` and meta properties, template
//! literals, dynamic `import()`.

use crate::ast::{
    ArrowFunction, Expression, Identifier, Pattern, TemplateElement, TemplateLiteral,
};
use crate::error::{ParseError, ParseResult};
use crate::token::Token;

use super::super::lvalue::{is_simple_assign_target, DestructuringErrors};
use super::super::{ForInitCtx, Parser, ScopeFlags};

/// An entry of a parenthesized list whose role (group vs. parameters) is
/// still open: expressions convert later, rest bindings are patterns from
/// the start
#[derive(Debug)]
pub(crate) enum ParenItem {
    Expr(Expression),
    Rest(Pattern),
}

impl<'a> Parser<'a> {
    /// Terminal dispatch on the current token
    pub(crate) fn parse_expr_atom(
        &mut self,
        mut ref_errs: Option<&mut DestructuringErrors>,
        for_init: ForInitCtx,
        for_new: bool,
    ) -> ParseResult<Expression> {
        let can_be_arrow = self.potential_arrow_at == Some(self.cur_start());
        let start = self.cur_start();
        let Some(tok) = self.current.as_ref().map(|t| t.token.clone()) else {
            return self.unexpected();
        };
        match tok {
            Token::KwSuper => {
                if !self.allow_super() {
                    return self.raise(self.cur_span(), "'super' keyword outside a method");
                }
                let span = self.cur_span();
                self.advance();
                if self.check(&Token::LParen) && !self.allow_direct_super() {
                    return self.raise(span, "super() call outside constructor of a subclass");
                }
                // super is only ever a member base or a direct call
                if !self.check(&Token::Dot)
                    && !self.check(&Token::LBracket)
                    && !self.check(&Token::LParen)
                {
                    return self.unexpected();
                }
                Ok(Expression::Super { span })
            }
            Token::KwThis => {
                let span = self.cur_span();
                self.advance();
                Ok(Expression::This { span })
            }
            Token::Identifier => {
                let contains_esc = self.current.as_ref().is_some_and(|t| t.contains_esc());
                let id = self.parse_ident(false)?;
                if self.ecma_at_least(8)
                    && !contains_esc
                    && id.name == "async"
                    && !self.can_insert_semicolon()
                    && self.eat(&Token::KwFunction)
                {
                    return self.parse_function_expression_rest(start, true);
                }
                if can_be_arrow && !self.can_insert_semicolon() {
                    if self.eat(&Token::Arrow) {
                        return self.parse_arrow_expression(
                            start,
                            vec![ParenItem::Expr(Expression::Identifier(id))],
                            false,
                            for_init,
                        );
                    }
                    if self.ecma_at_least(8)
                        && id.name == "async"
                        && !contains_esc
                        && self.check(&Token::Identifier)
                        && (!self.potential_arrow_in_for_await
                            || self.cur_text() != "of"
                            || self.current.as_ref().is_some_and(|t| t.contains_esc()))
                    {
                        let param = self.parse_ident(false)?;
                        if self.can_insert_semicolon() || !self.eat(&Token::Arrow) {
                            return self.unexpected();
                        }
                        return self.parse_arrow_expression(
                            start,
                            vec![ParenItem::Expr(Expression::Identifier(param))],
                            true,
                            for_init,
                        );
                    }
                }
                Ok(Expression::Identifier(id))
            }
            Token::Slash | Token::SlashEq => {
                // expression position: the division token is a regexp start
                let regex = self.lexer.reread_regexp(start)?;
                self.current = Some(regex);
                Ok(Expression::Literal(self.parse_literal()?))
            }
            Token::Number
            | Token::BigInt
            | Token::Str
            | Token::Null
            | Token::True
            | Token::False => Ok(Expression::Literal(self.parse_literal()?)),
            Token::LParen => {
                let expr = self.parse_paren_and_distinguish(can_be_arrow, for_init)?;
                if let Some(errs) = ref_errs.as_deref_mut() {
                    if errs.parenthesized_assign.is_none() && !is_simple_assign_target(&expr) {
                        errs.parenthesized_assign = Some(start);
                    }
                    if errs.parenthesized_bind.is_none() {
                        errs.parenthesized_bind = Some(start);
                    }
                }
                Ok(expr)
            }
            Token::LBracket => {
                self.advance();
                let elements =
                    self.parse_expr_list(&Token::RBracket, true, true, ref_errs.as_deref_mut())?;
                Ok(Expression::Array {
                    span: self.finish_span(start),
                    elements,
                })
            }
            Token::LBrace => self.parse_object_expression(ref_errs.as_deref_mut()),
            Token::KwFunction => {
                self.advance();
                self.parse_function_expression_rest(start, false)
            }
            Token::KwClass => self.parse_class_expression(),
            Token::KwNew => self.parse_new(),
            Token::Backtick => Ok(Expression::TemplateLiteral(
                self.parse_template_literal(false)?,
            )),
            Token::KwImport => {
                if !self.ecma_at_least(11) {
                    return self.unexpected();
                }
                self.parse_expr_import(for_new)
            }
            _ => self.unexpected(),
        }
    }

    /// Parse `( … )`: a grouped expression, a sequence, or an arrow
    /// parameter list when `=>` follows
    fn parse_paren_and_distinguish(
        &mut self,
        can_be_arrow: bool,
        for_init: ForInitCtx,
    ) -> ParseResult<Expression> {
        let start = self.cur_start();
        let allow_trailing_comma = self.ecma_at_least(8);
        self.advance();

        let inner_start = self.cur_start();
        let mut items: Vec<ParenItem> = Vec::new();
        let mut first = true;
        let mut last_is_comma = false;
        let mut spread_start: Option<usize> = None;
        let mut errs = DestructuringErrors::new();
        let old_yield = self.yield_pos;
        let old_await = self.await_pos;
        self.yield_pos = 0;
        self.await_pos = 0;

        while !self.check(&Token::RParen) {
            if first {
                first = false;
            } else {
                self.expect(Token::Comma)?;
            }
            if allow_trailing_comma && self.after_trailing_comma(&Token::RParen, true) {
                last_is_comma = true;
                break;
            }
            if self.check(&Token::Ellipsis) {
                spread_start = Some(self.cur_start());
                let rest = self.parse_rest_binding()?;
                items.push(ParenItem::Rest(rest));
                if self.check(&Token::Comma) {
                    return self.raise(
                        self.cur_span(),
                        "Comma is not permitted after the rest element",
                    );
                }
                break;
            }
            items.push(ParenItem::Expr(
                self.parse_maybe_assign(ForInitCtx::None, Some(&mut errs))?,
            ));
        }
        let inner_end = self.last_tok_end;
        self.expect(Token::RParen)?;

        if can_be_arrow && !self.can_insert_semicolon() && self.eat(&Token::Arrow) {
            self.check_pattern_errors(Some(&errs), false)?;
            self.check_yield_await_in_default_params()?;
            self.yield_pos = old_yield;
            self.await_pos = old_await;
            return self.parse_arrow_expression(start, items, false, for_init);
        }

        if items.is_empty() || last_is_comma {
            return self.unexpected_at(self.last_tok_start);
        }
        if let Some(at) = spread_start {
            return self.unexpected_at(at);
        }
        self.check_expression_errors(Some(&errs), true)?;
        if old_yield != 0 {
            self.yield_pos = old_yield;
        }
        if old_await != 0 {
            self.await_pos = old_await;
        }

        let mut exprs: Vec<Expression> = Vec::with_capacity(items.len());
        for item in items {
            match item {
                ParenItem::Expr(e) => exprs.push(e),
                ParenItem::Rest(p) => return self.unexpected_at(p.span().start),
            }
        }
        let value = if exprs.len() > 1 {
            Expression::Sequence {
                span: self.source_map.span(inner_start, inner_end),
                expressions: exprs,
            }
        } else {
            exprs.into_iter().next().expect("non-empty checked above")
        };
        if self.options.preserve_parens {
            Ok(Expression::Paren {
                span: self.finish_span(start),
                expression: Box::new(value),
            })
        } else {
            Ok(value)
        }
    }

    /// Build an arrow function from collected parameter items; the `=>` has
    /// been consumed
    pub(crate) fn parse_arrow_expression(
        &mut self,
        start: usize,
        params: Vec<ParenItem>,
        is_async: bool,
        for_init: ForInitCtx,
    ) -> ParseResult<Expression> {
        let old_yield = self.yield_pos;
        let old_await = self.await_pos;
        let old_await_ident = self.await_ident_pos;
        self.enter_scope(ScopeFlags::function(is_async, false) | ScopeFlags::ARROW);
        self.yield_pos = 0;
        self.await_pos = 0;
        self.await_ident_pos = 0;

        let mut patterns = Vec::with_capacity(params.len());
        for item in params {
            match item {
                ParenItem::Expr(e) => patterns.push(self.to_assignable(e, true, None)?),
                ParenItem::Rest(p) => patterns.push(p),
            }
        }
        let body = self.parse_function_body(start, None, &patterns, true, false, for_init)?;

        self.yield_pos = old_yield;
        self.await_pos = old_await;
        self.await_ident_pos = old_await_ident;
        Ok(Expression::Arrow(Box::new(ArrowFunction {
            span: self.finish_span(start),
            params: patterns,
            body,
            is_async,
        })))
    }

    /// Parse a template literal; the current token is the opening backtick
    pub(crate) fn parse_template_literal(
        &mut self,
        is_tagged: bool,
    ) -> ParseResult<TemplateLiteral> {
        let start = self.cur_start();
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        let mut chunk_from = self.cur_span().end;
        let allow_invalid = is_tagged && self.ecma_at_least(9);
        loop {
            let chunk = self.lexer.read_template_chunk(chunk_from)?;
            let raw = chunk.raw.replace("\r\n", "\n").replace('\r', "\n");
            let cooked = match self.cook_string_body(chunk.raw, chunk.span.start, true) {
                Ok(c) => Some(c.value),
                Err((span, message)) => {
                    if allow_invalid {
                        None
                    } else {
                        return Err(ParseError::InvalidEscape { message, span });
                    }
                }
            };
            quasis.push(TemplateElement {
                span: chunk.span,
                cooked,
                raw,
                tail: !chunk.is_substitution,
            });
            if chunk.is_substitution {
                self.advance();
                let expr = self.parse_expression(ForInitCtx::None, None)?;
                if !self.check(&Token::RBrace) {
                    return self.unexpected();
                }
                chunk_from = self.cur_span().end;
                expressions.push(expr);
            } else {
                // the chunk scan consumed the closing backtick
                self.current = None;
                self.last_tok_start = chunk.end - 1;
                self.last_tok_end = chunk.end;
                self.advance();
                break;
            }
        }
        Ok(TemplateLiteral {
            span: self.finish_span(start),
            quasis,
            expressions,
        })
    }

    /// Parse `new expr(…)` or `new.target`
    pub(crate) fn parse_new(&mut self) -> ParseResult<Expression> {
        let start = self.cur_start();
        let new_span = self.cur_span();
        self.advance();
        if self.ecma_at_least(6) && self.eat(&Token::Dot) {
            let meta = Identifier {
                span: new_span,
                name: "new".to_string(),
            };
            let property_esc = self.current.as_ref().is_some_and(|t| t.contains_esc());
            let property = self.parse_ident(true)?;
            if property.name != "target" {
                self.raise_recoverable(
                    property.span,
                    "The only valid meta property for new is 'new.target'",
                );
            }
            if property_esc {
                self.raise_recoverable(
                    self.span_at(start),
                    "'new.target' must not contain escaped characters",
                );
            }
            if !self.allow_new_dot_target() {
                self.raise_recoverable(
                    self.span_at(start),
                    "'new.target' can only be used in functions and class static block",
                );
            }
            return Ok(Expression::MetaProperty {
                span: self.finish_span(start),
                meta,
                property,
            });
        }
        let callee_start = self.cur_start();
        let atom = self.parse_expr_atom(None, ForInitCtx::None, true)?;
        let callee = self.parse_subscripts(atom, callee_start, true, ForInitCtx::None)?;
        let mut arguments = Vec::new();
        if self.eat(&Token::LParen) {
            let args =
                self.parse_expr_list(&Token::RParen, self.ecma_at_least(8), false, None)?;
            arguments = args.into_iter().flatten().collect();
        }
        Ok(Expression::New {
            span: self.finish_span(start),
            callee: Box::new(callee),
            arguments,
        })
    }

    /// `import` in expression position: dynamic `import(source)` or
    /// `import.meta`
    pub(crate) fn parse_expr_import(&mut self, for_new: bool) -> ParseResult<Expression> {
        let start = self.cur_start();
        let import_span = self.cur_span();
        self.advance();
        if self.check(&Token::LParen) {
            if for_new {
                return self.raise(import_span, "Cannot use new with import()");
            }
            return self.parse_dynamic_import(start);
        }
        if self.eat(&Token::Dot) {
            let meta = Identifier {
                span: import_span,
                name: "import".to_string(),
            };
            let property_esc = self.current.as_ref().is_some_and(|t| t.contains_esc());
            let property = self.parse_ident(true)?;
            if property.name != "meta" {
                self.raise_recoverable(
                    property.span,
                    "The only valid meta property for import is 'import.meta'",
                );
            }
            if property_esc {
                self.raise_recoverable(
                    self.span_at(start),
                    "'import.meta' must not contain escaped characters",
                );
            }
            if !self.in_module && !self.options.allow_import_export_everywhere {
                self.raise_recoverable(
                    self.span_at(start),
                    "Cannot use 'import.meta' outside a module",
                );
            }
            return Ok(Expression::MetaProperty {
                span: self.finish_span(start),
                meta,
                property,
            });
        }
        self.unexpected()
    }

    fn parse_dynamic_import(&mut self, start: usize) -> ParseResult<Expression> {
        self.advance(); // (
        let source = self.parse_maybe_assign(ForInitCtx::None, None)?;
        if !self.eat(&Token::RParen) {
            let error_pos = self.cur_start();
            if self.eat(&Token::Comma) && self.eat(&Token::RParen) {
                self.raise_recoverable(
                    self.span_at(error_pos),
                    "Trailing comma is not allowed in import()",
                );
            } else {
                return self.unexpected_at(error_pos);
            }
        }
        Ok(Expression::ImportCall {
            span: self.finish_span(start),
            source: Box::new(source),
        })
    }
}
