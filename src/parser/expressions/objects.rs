//! Object literals and object patterns
//!
//! A `{…}` in expression position may still become a destructuring pattern;
//! shorthand defaults (`{a = 1}`) are therefore built as `=` assignment
//! expressions and the offending offset recorded, so the role commit either
//! converts them to defaults or raises. Binding positions parse the pattern
//! form directly.

use crate::ast::{
    AssignOp, Expression, LiteralValue, ObjectMember, ObjectPatternProp, Pattern, PatternProperty,
    Property, PropertyKind,
};
use crate::error::ParseResult;
use crate::token::Token;

use super::super::lvalue::DestructuringErrors;
use super::super::{ForInitCtx, Parser};

impl<'a> Parser<'a> {
    pub(crate) fn parse_object_expression(
        &mut self,
        mut ref_errs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Expression> {
        let start = self.cur_start();
        self.advance();
        let mut properties = Vec::new();
        let mut first = true;
        let mut proto_seen = false;
        while !self.eat(&Token::RBrace) {
            if !first {
                self.expect(Token::Comma)?;
                if self.after_trailing_comma(&Token::RBrace, false) {
                    break;
                }
            } else {
                first = false;
            }
            let member = self.parse_object_member(ref_errs.as_deref_mut())?;
            self.check_prop_clash(&member, &mut proto_seen, ref_errs.as_deref_mut());
            properties.push(member);
        }
        Ok(Expression::Object {
            span: self.finish_span(start),
            properties,
        })
    }

    fn parse_object_member(
        &mut self,
        mut ref_errs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<ObjectMember> {
        let start = self.cur_start();
        if self.ecma_at_least(9) && self.check(&Token::Ellipsis) {
            self.advance();
            let argument = self.parse_maybe_assign(ForInitCtx::None, ref_errs.as_deref_mut())?;
            if let Some(errs) = ref_errs.as_deref_mut() {
                if self.check(&Token::Comma) && errs.trailing_comma.is_none() {
                    errs.trailing_comma = Some(self.cur_start());
                }
            }
            return Ok(ObjectMember::Spread {
                span: self.finish_span(start),
                argument,
            });
        }

        let mut is_generator = false;
        if self.ecma_at_least(6) {
            is_generator = self.eat(&Token::Star);
        }
        let contains_esc = self.current.as_ref().is_some_and(|t| t.contains_esc());
        let (mut key, mut computed) = self.parse_property_name()?;
        let mut is_async = false;
        if !contains_esc
            && self.ecma_at_least(8)
            && !is_generator
            && self.is_async_prop(computed, &key)
        {
            is_async = true;
            is_generator = self.ecma_at_least(9) && self.eat(&Token::Star);
            let (next_key, next_computed) = self.parse_property_name()?;
            key = next_key;
            computed = next_computed;
        }
        let property = self.parse_property_value(
            start,
            key,
            computed,
            is_generator,
            is_async,
            contains_esc,
            ref_errs,
        )?;
        Ok(ObjectMember::Property(property))
    }

    /// Does the parsed `async` key actually prefix an async method?
    fn is_async_prop(&self, computed: bool, key: &Expression) -> bool {
        if computed || self.newline_before {
            return false;
        }
        if !matches!(key, Expression::Identifier(id) if id.name == "async") {
            return false;
        }
        self.current.as_ref().is_some_and(|t| {
            matches!(
                t.token,
                Token::Identifier
                    | Token::Number
                    | Token::BigInt
                    | Token::Str
                    | Token::LBracket
            ) || t.token.keyword_name().is_some()
                || (self.ecma_at_least(9) && t.token == Token::Star)
        })
    }

    fn parse_property_value(
        &mut self,
        start: usize,
        key: Expression,
        computed: bool,
        is_generator: bool,
        is_async: bool,
        contains_esc: bool,
        mut ref_errs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Property> {
        if (is_generator || is_async) && self.check(&Token::Colon) {
            return self.unexpected();
        }

        if self.eat(&Token::Colon) {
            let value = self.parse_maybe_assign(ForInitCtx::None, ref_errs.as_deref_mut())?;
            return Ok(Property {
                span: self.finish_span(start),
                key,
                value,
                kind: PropertyKind::Init,
                computed,
                method: false,
                shorthand: false,
            });
        }

        if self.check(&Token::LParen) {
            let value = self.parse_method(is_generator, is_async, false)?;
            return Ok(Property {
                span: self.finish_span(start),
                key,
                value: Expression::Function(Box::new(value)),
                kind: PropertyKind::Init,
                computed,
                method: true,
                shorthand: false,
            });
        }

        let accessor = !computed
            && !contains_esc
            && matches!(&key, Expression::Identifier(id) if id.name == "get" || id.name == "set")
            && !self.check(&Token::Comma)
            && !self.check(&Token::RBrace)
            && !self.check(&Token::Eq);
        if accessor {
            if is_generator || is_async {
                return self.unexpected();
            }
            let kind = match &key {
                Expression::Identifier(id) if id.name == "get" => PropertyKind::Get,
                _ => PropertyKind::Set,
            };
            let (key, computed) = self.parse_property_name()?;
            let value = self.parse_method(false, false, false)?;
            let expected_arity = if kind == PropertyKind::Get { 0 } else { 1 };
            if value.params.len() != expected_arity {
                let message = if kind == PropertyKind::Get {
                    "getter should have no params"
                } else {
                    "setter should have exactly one param"
                };
                self.raise_recoverable(value.span, message);
            } else if kind == PropertyKind::Set {
                if let Some(Pattern::Rest { span, .. }) = value.params.first() {
                    let span = *span;
                    self.raise_recoverable(span, "Setter cannot use rest params");
                }
            }
            return Ok(Property {
                span: self.finish_span(start),
                key,
                value: Expression::Function(Box::new(value)),
                kind,
                computed,
                method: false,
                shorthand: false,
            });
        }

        if !computed {
            if let Expression::Identifier(id) = &key {
                if is_generator || is_async {
                    return self.unexpected();
                }
                let id = id.clone();
                self.check_unreserved(&id.name, id.span, false)?;
                if id.name == "await" && self.await_ident_pos == 0 {
                    self.await_ident_pos = start;
                }
                let value = if self.check(&Token::Eq) && ref_errs.is_some() {
                    if let Some(errs) = ref_errs.as_deref_mut() {
                        if errs.shorthand_assign.is_none() {
                            errs.shorthand_assign = Some(self.cur_start());
                        }
                    }
                    self.advance();
                    let right = self.parse_maybe_assign(ForInitCtx::None, None)?;
                    Expression::Assignment {
                        span: self.finish_span(start),
                        operator: AssignOp::Assign,
                        left: Box::new(Pattern::Identifier(id.clone())),
                        right: Box::new(right),
                    }
                } else {
                    Expression::Identifier(id.clone())
                };
                return Ok(Property {
                    span: self.finish_span(start),
                    key,
                    value,
                    kind: PropertyKind::Init,
                    computed,
                    method: false,
                    shorthand: true,
                });
            }
        }
        self.unexpected()
    }

    /// Parse a property key: `[computed]`, a literal, or an identifier
    /// (reserved words allowed)
    pub(crate) fn parse_property_name(&mut self) -> ParseResult<(Expression, bool)> {
        if self.ecma_at_least(6) && self.eat(&Token::LBracket) {
            let key = self.parse_maybe_assign(ForInitCtx::None, None)?;
            self.expect(Token::RBracket)?;
            return Ok((key, true));
        }
        match self.current.as_ref().map(|t| &t.token) {
            Some(Token::Number) | Some(Token::BigInt) | Some(Token::Str) => {
                Ok((Expression::Literal(self.parse_literal()?), false))
            }
            _ => Ok((Expression::Identifier(self.parse_ident(true)?), false)),
        }
    }

    /// `__proto__` may be written at most once per object literal
    fn check_prop_clash(
        &mut self,
        member: &ObjectMember,
        proto_seen: &mut bool,
        ref_errs: Option<&mut DestructuringErrors>,
    ) {
        let ObjectMember::Property(p) = member else {
            return;
        };
        if p.computed || p.shorthand || p.method {
            return;
        }
        let name = match &p.key {
            Expression::Identifier(id) => id.name.as_str(),
            Expression::Literal(lit) => match &lit.value {
                LiteralValue::String(s) => s.as_str(),
                _ => return,
            },
            _ => return,
        };
        if name == "__proto__" && p.kind == PropertyKind::Init {
            if *proto_seen {
                let at = p.key.span();
                match ref_errs {
                    Some(errs) => {
                        if errs.double_proto.is_none() {
                            errs.double_proto = Some(at.start);
                        }
                    }
                    None => {
                        self.raise_recoverable(at, "Redefinition of __proto__ property")
                    }
                }
            }
            *proto_seen = true;
        }
    }

    /// Parse `{…}` directly in binding position
    pub(crate) fn parse_object_pattern(&mut self) -> ParseResult<Pattern> {
        let start = self.cur_start();
        self.advance();
        let mut properties = Vec::new();
        let mut first = true;
        while !self.eat(&Token::RBrace) {
            if !first {
                self.expect(Token::Comma)?;
                if self.after_trailing_comma(&Token::RBrace, false) {
                    break;
                }
            } else {
                first = false;
            }
            if self.ecma_at_least(9) && self.check(&Token::Ellipsis) {
                let rest_start = self.cur_start();
                self.advance();
                // object rest binds a plain identifier only
                let argument = Pattern::Identifier(self.parse_ident(false)?);
                if self.check(&Token::Comma) {
                    self.raise_recoverable(
                        self.cur_span(),
                        "Comma is not permitted after the rest element",
                    );
                }
                properties.push(ObjectPatternProp::Rest {
                    span: self.finish_span(rest_start),
                    argument: Box::new(argument),
                });
                continue;
            }
            let prop_start = self.cur_start();
            let (key, computed) = self.parse_property_name()?;
            let (value, shorthand) = if self.eat(&Token::Colon) {
                (self.parse_maybe_default(None, None)?, false)
            } else {
                let Expression::Identifier(id) = &key else {
                    return self.unexpected();
                };
                if computed {
                    return self.unexpected();
                }
                let id = id.clone();
                self.check_unreserved(&id.name, id.span, false)?;
                if id.name == "await" && self.await_ident_pos == 0 {
                    self.await_ident_pos = prop_start;
                }
                let value = self
                    .parse_maybe_default(Some(prop_start), Some(Pattern::Identifier(id)))?;
                (value, true)
            };
            properties.push(ObjectPatternProp::Property(PatternProperty {
                span: self.finish_span(prop_start),
                key,
                value,
                kind: PropertyKind::Init,
                computed,
                shorthand,
            }));
        }
        Ok(Pattern::Object {
            span: self.finish_span(start),
            properties,
        })
    }
}
