//! Class parsing: declarations, expressions, bodies, private names
//!
//! Class bodies are strict regardless of the surrounding mode. Every body
//! pushes a private-name frame; declarations and uses are reconciled when
//! the frame pops, with unresolved uses forwarded to the enclosing class.

use crate::ast::{
    Class, ClassBody, ClassElement, Expression, Identifier, LiteralValue, MethodDefinition,
    MethodKind, Pattern, PropertyDefinition, Statement,
};
use crate::error::ParseResult;
use crate::token::Token;

use super::super::{BindingKind, ForInitCtx, Parser, PrivateSlot, ScopeFlags};

/// Naming rules for the class being parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClassKind {
    /// Declaration: the name is required and bound lexically
    Statement,
    /// `export default class`: the name is optional
    NullableId,
    /// Expression: the name is optional and binds nothing outside
    Expression,
}

fn check_key_name(key: &Expression, computed: bool, name: &str) -> bool {
    if computed {
        return false;
    }
    match key {
        Expression::Identifier(id) => id.name == name,
        Expression::Literal(lit) => matches!(&lit.value, LiteralValue::String(s) if s == name),
        _ => false,
    }
}

fn private_slot(kind: MethodKind, is_static: bool) -> PrivateSlot {
    match (kind, is_static) {
        (MethodKind::Get, false) => PrivateSlot::InstanceGet,
        (MethodKind::Set, false) => PrivateSlot::InstanceSet,
        (MethodKind::Get, true) => PrivateSlot::StaticGet,
        (MethodKind::Set, true) => PrivateSlot::StaticSet,
        _ => PrivateSlot::Value,
    }
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_class_statement(
        &mut self,
        start: usize,
        nullable_id: bool,
    ) -> ParseResult<Statement> {
        let kind = if nullable_id {
            ClassKind::NullableId
        } else {
            ClassKind::Statement
        };
        let class = self.parse_class(start, kind)?;
        Ok(Statement::ClassDecl(Box::new(class)))
    }

    pub(crate) fn parse_class_expression(&mut self) -> ParseResult<Expression> {
        let start = self.cur_start();
        let class = self.parse_class(start, ClassKind::Expression)?;
        Ok(Expression::Class(Box::new(class)))
    }

    /// Parse a class from the `class` keyword on
    pub(crate) fn parse_class(&mut self, start: usize, kind: ClassKind) -> ParseResult<Class> {
        let old_strict = self.strict;
        self.strict = true;
        self.advance();

        let id = if self.check(&Token::Identifier) {
            let id = self.parse_ident(false)?;
            if kind == ClassKind::Statement {
                let cloned = id.clone();
                self.check_lval_pattern(
                    &Pattern::Identifier(cloned),
                    BindingKind::Lexical,
                    None,
                )?;
            }
            Some(id)
        } else {
            if kind == ClassKind::Statement {
                return self.unexpected();
            }
            None
        };

        let super_class = if self.eat(&Token::KwExtends) {
            Some(Box::new(self.parse_expr_subscripts(None, ForInitCtx::None)?))
        } else {
            None
        };

        self.enter_class_body();
        let body_start = self.cur_start();
        self.expect(Token::LBrace)?;
        let mut elements = Vec::new();
        let mut had_constructor = false;
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            if self.eat(&Token::Semicolon) {
                continue;
            }
            let element = self.parse_class_element(super_class.is_some())?;
            match &element {
                ClassElement::Method(m) if m.kind == MethodKind::Constructor => {
                    if had_constructor {
                        self.raise_recoverable(m.span, "Duplicate constructor in the same class");
                    }
                    had_constructor = true;
                }
                _ => self.declare_private_element(&element),
            }
            elements.push(element);
        }
        self.expect(Token::RBrace)?;
        let body = ClassBody {
            span: self.finish_span(body_start),
            body: elements,
        };
        self.exit_class_body()?;
        self.strict = old_strict;
        Ok(Class {
            span: self.finish_span(start),
            id,
            super_class,
            body,
        })
    }

    fn declare_private_element(&mut self, element: &ClassElement) {
        let (key, slot) = match element {
            ClassElement::Method(m) => (&m.key, private_slot(m.kind, m.is_static)),
            ClassElement::Property(p) => (&p.key, PrivateSlot::Value),
            ClassElement::StaticBlock { .. } => return,
        };
        if let Expression::PrivateIdentifier(p) = key {
            let name = p.name.clone();
            let span = p.span;
            if self.declare_private_name(&name, slot) {
                self.raise_recoverable(
                    span,
                    format!("Identifier '#{}' has already been declared", name),
                );
            }
        }
    }

    fn is_class_element_name_start(&self) -> bool {
        self.current.as_ref().is_some_and(|t| {
            matches!(
                t.token,
                Token::Identifier
                    | Token::PrivateName
                    | Token::Number
                    | Token::BigInt
                    | Token::Str
                    | Token::LBracket
            ) || t.token.keyword_name().is_some()
        })
    }

    fn parse_class_element(
        &mut self,
        constructor_allows_super: bool,
    ) -> ParseResult<ClassElement> {
        let start = self.cur_start();
        let mut key_name: Option<&'static str> = None;
        let mut is_static = false;
        let mut is_async = false;
        let mut is_generator = false;
        let mut kind = MethodKind::Method;

        if self.eat_contextual("static") {
            if self.ecma_at_least(13) && self.check(&Token::LBrace) {
                return self.parse_class_static_block(start);
            }
            if self.is_class_element_name_start() || self.check(&Token::Star) {
                is_static = true;
            } else {
                key_name = Some("static");
            }
        }
        if key_name.is_none() && self.ecma_at_least(8) && self.eat_contextual("async") {
            if (self.is_class_element_name_start() || self.check(&Token::Star))
                && !self.can_insert_semicolon()
            {
                is_async = true;
            } else {
                key_name = Some("async");
            }
        }
        if key_name.is_none() && (self.ecma_at_least(9) || !is_async) && self.eat(&Token::Star) {
            is_generator = true;
        }
        if key_name.is_none() && !is_async && !is_generator {
            let which = if self.is_contextual("get") {
                Some(("get", MethodKind::Get))
            } else if self.is_contextual("set") {
                Some(("set", MethodKind::Set))
            } else {
                None
            };
            if let Some((word, accessor_kind)) = which {
                self.advance();
                if self.is_class_element_name_start() {
                    kind = accessor_kind;
                } else {
                    key_name = Some(word);
                }
            }
        }

        let (key, computed) = if let Some(name) = key_name {
            // the modifier word was not a modifier; it is the element name
            let span = self
                .source_map
                .span(self.last_tok_start, self.last_tok_end);
            (
                Expression::Identifier(Identifier {
                    span,
                    name: name.to_string(),
                }),
                false,
            )
        } else {
            self.parse_class_element_name()?
        };

        if !self.ecma_at_least(13)
            || self.check(&Token::LParen)
            || kind != MethodKind::Method
            || is_generator
            || is_async
        {
            let is_constructor = !is_static && check_key_name(&key, computed, "constructor");
            if is_constructor && kind != MethodKind::Method {
                return self.raise(key.span(), "Constructor can't have get/set modifier");
            }
            let allows_direct_super = is_constructor && constructor_allows_super;
            let final_kind = if is_constructor {
                MethodKind::Constructor
            } else {
                kind
            };
            self.parse_class_method(
                start,
                key,
                computed,
                is_static,
                final_kind,
                is_generator,
                is_async,
                allows_direct_super,
            )
        } else {
            self.parse_class_field(start, key, computed, is_static)
        }
    }

    fn parse_class_element_name(&mut self) -> ParseResult<(Expression, bool)> {
        if self.check(&Token::PrivateName) {
            if self.cur_text() == "#constructor" {
                return self.raise(
                    self.cur_span(),
                    "Classes can't have an element named '#constructor'",
                );
            }
            let private = self.parse_private_ident()?;
            return Ok((Expression::PrivateIdentifier(private), false));
        }
        self.parse_property_name()
    }

    #[allow(clippy::too_many_arguments)]
    fn parse_class_method(
        &mut self,
        start: usize,
        key: Expression,
        computed: bool,
        is_static: bool,
        kind: MethodKind,
        is_generator: bool,
        is_async: bool,
        allows_direct_super: bool,
    ) -> ParseResult<ClassElement> {
        if kind == MethodKind::Constructor {
            if is_generator {
                return self.raise(key.span(), "Constructor can't be a generator");
            }
            if is_async {
                return self.raise(key.span(), "Constructor can't be an async method");
            }
        } else if is_static && check_key_name(&key, computed, "prototype") {
            return self.raise(
                key.span(),
                "Classes may not have a static property named prototype",
            );
        }

        let value = self.parse_method(is_generator, is_async, allows_direct_super)?;

        if kind == MethodKind::Get && !value.params.is_empty() {
            self.raise_recoverable(value.span, "getter should have no params");
        }
        if kind == MethodKind::Set {
            if value.params.len() != 1 {
                self.raise_recoverable(value.span, "setter should have exactly one param");
            } else if let Some(Pattern::Rest { span, .. }) = value.params.first() {
                let span = *span;
                self.raise_recoverable(span, "Setter cannot use rest params");
            }
        }

        Ok(ClassElement::Method(MethodDefinition {
            span: self.finish_span(start),
            key,
            value,
            kind,
            computed,
            is_static,
        }))
    }

    fn parse_class_field(
        &mut self,
        start: usize,
        key: Expression,
        computed: bool,
        is_static: bool,
    ) -> ParseResult<ClassElement> {
        if check_key_name(&key, computed, "constructor") {
            return self.raise(key.span(), "Classes can't have a field named 'constructor'");
        }
        if is_static && check_key_name(&key, computed, "prototype") {
            return self.raise(
                key.span(),
                "Classes can't have a static field named 'prototype'",
            );
        }
        let value = if self.eat(&Token::Eq) {
            // `arguments` is off limits for the whole initializer
            let previous = {
                let scope = self.current_this_scope_mut();
                let previous = scope.in_class_field_init;
                scope.in_class_field_init = true;
                previous
            };
            let value = self.parse_maybe_assign(ForInitCtx::None, None)?;
            self.current_this_scope_mut().in_class_field_init = previous;
            Some(value)
        } else {
            None
        };
        self.semicolon()?;
        Ok(ClassElement::Property(PropertyDefinition {
            span: self.finish_span(start),
            key,
            value,
            computed,
            is_static,
        }))
    }

    fn parse_class_static_block(&mut self, start: usize) -> ParseResult<ClassElement> {
        self.expect(Token::LBrace)?;
        let old_labels = std::mem::take(&mut self.labels);
        self.enter_scope(ScopeFlags::CLASS_STATIC_BLOCK | ScopeFlags::SUPER);
        let mut body = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            body.push(self.parse_statement(None, false)?);
        }
        self.expect(Token::RBrace)?;
        self.exit_scope();
        self.labels = old_labels;
        Ok(ClassElement::StaticBlock {
            span: self.finish_span(start),
            body,
        })
    }
}
