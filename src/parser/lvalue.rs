//! Destructuring conversion and lvalue validation
//!
//! Ambiguous constructs (`({a} = b)`, arrow parameter lists) parse as
//! expressions first; once `=` or `=>` commits them to a pattern role, the
//! converter here rebuilds the subtree in the pattern alphabet. The checkers
//! validate targets, enforce strict-mode name restrictions and record
//! bindings into the scope stack.

use std::collections::HashSet;

use crate::ast::{
    AssignOp, Expression, Identifier, ObjectMember, ObjectPatternProp, Pattern, PatternProperty,
    PropertyKind,
};
use crate::error::ParseResult;

use super::{BindingKind, Parser};

/// Delayed-error record for constructs whose expression/pattern role is not
/// yet known; each field stores the earliest offending offset
#[derive(Debug, Default)]
pub(crate) struct DestructuringErrors {
    pub(crate) shorthand_assign: Option<usize>,
    pub(crate) trailing_comma: Option<usize>,
    pub(crate) parenthesized_assign: Option<usize>,
    pub(crate) parenthesized_bind: Option<usize>,
    pub(crate) double_proto: Option<usize>,
}

impl DestructuringErrors {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

/// Is this expression a valid simple assignment target, parens stripped?
pub(crate) fn is_simple_assign_target(expr: &Expression) -> bool {
    match expr {
        Expression::Paren { expression, .. } => is_simple_assign_target(expression),
        Expression::Identifier(_) | Expression::Member(_) => true,
        _ => false,
    }
}

impl<'a> Parser<'a> {
    /// Promote delayed expression-role errors. With `and_throw` the first
    /// offending offset raises; otherwise returns whether one is recorded.
    pub(crate) fn check_expression_errors(
        &mut self,
        ref_errs: Option<&DestructuringErrors>,
        and_throw: bool,
    ) -> ParseResult<bool> {
        let Some(errs) = ref_errs else {
            return Ok(false);
        };
        if !and_throw {
            return Ok(errs.shorthand_assign.is_some() || errs.double_proto.is_some());
        }
        if let Some(pos) = errs.shorthand_assign {
            return self.raise(
                self.span_at(pos),
                "Shorthand property assignments are valid only in destructuring patterns",
            );
        }
        if let Some(pos) = errs.double_proto {
            self.raise_recoverable(self.span_at(pos), "Redefinition of __proto__ property");
        }
        Ok(false)
    }

    /// Promote delayed pattern-role errors
    pub(crate) fn check_pattern_errors(
        &mut self,
        ref_errs: Option<&DestructuringErrors>,
        is_assign: bool,
    ) -> ParseResult<()> {
        let Some(errs) = ref_errs else {
            return Ok(());
        };
        if let Some(pos) = errs.trailing_comma {
            self.raise_recoverable(
                self.span_at(pos),
                "Comma is not permitted after the rest element",
            );
        }
        let parens = if is_assign {
            errs.parenthesized_assign
        } else {
            errs.parenthesized_bind
        };
        if let Some(pos) = parens {
            let message = if is_assign {
                "Assigning to rvalue"
            } else {
                "Parenthesized pattern"
            };
            self.raise_recoverable(self.span_at(pos), message);
        }
        Ok(())
    }

    /// A `yield`/`await` recorded inside what turned out to be a parameter
    /// list is an error
    pub(crate) fn check_yield_await_in_default_params(&mut self) -> ParseResult<()> {
        if self.yield_pos != 0 && (self.await_pos == 0 || self.yield_pos < self.await_pos) {
            return self.raise(
                self.span_at(self.yield_pos),
                "Yield expression cannot be a default value",
            );
        }
        if self.await_pos != 0 {
            return self.raise(
                self.span_at(self.await_pos),
                "Await expression cannot be a default value",
            );
        }
        Ok(())
    }

    /// Rebuild an expression subtree in the pattern alphabet.
    ///
    /// `is_binding` distinguishes declarations (member expressions rejected)
    /// from destructuring assignments (member expressions allowed).
    pub(crate) fn to_assignable(
        &mut self,
        expr: Expression,
        is_binding: bool,
        ref_errs: Option<&DestructuringErrors>,
    ) -> ParseResult<Pattern> {
        match expr {
            Expression::Identifier(id) => {
                if self.in_async() && id.name == "await" {
                    return self.raise(
                        id.span,
                        "Cannot use 'await' as identifier inside an async function",
                    );
                }
                Ok(Pattern::Identifier(id))
            }
            Expression::Object { span, properties } => {
                self.check_pattern_errors(ref_errs, true)?;
                let mut props = Vec::with_capacity(properties.len());
                for member in properties {
                    match member {
                        ObjectMember::Property(p) => {
                            if p.kind != PropertyKind::Init {
                                return self.raise(
                                    p.key.span(),
                                    "Object pattern can't contain getter or setter",
                                );
                            }
                            let value = self.to_assignable(p.value, is_binding, None)?;
                            props.push(ObjectPatternProp::Property(PatternProperty {
                                span: p.span,
                                key: p.key,
                                value,
                                kind: PropertyKind::Init,
                                computed: p.computed,
                                shorthand: p.shorthand,
                            }));
                        }
                        ObjectMember::Spread { span: rest_span, argument } => {
                            let argument = self.to_assignable(argument, is_binding, None)?;
                            if let Pattern::Assignment { span, .. } = &argument {
                                return self
                                    .raise(*span, "Rest elements cannot have a default value");
                            }
                            props.push(ObjectPatternProp::Rest {
                                span: rest_span,
                                argument: Box::new(argument),
                            });
                        }
                    }
                }
                Ok(Pattern::Object {
                    span,
                    properties: props,
                })
            }
            Expression::Array { span, elements } => {
                self.check_pattern_errors(ref_errs, true)?;
                let elements = self.to_assignable_list(elements, is_binding)?;
                Ok(Pattern::Array { span, elements })
            }
            Expression::Spread { span, argument } => {
                let argument = self.to_assignable(*argument, is_binding, None)?;
                if let Pattern::Assignment { span, .. } = &argument {
                    return self.raise(*span, "Rest elements cannot have a default value");
                }
                Ok(Pattern::Rest {
                    span,
                    argument: Box::new(argument),
                })
            }
            Expression::Assignment {
                span,
                operator,
                left,
                right,
            } => {
                if operator != AssignOp::Assign {
                    return self.raise(
                        left.span(),
                        "Only '=' operator can be used for specifying default value.",
                    );
                }
                Ok(Pattern::Assignment { span, left, right })
            }
            Expression::Paren { expression, .. } => {
                self.to_assignable(*expression, is_binding, ref_errs)
            }
            Expression::Member(m) => {
                if is_binding {
                    self.raise(m.span, "Binding member expression")
                } else {
                    Ok(Pattern::Member(m))
                }
            }
            Expression::Chain { span, .. } => {
                self.raise(span, "Optional chaining cannot appear in left-hand side")
            }
            other => {
                let span = other.span();
                let message = if is_binding {
                    "Binding rvalue"
                } else {
                    "Assigning to rvalue"
                };
                self.raise(span, message)
            }
        }
    }

    /// Convert an element list (holes preserved); a binding rest must end
    /// in a plain identifier
    pub(crate) fn to_assignable_list(
        &mut self,
        elements: Vec<Option<Expression>>,
        is_binding: bool,
    ) -> ParseResult<Vec<Option<Pattern>>> {
        let mut out = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                None => out.push(None),
                Some(e) => out.push(Some(self.to_assignable(e, is_binding, None)?)),
            }
        }
        if is_binding {
            if let Some(Some(Pattern::Rest { argument, .. })) = out.last() {
                if !matches!(argument.as_ref(), Pattern::Identifier(_)) {
                    return self.unexpected_at(argument.span().start);
                }
            }
        }
        Ok(out)
    }

    /// Convert arrow parameters (an expression list without holes)
    pub(crate) fn to_assignable_params(
        &mut self,
        exprs: Vec<Expression>,
    ) -> ParseResult<Vec<Pattern>> {
        let wrapped = exprs.into_iter().map(Some).collect();
        let params = self.to_assignable_list(wrapped, true)?;
        Ok(params.into_iter().map(|p| p.expect("no holes")).collect())
    }

    // ==================== LValue checking ====================

    fn check_lval_ident(
        &mut self,
        id: &Identifier,
        binding: BindingKind,
        clashes: Option<&mut HashSet<String>>,
    ) -> ParseResult<()> {
        let is_bind = binding != BindingKind::None;
        if self.strict && self.is_strict_bind_reserved(&id.name) {
            let verb = if is_bind { "Binding" } else { "Assigning to" };
            self.raise_recoverable(id.span, format!("{} {} in strict mode", verb, id.name));
        }
        if is_bind {
            if binding == BindingKind::Lexical && id.name == "let" {
                self.raise_recoverable(id.span, "let is disallowed as a lexically bound name");
            }
            if let Some(set) = clashes {
                if !set.insert(id.name.clone()) {
                    self.raise_recoverable(id.span, "Argument name clash");
                }
            }
            if binding != BindingKind::Outside {
                self.declare_name(&id.name.clone(), binding, id.span);
            }
        }
        Ok(())
    }

    /// Validate a simple target: identifier, member expression, or a
    /// parenthesized one
    pub(crate) fn check_lval_simple_expr(
        &mut self,
        expr: &Expression,
        binding: BindingKind,
        clashes: Option<&mut HashSet<String>>,
    ) -> ParseResult<()> {
        match expr {
            Expression::Identifier(id) => self.check_lval_ident(id, binding, clashes),
            Expression::Chain { span, .. } => {
                self.raise_recoverable(
                    *span,
                    "Optional chaining cannot appear in left-hand side",
                );
                Ok(())
            }
            Expression::Member(_) => {
                if binding != BindingKind::None {
                    self.raise_recoverable(expr.span(), "Binding member expression");
                }
                Ok(())
            }
            Expression::Paren { expression, .. } => {
                if binding != BindingKind::None {
                    self.raise_recoverable(expr.span(), "Binding parenthesized expression");
                    Ok(())
                } else {
                    self.check_lval_simple_expr(expression, binding, clashes)
                }
            }
            _ => {
                let verb = if binding != BindingKind::None {
                    "Binding"
                } else {
                    "Assigning to"
                };
                self.raise(expr.span(), format!("{} rvalue", verb))
            }
        }
    }

    /// Validate a pattern target, recursing through object/array structure
    pub(crate) fn check_lval_pattern(
        &mut self,
        pattern: &Pattern,
        binding: BindingKind,
        mut clashes: Option<&mut HashSet<String>>,
    ) -> ParseResult<()> {
        match pattern {
            Pattern::Identifier(id) => self.check_lval_ident(id, binding, clashes),
            Pattern::Object { properties, .. } => {
                for prop in properties {
                    match prop {
                        ObjectPatternProp::Property(p) => {
                            self.check_lval_inner_pattern(&p.value, binding, clashes.as_deref_mut())?
                        }
                        ObjectPatternProp::Rest { argument, .. } => self.check_lval_inner_pattern(
                            argument,
                            binding,
                            clashes.as_deref_mut(),
                        )?,
                    }
                }
                Ok(())
            }
            Pattern::Array { elements, .. } => {
                for element in elements.iter().flatten() {
                    self.check_lval_inner_pattern(element, binding, clashes.as_deref_mut())?;
                }
                Ok(())
            }
            Pattern::Member(_) => {
                if binding != BindingKind::None {
                    self.raise_recoverable(pattern.span(), "Binding member expression");
                }
                Ok(())
            }
            Pattern::Assignment { .. } | Pattern::Rest { .. } => {
                let verb = if binding != BindingKind::None {
                    "Binding"
                } else {
                    "Assigning to"
                };
                self.raise(pattern.span(), format!("{} rvalue", verb))
            }
        }
    }

    /// Validate a pattern element: defaults and rests unwrap before the
    /// pattern check
    pub(crate) fn check_lval_inner_pattern(
        &mut self,
        pattern: &Pattern,
        binding: BindingKind,
        clashes: Option<&mut HashSet<String>>,
    ) -> ParseResult<()> {
        match pattern {
            Pattern::Assignment { left, .. } => self.check_lval_pattern(left, binding, clashes),
            Pattern::Rest { argument, .. } => self.check_lval_pattern(argument, binding, clashes),
            _ => self.check_lval_pattern(pattern, binding, clashes),
        }
    }

    /// Validate and convert a compound-assignment or update target
    pub(crate) fn to_simple_assign_target(&mut self, expr: Expression) -> ParseResult<Pattern> {
        self.check_lval_simple_expr(&expr, BindingKind::None, None)?;
        self.strip_to_target(expr)
    }

    fn strip_to_target(&mut self, expr: Expression) -> ParseResult<Pattern> {
        match expr {
            Expression::Identifier(id) => Ok(Pattern::Identifier(id)),
            Expression::Member(m) => Ok(Pattern::Member(m)),
            Expression::Paren { expression, .. } => self.strip_to_target(*expression),
            other => self.raise(other.span(), "Assigning to rvalue"),
        }
    }

    // ==================== Binding patterns ====================

    /// Parse a binding target: identifier, array pattern, or object pattern
    pub(crate) fn parse_binding_atom(&mut self) -> ParseResult<Pattern> {
        if self.ecma_at_least(6) {
            if self.check(&crate::token::Token::LBracket) {
                let start = self.cur_start();
                self.advance();
                let elements =
                    self.parse_binding_list(&crate::token::Token::RBracket, true, true)?;
                return Ok(Pattern::Array {
                    span: self.finish_span(start),
                    elements,
                });
            }
            if self.check(&crate::token::Token::LBrace) {
                return self.parse_object_pattern();
            }
        }
        Ok(Pattern::Identifier(self.parse_ident(false)?))
    }

    /// Parse a comma-separated binding list up to `close`; `allow_empty`
    /// admits array-pattern holes
    pub(crate) fn parse_binding_list(
        &mut self,
        close: &crate::token::Token,
        allow_empty: bool,
        allow_trailing_comma: bool,
    ) -> ParseResult<Vec<Option<Pattern>>> {
        use crate::token::Token;
        let mut elements = Vec::new();
        let mut first = true;
        while !self.eat(close) {
            if first {
                first = false;
            } else {
                self.expect(Token::Comma)?;
            }
            if allow_empty && self.check(&Token::Comma) {
                elements.push(None);
            } else if allow_trailing_comma && self.after_trailing_comma(close, false) {
                break;
            } else if self.check(&Token::Ellipsis) {
                let rest = self.parse_rest_binding()?;
                elements.push(Some(rest));
                if self.check(&Token::Comma) {
                    self.raise_recoverable(
                        self.cur_span(),
                        "Comma is not permitted after the rest element",
                    );
                }
                self.expect(close.clone())?;
                break;
            } else {
                elements.push(Some(self.parse_maybe_default(None, None)?));
            }
        }
        Ok(elements)
    }

    /// Parse `...target` in binding position
    pub(crate) fn parse_rest_binding(&mut self) -> ParseResult<Pattern> {
        let start = self.cur_start();
        self.advance();
        let argument = self.parse_binding_atom()?;
        Ok(Pattern::Rest {
            span: self.finish_span(start),
            argument: Box::new(argument),
        })
    }

    /// Parse a binding target with an optional `= default`
    pub(crate) fn parse_maybe_default(
        &mut self,
        start: Option<usize>,
        left: Option<Pattern>,
    ) -> ParseResult<Pattern> {
        let start = start.unwrap_or_else(|| self.cur_start());
        let left = match left {
            Some(l) => l,
            None => self.parse_binding_atom()?,
        };
        if !self.ecma_at_least(6) || !self.eat(&crate::token::Token::Eq) {
            return Ok(left);
        }
        let right = self.parse_maybe_assign(super::ForInitCtx::None, None)?;
        Ok(Pattern::Assignment {
            span: self.finish_span(start),
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}
