//! Expression parsing
//!
//! The grammar stack, top-down: comma sequences, assignment, conditional,
//! precedence climbing for binary/logical operators, unary prefixes and
//! postfixes, subscript chains, atoms. Each level yields to the next when
//! its token does not match.
//!
//! The climbing loop treats `??` specially: it carries `||` precedence but
//! climbs at the `&&` level, and mixing it with `||`/`&&` without
//! parentheses is rejected. `**` is folded right-associatively by the unary
//! level, never by the loop.

mod classes;
mod functions;
mod objects;
mod primary;
mod subscripts;

use crate::ast::{AssignOp, BinaryOp, Expression, LogicalOp, UnaryOp, UpdateOp};
use crate::error::ParseResult;
use crate::token::{Precedence, Token};

use super::lvalue::DestructuringErrors;
use super::{BindingKind, ForInitCtx, Parser};

pub(crate) use classes::ClassKind;
pub(crate) use functions::FuncStatementFlags;
pub(crate) use primary::ParenItem;

pub(crate) fn binary_op_from_token(token: &Token) -> Option<BinaryOp> {
    Some(match token {
        Token::EqEq => BinaryOp::Eq,
        Token::NotEq => BinaryOp::NotEq,
        Token::EqEqEq => BinaryOp::StrictEq,
        Token::NotEqEq => BinaryOp::StrictNotEq,
        Token::Lt => BinaryOp::Lt,
        Token::LtEq => BinaryOp::LtEq,
        Token::Gt => BinaryOp::Gt,
        Token::GtEq => BinaryOp::GtEq,
        Token::Shl => BinaryOp::Shl,
        Token::Shr => BinaryOp::Shr,
        Token::UShr => BinaryOp::UShr,
        Token::Plus => BinaryOp::Add,
        Token::Minus => BinaryOp::Sub,
        Token::Star => BinaryOp::Mul,
        Token::Slash => BinaryOp::Div,
        Token::Percent => BinaryOp::Mod,
        Token::Pipe => BinaryOp::BitOr,
        Token::Caret => BinaryOp::BitXor,
        Token::Amp => BinaryOp::BitAnd,
        Token::KwIn => BinaryOp::In,
        Token::KwInstanceof => BinaryOp::Instanceof,
        Token::StarStar => BinaryOp::Exp,
        _ => return None,
    })
}

pub(crate) fn logical_op_from_token(token: &Token) -> Option<LogicalOp> {
    Some(match token {
        Token::OrOr => LogicalOp::Or,
        Token::AndAnd => LogicalOp::And,
        Token::Coalesce => LogicalOp::Coalesce,
        _ => return None,
    })
}

pub(crate) fn assign_op_from_token(token: &Token) -> Option<AssignOp> {
    Some(match token {
        Token::Eq => AssignOp::Assign,
        Token::PlusEq => AssignOp::Add,
        Token::MinusEq => AssignOp::Sub,
        Token::StarEq => AssignOp::Mul,
        Token::SlashEq => AssignOp::Div,
        Token::PercentEq => AssignOp::Mod,
        Token::StarStarEq => AssignOp::Exp,
        Token::ShlEq => AssignOp::Shl,
        Token::ShrEq => AssignOp::Shr,
        Token::UShrEq => AssignOp::UShr,
        Token::AmpEq => AssignOp::BitAnd,
        Token::PipeEq => AssignOp::BitOr,
        Token::CaretEq => AssignOp::BitXor,
        Token::AndAndEq => AssignOp::And,
        Token::OrOrEq => AssignOp::Or,
        Token::CoalesceEq => AssignOp::Coalesce,
        _ => return None,
    })
}

fn unary_op_from_token(token: &Token) -> Option<UnaryOp> {
    Some(match token {
        Token::Minus => UnaryOp::Minus,
        Token::Plus => UnaryOp::Plus,
        Token::Bang => UnaryOp::Not,
        Token::Tilde => UnaryOp::BitNot,
        Token::KwTypeof => UnaryOp::Typeof,
        Token::KwVoid => UnaryOp::Void,
        Token::KwDelete => UnaryOp::Delete,
        _ => return None,
    })
}

/// Is this expression a (possibly parenthesized) plain identifier?
fn is_local_variable_access(expr: &Expression) -> bool {
    match expr {
        Expression::Identifier(_) => true,
        Expression::Paren { expression, .. } => is_local_variable_access(expression),
        _ => false,
    }
}

/// Does this expression access a private field, through chains and parens?
fn is_private_field_access(expr: &Expression) -> bool {
    match expr {
        Expression::Member(m) => matches!(m.property, Expression::PrivateIdentifier(_)),
        Expression::Chain { expression, .. } | Expression::Paren { expression, .. } => {
            is_private_field_access(expression)
        }
        _ => false,
    }
}

impl<'a> Parser<'a> {
    /// Parse a full (comma) expression
    pub(crate) fn parse_expression(
        &mut self,
        for_init: ForInitCtx,
        mut ref_errs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Expression> {
        let start = self.cur_start();
        let expr = self.parse_maybe_assign(for_init, ref_errs.as_deref_mut())?;
        if self.check(&Token::Comma) {
            let mut expressions = vec![expr];
            while self.eat(&Token::Comma) {
                expressions.push(self.parse_maybe_assign(for_init, ref_errs.as_deref_mut())?);
            }
            return Ok(Expression::Sequence {
                span: self.finish_span(start),
                expressions,
            });
        }
        Ok(expr)
    }

    /// Parse an assignment expression, resolving the maybe-pattern
    /// ambiguity when an `=` commits the left side to a pattern role
    pub(crate) fn parse_maybe_assign(
        &mut self,
        for_init: ForInitCtx,
        mut ref_errs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Expression> {
        if self.is_contextual("yield") && self.in_generator() {
            return self.parse_yield(for_init);
        }

        let owns = ref_errs.is_none();
        let mut own = DestructuringErrors::new();
        let (old_paren_assign, old_trailing, old_double_proto) = match ref_errs.as_deref_mut() {
            Some(r) => {
                let saved = (r.parenthesized_assign, r.trailing_comma, r.double_proto);
                r.parenthesized_assign = None;
                r.trailing_comma = None;
                saved
            }
            None => (None, None, None),
        };
        let errs: &mut DestructuringErrors = match ref_errs.as_deref_mut() {
            Some(r) => r,
            None => &mut own,
        };

        let start = self.cur_start();
        if self.check(&Token::LParen) || self.check(&Token::Identifier) {
            self.potential_arrow_at = Some(start);
            self.potential_arrow_in_for_await = for_init == ForInitCtx::Await;
        }
        let left = self.parse_maybe_conditional(for_init, Some(&mut *errs))?;

        let assign_tok = self
            .current
            .as_ref()
            .filter(|t| t.token.assign_op_str().is_some())
            .map(|t| t.token.clone());
        if let Some(tok) = assign_tok {
            if tok.is_logical_assign() && !self.ecma_at_least(12) {
                return self.unexpected();
            }
            let operator = assign_op_from_token(&tok).expect("assign token maps to an operator");
            let is_eq = tok == Token::Eq;
            let left_start = left.span().start;
            let left = if is_eq {
                self.to_assignable(left, false, Some(&*errs))?
            } else {
                self.to_simple_assign_target(left)?
            };
            if !owns {
                errs.parenthesized_assign = None;
                errs.trailing_comma = None;
                errs.double_proto = None;
            }
            if errs.shorthand_assign.is_some_and(|p| p >= left_start) {
                // the shorthand default turned out to be a pattern default
                errs.shorthand_assign = None;
            }
            if is_eq {
                self.check_lval_pattern(&left, BindingKind::None, None)?;
            }
            self.advance();
            let right = self.parse_maybe_assign(for_init, None)?;
            if errs.double_proto.is_none() {
                errs.double_proto = old_double_proto;
            }
            return Ok(Expression::Assignment {
                span: self.finish_span(start),
                operator,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        if owns {
            self.check_expression_errors(Some(&*errs), true)?;
        }
        if old_paren_assign.is_some() {
            errs.parenthesized_assign = old_paren_assign;
        }
        if old_trailing.is_some() {
            errs.trailing_comma = old_trailing;
        }
        Ok(left)
    }

    fn parse_maybe_conditional(
        &mut self,
        for_init: ForInitCtx,
        mut ref_errs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Expression> {
        let start = self.cur_start();
        let expr = self.parse_expr_ops(for_init, ref_errs.as_deref_mut())?;
        if self.check_expression_errors(ref_errs.as_deref(), false)? {
            return Ok(expr);
        }
        if self.eat(&Token::Question) {
            let consequent = self.parse_maybe_assign(ForInitCtx::None, None)?;
            self.expect(Token::Colon)?;
            let alternate = self.parse_maybe_assign(for_init, None)?;
            return Ok(Expression::Conditional {
                span: self.finish_span(start),
                test: Box::new(expr),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            });
        }
        Ok(expr)
    }

    fn parse_expr_ops(
        &mut self,
        for_init: ForInitCtx,
        mut ref_errs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Expression> {
        let start = self.cur_start();
        let expr = self.parse_maybe_unary(ref_errs.as_deref_mut(), false, false, for_init)?;
        if self.check_expression_errors(ref_errs.as_deref(), false)? {
            return Ok(expr);
        }
        if expr.span().start == start && matches!(expr, Expression::Arrow(_)) {
            return Ok(expr);
        }
        self.parse_expr_op(expr, start, 0, for_init)
    }

    /// Precedence climbing over the binary/logical operator table
    fn parse_expr_op(
        &mut self,
        mut left: Expression,
        left_start: usize,
        min_prec: u8,
        for_init: ForInitCtx,
    ) -> ParseResult<Expression> {
        loop {
            let Some(tok) = self.current.as_ref().map(|t| t.token.clone()) else {
                return Ok(left);
            };
            let Some((prec, _)) = tok.binary_precedence() else {
                return Ok(left);
            };
            if for_init.in_for_head() && tok == Token::KwIn {
                return Ok(left);
            }
            let mut prec = prec as u8;
            if prec <= min_prec {
                return Ok(left);
            }
            let logical = tok.is_logical_op();
            let coalesce = tok == Token::Coalesce;
            if coalesce {
                if !self.ecma_at_least(11) {
                    return self.unexpected();
                }
                // climb `??` at the `&&` level so mixing is caught below
                prec = Precedence::LogicalAnd as u8;
            }
            self.advance();
            let right_start = self.cur_start();
            let unary = self.parse_maybe_unary(None, false, false, for_init)?;
            let right = self.parse_expr_op(unary, right_start, prec, for_init)?;
            let node = self.build_binary(left_start, left, right, &tok, logical || coalesce)?;
            if (logical && self.check(&Token::Coalesce))
                || (coalesce && (self.check(&Token::OrOr) || self.check(&Token::AndAnd)))
            {
                self.raise_recoverable(
                    self.cur_span(),
                    "Logical expressions and coalesce expressions cannot be mixed. \
                     Wrap either by parentheses",
                );
            }
            left = node;
        }
    }

    pub(crate) fn build_binary(
        &mut self,
        start: usize,
        left: Expression,
        right: Expression,
        op_token: &Token,
        logical: bool,
    ) -> ParseResult<Expression> {
        if matches!(right, Expression::PrivateIdentifier(_)) {
            return self.raise(
                right.span(),
                "Private identifier can only be left side of binary expression",
            );
        }
        let span = self.finish_span(start);
        Ok(if logical {
            Expression::Logical {
                span,
                operator: logical_op_from_token(op_token).expect("logical token"),
                left: Box::new(left),
                right: Box::new(right),
            }
        } else {
            Expression::Binary {
                span,
                operator: binary_op_from_token(op_token).expect("binary token"),
                left: Box::new(left),
                right: Box::new(right),
            }
        })
    }

    /// Parse unary prefixes and postfixes, `await`, `#x in obj`, and the
    /// right-associative `**` fold
    pub(crate) fn parse_maybe_unary(
        &mut self,
        mut ref_errs: Option<&mut DestructuringErrors>,
        saw_unary: bool,
        inc_dec: bool,
        for_init: ForInitCtx,
    ) -> ParseResult<Expression> {
        let start = self.cur_start();
        let mut saw_unary = saw_unary;
        let mut expr;

        if self.is_contextual("await") && self.can_await() {
            expr = self.parse_await(for_init)?;
            saw_unary = true;
        } else if self
            .current
            .as_ref()
            .is_some_and(|t| t.token.is_update_op() || t.token.is_unary_prefix())
        {
            let tok = self
                .current
                .as_ref()
                .map(|t| t.token.clone())
                .expect("checked above");
            let update = tok.is_update_op();
            self.advance();
            let argument = self.parse_maybe_unary(None, true, update, for_init)?;
            self.check_expression_errors(ref_errs.as_deref(), true)?;
            let span = self.finish_span(start);
            if update {
                self.check_lval_simple_expr(&argument, BindingKind::None, None)?;
                let operator = if tok == Token::PlusPlus {
                    UpdateOp::Inc
                } else {
                    UpdateOp::Dec
                };
                expr = Expression::Update {
                    span,
                    operator,
                    prefix: true,
                    argument: Box::new(argument),
                };
            } else {
                let operator = unary_op_from_token(&tok).expect("prefix token");
                if self.strict
                    && operator == UnaryOp::Delete
                    && is_local_variable_access(&argument)
                {
                    self.raise_recoverable(span, "Deleting local variable in strict mode");
                } else if operator == UnaryOp::Delete && is_private_field_access(&argument) {
                    self.raise_recoverable(span, "Private fields can not be deleted");
                } else {
                    saw_unary = true;
                }
                expr = Expression::Unary {
                    span,
                    operator,
                    prefix: true,
                    argument: Box::new(argument),
                };
            }
        } else if !saw_unary && self.check(&Token::PrivateName) {
            if for_init.in_for_head() || self.private_name_stack.is_empty() {
                return self.unexpected();
            }
            expr = Expression::PrivateIdentifier(self.parse_private_ident()?);
            // a private name stands alone only as the left side of `in`
            if !self.check(&Token::KwIn) {
                return self.unexpected();
            }
        } else {
            expr = self.parse_expr_subscripts(ref_errs.as_deref_mut(), for_init)?;
            if self.check_expression_errors(ref_errs.as_deref(), false)? {
                return Ok(expr);
            }
            while self
                .current
                .as_ref()
                .is_some_and(|t| t.token.is_update_op())
                && !self.can_insert_semicolon()
            {
                self.check_lval_simple_expr(&expr, BindingKind::None, None)?;
                let operator = if self.check(&Token::PlusPlus) {
                    UpdateOp::Inc
                } else {
                    UpdateOp::Dec
                };
                self.advance();
                expr = Expression::Update {
                    span: self.finish_span(start),
                    operator,
                    prefix: false,
                    argument: Box::new(expr),
                };
            }
        }

        if !inc_dec && self.ecma_at_least(7) && self.check(&Token::StarStar) {
            let op_span = self.cur_span();
            if saw_unary {
                return Err(crate::error::ParseError::unexpected_token("**", op_span));
            }
            self.advance();
            let right = self.parse_maybe_unary(None, false, false, for_init)?;
            return self.build_binary(start, expr, right, &Token::StarStar, false);
        }
        Ok(expr)
    }

    fn parse_await(&mut self, for_init: ForInitCtx) -> ParseResult<Expression> {
        if self.await_pos == 0 {
            self.await_pos = self.cur_start();
        }
        let start = self.cur_start();
        self.advance();
        let argument = self.parse_maybe_unary(None, true, false, for_init)?;
        Ok(Expression::Await {
            span: self.finish_span(start),
            argument: Box::new(argument),
        })
    }

    fn parse_yield(&mut self, for_init: ForInitCtx) -> ParseResult<Expression> {
        if self.yield_pos == 0 {
            self.yield_pos = self.cur_start();
        }
        let start = self.cur_start();
        self.advance();
        let (delegate, argument) = if self.check(&Token::Semicolon)
            || self.can_insert_semicolon()
            || (!self.check(&Token::Star)
                && !self.current.as_ref().is_some_and(|t| t.token.starts_expr()))
        {
            (false, None)
        } else {
            let delegate = self.eat(&Token::Star);
            let argument = self.parse_maybe_assign(for_init, None)?;
            (delegate, Some(Box::new(argument)))
        };
        Ok(Expression::Yield {
            span: self.finish_span(start),
            argument,
            delegate,
        })
    }
}
