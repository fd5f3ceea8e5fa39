//! Statement parsing
//!
//! `parse_statement` dispatches on the current token. The subtle entries:
//! `let` is a declaration only when the raw lookahead says so, `async` needs
//! the no-newline `function` check, and a bare identifier followed by `:`
//! becomes a labeled statement after the fact.

mod declarations;
mod loops;
mod modules;

use crate::ast::{
    BlockStatement, CatchClause, Expression, Pattern, Statement, SwitchCase, VariableKind,
};
use crate::error::ParseResult;
use crate::token::Token;

use super::{BindingKind, ForInitCtx, Label, LabelKind, Parser, ScopeFlags};

/// Where a nested statement sits, for the grammar rules that care
/// (declarations are rejected as bare bodies; sloppy mode admits function
/// declarations under `if` and labels)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StatementContext {
    pub(crate) kind: ContextKind,
    pub(crate) labeled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContextKind {
    If,
    Label,
    For,
    Do,
    While,
    With,
}

impl StatementContext {
    pub(crate) fn of(kind: ContextKind) -> Self {
        Self {
            kind,
            labeled: false,
        }
    }

    pub(crate) fn with_label(self) -> Self {
        if self.kind == ContextKind::Label {
            self
        } else {
            Self {
                labeled: true,
                ..self
            }
        }
    }

    /// Sloppy mode tolerates `if (x) function f(){}` and `l: function f(){}`
    pub(crate) fn allows_sloppy_function(self) -> bool {
        (self.kind == ContextKind::If && !self.labeled) || self.kind == ContextKind::Label
    }
}

impl<'a> Parser<'a> {
    /// Parse one statement. `context` is set for nested positions; at top
    /// level `top_level` admits import/export.
    pub(crate) fn parse_statement(
        &mut self,
        context: Option<StatementContext>,
        top_level: bool,
    ) -> ParseResult<Statement> {
        let Some(tok) = self.current.as_ref().map(|t| t.token.clone()) else {
            return self.unexpected();
        };
        let start = self.cur_start();
        let mut tok = tok;
        let mut let_kind = false;
        if self.is_let(context) {
            tok = Token::KwVar;
            let_kind = true;
        }

        match tok {
            Token::KwBreak | Token::KwContinue => {
                self.parse_break_continue(start, tok == Token::KwBreak)
            }
            Token::KwDebugger => {
                self.advance();
                self.semicolon()?;
                Ok(Statement::Debugger {
                    span: self.finish_span(start),
                })
            }
            Token::KwDo => self.parse_do_statement(start),
            Token::KwFor => self.parse_for_statement(start),
            Token::KwFunction => {
                if let Some(ctx) = context {
                    if self.strict || !ctx.allows_sloppy_function() {
                        return self.unexpected();
                    }
                }
                self.parse_function_statement(start, false, context.is_none())
            }
            Token::KwClass => {
                if context.is_some() {
                    return self.unexpected();
                }
                self.parse_class_statement(start, false)
            }
            Token::KwIf => self.parse_if_statement(start),
            Token::KwReturn => self.parse_return_statement(start),
            Token::KwSwitch => self.parse_switch_statement(start),
            Token::KwThrow => self.parse_throw_statement(start),
            Token::KwTry => self.parse_try_statement(start),
            Token::KwConst | Token::KwVar => {
                let kind = if let_kind {
                    VariableKind::Let
                } else if tok == Token::KwConst {
                    VariableKind::Const
                } else {
                    VariableKind::Var
                };
                if context.is_some() && kind != VariableKind::Var {
                    return self.unexpected();
                }
                self.parse_var_statement(start, kind)
            }
            Token::KwWhile => self.parse_while_statement(start),
            Token::KwWith => self.parse_with_statement(start),
            Token::LBrace => Ok(Statement::Block(self.parse_block(true)?)),
            Token::Semicolon => {
                self.advance();
                Ok(Statement::Empty {
                    span: self.finish_span(start),
                })
            }
            Token::KwImport | Token::KwExport => {
                if tok == Token::KwImport
                    && self.ecma_at_least(11)
                    && matches!(self.next_significant_char(), Some('(') | Some('.'))
                {
                    // dynamic import / import.meta in expression position
                    let expression = self.parse_expression(ForInitCtx::None, None)?;
                    self.semicolon()?;
                    return Ok(Statement::Expression {
                        span: self.finish_span(start),
                        expression,
                        directive: None,
                    });
                }
                if !self.options.allow_import_export_everywhere {
                    if !top_level {
                        return self.raise(
                            self.cur_span(),
                            "'import' and 'export' may only appear at the top level",
                        );
                    }
                    if !self.in_module {
                        return self.raise(
                            self.cur_span(),
                            "'import' and 'export' may appear only with 'sourceType: module'",
                        );
                    }
                }
                if tok == Token::KwImport {
                    self.parse_import(start)
                } else {
                    self.parse_export(start)
                }
            }
            _ => {
                if self.is_async_function() {
                    if context.is_some() {
                        return self.unexpected();
                    }
                    self.advance();
                    return self.parse_function_statement(start, true, true);
                }
                let maybe_label = tok == Token::Identifier;
                let expression = self.parse_expression(ForInitCtx::None, None)?;
                if maybe_label {
                    if matches!(&expression, Expression::Identifier(_)) && self.eat(&Token::Colon)
                    {
                        let Expression::Identifier(label) = expression else {
                            unreachable!("checked above")
                        };
                        return self.parse_labeled_statement(start, label, context);
                    }
                }
                self.semicolon()?;
                Ok(Statement::Expression {
                    span: self.finish_span(start),
                    expression,
                    directive: None,
                })
            }
        }
    }

    /// `( expression )` heads of if/while/switch/with/do-while
    pub(crate) fn parse_paren_expression(&mut self) -> ParseResult<Expression> {
        self.expect(Token::LParen)?;
        let expression = self.parse_expression(ForInitCtx::None, None)?;
        self.expect(Token::RParen)?;
        Ok(expression)
    }

    /// `{ statements }`; `create_scope` is false when the caller manages the
    /// scope itself (function bodies, catch blocks)
    pub(crate) fn parse_block(&mut self, create_scope: bool) -> ParseResult<BlockStatement> {
        let start = self.cur_start();
        self.expect(Token::LBrace)?;
        if create_scope {
            self.enter_scope(ScopeFlags::empty());
        }
        let mut body = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            body.push(self.parse_statement(None, false)?);
        }
        if create_scope {
            self.exit_scope();
        }
        self.expect(Token::RBrace)?;
        Ok(BlockStatement {
            span: self.finish_span(start),
            body,
        })
    }

    fn parse_if_statement(&mut self, start: usize) -> ParseResult<Statement> {
        self.advance();
        let test = self.parse_paren_expression()?;
        let consequent = Box::new(
            self.parse_statement(Some(StatementContext::of(ContextKind::If)), false)?,
        );
        let alternate = if self.eat(&Token::KwElse) {
            Some(Box::new(
                self.parse_statement(Some(StatementContext::of(ContextKind::If)), false)?,
            ))
        } else {
            None
        };
        Ok(Statement::If {
            span: self.finish_span(start),
            test,
            consequent,
            alternate,
        })
    }

    fn parse_break_continue(&mut self, start: usize, is_break: bool) -> ParseResult<Statement> {
        let keyword = if is_break { "break" } else { "continue" };
        self.advance();
        let label = if self.eat(&Token::Semicolon) || self.insert_semicolon() {
            None
        } else if !self.check(&Token::Identifier) {
            return self.unexpected();
        } else {
            let id = self.parse_ident(false)?;
            self.semicolon()?;
            Some(id)
        };

        let mut found = false;
        for lab in &self.labels {
            if label.is_none() || lab.name.as_deref() == label.as_ref().map(|l| l.name.as_str()) {
                if lab.kind != LabelKind::None && (is_break || lab.kind == LabelKind::Loop) {
                    found = true;
                    break;
                }
                if label.is_some() && is_break {
                    found = true;
                    break;
                }
            }
        }
        if !found {
            return self.raise(self.span_at(start), format!("Unsyntactic {}", keyword));
        }

        let span = self.finish_span(start);
        Ok(if is_break {
            Statement::Break { span, label }
        } else {
            Statement::Continue { span, label }
        })
    }

    fn parse_labeled_statement(
        &mut self,
        start: usize,
        label: crate::ast::Identifier,
        context: Option<StatementContext>,
    ) -> ParseResult<Statement> {
        let name = label.name.clone();
        if self.labels.iter().any(|l| l.name.as_deref() == Some(&name)) {
            self.raise_recoverable(label.span, format!("Label '{}' is already declared", name));
        }
        let kind = match self.current.as_ref().map(|t| &t.token) {
            Some(t) if t.is_loop_keyword() => LabelKind::Loop,
            Some(Token::KwSwitch) => LabelKind::Switch,
            _ => LabelKind::None,
        };
        // labels stacked directly on this statement adopt the inner kind,
        // so `a: b: while(…)` lets both serve as continue targets
        let inner_start = self.cur_start();
        for existing in self.labels.iter_mut().rev() {
            if existing.statement_start == start {
                existing.statement_start = inner_start;
                existing.kind = kind;
            } else {
                break;
            }
        }
        self.labels.push(Label {
            name: Some(name),
            kind,
            statement_start: inner_start,
        });
        let body_context = Some(match context {
            None => StatementContext::of(ContextKind::Label),
            Some(ctx) => ctx.with_label(),
        });
        let body = Box::new(self.parse_statement(body_context, false)?);
        self.labels.pop();
        Ok(Statement::Labeled {
            span: self.finish_span(start),
            label,
            body,
        })
    }

    fn parse_return_statement(&mut self, start: usize) -> ParseResult<Statement> {
        if !self.in_function() && !self.options.allow_return_outside_function {
            return self.raise(self.cur_span(), "'return' outside of function");
        }
        self.advance();
        let argument = if self.eat(&Token::Semicolon) || self.insert_semicolon() {
            None
        } else {
            let expr = self.parse_expression(ForInitCtx::None, None)?;
            self.semicolon()?;
            Some(expr)
        };
        Ok(Statement::Return {
            span: self.finish_span(start),
            argument,
        })
    }

    fn parse_throw_statement(&mut self, start: usize) -> ParseResult<Statement> {
        self.advance();
        if self.newline_before {
            return self.raise(self.span_at(self.last_tok_end), "Illegal newline after throw");
        }
        let argument = self.parse_expression(ForInitCtx::None, None)?;
        self.semicolon()?;
        Ok(Statement::Throw {
            span: self.finish_span(start),
            argument,
        })
    }

    fn parse_switch_statement(&mut self, start: usize) -> ParseResult<Statement> {
        self.advance();
        let discriminant = self.parse_paren_expression()?;
        self.expect(Token::LBrace)?;
        self.labels.push(Label {
            name: None,
            kind: LabelKind::Switch,
            statement_start: usize::MAX,
        });
        self.enter_scope(ScopeFlags::empty());

        let mut cases: Vec<SwitchCase> = Vec::new();
        let mut saw_default = false;
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            if self.check(&Token::KwCase) || self.check(&Token::KwDefault) {
                let is_case = self.check(&Token::KwCase);
                let case_start = self.cur_start();
                if let Some(prev) = cases.last_mut() {
                    prev.span = self.source_map.span(prev.span.start, self.last_tok_end);
                }
                self.advance();
                let test = if is_case {
                    Some(self.parse_expression(ForInitCtx::None, None)?)
                } else {
                    if saw_default {
                        self.raise_recoverable(
                            self.span_at(self.last_tok_start),
                            "Multiple default clauses",
                        );
                    }
                    saw_default = true;
                    None
                };
                self.expect(Token::Colon)?;
                cases.push(SwitchCase {
                    span: self.source_map.span(case_start, self.last_tok_end),
                    test,
                    consequent: Vec::new(),
                });
            } else {
                if cases.is_empty() {
                    return self.unexpected();
                }
                let stmt = self.parse_statement(None, false)?;
                cases
                    .last_mut()
                    .expect("non-empty checked above")
                    .consequent
                    .push(stmt);
            }
        }
        if let Some(prev) = cases.last_mut() {
            prev.span = self.source_map.span(prev.span.start, self.last_tok_end);
        }
        self.exit_scope();
        self.labels.pop();
        self.expect(Token::RBrace)?;
        Ok(Statement::Switch {
            span: self.finish_span(start),
            discriminant,
            cases,
        })
    }

    fn parse_try_statement(&mut self, start: usize) -> ParseResult<Statement> {
        self.advance();
        let block = self.parse_block(true)?;
        let mut handler = None;
        if self.check(&Token::KwCatch) {
            let clause_start = self.cur_start();
            self.advance();
            let param = if self.eat(&Token::LParen) {
                let param = self.parse_binding_atom()?;
                let simple = matches!(param, Pattern::Identifier(_));
                self.enter_scope(if simple {
                    ScopeFlags::SIMPLE_CATCH
                } else {
                    ScopeFlags::empty()
                });
                let binding = if simple {
                    BindingKind::SimpleCatch
                } else {
                    BindingKind::Lexical
                };
                self.check_lval_pattern(&param, binding, None)?;
                self.expect(Token::RParen)?;
                Some(param)
            } else {
                if !self.ecma_at_least(10) {
                    return self.unexpected();
                }
                self.enter_scope(ScopeFlags::empty());
                None
            };
            let body = self.parse_block(false)?;
            self.exit_scope();
            handler = Some(CatchClause {
                span: self.finish_span(clause_start),
                param,
                body,
            });
        }
        let finalizer = if self.eat(&Token::KwFinally) {
            Some(self.parse_block(true)?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return self.raise(self.span_at(start), "Missing catch or finally clause");
        }
        Ok(Statement::Try {
            span: self.finish_span(start),
            block,
            handler,
            finalizer,
        })
    }

    fn parse_with_statement(&mut self, start: usize) -> ParseResult<Statement> {
        if self.strict {
            return self.raise(self.cur_span(), "'with' in strict mode");
        }
        self.advance();
        let object = self.parse_paren_expression()?;
        let body = Box::new(
            self.parse_statement(Some(StatementContext::of(ContextKind::With)), false)?,
        );
        Ok(Statement::With {
            span: self.finish_span(start),
            object,
            body,
        })
    }
}
