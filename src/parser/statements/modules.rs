//! Module declarations: import and export forms
//!
//! Every exported name lands in the duplicate-detection set; `export { x }`
//! without a `from` clause records names with no local binding yet, and the
//! top-level driver reports whatever never materialized.

use crate::ast::{
    ExportDefault, ExportSpecifier, Identifier, ImportSpecifier, ModuleExportName, Pattern,
    Statement, VariableDeclarator,
};
use crate::error::ParseResult;
use crate::token::Token;

use super::super::expressions::{ClassKind, FuncStatementFlags};
use super::super::{BindingKind, ForInitCtx, Parser};

impl<'a> Parser<'a> {
    // ==================== Import ====================

    pub(crate) fn parse_import(&mut self, start: usize) -> ParseResult<Statement> {
        self.advance();
        let (specifiers, source) = if self.check(&Token::Str) {
            (Vec::new(), self.parse_literal()?)
        } else {
            let specifiers = self.parse_import_specifiers()?;
            self.expect_contextual("from")?;
            if !self.check(&Token::Str) {
                return self.unexpected();
            }
            (specifiers, self.parse_literal()?)
        };
        self.semicolon()?;
        Ok(Statement::Import {
            span: self.finish_span(start),
            specifiers,
            source,
        })
    }

    fn parse_import_specifiers(&mut self) -> ParseResult<Vec<ImportSpecifier>> {
        let mut nodes = Vec::new();
        if self.check(&Token::Identifier) {
            let start = self.cur_start();
            let local = self.parse_ident(false)?;
            self.declare_import_binding(&local)?;
            nodes.push(ImportSpecifier::Default {
                span: self.finish_span(start),
                local,
            });
            if !self.eat(&Token::Comma) {
                return Ok(nodes);
            }
        }
        if self.check(&Token::Star) {
            let start = self.cur_start();
            self.advance();
            self.expect_contextual("as")?;
            let local = self.parse_ident(false)?;
            self.declare_import_binding(&local)?;
            nodes.push(ImportSpecifier::Namespace {
                span: self.finish_span(start),
                local,
            });
            return Ok(nodes);
        }
        self.expect(Token::LBrace)?;
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
            nodes.push(self.parse_import_specifier()?);
        }
        Ok(nodes)
    }

    fn parse_import_specifier(&mut self) -> ParseResult<ImportSpecifier> {
        let start = self.cur_start();
        let imported = self.parse_module_export_name()?;
        let local = if self.eat_contextual("as") {
            self.parse_ident(false)?
        } else {
            match &imported {
                ModuleExportName::Identifier(id) => {
                    let id = id.clone();
                    self.check_unreserved(&id.name, id.span, false)?;
                    id
                }
                ModuleExportName::Literal(lit) => {
                    return self.raise(lit.span, "Binding rvalue");
                }
            }
        };
        self.declare_import_binding(&local)?;
        Ok(ImportSpecifier::Named {
            span: self.finish_span(start),
            local,
            imported,
        })
    }

    fn declare_import_binding(&mut self, local: &Identifier) -> ParseResult<()> {
        let id = local.clone();
        self.check_lval_pattern(&Pattern::Identifier(id), BindingKind::Lexical, None)
    }

    /// An exported/imported name: identifier, or (ES2022) a string literal
    /// without lone surrogates
    pub(crate) fn parse_module_export_name(&mut self) -> ParseResult<ModuleExportName> {
        if self.ecma_at_least(13) && self.check(&Token::Str) {
            let literal = self.parse_literal()?;
            if self.string_has_lone_surrogate(&literal) {
                return self.raise(
                    literal.span,
                    "An export name cannot include a lone surrogate.",
                );
            }
            return Ok(ModuleExportName::Literal(literal));
        }
        Ok(ModuleExportName::Identifier(self.parse_ident(true)?))
    }

    // ==================== Export ====================

    pub(crate) fn parse_export(&mut self, start: usize) -> ParseResult<Statement> {
        self.advance();

        // export * [as name] from 'source'
        if self.eat(&Token::Star) {
            let exported = if self.ecma_at_least(11) && self.eat_contextual("as") {
                let name = self.parse_module_export_name()?;
                self.check_export(name.name().to_string(), name.span());
                Some(name)
            } else {
                None
            };
            self.expect_contextual("from")?;
            if !self.check(&Token::Str) {
                return self.unexpected();
            }
            let source = self.parse_literal()?;
            self.semicolon()?;
            return Ok(Statement::ExportAll {
                span: self.finish_span(start),
                exported,
                source,
            });
        }

        // export default …
        if self.eat(&Token::KwDefault) {
            self.check_export("default".to_string(), self.span_at(self.last_tok_start));
            let is_async = self.is_async_function();
            let declaration = if self.check(&Token::KwFunction) || is_async {
                let fn_start = self.cur_start();
                if is_async {
                    self.advance();
                }
                self.advance(); // `function`
                let flags = FuncStatementFlags {
                    hanging: false,
                    nullable_id: true,
                };
                let function =
                    self.parse_function_rest(fn_start, Some(flags), is_async, ForInitCtx::None)?;
                ExportDefault::Function(Box::new(function))
            } else if self.check(&Token::KwClass) {
                let class_start = self.cur_start();
                let class = self.parse_class(class_start, ClassKind::NullableId)?;
                ExportDefault::Class(Box::new(class))
            } else {
                let expr = self.parse_maybe_assign(ForInitCtx::None, None)?;
                self.semicolon()?;
                ExportDefault::Expression(Box::new(expr))
            };
            return Ok(Statement::ExportDefault {
                span: self.finish_span(start),
                declaration,
            });
        }

        // export <declaration>
        if self.should_parse_export_statement() {
            let declaration = self.parse_statement(None, false)?;
            match &declaration {
                Statement::VariableDecl(d) => {
                    let declarations = d.declarations.clone();
                    self.check_variable_export(&declarations);
                }
                Statement::FunctionDecl(f) => {
                    if let Some(id) = &f.id {
                        let (name, span) = (id.name.clone(), id.span);
                        self.check_export(name, span);
                    }
                }
                Statement::ClassDecl(c) => {
                    if let Some(id) = &c.id {
                        let (name, span) = (id.name.clone(), id.span);
                        self.check_export(name, span);
                    }
                }
                _ => {}
            }
            return Ok(Statement::ExportNamed {
                span: self.finish_span(start),
                declaration: Some(Box::new(declaration)),
                specifiers: Vec::new(),
                source: None,
            });
        }

        // export { a, b as c } [from 'source']
        let specifiers = self.parse_export_specifiers()?;
        let source = if self.eat_contextual("from") {
            if !self.check(&Token::Str) {
                return self.unexpected();
            }
            Some(self.parse_literal()?)
        } else {
            for spec in &specifiers {
                match spec.local.clone() {
                    ModuleExportName::Identifier(id) => {
                        self.check_unreserved(&id.name, id.span, false)?;
                        self.check_local_export(&id);
                    }
                    ModuleExportName::Literal(lit) => {
                        return self.raise(
                            lit.span,
                            "A string literal cannot be used as an exported binding without `from`.",
                        );
                    }
                }
            }
            None
        };
        self.semicolon()?;
        Ok(Statement::ExportNamed {
            span: self.finish_span(start),
            declaration: None,
            specifiers,
            source,
        })
    }

    fn should_parse_export_statement(&self) -> bool {
        self.current.as_ref().is_some_and(|t| {
            matches!(
                t.token,
                Token::KwVar | Token::KwConst | Token::KwClass | Token::KwFunction
            )
        }) || self.is_let(None)
            || self.is_async_function()
    }

    fn parse_export_specifiers(&mut self) -> ParseResult<Vec<ExportSpecifier>> {
        self.expect(Token::LBrace)?;
        let mut nodes = Vec::new();
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
            let start = self.cur_start();
            let local = self.parse_module_export_name()?;
            let exported = if self.eat_contextual("as") {
                self.parse_module_export_name()?
            } else {
                local.clone()
            };
            self.check_export(exported.name().to_string(), exported.span());
            nodes.push(ExportSpecifier {
                span: self.finish_span(start),
                local,
                exported,
            });
        }
        Ok(nodes)
    }

    // ==================== Export bookkeeping ====================

    pub(crate) fn check_export(&mut self, name: String, span: crate::span::Span) {
        if !self.exports.insert(name.clone()) {
            self.raise_recoverable(span, format!("Duplicate export '{}'", name));
        }
    }

    fn check_variable_export(&mut self, declarations: &[VariableDeclarator]) {
        for decl in declarations {
            self.check_pattern_export(&decl.id);
        }
    }

    fn check_pattern_export(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::Identifier(id) => {
                let (name, span) = (id.name.clone(), id.span);
                self.check_export(name, span);
            }
            Pattern::Object { properties, .. } => {
                for prop in properties {
                    match prop {
                        crate::ast::ObjectPatternProp::Property(p) => {
                            self.check_pattern_export(&p.value)
                        }
                        crate::ast::ObjectPatternProp::Rest { argument, .. } => {
                            self.check_pattern_export(argument)
                        }
                    }
                }
            }
            Pattern::Array { elements, .. } => {
                for element in elements.iter().flatten() {
                    self.check_pattern_export(element);
                }
            }
            Pattern::Assignment { left, .. } => self.check_pattern_export(left),
            Pattern::Rest { argument, .. } => self.check_pattern_export(argument),
            Pattern::Member(_) => {}
        }
    }

    /// Remember an `export { x }` whose local binding has not been seen yet
    fn check_local_export(&mut self, id: &Identifier) {
        let top = &self.scope_stack[0];
        let declared = top.lexical.iter().any(|n| n == &id.name)
            || top.var.iter().any(|n| n == &id.name);
        if !declared && !self.undefined_exports.iter().any(|(n, _)| n == &id.name) {
            self.undefined_exports.push((id.name.clone(), id.span));
        }
    }
}
