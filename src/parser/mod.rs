//! Recursive descent parser for ECMAScript
//!
//! Converts the token stream from the lexer into an ESTree-shaped AST.
//! Submodules carry the grammar: `expressions` for the operator-precedence
//! core, `statements` for keyword dispatch, `lvalue` for the
//! expression-to-pattern machinery, `scope` for binding and label tracking.

mod expressions;
mod literals;
mod lvalue;
mod scope;
mod statements;

use std::collections::HashSet;

use crate::ast::{Expression, Identifier, PrivateIdentifier, Program, SourceType, Statement};
use crate::error::{ParseError, ParseErrors, ParseResult};
use crate::lexer::{Lexer, SpannedToken};
use crate::options::Options;
use crate::span::{SourceMap, Span};
use crate::token::Token;

pub(crate) use scope::{
    BindingKind, Label, LabelKind, PrivateNameFrame, PrivateSlot, Scope, ScopeFlags,
};
pub(crate) use statements::StatementContext;

/// `for`-head context threaded through expression parsing: outside a `for`
/// head, inside one (`in` forbidden), or inside a `for await` head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ForInitCtx {
    None,
    Init,
    Await,
}

impl ForInitCtx {
    pub(crate) fn in_for_head(self) -> bool {
        !matches!(self, ForInitCtx::None)
    }
}

/// A collected comment
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// `/* */` (true) or `//` (false)
    pub block: bool,
    /// Comment text, delimiters included
    pub text: String,
    pub span: Span,
}

/// Everything a parse produces besides the tree itself
#[derive(Debug)]
pub struct ParseOutput {
    pub program: Program,
    /// Recoverable errors, in source order
    pub errors: Vec<ParseError>,
    /// Comments, when collection was requested
    pub comments: Vec<Comment>,
    /// Offsets where ASI inserted a semicolon
    pub inserted_semicolons: Vec<usize>,
    /// Offsets of tolerated trailing commas
    pub trailing_commas: Vec<usize>,
}

/// ECMAScript parser
///
/// One instance owns one parse: the token position, strict-mode flag, scope
/// and label stacks, and the delayed-error bookkeeping that resolves the
/// grammar's arrow/pattern ambiguities.
pub struct Parser<'a> {
    pub(crate) source: &'a str,
    pub(crate) options: Options,
    pub(crate) lexer: Lexer<'a>,
    pub(crate) source_map: SourceMap,
    /// Current token (one-token window)
    pub(crate) current: Option<SpannedToken<'a>>,
    /// A line terminator appeared before the current token
    pub(crate) newline_before: bool,
    pub(crate) last_tok_start: usize,
    pub(crate) last_tok_end: usize,
    pub(crate) strict: bool,
    pub(crate) in_module: bool,
    pub(crate) scope_stack: Vec<Scope>,
    pub(crate) labels: Vec<Label>,
    pub(crate) private_name_stack: Vec<PrivateNameFrame>,
    /// First `yield` offset in a parameter-list candidate (0 = unset)
    pub(crate) yield_pos: usize,
    /// First `await` expression offset in a parameter-list candidate
    pub(crate) await_pos: usize,
    /// First `await`-as-identifier offset in a parameter-list candidate
    pub(crate) await_ident_pos: usize,
    /// Offset where a `(` or name could begin an arrow function
    pub(crate) potential_arrow_at: Option<usize>,
    pub(crate) potential_arrow_in_for_await: bool,
    /// `export { x }` names with no local binding yet, in source order
    pub(crate) undefined_exports: Vec<(String, Span)>,
    /// All exported names, for duplicate detection
    pub(crate) exports: HashSet<String>,
    pub(crate) errors: ParseErrors,
    pub(crate) comments: Vec<Comment>,
    pub(crate) inserted_semicolons: Vec<usize>,
    pub(crate) trailing_commas: Vec<usize>,
}

impl<'a> std::fmt::Debug for Parser<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("current", &self.current)
            .field("strict", &self.strict)
            .field("in_module", &self.in_module)
            .finish_non_exhaustive()
    }
}

impl<'a> Parser<'a> {
    /// Create a parser for `source`
    pub fn new(source: &'a str, options: Options) -> Self {
        let source_map = SourceMap::new(source);
        let lexer = Lexer::with_hashbang(source, options.allow_hash_bang);
        let in_module = options.source_type == SourceType::Module;
        let mut parser = Self {
            source,
            lexer,
            source_map,
            current: None,
            newline_before: false,
            last_tok_start: 0,
            last_tok_end: 0,
            strict: false,
            in_module,
            scope_stack: Vec::new(),
            labels: Vec::new(),
            private_name_stack: Vec::new(),
            yield_pos: 0,
            await_pos: 0,
            await_ident_pos: 0,
            potential_arrow_at: None,
            potential_arrow_in_for_await: false,
            undefined_exports: Vec::new(),
            exports: HashSet::new(),
            errors: ParseErrors::new(),
            comments: Vec::new(),
            inserted_semicolons: Vec::new(),
            trailing_commas: Vec::new(),
            options,
        };
        parser.enter_scope(ScopeFlags::TOP);
        parser.strict = in_module || parser.strict_directive(parser.lexer.position());
        parser
    }

    /// Run the parse to completion
    ///
    /// Fatal errors abort with `Err`; recoverable errors are collected in
    /// the output.
    pub fn parse(mut self) -> ParseResult<ParseOutput> {
        let program = self.parse_top_level()?;
        Ok(ParseOutput {
            program,
            errors: self.errors.take(),
            comments: self.comments,
            inserted_semicolons: self.inserted_semicolons,
            trailing_commas: self.trailing_commas,
        })
    }

    fn parse_top_level(&mut self) -> ParseResult<Program> {
        self.advance();
        let mut body: Vec<Statement> = Vec::new();
        while !self.is_at_end() {
            body.push(self.parse_statement(None, true)?);
        }
        if self.in_module {
            for (name, span) in std::mem::take(&mut self.undefined_exports) {
                self.raise_recoverable(span, format!("Export '{}' is not defined", name));
            }
        }
        Self::adapt_directive_prologue(self.source, &mut body);
        let span = self.source_map.span(0, self.source.len());
        Ok(Program {
            span,
            source_type: self.options.source_type,
            body,
            source_file: self.options.direct_source_file.clone(),
        })
    }

    /// Copy the raw inner text of leading string-literal statements into
    /// their `directive` slot
    pub(crate) fn adapt_directive_prologue(source: &str, body: &mut [Statement]) {
        for stmt in body.iter_mut() {
            let Statement::Expression {
                expression: Expression::Literal(lit),
                directive,
                ..
            } = stmt
            else {
                break;
            };
            if !lit.is_string() {
                break;
            }
            let raw = &source[lit.span.start..lit.span.end];
            if !(raw.starts_with('"') || raw.starts_with('\'')) {
                break;
            }
            *directive = Some(raw[1..raw.len() - 1].to_string());
        }
    }

    // ==================== Token Management ====================

    /// Advance to the next significant token, tracking line breaks and
    /// collecting comments
    pub(crate) fn advance(&mut self) -> Option<SpannedToken<'a>> {
        let prev = self.current.take();
        if let Some(t) = &prev {
            self.last_tok_start = t.span.start;
            self.last_tok_end = t.span.end;
        }
        self.newline_before = false;
        loop {
            match self.lexer.next_token() {
                Some(Ok(tok)) => match tok.token {
                    Token::Newline => self.newline_before = true,
                    Token::LineComment | Token::BlockComment => {
                        if crate::span::contains_line_break(tok.text) {
                            self.newline_before = true;
                        }
                        if self.options.collect_comments {
                            self.comments.push(Comment {
                                block: tok.token == Token::BlockComment,
                                text: tok.text.to_string(),
                                span: tok.span,
                            });
                        }
                    }
                    _ => {
                        self.current = Some(tok);
                        break;
                    }
                },
                Some(Err(e)) => self.errors.push(e),
                None => {
                    self.current = None;
                    break;
                }
            }
        }
        prev
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current.is_none()
    }

    pub(crate) fn check(&self, expected: &Token) -> bool {
        self.current
            .as_ref()
            .map(|t| &t.token == expected)
            .unwrap_or(false)
    }

    pub(crate) fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, expected: Token) -> ParseResult<SpannedToken<'a>> {
        if self.check(&expected) {
            Ok(self.advance().expect("checked token present"))
        } else {
            self.unexpected()
        }
    }

    /// Start offset of the current token (or end of input)
    pub(crate) fn cur_start(&self) -> usize {
        self.current
            .as_ref()
            .map(|t| t.span.start)
            .unwrap_or(self.source.len())
    }

    pub(crate) fn cur_span(&self) -> Span {
        self.current.as_ref().map(|t| t.span).unwrap_or_else(|| {
            self.source_map.span(self.source.len(), self.source.len())
        })
    }

    pub(crate) fn cur_text(&self) -> &'a str {
        self.current.as_ref().map(|t| t.text).unwrap_or("")
    }

    /// Span from `start` to the end of the last consumed token
    pub(crate) fn finish_span(&self, start: usize) -> Span {
        self.source_map.span(start, self.last_tok_end)
    }

    pub(crate) fn span_at(&self, offset: usize) -> Span {
        self.source_map.span(offset, offset)
    }

    pub(crate) fn unexpected<T>(&self) -> ParseResult<T> {
        match &self.current {
            Some(t) => Err(ParseError::unexpected_token(t.text, t.span)),
            None => Err(ParseError::unexpected_eof("more input", self.cur_span())),
        }
    }

    pub(crate) fn unexpected_at<T>(&self, offset: usize) -> ParseResult<T> {
        let span = self.source_map.span(offset, offset);
        let found = self.source[offset..].chars().next();
        match found {
            Some(c) => Err(ParseError::unexpected_token(c.to_string(), span)),
            None => Err(ParseError::unexpected_eof("more input", span)),
        }
    }

    pub(crate) fn raise<T>(&self, span: Span, message: impl Into<String>) -> ParseResult<T> {
        Err(ParseError::syntax(message, span))
    }

    pub(crate) fn raise_recoverable(&mut self, span: Span, message: impl Into<String>) {
        self.errors.push(ParseError::syntax(message, span));
    }

    // ==================== Automatic Semicolon Insertion ====================

    pub(crate) fn can_insert_semicolon(&self) -> bool {
        self.is_at_end() || self.check(&Token::RBrace) || self.newline_before
    }

    pub(crate) fn insert_semicolon(&mut self) -> bool {
        if self.can_insert_semicolon() {
            self.inserted_semicolons.push(self.last_tok_end);
            true
        } else {
            false
        }
    }

    /// Consume a statement terminator: an explicit `;` or an ASI position
    pub(crate) fn semicolon(&mut self) -> ParseResult<()> {
        if self.eat(&Token::Semicolon) || self.insert_semicolon() {
            Ok(())
        } else {
            self.unexpected()
        }
    }

    /// True when the current token is `close` after a tolerated trailing
    /// comma; consumes it unless `not_next`
    pub(crate) fn after_trailing_comma(&mut self, close: &Token, not_next: bool) -> bool {
        if self.check(close) {
            self.trailing_commas.push(self.last_tok_start);
            if !not_next {
                self.advance();
            }
            true
        } else {
            false
        }
    }

    // ==================== Contextual Keywords ====================

    /// Is the current token the plain identifier `name`, escape-free?
    pub(crate) fn is_contextual(&self, name: &str) -> bool {
        self.check(&Token::Identifier) && self.cur_text() == name
    }

    pub(crate) fn eat_contextual(&mut self, name: &str) -> bool {
        if self.is_contextual(name) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_contextual(&mut self, name: &str) -> ParseResult<()> {
        if self.eat_contextual(name) {
            Ok(())
        } else {
            self.unexpected()
        }
    }

    pub(crate) fn ecma_at_least(&self, edition: u32) -> bool {
        self.options.ecma_version.at_least(edition)
    }

    // ==================== Raw-source Lookahead ====================

    /// Skip whitespace and comments in the raw source from `pos`; returns
    /// the next significant offset and whether a line terminator was crossed
    pub(crate) fn skip_white_space(&self, mut pos: usize) -> (usize, bool) {
        let mut crossed = false;
        while pos < self.source.len() {
            let c = self.source[pos..].chars().next().expect("in-bounds offset");
            if crate::span::is_line_terminator(c) {
                crossed = true;
                pos += c.len_utf8();
            } else if c.is_whitespace() || c == '\u{FEFF}' {
                pos += c.len_utf8();
            } else if self.source[pos..].starts_with("//") {
                pos += 2;
                while pos < self.source.len() {
                    let c = self.source[pos..].chars().next().expect("in-bounds offset");
                    if crate::span::is_line_terminator(c) {
                        break;
                    }
                    pos += c.len_utf8();
                }
            } else if self.source[pos..].starts_with("/*") {
                match memchr::memmem::find(&self.source.as_bytes()[pos + 2..], b"*/") {
                    Some(i) => {
                        let end = pos + 2 + i + 2;
                        if crate::span::contains_line_break(&self.source[pos..end]) {
                            crossed = true;
                        }
                        pos = end;
                    }
                    None => return (self.source.len(), crossed),
                }
            } else {
                break;
            }
        }
        (pos, crossed)
    }

    fn read_word_at(&self, start: usize) -> &str {
        let mut end = start;
        for (i, c) in self.source[start..].char_indices() {
            if c == '$' || c == '_' || unicode_ident::is_xid_continue(c) {
                end = start + i + c.len_utf8();
            } else {
                break;
            }
        }
        &self.source[start..end]
    }

    /// Is `let` at statement start actually a declaration keyword here?
    pub(crate) fn is_let(&self, context: Option<StatementContext>) -> bool {
        if !self.ecma_at_least(6) || !self.is_contextual("let") {
            return false;
        }
        let (pos, _) = self.skip_white_space(self.cur_span().end);
        let Some(c) = self.source[pos..].chars().next() else {
            return false;
        };
        // `let [` is always a declaration; an escape can only start a name
        if c == '[' || c == '\\' {
            return true;
        }
        if context.is_some() {
            return false;
        }
        if c == '{' {
            return true;
        }
        if c == '$' || c == '_' || unicode_ident::is_xid_start(c) {
            let word = self.read_word_at(pos);
            // `let in …`/`let instanceof …` keep `let` an identifier
            if word != "in" && word != "instanceof" {
                return true;
            }
        }
        false
    }

    /// Does `async` at the current token start an async function statement?
    pub(crate) fn is_async_function(&self) -> bool {
        if !self.ecma_at_least(8) || !self.is_contextual("async") {
            return false;
        }
        let (pos, crossed) = self.skip_white_space(self.cur_span().end);
        if crossed || !self.source[pos..].starts_with("function") {
            return false;
        }
        let after = pos + "function".len();
        match self.source[after..].chars().next() {
            None => true,
            Some(c) => !(c == '$' || c == '_' || unicode_ident::is_xid_continue(c)),
        }
    }

    /// First significant character after the current token
    pub(crate) fn next_significant_char(&self) -> Option<char> {
        let (pos, _) = self.skip_white_space(self.cur_span().end);
        self.source[pos..].chars().next()
    }

    /// Scan ahead from `from` for a `"use strict"` directive prologue
    pub(crate) fn strict_directive(&self, from: usize) -> bool {
        let mut pos = from;
        loop {
            let (next, _) = self.skip_white_space(pos);
            pos = next;
            let Some(quote) = self.source[pos..].chars().next() else {
                return false;
            };
            if quote != '"' && quote != '\'' {
                return false;
            }
            // find the matching close quote, skipping escapes
            let body_start = pos + 1;
            let mut end = None;
            let mut iter = self.source[body_start..].char_indices();
            while let Some((i, c)) = iter.next() {
                if c == '\\' {
                    iter.next();
                } else if c == quote {
                    end = Some(body_start + i);
                    break;
                } else if crate::span::is_line_terminator(c) {
                    break;
                }
            }
            let Some(end) = end else {
                return false;
            };
            if &self.source[body_start..end] == "use strict" {
                // must be followed by a statement boundary
                let (after, crossed) = self.skip_white_space(end + 1);
                return match self.source[after..].chars().next() {
                    None => true,
                    Some(';') | Some('}') => true,
                    Some(c) => {
                        crossed
                            && !matches!(
                                c,
                                '(' | '`' | '.' | '[' | '+' | '-' | '/' | '*' | '%' | '<' | '>'
                                    | '=' | ',' | '?' | '^' | '&'
                            )
                            && !(c == '!' && self.source[after..].starts_with("!="))
                    }
                };
            }
            // skip this directive and an optional semicolon, then retry
            pos = end + 1;
            let (next, _) = self.skip_white_space(pos);
            pos = next;
            if self.source[pos..].starts_with(';') {
                pos += 1;
            }
        }
    }

    // ==================== Identifiers ====================

    /// Parse an identifier; `liberal` also accepts reserved words (member
    /// names, labels after `break`) and skips the reserved-word checks
    pub(crate) fn parse_ident(&mut self, liberal: bool) -> ParseResult<Identifier> {
        let span = self.cur_span();
        let (name, had_esc) = match &self.current {
            Some(t) if t.token == Token::Identifier => {
                let esc = t.contains_esc();
                (self.cook_ident_name(t.text, t.span)?, esc)
            }
            Some(t) => match t.token.keyword_name() {
                Some(kw) if liberal => (kw.to_string(), false),
                _ => return self.unexpected(),
            },
            None => return self.unexpected(),
        };
        self.advance();
        if !liberal {
            self.check_unreserved(&name, span, had_esc)?;
            if name == "await" && self.await_ident_pos == 0 {
                self.await_ident_pos = span.start;
            }
        }
        Ok(Identifier { span, name })
    }

    /// Reject reserved words according to mode and surrounding scope
    pub(crate) fn check_unreserved(
        &mut self,
        name: &str,
        span: Span,
        _had_esc: bool,
    ) -> ParseResult<()> {
        if self.in_generator() && name == "yield" {
            self.raise_recoverable(
                span,
                "Cannot use 'yield' as identifier inside a generator",
            );
        }
        if self.in_async() && name == "await" {
            self.raise_recoverable(
                span,
                "Cannot use 'await' as identifier inside an async function",
            );
        }
        if self.current_this_scope().in_class_field_init && name == "arguments" {
            self.raise_recoverable(span, "Cannot use 'arguments' in class field initializer");
        }
        if self.in_class_static_block() && (name == "arguments" || name == "await") {
            return self.raise(
                span,
                format!("Cannot use {} in class static initialization block", name),
            );
        }
        // reserved words reach here through liberal positions (member and
        // property names) that later commit to a binding role
        if literals::is_keyword_str(name) {
            return self.raise(span, format!("Unexpected keyword '{}'", name));
        }
        if self.is_reserved_word(name) {
            if !self.in_async() && name == "await" {
                self.raise_recoverable(
                    span,
                    "Cannot use keyword 'await' outside an async function",
                );
            } else {
                self.raise_recoverable(span, format!("The keyword '{}' is reserved", name));
            }
        }
        Ok(())
    }

    /// Reserved words beyond the outright keywords, by mode
    pub(crate) fn is_reserved_word(&self, name: &str) -> bool {
        if name == "enum" {
            return true;
        }
        if self.in_module && name == "await" {
            return true;
        }
        if self.strict {
            return matches!(
                name,
                "implements"
                    | "interface"
                    | "let"
                    | "package"
                    | "private"
                    | "protected"
                    | "public"
                    | "static"
                    | "yield"
            );
        }
        false
    }

    /// Strict-mode restricted binding/assignment names
    pub(crate) fn is_strict_bind_reserved(&self, name: &str) -> bool {
        name == "eval" || name == "arguments" || self.is_reserved_word(name)
    }

    /// Parse a `#name` reference and register the use with the innermost
    /// class frame
    pub(crate) fn parse_private_ident(&mut self) -> ParseResult<PrivateIdentifier> {
        let span = self.cur_span();
        let Some(t) = &self.current else {
            return self.unexpected();
        };
        if t.token != Token::PrivateName {
            return self.unexpected();
        }
        let name = self.cook_ident_name(&t.text[1..], t.span)?;
        self.advance();
        if let Some(frame) = self.private_name_stack.last_mut() {
            frame.used.push((name.clone(), span));
        } else {
            return self.raise(
                span,
                format!("Private field '#{}' must be declared in an enclosing class", name),
            );
        }
        Ok(PrivateIdentifier { span, name })
    }
}

/// Parse source text with the given options
pub fn parse_with_options(source: &str, options: Options) -> ParseResult<ParseOutput> {
    Parser::new(source, options).parse()
}
