//! Lexer for ECMAScript source
//!
//! Wraps the logos-generated lexer with hand-written scanning for the
//! constructs a regular tokenizer cannot carry alone: string bodies,
//! `/* */` comments, template chunks, regular-expression rescans and the
//! `?.`-before-digit split. After each hand scan the inner lexer is
//! restarted past the scanned region.

use logos::Logos;

use crate::error::{ParseError, ParseResult};
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// A token with its span and source text
#[derive(Debug, Clone)]
pub struct SpannedToken<'a> {
    pub token: Token,
    pub span: Span,
    pub text: &'a str,
}

impl<'a> SpannedToken<'a> {
    pub fn new(token: Token, span: Span, text: &'a str) -> Self {
        Self { token, span, text }
    }

    /// Did the token text carry a `\u` escape?
    ///
    /// Meaningful for identifiers and private names; a keyword spelled with
    /// an escape lexes as an identifier and is rejected by the parser.
    pub fn contains_esc(&self) -> bool {
        self.text.contains('\\')
    }
}

/// One raw chunk of a template literal, delimited by `` ` ``, `${` or `}`
#[derive(Debug, Clone)]
pub struct TemplateChunk<'a> {
    /// Chunk text without delimiters
    pub raw: &'a str,
    /// Span of the raw text
    pub span: Span,
    /// Chunk ended at `${` (true) or the closing backtick (false)
    pub is_substitution: bool,
    /// Byte offset just past the terminator
    pub end: usize,
}

fn utf8_width(byte: u8) -> usize {
    match byte {
        b if b < 0x80 => 1,
        b if b >= 0xF0 => 4,
        b if b >= 0xE0 => 3,
        _ => 2,
    }
}

/// ECMAScript lexer
pub struct Lexer<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, Token>,
    source_map: SourceMap,
    /// Peeked token (one-token lookahead)
    peeked: Option<Result<SpannedToken<'a>, ParseError>>,
    /// Current position in source
    position: usize,
    /// Offset of the inner lexer's slice within the original source
    offset: usize,
}

impl<'a> std::fmt::Debug for Lexer<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("position", &self.position)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

impl<'a> Lexer<'a> {
    /// Create a lexer for `source`
    pub fn new(source: &'a str) -> Self {
        Self::with_hashbang(source, false)
    }

    /// Create a lexer, optionally skipping a leading `#!` line
    pub fn with_hashbang(source: &'a str, allow_hash_bang: bool) -> Self {
        let source_map = SourceMap::new(source);
        let start = if allow_hash_bang && source.starts_with("#!") {
            source
                .char_indices()
                .find(|&(_, c)| crate::span::is_line_terminator(c))
                .map(|(i, _)| i)
                .unwrap_or(source.len())
        } else {
            0
        };
        Self {
            source,
            inner: Token::lexer(&source[start..]),
            source_map,
            peeked: None,
            position: start,
            offset: start,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    fn make_span(&self, start: usize, end: usize) -> Span {
        self.source_map.span(start, end)
    }

    /// Peek at the next token without consuming it
    pub fn peek(&mut self) -> Option<&Result<SpannedToken<'a>, ParseError>> {
        if self.peeked.is_none() {
            self.peeked = self.next_token_internal();
        }
        self.peeked.as_ref()
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Option<Result<SpannedToken<'a>, ParseError>> {
        if let Some(peeked) = self.peeked.take() {
            return Some(peeked);
        }
        self.next_token_internal()
    }

    fn next_token_internal(&mut self) -> Option<Result<SpannedToken<'a>, ParseError>> {
        let result = self.inner.next()?;
        let span = self.inner.span();
        let start = self.offset + span.start;
        let end = self.offset + span.end;
        self.position = end;

        match result {
            Ok(Token::BlockCommentStart) => match self.scan_block_comment(end) {
                Ok(comment_end) => {
                    self.restart_from(comment_end);
                    let span = self.make_span(start, comment_end);
                    let text = &self.source[start..comment_end];
                    Some(Ok(SpannedToken::new(Token::BlockComment, span, text)))
                }
                Err(e) => {
                    self.restart_from(self.source.len());
                    Some(Err(e))
                }
            },

            Ok(Token::DoubleQuote) | Ok(Token::SingleQuote) => {
                let quote = self.source.as_bytes()[start];
                match self.scan_string_to_close(quote, end) {
                    Ok(string_end) => {
                        self.restart_from(string_end);
                        let span = self.make_span(start, string_end);
                        let text = &self.source[start..string_end];
                        Some(Ok(SpannedToken::new(Token::Str, span, text)))
                    }
                    Err(e) => {
                        self.restart_from(self.source.len());
                        Some(Err(e))
                    }
                }
            }

            // `a?.5:b` is a conditional: re-lex as `?` followed by `.5`
            Ok(Token::QuestionDot)
                if self
                    .source
                    .as_bytes()
                    .get(end)
                    .is_some_and(u8::is_ascii_digit) =>
            {
                self.restart_from(start + 1);
                let span = self.make_span(start, start + 1);
                Some(Ok(SpannedToken::new(Token::Question, span, "?")))
            }

            Ok(token) => {
                let span = self.make_span(start, end);
                let text = &self.source[start..end];
                Some(Ok(SpannedToken::new(token, span, text)))
            }

            Err(()) => {
                let span = self.make_span(start, end);
                Some(Err(ParseError::LexerError { span }))
            }
        }
    }

    /// Scan past the body of a `/* */` comment, returning the offset just
    /// after the closing delimiter
    fn scan_block_comment(&self, start: usize) -> ParseResult<usize> {
        match memchr::memmem::find(&self.source.as_bytes()[start..], b"*/") {
            Some(i) => Ok(start + i + 2),
            None => Err(ParseError::UnterminatedComment {
                span: self.make_span(start - 2, self.source.len()),
            }),
        }
    }

    /// Scan a string body to its closing quote, honoring escapes.
    ///
    /// Raw LF/CR terminate with an error; U+2028/U+2029 are legal string
    /// characters. Returns the offset just past the closing quote.
    fn scan_string_to_close(&self, quote: u8, content_start: usize) -> ParseResult<usize> {
        let bytes = self.source.as_bytes();
        let mut pos = content_start;
        while pos < bytes.len() {
            let b = bytes[pos];
            if b == quote {
                return Ok(pos + 1);
            }
            match b {
                b'\\' => {
                    pos += 1;
                    if pos < bytes.len() {
                        // an escaped CRLF is a single line continuation
                        if bytes[pos] == b'\r' && bytes.get(pos + 1) == Some(&b'\n') {
                            pos += 2;
                        } else {
                            pos += utf8_width(bytes[pos]);
                        }
                    }
                }
                b'\n' | b'\r' => break,
                _ => pos += utf8_width(b),
            }
        }
        Err(ParseError::UnterminatedString {
            span: self.make_span(content_start - 1, pos.min(self.source.len())),
        })
    }

    /// Read one template chunk starting at `from` (just past `` ` `` or
    /// `${`..`}`), leaving the lexer positioned after the terminator
    pub fn read_template_chunk(&mut self, from: usize) -> ParseResult<TemplateChunk<'a>> {
        let bytes = self.source.as_bytes();
        let mut pos = from;
        while pos < bytes.len() {
            match bytes[pos] {
                b'`' => {
                    self.restart_from(pos + 1);
                    return Ok(TemplateChunk {
                        raw: &self.source[from..pos],
                        span: self.make_span(from, pos),
                        is_substitution: false,
                        end: pos + 1,
                    });
                }
                b'$' if bytes.get(pos + 1) == Some(&b'{') => {
                    self.restart_from(pos + 2);
                    return Ok(TemplateChunk {
                        raw: &self.source[from..pos],
                        span: self.make_span(from, pos),
                        is_substitution: true,
                        end: pos + 2,
                    });
                }
                b'\\' => {
                    pos += 1;
                    if pos < bytes.len() {
                        pos += utf8_width(bytes[pos]);
                    }
                }
                b => pos += utf8_width(b),
            }
        }
        Err(ParseError::UnterminatedTemplate {
            span: self.make_span(from, self.source.len()),
        })
    }

    /// Rescan a `/` or `/=` token at `start` as a regular-expression
    /// literal, leaving the lexer positioned after its flags
    pub fn reread_regexp(&mut self, start: usize) -> ParseResult<SpannedToken<'a>> {
        let mut escaped = false;
        let mut in_class = false;
        let mut body_end = None;
        for (i, c) in self.source[start + 1..].char_indices() {
            let at = start + 1 + i;
            if crate::span::is_line_terminator(c) {
                break;
            }
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => {
                    body_end = Some(at + 1);
                    break;
                }
                _ => {}
            }
        }
        let Some(body_end) = body_end else {
            return Err(ParseError::UnterminatedRegExp {
                span: self.make_span(start, self.source.len()),
            });
        };

        let mut end = body_end;
        for (i, c) in self.source[body_end..].char_indices() {
            if c == '$' || c == '_' || unicode_ident::is_xid_continue(c) {
                end = body_end + i + c.len_utf8();
            } else {
                break;
            }
        }

        self.restart_from(end);
        let span = self.make_span(start, end);
        let text = &self.source[start..end];
        Ok(SpannedToken::new(Token::Regex, span, text))
    }

    /// Restart the inner lexer from an absolute position
    pub fn restart_from(&mut self, pos: usize) {
        self.peeked = None;
        self.position = pos;
        if pos < self.source.len() {
            self.inner = Token::lexer(&self.source[pos..]);
            self.offset = pos;
        } else {
            self.inner = Token::lexer("");
            self.offset = self.source.len();
        }
    }

    pub fn is_eof(&mut self) -> bool {
        self.peek().is_none()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Collect all remaining tokens (for the public `tokenize` surface)
    pub fn collect_all(mut self) -> Vec<Result<SpannedToken<'a>, ParseError>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<SpannedToken<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize source code into a vector of spanned tokens
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken<'_>, ParseError>> {
    Lexer::new(source).collect_all()
}
