//! Parse error types
//!
//! Two severities flow through the parser: fatal errors abort the parse
//! immediately with an `Err` return, while recoverable errors (violations
//! of a static rule in an otherwise well-formed program) are collected in
//! [`ParseErrors`] and promoted to the parse result afterwards.

use crate::span::Span;
use thiserror::Error;

/// Parse error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Unexpected token
    #[error("Unexpected token '{found}' ({}:{})", .span.start_line, .span.start_column)]
    UnexpectedToken { found: String, span: Span },

    /// Unexpected end of input
    #[error("Unexpected end of input, expected {expected} ({}:{})", .span.start_line, .span.start_column)]
    UnexpectedEof { expected: String, span: Span },

    /// Unterminated string literal
    #[error("Unterminated string constant ({}:{})", .span.start_line, .span.start_column)]
    UnterminatedString { span: Span },

    /// Unterminated template literal
    #[error("Unterminated template ({}:{})", .span.start_line, .span.start_column)]
    UnterminatedTemplate { span: Span },

    /// Unterminated regular expression
    #[error("Unterminated regular expression ({}:{})", .span.start_line, .span.start_column)]
    UnterminatedRegExp { span: Span },

    /// Unterminated block comment
    #[error("Unterminated comment ({}:{})", .span.start_line, .span.start_column)]
    UnterminatedComment { span: Span },

    /// Invalid escape sequence in a string, template or identifier
    #[error("{message} ({}:{})", .span.start_line, .span.start_column)]
    InvalidEscape { message: String, span: Span },

    /// Invalid numeric literal
    #[error("Invalid number ({}:{})", .span.start_line, .span.start_column)]
    InvalidNumber { span: Span },

    /// Violation of a syntactic rule, with the exact message
    #[error("{message} ({}:{})", .span.start_line, .span.start_column)]
    SyntaxError { message: String, span: Span },

    /// Unrecognized character
    #[error("Unexpected character ({}:{})", .span.start_line, .span.start_column)]
    LexerError { span: Span },
}

impl ParseError {
    /// The span of the error
    pub fn span(&self) -> &Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnexpectedEof { span, .. }
            | ParseError::UnterminatedString { span }
            | ParseError::UnterminatedTemplate { span }
            | ParseError::UnterminatedRegExp { span }
            | ParseError::UnterminatedComment { span }
            | ParseError::InvalidEscape { span, .. }
            | ParseError::InvalidNumber { span }
            | ParseError::SyntaxError { span, .. }
            | ParseError::LexerError { span } => span,
        }
    }

    pub fn unexpected_token(found: impl Into<String>, span: Span) -> Self {
        ParseError::UnexpectedToken {
            found: found.into(),
            span,
        }
    }

    pub fn unexpected_eof(expected: impl Into<String>, span: Span) -> Self {
        ParseError::UnexpectedEof {
            expected: expected.into(),
            span,
        }
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        ParseError::SyntaxError {
            message: message.into(),
            span,
        }
    }

    /// Format the error with the offending source line and a caret marker
    pub fn format_with_context(&self, source: &str) -> String {
        let span = self.span();
        let lines: Vec<&str> = source.lines().collect();
        let line_idx = span.start_line.saturating_sub(1);

        if line_idx >= lines.len() {
            return String::new();
        }

        let line = lines[line_idx];
        let col = span.start_column;
        let len = if span.start_line == span.end_line {
            span.end_column.saturating_sub(span.start_column).max(1)
        } else {
            1
        };

        let spaces = " ".repeat(col.min(line.len()));
        let marker = "^".repeat(len.min(line.len().saturating_sub(col)).max(1));

        format!(
            "  {} | {}\n  {} | {}{}",
            span.start_line,
            line,
            " ".repeat(span.start_line.to_string().len()),
            spaces,
            marker
        )
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Collected recoverable errors
#[derive(Debug, Default)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn take(self) -> Vec<ParseError> {
        self.errors
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    pub fn first(&self) -> Option<&ParseError> {
        self.errors.first()
    }

    /// Format all errors as a single message with source context
    pub fn format_all(&self, source: &str) -> String {
        self.errors
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let context = e.format_with_context(source);
                format!("Error {}: {}\n{}", i + 1, e, context)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
