//! ecma_parser
//!
//! Pure Rust recursive-descent parser for ECMAScript (up through ES2022),
//! producing ESTree-shaped ASTs: modules and scripts, classes with private
//! members and static blocks, optional chaining, nullish coalescing,
//! async/await, generators, `for await`, dynamic `import()`, `import.meta`,
//! logical assignment.
//!
//! # Example
//!
//! ```
//! use ecma_parser::{parse, Statement};
//!
//! let program = parse("let a = 1;").expect("parse failed");
//! assert!(matches!(program.body[0], Statement::VariableDecl(_)));
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod span;
pub mod token;

// Re-exports
pub use ast::{
    Expression, Literal, LiteralValue, Pattern, Program, SourceType, Statement,
};
pub use error::{ParseError, ParseErrors, ParseResult};
pub use lexer::{Lexer, SpannedToken};
pub use options::{EcmaVersion, Options};
pub use parser::{parse_with_options, Comment, ParseOutput, Parser};
pub use span::{SourceMap, Span};
pub use token::Token;

/// Parse script source with default options
///
/// Recoverable static-rule violations are promoted to errors here; use
/// [`parse_with_options`] and inspect [`ParseOutput::errors`] to tolerate
/// them.
pub fn parse(source: &str) -> ParseResult<Program> {
    parse_with(source, Options::default())
}

/// Parse module source with default options
pub fn parse_module(source: &str) -> ParseResult<Program> {
    parse_with(source, Options::module())
}

/// Parse with explicit options, promoting collected recoverable errors
pub fn parse_with(source: &str, options: Options) -> ParseResult<Program> {
    let output = Parser::new(source, options).parse()?;
    if let Some(first) = output.errors.into_iter().next() {
        return Err(first);
    }
    Ok(output.program)
}

/// Tokenize source code
///
/// Returns the raw token stream; `/` stays a division token (regexp
/// recognition needs the parser's context).
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken<'_>, ParseError>> {
    lexer::tokenize(source)
}

/// Get version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let program = parse("").unwrap();
        assert!(program.body.is_empty());
        assert_eq!(program.source_type, SourceType::Script);
    }

    #[test]
    fn test_parse_module() {
        let program = parse_module("export const x = 1;").unwrap();
        assert_eq!(program.source_type, SourceType::Module);
        assert_eq!(program.body.len(), 1);
    }

    #[test]
    fn test_tokenize() {
        let tokens = tokenize("1 + 2");
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
