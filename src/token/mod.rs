//! Token definitions for the ECMAScript lexer
//!
//! Reserved words carry their own token; contextual keywords (`async`,
//! `await`, `let`, `of`, `static`, `get`, `set`, `as`, `from`, `yield`,
//! `target`, `meta`) lex as plain identifiers and are recognized by the
//! parser in position.

mod precedence;


use logos::Logos;

pub use precedence::{Associativity, Precedence};

/// ECMAScript tokens
///
/// `/` and `/=` always lex as division operators; the parser rescans them as
/// regular-expression literals when they appear in expression-start position.
/// `Str` and `Regex` are produced by the lexer wrapper, never by logos.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\u{000B}\u{000C}\u{00A0}\u{1680}\u{2000}-\u{200A}\u{202F}\u{205F}\u{3000}\u{FEFF}]+")]
pub enum Token {
    // ==================== Keywords ====================
    #[token("break")]
    KwBreak,
    #[token("case")]
    KwCase,
    #[token("catch")]
    KwCatch,
    #[token("class")]
    KwClass,
    #[token("const")]
    KwConst,
    #[token("continue")]
    KwContinue,
    #[token("debugger")]
    KwDebugger,
    #[token("default")]
    KwDefault,
    #[token("delete")]
    KwDelete,
    #[token("do")]
    KwDo,
    #[token("else")]
    KwElse,
    #[token("export")]
    KwExport,
    #[token("extends")]
    KwExtends,
    #[token("finally")]
    KwFinally,
    #[token("for")]
    KwFor,
    #[token("function")]
    KwFunction,
    #[token("if")]
    KwIf,
    #[token("import")]
    KwImport,
    #[token("in")]
    KwIn,
    #[token("instanceof")]
    KwInstanceof,
    #[token("new")]
    KwNew,
    #[token("return")]
    KwReturn,
    #[token("super")]
    KwSuper,
    #[token("switch")]
    KwSwitch,
    #[token("this")]
    KwThis,
    #[token("throw")]
    KwThrow,
    #[token("try")]
    KwTry,
    #[token("typeof")]
    KwTypeof,
    #[token("var")]
    KwVar,
    #[token("void")]
    KwVoid,
    #[token("while")]
    KwWhile,
    #[token("with")]
    KwWith,

    // ==================== Literal Keywords ====================
    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // ==================== Delimiters ====================
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // ==================== Punctuation ====================
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("?")]
    Question,
    // The wrapper re-splits this into `?` `.` when a digit follows (`a?.5:b`)
    #[token("?.")]
    QuestionDot,
    #[token("=>")]
    Arrow,
    #[token("`")]
    Backtick,

    // ==================== Assignment Operators ====================
    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("**=")]
    StarStarEq,
    #[token("<<=")]
    ShlEq,
    #[token(">>=")]
    ShrEq,
    #[token(">>>=")]
    UShrEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("&&=")]
    AndAndEq,
    #[token("||=")]
    OrOrEq,
    #[token("??=")]
    CoalesceEq,

    // ==================== Binary Operators ====================
    #[token("??")]
    Coalesce,
    #[token("||")]
    OrOr,
    #[token("&&")]
    AndAnd,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("&")]
    Amp,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("===")]
    EqEqEq,
    #[token("!==")]
    NotEqEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token(">>>")]
    UShr,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("**")]
    StarStar,

    // ==================== Unary Operators ====================
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,

    // ==================== Newlines ====================
    #[regex(r"\r\n|[\r\n\u{2028}\u{2029}]")]
    Newline,

    // ==================== Comments ====================
    #[regex(r"//[^\n\r\u{2028}\u{2029}]*")]
    LineComment,

    // Block comments need a hand scan for the closing `*/`
    #[token("/*")]
    BlockCommentStart,

    // ==================== Literals ====================
    #[regex(r"0[xX][0-9a-fA-F](_?[0-9a-fA-F])*")]
    #[regex(r"0[oO][0-7](_?[0-7])*")]
    #[regex(r"0[bB][01](_?[01])*")]
    #[regex(r"0|[1-9](_?[0-9])*")]
    // Legacy octal-looking literals (0644, 09); cooked and strict-checked
    // by the parser
    #[regex(r"0[0-9]+")]
    #[regex(r"(0|[1-9](_?[0-9])*)\.([0-9](_?[0-9])*)?([eE][+-]?[0-9](_?[0-9])*)?")]
    #[regex(r"(0|[1-9](_?[0-9])*)[eE][+-]?[0-9](_?[0-9])*")]
    #[regex(r"\.[0-9](_?[0-9])*([eE][+-]?[0-9](_?[0-9])*)?")]
    Number,

    #[regex(r"(0|[1-9](_?[0-9])*|0[xX][0-9a-fA-F](_?[0-9a-fA-F])*|0[oO][0-7](_?[0-7])*|0[bB][01](_?[01])*)n")]
    BigInt,

    // Quote tokens trigger the wrapper's string scan
    #[token("\"")]
    DoubleQuote,
    #[token("'")]
    SingleQuote,

    // ==================== Identifiers ====================
    // `$`, `_`, XID plus ZWNJ/ZWJ continuations; `\uXXXX` and `\u{...}`
    // escapes may appear in any position and are validated when cooked
    #[regex(r"([$_\p{XID_Start}]|\\u[0-9a-fA-F]{4}|\\u\{[0-9a-fA-F]+\})([$\p{XID_Continue}\u{200C}\u{200D}]|\\u[0-9a-fA-F]{4}|\\u\{[0-9a-fA-F]+\})*")]
    Identifier,

    #[regex(r"#([$_\p{XID_Start}]|\\u[0-9a-fA-F]{4}|\\u\{[0-9a-fA-F]+\})([$\p{XID_Continue}\u{200C}\u{200D}]|\\u[0-9a-fA-F]{4}|\\u\{[0-9a-fA-F]+\})*")]
    PrivateName,

    // ==================== Wrapper-produced ====================
    /// Complete string literal, quotes included (hand-scanned)
    Str,
    /// Complete regular-expression literal with flags (rescanned on demand)
    Regex,
    /// Complete `/* ... */` comment
    BlockComment,
}

impl Token {
    /// The reserved word spelled by this token, if it is one
    pub fn keyword_name(&self) -> Option<&'static str> {
        Some(match self {
            Token::KwBreak => "break",
            Token::KwCase => "case",
            Token::KwCatch => "catch",
            Token::KwClass => "class",
            Token::KwConst => "const",
            Token::KwContinue => "continue",
            Token::KwDebugger => "debugger",
            Token::KwDefault => "default",
            Token::KwDelete => "delete",
            Token::KwDo => "do",
            Token::KwElse => "else",
            Token::KwExport => "export",
            Token::KwExtends => "extends",
            Token::KwFinally => "finally",
            Token::KwFor => "for",
            Token::KwFunction => "function",
            Token::KwIf => "if",
            Token::KwImport => "import",
            Token::KwIn => "in",
            Token::KwInstanceof => "instanceof",
            Token::KwNew => "new",
            Token::KwReturn => "return",
            Token::KwSuper => "super",
            Token::KwSwitch => "switch",
            Token::KwThis => "this",
            Token::KwThrow => "throw",
            Token::KwTry => "try",
            Token::KwTypeof => "typeof",
            Token::KwVar => "var",
            Token::KwVoid => "void",
            Token::KwWhile => "while",
            Token::KwWith => "with",
            Token::Null => "null",
            Token::True => "true",
            Token::False => "false",
            _ => return None,
        })
    }

    /// Keywords that start an iteration statement (label kinds)
    pub fn is_loop_keyword(&self) -> bool {
        matches!(self, Token::KwFor | Token::KwWhile | Token::KwDo)
    }

    /// Can this token begin an expression?
    ///
    /// `Slash`/`SlashEq` count: in expression-start position they begin a
    /// regular-expression literal.
    pub fn starts_expr(&self) -> bool {
        matches!(
            self,
            Token::Identifier
                | Token::PrivateName
                | Token::Number
                | Token::BigInt
                | Token::Str
                | Token::Regex
                | Token::DoubleQuote
                | Token::SingleQuote
                | Token::Backtick
                | Token::Null
                | Token::True
                | Token::False
                | Token::KwThis
                | Token::KwSuper
                | Token::KwFunction
                | Token::KwClass
                | Token::KwNew
                | Token::KwImport
                | Token::KwTypeof
                | Token::KwVoid
                | Token::KwDelete
                | Token::LParen
                | Token::LBracket
                | Token::LBrace
                | Token::Bang
                | Token::Tilde
                | Token::Plus
                | Token::Minus
                | Token::PlusPlus
                | Token::MinusMinus
                | Token::Slash
                | Token::SlashEq
        )
    }

    /// Source text of an assignment operator, `=` included
    pub fn assign_op_str(&self) -> Option<&'static str> {
        Some(match self {
            Token::Eq => "=",
            Token::PlusEq => "+=",
            Token::MinusEq => "-=",
            Token::StarEq => "*=",
            Token::SlashEq => "/=",
            Token::PercentEq => "%=",
            Token::StarStarEq => "**=",
            Token::ShlEq => "<<=",
            Token::ShrEq => ">>=",
            Token::UShrEq => ">>>=",
            Token::AmpEq => "&=",
            Token::PipeEq => "|=",
            Token::CaretEq => "^=",
            Token::AndAndEq => "&&=",
            Token::OrOrEq => "||=",
            Token::CoalesceEq => "??=",
            _ => return None,
        })
    }

    /// Is this a logical-assignment operator (`&&=`, `||=`, `??=`)?
    pub fn is_logical_assign(&self) -> bool {
        matches!(
            self,
            Token::AndAndEq | Token::OrOrEq | Token::CoalesceEq
        )
    }

    /// Is this a prefix unary operator other than `++`/`--`?
    pub fn is_unary_prefix(&self) -> bool {
        matches!(
            self,
            Token::Bang
                | Token::Tilde
                | Token::Plus
                | Token::Minus
                | Token::KwTypeof
                | Token::KwVoid
                | Token::KwDelete
        )
    }

    /// Is this `++` or `--`?
    pub fn is_update_op(&self) -> bool {
        matches!(self, Token::PlusPlus | Token::MinusMinus)
    }
}
