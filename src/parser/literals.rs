//! Literal cooking
//!
//! Token text arrives raw from the lexer; the routines here turn it into
//! runtime values: escape resolution for strings, templates and identifiers,
//! radix handling for numbers, flag validation for regular expressions.
//! Surrogate pairs combine; a lone surrogate cannot inhabit a Rust `String`,
//! so the cooked value substitutes U+FFFD and the fact is reported to the
//! caller (module export names reject it).

use crate::ast::{Literal, LiteralValue};
use crate::error::{ParseError, ParseResult};
use crate::span::Span;
use crate::token::Token;

use super::Parser;

/// Cooked string body plus surrogate bookkeeping
#[derive(Debug, Clone)]
pub(crate) struct CookedString {
    pub(crate) value: String,
    pub(crate) lone_surrogate: bool,
}

pub(crate) fn is_keyword_str(s: &str) -> bool {
    matches!(
        s,
        "break"
            | "case"
            | "catch"
            | "class"
            | "const"
            | "continue"
            | "debugger"
            | "default"
            | "delete"
            | "do"
            | "else"
            | "export"
            | "extends"
            | "finally"
            | "for"
            | "function"
            | "if"
            | "import"
            | "in"
            | "instanceof"
            | "new"
            | "return"
            | "super"
            | "switch"
            | "this"
            | "throw"
            | "try"
            | "typeof"
            | "var"
            | "void"
            | "while"
            | "with"
            | "null"
            | "true"
            | "false"
    )
}

fn read_hex(body: &str, at: usize, digits: usize) -> Option<u32> {
    let slice = body.get(at..at + digits)?;
    if slice.len() != digits || !slice.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(slice, 16).ok()
}

impl<'a> Parser<'a> {
    /// Resolve `\u` escapes in an identifier or private name
    pub(crate) fn cook_ident_name(&self, text: &str, span: Span) -> ParseResult<String> {
        if !text.contains('\\') {
            return Ok(text.to_string());
        }
        let mut name = String::with_capacity(text.len());
        let mut i = 0;
        let mut first = true;
        while i < text.len() {
            let c = text[i..].chars().next().expect("in-bounds offset");
            let ch = if c == '\\' {
                // the token regex guarantees the `\uXXXX` / `\u{…}` shape
                let (code, next) = if text[i + 2..].starts_with('{') {
                    let close = text[i + 3..]
                        .find('}')
                        .map(|j| i + 3 + j)
                        .ok_or_else(|| invalid_escape(span, "Invalid Unicode escape"))?;
                    let code = u32::from_str_radix(&text[i + 3..close], 16)
                        .map_err(|_| invalid_escape(span, "Invalid Unicode escape"))?;
                    (code, close + 1)
                } else {
                    let code = read_hex(text, i + 2, 4)
                        .ok_or_else(|| invalid_escape(span, "Invalid Unicode escape"))?;
                    (code, i + 6)
                };
                i = next;
                char::from_u32(code).ok_or_else(|| invalid_escape(span, "Invalid Unicode escape"))?
            } else {
                i += c.len_utf8();
                c
            };
            let valid = if first {
                ch == '$' || ch == '_' || unicode_ident::is_xid_start(ch)
            } else {
                ch == '$'
                    || ch == '_'
                    || ch == '\u{200C}'
                    || ch == '\u{200D}'
                    || unicode_ident::is_xid_continue(ch)
            };
            if !valid {
                return Err(invalid_escape(span, "Invalid Unicode escape"));
            }
            name.push(ch);
            first = false;
        }
        if is_keyword_str(&name) {
            return self.raise(span, format!("Escape sequence in keyword {}", name));
        }
        Ok(name)
    }

    /// Parse the current literal token into a `Literal` node
    pub(crate) fn parse_literal(&mut self) -> ParseResult<Literal> {
        let span = self.cur_span();
        let Some(tok) = &self.current else {
            return self.unexpected();
        };
        let raw = tok.text.to_string();
        let value = match tok.token {
            Token::Null => LiteralValue::Null,
            Token::True => LiteralValue::Boolean(true),
            Token::False => LiteralValue::Boolean(false),
            Token::Number => LiteralValue::Number(self.cook_number(tok.text, span)?),
            Token::BigInt => {
                let digits: String = tok.text[..tok.text.len() - 1]
                    .chars()
                    .filter(|&c| c != '_')
                    .collect();
                LiteralValue::BigInt(digits)
            }
            Token::Str => {
                let body = &tok.text[1..tok.text.len() - 1];
                let cooked = self
                    .cook_string_body(body, span.start + 1, false)
                    .map_err(|(s, m)| invalid_escape(s, m))?;
                LiteralValue::String(cooked.value)
            }
            Token::Regex => {
                let slash = tok.text.rfind('/').expect("regex token carries both slashes");
                let pattern = tok.text[1..slash].to_string();
                let flags = tok.text[slash + 1..].to_string();
                self.validate_regex_flags(&flags, span)?;
                LiteralValue::Regex { pattern, flags }
            }
            _ => return self.unexpected(),
        };
        self.advance();
        Ok(Literal { span, value, raw })
    }

    fn validate_regex_flags(&self, flags: &str, span: Span) -> ParseResult<()> {
        let mut seen = [false; 8];
        for c in flags.chars() {
            let idx = match c {
                'd' => 0,
                'g' => 1,
                'i' => 2,
                'm' => 3,
                's' => 4,
                'u' => 5,
                'v' => 6,
                'y' => 7,
                _ => return self.raise(span, "Invalid regular expression flag"),
            };
            if seen[idx] {
                return self.raise(span, "Invalid regular expression flag");
            }
            seen[idx] = true;
        }
        Ok(())
    }

    /// Numeric value of a number token
    pub(crate) fn cook_number(&self, text: &str, span: Span) -> ParseResult<f64> {
        let clean: String = text.chars().filter(|&c| c != '_').collect();
        let invalid = || ParseError::InvalidNumber { span };
        if let Some(hex) = clean.strip_prefix("0x").or_else(|| clean.strip_prefix("0X")) {
            return Ok(u128::from_str_radix(hex, 16).map_err(|_| invalid())? as f64);
        }
        if let Some(oct) = clean.strip_prefix("0o").or_else(|| clean.strip_prefix("0O")) {
            return Ok(u128::from_str_radix(oct, 8).map_err(|_| invalid())? as f64);
        }
        if let Some(bin) = clean.strip_prefix("0b").or_else(|| clean.strip_prefix("0B")) {
            return Ok(u128::from_str_radix(bin, 2).map_err(|_| invalid())? as f64);
        }
        // legacy octal / non-octal decimal (0644, 09): sloppy mode only
        if clean.len() > 1 && clean.starts_with('0') && clean.bytes().all(|b| b.is_ascii_digit()) {
            if self.strict {
                return self.raise(span, "Invalid number");
            }
            if clean.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
                return Ok(u128::from_str_radix(&clean, 8).map_err(|_| invalid())? as f64);
            }
            return clean.parse::<f64>().map_err(|_| invalid());
        }
        clean.parse::<f64>().map_err(|_| invalid())
    }

    /// Cook a string or template body; `abs_start` is the offset of
    /// `body[0]` in the source, used for error spans
    pub(crate) fn cook_string_body(
        &self,
        body: &str,
        abs_start: usize,
        in_template: bool,
    ) -> Result<CookedString, (Span, String)> {
        let mut out = String::with_capacity(body.len());
        let mut lone_surrogate = false;
        let mut i = 0;
        let err = |at: usize, msg: &str| {
            (
                self.source_map.span(abs_start + at, abs_start + at),
                msg.to_string(),
            )
        };
        while i < body.len() {
            let c = body[i..].chars().next().expect("in-bounds offset");
            if c != '\\' {
                // raw CR / CRLF normalize to LF inside templates
                if c == '\r' {
                    out.push('\n');
                    i += 1;
                    if body[i..].starts_with('\n') {
                        i += 1;
                    }
                } else {
                    out.push(c);
                    i += c.len_utf8();
                }
                continue;
            }
            let esc_at = i;
            i += 1;
            let Some(e) = body[i..].chars().next() else {
                return Err(err(esc_at, "Invalid escape sequence"));
            };
            i += e.len_utf8();
            match e {
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                'b' => out.push('\u{8}'),
                'v' => out.push('\u{B}'),
                'f' => out.push('\u{C}'),
                'x' => match read_hex(body, i, 2) {
                    Some(code) => {
                        i += 2;
                        out.push(char::from_u32(code).expect("two hex digits fit a char"));
                    }
                    None => return Err(err(esc_at, "Bad character escape sequence")),
                },
                'u' => {
                    let code = if body[i..].starts_with('{') {
                        let Some(close) = body[i + 1..].find('}').map(|j| i + 1 + j) else {
                            return Err(err(esc_at, "Invalid Unicode escape sequence"));
                        };
                        let digits = &body[i + 1..close];
                        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                            return Err(err(esc_at, "Invalid Unicode escape sequence"));
                        }
                        let Ok(code) = u32::from_str_radix(digits, 16) else {
                            return Err(err(esc_at, "Code point out of bounds"));
                        };
                        if code > 0x10FFFF {
                            return Err(err(esc_at, "Code point out of bounds"));
                        }
                        i = close + 1;
                        code
                    } else {
                        match read_hex(body, i, 4) {
                            Some(code) => {
                                i += 4;
                                code
                            }
                            None => return Err(err(esc_at, "Invalid Unicode escape sequence")),
                        }
                    };
                    if (0xD800..=0xDBFF).contains(&code) {
                        // try to pair with an immediately following \uDC00-\uDFFF
                        let mut paired = false;
                        if body[i..].starts_with("\\u") {
                            if let Some(low) = read_hex(body, i + 2, 4) {
                                if (0xDC00..=0xDFFF).contains(&low) {
                                    let combined =
                                        0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                                    out.push(
                                        char::from_u32(combined)
                                            .expect("combined surrogates are valid"),
                                    );
                                    i += 6;
                                    paired = true;
                                }
                            }
                        }
                        if !paired {
                            out.push('\u{FFFD}');
                            lone_surrogate = true;
                        }
                    } else if (0xDC00..=0xDFFF).contains(&code) {
                        out.push('\u{FFFD}');
                        lone_surrogate = true;
                    } else {
                        match char::from_u32(code) {
                            Some(ch) => out.push(ch),
                            None => return Err(err(esc_at, "Invalid Unicode escape sequence")),
                        }
                    }
                }
                '0'..='7' => {
                    let mut value = e as u32 - '0' as u32;
                    let mut digits = 1;
                    while digits < 3 {
                        let Some(d) = body[i..].chars().next().filter(|c| ('0'..='7').contains(c))
                        else {
                            break;
                        };
                        let next = value * 8 + (d as u32 - '0' as u32);
                        if next > 0xFF {
                            break;
                        }
                        value = next;
                        i += 1;
                        digits += 1;
                    }
                    let followed_by_digit = body[i..]
                        .chars()
                        .next()
                        .is_some_and(|c| c.is_ascii_digit());
                    if e == '0' && digits == 1 && !followed_by_digit {
                        out.push('\0');
                    } else if in_template {
                        return Err(err(esc_at, "Octal literal in template string"));
                    } else if self.strict {
                        return Err(err(esc_at, "Octal literal in strict mode"));
                    } else {
                        out.push(char::from_u32(value).expect("octal value fits a char"));
                    }
                }
                '8' | '9' => {
                    if in_template {
                        return Err(err(esc_at, "Invalid escape sequence in template string"));
                    }
                    if self.strict {
                        return Err(err(esc_at, "Invalid escape sequence"));
                    }
                    out.push(e);
                }
                _ if crate::span::is_line_terminator(e) => {
                    // line continuation; \<CR><LF> consumes both
                    if e == '\r' && body[i..].starts_with('\n') {
                        i += 1;
                    }
                }
                _ => out.push(e),
            }
        }
        Ok(CookedString {
            value: out,
            lone_surrogate,
        })
    }

    /// Does this string literal's raw text encode a lone surrogate?
    pub(crate) fn string_has_lone_surrogate(&self, lit: &Literal) -> bool {
        let raw = &self.source[lit.span.start..lit.span.end];
        if raw.len() < 2 {
            return false;
        }
        self.cook_string_body(&raw[1..raw.len() - 1], lit.span.start + 1, false)
            .map(|c| c.lone_surrogate)
            .unwrap_or(false)
    }
}

fn invalid_escape(span: Span, message: impl Into<String>) -> ParseError {
    ParseError::InvalidEscape {
        message: message.into(),
        span,
    }
}
