// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Statement tokenizer for directive lines with spans.
//!
//! Directive keywords keep their leading dot as part of the identifier text
//! (`.MODEL`, `.586P`), matching how the directive tables are keyed. The
//! tokenizer never fails: characters it does not understand become
//! [`TokenKind::Unknown`] tokens, which only turn into diagnostics if a
//! directive handler actually reaches them.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: u32,
    pub col_start: usize,
    pub col_end: usize,
}

impl Span {
    fn new(line: u32, start: usize, end: usize) -> Self {
        Self {
            line,
            col_start: start + 1,
            col_end: end + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or dotted directive keyword, original casing preserved.
    Identifier(String),
    Number(NumberLiteral),
    Comma,
    Colon,
    Unknown(char),
    End,
}

/// Unparsed number text plus the base implied by its notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberLiteral {
    pub text: String,
    pub base: u32,
}

impl NumberLiteral {
    /// Evaluate the literal as an unsigned constant.
    ///
    /// Returns `None` when the text contains digits invalid for the base,
    /// which callers treat as a non-constant operand.
    pub fn value(&self) -> Option<u32> {
        let digits = match self.base {
            16 => self
                .text
                .strip_suffix(['h', 'H'])
                .or_else(|| self.text.strip_prefix("0x").or_else(|| self.text.strip_prefix("0X")))
                .unwrap_or(&self.text),
            _ => &self.text,
        };
        u32::from_str_radix(digits, self.base).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Source text of the token, used in diagnostics.
    pub fn text(&self) -> String {
        match &self.kind {
            TokenKind::Identifier(name) => name.clone(),
            TokenKind::Number(num) => num.text.clone(),
            TokenKind::Comma => ",".to_string(),
            TokenKind::Colon => ":".to_string(),
            TokenKind::Unknown(ch) => ch.to_string(),
            TokenKind::End => "<end of line>".to_string(),
        }
    }

    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::End
    }

    /// Identifier text if this token is an identifier.
    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || matches!(ch, '_' | '@' | '?' | '$')
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '@' | '?' | '$')
}

pub struct Tokenizer<'a> {
    src: &'a str,
    line: u32,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str, line: u32) -> Self {
        Self { src, line }
    }

    /// Tokenize the whole statement. The result always ends with a single
    /// [`TokenKind::End`] token whose span sits one column past the source.
    pub fn tokenize(&self) -> Vec<Token> {
        let mut tokens = Vec::new();
        let chars: Vec<char> = self.src.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            if ch == ';' {
                break;
            }
            if ch.is_whitespace() {
                i += 1;
                continue;
            }
            let start = i;
            let kind = match ch {
                ',' => {
                    i += 1;
                    TokenKind::Comma
                }
                ':' => {
                    i += 1;
                    TokenKind::Colon
                }
                '.' if i + 1 < chars.len() && is_ident_char(chars[i + 1]) => {
                    i += 1;
                    while i < chars.len() && is_ident_char(chars[i]) {
                        i += 1;
                    }
                    TokenKind::Identifier(chars[start..i].iter().collect())
                }
                _ if is_ident_start(ch) => {
                    i += 1;
                    while i < chars.len() && is_ident_char(chars[i]) {
                        i += 1;
                    }
                    TokenKind::Identifier(chars[start..i].iter().collect())
                }
                _ if ch.is_ascii_digit() => {
                    i += 1;
                    while i < chars.len() && (chars[i].is_ascii_alphanumeric()) {
                        i += 1;
                    }
                    let text: String = chars[start..i].iter().collect();
                    let base = if text.ends_with(['h', 'H'])
                        || text.starts_with("0x")
                        || text.starts_with("0X")
                    {
                        16
                    } else {
                        10
                    };
                    TokenKind::Number(NumberLiteral { text, base })
                }
                other => {
                    i += 1;
                    TokenKind::Unknown(other)
                }
            };
            tokens.push(Token {
                kind,
                span: Span::new(self.line, start, i),
            });
        }

        tokens.push(Token {
            kind: TokenKind::End,
            span: Span::new(self.line, i, i + 1),
        });
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Tokenizer::new(src, 1)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn model_statement_tokenizes_with_dotted_directive() {
        let kinds = kinds(".MODEL small, c, FARSTACK");
        assert_eq!(kinds.len(), 7);
        assert_eq!(kinds[0], TokenKind::Identifier(".MODEL".to_string()));
        assert_eq!(kinds[1], TokenKind::Identifier("small".to_string()));
        assert_eq!(kinds[2], TokenKind::Comma);
        assert_eq!(kinds[5], TokenKind::Identifier("FARSTACK".to_string()));
        assert_eq!(kinds[6], TokenKind::End);
    }

    #[test]
    fn digit_led_directives_keep_their_dot() {
        let kinds = kinds(".586P");
        assert_eq!(kinds[0], TokenKind::Identifier(".586P".to_string()));
    }

    #[test]
    fn colon_and_number_operands() {
        let kinds = kinds(".X64 : 7");
        assert_eq!(kinds[1], TokenKind::Colon);
        match &kinds[2] {
            TokenKind::Number(num) => {
                assert_eq!(num.base, 10);
                assert_eq!(num.value(), Some(7));
            }
            other => panic!("expected number, got {other:?}"),
        }
    }

    #[test]
    fn hex_literals_use_masm_suffix_or_c_prefix() {
        let kinds = kinds("0A4h 0x12");
        match &kinds[0] {
            TokenKind::Number(num) => assert_eq!(num.value(), Some(0xA4)),
            other => panic!("expected number, got {other:?}"),
        }
        match &kinds[1] {
            TokenKind::Number(num) => assert_eq!(num.value(), Some(0x12)),
            other => panic!("expected number, got {other:?}"),
        }
    }

    #[test]
    fn malformed_number_reports_no_value() {
        let kinds = kinds("12q3");
        match &kinds[0] {
            TokenKind::Number(num) => assert_eq!(num.value(), None),
            other => panic!("expected number, got {other:?}"),
        }
    }

    #[test]
    fn comments_terminate_the_statement() {
        let kinds = kinds(".8086 ; back to the start");
        assert_eq!(kinds.len(), 2);
        assert_eq!(kinds[1], TokenKind::End);
    }

    #[test]
    fn spans_are_one_based_and_exclusive() {
        let tokens = Tokenizer::new(" .MODEL tiny", 3).tokenize();
        assert_eq!(tokens[0].span.line, 3);
        assert_eq!(tokens[0].span.col_start, 2);
        assert_eq!(tokens[0].span.col_end, 8);
        assert_eq!(tokens[1].span.col_start, 9);
    }

    #[test]
    fn stray_characters_become_unknown_tokens() {
        let kinds = kinds(".MODEL small + tiny");
        assert!(kinds.contains(&TokenKind::Unknown('+')));
    }
}
