//! Lexer for Qute expression content using Logos.
//!
//! Only the text between `{` and `}` (or a section parameter value) goes
//! through this lexer. Unterminated string literals still produce a
//! `StringLit` token so partially typed expressions stay tokenizable.

use logos::Logos;
use text_size::{TextRange, TextSize};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprToken {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"'([^'\\]|\\.)*'?")]
    #[regex(r#""([^"\\]|\\.)*"?"#)]
    StringLit,

    #[regex(r"-?[0-9]+(\.[0-9]+)?[lLfFdD]?")]
    Number,

    #[token("true")]
    #[token("false")]
    Boolean,

    #[token("null")]
    Null,

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$\-]*")]
    Ident,

    /// Match-any member name (`config:*`).
    #[token("*")]
    Star,

    #[token(".")]
    Dot,

    #[token(":")]
    Colon,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[token("?:")]
    #[token("??")]
    #[token("||")]
    #[token("&&")]
    #[token("==")]
    #[token("===")]
    #[token("!=")]
    #[token(">=")]
    #[token("<=")]
    #[token(">")]
    #[token("<")]
    #[token("!")]
    #[token("+")]
    #[token("-")]
    #[token("=")]
    Operator,

    /// Any character the grammar does not know about.
    Unknown,
}

impl ExprToken {
    /// Tokens that can start a chain as its object part.
    pub fn is_primary(self) -> bool {
        matches!(
            self,
            ExprToken::Ident
                | ExprToken::Star
                | ExprToken::StringLit
                | ExprToken::Number
                | ExprToken::Boolean
                | ExprToken::Null
        )
    }
}

/// A token with its absolute range in the template.
#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
    pub kind: ExprToken,
    pub text: &'a str,
    pub range: TextRange,
}

/// Tokenize `src`, whose first byte sits at `base` in the template.
pub fn tokenize(src: &str, base: TextSize) -> Vec<Token<'_>> {
    let mut lexer = ExprToken::lexer(src);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = result.unwrap_or(ExprToken::Unknown);
        let range = TextRange::new(
            base + TextSize::from(span.start as u32),
            base + TextSize::from(span.end as u32),
        );
        tokens.push(Token {
            kind,
            text: lexer.slice(),
            range,
        });
    }
    tokens
}
