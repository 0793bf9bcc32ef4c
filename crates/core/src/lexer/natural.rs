//! Natural-language sub-lexer for comment bodies, string contents and
//! diagnostic messages.

use super::rules::{
    camel_piece_len, is_word_char, PROSE_PUNCTUATION_CHARS, PROSE_WORD_RE, QUOTED_NAME_RE,
};
use super::IdentifierStyle;
use crate::token::{Token, TokenKind, TokenStream};
use crate::Tokenize;

/// Splits prose into words, punctuation and whitespace sentinels.
///
/// With [`IdentifierStyle::Whole`] words are kept intact and a single-quoted
/// identifier (`'name'`) is emitted as a `Name` between two quote tokens. With
/// [`IdentifierStyle::CamelCase`] words are split into camel-case pieces.
#[derive(Debug, Clone, Copy)]
pub struct NaturalLexer {
    style: IdentifierStyle,
}

impl NaturalLexer {
    pub fn new(style: IdentifierStyle) -> Self {
        Self { style }
    }

    /// Lex a fragment embedded in code. No synthetic newline is involved.
    pub fn lex_fragment(&self, text: &str, out: &mut Vec<Token>) {
        let mut pos = 0;
        while let Some(ch) = text[pos..].chars().next() {
            let rest = &text[pos..];
            let consumed = if ch.is_whitespace() {
                out.push(Token::whitespace(ch));
                ch.len_utf8()
            } else {
                match self.style {
                    IdentifierStyle::Whole => Self::lex_whole(text, pos, rest, out),
                    IdentifierStyle::CamelCase => Self::lex_camel(rest, out),
                }
            };
            pos += consumed;
        }
    }

    fn lex_whole(text: &str, pos: usize, rest: &str, out: &mut Vec<Token>) -> usize {
        if let Some(len) = quoted_name_len(text, pos) {
            let inner = &rest[1..len - 1];
            out.push(Token::new(TokenKind::Punctuation, "'"));
            out.push(Token::new(TokenKind::Name, inner));
            out.push(Token::new(TokenKind::Punctuation, "'"));
            return len;
        }
        if let Some(word) = PROSE_WORD_RE.find(rest) {
            out.push(Token::new(TokenKind::Code, word.as_str()));
            return word.end();
        }
        push_symbol(rest, PROSE_PUNCTUATION_CHARS, out)
    }

    fn lex_camel(rest: &str, out: &mut Vec<Token>) -> usize {
        let piece = camel_piece_len(rest);
        if piece > 0 {
            out.push(Token::new(TokenKind::Name, &rest[..piece]));
            return piece;
        }
        let bytes = rest.as_bytes();
        if bytes.first().is_some_and(u8::is_ascii_digit) {
            out.push(Token::new(TokenKind::Number, &rest[..1]));
            return 1;
        }
        if rest.starts_with('\'') {
            out.push(Token::new(TokenKind::Punctuation, "'"));
            return 1;
        }
        push_symbol(rest, PROSE_PUNCTUATION_CHARS, out)
    }
}

impl Tokenize for NaturalLexer {
    fn tokenize(&self, source: &str) -> TokenStream {
        let padded = format!("{source}\n");
        let mut tokens = Vec::new();
        self.lex_fragment(&padded, &mut tokens);
        if tokens.last().is_some_and(Token::is_newline) {
            tokens.pop();
        }
        tokens
    }
}

/// Length of a `'name'` quote starting at `pos`, if one applies there.
///
/// The quote must follow whitespace inside the fragment and be followed by a
/// non-word character.
fn quoted_name_len(text: &str, pos: usize) -> Option<usize> {
    let after_space = text[..pos].chars().next_back().is_some_and(char::is_whitespace);
    if !after_space {
        return None;
    }
    let found = QUOTED_NAME_RE.find(&text[pos..])?;
    let next = text[pos + found.end()..].chars().next()?;
    (!is_word_char(next)).then_some(found.end())
}

/// Emit one punctuation or fallback character and return its byte length.
pub(crate) fn push_symbol(rest: &str, punctuation: &str, out: &mut Vec<Token>) -> usize {
    let Some(ch) = rest.chars().next() else {
        return 0;
    };
    let kind = if punctuation.contains(ch) {
        TokenKind::Punctuation
    } else {
        TokenKind::Code
    };
    out.push(Token::new(kind, ch.to_string()));
    ch.len_utf8()
}

/// Lowercase every space-separated word of a diagnostic message except those
/// starting with a single quote, which usually name code identifiers.
pub fn prepare_message(message: &str) -> String {
    message
        .split(' ')
        .map(|word| {
            if word.starts_with('\'') {
                word.to_string()
            } else {
                word.to_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
