//! Token model shared by the lexers, the windowing engine and the codec.

use serde::{Deserialize, Serialize};

/// Sentinel text standing in for a single space character.
pub const WHITESPACE: &str = "WHITESPACE";
/// Sentinel text standing in for a single `\n`.
pub const NEWLINE: &str = "NEWLINE";
/// Sentinel text standing in for a single `\t`.
pub const TAB: &str = "TAB";

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Anything the grammar has no better name for, including natural-language words.
    Code,
    Name,
    NameClass,
    NameFunction,
    NameAttribute,
    Keyword,
    KeywordType,
    String,
    StringChar,
    Number,
    Operator,
    Punctuation,
    CommentSingle,
    CommentMultiline,
    PreprocessorDirective,
    Whitespace,
}

impl TokenKind {
    /// Whether tokens of this kind are identifiers eligible for `VAR-<n>` aliasing.
    pub fn is_identifier(self) -> bool {
        matches!(
            self,
            TokenKind::Name | TokenKind::NameClass | TokenKind::NameFunction | TokenKind::NameAttribute
        )
    }
}

/// A single lexed token. Whitespace characters carry their sentinel text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Token for one whitespace character, substituting the sentinel where one exists.
    pub fn whitespace(ch: char) -> Self {
        let text = match ch {
            ' ' => WHITESPACE.to_string(),
            '\n' => NEWLINE.to_string(),
            '\t' => TAB.to_string(),
            other => other.to_string(),
        };
        Self {
            kind: TokenKind::Whitespace,
            text,
        }
    }

    pub fn is_newline(&self) -> bool {
        self.kind == TokenKind::Whitespace && self.text == NEWLINE
    }
}

/// Ordered, lossless token sequence for one source string.
pub type TokenStream = Vec<Token>;

/// Map a sentinel back to the character it replaced; other text is returned as-is.
pub fn sentinel_to_text(text: &str) -> &str {
    match text {
        WHITESPACE => " ",
        NEWLINE => "\n",
        TAB => "\t",
        other => other,
    }
}

/// Concatenate token texts with sentinel substitution, reproducing the lexed source.
pub fn detokenize(tokens: &[Token]) -> String {
    tokens.iter().map(|t| sentinel_to_text(&t.text)).collect()
}

/// Token texts only, as stored in tokenized datapoints.
pub fn token_texts(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(|t| t.text.clone()).collect()
}

/// Line → token-index lookup over a token stream.
///
/// Line `k` (0-based) covers the tokens from `starts[k]` up to the next line's
/// start; each line except possibly the last ends with exactly one NEWLINE token.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
    token_count: usize,
}

impl LineIndex {
    pub fn new(tokens: &[Token]) -> Self {
        let mut starts = vec![0];
        for (idx, token) in tokens.iter().enumerate() {
            if token.is_newline() {
                starts.push(idx + 1);
            }
        }
        Self {
            starts,
            token_count: tokens.len(),
        }
    }

    /// Number of lines, counting a trailing empty line after a final NEWLINE.
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Inclusive token range covering the 0-based lines `first..=last`.
    ///
    /// Returns `None` when the lines are out of range or cover no tokens.
    pub fn token_range(&self, first: usize, last: usize) -> Option<(usize, usize)> {
        if first > last || last >= self.starts.len() {
            return None;
        }
        let start = self.starts[first];
        let end_exclusive = self.starts.get(last + 1).copied().unwrap_or(self.token_count);
        if end_exclusive <= start {
            return None;
        }
        Some((start, end_exclusive - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(texts: &[&str]) -> Vec<Token> {
        texts
            .iter()
            .map(|t| match *t {
                WHITESPACE | NEWLINE | TAB => Token::new(TokenKind::Whitespace, *t),
                other => Token::new(TokenKind::Name, other),
            })
            .collect()
    }

    #[test]
    fn test_detokenize_substitutes_sentinels() {
        let tokens = stream(&["a", WHITESPACE, "=", TAB, "b", NEWLINE]);
        assert_eq!(detokenize(&tokens), "a =\tb\n");
    }

    #[test]
    fn test_whitespace_token_keeps_unknown_characters() {
        assert_eq!(Token::whitespace('\u{b}').text, "\u{b}");
        assert!(Token::whitespace('\n').is_newline());
    }

    #[test]
    fn test_line_index_ranges() {
        // line 0: a NEWLINE | line 1: b c NEWLINE | line 2: d
        let tokens = stream(&["a", NEWLINE, "b", "c", NEWLINE, "d"]);
        let index = LineIndex::new(&tokens);
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.token_range(0, 0), Some((0, 1)));
        assert_eq!(index.token_range(1, 2), Some((2, 5)));
        assert_eq!(index.token_range(2, 3), None);
    }

    #[test]
    fn test_empty_trailing_line_has_no_tokens() {
        let tokens = stream(&["a", NEWLINE]);
        let index = LineIndex::new(&tokens);
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.token_range(1, 1), None);
    }
}
