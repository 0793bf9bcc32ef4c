//! Lossless, whitespace-preserving lexer for C#-like source code.
//!
//! The lexer is an explicit state machine: every step looks at the remaining
//! input in the current [`State`], emits zero or more tokens, consumes some
//! bytes and names the next state. Comment and string bodies are handed to the
//! [`NaturalLexer`] so they come out as words and punctuation, not code.
//!
//! Whitespace is emitted one character per token, with spaces, newlines and
//! tabs replaced by their sentinels, so every source line is closed by exactly
//! one `NEWLINE` token and [`detokenize`](crate::token::detokenize) restores
//! the input byte for byte.

mod natural;
mod rules;

pub use natural::{prepare_message, NaturalLexer};

use natural::push_symbol;
use rules::{
    camel_piece_len, CALL_OPEN_RE, CHAR_LITERAL_RE, IDENTIFIER_RE, KEYWORDS, NUMBER_RE,
    OPERATOR2_RE, OPERATOR3_RE, OPERATOR_CHARS, PREPROCESSOR_RE, PUNCTUATION_CHARS,
    STRING_BODY_RE, TYPE_DECLARATION_KEYWORDS, TYPE_KEYWORDS, VERBATIM_BODY_RE, WORD_RUN_RE,
};

use crate::token::{Token, TokenKind, TokenStream};
use crate::Tokenize;

/// How identifiers (and words in prose) are cut into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierStyle {
    /// Identifiers are single tokens.
    #[default]
    Whole,
    /// Identifiers are split on camel-case boundaries.
    CamelCase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Root,
    LineComment,
    BlockComment,
    QuotedString,
    VerbatimString,
    /// Right after `class` / `struct`.
    TypeName,
}

/// What the current line looked like so far, for spotting method declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineShape {
    Start,
    Word,
    WordThenSpace,
    Other,
}

struct Step {
    tokens: Vec<Token>,
    consumed: usize,
    next: State,
}

impl Step {
    fn one(kind: TokenKind, text: &str, next: State) -> Self {
        Self {
            tokens: vec![Token::new(kind, text)],
            consumed: text.len(),
            next,
        }
    }

    fn pop_to_root() -> Self {
        Self {
            tokens: Vec::new(),
            consumed: 0,
            next: State::Root,
        }
    }
}

/// Lexer for C#-like code with natural-language comment and string bodies.
#[derive(Debug, Clone, Copy)]
pub struct CodeLexer {
    style: IdentifierStyle,
    natural: NaturalLexer,
}

impl CodeLexer {
    pub fn new(style: IdentifierStyle) -> Self {
        Self {
            style,
            natural: NaturalLexer::new(style),
        }
    }

    pub fn standard() -> Self {
        Self::new(IdentifierStyle::Whole)
    }

    pub fn camel_case() -> Self {
        Self::new(IdentifierStyle::CamelCase)
    }

    /// The sub-lexer used for comments, strings and diagnostic messages.
    pub fn natural(&self) -> &NaturalLexer {
        &self.natural
    }

    /// Lex `source` followed by one synthetic newline, keeping that final
    /// `NEWLINE` token in the output.
    pub fn lex(&self, source: &str) -> TokenStream {
        let padded = format!("{source}\n");
        Scanner::new(self, &padded).run()
    }
}

impl Default for CodeLexer {
    fn default() -> Self {
        Self::standard()
    }
}

impl Tokenize for CodeLexer {
    fn tokenize(&self, source: &str) -> TokenStream {
        let mut tokens = self.lex(source);
        if tokens.last().is_some_and(Token::is_newline) {
            tokens.pop();
        }
        tokens
    }
}

/// A char literal is one token unless it holds a whitespace character, which
/// gets its own sentinel between the quotes.
fn char_literal(literal: &str) -> Step {
    let body = &literal[1..literal.len() - 1];
    match body.chars().next() {
        Some(ch) if ch.is_whitespace() => Step {
            tokens: vec![
                Token::new(TokenKind::StringChar, "'"),
                Token::whitespace(ch),
                Token::new(TokenKind::StringChar, "'"),
            ],
            consumed: literal.len(),
            next: State::Root,
        },
        _ => Step::one(TokenKind::StringChar, literal, State::Root),
    }
}

struct Scanner<'a> {
    lexer: &'a CodeLexer,
    src: &'a str,
    pos: usize,
    state: State,
    shape: LineShape,
    in_attribute: bool,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    fn new(lexer: &'a CodeLexer, src: &'a str) -> Self {
        Self {
            lexer,
            src,
            pos: 0,
            state: State::Root,
            shape: LineShape::Start,
            in_attribute: false,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> TokenStream {
        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];
            let step = match self.state {
                State::Root => self.root(rest),
                State::LineComment => self.line_comment(rest),
                State::BlockComment => self.block_comment(rest),
                State::QuotedString => self.quoted_string(rest),
                State::VerbatimString => self.verbatim_string(rest),
                State::TypeName => self.type_name(rest),
            };
            for token in &step.tokens {
                self.observe(token);
            }
            self.tokens.extend(step.tokens);
            self.pos += step.consumed;
            self.state = step.next;
        }
        self.tokens
    }

    fn observe(&mut self, token: &Token) {
        if token.is_newline() {
            self.shape = LineShape::Start;
            self.in_attribute = false;
            return;
        }
        match token.kind {
            TokenKind::Whitespace => {
                if self.shape == LineShape::Word {
                    self.shape = LineShape::WordThenSpace;
                }
            }
            TokenKind::Keyword | TokenKind::KeywordType | TokenKind::Name | TokenKind::NameClass => {
                self.shape = match self.shape {
                    LineShape::Start | LineShape::Word | LineShape::WordThenSpace => LineShape::Word,
                    LineShape::Other => LineShape::Other,
                };
            }
            TokenKind::Punctuation if token.text == "[" => {
                if self.shape == LineShape::Start {
                    self.in_attribute = true;
                    self.shape = LineShape::Other;
                } else if self.shape != LineShape::Word {
                    self.shape = LineShape::Other;
                }
            }
            TokenKind::Punctuation if token.text == "]" => {
                self.in_attribute = false;
                if self.shape != LineShape::Word {
                    self.shape = LineShape::Other;
                }
            }
            _ => self.shape = LineShape::Other,
        }
    }

    fn root(&self, rest: &str) -> Step {
        let Some(ch) = rest.chars().next() else {
            return Step::pop_to_root();
        };
        if ch.is_whitespace() {
            return Step {
                tokens: vec![Token::whitespace(ch)],
                consumed: ch.len_utf8(),
                next: State::Root,
            };
        }
        if rest.starts_with("//") {
            return Step::one(TokenKind::CommentSingle, "//", State::LineComment);
        }
        if rest.starts_with("/*") {
            return Step::one(TokenKind::CommentMultiline, "/*", State::BlockComment);
        }
        if rest.starts_with("@\"") {
            return Step::one(TokenKind::String, "@\"", State::VerbatimString);
        }
        if ch == '"' {
            return Step::one(TokenKind::String, "\"", State::QuotedString);
        }
        if let Some(found) = CHAR_LITERAL_RE.find(rest) {
            return char_literal(found.as_str());
        }
        if let Some(found) = NUMBER_RE.find(rest) {
            return Step::one(TokenKind::Number, found.as_str(), State::Root);
        }
        if let Some(found) = PREPROCESSOR_RE.find(rest) {
            return Step::one(TokenKind::PreprocessorDirective, found.as_str(), State::Root);
        }
        if let Some(step) = self.word(rest) {
            return step;
        }
        if let Some(found) = OPERATOR3_RE.find(rest).or_else(|| OPERATOR2_RE.find(rest)) {
            return Step::one(TokenKind::Operator, found.as_str(), State::Root);
        }
        if OPERATOR_CHARS.contains(ch) {
            return Step::one(TokenKind::Operator, &rest[..ch.len_utf8()], State::Root);
        }
        let mut tokens = Vec::with_capacity(1);
        let consumed = push_symbol(rest, PUNCTUATION_CHARS, &mut tokens);
        Step {
            tokens,
            consumed,
            next: State::Root,
        }
    }

    /// Keywords and identifiers. `None` when `rest` does not start a word.
    fn word(&self, rest: &str) -> Option<Step> {
        if let Some(run) = WORD_RUN_RE.find(rest) {
            let run = run.as_str();
            if TYPE_DECLARATION_KEYWORDS.contains(&run) {
                return Some(Step::one(TokenKind::Keyword, run, State::TypeName));
            }
            if KEYWORDS.contains(&run) {
                return Some(Step::one(TokenKind::Keyword, run, State::Root));
            }
            if TYPE_KEYWORDS.contains(&run) {
                let nullable = rest[run.len()..].starts_with('?');
                let text = &rest[..run.len() + usize::from(nullable)];
                return Some(Step::one(TokenKind::KeywordType, text, State::Root));
            }
        }
        let kind = if self.in_attribute {
            TokenKind::NameAttribute
        } else {
            TokenKind::Name
        };
        match self.lexer.style {
            IdentifierStyle::Whole => {
                let ident = IDENTIFIER_RE.find(rest)?.as_str();
                let after = &rest[ident.len()..];
                let kind = if kind == TokenKind::Name
                    && self.shape == LineShape::WordThenSpace
                    && CALL_OPEN_RE.is_match(after)
                {
                    TokenKind::NameFunction
                } else {
                    kind
                };
                Some(Step::one(kind, ident, State::Root))
            }
            IdentifierStyle::CamelCase => {
                let piece = camel_piece_len(rest);
                (piece > 0).then(|| Step::one(kind, &rest[..piece], State::Root))
            }
        }
    }

    fn type_name(&self, rest: &str) -> Step {
        let Some(ch) = rest.chars().next() else {
            return Step::pop_to_root();
        };
        if ch.is_whitespace() && ch != '\n' {
            return Step {
                tokens: vec![Token::whitespace(ch)],
                consumed: ch.len_utf8(),
                next: State::TypeName,
            };
        }
        match self.lexer.style {
            IdentifierStyle::Whole => match IDENTIFIER_RE.find(rest) {
                Some(ident) => Step::one(TokenKind::NameClass, ident.as_str(), State::Root),
                None => Step::pop_to_root(),
            },
            IdentifierStyle::CamelCase => {
                let piece = camel_piece_len(rest);
                if piece == 0 {
                    return Step::pop_to_root();
                }
                let continues = rest[piece..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic());
                let next = if continues { State::TypeName } else { State::Root };
                Step::one(TokenKind::NameClass, &rest[..piece], next)
            }
        }
    }

    fn line_comment(&self, rest: &str) -> Step {
        let body_len = rest.find('\n').unwrap_or(rest.len());
        self.natural_body(&rest[..body_len], None)
    }

    fn block_comment(&self, rest: &str) -> Step {
        match rest.find("*/") {
            Some(end) => self.natural_body(&rest[..end], Some((TokenKind::CommentMultiline, "*/"))),
            None => self.natural_body(rest, None),
        }
    }

    fn quoted_string(&self, rest: &str) -> Step {
        let body_len = STRING_BODY_RE.find(rest).map_or(0, |m| m.end());
        let closed = rest[body_len..].starts_with('"');
        self.natural_body(&rest[..body_len], closed.then_some((TokenKind::String, "\"")))
    }

    fn verbatim_string(&self, rest: &str) -> Step {
        let body_len = VERBATIM_BODY_RE.find(rest).map_or(0, |m| m.end());
        let closed = rest[body_len..].starts_with('"');
        self.natural_body(&rest[..body_len], closed.then_some((TokenKind::String, "\"")))
    }

    /// Run the prose sub-lexer over `body`, optionally followed by a closing
    /// delimiter, and return to the root state.
    fn natural_body(&self, body: &str, closer: Option<(TokenKind, &str)>) -> Step {
        let mut tokens = Vec::new();
        self.lexer.natural.lex_fragment(body, &mut tokens);
        let mut consumed = body.len();
        if let Some((kind, text)) = closer {
            tokens.push(Token::new(kind, text));
            consumed += text.len();
        }
        Step {
            tokens,
            consumed,
            next: State::Root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::recreate_code;
    use crate::token::{detokenize, NEWLINE, TAB, WHITESPACE};
    use rstest::rstest;

    fn texts(tokens: &[Token]) -> Vec<String> {
        tokens.iter().map(|t| t.text.clone()).collect()
    }

    fn expect(parts: &[&[&str]]) -> Vec<String> {
        parts.iter().flat_map(|p| p.iter()).map(|s| s.to_string()).collect()
    }

    const WS4: &[&str] = &[WHITESPACE, WHITESPACE, WHITESPACE, WHITESPACE];

    #[test]
    fn test_if_block() {
        let tokens = CodeLexer::standard().tokenize("if (x ==5){\n    y=7;\n}");
        let expected = expect(&[
            &["if", WHITESPACE, "(", "x", WHITESPACE, "==", "5", ")", "{", NEWLINE],
            WS4,
            &["y", "=", "7", ";", NEWLINE, "}"],
        ]);
        assert_eq!(texts(&tokens), expected);
    }

    #[test]
    fn test_sentinels_for_trailing_newline_input() {
        let tokens = CodeLexer::standard().tokenize("if (x ==5){\n");
        assert_eq!(
            texts(&tokens),
            expect(&[&["if", WHITESPACE, "(", "x", WHITESPACE, "==", "5", ")", "{", NEWLINE]])
        );
    }

    #[test]
    fn test_char_literal_and_line_comment() {
        let tokens = CodeLexer::standard().tokenize("var z = 'x'  // Char");
        assert_eq!(
            texts(&tokens),
            expect(&[&[
                "var", WHITESPACE, "z", WHITESPACE, "=", WHITESPACE, "'x'", WHITESPACE,
                WHITESPACE, "//", WHITESPACE, "Char"
            ]])
        );
        assert_eq!(tokens[0].kind, TokenKind::KeywordType);
        assert_eq!(tokens[6].kind, TokenKind::StringChar);
    }

    #[test]
    fn test_whitespace_char_literal_gets_sentinel() {
        let tokens = CodeLexer::standard().tokenize("c = ' ' + '\t';");
        assert_eq!(
            texts(&tokens),
            expect(&[&[
                "c", WHITESPACE, "=", WHITESPACE, "'", WHITESPACE, "'", WHITESPACE, "+",
                WHITESPACE, "'", TAB, "'", ";"
            ]])
        );
        assert_eq!(tokens[4].kind, TokenKind::StringChar);
    }

    #[test]
    fn test_verbatim_string_spanning_lines() {
        let tokens = CodeLexer::standard().tokenize("x = @\"xyz\nklll mmklll\n\";  // Some comment");
        assert_eq!(
            texts(&tokens),
            expect(&[&[
                "x", WHITESPACE, "=", WHITESPACE, "@\"", "xyz", NEWLINE, "klll", WHITESPACE,
                "mmklll", NEWLINE, "\"", ";", WHITESPACE, WHITESPACE, "//", WHITESPACE, "Some",
                WHITESPACE, "comment"
            ]])
        );
    }

    #[test]
    fn test_block_comment_inside_line_comment_is_prose() {
        let tokens = CodeLexer::standard().tokenize("if (x=5){ // /* Weird... */ Why?");
        assert_eq!(
            texts(&tokens),
            expect(&[&[
                "if", WHITESPACE, "(", "x", "=", "5", ")", "{", WHITESPACE, "//", WHITESPACE, "/",
                "*", WHITESPACE, "Weird", ".", ".", ".", WHITESPACE, "*", "/", WHITESPACE, "Why",
                "?"
            ]])
        );
    }

    #[test]
    fn test_inline_block_comment() {
        let tokens = CodeLexer::standard().tokenize("if (nkj && /* njnk */ njs){");
        assert_eq!(
            texts(&tokens),
            expect(&[&[
                "if", WHITESPACE, "(", "nkj", WHITESPACE, "&&", WHITESPACE, "/*", WHITESPACE,
                "njnk", WHITESPACE, "*/", WHITESPACE, "njs", ")", "{"
            ]])
        );
    }

    #[test]
    fn test_multiline_block_comment_quotes() {
        let source = "{\n/*\n    Change 'Unused' to xyz.\n    It's hard!\n*/\n}";
        let tokens = CodeLexer::standard().tokenize(source);
        let expected = expect(&[
            &["{", NEWLINE, "/*", NEWLINE],
            WS4,
            &["Change", WHITESPACE, "'", "Unused", "'", WHITESPACE, "to", WHITESPACE, "xyz", "."],
            &[NEWLINE],
            WS4,
            &["It's", WHITESPACE, "hard", "!", NEWLINE, "*/", NEWLINE, "}"],
        ]);
        assert_eq!(texts(&tokens), expected);
        let unused = tokens.iter().find(|t| t.text == "Unused").map(|t| t.kind);
        assert_eq!(unused, Some(TokenKind::Name));
    }

    #[test]
    fn test_enum_digits_are_single_tokens() {
        let tokens = CodeLexer::standard().tokenize("Found = 302,\nRedirect = 302,");
        assert_eq!(
            texts(&tokens),
            expect(&[&[
                "Found", WHITESPACE, "=", WHITESPACE, "3", "0", "2", ",", NEWLINE, "Redirect",
                WHITESPACE, "=", WHITESPACE, "3", "0", "2", ","
            ]])
        );
    }

    #[test]
    fn test_pragma_directive() {
        let tokens = CodeLexer::standard().tokenize("#pragma warning disable 436 // Attribute in source");
        assert_eq!(tokens[0].text, "#pragma");
        assert_eq!(tokens[0].kind, TokenKind::PreprocessorDirective);
        assert_eq!(
            texts(&tokens)[1..8],
            expect(&[&[WHITESPACE, "warning", WHITESPACE, "disable", WHITESPACE, "4", "3"]])[..]
        );
    }

    #[test]
    fn test_attribute_brackets() {
        let tokens = CodeLexer::standard().tokenize("}\n\n    [Flags]\n    internal");
        let expected = expect(&[
            &["}", NEWLINE, NEWLINE],
            WS4,
            &["[", "Flags", "]", NEWLINE],
            WS4,
            &["internal"],
        ]);
        assert_eq!(texts(&tokens), expected);
        let flags = tokens.iter().find(|t| t.text == "Flags").map(|t| t.kind);
        assert_eq!(flags, Some(TokenKind::NameAttribute));
    }

    #[test]
    fn test_complex_attribute() {
        let source = "[ComImport, Guid(\"bla\"), Suppress]\ninternal interface ISymNGenWriter";
        let tokens = CodeLexer::standard().tokenize(source);
        assert_eq!(
            texts(&tokens),
            expect(&[&[
                "[", "ComImport", ",", WHITESPACE, "Guid", "(", "\"", "bla", "\"", ")", ",",
                WHITESPACE, "Suppress", "]", NEWLINE, "internal", WHITESPACE, "interface",
                WHITESPACE, "ISymNGenWriter"
            ]])
        );
    }

    #[test]
    fn test_method_declaration_name() {
        let tokens = CodeLexer::standard().tokenize("public static void Main (string[] args)");
        let main = tokens.iter().find(|t| t.text == "Main").map(|t| t.kind);
        assert_eq!(main, Some(TokenKind::NameFunction));
        let args = tokens.iter().find(|t| t.text == "args").map(|t| t.kind);
        assert_eq!(args, Some(TokenKind::Name));
    }

    #[test]
    fn test_class_name() {
        let tokens = CodeLexer::standard().tokenize("class Image {}");
        assert_eq!(tokens[2].kind, TokenKind::NameClass);
        assert_eq!(tokens[2].text, "Image");
    }

    #[test]
    fn test_camel_case_identifiers() {
        let tokens = CodeLexer::camel_case().tokenize("class eclipseRCPExt {\n    int myValue2;\n}");
        assert_eq!(
            texts(&tokens),
            expect(&[
                &["class", WHITESPACE, "eclipse", "RCP", "Ext", WHITESPACE, "{", NEWLINE],
                WS4,
                &["int", WHITESPACE, "my", "Value", "2", ";", NEWLINE, "}"],
            ])
        );
        assert_eq!(tokens[3].kind, TokenKind::NameClass);
    }

    #[test]
    fn test_nullable_type_keyword() {
        let tokens = CodeLexer::standard().tokenize("int? x");
        assert_eq!(tokens[0].text, "int?");
        assert_eq!(tokens[0].kind, TokenKind::KeywordType);
    }

    #[test]
    fn test_unterminated_regular_string_stops_at_newline() {
        let tokens = CodeLexer::standard().tokenize("s = \"abc\nx");
        let newline_count = tokens.iter().filter(|t| t.is_newline()).count();
        assert_eq!(newline_count, 1);
        assert_eq!(tokens.last().map(|t| t.text.as_str()), Some("x"));
    }

    #[rstest]
    #[case("")]
    #[case("\n\n")]
    #[case("a\r\nb\t\u{b}c")]
    #[case("/* never closed\n")]
    #[case("@\"never closed")]
    #[case("x = \"esc \\\" quote\";\n// tail")]
    #[case("var s = $\"{a}\" ?? b->c >>= 1 ... ::\n")]
    #[case("class\nFoo : Bar<T> where T : struct {}")]
    #[case("π = 3.14e+0f; // ünïcode")]
    fn test_round_trip_and_newline_count(#[case] source: &str) {
        for lexer in [CodeLexer::standard(), CodeLexer::camel_case()] {
            let tokens = lexer.tokenize(source);
            assert_eq!(detokenize(&tokens), source);
            let newlines = tokens.iter().filter(|t| t.is_newline()).count();
            assert_eq!(newlines, source.matches('\n').count());
            assert!(tokens.iter().all(|t| !t.text.contains('\n')));
        }
    }

    // Sources as the pipeline hands them over: ASCII with `\n` line endings.
    #[rstest]
    #[case("char c = ' ';\nchar t = '\t';\n")]
    #[case("if (x ==5){\n    y=7;\n}")]
    #[case("s = \"two  spaces\t tab\"; // trailing  \n")]
    #[case("/* a\n\tb */ @\"x\n  y\"\n\n")]
    #[case("[Obsolete( \"no\" )]\nvoid F ( int a ) { }\n")]
    fn test_flattened_tokens_decode_to_source(#[case] source: &str) {
        for lexer in [CodeLexer::standard(), CodeLexer::camel_case()] {
            let words: Vec<String> = texts(&lexer.tokenize(source));
            assert!(words.iter().all(|w| !w.contains(char::is_whitespace)));
            assert_eq!(recreate_code(&words.join(" ")), source);
        }
    }

    #[test]
    fn test_lex_keeps_synthetic_newline() {
        let tokens = CodeLexer::standard().lex("x");
        assert_eq!(texts(&tokens), vec!["x".to_string(), NEWLINE.to_string()]);
    }
}
