//! Regex rules, keyword tables and character classes shared by the lexers.

use regex::Regex;
use std::sync::LazyLock;

pub(crate) static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A(?:[0-9](?:\.[0-9]*)?(?:[eE][+-][0-9]+)?[flFLdD]?|0[xX][0-9a-fA-F]+[Ll]?)")
        .unwrap()
});
pub(crate) static CHAR_LITERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A'(?:\\[^\n]|[^\\\n])'").unwrap());
pub(crate) static PREPROCESSOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\A#(?:if|endif|else|elif|define|undef|line|error|warning|region|endregion|pragma)\b",
    )
    .unwrap()
});
pub(crate) static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A@?[A-Za-z_][A-Za-z0-9_]*").unwrap());
pub(crate) static WORD_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A[A-Za-z0-9_]+").unwrap());
pub(crate) static CALL_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A[ \t]*\(").unwrap());
pub(crate) static OPERATOR3_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A(?:->\*|>>=|<<=|\.\.\.)").unwrap());
pub(crate) static OPERATOR2_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A(?:\+\+|\+=|--|-=|->|&&|&=|\|\||\|=|!=|%=|\*=|==|::|\^=|>=|>>|<=|<<|/=)")
        .unwrap()
});
pub(crate) static STRING_BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\A(?:\\\\|\\[^\\\n]|[^"\\\n])*"#).unwrap());
pub(crate) static VERBATIM_BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\A(?:""|[^"])*"#).unwrap());

// Natural-language fragments (comments, strings, diagnostic messages).
pub(crate) static QUOTED_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A'[^'\s]+'").unwrap());
pub(crate) static PROSE_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A\w+(?:'\w+)?").unwrap());

pub(crate) const OPERATOR_CHARS: &str = "~!%^&*+=|:<>/?-";
pub(crate) const PUNCTUATION_CHARS: &str = "{}()[];,.";
pub(crate) const PROSE_PUNCTUATION_CHARS: &str = "~!%^&*()+=|[]:;,.<>/?-";

pub(crate) const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "base", "break", "by", "case", "catch", "checked",
    "const", "continue", "default", "delegate", "do", "else", "enum", "event", "explicit",
    "extern", "false", "finally", "fixed", "for", "foreach", "goto", "if", "implicit", "in",
    "interface", "internal", "is", "let", "lock", "new", "null", "on", "operator", "out",
    "override", "params", "private", "protected", "public", "readonly", "ref", "return",
    "sealed", "sizeof", "stackalloc", "static", "switch", "this", "throw", "true", "try",
    "typeof", "unchecked", "unsafe", "virtual", "void", "while", "get", "set", "partial",
    "yield", "add", "remove", "value", "alias", "ascending", "descending", "from", "group",
    "into", "orderby", "select", "thenby", "where", "join", "equals", "global", "namespace",
    "using",
];

/// Keywords after which the next identifier names a type.
pub(crate) const TYPE_DECLARATION_KEYWORDS: &[&str] = &["class", "struct"];

pub(crate) const TYPE_KEYWORDS: &[&str] = &[
    "bool", "byte", "char", "decimal", "double", "dynamic", "float", "int", "long", "object",
    "sbyte", "short", "string", "uint", "ulong", "ushort", "var",
];

/// Length in bytes of the leading camel-case piece of `s`.
///
/// Pieces are tried in order: an uppercase run followed by a Capitalised word
/// (the run minus its last letter), a Capitalised word, a lowercase run, an
/// uppercase run. Returns 0 when `s` does not start with an ASCII letter.
pub(crate) fn camel_piece_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let upper = bytes.iter().take_while(|b| b.is_ascii_uppercase()).count();
    if upper == 0 {
        return bytes.iter().take_while(|b| b.is_ascii_lowercase()).count();
    }
    let lower_after = bytes
        .get(upper..)
        .map_or(0, |tail| tail.iter().take_while(|b| b.is_ascii_lowercase()).count());
    if lower_after == 0 {
        upper
    } else if upper >= 2 {
        upper - 1
    } else {
        1 + lower_after
    }
}

/// Whether `c` continues a word for `\b` purposes.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
