//! Helper functions for source text checks and content hashing.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

// Vertical tab and form feed split lines differently across tools.
static LINE_BREAKING_CONTROL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x0b\x0c]").unwrap());

/// Normalize `\r\n` and lone `\r` line endings to `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Why a source text cannot be tokenized reliably, if it cannot.
pub(crate) fn source_defect(text: &str) -> Option<&'static str> {
    if !text.is_ascii() {
        Some("non-ASCII content")
    } else if LINE_BREAKING_CONTROL_RE.is_match(text) {
        Some("vertical tab or form feed")
    } else {
        None
    }
}

/// First 64 bits of the SHA-256 digest over all `parts`, in order.
///
/// Each part is length-prefixed so `["ab", "c"]` and `["a", "bc"]` differ.
pub fn content_hash<I, B>(parts: I) -> u64
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut hasher = Sha256::new();
    for part in parts {
        let part = part.as_ref();
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

/// Split text into lines the way the edit operations count them: every `\n`
/// ends a line, and text after the last `\n` (possibly empty) is one more line.
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn test_source_defect() {
        assert_eq!(source_defect("int x;\n\tx++;"), None);
        assert_eq!(source_defect("int π;"), Some("non-ASCII content"));
        assert_eq!(source_defect("a\x0cb"), Some("vertical tab or form feed"));
    }

    #[test]
    fn test_content_hash_is_stable_and_separates_parts() {
        assert_eq!(content_hash(["abc"]), content_hash(["abc"]));
        assert_ne!(content_hash(["ab", "c"]), content_hash(["a", "bc"]));
        assert_ne!(content_hash(["abc"]), content_hash(["abd"]));
    }

    #[test]
    fn test_split_lines_keeps_trailing_empty_line() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b", ""]);
        assert_eq!(split_lines(""), vec![""]);
    }
}
