//! Flattening of tokenized datapoints into model text, and decoding back.
//!
//! Source line: `(LINE <n> MESSAGE <tokens>)* FILE_CONTENT <tokens>`
//!
//! Target line, one of:
//! - `ADD PREVIOUS_SOURCE_LOCATION <n> TARGET_LINES <tokens>`
//! - `REPLACE SOURCE_LOCATION <n>+ TARGET_LINES <tokens>`
//! - `REMOVE SOURCE_LOCATION_START <n> SOURCE_LOCATION_END <n>`
//!
//! Markers are reserved words. An identifier spelled exactly like a marker
//! inside a diagnostic message would be misread on decode.

use std::iter::Peekable;
use std::str::SplitWhitespace;

use tracing::warn;

use crate::datapoint::{Rebased, TokenizedDatapoint};
use crate::edit::{Deletion, EditOperation, Insertion, Replacement};
use crate::error::DecodeError;
use crate::token::sentinel_to_text;

const LINE: &str = "LINE";
const MESSAGE: &str = "MESSAGE";
const FILE_CONTENT: &str = "FILE_CONTENT";
const ADD: &str = "ADD";
const REPLACE: &str = "REPLACE";
const REMOVE: &str = "REMOVE";
const PREVIOUS_SOURCE_LOCATION: &str = "PREVIOUS_SOURCE_LOCATION";
const SOURCE_LOCATION: &str = "SOURCE_LOCATION";
const SOURCE_LOCATION_START: &str = "SOURCE_LOCATION_START";
const SOURCE_LOCATION_END: &str = "SOURCE_LOCATION_END";
const TARGET_LINES: &str = "TARGET_LINES";

/// Model input text for a rebased datapoint, with one trailing newline.
pub fn flatten_source(datapoint: &TokenizedDatapoint<Rebased>) -> String {
    let mut words: Vec<String> = Vec::new();
    for occurrence in &datapoint.diagnostic_occurrences {
        words.push(LINE.to_string());
        words.push(occurrence.line.to_string());
        words.push(MESSAGE.to_string());
        words.extend(occurrence.tokenized_message.iter().cloned());
    }
    words.push(FILE_CONTENT.to_string());
    words.extend(datapoint.tokenized_file_context.iter().cloned());
    words.join(" ") + "\n"
}

/// Model target text for a rebased datapoint, with one trailing newline.
pub fn flatten_target(datapoint: &TokenizedDatapoint<Rebased>) -> String {
    let mut words: Vec<String> = vec![datapoint.parsed_diff.action_name().to_string()];
    match &datapoint.parsed_diff {
        EditOperation::Insert(insert) => {
            words.push(PREVIOUS_SOURCE_LOCATION.to_string());
            words.push(insert.previous_source_line.to_string());
            words.push(TARGET_LINES.to_string());
            words.extend(datapoint.tokenized_target_lines.iter().cloned());
        }
        EditOperation::Replace(replace) => {
            words.push(SOURCE_LOCATION.to_string());
            words.extend(replace.source_lines.iter().map(i64::to_string));
            words.push(TARGET_LINES.to_string());
            words.extend(datapoint.tokenized_target_lines.iter().cloned());
        }
        EditOperation::Delete(delete) => {
            words.push(SOURCE_LOCATION_START.to_string());
            words.push(delete.source_line_start.to_string());
            words.push(SOURCE_LOCATION_END.to_string());
            words.push(delete.source_line_end.to_string());
        }
    }
    words.join(" ") + "\n"
}

/// `(source, target)` text pair for one datapoint.
pub fn flatten_datapoint(datapoint: &TokenizedDatapoint<Rebased>) -> (String, String) {
    (flatten_source(datapoint), flatten_target(datapoint))
}

/// Rebuild text from space-separated tokens, mapping sentinels back to whitespace.
pub fn recreate_code(tokenized: &str) -> String {
    tokenized.split_whitespace().map(sentinel_to_text).collect()
}

fn recreate_words(words: &[&str]) -> String {
    words.iter().copied().map(sentinel_to_text).collect()
}

/// A diagnostic decoded from model input text. `line` is window-relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub line: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSource {
    pub annotations: Vec<Annotation>,
    pub file_context: String,
}

impl DecodedSource {
    /// The file context split into lines. A trailing newline does not open
    /// an extra line.
    pub fn file_context_lines(&self) -> Vec<String> {
        let body = self
            .file_context
            .strip_suffix('\n')
            .unwrap_or(&self.file_context);
        body.split('\n').map(str::to_string).collect()
    }
}

struct Words<'a> {
    inner: Peekable<SplitWhitespace<'a>>,
}

impl<'a> Words<'a> {
    fn new(text: &'a str) -> Result<Self, DecodeError> {
        let mut inner = text.split_whitespace().peekable();
        if inner.peek().is_none() {
            return Err(DecodeError::Empty);
        }
        Ok(Self { inner })
    }

    fn next(&mut self) -> Option<&'a str> {
        self.inner.next()
    }

    fn peek_is(&mut self, marker: &str) -> bool {
        self.inner.peek().is_some_and(|w| *w == marker)
    }

    fn expect(&mut self, marker: &'static str) -> Result<(), DecodeError> {
        match self.inner.next() {
            Some(word) if word == marker => Ok(()),
            _ => Err(DecodeError::MissingMarker(marker)),
        }
    }

    fn number(&mut self, after: &'static str) -> Result<i64, DecodeError> {
        let word = self
            .inner
            .next()
            .ok_or(DecodeError::MissingLineNumber(after))?;
        word.parse()
            .map_err(|_| DecodeError::InvalidNumber(word.to_string()))
    }

    fn take_until(&mut self, stops: &[&str]) -> Vec<&'a str> {
        let mut taken = Vec::new();
        while let Some(&word) = self.inner.peek() {
            if stops.contains(&word) {
                break;
            }
            taken.push(word);
            self.inner.next();
        }
        taken
    }

    fn rest(self) -> Vec<&'a str> {
        self.inner.collect()
    }
}

fn target_lines(words: &[&str]) -> Vec<String> {
    let code = recreate_words(words);
    if code.is_empty() {
        return Vec::new();
    }
    let body = code.strip_suffix('\n').unwrap_or(&code);
    body.split('\n').map(str::to_string).collect()
}

/// Decode a target line back into an edit with window-relative line numbers.
pub fn recreate_diff(tgt_text: &str) -> Result<EditOperation, DecodeError> {
    let mut words = Words::new(tgt_text)?;
    let action = words.next().unwrap_or_default();
    match action {
        ADD => {
            words.expect(PREVIOUS_SOURCE_LOCATION)?;
            let previous_source_line = words.number(PREVIOUS_SOURCE_LOCATION)?;
            words.expect(TARGET_LINES)?;
            Ok(EditOperation::Insert(Insertion {
                previous_source_line,
                target_start_line: previous_source_line + 1,
                target_lines: target_lines(&words.rest()),
            }))
        }
        REPLACE => {
            words.expect(SOURCE_LOCATION)?;
            let mut source_lines = Vec::new();
            while !words.peek_is(TARGET_LINES) {
                source_lines.push(words.number(SOURCE_LOCATION)?);
            }
            if source_lines.is_empty() {
                return Err(DecodeError::MissingLineNumber(SOURCE_LOCATION));
            }
            words.expect(TARGET_LINES)?;
            let target_lines = target_lines(&words.rest());
            if target_lines.is_empty() {
                let (first, last) = (source_lines[0], source_lines[source_lines.len() - 1]);
                return Ok(EditOperation::Delete(Deletion {
                    source_line_start: first,
                    source_line_end: last,
                }));
            }
            Ok(EditOperation::Replace(Replacement {
                source_lines,
                target_lines,
            }))
        }
        REMOVE => {
            words.expect(SOURCE_LOCATION_START)?;
            let source_line_start = words.number(SOURCE_LOCATION_START)?;
            words.expect(SOURCE_LOCATION_END)?;
            let source_line_end = words.number(SOURCE_LOCATION_END)?;
            Ok(EditOperation::Delete(Deletion {
                source_line_start,
                source_line_end,
            }))
        }
        other => Err(DecodeError::UnknownAction(other.to_string())),
    }
}

/// Decode a source line into its diagnostics and file context text.
pub fn recreate_src(src_text: &str) -> Result<DecodedSource, DecodeError> {
    let mut words = Words::new(src_text)?;
    let mut annotations = Vec::new();
    while words.peek_is(LINE) {
        words.expect(LINE)?;
        let line = words.number(LINE)?;
        words.expect(MESSAGE)?;
        let message = recreate_words(&words.take_until(&[LINE, FILE_CONTENT]));
        annotations.push(Annotation { line, message });
    }
    words.expect(FILE_CONTENT)?;
    Ok(DecodedSource {
        annotations,
        file_context: recreate_words(&words.rest()),
    })
}

/// Whether a predicted target line decodes to the expected edit.
///
/// Undecodable predictions are incorrect, never an error.
pub fn prediction_matches(expected_tgt: &str, predicted_tgt: &str) -> bool {
    let expected = match recreate_diff(expected_tgt) {
        Ok(edit) => edit,
        Err(err) => {
            warn!(%err, "expected target does not decode");
            return false;
        }
    };
    match recreate_diff(predicted_tgt) {
        Ok(predicted) => predicted == expected,
        Err(err) => {
            warn!(%err, "prediction does not decode");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn datapoint(parsed_diff: serde_json::Value, target: &[&str]) -> TokenizedDatapoint<Rebased> {
        serde_json::from_value(json!({
            "Repo": "repo",
            "DiagnosticID": "IDE0005",
            "RequiredLinesStart": 20,
            "RequiredLinesEnd": 21,
            "DiagnosticOccurances": [
                {"Message": "Using directive is unnecessary.", "Line": 1, "Character": 1,
                 "TokenizedMessage": ["using", "WHITESPACE", "directive"]},
                {"Message": "Second", "Line": 12, "Character": 3,
                 "TokenizedMessage": ["second"]}
            ],
            "ParsedDiff": parsed_diff,
            "TokenizedTargetLines": target,
            "FileContextStart": 17,
            "TokenizedFileContext": ["int", "WHITESPACE", "x", ";", "NEWLINE", "}"],
            "TokenizedFileContextStart": 19
        }))
        .unwrap()
    }

    #[test]
    fn test_flatten_source() {
        let dp = datapoint(
            json!({"ActionType": "REMOVE", "Action": {"SourceLocationStart": 1, "SourceLocationEnd": 1}}),
            &[],
        );
        assert_eq!(
            flatten_source(&dp),
            "LINE 1 MESSAGE using WHITESPACE directive LINE 12 MESSAGE second \
             FILE_CONTENT int WHITESPACE x ; NEWLINE }\n"
        );
    }

    #[rstest]
    #[case(
        json!({"ActionType": "ADD", "Action": {"PreviousSourceLocation": 11, "TargetStartLocation": 12, "TargetLines": ["y"]}}),
        &["y", ";", "NEWLINE"],
        "ADD PREVIOUS_SOURCE_LOCATION 11 TARGET_LINES y ; NEWLINE\n"
    )]
    #[case(
        json!({"ActionType": "REPLACE", "Action": {"SourceLocations": [10, 12], "TargetLines": ["z"]}}),
        &["z", "NEWLINE"],
        "REPLACE SOURCE_LOCATION 10 12 TARGET_LINES z NEWLINE\n"
    )]
    #[case(
        json!({"ActionType": "REMOVE", "Action": {"SourceLocationStart": 13, "SourceLocationEnd": 15}}),
        &[],
        "REMOVE SOURCE_LOCATION_START 13 SOURCE_LOCATION_END 15\n"
    )]
    fn test_flatten_target(
        #[case] parsed_diff: serde_json::Value,
        #[case] target: &[&str],
        #[case] expected: &str,
    ) {
        assert_eq!(flatten_target(&datapoint(parsed_diff, target)), expected);
    }

    #[test]
    fn test_recreate_code_maps_sentinels() {
        assert_eq!(
            recreate_code("if WHITESPACE ( x ) NEWLINE TAB y ;"),
            "if (x)\n\ty;"
        );
    }

    #[test]
    fn test_recreate_src() {
        let decoded = recreate_src(
            "LINE 1 MESSAGE remove WHITESPACE ' VAR-0 ' LINE 2 MESSAGE x FILE_CONTENT a NEWLINE b\n",
        )
        .unwrap();
        assert_eq!(
            decoded.annotations,
            vec![
                Annotation {
                    line: 1,
                    message: "remove 'VAR-0'".to_string()
                },
                Annotation {
                    line: 2,
                    message: "x".to_string()
                },
            ]
        );
        assert_eq!(decoded.file_context, "a\nb");
        assert_eq!(decoded.file_context_lines(), vec!["a", "b"]);
    }

    #[test]
    fn test_recreate_diff_variants() {
        assert_eq!(
            recreate_diff("ADD PREVIOUS_SOURCE_LOCATION 3 TARGET_LINES a NEWLINE b NEWLINE\n"),
            Ok(EditOperation::Insert(Insertion {
                previous_source_line: 3,
                target_start_line: 4,
                target_lines: vec!["a".to_string(), "b".to_string()],
            }))
        );
        assert_eq!(
            recreate_diff("REPLACE SOURCE_LOCATION 4 7 TARGET_LINES q WHITESPACE = NEWLINE"),
            Ok(EditOperation::Replace(Replacement {
                source_lines: vec![4, 7],
                target_lines: vec!["q =".to_string()],
            }))
        );
        assert_eq!(
            recreate_diff("REMOVE SOURCE_LOCATION_START 12 SOURCE_LOCATION_END 14"),
            Ok(EditOperation::Delete(Deletion {
                source_line_start: 12,
                source_line_end: 14,
            }))
        );
    }

    #[test]
    fn test_replace_without_targets_decodes_as_delete() {
        assert_eq!(
            recreate_diff("REPLACE SOURCE_LOCATION 4 5 TARGET_LINES"),
            Ok(EditOperation::Delete(Deletion {
                source_line_start: 4,
                source_line_end: 5,
            }))
        );
    }

    #[rstest]
    #[case("", DecodeError::Empty)]
    #[case("MOVE 1 2", DecodeError::UnknownAction("MOVE".to_string()))]
    #[case("ADD 1 TARGET_LINES x", DecodeError::MissingMarker("PREVIOUS_SOURCE_LOCATION"))]
    #[case("REMOVE SOURCE_LOCATION_START 1 2", DecodeError::MissingMarker("SOURCE_LOCATION_END"))]
    #[case("REMOVE SOURCE_LOCATION_START x", DecodeError::InvalidNumber("x".to_string()))]
    #[case("REPLACE SOURCE_LOCATION TARGET_LINES x", DecodeError::MissingLineNumber("SOURCE_LOCATION"))]
    #[case("REPLACE SOURCE_LOCATION 1 a", DecodeError::InvalidNumber("a".to_string()))]
    fn test_malformed_targets(#[case] text: &str, #[case] expected: DecodeError) {
        assert_eq!(recreate_diff(text), Err(expected));
    }

    #[test]
    fn test_src_without_file_content_is_rejected() {
        assert_eq!(
            recreate_src("LINE 1 MESSAGE x"),
            Err(DecodeError::MissingMarker("FILE_CONTENT"))
        );
    }

    #[test]
    fn test_flatten_then_decode_round_trip() {
        let dp = datapoint(
            json!({"ActionType": "REPLACE", "Action": {"SourceLocations": [10, 11], "TargetLines": ["int y;"]}}),
            &["int", "WHITESPACE", "y", ";", "NEWLINE"],
        );
        let (src, tgt) = flatten_datapoint(&dp);
        let decoded = recreate_src(&src).unwrap();
        assert_eq!(decoded.annotations[1].line, 12);
        assert_eq!(decoded.file_context, "int x;\n}");
        assert_eq!(
            recreate_diff(&tgt).unwrap(),
            EditOperation::Replace(Replacement {
                source_lines: vec![10, 11],
                target_lines: vec!["int y;".to_string()],
            })
        );
    }

    #[test]
    fn test_prediction_matches() {
        let expected = "REMOVE SOURCE_LOCATION_START 2 SOURCE_LOCATION_END 3\n";
        assert!(prediction_matches(expected, "REMOVE SOURCE_LOCATION_START 2 SOURCE_LOCATION_END 3"));
        assert!(!prediction_matches(expected, "REMOVE SOURCE_LOCATION_START 2 SOURCE_LOCATION_END 4"));
        assert!(!prediction_matches(expected, "REMOVE SOURCE_LOCATION_START two"));
        assert!(!prediction_matches(expected, ""));
    }
}
