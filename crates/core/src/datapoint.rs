//! Datapoint records as stored between pipeline stages.
//!
//! Field names follow the JSON layout of the dataset (PascalCase, including
//! the historical `DiagnosticOccurances` spelling).

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::edit::EditOperation;

/// One place an analyser reported a diagnostic. Lines and characters are 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiagnosticOccurrence {
    pub message: String,
    pub line: i64,
    pub character: i64,
}

/// A diagnostic matched to the fix that resolved it, in source-line space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UnifiedDatapoint {
    pub repo: String,
    #[serde(rename = "RepoURL", default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub solution_file: String,
    pub file_path: String,
    #[serde(default)]
    pub number_file_lines: usize,
    #[serde(default)]
    pub commit: String,
    #[serde(rename = "FileURL", default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(rename = "DiagnosticID")]
    pub diagnostic_id: String,
    #[serde(rename = "AnalyzerNuGet", default)]
    pub analyzer_nuget: String,
    #[serde(default)]
    pub severity: String,
    pub required_lines_start: i64,
    pub required_lines_end: i64,
    #[serde(rename = "DiagnosticOccurances", alias = "DiagnosticOccurrences")]
    pub diagnostic_occurrences: Vec<DiagnosticOccurrence>,
    pub parsed_diff: EditOperation,
    pub file_context_start: i64,
    #[serde(default)]
    pub file_context: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TokenizedOccurrence {
    pub message: String,
    pub line: i64,
    pub character: i64,
    pub tokenized_message: Vec<String>,
}

impl TokenizedOccurrence {
    pub fn new(occurrence: DiagnosticOccurrence, tokenized_message: Vec<String>) -> Self {
        Self {
            message: occurrence.message,
            line: occurrence.line,
            character: occurrence.character,
            tokenized_message,
        }
    }
}

/// Line numbers are absolute 1-indexed source lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Absolute;

/// Line numbers are relative to the first line of the token window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rebased;

/// Line-number states a datapoint may be read back from storage in.
pub trait Stored: sealed::Sealed {}

impl Stored for Rebased {}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Rebased {}
}

/// A datapoint with its token window, target tokens and tokenized messages.
///
/// The marker `S` records whether line numbers have been rebased onto the
/// window. Only [`Absolute`] datapoints can be rebased, and rebasing consumes
/// them, so a datapoint is rebased exactly once:
///
/// ```compile_fail
/// use neural_fix_serializer_core::{Rebased, TokenizedDatapoint};
///
/// fn twice(datapoint: TokenizedDatapoint<Rebased>) {
///     datapoint.rebase(3);
/// }
/// ```
///
/// Only rebased datapoints are ever stored, so JSON reads back as
/// [`Rebased`] and never as [`Absolute`]:
///
/// ```compile_fail
/// use neural_fix_serializer_core::{Absolute, TokenizedDatapoint};
///
/// fn reload(json: &str) -> TokenizedDatapoint<Absolute> {
///     serde_json::from_str(json).unwrap()
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "PascalCase",
    bound(serialize = "", deserialize = "S: Stored")
)]
pub struct TokenizedDatapoint<S> {
    pub repo: String,
    #[serde(rename = "FileURL", default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(rename = "DiagnosticID")]
    pub diagnostic_id: String,
    #[serde(rename = "AnalyzerNuGet", default)]
    pub analyzer_nuget: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub number_file_lines: usize,
    pub required_lines_start: i64,
    pub required_lines_end: i64,
    #[serde(rename = "DiagnosticOccurances", alias = "DiagnosticOccurrences")]
    pub diagnostic_occurrences: Vec<TokenizedOccurrence>,
    pub parsed_diff: EditOperation,
    #[serde(default)]
    pub tokenized_target_lines: Vec<String>,
    pub file_context_start: i64,
    #[serde(default)]
    pub file_context: Vec<String>,
    pub tokenized_file_context: Vec<String>,
    /// 1-based source line the token window starts on; 0 until rebased.
    #[serde(default)]
    pub tokenized_file_context_start: i64,
    #[serde(skip)]
    state: PhantomData<S>,
}

impl TokenizedDatapoint<Absolute> {
    pub fn new(
        unified: UnifiedDatapoint,
        tokenized_file_context: Vec<String>,
        tokenized_target_lines: Vec<String>,
        diagnostic_occurrences: Vec<TokenizedOccurrence>,
    ) -> Self {
        Self {
            repo: unified.repo,
            file_url: unified.file_url,
            diagnostic_id: unified.diagnostic_id,
            analyzer_nuget: unified.analyzer_nuget,
            severity: unified.severity,
            number_file_lines: unified.number_file_lines,
            required_lines_start: unified.required_lines_start,
            required_lines_end: unified.required_lines_end,
            diagnostic_occurrences,
            parsed_diff: unified.parsed_diff,
            tokenized_target_lines,
            file_context_start: unified.file_context_start,
            file_context: unified.file_context,
            tokenized_file_context,
            tokenized_file_context_start: 0,
            state: PhantomData,
        }
    }

    /// Make every source line reference relative to `window_start_line`.
    ///
    /// Diagnostic lines and the edit's source lines all have the window's
    /// start line subtracted, so line 1 of the file becomes
    /// `1 - window_start_line`. The window start is kept in
    /// `tokenized_file_context_start`.
    pub fn rebase(self, window_start_line: i64) -> TokenizedDatapoint<Rebased> {
        let mut parsed_diff = self.parsed_diff;
        parsed_diff.shift_lines(window_start_line);
        let diagnostic_occurrences = self
            .diagnostic_occurrences
            .into_iter()
            .map(|occurrence| TokenizedOccurrence {
                line: occurrence.line - window_start_line,
                ..occurrence
            })
            .collect();

        TokenizedDatapoint {
            repo: self.repo,
            file_url: self.file_url,
            diagnostic_id: self.diagnostic_id,
            analyzer_nuget: self.analyzer_nuget,
            severity: self.severity,
            number_file_lines: self.number_file_lines,
            required_lines_start: self.required_lines_start,
            required_lines_end: self.required_lines_end,
            diagnostic_occurrences,
            parsed_diff,
            tokenized_target_lines: self.tokenized_target_lines,
            file_context_start: self.file_context_start,
            file_context: self.file_context,
            tokenized_file_context: self.tokenized_file_context,
            tokenized_file_context_start: window_start_line,
            state: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{Deletion, Insertion};

    fn unified(parsed_diff: EditOperation) -> UnifiedDatapoint {
        UnifiedDatapoint {
            repo: "repo".to_string(),
            repo_url: None,
            solution_file: String::new(),
            file_path: "src/A.cs".to_string(),
            number_file_lines: 40,
            commit: String::new(),
            file_url: None,
            diagnostic_id: "CA1822".to_string(),
            analyzer_nuget: String::new(),
            severity: "Warning".to_string(),
            required_lines_start: 12,
            required_lines_end: 14,
            diagnostic_occurrences: vec![DiagnosticOccurrence {
                message: "Mark members as static".to_string(),
                line: 12,
                character: 5,
            }],
            parsed_diff,
            file_context_start: 9,
            file_context: Vec::new(),
        }
    }

    fn tokenized(parsed_diff: EditOperation) -> TokenizedDatapoint<Absolute> {
        let unified = unified(parsed_diff);
        let occurrences = unified
            .diagnostic_occurrences
            .iter()
            .cloned()
            .map(|o| TokenizedOccurrence::new(o, vec!["mark".to_string()]))
            .collect();
        TokenizedDatapoint::new(unified, vec!["x".to_string()], Vec::new(), occurrences)
    }

    #[test]
    fn test_rebase_shifts_every_line_reference() {
        let datapoint = tokenized(EditOperation::Delete(Deletion {
            source_line_start: 13,
            source_line_end: 14,
        }));
        let rebased = datapoint.rebase(10);
        assert_eq!(rebased.diagnostic_occurrences[0].line, 2);
        assert_eq!(rebased.parsed_diff.source_span(), (3, Some(4)));
        assert_eq!(rebased.tokenized_file_context_start, 10);
        assert_eq!(rebased.required_lines_start, 12);
    }

    #[test]
    fn test_line_shift_is_not_idempotent() {
        let datapoint = tokenized(EditOperation::Insert(Insertion {
            previous_source_line: 12,
            target_start_line: 13,
            target_lines: vec!["y".to_string()],
        }));
        let rebased = datapoint.rebase(10);
        let mut shifted_again = rebased.parsed_diff.clone();
        shifted_again.shift_lines(10);
        assert_ne!(shifted_again, rebased.parsed_diff);
        assert_eq!(shifted_again.source_span(), (-8, None));
    }

    #[test]
    fn test_json_layout() {
        let datapoint = tokenized(EditOperation::Delete(Deletion {
            source_line_start: 13,
            source_line_end: 13,
        }))
        .rebase(10);
        let json = serde_json::to_value(&datapoint).unwrap();
        assert_eq!(json["DiagnosticID"], "CA1822");
        assert_eq!(json["DiagnosticOccurances"][0]["TokenizedMessage"][0], "mark");
        assert_eq!(json["ParsedDiff"]["ActionType"], "REMOVE");
        assert_eq!(json["TokenizedFileContextStart"], 10);

        let back: TokenizedDatapoint<Rebased> = serde_json::from_value(json).unwrap();
        assert_eq!(back, datapoint);
    }
}
