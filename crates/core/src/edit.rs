//! Line-level edit operations extracted from diff hunks.
//!
//! All line numbers are 1-indexed source lines, as reported by diffs and by
//! static analysers. They turn into window-relative numbers only when a
//! datapoint is rebased.

use serde::{Deserialize, Serialize};

use crate::error::ApplyError;

/// Lines inserted right after `previous_source_line` (0 inserts at the top).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insertion {
    #[serde(rename = "PreviousSourceLocation")]
    pub previous_source_line: i64,
    #[serde(rename = "TargetStartLocation")]
    pub target_start_line: i64,
    #[serde(rename = "TargetLines")]
    pub target_lines: Vec<String>,
}

/// Inclusive range of deleted source lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deletion {
    #[serde(rename = "SourceLocationStart")]
    pub source_line_start: i64,
    #[serde(rename = "SourceLocationEnd")]
    pub source_line_end: i64,
}

/// Deleted source lines (exact, possibly non-contiguous) and their replacement.
///
/// `target_lines` is never empty; a replacement without target lines is a
/// [`Deletion`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    #[serde(rename = "SourceLocations")]
    pub source_lines: Vec<i64>,
    #[serde(rename = "TargetLines")]
    pub target_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "ActionType", content = "Action")]
pub enum EditOperation {
    #[serde(rename = "ADD")]
    Insert(Insertion),
    #[serde(rename = "REMOVE")]
    Delete(Deletion),
    #[serde(rename = "REPLACE")]
    Replace(Replacement),
}

impl EditOperation {
    /// Marker naming this kind of edit in flattened text and logs.
    pub fn action_name(&self) -> &'static str {
        match self {
            EditOperation::Insert(_) => "ADD",
            EditOperation::Delete(_) => "REMOVE",
            EditOperation::Replace(_) => "REPLACE",
        }
    }

    pub fn target_lines(&self) -> &[String] {
        match self {
            EditOperation::Insert(insert) => &insert.target_lines,
            EditOperation::Replace(replace) => &replace.target_lines,
            EditOperation::Delete(_) => &[],
        }
    }

    /// First and (where the edit has one) last source line the edit touches.
    pub fn source_span(&self) -> (i64, Option<i64>) {
        match self {
            EditOperation::Insert(insert) => (insert.previous_source_line, None),
            EditOperation::Delete(delete) => {
                (delete.source_line_start, Some(delete.source_line_end))
            }
            EditOperation::Replace(replace) => {
                let first = replace.source_lines.first().copied().unwrap_or_default();
                (first, replace.source_lines.last().copied())
            }
        }
    }

    /// Subtract `offset` from every source line reference.
    pub fn shift_lines(&mut self, offset: i64) {
        match self {
            EditOperation::Insert(insert) => insert.previous_source_line -= offset,
            EditOperation::Delete(delete) => {
                delete.source_line_start -= offset;
                delete.source_line_end -= offset;
            }
            EditOperation::Replace(replace) => {
                for line in &mut replace.source_lines {
                    *line -= offset;
                }
            }
        }
    }

    /// 0-based line range the target lines occupy in the edited file.
    ///
    /// `None` for deletions, which have no target side.
    pub fn required_target_lines(&self) -> Option<(i64, i64)> {
        let (start, len) = match self {
            EditOperation::Insert(insert) => {
                (insert.previous_source_line, insert.target_lines.len())
            }
            EditOperation::Replace(replace) => (
                replace.source_lines.first().copied()? - 1,
                replace.target_lines.len(),
            ),
            EditOperation::Delete(_) => return None,
        };
        Some((start, start + len as i64 - 1))
    }

    /// Apply the edit to a file given as a list of lines.
    pub fn apply_to_lines(&self, lines: &[String]) -> Result<Vec<String>, ApplyError> {
        let len = lines.len();
        let index_of = |line: i64| -> Result<usize, ApplyError> {
            usize::try_from(line - 1)
                .ok()
                .filter(|&idx| idx < len)
                .ok_or(ApplyError { line, len })
        };

        match self {
            EditOperation::Insert(insert) => {
                let at = usize::try_from(insert.previous_source_line)
                    .ok()
                    .filter(|&at| at <= len)
                    .ok_or(ApplyError {
                        line: insert.previous_source_line,
                        len,
                    })?;
                let mut edited = Vec::with_capacity(len + insert.target_lines.len());
                edited.extend_from_slice(&lines[..at]);
                edited.extend(insert.target_lines.iter().map(|l| strip_newline(l)));
                edited.extend_from_slice(&lines[at..]);
                Ok(edited)
            }
            EditOperation::Delete(delete) => {
                let start = index_of(delete.source_line_start)?;
                let end = index_of(delete.source_line_end)?;
                Ok(lines
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| !(start..=end).contains(idx))
                    .map(|(_, line)| line.clone())
                    .collect())
            }
            EditOperation::Replace(replace) => {
                let removed = replace
                    .source_lines
                    .iter()
                    .map(|&line| index_of(line))
                    .collect::<Result<Vec<_>, _>>()?;
                let Some(&first) = removed.first() else {
                    return Ok(lines.to_vec());
                };
                let mut edited: Vec<String> = lines
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| !removed.contains(idx))
                    .map(|(_, line)| line.clone())
                    .collect();
                let at = first.min(edited.len());
                edited.splice(at..at, replace.target_lines.iter().map(|l| strip_newline(l)));
                Ok(edited)
            }
        }
    }
}

fn strip_newline(line: &str) -> String {
    line.trim_end_matches('\n').to_string()
}
