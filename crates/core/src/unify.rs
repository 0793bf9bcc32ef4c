//! Matching analyser diagnostics to the diff batches that fixed them.
//!
//! One diagnostic can only have produced one batch, but several diagnostics
//! (say two on the same line) may share a batch. Which batch belongs to which
//! diagnostic is a guess based on line positions:
//!
//! 1. a replacement whose source lines contain the diagnostic line,
//! 2. a deletion whose range contains it,
//! 3. an insertion directly above it, unless that insertion was already
//!    claimed as lying below another diagnostic,
//! 4. an insertion directly below it.
//!
//! Diagnostics without a candidate are dropped. Every guess past the first
//! two rules is logged.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::datapoint::{DiagnosticOccurrence, UnifiedDatapoint};
use crate::edit::EditOperation;
use crate::helpers::content_hash;
use crate::patch::{parse_hunk, FilePatch, HunkEdits};
use crate::FILE_CONTEXT_RADIUS;

/// One diagnostic as exported from an analyser report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiagnosticRecord {
    pub repo: String,
    #[serde(rename = "Id")]
    pub diagnostic_id: String,
    /// Repository-relative path; either separator is accepted.
    pub file_path: String,
    pub message: String,
    pub line: i64,
    pub character: i64,
    #[serde(default)]
    pub severity: String,
}

impl DiagnosticRecord {
    fn occurrence(&self) -> DiagnosticOccurrence {
        DiagnosticOccurrence {
            message: self.message.clone(),
            line: self.line,
            character: self.character,
        }
    }
}

/// One row of the repository listing the analysed checkouts were cloned from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRecord {
    #[serde(rename = "RepoName")]
    pub repo_name: String,
    #[serde(rename = "RepoURL")]
    pub repo_url: String,
}

/// Where a fix diff came from, parsed from its file stem
/// `REPO__SOLUTION__COMMIT__ANALYZER__DIAGNOSTIC`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOrigin {
    pub stem: String,
    pub repo: String,
    pub solution_file: String,
    pub commit: String,
    pub analyzer_nuget: String,
    pub diagnostic_id: String,
    /// Clone URL of `repo`, when the repository listing has it.
    pub repo_url: Option<String>,
}

impl DiffOrigin {
    pub fn from_stem(stem: &str) -> Option<Self> {
        let parts: Vec<&str> = stem.split("__").collect();
        let [repo, solution_file, commit, analyzer_nuget, diagnostic_id] = parts[..] else {
            return None;
        };
        Some(Self {
            stem: stem.to_string(),
            repo: repo.to_string(),
            solution_file: solution_file.to_string(),
            commit: commit.to_string(),
            analyzer_nuget: analyzer_nuget.to_string(),
            diagnostic_id: diagnostic_id.to_string(),
            repo_url: None,
        })
    }

    /// Browsable URL of `path` at the diff's commit. Only GitHub URLs have a
    /// known layout.
    pub fn file_url(&self, path: &str) -> Option<String> {
        let url = self.repo_url.as_deref()?;
        if !url.starts_with("https://github.com/") {
            return None;
        }
        let base = url.strip_suffix(".git").unwrap_or(url);
        Some(format!("{base}/blob/{}/{path}", self.commit))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchKey {
    Replace(usize),
    Delete(usize),
    Insert(usize),
}

fn contains_line(edit: &EditOperation, line: i64) -> bool {
    match edit {
        EditOperation::Replace(replace) => replace.source_lines.contains(&line),
        EditOperation::Delete(delete) => {
            (delete.source_line_start..=delete.source_line_end).contains(&line)
        }
        EditOperation::Insert(_) => false,
    }
}

fn previous_source_line(edit: &EditOperation) -> Option<i64> {
    match edit {
        EditOperation::Insert(insert) => Some(insert.previous_source_line),
        _ => None,
    }
}

/// Assign each occurrence to a batch; batches are returned in first-match order.
fn match_batches(
    occurrences: &[DiagnosticOccurrence],
    edits: &HunkEdits,
) -> Vec<(BatchKey, Vec<DiagnosticOccurrence>)> {
    // Insertion index -> whether it was first claimed as lying above a diagnostic.
    let mut insert_above: Vec<Option<bool>> = vec![None; edits.insertions.len()];
    let mut batches: Vec<(BatchKey, Vec<DiagnosticOccurrence>)> = Vec::new();

    for occurrence in occurrences {
        let line = occurrence.line;
        let mut key = edits
            .replacements
            .iter()
            .position(|e| contains_line(e, line))
            .map(BatchKey::Replace)
            .or_else(|| {
                edits
                    .deletions
                    .iter()
                    .position(|e| contains_line(e, line))
                    .map(BatchKey::Delete)
            });

        if key.is_none() {
            for (idx, insert) in edits.insertions.iter().enumerate() {
                if previous_source_line(insert) != Some(line - 1) {
                    continue;
                }
                match insert_above[idx] {
                    Some(false) => continue,
                    Some(true) => {}
                    None => insert_above[idx] = Some(true),
                }
                warn!(line, "matched diagnostic to the insertion above it");
                key = Some(BatchKey::Insert(idx));
                break;
            }
        }
        if key.is_none() {
            if let Some(idx) = edits
                .insertions
                .iter()
                .position(|e| previous_source_line(e) == Some(line))
            {
                insert_above[idx] = Some(false);
                warn!(line, "matched diagnostic to the insertion below it");
                key = Some(BatchKey::Insert(idx));
            }
        }

        let Some(key) = key else {
            debug!(line, "diagnostic has no matching diff batch");
            continue;
        };
        match batches.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => {
                warn!(line, ?key, "several diagnostics share one diff batch");
                group.push(occurrence.clone());
            }
            None => batches.push((key, vec![occurrence.clone()])),
        }
    }
    batches
}

fn batch_edit(edits: &HunkEdits, key: BatchKey) -> Option<&EditOperation> {
    match key {
        BatchKey::Replace(idx) => edits.replacements.get(idx),
        BatchKey::Delete(idx) => edits.deletions.get(idx),
        BatchKey::Insert(idx) => edits.insertions.get(idx),
    }
}

fn same_path(a: &str, b: &str) -> bool {
    a.replace('\\', "/") == b.replace('\\', "/")
}

/// Build one datapoint per diff batch of `patch` that a diagnostic maps to.
///
/// `diagnostics` may hold records for other files and rules; only those for
/// this patch's file and `origin.diagnostic_id` are used. `source` is the
/// pre-fix content of the patched file.
pub fn unify_file_patch(
    origin: &DiffOrigin,
    patch: &FilePatch,
    diagnostics: &[DiagnosticRecord],
    source: &str,
) -> Vec<UnifiedDatapoint> {
    let mut edits = HunkEdits::default();
    for hunk in &patch.hunks {
        edits.extend(parse_hunk(hunk));
    }

    let relevant: Vec<&DiagnosticRecord> = diagnostics
        .iter()
        .filter(|d| {
            d.repo == origin.repo
                && d.diagnostic_id == origin.diagnostic_id
                && same_path(&d.file_path, patch.path())
        })
        .collect();

    let mut occurrences: Vec<DiagnosticOccurrence> = Vec::with_capacity(relevant.len());
    for record in &relevant {
        let occurrence = record.occurrence();
        if occurrences.contains(&occurrence) {
            debug!(?occurrence, "duplicate diagnostic occurrence");
            continue;
        }
        occurrences.push(occurrence);
    }
    if edits.len() != occurrences.len() {
        info!(
            path = patch.path(),
            batches = edits.len(),
            diagnostics = occurrences.len(),
            "diff batch count differs from diagnostic count"
        );
    }

    let file_lines: Vec<&str> = source.lines().collect();
    let number_file_lines = file_lines.len();
    let severity = relevant.first().map(|d| d.severity.clone()).unwrap_or_default();

    match_batches(&occurrences, &edits)
        .into_iter()
        .filter_map(|(key, group)| {
            let edit = batch_edit(&edits, key)?.clone();
            let first_diag = group.iter().map(|o| o.line).min()?;
            let last_diag = group.iter().map(|o| o.line).max()?;
            let (first_diff, last_diff) = edit.source_span();

            let required_start = first_diag.min(first_diff).max(1);
            let required_end = last_diff.map_or(last_diag, |last| last.max(last_diag));
            let context_start = (required_start - FILE_CONTEXT_RADIUS).max(1);
            let context_end = (required_end + FILE_CONTEXT_RADIUS).min(number_file_lines as i64);
            let file_context = file_lines
                .iter()
                .skip(context_start as usize - 1)
                .take((context_end - context_start + 1).max(0) as usize)
                .map(|l| l.to_string())
                .collect();

            Some(UnifiedDatapoint {
                repo: origin.repo.clone(),
                repo_url: origin.repo_url.clone(),
                solution_file: origin.solution_file.clone(),
                file_path: patch.path().to_string(),
                number_file_lines,
                commit: origin.commit.clone(),
                file_url: origin.file_url(patch.path()),
                diagnostic_id: origin.diagnostic_id.clone(),
                analyzer_nuget: origin.analyzer_nuget.clone(),
                severity: severity.clone(),
                required_lines_start: required_start,
                required_lines_end: required_end,
                diagnostic_occurrences: group,
                parsed_diff: edit,
                file_context_start: context_start,
                file_context,
            })
        })
        .collect()
}

/// Stable, bounded-length stem for the datapoints of one patched file.
pub fn datapoint_stem(diff_stem: &str, patch_path: &str) -> String {
    let semantic = format!(
        "{diff_stem}__{}",
        patch_path.replace(['/', '\\'], "--")
    );
    format!("{:016x}", content_hash([semantic]))
}

/// File name of the `n`-th datapoint unified from one patched file.
pub fn datapoint_file_name(diff_stem: &str, patch_path: &str, n: usize) -> String {
    format!("{}-{n}.json", datapoint_stem(diff_stem, patch_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{Deletion, Insertion, Replacement};
    use crate::patch::parse_patch_set;

    fn occurrence(line: i64, character: i64) -> DiagnosticOccurrence {
        DiagnosticOccurrence {
            message: "msg".to_string(),
            line,
            character,
        }
    }

    fn insert_after(line: i64) -> EditOperation {
        EditOperation::Insert(Insertion {
            previous_source_line: line,
            target_start_line: line + 1,
            target_lines: vec!["x".to_string()],
        })
    }

    #[test]
    fn test_replace_beats_delete() {
        let edits = HunkEdits {
            replacements: vec![EditOperation::Replace(Replacement {
                source_lines: vec![5],
                target_lines: vec!["y".to_string()],
            })],
            insertions: Vec::new(),
            deletions: vec![EditOperation::Delete(Deletion {
                source_line_start: 4,
                source_line_end: 6,
            })],
        };
        let batches = match_batches(&[occurrence(5, 1)], &edits);
        assert_eq!(batches[0].0, BatchKey::Replace(0));
    }

    #[test]
    fn test_same_line_occurrences_share_a_batch() {
        let edits = HunkEdits {
            deletions: vec![EditOperation::Delete(Deletion {
                source_line_start: 3,
                source_line_end: 3,
            })],
            ..HunkEdits::default()
        };
        let batches = match_batches(&[occurrence(3, 1), occurrence(3, 9)], &edits);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].1.len(), 2);
    }

    #[test]
    fn test_insertion_claimed_below_is_skipped_for_above() {
        // Insertion after line 10: below a diagnostic on line 10, above one on line 11.
        let edits = HunkEdits {
            insertions: vec![insert_after(10), insert_after(11)],
            ..HunkEdits::default()
        };
        let batches = match_batches(&[occurrence(10, 1), occurrence(11, 1)], &edits);
        // Line 10: no insertion after line 9, so it takes insertion 0 as "below".
        // Line 11: insertion 0 is above it but already claimed as below, so it
        // falls through to insertion 1, which lies below it.
        assert_eq!(
            batches.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            vec![BatchKey::Insert(0), BatchKey::Insert(1)]
        );
    }

    #[test]
    fn test_unmatched_diagnostic_is_dropped() {
        let edits = HunkEdits {
            insertions: vec![insert_after(2)],
            ..HunkEdits::default()
        };
        assert!(match_batches(&[occurrence(40, 1)], &edits).is_empty());
    }

    #[test]
    fn test_unify_file_patch() {
        let source: String = (1..=12).map(|n| format!("line{n}\n")).collect();
        let diff = "--- a/src/A.cs\n+++ b/src/A.cs\n@@ -5,3 +5,2 @@\n line5\n-line6\n line7\n";
        let patches = parse_patch_set(diff).unwrap();
        let origin = DiffOrigin::from_stem("repo__App.sln__abc123__Roslynator.1.0__RCS1163").unwrap();
        let record = |file_path: &str, line: i64| DiagnosticRecord {
            repo: "repo".to_string(),
            diagnostic_id: "RCS1163".to_string(),
            file_path: file_path.to_string(),
            message: "Unused parameter.".to_string(),
            line,
            character: 7,
            severity: "Info".to_string(),
        };
        let diagnostics = vec![
            record("src\\A.cs", 6),
            record("src/A.cs", 6),
            record("src/B.cs", 6),
        ];

        let unified = unify_file_patch(&origin, &patches[0], &diagnostics, &source);
        assert_eq!(unified.len(), 1);
        let datapoint = &unified[0];
        assert_eq!(datapoint.diagnostic_occurrences.len(), 1);
        assert_eq!(datapoint.required_lines_start, 6);
        assert_eq!(datapoint.required_lines_end, 6);
        assert_eq!(datapoint.file_context_start, 3);
        assert_eq!(datapoint.file_context.first().map(String::as_str), Some("line3"));
        assert_eq!(datapoint.file_context.last().map(String::as_str), Some("line9"));
        assert_eq!(datapoint.number_file_lines, 12);
        assert_eq!(datapoint.severity, "Info");
        assert_eq!(datapoint.repo_url, None);
        assert_eq!(datapoint.file_url, None);
        let json = serde_json::to_value(datapoint).unwrap();
        assert!(json.get("RepoURL").is_none());
        assert!(json.get("FileURL").is_none());
    }

    #[test]
    fn test_urls_come_from_repo_listing() {
        let mut origin = DiffOrigin::from_stem("repo__App.sln__abc123__Pkg.1.0__RCS1163").unwrap();
        origin.repo_url = Some("https://github.com/owner/repo.git".to_string());
        assert_eq!(
            origin.file_url("src/A.cs").as_deref(),
            Some("https://github.com/owner/repo/blob/abc123/src/A.cs")
        );

        let source = "a\nb\nc\n";
        let diff = "--- a/src/A.cs\n+++ b/src/A.cs\n@@ -1,2 +1,1 @@\n a\n-b\n";
        let patches = parse_patch_set(diff).unwrap();
        let diagnostics = vec![DiagnosticRecord {
            repo: "repo".to_string(),
            diagnostic_id: "RCS1163".to_string(),
            file_path: "src/A.cs".to_string(),
            message: "m".to_string(),
            line: 2,
            character: 1,
            severity: String::new(),
        }];
        let unified = unify_file_patch(&origin, &patches[0], &diagnostics, source);
        let json = serde_json::to_value(&unified[0]).unwrap();
        assert_eq!(json["RepoURL"], "https://github.com/owner/repo.git");
        assert_eq!(json["FileURL"], "https://github.com/owner/repo/blob/abc123/src/A.cs");
    }

    #[test]
    fn test_non_github_repo_has_no_file_url() {
        let mut origin = DiffOrigin::from_stem("a__b__c__d__e").unwrap();
        origin.repo_url = Some("https://gitlab.com/owner/repo.git".to_string());
        assert_eq!(origin.file_url("x.cs"), None);
    }

    #[test]
    fn test_diff_origin_requires_five_parts() {
        assert!(DiffOrigin::from_stem("a__b__c__d").is_none());
        let origin = DiffOrigin::from_stem("a__b__c__d__e").unwrap();
        assert_eq!(origin.diagnostic_id, "e");
    }

    #[test]
    fn test_datapoint_file_name_is_hashed() {
        let name = datapoint_file_name("repo__x", "src/Deep/Path.cs", 2);
        assert!(name.ends_with("-2.json"));
        assert_eq!(name.len(), 16 + "-2.json".len());
        assert_eq!(name, datapoint_file_name("repo__x", "src\\Deep\\Path.cs", 2));
    }
}
