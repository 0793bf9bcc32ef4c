//! Unified-diff parsing and hunk-to-edit extraction.

use std::sync::LazyLock;

use regex::Regex;

use crate::edit::{Deletion, EditOperation, Insertion, Replacement};
use crate::error::PatchError;

static HUNK_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@ ?(.*)$").unwrap()
});

const DEV_NULL: &str = "/dev/null";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Context,
    Added,
    Removed,
}

/// One line of a hunk with its position on each side of the diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkLine {
    pub kind: LineKind,
    pub value: String,
    pub source_line: Option<i64>,
    pub target_line: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub source_start: i64,
    pub source_length: i64,
    pub target_start: i64,
    pub target_length: i64,
    pub section_header: String,
    pub lines: Vec<HunkLine>,
}

/// All hunks touching one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePatch {
    pub source_file: String,
    pub target_file: String,
    pub hunks: Vec<Hunk>,
}

impl FilePatch {
    /// Repository-relative path of the patched file, without `a/` / `b/` prefixes.
    pub fn path(&self) -> &str {
        let file = if self.source_file == DEV_NULL {
            &self.target_file
        } else {
            &self.source_file
        };
        file.strip_prefix("a/")
            .or_else(|| file.strip_prefix("b/"))
            .unwrap_or(file)
    }

    pub fn is_added_file(&self) -> bool {
        self.source_file == DEV_NULL
            || (self.hunks.len() == 1
                && self.hunks[0].source_start == 0
                && self.hunks[0].source_length == 0)
    }

    pub fn is_removed_file(&self) -> bool {
        self.target_file == DEV_NULL
            || (self.hunks.len() == 1
                && self.hunks[0].target_start == 0
                && self.hunks[0].target_length == 0)
    }
}

/// Edits extracted from one hunk, grouped by kind in hunk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HunkEdits {
    pub replacements: Vec<EditOperation>,
    pub insertions: Vec<EditOperation>,
    pub deletions: Vec<EditOperation>,
}

impl HunkEdits {
    pub fn len(&self) -> usize {
        self.replacements.len() + self.insertions.len() + self.deletions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn extend(&mut self, other: HunkEdits) {
        self.replacements.extend(other.replacements);
        self.insertions.extend(other.insertions);
        self.deletions.extend(other.deletions);
    }
}

fn header_path(line: &str, prefix: &str) -> String {
    let rest = &line[prefix.len()..];
    // A tab separates the path from an optional timestamp.
    rest.split('\t').next().unwrap_or(rest).trim_end().to_string()
}

fn parse_number(text: Option<regex::Match<'_>>, default: i64, header: &str) -> Result<i64, PatchError> {
    match text {
        Some(m) => m
            .as_str()
            .parse()
            .map_err(|_| PatchError::BadHunkHeader(header.to_string())),
        None => Ok(default),
    }
}

fn parse_hunk_header(header: &str) -> Result<Hunk, PatchError> {
    let caps = HUNK_HEADER_RE
        .captures(header)
        .ok_or_else(|| PatchError::BadHunkHeader(header.to_string()))?;
    Ok(Hunk {
        source_start: parse_number(caps.get(1), 0, header)?,
        source_length: parse_number(caps.get(2), 1, header)?,
        target_start: parse_number(caps.get(3), 0, header)?,
        target_length: parse_number(caps.get(4), 1, header)?,
        section_header: caps.get(5).map_or("", |m| m.as_str()).to_string(),
        lines: Vec::new(),
    })
}

/// Parse a (possibly multi-file) unified diff.
///
/// Every hunk line gets its source and/or target line number. Text between
/// file patches (`diff --git`, `index`, mode lines) is ignored.
pub fn parse_patch_set(text: &str) -> Result<Vec<FilePatch>, PatchError> {
    let mut patches: Vec<FilePatch> = Vec::new();
    let mut pending_source: Option<String> = None;
    let mut lines = text.lines().map(|l| l.strip_suffix('\r').unwrap_or(l)).peekable();

    while let Some(line) = lines.next() {
        if line.starts_with("--- ") && lines.peek().is_some_and(|next| next.starts_with("+++ ")) {
            pending_source = Some(header_path(line, "--- "));
            continue;
        }
        if let Some(source_file) = line.starts_with("+++ ").then(|| pending_source.take()).flatten() {
            patches.push(FilePatch {
                source_file,
                target_file: header_path(line, "+++ "),
                hunks: Vec::new(),
            });
            continue;
        }
        if !line.starts_with("@@") {
            continue;
        }

        let mut hunk = parse_hunk_header(line)?;
        let mut source_line = hunk.source_start;
        let mut target_line = hunk.target_start;
        let mut source_left = hunk.source_length;
        let mut target_left = hunk.target_length;

        while source_left > 0 || target_left > 0 {
            let Some(body) = lines.next() else {
                return Err(PatchError::TruncatedHunk {
                    source_start: hunk.source_start,
                });
            };
            if body.starts_with('\\') {
                continue;
            }
            let (kind, value) = match body.chars().next() {
                Some('+') => (LineKind::Added, &body[1..]),
                Some('-') => (LineKind::Removed, &body[1..]),
                Some(' ') => (LineKind::Context, &body[1..]),
                // Some tools drop the leading space of blank context lines.
                None => (LineKind::Context, ""),
                Some(_) => {
                    return Err(PatchError::TruncatedHunk {
                        source_start: hunk.source_start,
                    })
                }
            };
            let (source, target) = match kind {
                LineKind::Context => {
                    source_left -= 1;
                    target_left -= 1;
                    source_line += 1;
                    target_line += 1;
                    (Some(source_line - 1), Some(target_line - 1))
                }
                LineKind::Removed => {
                    source_left -= 1;
                    source_line += 1;
                    (Some(source_line - 1), None)
                }
                LineKind::Added => {
                    target_left -= 1;
                    target_line += 1;
                    (None, Some(target_line - 1))
                }
            };
            if source_left < 0 || target_left < 0 {
                return Err(PatchError::TruncatedHunk {
                    source_start: hunk.source_start,
                });
            }
            hunk.lines.push(HunkLine {
                kind,
                value: value.to_string(),
                source_line: source,
                target_line: target,
            });
        }
        while lines.peek().is_some_and(|next| next.starts_with('\\')) {
            lines.next();
        }

        patches
            .last_mut()
            .ok_or(PatchError::HunkWithoutFile)?
            .hunks
            .push(hunk);
    }
    Ok(patches)
}

#[derive(Default)]
struct EditAccumulator {
    replaced_sources: Vec<i64>,
    replaced_targets: Vec<String>,
    insertion: Option<Insertion>,
    edits: HunkEdits,
}

impl EditAccumulator {
    fn flush_replacement(&mut self) {
        let (Some(&first), Some(&last)) =
            (self.replaced_sources.first(), self.replaced_sources.last())
        else {
            return;
        };
        if self.replaced_targets.is_empty() {
            self.edits.deletions.push(EditOperation::Delete(Deletion {
                source_line_start: first,
                source_line_end: last,
            }));
            self.replaced_sources.clear();
        } else {
            self.edits.replacements.push(EditOperation::Replace(Replacement {
                source_lines: std::mem::take(&mut self.replaced_sources),
                target_lines: std::mem::take(&mut self.replaced_targets),
            }));
        }
    }

    fn flush_insertion(&mut self) {
        if let Some(insertion) = self.insertion.take() {
            if !insertion.target_lines.is_empty() {
                self.edits.insertions.push(EditOperation::Insert(insertion));
            }
        }
    }

    fn flush(&mut self) {
        self.flush_replacement();
        self.flush_insertion();
    }
}

/// Split one hunk into replacement, insertion and deletion edits.
///
/// Removed lines accumulate into a replacement; added lines following them
/// become its target lines, otherwise they start an insertion after the
/// preceding source line. Context lines close whatever is open. A replacement
/// that never received target lines is emitted as a deletion.
pub fn parse_hunk(hunk: &Hunk) -> HunkEdits {
    let mut acc = EditAccumulator::default();
    // Deliberately not `source_start` itself: that is the first line the hunk
    // shows, so an added line ahead of it follows `source_start - 1`. A hunk
    // with no source lines already names the line it inserts after.
    let mut previous_source_line = if hunk.source_length == 0 {
        hunk.source_start
    } else {
        hunk.source_start - 1
    };

    for line in &hunk.lines {
        match line.kind {
            LineKind::Context => {
                acc.flush();
                if let Some(source) = line.source_line {
                    previous_source_line = source;
                }
            }
            LineKind::Removed => {
                acc.flush_insertion();
                if let Some(source) = line.source_line {
                    acc.replaced_sources.push(source);
                    previous_source_line = source;
                }
            }
            LineKind::Added if acc.replaced_sources.is_empty() => {
                acc.insertion
                    .get_or_insert_with(|| Insertion {
                        previous_source_line,
                        target_start_line: line.target_line.unwrap_or_default(),
                        target_lines: Vec::new(),
                    })
                    .target_lines
                    .push(line.value.clone());
            }
            LineKind::Added => acc.replaced_targets.push(line.value.clone()),
        }
    }
    acc.flush();
    acc.edits
}
