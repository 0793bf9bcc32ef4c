//! Human-readable diffs with diagnostic annotations.

use tracing::debug;

use crate::codec::{recreate_diff, recreate_src, Annotation};
use crate::diff::line_diff;
use crate::edit::EditOperation;
use crate::error::{ApplyError, DecodeError};

/// Apply `edit` to `lines` and render the line diff, with a
/// `<<<< DIAGNOSTIC: <message> >>>>` line in front of every original line an
/// annotation points at.
///
/// `edit` and `annotations` use 1-indexed line numbers into `lines`. Added
/// lines have no original index and never carry annotations.
pub fn render_annotated_diff(
    lines: &[String],
    edit: &EditOperation,
    annotations: &[Annotation],
) -> Result<String, ApplyError> {
    let edited = edit.apply_to_lines(lines)?;
    let mut out = String::new();
    let mut placed = 0;

    for diff_line in line_diff(lines, &edited) {
        if let Some(index) = diff_line.source_index {
            for annotation in annotations.iter().filter(|a| a.line - 1 == index as i64) {
                out.push_str(&format!("<<<< DIAGNOSTIC: {} >>>>\n", annotation.message));
                placed += 1;
            }
        }
        out.push_str(&diff_line.render());
        out.push('\n');
    }

    if placed < annotations.len() {
        debug!(
            dropped = annotations.len() - placed,
            "annotations outside the file context"
        );
    }
    Ok(out)
}

/// Decode a source/target pair and render it as an annotated diff.
///
/// Flattened line numbers are 0-based offsets into the window; they are moved
/// to 1-indexed file-context lines before rendering.
pub fn render_prediction(src_text: &str, tgt_text: &str) -> Result<String, DecodeError> {
    let decoded = recreate_src(src_text)?;
    let mut edit = recreate_diff(tgt_text)?;
    edit.shift_lines(-1);
    let annotations: Vec<Annotation> = decoded
        .annotations
        .iter()
        .map(|a| Annotation {
            line: a.line + 1,
            message: a.message.clone(),
        })
        .collect();
    render_annotated_diff(&decoded.file_context_lines(), &edit, &annotations)
        .map_err(DecodeError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{Deletion, Insertion};

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_annotation_precedes_deleted_line() {
        let edit = EditOperation::Delete(Deletion {
            source_line_start: 2,
            source_line_end: 2,
        });
        let annotations = vec![Annotation {
            line: 2,
            message: "unused".to_string(),
        }];
        let rendered = render_annotated_diff(&lines(&["a", "b", "c"]), &edit, &annotations).unwrap();
        assert_eq!(rendered, "  a\n<<<< DIAGNOSTIC: unused >>>>\n- b\n  c\n");
    }

    #[test]
    fn test_inserted_lines_are_not_counted() {
        let edit = EditOperation::Insert(Insertion {
            previous_source_line: 1,
            target_start_line: 2,
            target_lines: lines(&["new"]),
        });
        let annotations = vec![Annotation {
            line: 2,
            message: "here".to_string(),
        }];
        let rendered = render_annotated_diff(&lines(&["a", "b"]), &edit, &annotations).unwrap();
        assert_eq!(rendered, "  a\n+ new\n<<<< DIAGNOSTIC: here >>>>\n  b\n");
    }

    #[test]
    fn test_render_prediction_shifts_window_lines() {
        let src = "LINE 1 MESSAGE unused FILE_CONTENT a NEWLINE b NEWLINE c NEWLINE\n";
        let tgt = "REMOVE SOURCE_LOCATION_START 1 SOURCE_LOCATION_END 1\n";
        let rendered = render_prediction(src, tgt).unwrap();
        assert_eq!(rendered, "  a\n<<<< DIAGNOSTIC: unused >>>>\n- b\n  c\n");
    }

    #[test]
    fn test_render_prediction_rejects_out_of_range_edit() {
        let src = "FILE_CONTENT a\n";
        let tgt = "REMOVE SOURCE_LOCATION_START 5 SOURCE_LOCATION_END 6\n";
        assert!(matches!(
            render_prediction(src, tgt),
            Err(DecodeError::Apply(_))
        ));
    }
}
