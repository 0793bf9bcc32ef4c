//! Error types for every pipeline stage.

use std::path::PathBuf;

use thiserror::Error;

/// The required token span cannot be windowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("required span of {required} tokens exceeds the budget of {budget}")]
    ContextOverflow { required: usize, budget: usize },
    #[error("required token range {start}..={end} is not inside a stream of {len} tokens")]
    InvalidRequiredRange { start: usize, end: usize, len: usize },
}

/// An edit referenced a line the line list does not have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line} is outside a file of {len} lines")]
pub struct ApplyError {
    pub line: i64,
    pub len: usize,
}

/// Model output (or a stored flattened line) that cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty input")]
    Empty,
    #[error("missing {0} marker")]
    MissingMarker(&'static str),
    #[error("unknown action `{0}`")]
    UnknownAction(String),
    #[error("missing line number after {0}")]
    MissingLineNumber(&'static str),
    #[error("`{0}` is not a line number")]
    InvalidNumber(String),
    #[error("decoded edit does not fit the file context: {0}")]
    Apply(#[from] ApplyError),
}

/// A unified diff that cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("malformed hunk header `{0}`")]
    BadHunkHeader(String),
    #[error("hunk starting at source line {source_start} ends early")]
    TruncatedHunk { source_start: i64 },
    #[error("hunk outside of a file patch")]
    HunkWithoutFile,
}

/// Per-datapoint failure in the tokenization pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("malformed source file {}: {reason}", path.display())]
    MalformedSourceFile { path: PathBuf, reason: String },
    #[error("lexer produced {newlines} NEWLINE tokens for {expected} lines")]
    LineCountMismatch { newlines: usize, expected: usize },
    #[error("lexer emitted token {0:?} containing a raw newline")]
    TokenizationFault(String),
    #[error("line {line} is outside the tokenized file")]
    LineOutOfRange { line: i64 },
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error(transparent)]
    Apply(#[from] ApplyError),
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no {extension} files found under {}", path.display())]
    NoInputs {
        path: PathBuf,
        extension: &'static str,
    },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
