//! Core serialization logic for neural code-fix training data.
//!
//! Source files are lexed into a lossless token stream, a bounded window of
//! tokens is cut around the lines a diagnostic and its fix touch, line numbers
//! are rebased onto that window, and the result is flattened into the
//! marker-delimited text a sequence-to-sequence model is trained on. The codec
//! also runs in reverse so model output can be decoded and rendered as an
//! annotated diff.

use token::TokenStream;

/// Trait for turning source text into tokens.
///
/// Implementors must be total: every input string yields a stream whose
/// detokenized text equals the input.
pub trait Tokenize {
    fn tokenize(&self, source: &str) -> TokenStream;
}

// Blanket implementation for references to tokenizers
impl<T: Tokenize + ?Sized> Tokenize for &T {
    fn tokenize(&self, source: &str) -> TokenStream {
        (*self).tokenize(source)
    }
}

pub mod codec;
pub mod datapoint;
mod diff;
pub mod edit;
pub mod error;
mod helpers;
pub mod index;
pub mod lexer;
pub mod patch;
pub mod pipeline;
pub mod render;
pub mod token;
pub mod unify;
pub mod window;

pub use codec::{
    flatten_datapoint, prediction_matches, recreate_code, recreate_diff, recreate_src,
    Annotation, DecodedSource,
};
pub use datapoint::{
    Absolute, DiagnosticOccurrence, Rebased, TokenizedDatapoint, TokenizedOccurrence,
    UnifiedDatapoint,
};
pub use diff::{line_diff, DiffLine, DiffTag};
pub use edit::{Deletion, EditOperation, Insertion, Replacement};
pub use error::{ApplyError, DecodeError, PatchError, PipelineError, WindowError};
pub use helpers::{content_hash, normalize_line_endings};
pub use index::VariableIndex;
pub use lexer::{CodeLexer, IdentifierStyle, NaturalLexer};
pub use patch::{parse_hunk, parse_patch_set, FilePatch, Hunk, HunkEdits, HunkLine, LineKind};
pub use pipeline::{
    discover_files, discover_json_files, evaluate_predictions, flatten_dataset,
    output_file_name, process_all_datapoints, process_datapoint, tokenize_datapoint,
    unify_diffs, DatapointOutcome, EvaluationSummary, FlattenSummary, PipelineConfig,
    TokenizationMode, TokenizeSummary, UnifySummary, METADATA_FILE_NAME,
};
pub use render::{render_annotated_diff, render_prediction};
pub use token::{detokenize, LineIndex, Token, TokenKind, NEWLINE, TAB, WHITESPACE};
pub use unify::{
    datapoint_file_name, datapoint_stem, unify_file_patch, DiagnosticRecord, DiffOrigin,
    RepoRecord,
};
pub use window::{select_window, window_start_line, Window};

/// Default number of tokens in a context window.
pub const DEFAULT_CONTEXT_TOKEN_BUDGET: usize = 100;

/// Lines of readable file context kept on each side of a fix during unification.
pub const FILE_CONTEXT_RADIUS: i64 = 3;
