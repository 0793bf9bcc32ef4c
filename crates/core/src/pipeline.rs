//! Dataset stages: unification, tokenization, flattening and evaluation.
//!
//! Every stage maps independent per-file work over a directory with rayon.
//! Per-file failures are logged and counted, never fatal to the run.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::codec::{flatten_datapoint, prediction_matches};
use crate::datapoint::{Rebased, TokenizedDatapoint, TokenizedOccurrence, UnifiedDatapoint};
use crate::error::{PipelineError, WindowError};
use crate::helpers::{content_hash, normalize_line_endings, source_defect, split_lines};
use crate::index::VariableIndex;
use crate::lexer::{prepare_message, CodeLexer};
use crate::patch::parse_patch_set;
use crate::render::render_prediction;
use crate::token::{token_texts, LineIndex, Token};
use crate::unify::{
    datapoint_file_name, datapoint_stem, unify_file_patch, DiagnosticRecord, DiffOrigin, RepoRecord,
};
use crate::window::{select_window, window_start_line};
use crate::{Tokenize, DEFAULT_CONTEXT_TOKEN_BUDGET};

/// Lexer variant and identifier handling for a tokenization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizationMode {
    #[default]
    Standard,
    Camelcase,
    /// Standard lexing, then identifiers are replaced by `VAR-<n>` aliases.
    ZeroIndexVars,
}

impl TokenizationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenizationMode::Standard => "standard",
            TokenizationMode::Camelcase => "camelcase",
            TokenizationMode::ZeroIndexVars => "zero_index_vars",
        }
    }

    pub fn lexer(self) -> CodeLexer {
        match self {
            TokenizationMode::Camelcase => CodeLexer::camel_case(),
            TokenizationMode::Standard | TokenizationMode::ZeroIndexVars => CodeLexer::standard(),
        }
    }

    fn indexes_identifiers(self) -> bool {
        self == TokenizationMode::ZeroIndexVars
    }
}

/// Configuration for the tokenization pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub context_token_budget: usize,
    pub tokenization_mode: TokenizationMode,
    /// Directory holding one checkout per repository.
    pub repos_root: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            context_token_budget: DEFAULT_CONTEXT_TOKEN_BUDGET,
            tokenization_mode: TokenizationMode::Standard,
            repos_root: PathBuf::from("."),
        }
    }
}

/// What happened to one input datapoint.
#[derive(Debug)]
pub enum DatapointOutcome {
    Written(PathBuf),
    /// Output with the same content hash already existed before the run.
    Duplicate,
    Failed(PipelineError),
}

/// Counts for one tokenization run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TokenizeSummary {
    pub total: usize,
    pub written: usize,
    pub duplicates: usize,
    pub malformed: usize,
    pub context_overflow: usize,
    pub lexer_faults: usize,
    pub other_failures: usize,
}

impl TokenizeSummary {
    fn from_outcomes(outcomes: &[DatapointOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome {
                DatapointOutcome::Written(_) => summary.written += 1,
                DatapointOutcome::Duplicate => summary.duplicates += 1,
                DatapointOutcome::Failed(PipelineError::MalformedSourceFile { .. }) => {
                    summary.malformed += 1
                }
                DatapointOutcome::Failed(PipelineError::Window(WindowError::ContextOverflow {
                    ..
                })) => summary.context_overflow += 1,
                DatapointOutcome::Failed(
                    PipelineError::LineCountMismatch { .. } | PipelineError::TokenizationFault(_),
                ) => summary.lexer_faults += 1,
                DatapointOutcome::Failed(_) => summary.other_failures += 1,
            }
        }
        summary
    }
}

/// Counts for one unification run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct UnifySummary {
    pub diff_files: usize,
    pub patched_files: usize,
    pub datapoints: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

impl UnifySummary {
    fn merge(mut self, other: Self) -> Self {
        self.diff_files += other.diff_files;
        self.patched_files += other.patched_files;
        self.datapoints += other.datapoints;
        self.duplicates += other.duplicates;
        self.skipped += other.skipped;
        self
    }
}

/// Counts for one flattening run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FlattenSummary {
    pub total: usize,
    pub written: usize,
    pub bad_newlines: usize,
    pub unreadable: usize,
}

/// Counts for one evaluation run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationSummary {
    pub total: usize,
    pub correct: usize,
    pub undecodable: usize,
}

impl EvaluationSummary {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Discover all files with the given extension under a directory, sorted.
pub fn discover_files(root: &Path, extension: &str) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == extension))
        .map(|e| e.path().to_path_buf())
        .collect();
    paths.sort();
    paths
}

/// Run description each stage writes next to its outputs.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Discover all JSON datapoint files in a directory, leaving out the
/// previous stage's [`METADATA_FILE_NAME`].
pub fn discover_json_files(root: &Path) -> Vec<PathBuf> {
    let mut paths = discover_files(root, "json");
    paths.retain(|path| !path.file_name().is_some_and(|name| name == METADATA_FILE_NAME));
    paths
}

fn read_text(path: &Path) -> Result<String, PipelineError> {
    fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    serde_json::from_str(&read_text(path)?).map_err(|e| PipelineError::json(path, e))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| PipelineError::json(path, e))?;
    fs::write(path, json).map_err(|e| PipelineError::io(path, e))
}

/// Names of the files already present in `dir` (empty if it does not exist).
fn existing_file_names(dir: &Path) -> HashSet<String> {
    fs::read_dir(dir)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect()
}

fn malformed(path: &Path, reason: impl Into<String>) -> PipelineError {
    PipelineError::MalformedSourceFile {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Unification
// ---------------------------------------------------------------------------

/// Inputs shared by every diff file of one unification run.
struct UnifyRun<'a> {
    diagnostics: &'a [DiagnosticRecord],
    repo_urls: &'a HashMap<String, String>,
    repos_root: &'a Path,
    output_dir: &'a Path,
    existing_stems: &'a HashSet<String>,
}

fn unify_diff_file(diff_path: &Path, run: &UnifyRun<'_>) -> Result<UnifySummary, PipelineError> {
    let mut summary = UnifySummary {
        diff_files: 1,
        ..UnifySummary::default()
    };
    let stem = diff_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let Some(mut origin) = DiffOrigin::from_stem(stem) else {
        warn!(path = %diff_path.display(), "diff file name does not name its origin");
        summary.skipped += 1;
        return Ok(summary);
    };
    origin.repo_url = run.repo_urls.get(&origin.repo).cloned();
    let patches = parse_patch_set(&read_text(diff_path)?)?;

    for patch in patches.iter().filter(|p| !p.is_added_file() && !p.is_removed_file()) {
        summary.patched_files += 1;
        if run.existing_stems.contains(&datapoint_stem(stem, patch.path())) {
            debug!(path = patch.path(), "already unified");
            summary.duplicates += 1;
            continue;
        }
        let source_path = run.repos_root.join(&origin.repo).join(patch.path());
        let source = match fs::read_to_string(&source_path) {
            Ok(source) => normalize_line_endings(&source),
            Err(err) => {
                warn!(path = %source_path.display(), %err, "cannot read patched file");
                summary.skipped += 1;
                continue;
            }
        };
        for (n, datapoint) in unify_file_patch(&origin, patch, run.diagnostics, &source)
            .iter()
            .enumerate()
        {
            write_json(
                &run.output_dir.join(datapoint_file_name(stem, patch.path(), n)),
                datapoint,
            )?;
            summary.datapoints += 1;
        }
    }
    Ok(summary)
}

/// Unify every `*.diff` under `diffs_dir` with the diagnostics they fixed.
///
/// `diagnostics_path` is a JSON array of [`DiagnosticRecord`]s and
/// `repos_listing`, when given, a JSON array of [`RepoRecord`]s used to fill in
/// repository and file URLs. Patched files whose datapoints already exist in
/// `output_dir` are skipped.
pub fn unify_diffs(
    diffs_dir: &Path,
    diagnostics_path: &Path,
    repos_listing: Option<&Path>,
    repos_root: &Path,
    output_dir: &Path,
) -> Result<UnifySummary, PipelineError> {
    let diagnostics: Vec<DiagnosticRecord> = read_json(diagnostics_path)?;
    let repo_urls: HashMap<String, String> = match repos_listing {
        Some(path) => read_json::<Vec<RepoRecord>>(path)?
            .into_iter()
            .map(|record| (record.repo_name, record.repo_url))
            .collect(),
        None => HashMap::new(),
    };
    let diff_files = discover_files(diffs_dir, "diff");
    if diff_files.is_empty() {
        return Err(PipelineError::NoInputs {
            path: diffs_dir.to_path_buf(),
            extension: "diff",
        });
    }
    fs::create_dir_all(output_dir).map_err(|e| PipelineError::io(output_dir, e))?;
    let existing_stems: HashSet<String> = existing_file_names(output_dir)
        .into_iter()
        .filter_map(|name| name.split('-').next().map(str::to_string))
        .collect();

    let run = UnifyRun {
        diagnostics: &diagnostics,
        repo_urls: &repo_urls,
        repos_root,
        output_dir,
        existing_stems: &existing_stems,
    };

    let summary = diff_files
        .par_iter()
        .map(|diff_path| {
            unify_diff_file(diff_path, &run).unwrap_or_else(|err| {
                warn!(path = %diff_path.display(), %err, "skipping diff file");
                UnifySummary {
                    diff_files: 1,
                    skipped: 1,
                    ..UnifySummary::default()
                }
            })
        })
        .reduce(UnifySummary::default, UnifySummary::merge);

    info!(
        diff_files = summary.diff_files,
        datapoints = summary.datapoints,
        duplicates = summary.duplicates,
        skipped = summary.skipped,
        "unification finished"
    );
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Tokenization
// ---------------------------------------------------------------------------

fn check_tokens(tokens: &[Token], expected_newlines: usize) -> Result<(), PipelineError> {
    if let Some(bad) = tokens.iter().find(|t| t.text.contains('\n')) {
        return Err(PipelineError::TokenizationFault(bad.text.clone()));
    }
    let newlines = tokens.iter().filter(|t| t.is_newline()).count();
    if newlines != expected_newlines {
        return Err(PipelineError::LineCountMismatch {
            newlines,
            expected: expected_newlines,
        });
    }
    Ok(())
}

fn line_to_index(line: i64) -> Result<usize, PipelineError> {
    usize::try_from(line).map_err(|_| PipelineError::LineOutOfRange { line })
}

/// Tokens covering the 0-based lines `first..=last`.
fn line_tokens(
    tokens: &[Token],
    lines: &LineIndex,
    first: i64,
    last: i64,
) -> Result<Vec<Token>, PipelineError> {
    let (start, end) = lines
        .token_range(line_to_index(first)?, line_to_index(last)?)
        .ok_or(PipelineError::LineOutOfRange { line: last + 1 })?;
    Ok(tokens[start..=end].to_vec())
}

/// Tokenize, window and rebase one datapoint against its source file text.
///
/// `source` must already have normalised line endings.
pub fn tokenize_datapoint(
    unified: UnifiedDatapoint,
    source: &str,
    config: &PipelineConfig,
) -> Result<TokenizedDatapoint<Rebased>, PipelineError> {
    let mode = config.tokenization_mode;
    let lexer = mode.lexer();
    let mut index = mode.indexes_identifiers().then(VariableIndex::new);

    let tokens = lexer.tokenize(source);
    check_tokens(&tokens, source.matches('\n').count())?;

    let lines = LineIndex::new(&tokens);
    let (required_start, required_end) = lines
        .token_range(
            line_to_index(unified.required_lines_start - 1)?,
            line_to_index(unified.required_lines_end - 1)?,
        )
        .ok_or(PipelineError::LineOutOfRange {
            line: unified.required_lines_end,
        })?;
    let window = select_window(&tokens, required_start, required_end, config.context_token_budget)?;
    let start_line = window_start_line(&tokens, window.start);

    let mut context = window.tokens.to_vec();
    if let Some(index) = index.as_mut() {
        index.apply(&mut context);
    }

    let mut target = Vec::new();
    if let Some((first, last)) = unified.parsed_diff.required_target_lines() {
        let edited = unified
            .parsed_diff
            .apply_to_lines(&split_lines(source))?
            .join("\n");
        let edited_tokens = lexer.tokenize(&edited);
        check_tokens(&edited_tokens, edited.matches('\n').count())?;
        target = line_tokens(&edited_tokens, &LineIndex::new(&edited_tokens), first, last)?;
        if let Some(index) = index.as_mut() {
            index.apply(&mut target);
        }
    }

    let occurrences = unified
        .diagnostic_occurrences
        .iter()
        .cloned()
        .map(|occurrence| {
            let mut message = lexer.natural().tokenize(&prepare_message(&occurrence.message));
            if let Some(index) = index.as_mut() {
                index.apply(&mut message);
            }
            TokenizedOccurrence::new(occurrence, token_texts(&message))
        })
        .collect();

    let datapoint = TokenizedDatapoint::new(
        unified,
        token_texts(&context),
        token_texts(&target),
        occurrences,
    );
    Ok(datapoint.rebase(start_line))
}

fn read_unified(path: &Path) -> Result<(String, UnifiedDatapoint), PipelineError> {
    let text = read_text(path)?;
    if !text.is_ascii() {
        return Err(malformed(path, "non-ASCII datapoint"));
    }
    let unified = serde_json::from_str(&text).map_err(|e| PipelineError::json(path, e))?;
    Ok((text, unified))
}

fn read_source(unified: &UnifiedDatapoint, config: &PipelineConfig) -> Result<String, PipelineError> {
    let path = config.repos_root.join(&unified.repo).join(&unified.file_path);
    let bytes = fs::read(&path).map_err(|e| PipelineError::io(&path, e))?;
    let text = String::from_utf8(bytes).map_err(|_| malformed(&path, "not UTF-8"))?;
    let text = normalize_line_endings(&text);
    match source_defect(&text) {
        Some(reason) => Err(malformed(&path, reason)),
        None => Ok(text),
    }
}

/// Read one unified datapoint and its source file and tokenize it.
pub fn process_datapoint(
    path: &Path,
    config: &PipelineConfig,
) -> Result<TokenizedDatapoint<Rebased>, PipelineError> {
    let (_, unified) = read_unified(path)?;
    let source = read_source(&unified, config)?;
    tokenize_datapoint(unified, &source, config)
}

/// Output file name for a datapoint: a hash of its input and the run settings.
pub fn output_file_name(input: &str, config: &PipelineConfig) -> String {
    let budget = config.context_token_budget.to_string();
    let hash = content_hash([input, budget.as_str(), config.tokenization_mode.as_str()]);
    format!("{hash:016x}.json")
}

fn try_run_datapoint(
    path: &Path,
    config: &PipelineConfig,
    output_dir: &Path,
    existing: &HashSet<String>,
) -> Result<DatapointOutcome, PipelineError> {
    let (text, unified) = read_unified(path)?;
    let name = output_file_name(&text, config);
    if existing.contains(&name) {
        return Ok(DatapointOutcome::Duplicate);
    }
    let source = read_source(&unified, config)?;
    let tokenized = tokenize_datapoint(unified, &source, config)?;
    let output = output_dir.join(name);
    write_json(&output, &tokenized)?;
    Ok(DatapointOutcome::Written(output))
}

fn run_datapoint(
    path: &Path,
    config: &PipelineConfig,
    output_dir: &Path,
    existing: &HashSet<String>,
) -> DatapointOutcome {
    let outcome = try_run_datapoint(path, config, output_dir, existing)
        .unwrap_or_else(DatapointOutcome::Failed);
    let file = path.display();
    match &outcome {
        DatapointOutcome::Written(output) => {
            debug!(%file, output = %output.display(), "tokenized datapoint")
        }
        DatapointOutcome::Duplicate => debug!(%file, "already tokenized"),
        DatapointOutcome::Failed(
            err @ (PipelineError::LineCountMismatch { .. } | PipelineError::TokenizationFault(_)),
        ) => error!(%file, %err, "lexer fault"),
        DatapointOutcome::Failed(err @ PipelineError::Window(WindowError::ContextOverflow { .. })) => {
            info!(%file, %err, "dropping datapoint")
        }
        DatapointOutcome::Failed(err) => warn!(%file, %err, "skipping datapoint"),
    }
    outcome
}

/// Tokenize every unified datapoint under `input_dir` in parallel.
///
/// The output directory listing is read once up front; inputs whose output
/// name is already present are skipped as duplicates.
pub fn process_all_datapoints(
    input_dir: &Path,
    output_dir: &Path,
    config: &PipelineConfig,
) -> Result<TokenizeSummary, PipelineError> {
    let inputs = discover_json_files(input_dir);
    if inputs.is_empty() {
        return Err(PipelineError::NoInputs {
            path: input_dir.to_path_buf(),
            extension: "json",
        });
    }
    fs::create_dir_all(output_dir).map_err(|e| PipelineError::io(output_dir, e))?;
    let existing = existing_file_names(output_dir);
    info!(inputs = inputs.len(), existing = existing.len(), "tokenizing datapoints");

    let outcomes: Vec<DatapointOutcome> = inputs
        .par_iter()
        .map(|path| run_datapoint(path, config, output_dir, &existing))
        .collect();

    let summary = TokenizeSummary::from_outcomes(&outcomes);
    info!(
        written = summary.written,
        duplicates = summary.duplicates,
        malformed = summary.malformed,
        context_overflow = summary.context_overflow,
        lexer_faults = summary.lexer_faults,
        "tokenization finished"
    );
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Flattening
// ---------------------------------------------------------------------------

/// Name of the model input file written by [`flatten_dataset`].
pub const SOURCE_FILE_NAME: &str = "src.txt";
/// Name of the model target file written by [`flatten_dataset`].
pub const TARGET_FILE_NAME: &str = "tgt.txt";

/// Flatten every tokenized datapoint under `input_dir` into line-aligned
/// `src.txt` / `tgt.txt` files in `output_dir`.
pub fn flatten_dataset(input_dir: &Path, output_dir: &Path) -> Result<FlattenSummary, PipelineError> {
    let inputs = discover_json_files(input_dir);
    if inputs.is_empty() {
        return Err(PipelineError::NoInputs {
            path: input_dir.to_path_buf(),
            extension: "json",
        });
    }
    fs::create_dir_all(output_dir).map_err(|e| PipelineError::io(output_dir, e))?;

    let pairs: Vec<Option<(String, String)>> = inputs
        .par_iter()
        .map(|path| {
            let datapoint: TokenizedDatapoint<Rebased> = read_text(path)
                .and_then(|text| {
                    serde_json::from_str(&text).map_err(|e| PipelineError::json(path, e))
                })
                .map_err(|err| warn!(path = %path.display(), %err, "unreadable datapoint"))
                .ok()?;
            Some(flatten_datapoint(&datapoint))
        })
        .collect();

    let src_path = output_dir.join(SOURCE_FILE_NAME);
    let tgt_path = output_dir.join(TARGET_FILE_NAME);
    let mut src_file = BufWriter::new(File::create(&src_path).map_err(|e| PipelineError::io(&src_path, e))?);
    let mut tgt_file = BufWriter::new(File::create(&tgt_path).map_err(|e| PipelineError::io(&tgt_path, e))?);

    let mut summary = FlattenSummary {
        total: inputs.len(),
        ..FlattenSummary::default()
    };
    for (path, pair) in inputs.iter().zip(pairs) {
        let Some((src, tgt)) = pair else {
            summary.unreadable += 1;
            continue;
        };
        if src.matches('\n').count() > 1 || tgt.matches('\n').count() > 1 {
            warn!(path = %path.display(), "flattened datapoint spans several lines");
            summary.bad_newlines += 1;
            continue;
        }
        src_file
            .write_all(src.as_bytes())
            .map_err(|e| PipelineError::io(&src_path, e))?;
        tgt_file
            .write_all(tgt.as_bytes())
            .map_err(|e| PipelineError::io(&tgt_path, e))?;
        summary.written += 1;
    }
    src_file.flush().map_err(|e| PipelineError::io(&src_path, e))?;
    tgt_file.flush().map_err(|e| PipelineError::io(&tgt_path, e))?;

    info!(
        written = summary.written,
        bad_newlines = summary.bad_newlines,
        unreadable = summary.unreadable,
        "flattening finished"
    );
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

fn render_or_note(src: &str, tgt: &str) -> String {
    render_prediction(src, tgt).unwrap_or_else(|err| format!("<<<< UNDECODABLE: {err} >>>>\n"))
}

/// Compare model predictions with the expected targets, line by line, and
/// write one annotated diff per datapoint into `output_dir`.
pub fn evaluate_predictions(
    src_path: &Path,
    expected_path: &Path,
    predictions_path: &Path,
    output_dir: &Path,
) -> Result<EvaluationSummary, PipelineError> {
    let sources = read_text(src_path)?;
    let expected = read_text(expected_path)?;
    let predictions = read_text(predictions_path)?;
    let (sources, expected, predictions): (Vec<&str>, Vec<&str>, Vec<&str>) = (
        sources.lines().collect(),
        expected.lines().collect(),
        predictions.lines().collect(),
    );
    if sources.len() != expected.len() || expected.len() != predictions.len() {
        warn!(
            sources = sources.len(),
            expected = expected.len(),
            predictions = predictions.len(),
            "line counts differ, evaluating the common prefix"
        );
    }
    fs::create_dir_all(output_dir).map_err(|e| PipelineError::io(output_dir, e))?;

    let mut summary = EvaluationSummary::default();
    for (n, ((src, tgt), predicted)) in sources.iter().zip(&expected).zip(&predictions).enumerate() {
        summary.total += 1;
        if prediction_matches(tgt, predicted) {
            summary.correct += 1;
        }
        let rendered_prediction = match render_prediction(src, predicted) {
            Ok(rendered) => rendered,
            Err(err) => {
                summary.undecodable += 1;
                format!("<<<< UNDECODABLE: {err} >>>>\n")
            }
        };
        let report = format!(
            "### expected\n{}### predicted\n{rendered_prediction}",
            render_or_note(src, tgt)
        );
        let path = output_dir.join(format!("{n:06}.diff"));
        fs::write(&path, report).map_err(|e| PipelineError::io(&path, e))?;
    }

    info!(
        total = summary.total,
        correct = summary.correct,
        undecodable = summary.undecodable,
        "evaluation finished"
    );
    Ok(summary)
}
