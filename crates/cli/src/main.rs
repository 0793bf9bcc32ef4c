//! CLI tool for turning diagnostic fixes into seq2seq training pairs.
//!
//! Each pipeline stage is a subcommand. Stages read the previous stage's
//! output directory and write a `metadata.json` describing the run next to
//! their own outputs.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use neural_fix_serializer_core::{
    evaluate_predictions, flatten_dataset, process_all_datapoints, unify_diffs, PipelineConfig,
    TokenizationMode, DEFAULT_CONTEXT_TOKEN_BUDGET, METADATA_FILE_NAME,
};

/// Serialize static-analysis fixes into model training data.
#[derive(Parser, Debug)]
#[command(name = "neural-fix-serialize")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Match fix diffs with the diagnostics they resolved
    Unify {
        /// Directory of `REPO__SOLUTION__COMMIT__ANALYZER__DIAGNOSTIC.diff` files
        #[arg(long)]
        diffs_dir: PathBuf,

        /// JSON array of diagnostic records
        #[arg(long)]
        diagnostics: PathBuf,

        /// JSON array of `{RepoName, RepoURL}` rows for repository and file URLs
        #[arg(long)]
        repos: Option<PathBuf>,

        /// Directory holding one checkout per repository
        #[arg(long)]
        repos_root: PathBuf,

        /// Output directory for unified datapoints
        #[arg(long)]
        output_dir: PathBuf,
    },

    /// Tokenize and window unified datapoints
    Tokenize {
        /// Directory of unified datapoint JSON files
        #[arg(long)]
        input_dir: PathBuf,

        /// Directory holding one checkout per repository
        #[arg(long)]
        repos_root: PathBuf,

        /// Output directory for tokenized datapoints
        #[arg(long)]
        output_dir: PathBuf,

        /// Maximum tokens of file context per datapoint
        #[arg(long, default_value_t = DEFAULT_CONTEXT_TOKEN_BUDGET)]
        context_token_budget: usize,

        /// Lexer variant and identifier handling
        #[arg(long, value_enum, default_value_t = Mode::Standard)]
        tokenization_mode: Mode,
    },

    /// Flatten tokenized datapoints into src.txt / tgt.txt
    Flatten {
        /// Directory of tokenized datapoint JSON files
        #[arg(long)]
        input_dir: PathBuf,

        /// Output directory for the flattened pair files
        #[arg(long)]
        output_dir: PathBuf,
    },

    /// Score model predictions and render annotated diffs
    Evaluate {
        /// Flattened model inputs, one per line
        #[arg(long)]
        src: PathBuf,

        /// Expected targets, line-aligned with `--src`
        #[arg(long)]
        expected: PathBuf,

        /// Model predictions, line-aligned with `--src`
        #[arg(long)]
        predictions: PathBuf,

        /// Output directory for annotated diffs
        #[arg(long)]
        output_dir: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Standard,
    Camelcase,
    ZeroIndexVars,
}

impl From<Mode> for TokenizationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Standard => TokenizationMode::Standard,
            Mode::Camelcase => TokenizationMode::Camelcase,
            Mode::ZeroIndexVars => TokenizationMode::ZeroIndexVars,
        }
    }
}

fn write_metadata(output_dir: &Path, metadata: &serde_json::Value) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = output_dir.join(METADATA_FILE_NAME);
    std::fs::write(&path, serde_json::to_string_pretty(metadata)?)?;
    Ok(path)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Unify {
            diffs_dir,
            diagnostics,
            repos,
            repos_root,
            output_dir,
        } => {
            info!(diffs_dir = %diffs_dir.display(), "unifying diffs with diagnostics");
            let summary = unify_diffs(
                &diffs_dir,
                &diagnostics,
                repos.as_deref(),
                &repos_root,
                &output_dir,
            )?;
            let metadata_path = write_metadata(
                &output_dir,
                &json!({
                    "config": {
                        "diffs_dir": diffs_dir.to_string_lossy(),
                        "diagnostics": diagnostics.to_string_lossy(),
                        "repos": repos.as_ref().map(|path| path.to_string_lossy()),
                        "repos_root": repos_root.to_string_lossy(),
                        "output_dir": output_dir.to_string_lossy(),
                    },
                    "counts": serde_json::to_value(&summary)?,
                }),
            )?;

            println!("\n[summary]");
            println!("  Diff files: {}", summary.diff_files);
            println!("  Patched files: {}", summary.patched_files);
            println!("  Datapoints written: {}", summary.datapoints);
            println!("  Already unified: {}", summary.duplicates);
            println!("  Skipped: {}", summary.skipped);
            println!("  Metadata: {:?}", metadata_path);
        }

        Command::Tokenize {
            input_dir,
            repos_root,
            output_dir,
            context_token_budget,
            tokenization_mode,
        } => {
            let config = PipelineConfig {
                context_token_budget,
                tokenization_mode: tokenization_mode.into(),
                repos_root,
            };
            info!(input_dir = %input_dir.display(), ?config, "tokenizing datapoints");
            let summary = process_all_datapoints(&input_dir, &output_dir, &config)?;
            let metadata_path = write_metadata(
                &output_dir,
                &json!({
                    "config": {
                        "input_dir": input_dir.to_string_lossy(),
                        "output_dir": output_dir.to_string_lossy(),
                        "repos_root": config.repos_root.to_string_lossy(),
                        "context_token_budget": config.context_token_budget,
                        "tokenization_mode": config.tokenization_mode.as_str(),
                    },
                    "counts": serde_json::to_value(&summary)?,
                }),
            )?;

            println!("\n[summary]");
            println!("  Datapoints: {}", summary.total);
            println!("  Written: {}", summary.written);
            println!("  Duplicates: {}", summary.duplicates);
            println!("  Malformed sources: {}", summary.malformed);
            println!("  Context overflow: {}", summary.context_overflow);
            println!("  Lexer faults: {}", summary.lexer_faults);
            println!("  Other failures: {}", summary.other_failures);
            println!("  Metadata: {:?}", metadata_path);
        }

        Command::Flatten {
            input_dir,
            output_dir,
        } => {
            info!(input_dir = %input_dir.display(), "flattening datapoints");
            let summary = flatten_dataset(&input_dir, &output_dir)?;
            let metadata_path = write_metadata(
                &output_dir,
                &json!({
                    "config": {
                        "input_dir": input_dir.to_string_lossy(),
                        "output_dir": output_dir.to_string_lossy(),
                    },
                    "counts": serde_json::to_value(&summary)?,
                }),
            )?;

            println!("\n[summary]");
            println!("  Datapoints: {}", summary.total);
            println!("  Pairs written: {}", summary.written);
            println!("  Stray newlines: {}", summary.bad_newlines);
            println!("  Unreadable: {}", summary.unreadable);
            println!("  Output: {:?}/{{src,tgt}}.txt", output_dir);
            println!("  Metadata: {:?}", metadata_path);
        }

        Command::Evaluate {
            src,
            expected,
            predictions,
            output_dir,
        } => {
            info!(predictions = %predictions.display(), "evaluating predictions");
            let summary = evaluate_predictions(&src, &expected, &predictions, &output_dir)?;
            let metadata_path = write_metadata(
                &output_dir,
                &json!({
                    "config": {
                        "src": src.to_string_lossy(),
                        "expected": expected.to_string_lossy(),
                        "predictions": predictions.to_string_lossy(),
                        "output_dir": output_dir.to_string_lossy(),
                    },
                    "counts": serde_json::to_value(&summary)?,
                    "stats": {
                        "accuracy": summary.accuracy(),
                    },
                }),
            )?;

            println!("\n[summary]");
            println!("  Predictions: {}", summary.total);
            println!("  Correct: {}", summary.correct);
            println!("  Undecodable: {}", summary.undecodable);
            println!("  Accuracy: {:.4}", summary.accuracy());
            println!("  Metadata: {:?}", metadata_path);
        }
    }

    Ok(())
}
