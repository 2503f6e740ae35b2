//! `simprior`: expected-similarity matrix over privileged drone telemetry.
//!
//! Reads a telemetry CSV, builds the N×N similarity matrix (batched tensor
//! path by default, pairwise reference path on request), and writes the
//! matrix CSV.
//!
//! Weight configuration is layered, highest priority first:
//!
//! 1. CLI flags (`--wp`, `--wv`, `--wpos`, `--wrot`)
//! 2. Environment variables (`SIMPRIOR_WP`, ...)
//! 3. TOML config file (`--config weights.toml`)
//! 4. Built-in defaults (0.25, 0.75, 0.6, 0.4)

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;

use simprior_core::{
    load_records, similarity_matrix_batch, similarity_matrix_naive, write_labeled_csv,
    write_plain_csv, SimilarityWeights,
};

/// Divergence beyond this between the two paths is an implementation bug.
const VERIFY_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Batched tensor computation (production path).
    Batch,
    /// Direct pairwise evaluation (reference path).
    Naive,
}

#[derive(Parser, Debug)]
#[command(
    name = "simprior",
    version,
    about = "Expected-similarity matrix over privileged drone telemetry"
)]
struct Args {
    /// Input telemetry CSV (anchor_id, env_name, pos_*, q_*, vel_* columns)
    #[arg(long, env = "SIMPRIOR_INPUT")]
    input: PathBuf,

    /// Output matrix CSV
    #[arg(long, env = "SIMPRIOR_OUTPUT")]
    output: PathBuf,

    /// Which builder to run
    #[arg(long, value_enum, default_value = "batch")]
    mode: Mode,

    /// Write the unlabeled convention (values only, input row order) instead
    /// of anchor-id header and index column
    #[arg(long)]
    plain: bool,

    /// Run both builders and fail if they diverge beyond 1e-9
    #[arg(long)]
    verify: bool,

    /// TOML file with any of: position_sensitivity, velocity_tolerance,
    /// position_weight, rotation_weight
    #[arg(long, env = "SIMPRIOR_CONFIG")]
    config: Option<PathBuf>,

    /// Wp: position-distance sensitivity
    #[arg(long, env = "SIMPRIOR_WP")]
    wp: Option<f64>,

    /// Wv: velocity tolerance
    #[arg(long, env = "SIMPRIOR_WV")]
    wv: Option<f64>,

    /// Wpos: position-channel weight
    #[arg(long, env = "SIMPRIOR_WPOS")]
    wpos: Option<f64>,

    /// Wrot: rotation-channel weight
    #[arg(long, env = "SIMPRIOR_WROT")]
    wrot: Option<f64>,
}

/// Weights config file; every field optional so a file can override just
/// one knob.
#[derive(Debug, Default, Deserialize)]
struct WeightsFile {
    position_sensitivity: Option<f64>,
    velocity_tolerance: Option<f64>,
    position_weight: Option<f64>,
    rotation_weight: Option<f64>,
}

fn resolve_weights(args: &Args) -> Result<SimilarityWeights> {
    let file = match &args.config {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {path:?}"))?;
            toml::from_str::<WeightsFile>(&contents)
                .with_context(|| format!("failed to parse config file {path:?}"))?
        }
        None => WeightsFile::default(),
    };

    let defaults = SimilarityWeights::default();
    Ok(SimilarityWeights {
        position_sensitivity: args
            .wp
            .or(file.position_sensitivity)
            .unwrap_or(defaults.position_sensitivity),
        velocity_tolerance: args
            .wv
            .or(file.velocity_tolerance)
            .unwrap_or(defaults.velocity_tolerance),
        position_weight: args
            .wpos
            .or(file.position_weight)
            .unwrap_or(defaults.position_weight),
        rotation_weight: args
            .wrot
            .or(file.rotation_weight)
            .unwrap_or(defaults.rotation_weight),
    })
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let weights = resolve_weights(&args)?;
    log::info!(
        "weights: Wp={} Wv={} Wpos={} Wrot={}",
        weights.position_sensitivity,
        weights.velocity_tolerance,
        weights.position_weight,
        weights.rotation_weight
    );

    let records = load_records(&args.input)?;
    log::info!(
        "building {0}x{0} similarity matrix ({1:?} mode)",
        records.len(),
        args.mode
    );

    let start = Instant::now();
    let matrix = match args.mode {
        Mode::Batch => similarity_matrix_batch(&records, &weights),
        Mode::Naive => similarity_matrix_naive(&records, &weights),
    };
    log::info!("matrix built in {:.2?}", start.elapsed());

    if args.verify {
        let other = match args.mode {
            Mode::Batch => similarity_matrix_naive(&records, &weights),
            Mode::Naive => similarity_matrix_batch(&records, &weights),
        };
        let diff = matrix
            .max_abs_diff(&other)
            .map_err(anyhow::Error::msg)
            .context("verification failed")?;
        if diff >= VERIFY_TOLERANCE {
            bail!("builders diverge by {diff:e} (tolerance {VERIFY_TOLERANCE:e})");
        }
        log::info!("verification passed: max |naive - batched| = {diff:e}");
    }

    if args.plain {
        write_plain_csv(&args.output, &matrix)?;
    } else {
        write_labeled_csv(&args.output, &matrix)?;
    }
    println!(
        "similarity matrix {}x{} written to {}",
        matrix.n,
        matrix.n,
        args.output.display()
    );
    Ok(())
}
