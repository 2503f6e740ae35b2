//! Similarity-matrix serialization.
//!
//! Two delimited-text conventions exist for the matrix file, and both are
//! kept because both have consumers:
//!
//! - **labeled** (default): anchor ids as the header row and as a leading
//!   index column, which is what the contrastive sampler keys on;
//! - **plain**: unlabeled N×N values whose row/column order is the input
//!   record order.
//!
//! Values are written with 4 decimal places in both conventions.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::matrix::SimilarityMatrix;

fn format_cell(v: f64) -> String {
    format!("{v:.4}")
}

/// Write the labeled convention to any writer.
pub fn write_labeled<W: Write>(writer: W, matrix: &SimilarityMatrix) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(matrix.n + 1);
    header.push(String::new());
    header.extend(matrix.labels.iter().cloned());
    out.write_record(&header).context("writing matrix header")?;

    for (i, label) in matrix.labels.iter().enumerate() {
        let mut row = Vec::with_capacity(matrix.n + 1);
        row.push(label.clone());
        row.extend(matrix.row(i).iter().copied().map(format_cell));
        out.write_record(&row)
            .with_context(|| format!("writing matrix row {i}"))?;
    }
    out.flush().context("flushing matrix writer")?;
    Ok(())
}

/// Write the plain convention to any writer.
pub fn write_plain<W: Write>(writer: W, matrix: &SimilarityMatrix) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    for i in 0..matrix.n {
        let row: Vec<String> = matrix.row(i).iter().copied().map(format_cell).collect();
        out.write_record(&row)
            .with_context(|| format!("writing matrix row {i}"))?;
    }
    out.flush().context("flushing matrix writer")?;
    Ok(())
}

/// Write the labeled convention to a file.
pub fn write_labeled_csv(path: &Path, matrix: &SimilarityMatrix) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating matrix CSV {path:?}"))?;
    write_labeled(file, matrix)?;
    log::info!("wrote labeled {}x{} matrix to {:?}", matrix.n, matrix.n, path);
    Ok(())
}

/// Write the plain convention to a file.
pub fn write_plain_csv(path: &Path, matrix: &SimilarityMatrix) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating matrix CSV {path:?}"))?;
    write_plain(file, matrix)?;
    log::info!("wrote plain {}x{} matrix to {:?}", matrix.n, matrix.n, path);
    Ok(())
}
