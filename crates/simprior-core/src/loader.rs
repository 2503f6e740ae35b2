//! Telemetry CSV ingestion.
//!
//! Reads the privileged-data table produced by the capture pipeline into
//! [`StateRecord`]s. Required columns:
//!
//! ```text
//! anchor_id, env_name,
//! pos_x, pos_y, pos_z,
//! q_w, q_x, q_y, q_z,
//! vel_x, vel_y, vel_z
//! ```
//!
//! Extra columns (`ang_vel_*`, `has_collided`, ...) are ignored. The load is
//! all-or-nothing: the first malformed row aborts with a diagnostic naming
//! the row, since a partially ingested batch would silently shrink the
//! matrix. Duplicate anchor ids are rejected for the same reason: matrix
//! rows are keyed by anchor id downstream.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::record::StateRecord;

/// The consumed subset of the telemetry schema. serde skips any extra
/// columns present in the file.
#[derive(Debug, Deserialize)]
struct TelemetryRow {
    anchor_id: String,
    env_name: String,
    pos_x: f64,
    pos_y: f64,
    pos_z: f64,
    q_w: f64,
    q_x: f64,
    q_y: f64,
    q_z: f64,
    vel_x: f64,
    vel_y: f64,
    vel_z: f64,
}

impl From<TelemetryRow> for StateRecord {
    fn from(row: TelemetryRow) -> Self {
        StateRecord {
            anchor_id: row.anchor_id,
            env_name: row.env_name,
            position: [row.pos_x, row.pos_y, row.pos_z],
            orientation: [row.q_w, row.q_x, row.q_y, row.q_z],
            linear_velocity: [row.vel_x, row.vel_y, row.vel_z],
        }
    }
}

/// Read telemetry records from any CSV reader.
///
/// # Errors
///
/// Fails on the first row with a missing or non-numeric required field, and
/// on a duplicate `anchor_id`. Row numbers in diagnostics are 1-based file
/// lines (the header is line 1).
pub fn read_records<R: Read>(reader: R) -> Result<Vec<StateRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (index, row) in csv_reader.deserialize::<TelemetryRow>().enumerate() {
        let line = index + 2;
        let row = row.with_context(|| format!("malformed telemetry record at line {line}"))?;
        if !seen_ids.insert(row.anchor_id.clone()) {
            bail!(
                "duplicate anchor_id {:?} at line {line}; anchor ids must be unique per batch",
                row.anchor_id
            );
        }
        records.push(StateRecord::from(row));
    }
    Ok(records)
}

/// Load telemetry records from a CSV file.
pub fn load_records(path: &Path) -> Result<Vec<StateRecord>> {
    let file =
        File::open(path).with_context(|| format!("failed to open telemetry CSV {path:?}"))?;
    let records =
        read_records(file).with_context(|| format!("while reading telemetry CSV {path:?}"))?;
    log::info!("loaded {} telemetry records from {:?}", records.len(), path);
    Ok(records)
}
