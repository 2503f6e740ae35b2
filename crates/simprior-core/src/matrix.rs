//! Dense similarity matrix and the reference (pairwise) builder.
//!
//! [`similarity_matrix_naive`] defines the semantics: one
//! [`expected_similarity`] call per unordered pair, mirrored into both
//! triangles. It is the oracle the batched builder in [`crate::batch`] is
//! tested against, and remains usable directly when N is small.

use std::time::Instant;

use crate::config::SimilarityWeights;
use crate::metric::expected_similarity;
use crate::record::StateRecord;

/// Dense N×N expected-similarity matrix, row-major, labeled by anchor id.
///
/// Row/column order matches the input record order; `labels[i]` is the
/// `anchor_id` of record i. Entries lie in `[0, 1]` for finite inputs and
/// weight sums ≤ 1; the diagonal is exactly 1.0 and cross-environment
/// entries are exactly 0.0.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    /// Anchor id of each row/column, in input order.
    pub labels: Vec<String>,
    /// Row-major values, length `n * n`.
    pub data: Vec<f64>,
    /// Number of rows (and columns).
    pub n: usize,
}

impl SimilarityMatrix {
    /// Build from row-major values. Errors if the shape is inconsistent.
    pub fn from_row_major(labels: Vec<String>, data: Vec<f64>) -> Result<Self, String> {
        let n = labels.len();
        if data.len() != n * n {
            return Err(format!(
                "matrix data has {} entries, expected {} for {} labels",
                data.len(),
                n * n,
                n
            ));
        }
        Ok(SimilarityMatrix { labels, data, n })
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Largest absolute entrywise difference against another matrix.
    ///
    /// Errors if the two matrices have different shapes; the builders are
    /// required to agree on shape, so a mismatch is an implementation bug
    /// and callers should treat it as fatal.
    pub fn max_abs_diff(&self, other: &SimilarityMatrix) -> Result<f64, String> {
        if self.n != other.n {
            return Err(format!(
                "matrix dimension mismatch: {}x{} vs {}x{}",
                self.n, self.n, other.n, other.n
            ));
        }
        let mut max = 0.0f64;
        for (a, b) in self.data.iter().zip(other.data.iter()) {
            let d = (a - b).abs();
            if d > max {
                max = d;
            }
        }
        Ok(max)
    }
}

/// Build the full similarity matrix by direct pairwise evaluation.
///
/// The metric runs once per unordered pair `i < j` and the value is written
/// to both `M[i][j]` and `M[j][i]`, so symmetry is exact by construction
/// even where the formula's float evaluation would not associate. The
/// diagonal is written as 1.0 directly; with unique anchor ids the metric
/// would return the same via its identity rule.
///
/// O(N²) metric evaluations. Progress is logged every 100 rows.
pub fn similarity_matrix_naive(
    records: &[StateRecord],
    weights: &SimilarityWeights,
) -> SimilarityMatrix {
    let n = records.len();
    let labels: Vec<String> = records.iter().map(|r| r.anchor_id.clone()).collect();
    let mut data = vec![0.0f64; n * n];

    let start = Instant::now();
    for i in 0..n {
        data[i * n + i] = 1.0;
        for j in (i + 1)..n {
            let s = expected_similarity(&records[i], &records[j], weights);
            data[i * n + j] = s;
            data[j * n + i] = s;
        }
        if (i + 1) % 100 == 0 {
            log::info!("similarity rows {}/{} done", i + 1, n);
        }
    }
    log::debug!(
        "naive similarity matrix {}x{} built in {:.2?}",
        n,
        n,
        start.elapsed()
    );

    SimilarityMatrix { labels, data, n }
}
