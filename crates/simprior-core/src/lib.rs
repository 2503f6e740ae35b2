//! # simprior-core
//!
//! Expected-similarity matrices over privileged drone-state telemetry.
//!
//! Simulated flight telemetry gives us ground-truth state (position,
//! orientation, velocity, environment) that a deployed perception system
//! never sees. This crate turns a batch of N such states into an N×N
//! symmetric matrix scoring every pair by "how similar should a learned
//! encoder consider these two states", for use as a sampling prior when
//! picking contrastive positives and negatives.
//!
//! Core types and operations:
//!
//! - [`StateRecord`]: one captured drone state (anchor id, environment,
//!   position, orientation quaternion, linear velocity)
//! - [`SimilarityWeights`]: the four tunable hyperparameters of the score
//! - [`expected_similarity`]: the pairwise metric (identity and
//!   cross-environment short-circuits, then position + rotation channels)
//! - [`similarity_matrix_naive`]: reference builder, one metric call per
//!   unordered pair
//! - [`similarity_matrix_batch`]: batched tensor builder, numerically
//!   equivalent to the reference builder within 1e-9
//! - [`load_records`] / [`write_labeled_csv`] / [`write_plain_csv`]:
//!   telemetry ingestion and matrix export
//!
//! ## Example
//!
//! ```
//! use simprior_core::{
//!     similarity_matrix_batch, similarity_matrix_naive, SimilarityWeights, StateRecord,
//! };
//!
//! let records = vec![
//!     StateRecord::new("0", "forest", [0.0, 0.0, -10.0], [1.0, 0.0, 0.0, 0.0], [0.0; 3]),
//!     StateRecord::new("1", "forest", [3.0, 4.0, -10.0], [1.0, 0.0, 0.0, 0.0], [0.0; 3]),
//! ];
//! let weights = SimilarityWeights::default();
//!
//! let reference = similarity_matrix_naive(&records, &weights);
//! let batched = similarity_matrix_batch(&records, &weights);
//!
//! assert_eq!(reference.get(0, 0), 1.0);
//! assert!(reference.max_abs_diff(&batched).unwrap() < 1e-9);
//! ```

pub mod backend;
pub mod batch;
pub mod config;
pub mod export;
pub mod loader;
pub mod matrix;
pub mod metric;
pub mod record;

pub use batch::similarity_matrix_batch;
pub use config::SimilarityWeights;
pub use export::{write_labeled_csv, write_plain_csv};
pub use loader::{load_records, read_records};
pub use matrix::{similarity_matrix_naive, SimilarityMatrix};
pub use metric::expected_similarity;
pub use record::StateRecord;
