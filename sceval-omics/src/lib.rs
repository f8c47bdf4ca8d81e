//! Single-cell benchmarking helpers built on the sceval primitives.
//!
//! - **Corruption** — [`corrupt`] injects Uniform (dropout) or Binomial
//!   (thinning) noise into a count matrix and records the [`CorruptionSites`]
//! - **Imputation scoring** — [`imputation_error`], the median L1 distance at
//!   the corrupted entries
//! - **Batch mixing** — [`batch_entropy`] and [`batch_mixing_score`] over a
//!   latent embedding
//!
//! # Quick start
//!
//! ```
//! use ndarray::Array2;
//! use sceval_omics::{corrupt, imputation_error, CorruptionConfig, CorruptionMethod};
//!
//! let counts = Array2::<f64>::ones((100, 50));
//! let config = CorruptionConfig {
//!     method: CorruptionMethod::Binomial,
//!     p: 0.2,
//!     seed: Some(7),
//!     ..Default::default()
//! };
//! let out = corrupt(counts.view(), &config).unwrap();
//! assert_eq!(out.sites.len(), 500);
//!
//! let err = imputation_error(counts.view(), counts.view(), &out.sites).unwrap();
//! assert_eq!(err, 0.0);
//! ```

pub mod corrupt;
pub mod imputation;
pub mod mixing;

pub use corrupt::{
    corrupt, corrupt_with_rng, Corrupted, CorruptionConfig, CorruptionMethod, CorruptionSites,
};
pub use imputation::imputation_error;
pub use mixing::{batch_entropy, batch_mixing_score, batch_mixing_score_with_rng, BatchMixingConfig};
