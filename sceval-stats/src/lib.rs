//! Statistical helpers for the sceval crates.
//!
//! - **Descriptive statistics** — [`mean`], [`median`], [`quantile`]
//! - **Diversity** — Shannon entropy of counts and of categorical labels

pub mod descriptive;
pub mod diversity;

pub use descriptive::{mean, median, quantile};
pub use diversity::{label_counts, label_entropy, shannon_index};
