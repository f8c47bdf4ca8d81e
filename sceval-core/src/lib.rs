//! Shared primitives for the sceval single-cell evaluation crates.
//!
//! - **Error types** — [`SceError`] and [`Result`] for structured error handling
//! - **Traits** — [`Summarizable`] for one-line result summaries

pub mod error;
pub mod traits;

pub use error::{SceError, Result};
pub use traits::*;
