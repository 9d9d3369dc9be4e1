//! Preprocessor transform contract

use verdict_core::Result;

/// Turns raw input into the feature row a classifier expects
pub trait Preprocessor<I: ?Sized>: Send + Sync {
    /// Transform one input into a dense feature row
    fn transform(&self, input: &I) -> Result<Vec<f64>>;

    /// Width of the rows produced by [`Preprocessor::transform`]
    fn n_features(&self) -> usize;
}
