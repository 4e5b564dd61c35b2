//! Wavelet-shrinkage numerics
//!
//! Pure functions over sample slices: decomposition, noise-scale estimation
//! and soft thresholding. No I/O happens here.

mod shrinkage;
mod threshold;
mod wavelet;

pub use shrinkage::{soft_threshold, soft_threshold_in_place};
pub use threshold::{median, robust_scale, universal_threshold};
pub use wavelet::{BoundaryMode, CoefficientSet, Wavelet, WaveletTransform, DECOMPOSITION_LEVEL};

/// Fraction of the total input duration covered by one processing block
pub const BLOCK_FRACTION: f64 = 0.10;
