//! Noise scale estimation and the universal (VisuShrink) threshold

use num_traits::Float;

/// Median of a slice, averaging the two middle values for even lengths.
///
/// Sorts `data` in place. Returns zero for an empty slice.
pub fn median<T: Float>(data: &mut [T]) -> T {
    if data.is_empty() {
        return T::zero();
    }
    data.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = data.len() / 2;
    if data.len() % 2 == 0 {
        (data[mid - 1] + data[mid]) / (T::one() + T::one())
    } else {
        data[mid]
    }
}

/// Robust noise scale: median absolute deviation `median(|x - median(x)|)`.
///
/// Non-finite entries are treated as masked and ignored. Fewer than two
/// valid values yield zero.
pub fn robust_scale<T: Float>(values: &[T]) -> T {
    let mut valid: Vec<T> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if valid.len() < 2 {
        return T::zero();
    }

    let center = median(&mut valid);
    let mut deviations: Vec<T> = valid.iter().map(|&v| (v - center).abs()).collect();
    median(&mut deviations)
}

/// Universal threshold `sigma * sqrt(2 * ln(len))`.
///
/// Blocks of length 0 or 1 get a zero threshold (pass-through).
pub fn universal_threshold<T: Float>(sigma: T, len: usize) -> T {
    if len <= 1 {
        return T::zero();
    }
    let two = T::one() + T::one();
    let n = T::from(len).unwrap_or_else(T::max_value);
    sigma * (two * n.ln()).sqrt()
}
