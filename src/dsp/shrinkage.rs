//! Soft-threshold shrinkage of wavelet coefficients

use num_traits::Float;

use crate::error::{DenoiseError, Result};

fn check_threshold<T: Float>(thresh: T) -> Result<()> {
    if thresh.is_nan() || thresh < T::zero() {
        return Err(DenoiseError::InvalidParameter {
            param: "threshold".to_string(),
            value: thresh.to_f64().map_or_else(|| "NaN".to_string(), |v| v.to_string()),
            expected: "a non-negative number".to_string(),
        });
    }
    Ok(())
}

#[inline]
fn shrink<T: Float>(x: T, thresh: T) -> T {
    let magnitude = (x.abs() - thresh).max(T::zero());
    if magnitude == T::zero() {
        T::zero()
    } else {
        x.signum() * magnitude
    }
}

/// Shrink every value toward zero by `thresh`, clamping at zero:
/// `sign(x) * max(|x| - thresh, 0)`.
///
/// A zero threshold leaves the values untouched.
///
/// # Errors
/// * `InvalidParameter` - If `thresh` is negative or NaN
pub fn soft_threshold_in_place<T: Float>(values: &mut [T], thresh: T) -> Result<()> {
    check_threshold(thresh)?;
    if thresh == T::zero() {
        return Ok(());
    }
    for v in values.iter_mut() {
        *v = shrink(*v, thresh);
    }
    Ok(())
}

/// Non-mutating variant of [`soft_threshold_in_place`]
pub fn soft_threshold<T: Float>(values: &[T], thresh: T) -> Result<Vec<T>> {
    let mut out = values.to_vec();
    soft_threshold_in_place(&mut out, thresh)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_soft_threshold_known_array() {
        let shrunk = soft_threshold(&[-5.0, -2.0, 0.0, 2.0, 5.0], 2.0).unwrap();
        assert_eq!(shrunk, vec![-3.0, 0.0, 0.0, 0.0, 3.0]);
    }

    #[test]
    fn test_zero_threshold_is_noop() {
        let values = [-0.5_f32, 0.25, 1e-9, -7.0];
        assert_eq!(soft_threshold(&values, 0.0).unwrap(), values.to_vec());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let err = soft_threshold(&[1.0_f64], -0.1).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
    }

    #[test]
    fn test_nan_threshold_rejected() {
        assert!(soft_threshold(&[1.0_f64], f64::NAN).is_err());
    }

    #[test]
    fn test_in_place_preserves_sign_and_damps() {
        let mut values = vec![10.0, -10.0, 0.5, -0.5];
        soft_threshold_in_place(&mut values, 1.0).unwrap();
        assert_eq!(values, vec![9.0, -9.0, 0.0, 0.0]);
    }
}
