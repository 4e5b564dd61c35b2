//! Multi-level discrete wavelet transform
//!
//! Forward and inverse decomposition with periodic boundary extension.
//! The analysis step convolves with the low-pass `h` and high-pass `g`
//! decomposition filters and decimates by 2:
//!
//! ```text
//!   a[k] = sum_{j=0}^{L-1} h[j] * x[(2k - j) mod N]
//!   d[k] = sum_{j=0}^{L-1} g[j] * x[(2k - j) mod N]
//! ```
//!
//! Synthesis is the exact transpose, so `inverse(forward(x)) == x` up to
//! floating-point rounding for any input length (odd lengths are extended by
//! repeating the final sample and truncated back on reconstruction).

/// Decomposition depth used by the denoiser
pub const DECOMPOSITION_LEVEL: usize = 2;

/// Wavelet family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wavelet {
    /// Daubechies wavelet with 4 vanishing moments (8 taps, "db4")
    #[default]
    Daubechies4,
}

impl Wavelet {
    /// Short name of the wavelet
    pub fn name(&self) -> &'static str {
        match self {
            Wavelet::Daubechies4 => "db4",
        }
    }

    /// Low-pass (scaling) decomposition filter
    pub fn scaling_filter(&self) -> &'static [f64] {
        match self {
            Wavelet::Daubechies4 => &DB4_LOW_PASS,
        }
    }

    /// High-pass (wavelet) decomposition filter via the alternating flip
    /// `g[n] = (-1)^n * h[L-1-n]`.
    pub fn wavelet_filter(&self) -> Vec<f64> {
        let lo = self.scaling_filter();
        let l = lo.len();
        (0..l)
            .map(|n| {
                let sign = if n % 2 == 0 { 1.0 } else { -1.0 };
                sign * lo[l - 1 - n]
            })
            .collect()
    }
}

const DB4_LOW_PASS: [f64; 8] = [
    -0.010597401784997278,
    0.032883011666982945,
    0.030841381835986965,
    -0.187034811718881060,
    -0.027983769416983849,
    0.630880767929590380,
    0.714846570552541600,
    0.230377813308855140,
];

/// Signal extension mode at the block edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryMode {
    /// The block is treated as one period of a circular signal
    #[default]
    Periodic,
}

impl BoundaryMode {
    pub fn name(&self) -> &'static str {
        match self {
            BoundaryMode::Periodic => "periodic",
        }
    }
}

/// Coefficients of one forward transform
///
/// Band 0 is the coarsest approximation, bands `1..=level` are detail
/// coefficients from coarsest to finest.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSet {
    bands: Vec<Vec<f64>>,
    /// Input length at each level, finest level first
    level_lengths: Vec<usize>,
}

impl CoefficientSet {
    /// Number of coefficient bands (`level + 1`)
    pub fn num_bands(&self) -> usize {
        self.bands.len()
    }

    /// Decomposition depth
    pub fn level(&self) -> usize {
        self.bands.len() - 1
    }

    /// Coefficients of band `index`
    pub fn band(&self, index: usize) -> &[f64] {
        &self.bands[index]
    }

    pub fn approximation(&self) -> &[f64] {
        &self.bands[0]
    }

    /// Detail coefficients of the finest scale
    pub fn finest_detail(&self) -> &[f64] {
        &self.bands[self.bands.len() - 1]
    }

    /// Mutable access to every detail band; the approximation stays untouched.
    pub fn details_mut(&mut self) -> impl Iterator<Item = &mut [f64]> {
        self.bands.iter_mut().skip(1).map(|band| band.as_mut_slice())
    }

    /// Length of the signal this set was computed from
    pub fn signal_len(&self) -> usize {
        self.level_lengths.first().copied().unwrap_or(0)
    }
}

/// Fixed-basis, fixed-depth wavelet transform
#[derive(Debug, Clone)]
pub struct WaveletTransform {
    wavelet: Wavelet,
    mode: BoundaryMode,
    level: usize,
    h: &'static [f64],
    g: Vec<f64>,
}

impl Default for WaveletTransform {
    fn default() -> Self {
        Self::new(Wavelet::default(), BoundaryMode::default(), DECOMPOSITION_LEVEL)
    }
}

impl WaveletTransform {
    /// Create a transform for the given basis, boundary mode and depth
    pub fn new(wavelet: Wavelet, mode: BoundaryMode, level: usize) -> Self {
        Self {
            wavelet,
            mode,
            level,
            h: wavelet.scaling_filter(),
            g: wavelet.wavelet_filter(),
        }
    }

    pub fn wavelet(&self) -> Wavelet {
        self.wavelet
    }

    pub fn mode(&self) -> BoundaryMode {
        self.mode
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Decompose one channel into `level + 1` coefficient bands
    pub fn forward(&self, signal: &[f64]) -> CoefficientSet {
        let mut approx = signal.to_vec();
        let mut details = Vec::with_capacity(self.level);
        let mut level_lengths = Vec::with_capacity(self.level);

        for _ in 0..self.level {
            level_lengths.push(approx.len());
            let (a, d) = self.analysis_step(&approx);
            details.push(d);
            approx = a;
        }

        let mut bands = Vec::with_capacity(self.level + 1);
        bands.push(approx);
        bands.extend(details.into_iter().rev());

        CoefficientSet {
            bands,
            level_lengths,
        }
    }

    /// Reconstruct one channel from its coefficient bands
    pub fn inverse(&self, coeffs: &CoefficientSet) -> Vec<f64> {
        let mut current = coeffs.bands[0].clone();

        // Coarsest detail pairs with the deepest recorded length.
        for (detail, &target_len) in coeffs.bands[1..]
            .iter()
            .zip(coeffs.level_lengths.iter().rev())
        {
            current = self.synthesis_step(&current, detail);
            current.truncate(target_len);
        }

        current
    }

    /// One level of analysis: periodic convolution with h and g, then downsample by 2
    fn analysis_step(&self, signal: &[f64]) -> (Vec<f64>, Vec<f64>) {
        if signal.is_empty() {
            return (Vec::new(), Vec::new());
        }

        let extended;
        let signal = if signal.len() % 2 == 1 {
            let mut padded = Vec::with_capacity(signal.len() + 1);
            padded.extend_from_slice(signal);
            padded.push(signal[signal.len() - 1]);
            extended = padded;
            extended.as_slice()
        } else {
            signal
        };

        let n = signal.len() as isize;
        let half = signal.len() / 2;
        let mut approx = vec![0.0; half];
        let mut detail = vec![0.0; half];

        for k in 0..half {
            let mut a = 0.0;
            let mut d = 0.0;
            for (j, (&hj, &gj)) in self.h.iter().zip(self.g.iter()).enumerate() {
                let idx = (2 * k as isize - j as isize).rem_euclid(n) as usize;
                a += hj * signal[idx];
                d += gj * signal[idx];
            }
            approx[k] = a;
            detail[k] = d;
        }

        (approx, detail)
    }

    /// One level of synthesis: scatter each (a[k], d[k]) pair back through the
    /// filters at positions `(2k - j) mod N`.
    fn synthesis_step(&self, approx: &[f64], detail: &[f64]) -> Vec<f64> {
        let half = approx.len().min(detail.len());
        let n = half * 2;
        let mut result = vec![0.0; n];

        if n == 0 {
            return result;
        }

        for k in 0..half {
            for (j, (&hj, &gj)) in self.h.iter().zip(self.g.iter()).enumerate() {
                let idx = (2 * k as isize - j as isize).rem_euclid(n as isize) as usize;
                result[idx] += hj * approx[k] + gj * detail[k];
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    fn ramp_signal(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| ((i * 37 % 101) as f64 / 50.0) - 1.0 + (i as f64 * 0.01).sin())
            .collect()
    }

    #[test]
    fn test_db4_filter_is_orthonormal() {
        let h = Wavelet::Daubechies4.scaling_filter();
        let energy: f64 = h.iter().map(|c| c * c).sum();
        let sum: f64 = h.iter().sum();

        assert_abs_diff_eq!(energy, 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(sum, std::f64::consts::SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_forward_produces_level_plus_one_bands() {
        let transform = WaveletTransform::default();
        let coeffs = transform.forward(&ramp_signal(64));

        assert_eq!(coeffs.num_bands(), DECOMPOSITION_LEVEL + 1);
        assert_eq!(coeffs.level(), DECOMPOSITION_LEVEL);
        // Coarser bands shrink geometrically.
        assert_eq!(coeffs.finest_detail().len(), 32);
        assert_eq!(coeffs.band(1).len(), 16);
        assert_eq!(coeffs.approximation().len(), 16);
    }

    #[test_case(0 ; "empty")]
    #[test_case(1 ; "single sample")]
    #[test_case(2 ; "shorter than filter")]
    #[test_case(7 ; "odd")]
    #[test_case(64 ; "power of two")]
    #[test_case(101 ; "odd prime")]
    #[test_case(2560 ; "block sized")]
    fn test_round_trip(len: usize) {
        let transform = WaveletTransform::default();
        let signal = ramp_signal(len);

        let coeffs = transform.forward(&signal);
        assert_eq!(coeffs.signal_len(), len);

        let restored = transform.inverse(&coeffs);
        assert_eq!(restored.len(), len);
        for (orig, rec) in signal.iter().zip(restored.iter()) {
            assert_abs_diff_eq!(orig, rec, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zero_signal_has_zero_coefficients() {
        let transform = WaveletTransform::default();
        let coeffs = transform.forward(&[0.0; 40]);

        for band in 0..coeffs.num_bands() {
            assert!(coeffs.band(band).iter().all(|&c| c == 0.0));
        }
    }

    #[test]
    fn test_details_mut_skips_approximation() {
        let transform = WaveletTransform::default();
        let mut coeffs = transform.forward(&ramp_signal(32));
        let approx_before = coeffs.approximation().to_vec();

        for band in coeffs.details_mut() {
            band.iter_mut().for_each(|c| *c = 0.0);
        }

        assert_eq!(coeffs.approximation(), approx_before.as_slice());
        assert!(coeffs.finest_detail().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_constant_signal_has_no_detail_energy() {
        // db4 has vanishing moments, so a DC block lives entirely in the approximation.
        let transform = WaveletTransform::default();
        let coeffs = transform.forward(&[0.25; 128]);

        for &c in coeffs.finest_detail() {
            assert_abs_diff_eq!(c, 0.0, epsilon = 1e-12);
        }
    }
}
