//! Test signal generation and noise mixing
//!
//! Helpers for building demo material: sine tones, additive white Gaussian
//! noise and noisy mixtures of the two.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::engine::buffer::SampleBlock;
use crate::error::{DenoiseError, Result};

/// Generate a mono sine tone
///
/// # Arguments
/// * `frequency` - Frequency of the sine wave in Hz
/// * `duration_secs` - Duration of the tone in seconds
/// * `sample_rate` - Sample rate in Hz
pub fn generate_test_tone(frequency: f32, duration_secs: f32, sample_rate: u32) -> SampleBlock {
    let num_frames = (duration_secs as f64 * sample_rate as f64) as usize;
    let angular_freq = 2.0 * std::f64::consts::PI * frequency as f64 / sample_rate as f64;

    let samples = (0..num_frames)
        .map(|i| (angular_freq * i as f64).sin() as f32)
        .collect();

    SampleBlock {
        samples: vec![samples],
    }
}

/// Generate additive white Gaussian noise
///
/// Samples are drawn from N(0, 1), normalized by their absolute peak and then
/// scaled so the peak equals `amplitude`.
///
/// # Errors
/// * `InvalidParameter` - If `channels` is zero or `amplitude` is outside 0..=1
pub fn generate_white_noise<R: Rng + ?Sized>(
    duration_secs: f64,
    sample_rate: u32,
    channels: usize,
    amplitude: f32,
    rng: &mut R,
) -> Result<SampleBlock> {
    if channels == 0 {
        return Err(DenoiseError::InvalidParameter {
            param: "channels".to_string(),
            value: "0".to_string(),
            expected: "at least one channel".to_string(),
        });
    }
    if !(0.0..=1.0).contains(&amplitude) {
        return Err(DenoiseError::InvalidParameter {
            param: "amplitude".to_string(),
            value: amplitude.to_string(),
            expected: "0.0 to 1.0".to_string(),
        });
    }
    if !(duration_secs.is_finite() && duration_secs >= 0.0) {
        return Err(DenoiseError::InvalidParameter {
            param: "duration_secs".to_string(),
            value: duration_secs.to_string(),
            expected: "a non-negative number of seconds".to_string(),
        });
    }

    let num_frames = (sample_rate as f64 * duration_secs) as usize;
    let normal = Normal::new(0.0_f64, 1.0).map_err(|e| DenoiseError::InvalidParameter {
        param: "normal distribution".to_string(),
        value: e.to_string(),
        expected: "a valid standard deviation".to_string(),
    })?;

    // Frame-major draw order matches an interleaved (frames, channels) matrix.
    let mut raw = vec![vec![0.0_f64; num_frames]; channels];
    for frame in 0..num_frames {
        for channel in raw.iter_mut() {
            channel[frame] = normal.sample(&mut *rng);
        }
    }

    let peak = raw
        .iter()
        .flat_map(|channel| channel.iter())
        .fold(0.0_f64, |acc, &s| acc.max(s.abs()));
    let scale = if peak > 0.0 {
        amplitude as f64 / peak
    } else {
        0.0
    };

    let samples = raw
        .into_iter()
        .map(|channel| channel.into_iter().map(|s| (s * scale) as f32).collect())
        .collect();

    Ok(SampleBlock { samples })
}

/// Mix `noise` into `clean` at `noise_level`
///
/// The noise is tiled or truncated to the clean length; output channel `c`
/// takes noise channel `c % noise_channels`. If the mixture peaks above 1.0
/// it is normalized to a peak of exactly 1.0.
///
/// # Errors
/// * `InvalidParameter` - If the noise is empty or `noise_level` is negative
pub fn mix_noise(
    clean: &SampleBlock,
    noise: &SampleBlock,
    noise_level: f32,
) -> Result<SampleBlock> {
    if noise.is_empty() || noise.num_channels() == 0 {
        return Err(DenoiseError::InvalidParameter {
            param: "noise".to_string(),
            value: "0 frames".to_string(),
            expected: "a non-empty noise sample".to_string(),
        });
    }
    if !(noise_level.is_finite() && noise_level >= 0.0) {
        return Err(DenoiseError::InvalidParameter {
            param: "noise_level".to_string(),
            value: noise_level.to_string(),
            expected: "a non-negative number".to_string(),
        });
    }

    let mut mixed = clean.clone();
    for (c, channel) in mixed.samples.iter_mut().enumerate() {
        let noise_channel = noise.channel(c % noise.num_channels());
        for (sample, &n) in channel.iter_mut().zip(noise_channel.iter().cycle()) {
            *sample += n * noise_level;
        }
    }

    let peak = mixed.peak();
    if peak > 1.0 {
        for channel in mixed.samples.iter_mut() {
            channel.iter_mut().for_each(|s| *s /= peak);
        }
    }

    Ok(mixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_test_tone() {
        let tone = generate_test_tone(440.0, 1.0, 16000);

        assert_eq!(tone.num_frames(), 16000);
        assert_eq!(tone.num_channels(), 1);
        // Half a cycle in, the sine should be back near zero.
        let half_cycle = (16000.0 / 440.0 / 2.0) as usize;
        assert!(tone.channel(0)[half_cycle].abs() < 0.1);
    }

    #[test]
    fn test_white_noise_peak_equals_amplitude() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = generate_white_noise(0.5, 8000, 2, 0.06, &mut rng).unwrap();

        assert_eq!(noise.num_frames(), 4000);
        assert_eq!(noise.num_channels(), 2);
        assert_relative_eq!(noise.peak(), 0.06, max_relative = 1e-5);
    }

    #[test]
    fn test_white_noise_is_reproducible_with_seed() {
        let a = generate_white_noise(0.1, 8000, 1, 0.5, &mut StdRng::seed_from_u64(1)).unwrap();
        let b = generate_white_noise(0.1, 8000, 1, 0.5, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_white_noise_rejects_bad_parameters() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(generate_white_noise(1.0, 8000, 0, 0.5, &mut rng).is_err());
        assert!(generate_white_noise(1.0, 8000, 1, 1.5, &mut rng).is_err());
        assert!(generate_white_noise(-1.0, 8000, 1, 0.5, &mut rng).is_err());
    }

    #[test]
    fn test_mix_tiles_short_noise() {
        let clean = SampleBlock::silent(5, 1);
        let noise = SampleBlock::from_channels(vec![vec![1.0, -1.0]]).unwrap();

        let mixed = mix_noise(&clean, &noise, 0.5).unwrap();
        assert_eq!(mixed.channel(0), &[0.5, -0.5, 0.5, -0.5, 0.5]);
    }

    #[test]
    fn test_mix_normalizes_clipping() {
        let clean = SampleBlock::from_channels(vec![vec![0.9, -0.2]]).unwrap();
        let noise = SampleBlock::from_channels(vec![vec![1.0, 1.0]]).unwrap();

        let mixed = mix_noise(&clean, &noise, 0.6).unwrap();
        assert_relative_eq!(mixed.peak(), 1.0);
        assert_relative_eq!(mixed.channel(0)[1], 0.4 / 1.5, max_relative = 1e-6);
    }

    #[test]
    fn test_mix_broadcasts_mono_noise() {
        let clean = SampleBlock::silent(2, 2);
        let noise = SampleBlock::from_channels(vec![vec![0.5, 0.25]]).unwrap();

        let mixed = mix_noise(&clean, &noise, 1.0).unwrap();
        assert_eq!(mixed.channel(0), mixed.channel(1));
    }

    #[test]
    fn test_mix_rejects_empty_noise() {
        let clean = SampleBlock::silent(2, 1);
        assert!(mix_noise(&clean, &SampleBlock::silent(0, 1), 0.1).is_err());
    }
}
