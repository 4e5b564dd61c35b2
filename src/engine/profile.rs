//! Noise profile extraction
//!
//! A noise profiler analyzes a whole noise-only recording and predicts its
//! noise waveform. The engine only moves audio in and out of the profiler:
//! it reads the sample, hands it over, and writes the prediction back to disk
//! at the input's sample rate.
//!
//! NOTE: the whole noise sample is held in memory, so this path is meant for
//! short recordings.

use std::path::Path;

use log::info;

use crate::dsp::WaveletTransform;
use crate::engine::buffer::SampleBlock;
use crate::engine::denoiser::{shrink_channel, DenoiseEngine};
use crate::engine::io::{read_audio, write_audio};
use crate::error::{DenoiseError, Result};

/// Analyzer producing a predicted noise waveform from a noise-only sample
pub trait NoiseProfiler: Sized {
    /// Build the profile from the entire in-memory sample
    fn analyze(sample: &SampleBlock) -> Result<Self>;

    /// Predicted noise waveform
    fn predicted_noise(&self) -> &SampleBlock;
}

/// Profiler predicting noise as the part wavelet shrinkage removes
///
/// Each channel of the whole sample is decomposed once and shrunk with the
/// universal threshold; the residual `input - denoised` is the prediction. The
/// prediction has the same frame and channel count as the input.
#[derive(Debug, Clone)]
pub struct ResidualNoiseProfiler {
    noise: SampleBlock,
}

impl NoiseProfiler for ResidualNoiseProfiler {
    fn analyze(sample: &SampleBlock) -> Result<Self> {
        let transform = WaveletTransform::default();
        let mut samples = Vec::with_capacity(sample.num_channels());
        for channel in &sample.samples {
            let (clean, _) = shrink_channel(&transform, channel)?;
            let residual = channel
                .iter()
                .zip(clean.iter())
                .map(|(&noisy, &denoised)| noisy - denoised)
                .collect();
            samples.push(residual);
        }
        Ok(Self {
            noise: SampleBlock { samples },
        })
    }

    fn predicted_noise(&self) -> &SampleBlock {
        &self.noise
    }
}

/// Predicted noise returned by a profiling call
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseProfile {
    pub sample_rate: u32,
    pub waveform: SampleBlock,
}

impl DenoiseEngine {
    /// Predict the noise in `noise_sample` and write it to `output`
    ///
    /// # Errors
    /// * `FileNotFound` - If `noise_sample` does not exist
    /// * `AudioRead` - If `noise_sample` cannot be decoded
    /// * `AudioWrite` - If `output` cannot be written
    pub fn extract_noise_profile(
        &self,
        noise_sample: &Path,
        output: &Path,
    ) -> Result<NoiseProfile> {
        self.extract_noise_profile_with::<ResidualNoiseProfiler>(noise_sample, output)
    }

    /// Same as [`DenoiseEngine::extract_noise_profile`] with a caller-chosen profiler
    pub fn extract_noise_profile_with<P: NoiseProfiler>(
        &self,
        noise_sample: &Path,
        output: &Path,
    ) -> Result<NoiseProfile> {
        if !noise_sample.exists() {
            return Err(DenoiseError::FileNotFound {
                path: noise_sample.to_path_buf(),
            });
        }

        let (metadata, sample) = read_audio(noise_sample)?;
        info!(
            "[PROFILE] Analyzing {} ({} frames, {} Hz)",
            noise_sample.display(),
            metadata.frames,
            metadata.sample_rate
        );

        let profiler = P::analyze(&sample)?;
        let waveform = profiler.predicted_noise().clone();

        let out_metadata = metadata.with_frames(waveform.num_frames() as u64);
        let written = write_audio(output, &out_metadata, &waveform)?;
        info!(
            "[PROFILE] Wrote {} frames of predicted noise to {}",
            written,
            output.display()
        );

        Ok(NoiseProfile {
            sample_rate: metadata.sample_rate,
            waveform,
        })
    }
}
