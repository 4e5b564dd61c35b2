//! Sample block management
//!
//! A `SampleBlock` is the unit of work flowing through the denoiser: a run of
//! frames stored as non-interleaved 32-bit float channels.

use crate::error::{DenoiseError, Result};

// ============================================================================
// Helper Functions
// ============================================================================

/// Mean squared error between two sample slices
///
/// Only the overlapping prefix is compared. Returns 0.0 when either is empty.
pub fn mean_squared_error(a: &[f32], b: &[f32]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let diff = x as f64 - y as f64;
            diff * diff
        })
        .sum();
    sum / n as f64
}

// ============================================================================
// Sample Block
// ============================================================================

/// Fixed run of audio frames, one `Vec<f32>` per channel
///
/// # Example
/// ```
/// use nueva_denoise::engine::SampleBlock;
///
/// let block = SampleBlock::from_interleaved(&[0.1, -0.1, 0.2, -0.2], 2).unwrap();
/// assert_eq!(block.num_channels(), 2);
/// assert_eq!(block.num_frames(), 2);
/// assert_eq!(block.channel(1), &[-0.1, -0.2]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBlock {
    /// Sample data: outer Vec is channels, inner Vec is frames
    pub samples: Vec<Vec<f32>>,
}

impl SampleBlock {
    /// Create a silent block
    pub fn silent(num_frames: usize, num_channels: usize) -> Self {
        Self {
            samples: vec![vec![0.0_f32; num_frames]; num_channels],
        }
    }

    /// Build a block from per-channel data
    ///
    /// # Errors
    /// * `InvalidParameter` - If there are no channels or channels differ in length
    pub fn from_channels(samples: Vec<Vec<f32>>) -> Result<Self> {
        if samples.is_empty() {
            return Err(DenoiseError::InvalidParameter {
                param: "channels".to_string(),
                value: "0".to_string(),
                expected: "at least one channel".to_string(),
            });
        }
        let frames = samples[0].len();
        if let Some(bad) = samples.iter().find(|ch| ch.len() != frames) {
            return Err(DenoiseError::InvalidParameter {
                param: "channel length".to_string(),
                value: bad.len().to_string(),
                expected: format!("{} frames like channel 0", frames),
            });
        }
        Ok(Self { samples })
    }

    /// Create a block from interleaved sample data (L, R, L, R, ... for stereo)
    ///
    /// # Errors
    /// * `InvalidParameter` - If `num_channels` is zero or the data holds a partial frame
    pub fn from_interleaved(interleaved: &[f32], num_channels: usize) -> Result<Self> {
        if num_channels == 0 {
            return Err(DenoiseError::InvalidParameter {
                param: "num_channels".to_string(),
                value: "0".to_string(),
                expected: "at least one channel".to_string(),
            });
        }
        if interleaved.len() % num_channels != 0 {
            return Err(DenoiseError::InvalidParameter {
                param: "interleaved length".to_string(),
                value: interleaved.len().to_string(),
                expected: format!("a multiple of {} channels", num_channels),
            });
        }

        let frames = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(frames); num_channels];
        for frame in interleaved.chunks_exact(num_channels) {
            for (channel, &sample) in samples.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Ok(Self { samples })
    }

    /// Interleave channels back into file order
    pub fn to_interleaved(&self) -> Vec<f32> {
        let frames = self.num_frames();
        let mut result = Vec::with_capacity(frames * self.num_channels());
        for frame in 0..frames {
            for channel in &self.samples {
                result.push(channel[frame]);
            }
        }
        result
    }

    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }

    /// Number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        self.samples.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.num_frames() == 0
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.samples[index]
    }

    /// Absolute peak across all channels
    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .flat_map(|channel| channel.iter())
            .map(|&s| s.abs())
            .fold(0.0_f32, f32::max)
    }

    /// Append the frames of another block with the same channel count
    pub fn append(&mut self, other: &SampleBlock) -> Result<()> {
        if other.num_channels() != self.num_channels() {
            return Err(DenoiseError::InvalidParameter {
                param: "num_channels".to_string(),
                value: other.num_channels().to_string(),
                expected: format!("{} channels", self.num_channels()),
            });
        }
        for (dst, src) in self.samples.iter_mut().zip(other.samples.iter()) {
            dst.extend_from_slice(src);
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
