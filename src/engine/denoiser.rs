//! One-pass streaming wavelet denoiser
//!
//! The input is split into blocks of `round(rate * duration * BLOCK_FRACTION)`
//! frames. Every block is decomposed, thresholded and reconstructed on its own
//! and written before the next one is read, so memory stays bounded by one
//! block regardless of file length.
//!
//! Blocks are processed without overlap or blending. Discontinuities at block
//! boundaries are expected.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;

use crate::dsp::{
    robust_scale, soft_threshold_in_place, universal_threshold, WaveletTransform, BLOCK_FRACTION,
};
use crate::engine::buffer::SampleBlock;
use crate::engine::io::{
    file_sha256, AudioMetadata, BlockSink, BlockSource, WavBlockReader, WavBlockWriter,
};
use crate::error::{DenoiseError, Result};

/// Shared flag requesting cancellation at the next block boundary
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Noise estimate and threshold applied to one channel of one block
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelThreshold {
    pub sigma: f64,
    pub threshold: f64,
}

/// Progress record emitted after each block is written
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockProgress {
    /// Zero-based block index
    pub index: usize,
    /// Expected number of blocks for the whole stream
    pub total: usize,
    /// Frames in this block
    pub frames: usize,
    /// One entry per channel
    pub channels: Vec<ChannelThreshold>,
}

/// Outcome of one streaming pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DenoiseSummary {
    pub block_frames: usize,
    pub blocks: Vec<BlockProgress>,
    pub frames_written: u64,
}

/// Outcome of denoising one file
#[derive(Debug, Clone, Serialize)]
pub struct DenoiseReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub metadata: AudioMetadata,
    /// Wavelet basis name, e.g. "db4"
    pub wavelet: &'static str,
    pub boundary_mode: &'static str,
    pub decomposition_level: usize,
    pub block_frames: usize,
    pub blocks: Vec<BlockProgress>,
    pub frames_written: u64,
    /// SHA-256 of the written output file
    pub output_sha256: String,
    pub completed_at: DateTime<Utc>,
}

/// Block length in frames for a stream: `round(rate * duration * BLOCK_FRACTION)`
///
/// Non-empty streams always get at least one frame per block; an empty stream
/// gets zero.
pub fn block_frames_for(metadata: &AudioMetadata) -> usize {
    if metadata.frames == 0 {
        return 0;
    }
    let exact = metadata.sample_rate as f64 * metadata.duration_secs * BLOCK_FRACTION;
    let rounded = exact.round() as usize;
    if rounded == 0 {
        warn!(
            "[DENOISE] {} frame(s) is too short for {:.0}% blocks, using 1-frame blocks",
            metadata.frames,
            BLOCK_FRACTION * 100.0
        );
        1
    } else {
        rounded
    }
}

/// True when both paths resolve to the same existing file
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Denoise one channel: forward transform, MAD noise estimate, universal
/// threshold, soft shrinkage of every detail band, inverse transform.
pub fn shrink_channel(
    transform: &WaveletTransform,
    samples: &[f32],
) -> Result<(Vec<f32>, ChannelThreshold)> {
    let signal: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
    let mut coeffs = transform.forward(&signal);

    let sigma = robust_scale(coeffs.finest_detail());
    let threshold = universal_threshold(sigma, samples.len());
    for band in coeffs.details_mut() {
        soft_threshold_in_place(band, threshold)?;
    }

    let clean = transform
        .inverse(&coeffs)
        .into_iter()
        .map(|s| s as f32)
        .collect();
    Ok((clean, ChannelThreshold { sigma, threshold }))
}

/// Block-by-block denoiser over any [`BlockSource`] / [`BlockSink`] pair
#[derive(Debug, Clone, Default)]
pub struct StreamDenoiser {
    transform: WaveletTransform,
    cancel: Option<CancelFlag>,
}

impl StreamDenoiser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Honor `flag` between blocks
    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn transform(&self) -> &WaveletTransform {
        &self.transform
    }

    /// Denoise every channel of `block` independently
    pub fn denoise_block(
        &self,
        block: &SampleBlock,
    ) -> Result<(SampleBlock, Vec<ChannelThreshold>)> {
        let mut samples = Vec::with_capacity(block.num_channels());
        let mut thresholds = Vec::with_capacity(block.num_channels());
        for channel in &block.samples {
            let (clean, threshold) = shrink_channel(&self.transform, channel)?;
            samples.push(clean);
            thresholds.push(threshold);
        }
        Ok((SampleBlock { samples }, thresholds))
    }

    /// Read, denoise and write blocks until `source` is exhausted
    ///
    /// `on_block` is called after each block has been written.
    ///
    /// # Errors
    /// * `Cancelled` - If the cancel flag was raised; every block before it is fully written
    /// * Any error from the source, the sink or the shrinkage step, unchanged
    pub fn run<S, W, F>(
        &self,
        source: &mut S,
        sink: &mut W,
        mut on_block: F,
    ) -> Result<DenoiseSummary>
    where
        S: BlockSource + ?Sized,
        W: BlockSink + ?Sized,
        F: FnMut(&BlockProgress),
    {
        let metadata = source.metadata().clone();
        let block_frames = block_frames_for(&metadata);
        let mut summary = DenoiseSummary {
            block_frames,
            blocks: Vec::new(),
            frames_written: 0,
        };
        if block_frames == 0 {
            debug!("[DENOISE] Empty stream, nothing to process");
            return Ok(summary);
        }
        let total = (metadata.frames as usize).div_ceil(block_frames);

        loop {
            if self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
                info!("[DENOISE] Cancelled after {} block(s)", summary.blocks.len());
                return Err(DenoiseError::Cancelled {
                    blocks_completed: summary.blocks.len(),
                });
            }

            let Some(block) = source.read_block(block_frames)? else {
                break;
            };

            let (clean, channels) = self.denoise_block(&block)?;
            sink.write_block(&clean)?;
            summary.frames_written += clean.num_frames() as u64;

            let progress = BlockProgress {
                index: summary.blocks.len(),
                total: total.max(summary.blocks.len() + 1),
                frames: clean.num_frames(),
                channels,
            };
            debug!(
                "[DENOISE] Block {}/{} ({} frames) thresholds {:?}",
                progress.index + 1,
                progress.total,
                progress.frames,
                progress
                    .channels
                    .iter()
                    .map(|c| c.threshold)
                    .collect::<Vec<_>>()
            );
            on_block(&progress);
            summary.blocks.push(progress);
        }

        Ok(summary)
    }
}

/// File-level denoiser bound to one input path
#[derive(Debug, Clone)]
pub struct DenoiseEngine {
    input: PathBuf,
    denoiser: StreamDenoiser,
}

impl DenoiseEngine {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            denoiser: StreamDenoiser::new(),
        }
    }

    /// Stop at the next block boundary once `flag` is raised
    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.denoiser = self.denoiser.with_cancel_flag(flag);
        self
    }

    /// Denoise the input into a freshly created `output` file
    pub fn denoise(&self, output: &Path) -> Result<DenoiseReport> {
        self.denoise_with_progress(output, |_| {})
    }

    /// Like [`DenoiseEngine::denoise`], reporting each finished block to `on_block`
    ///
    /// # Errors
    /// * `FileNotFound` - If the input does not exist
    /// * `InvalidParameter` - If `output` names the input file itself
    /// * `AudioRead` / `AudioWrite` - If either file cannot be read or written
    /// * `Cancelled` - If the cancel flag was raised
    pub fn denoise_with_progress<F>(&self, output: &Path, on_block: F) -> Result<DenoiseReport>
    where
        F: FnMut(&BlockProgress),
    {
        let mut reader = WavBlockReader::open(&self.input)?;
        let metadata = reader.metadata().clone();
        info!(
            "[DENOISE] {} -> {} ({} Hz, {} ch, {:.3}s)",
            self.input.display(),
            output.display(),
            metadata.sample_rate,
            metadata.channels,
            metadata.duration_secs
        );

        // Creating the writer truncates the file the reader is streaming from.
        if is_same_file(&self.input, output) {
            return Err(DenoiseError::InvalidParameter {
                param: "output".to_string(),
                value: output.display().to_string(),
                expected: "a path different from the input file".to_string(),
            });
        }

        let mut writer = WavBlockWriter::create(output, &metadata)?;
        let summary = self.denoiser.run(&mut reader, &mut writer, on_block)?;
        let frames_written = writer.finalize()?;
        let output_sha256 = file_sha256(output)?;

        info!(
            "[DENOISE] Wrote {} frames in {} block(s) to {}",
            frames_written,
            summary.blocks.len(),
            output.display()
        );

        let transform = self.denoiser.transform();
        Ok(DenoiseReport {
            input: self.input.clone(),
            output: output.to_path_buf(),
            metadata,
            wavelet: transform.wavelet().name(),
            boundary_mode: transform.mode().name(),
            decomposition_level: transform.level(),
            block_frames: summary.block_frames,
            blocks: summary.blocks,
            frames_written,
            output_sha256,
            completed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::io::{MemorySink, MemorySource};
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    fn wobble(frames: usize, channels: usize) -> SampleBlock {
        let samples = (0..channels)
            .map(|c| {
                (0..frames)
                    .map(|i| {
                        let tone = ((i * (c + 3)) as f32 * 0.05).sin() * 0.4;
                        tone + ((i * 13 % 7) as f32 - 3.0) * 0.01
                    })
                    .collect()
            })
            .collect();
        SampleBlock { samples }
    }

    #[test]
    fn test_block_size_for_sixteen_hundred_ms() {
        let metadata = AudioMetadata::new(16000, 1, 25600);
        assert_eq!(block_frames_for(&metadata), 2560);
    }

    #[test]
    fn test_block_size_degenerate_inputs() {
        assert_eq!(block_frames_for(&AudioMetadata::new(8000, 1, 0)), 0);
        assert_eq!(block_frames_for(&AudioMetadata::new(8000, 1, 3)), 1);
        assert_eq!(block_frames_for(&AudioMetadata::new(8000, 1, 17)), 2);
    }

    #[test]
    fn test_ten_full_blocks() {
        let mut source = MemorySource::new(wobble(25600, 1), 16000).unwrap();
        let mut sink = MemorySink::new();

        let summary = StreamDenoiser::new().run(&mut source, &mut sink, |_| {}).unwrap();

        assert_eq!(summary.block_frames, 2560);
        assert_eq!(summary.blocks.len(), 10);
        assert!(sink.blocks.iter().all(|b| b.num_frames() == 2560));
        assert!(summary.blocks.iter().all(|b| b.total == 10));
    }

    #[test_case(1000, 1 ; "divisible mono")]
    #[test_case(1003, 1 ; "remainder mono")]
    #[test_case(997, 2 ; "remainder stereo")]
    #[test_case(7, 1 ; "tiny")]
    #[test_case(1, 1 ; "single frame")]
    fn test_length_preserved(frames: usize, channels: usize) {
        let mut source = MemorySource::new(wobble(frames, channels), 8000).unwrap();
        let mut sink = MemorySink::new();

        let summary = StreamDenoiser::new().run(&mut source, &mut sink, |_| {}).unwrap();
        let output = sink.concatenated().unwrap();

        assert_eq!(summary.frames_written, frames as u64);
        assert_eq!(output.num_frames(), frames);
        assert_eq!(output.num_channels(), channels);
    }

    #[test]
    fn test_empty_stream_writes_nothing() {
        let mut source = MemorySource::new(SampleBlock::silent(0, 1), 8000).unwrap();
        let mut sink = MemorySink::new();

        let summary = StreamDenoiser::new().run(&mut source, &mut sink, |_| {}).unwrap();
        assert_eq!(summary.frames_written, 0);
        assert!(summary.blocks.is_empty());
        assert!(sink.blocks.is_empty());
    }

    #[test]
    fn test_single_frame_blocks_pass_through() {
        let input = wobble(4, 1);
        let mut source = MemorySource::new(input.clone(), 8000).unwrap();
        let mut sink = MemorySink::new();

        let summary = StreamDenoiser::new().run(&mut source, &mut sink, |_| {}).unwrap();
        let output = sink.concatenated().unwrap();

        assert_eq!(summary.block_frames, 1);
        for block in &summary.blocks {
            assert_eq!(block.channels[0].threshold, 0.0);
        }
        for (a, b) in input.channel(0).iter().zip(output.channel(0)) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_silence_stays_silent() {
        let (clean, thresholds) = StreamDenoiser::new()
            .denoise_block(&SampleBlock::silent(333, 2))
            .unwrap();

        assert!(clean.samples.iter().flatten().all(|&s| s == 0.0));
        assert!(thresholds.iter().all(|t| t.sigma == 0.0 && t.threshold == 0.0));
    }

    #[test]
    fn test_channels_are_independent() {
        // A silent right channel must stay silent next to a busy left channel.
        let left = wobble(512, 1).samples.remove(0);
        let block = SampleBlock::from_channels(vec![left.clone(), vec![0.0; 512]]).unwrap();

        let (clean, thresholds) = StreamDenoiser::new().denoise_block(&block).unwrap();
        let (left_only, _) = StreamDenoiser::new()
            .denoise_block(&SampleBlock::from_channels(vec![left]).unwrap())
            .unwrap();

        assert!(clean.channel(1).iter().all(|&s| s == 0.0));
        assert_eq!(clean.channel(0), left_only.channel(0));
        assert!(thresholds[0].threshold > 0.0);
        assert_eq!(thresholds[1].threshold, 0.0);
    }

    #[test]
    fn test_progress_reported_per_block() {
        let mut source = MemorySource::new(wobble(1000, 1), 8000).unwrap();
        let mut sink = MemorySink::new();
        let mut seen = Vec::new();

        StreamDenoiser::new()
            .run(&mut source, &mut sink, |p| seen.push((p.index, p.frames)))
            .unwrap();

        assert_eq!(seen.len(), 10);
        assert_eq!(seen[0], (0, 100));
        assert_eq!(seen[9], (9, 100));
    }

    #[test]
    fn test_cancel_stops_at_block_boundary() {
        let flag = CancelFlag::new();
        let denoiser = StreamDenoiser::new().with_cancel_flag(flag.clone());
        let mut source = MemorySource::new(wobble(1000, 1), 8000).unwrap();
        let mut sink = MemorySink::new();

        let err = denoiser
            .run(&mut source, &mut sink, |p| {
                if p.index == 2 {
                    flag.cancel();
                }
            })
            .unwrap_err();

        match err {
            DenoiseError::Cancelled { blocks_completed } => assert_eq!(blocks_completed, 3),
            other => panic!("Expected Cancelled, got: {:?}", other),
        }
        assert_eq!(sink.blocks.len(), 3);
        assert!(sink.blocks.iter().all(|b| b.num_frames() == 100));
    }

    #[test]
    fn test_denoise_is_deterministic() {
        let input = wobble(2048, 2);
        let denoiser = StreamDenoiser::new();
        let (first, _) = denoiser.denoise_block(&input).unwrap();
        let (second, _) = denoiser.denoise_block(&input).unwrap();
        assert_eq!(first, second);
    }
}
