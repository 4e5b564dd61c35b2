//! Audio stream I/O
//!
//! Block-wise sequential reading and writing of WAV files. Samples are
//! normalized to 32-bit float on read and converted back to the file's own
//! encoding on write, so the output mirrors the input's sample rate, channel
//! count, bit depth and sample format.
//!
//! The denoiser only depends on the narrow [`BlockSource`] / [`BlockSink`]
//! contract; the WAV types are one implementation, the in-memory types are
//! another.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::engine::buffer::SampleBlock;
use crate::error::{DenoiseError, Result};

/// Sample encoding inside the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleEncoding {
    /// Signed integer PCM
    Int,
    /// IEEE float
    Float,
}

/// Stream properties, read once when a file is opened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioMetadata {
    pub sample_rate: u32,
    pub channels: u16,
    /// Total frames (samples per channel)
    pub frames: u64,
    pub duration_secs: f64,
    pub bits_per_sample: u16,
    pub sample_format: SampleEncoding,
}

impl AudioMetadata {
    /// Metadata for a float WAV stream
    pub fn new(sample_rate: u32, channels: u16, frames: u64) -> Self {
        Self {
            sample_rate,
            channels,
            frames,
            duration_secs: duration_of(frames, sample_rate),
            bits_per_sample: 32,
            sample_format: SampleEncoding::Float,
        }
    }

    /// Same encoding with a different frame count
    pub fn with_frames(&self, frames: u64) -> Self {
        Self {
            frames,
            duration_secs: duration_of(frames, self.sample_rate),
            ..self.clone()
        }
    }

    fn from_spec(spec: WavSpec, frames: u64) -> Self {
        Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            frames,
            duration_secs: duration_of(frames, spec.sample_rate),
            bits_per_sample: spec.bits_per_sample,
            sample_format: match spec.sample_format {
                SampleFormat::Float => SampleEncoding::Float,
                SampleFormat::Int => SampleEncoding::Int,
            },
        }
    }

    pub fn wav_spec(&self) -> WavSpec {
        WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            sample_format: match self.sample_format {
                SampleEncoding::Float => SampleFormat::Float,
                SampleEncoding::Int => SampleFormat::Int,
            },
        }
    }
}

fn duration_of(frames: u64, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        0.0
    } else {
        frames as f64 / sample_rate as f64
    }
}

/// Reject encodings the converters below cannot handle
fn check_supported(metadata: &AudioMetadata) -> Result<()> {
    let supported = match metadata.sample_format {
        SampleEncoding::Float => metadata.bits_per_sample == 32,
        SampleEncoding::Int => matches!(metadata.bits_per_sample, 8 | 16 | 24 | 32),
    };
    if !supported {
        return Err(DenoiseError::UnsupportedFormat {
            format: format!(
                "{}-bit {:?} audio (supported: 8/16/24/32-bit int, 32-bit float)",
                metadata.bits_per_sample, metadata.sample_format
            ),
        });
    }
    if metadata.channels == 0 || metadata.sample_rate == 0 {
        return Err(DenoiseError::UnsupportedFormat {
            format: format!(
                "{} channel(s) at {} Hz",
                metadata.channels, metadata.sample_rate
            ),
        });
    }
    Ok(())
}

// ============================================================================
// Stream contract
// ============================================================================

/// Sequential, finite source of sample blocks
pub trait BlockSource {
    /// Properties of the underlying stream
    fn metadata(&self) -> &AudioMetadata;

    /// Read up to `max_frames` frames in file order
    ///
    /// Returns `Ok(None)` once the stream is exhausted. The final block may be
    /// shorter than `max_frames`.
    fn read_block(&mut self, max_frames: usize) -> Result<Option<SampleBlock>>;
}

/// Sequential sink accepting sample blocks in order
pub trait BlockSink {
    fn write_block(&mut self, block: &SampleBlock) -> Result<()>;
}

fn check_block_size(max_frames: usize) -> Result<()> {
    if max_frames == 0 {
        return Err(DenoiseError::InvalidParameter {
            param: "block_frames".to_string(),
            value: "0".to_string(),
            expected: "a positive frame count".to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// WAV implementation
// ============================================================================

/// Block-wise WAV reader
pub struct WavBlockReader {
    reader: WavReader<BufReader<File>>,
    metadata: AudioMetadata,
    path: PathBuf,
}

impl WavBlockReader {
    /// Open a WAV file for block-wise reading
    ///
    /// # Errors
    /// * `FileNotFound` - If the file does not exist
    /// * `AudioRead` - If the file is not a readable WAV file
    /// * `UnsupportedFormat` - If the sample encoding cannot be converted
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DenoiseError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let reader = WavReader::open(path).map_err(|e| DenoiseError::read(path, e))?;
        let metadata = AudioMetadata::from_spec(reader.spec(), reader.duration() as u64);
        check_supported(&metadata)?;

        Ok(Self {
            reader,
            metadata,
            path: path.to_path_buf(),
        })
    }

    /// Read up to `count` interleaved samples converted to f32
    fn read_interleaved(&mut self, count: usize) -> Result<Vec<f32>> {
        let path = &self.path;
        match (self.metadata.sample_format, self.metadata.bits_per_sample) {
            (SampleEncoding::Float, _) => self
                .reader
                .samples::<f32>()
                .take(count)
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| DenoiseError::read(path, e)),
            (SampleEncoding::Int, 8) => self
                .reader
                .samples::<i8>()
                .take(count)
                .map(|s| s.map(|v| v as f32 / 128.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| DenoiseError::read(path, e)),
            (SampleEncoding::Int, 16) => self
                .reader
                .samples::<i16>()
                .take(count)
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| DenoiseError::read(path, e)),
            // 24-bit stored as i32 in hound
            (SampleEncoding::Int, 24) => self
                .reader
                .samples::<i32>()
                .take(count)
                .map(|s| s.map(|v| v as f32 / 8388608.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| DenoiseError::read(path, e)),
            (SampleEncoding::Int, _) => self
                .reader
                .samples::<i32>()
                .take(count)
                .map(|s| s.map(|v| (v as f64 / 2147483648.0) as f32))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| DenoiseError::read(path, e)),
        }
    }
}

impl BlockSource for WavBlockReader {
    fn metadata(&self) -> &AudioMetadata {
        &self.metadata
    }

    fn read_block(&mut self, max_frames: usize) -> Result<Option<SampleBlock>> {
        check_block_size(max_frames)?;
        let channels = self.metadata.channels as usize;
        let interleaved = self.read_interleaved(max_frames * channels)?;
        if interleaved.is_empty() {
            return Ok(None);
        }
        if interleaved.len() % channels != 0 {
            return Err(DenoiseError::read(
                &self.path,
                format!(
                    "stream ended inside a frame ({} samples for {} channels)",
                    interleaved.len(),
                    channels
                ),
            ));
        }
        SampleBlock::from_interleaved(&interleaved, channels).map(Some)
    }
}

/// Block-wise WAV writer
///
/// The file is created fresh (truncating any existing file). Call
/// [`WavBlockWriter::finalize`] on success; dropping the writer on an error
/// path still closes the file handle.
pub struct WavBlockWriter {
    writer: WavWriter<BufWriter<File>>,
    metadata: AudioMetadata,
    path: PathBuf,
    frames_written: u64,
}

impl WavBlockWriter {
    /// Create a WAV file with the encoding described by `metadata`
    ///
    /// # Errors
    /// * `UnsupportedFormat` - If the encoding cannot be produced
    /// * `AudioWrite` - If the file cannot be created
    pub fn create(path: &Path, metadata: &AudioMetadata) -> Result<Self> {
        check_supported(metadata)?;
        let writer =
            WavWriter::create(path, metadata.wav_spec()).map_err(|e| DenoiseError::write(path, e))?;

        Ok(Self {
            writer,
            metadata: metadata.with_frames(0),
            path: path.to_path_buf(),
            frames_written: 0,
        })
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Flush the header and close the file, returning the frames written
    pub fn finalize(self) -> Result<u64> {
        let frames = self.frames_written;
        let path = self.path;
        self.writer
            .finalize()
            .map_err(|e| DenoiseError::write(&path, e))?;
        Ok(frames)
    }

    /// Inverse of the read scaling, so integer samples survive a read/write cycle unchanged
    fn write_sample(&mut self, sample: f32) -> Result<()> {
        let result = match (self.metadata.sample_format, self.metadata.bits_per_sample) {
            (SampleEncoding::Float, _) => self.writer.write_sample(sample),
            (SampleEncoding::Int, 8) => self
                .writer
                .write_sample((sample * 128.0).round().clamp(-128.0, 127.0) as i8),
            (SampleEncoding::Int, 16) => self
                .writer
                .write_sample((sample * 32768.0).round().clamp(-32768.0, 32767.0) as i16),
            (SampleEncoding::Int, 24) => self.writer.write_sample(
                (sample as f64 * 8388608.0).round().clamp(-8388608.0, 8388607.0) as i32,
            ),
            (SampleEncoding::Int, _) => self.writer.write_sample(
                (sample as f64 * 2147483648.0)
                    .round()
                    .clamp(-2147483648.0, 2147483647.0) as i32,
            ),
        };
        result.map_err(|e| DenoiseError::write(&self.path, e))
    }
}

impl BlockSink for WavBlockWriter {
    fn write_block(&mut self, block: &SampleBlock) -> Result<()> {
        if block.num_channels() != self.metadata.channels as usize {
            return Err(DenoiseError::InvalidParameter {
                param: "num_channels".to_string(),
                value: block.num_channels().to_string(),
                expected: format!("{} channels", self.metadata.channels),
            });
        }
        for sample in block.to_interleaved() {
            self.write_sample(sample)?;
        }
        self.frames_written += block.num_frames() as u64;
        Ok(())
    }
}

// ============================================================================
// In-memory implementation
// ============================================================================

/// Block source over an in-memory block
#[derive(Debug, Clone)]
pub struct MemorySource {
    block: SampleBlock,
    metadata: AudioMetadata,
    position: usize,
}

impl MemorySource {
    /// # Errors
    /// * `InvalidParameter` - If the block has more channels than a WAV header can describe
    pub fn new(block: SampleBlock, sample_rate: u32) -> Result<Self> {
        let channels =
            u16::try_from(block.num_channels()).map_err(|_| DenoiseError::InvalidParameter {
                param: "num_channels".to_string(),
                value: block.num_channels().to_string(),
                expected: format!("at most {} channels", u16::MAX),
            })?;
        let metadata = AudioMetadata::new(sample_rate, channels, block.num_frames() as u64);
        Ok(Self {
            block,
            metadata,
            position: 0,
        })
    }
}

impl BlockSource for MemorySource {
    fn metadata(&self) -> &AudioMetadata {
        &self.metadata
    }

    fn read_block(&mut self, max_frames: usize) -> Result<Option<SampleBlock>> {
        check_block_size(max_frames)?;
        let total = self.block.num_frames();
        if self.position >= total {
            return Ok(None);
        }
        let end = (self.position + max_frames).min(total);
        let samples = self
            .block
            .samples
            .iter()
            .map(|channel| channel[self.position..end].to_vec())
            .collect();
        self.position = end;
        Ok(Some(SampleBlock { samples }))
    }
}

/// Block sink collecting everything written, plus the size of each write
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub blocks: Vec<SampleBlock>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenation of all written blocks, or `None` if nothing was written
    pub fn concatenated(&self) -> Option<SampleBlock> {
        let mut blocks = self.blocks.iter();
        let mut joined = blocks.next()?.clone();
        for block in blocks {
            joined.append(block).ok()?;
        }
        Some(joined)
    }
}

impl BlockSink for MemorySink {
    fn write_block(&mut self, block: &SampleBlock) -> Result<()> {
        self.blocks.push(block.clone());
        Ok(())
    }
}

// ============================================================================
// Whole-file helpers
// ============================================================================

/// Read an entire audio file into memory
///
/// Suitable for short files only; the denoiser streams instead.
pub fn read_audio(path: &Path) -> Result<(AudioMetadata, SampleBlock)> {
    let mut reader = WavBlockReader::open(path)?;
    let metadata = reader.metadata().clone();
    let mut block = SampleBlock::silent(0, metadata.channels as usize);

    // Read past the header's frame count so a trailing partial frame is reported.
    let chunk_frames = (metadata.frames as usize).max(1);
    while let Some(chunk) = reader.read_block(chunk_frames)? {
        block.append(&chunk)?;
    }

    Ok((metadata.with_frames(block.num_frames() as u64), block))
}

/// Write a whole block to a fresh audio file using `metadata`'s encoding
pub fn write_audio(path: &Path, metadata: &AudioMetadata, block: &SampleBlock) -> Result<u64> {
    let mut writer = WavBlockWriter::create(path, metadata)?;
    writer.write_block(block)?;
    writer.finalize()
}

/// SHA-256 checksum of a file as lowercase hex
pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Tests
// ============================================================================
