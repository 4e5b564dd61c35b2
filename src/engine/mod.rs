//! Audio Engine Module
//!
//! Streaming side of the denoiser:
//! - Sample block management
//! - WAV stream I/O
//! - Block-wise denoise pipeline
//! - Noise profile extraction
//! - Test signal generation

pub mod buffer;
pub mod denoiser;
pub mod generate;
pub mod io;
pub mod profile;

pub use buffer::{mean_squared_error, SampleBlock};
pub use denoiser::{
    block_frames_for, shrink_channel, BlockProgress, CancelFlag, ChannelThreshold, DenoiseEngine,
    DenoiseReport, DenoiseSummary, StreamDenoiser,
};
pub use generate::{generate_test_tone, generate_white_noise, mix_noise};
pub use io::{
    file_sha256, read_audio, write_audio, AudioMetadata, BlockSink, BlockSource, MemorySink,
    MemorySource, SampleEncoding, WavBlockReader, WavBlockWriter,
};
pub use profile::{NoiseProfile, NoiseProfiler, ResidualNoiseProfiler};
