//! CLI Module
//!
//! Command-line interface for the denoiser.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Nueva Denoise - wavelet-shrinkage audio denoiser
#[derive(Parser, Debug)]
#[command(name = "nueva-denoise")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (per-block progress)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Denoise an input file
    #[command(name = "denoise")]
    Denoise {
        /// Input audio file
        input: PathBuf,

        /// Output denoised audio file
        output: PathBuf,

        /// Write a JSON processing report to this path
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Generate predicted noise from a noise-only sample
    #[command(name = "noise-profile")]
    NoiseProfile {
        /// Input noise-only sample file
        noise_sample: PathBuf,

        /// Output file to write predicted noise to
        output: PathBuf,
    },

    /// Generate a white Gaussian noise file
    #[command(name = "generate-noise")]
    GenerateNoise {
        /// Output WAV file
        output: PathBuf,

        /// Duration in seconds
        #[arg(short, long, default_value_t = 5.0)]
        duration: f64,

        /// Sample rate in Hz
        #[arg(short, long, default_value_t = 44100)]
        sample_rate: u32,

        /// Number of channels
        #[arg(short, long, default_value_t = 1)]
        channels: u16,

        /// Peak amplitude (0.0 to 1.0)
        #[arg(short, long, default_value_t = 0.06)]
        amplitude: f32,

        /// Seed for reproducible noise
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Mix a noise sample into a clean recording
    #[command(name = "mix")]
    Mix {
        /// Clean input audio file
        clean: PathBuf,

        /// Noise sample (tiled to the clean length)
        noise: PathBuf,

        /// Output noisy audio file
        output: PathBuf,

        /// Scaling applied to the noise before mixing
        #[arg(short, long, default_value_t = 0.05)]
        noise_level: f32,
    },

    /// Print audio file metadata as JSON
    #[command(name = "info")]
    Info {
        /// Audio file to inspect
        input: PathBuf,
    },
}
