//! Nueva Denoise - Wavelet-Shrinkage Audio Denoiser
//!
//! Removes additive noise from audio files by shrinking wavelet detail
//! coefficients, and extracts noise profiles from noise-only recordings.
//!
//! # Architecture
//!
//! - `dsp`: pure numerics (db4 periodic wavelet transform, MAD noise
//!   estimate, universal threshold, soft shrinkage)
//! - `engine`: block-wise streaming over WAV files, noise profiling and
//!   demo signal generation
//! - `cli`: command-line front end
//!
//! # Example
//! ```no_run
//! use std::path::Path;
//! use nueva_denoise::engine::DenoiseEngine;
//!
//! let engine = DenoiseEngine::new("input.wav");
//! let report = engine.denoise(Path::new("input_denoised.wav"))?;
//! println!("{} blocks", report.blocks.len());
//! # Ok::<(), nueva_denoise::DenoiseError>(())
//! ```

pub mod cli;
pub mod dsp;
pub mod engine;
pub mod error;

pub use error::{DenoiseError, Result};
