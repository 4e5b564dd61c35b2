//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engine::{
    generate_white_noise, mix_noise, read_audio, write_audio, AudioMetadata, BlockSource,
    DenoiseEngine, WavBlockReader,
};
use crate::error::{DenoiseError, Result};

/// Denoise `input` into `output`, optionally saving a JSON report.
pub fn denoise(input: &Path, output: &Path, report_path: Option<&Path>) -> Result<()> {
    info!("Denoising: {}", input.display());

    let engine = DenoiseEngine::new(input);
    let report = engine.denoise_with_progress(output, |progress| {
        debug!(
            "Block {}/{} done ({} frames)",
            progress.index + 1,
            progress.total,
            progress.frames
        );
    })?;

    println!(
        "Denoised {} -> {} ({} frames, {} blocks of {} frames)",
        input.display(),
        output.display(),
        report.frames_written,
        report.blocks.len(),
        report.block_frames
    );
    println!("Output SHA-256: {}", report.output_sha256);

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json)?;
        println!("Report written: {}", path.display());
    }

    Ok(())
}

/// Write the predicted noise of `noise_sample` to `output`.
pub fn noise_profile(noise_sample: &Path, output: &Path) -> Result<()> {
    info!("Extracting noise profile: {}", noise_sample.display());

    let engine = DenoiseEngine::new(noise_sample);
    let profile = engine.extract_noise_profile(noise_sample, output)?;

    println!(
        "Predicted noise written: {} ({} frames at {} Hz)",
        output.display(),
        profile.waveform.num_frames(),
        profile.sample_rate
    );

    Ok(())
}

/// Generate a white-noise WAV file.
pub fn generate_noise(
    output: &Path,
    duration: f64,
    sample_rate: u32,
    channels: u16,
    amplitude: f32,
    seed: Option<u64>,
) -> Result<()> {
    info!(
        "Generating {:.2}s of white noise at {} Hz",
        duration, sample_rate
    );

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let noise =
        generate_white_noise(duration, sample_rate, channels as usize, amplitude, &mut rng)?;
    let metadata = AudioMetadata::new(sample_rate, channels, noise.num_frames() as u64);
    write_audio(output, &metadata, &noise)?;

    println!("Generated white noise file: {}", output.display());

    Ok(())
}

/// Mix `noise` into `clean` and write the result to `output`.
///
/// Both files must share a sample rate; resampling is not supported.
pub fn mix(clean: &Path, noise: &Path, output: &Path, noise_level: f32) -> Result<()> {
    info!(
        "Mixing {} into {} at level {}",
        noise.display(),
        clean.display(),
        noise_level
    );

    let (clean_meta, clean_block) = read_audio(clean)?;
    let (noise_meta, noise_block) = read_audio(noise)?;
    if noise_meta.sample_rate != clean_meta.sample_rate {
        return Err(DenoiseError::SampleRateMismatch {
            expected: clean_meta.sample_rate,
            found: noise_meta.sample_rate,
        });
    }

    let mixed = mix_noise(&clean_block, &noise_block, noise_level)?;
    write_audio(output, &clean_meta, &mixed)?;

    println!("Wrote noisy file: {}", output.display());

    Ok(())
}

/// Print the metadata of `input` as JSON.
pub fn info(input: &Path) -> Result<()> {
    let reader = WavBlockReader::open(input)?;
    let json = serde_json::to_string_pretty(reader.metadata())?;
    println!("{}", json);
    Ok(())
}
