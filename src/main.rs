//! Nueva Denoise CLI
//!
//! Command-line interface for the wavelet-shrinkage denoiser.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{info, warn};

use nueva_denoise::cli::{commands, Cli, Commands};
use nueva_denoise::Result;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Nueva Denoise v{}", env!("CARGO_PKG_VERSION"));

    let name = command_name(&cli.command);
    handle_command(cli.command)
        .map_err(|err| {
            for suggestion in err.recovery_suggestions() {
                warn!("{}", suggestion);
            }
            err
        })
        .with_context(|| format!("'{}' failed", name))
}

fn command_name(cmd: &Commands) -> &'static str {
    match cmd {
        Commands::Denoise { .. } => "denoise",
        Commands::NoiseProfile { .. } => "noise-profile",
        Commands::GenerateNoise { .. } => "generate-noise",
        Commands::Mix { .. } => "mix",
        Commands::Info { .. } => "info",
    }
}

fn handle_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Denoise {
            input,
            output,
            report,
        } => commands::denoise(&input, &output, report.as_deref()),
        Commands::NoiseProfile {
            noise_sample,
            output,
        } => commands::noise_profile(&noise_sample, &output),
        Commands::GenerateNoise {
            output,
            duration,
            sample_rate,
            channels,
            amplitude,
            seed,
        } => commands::generate_noise(&output, duration, sample_rate, channels, amplitude, seed),
        Commands::Mix {
            clean,
            noise,
            output,
            noise_level,
        } => commands::mix(&clean, &noise, &output, noise_level),
        Commands::Info { input } => commands::info(&input),
    }
}
