//! Error handling for the denoiser
//!
//! Errors are never recovered from inside the library: a single bad block
//! fails the whole operation and the error surfaces unchanged to the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for denoiser operations
pub type Result<T> = std::result::Result<T, DenoiseError>;

type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for denoiser operations
#[derive(Error, Debug)]
pub enum DenoiseError {
    // File Errors
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Failed to read audio from {}: {source}", path.display())]
    AudioRead {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to write audio to {}: {source}", path.display())]
    AudioWrite {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // Parameter Errors
    #[error("Invalid parameter '{param}' = {value} (expected {expected})")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    #[error(
        "Sample rate mismatch: expected {expected} Hz, found {found} Hz (resampling is not supported)"
    )]
    SampleRateMismatch { expected: u32, found: u32 },

    // Control Flow
    #[error("Operation cancelled after {blocks_completed} block(s)")]
    Cancelled { blocks_completed: usize },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DenoiseError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: impl Into<BoxedCause>) -> Self {
        DenoiseError::AudioRead {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: impl Into<BoxedCause>) -> Self {
        DenoiseError::AudioWrite {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            DenoiseError::FileNotFound { .. } => "FILE_NOT_FOUND",
            DenoiseError::AudioRead { .. } => "AUDIO_READ_ERROR",
            DenoiseError::AudioWrite { .. } => "AUDIO_WRITE_ERROR",
            DenoiseError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            DenoiseError::InvalidParameter { .. } => "INVALID_PARAMETER",
            DenoiseError::SampleRateMismatch { .. } => "SAMPLE_RATE_MISMATCH",
            DenoiseError::Cancelled { .. } => "CANCELLED",
            DenoiseError::Io(_) => "IO_ERROR",
            DenoiseError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error belongs to the I/O family (read, write or raw I/O)
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            DenoiseError::AudioRead { .. } | DenoiseError::AudioWrite { .. } | DenoiseError::Io(_)
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            DenoiseError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            DenoiseError::AudioRead { .. } => vec![
                "Check if the file plays in another application",
                "The file may be corrupted - try re-exporting from source",
            ],
            DenoiseError::AudioWrite { .. } => vec![
                "Check that the output directory exists and is writable",
                "Free up disk space",
            ],
            DenoiseError::UnsupportedFormat { .. } => vec![
                "Convert to 8/16/24/32-bit PCM or 32-bit float WAV",
            ],
            DenoiseError::SampleRateMismatch { .. } => vec![
                "Resample one of the files externally so both share a sample rate",
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DenoiseError::FileNotFound {
            path: PathBuf::from("test.wav"),
        };
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
        assert!(!err.is_io());
    }

    #[test]
    fn test_read_error_keeps_source_message() {
        let cause = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad RIFF header");
        let err = DenoiseError::read("noise.wav", cause);

        assert!(err.is_io());
        assert_eq!(err.error_code(), "AUDIO_READ_ERROR");
        let message = err.to_string();
        assert!(message.contains("noise.wav"));
        assert!(message.contains("bad RIFF header"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = DenoiseError::SampleRateMismatch {
            expected: 44100,
            found: 48000,
        };
        assert!(!err.recovery_suggestions().is_empty());
        assert!(err.to_string().contains("48000"));
    }
}
