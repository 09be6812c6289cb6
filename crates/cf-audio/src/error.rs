//! Audio error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio device found")]
    NoDevice,

    #[error("Failed to get device config: {0}")]
    ConfigError(String),

    #[error("Failed to build stream: {0}")]
    StreamBuildError(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Audio output is unavailable")]
    Unavailable,

    #[error("WAV export failed: {0}")]
    Export(#[from] hound::Error),
}

pub type AudioResult<T> = Result<T, AudioError>;
