//! Error taxonomy for the voice I/O boundary.

use std::time::Duration;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, VoiceError>;

/// Errors surfaced by the recognizer and synthesizer.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// No usable audio input/output device, or the device refused to open.
    #[error("audio device unavailable: {0}")]
    AudioDevice(String),

    /// The speech recognition model could not be located or loaded.
    #[error("speech model unavailable: {0}")]
    ModelUnavailable(String),

    /// No speech was detected within the configured listen timeout.
    #[error("no speech detected within {0:?}")]
    RecognitionTimeout(Duration),

    /// A construction parameter was out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `speak` was called with an empty (or whitespace-only) message.
    #[error("refusing to speak an empty message")]
    EmptyMessage,

    /// The synthesis engine rejected or failed a request.
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    /// Audio processing failed after capture (resampling, decoding).
    #[error("audio processing failed: {0}")]
    Audio(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
