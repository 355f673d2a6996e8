//! Voice synthesizer: renders text as audible speech.

use crate::config::SynthesizerConfig;
use crate::error::{Result, VoiceError};
use crate::synth::{self, SpeechBackend};
use tracing::{debug, info};

/// Blocking text-to-speech front end.
///
/// Created once with a validated configuration and reused across messages.
/// `speak` blocks until the message has been fully vocalized.
pub struct VoiceSynthesizer {
    backend: Box<dyn SpeechBackend>,
    config: SynthesizerConfig,
}

impl VoiceSynthesizer {
    /// Initialize the platform speech engine with the given configuration.
    ///
    /// Fails with `InvalidConfiguration` when the speaking rate is zero or
    /// the volume is out of range, and with `AudioDevice` when no speech
    /// engine is available.
    pub fn new(config: SynthesizerConfig) -> Result<Self> {
        let backend = synth::create_backend()?;
        Self::with_backend(config, backend)
    }

    /// Create a synthesizer over a custom backend.
    pub fn with_backend(
        config: SynthesizerConfig,
        mut backend: Box<dyn SpeechBackend>,
    ) -> Result<Self> {
        if config.rate_wpm == 0 {
            return Err(VoiceError::InvalidConfiguration(
                "speaking rate must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&config.volume) {
            return Err(VoiceError::InvalidConfiguration(format!(
                "volume must be within 0.0-1.0, got {}",
                config.volume
            )));
        }

        backend.set_rate_wpm(config.rate_wpm)?;
        backend.set_volume(config.volume)?;
        if let Some(idx) = config.voice_index {
            backend.set_voice_index(idx)?;
        }

        Ok(Self { backend, config })
    }

    /// The configured speaking rate in words per minute.
    pub fn rate_wpm(&self) -> u32 {
        self.config.rate_wpm
    }

    /// Render `message` as speech, blocking until playback completes.
    ///
    /// Empty and whitespace-only messages are rejected with `EmptyMessage`.
    pub fn speak(&mut self, message: &str) -> Result<()> {
        if message.trim().is_empty() {
            return Err(VoiceError::EmptyMessage);
        }

        if self.config.debug {
            info!(message = %message, "friday: speaking");
        }

        self.backend.speak(message)?;

        debug!("Playback complete");
        Ok(())
    }
}

#[cfg(test)]
#[path = "synthesizer_test.rs"]
mod tests;
