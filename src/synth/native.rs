//! Native synthesis backend using the tts crate.
//!
//! The tts crate provides a unified interface to Speech Dispatcher on
//! Linux, AVFoundation on macOS, and SAPI on Windows.

use super::{NORMAL_RATE_WPM, SpeechBackend};
use crate::error::{Result, VoiceError};
use std::time::Duration;
use tracing::{debug, warn};
use tts::Tts;

/// How often playback completion is polled.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Native text-to-speech backend.
pub struct NativeBackend {
    tts: Tts,
}

impl NativeBackend {
    /// Initialize the platform's speech engine.
    pub fn new() -> Result<Self> {
        debug!("Initializing native speech engine");

        let tts = Tts::default()
            .map_err(|e| VoiceError::AudioDevice(format!("Failed to initialize speech engine: {e}")))?;

        Ok(Self { tts })
    }

    /// Map words per minute onto the platform's rate range.
    ///
    /// The platform's normal rate is taken to be `NORMAL_RATE_WPM`; other
    /// rates scale linearly and clamp to the supported range.
    fn platform_rate(&self, wpm: u32) -> f32 {
        let normal = self.tts.normal_rate();
        let scaled = normal * (wpm as f32 / NORMAL_RATE_WPM as f32);
        scaled.clamp(self.tts.min_rate(), self.tts.max_rate())
    }
}

impl SpeechBackend for NativeBackend {
    fn set_rate_wpm(&mut self, wpm: u32) -> Result<()> {
        let features = self.tts.supported_features();
        if !features.rate {
            warn!("Rate control not supported on this platform");
            return Ok(());
        }

        let rate = self.platform_rate(wpm);
        debug!(wpm = wpm, platform_rate = rate, "Setting speaking rate");

        self.tts
            .set_rate(rate)
            .map_err(|e| VoiceError::Synthesis(format!("Failed to set rate: {e}")))?;

        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        let features = self.tts.supported_features();
        if !features.volume {
            warn!("Volume control not supported on this platform");
            return Ok(());
        }

        debug!(volume = volume, "Setting volume");

        self.tts
            .set_volume(volume)
            .map_err(|e| VoiceError::Synthesis(format!("Failed to set volume: {e}")))?;

        Ok(())
    }

    fn set_voice_index(&mut self, idx: usize) -> Result<()> {
        let voices = self
            .tts
            .voices()
            .map_err(|e| VoiceError::Synthesis(format!("Failed to list voices: {e}")))?;

        if let Some(voice) = voices.get(idx) {
            debug!(index = idx, voice = ?voice, "Selecting voice");
            self.tts
                .set_voice(voice)
                .map_err(|e| VoiceError::Synthesis(format!("Failed to set voice: {e}")))?;
        } else {
            warn!(
                index = idx,
                available = voices.len(),
                "Voice index out of range, keeping default voice"
            );
        }

        Ok(())
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        self.tts
            .speak(text, false)
            .map_err(|e| VoiceError::Synthesis(format!("Speak failed: {e}")))?;

        // Block until playback has finished, where the platform lets us
        // observe it. Engines that can't report playback state return as
        // soon as the utterance is queued.
        let features = self.tts.supported_features();
        if features.is_speaking {
            std::thread::sleep(POLL_INTERVAL);
            while self
                .tts
                .is_speaking()
                .map_err(|e| VoiceError::Synthesis(format!("Failed to query playback state: {e}")))?
            {
                std::thread::sleep(POLL_INTERVAL);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Requires a working speech engine; absent in CI
    #[test]
    #[ignore]
    fn test_native_backend_initializes() {
        let backend = NativeBackend::new();
        assert!(backend.is_ok(), "TTS init failed: {:?}", backend.err());
    }
}
