//! Whisper transcription backend.
//!
//! Uses whisper.cpp via whisper-rs for speech-to-text.

use super::Transcriber;
use crate::error::{Result, VoiceError};
use std::path::Path;
use tracing::{debug, info};
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperState,
};

/// Whisper speech-to-text transcriber.
///
/// The underlying WhisperContext is leaked intentionally - the model stays
/// loaded for the process lifetime. This avoids complex self-referential
/// struct patterns while allowing the state to be reused across utterances.
pub struct WhisperTranscriber {
    state: WhisperState,
    language: Option<String>,
}

impl WhisperTranscriber {
    /// Create a new Whisper transcriber.
    ///
    /// Fails with `ModelUnavailable` when the artifact cannot be loaded.
    ///
    /// # Arguments
    /// * `model_path` - Path to the Whisper GGML model file
    /// * `language` - Language code (e.g., "en") or None for auto-detect
    pub fn new(model_path: impl AsRef<Path>, language: Option<String>) -> Result<Self> {
        let model_path = model_path.as_ref();

        info!(
            path = %model_path.display(),
            language = ?language,
            "Loading speech model"
        );

        let path_str = model_path.to_str().ok_or_else(|| {
            VoiceError::ModelUnavailable(format!("Invalid model path: {}", model_path.display()))
        })?;

        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| {
                VoiceError::ModelUnavailable(format!(
                    "Failed to load model from {}: {e}",
                    model_path.display()
                ))
            })?;

        // Box and leak the context to get a 'static reference; the model
        // stays loaded for the process lifetime.
        let ctx_ref: &'static WhisperContext = Box::leak(Box::new(ctx));

        let state = ctx_ref.create_state().map_err(|e| {
            VoiceError::ModelUnavailable(format!("Failed to create decoder state: {e}"))
        })?;

        info!("Speech model loaded");

        Ok(Self { state, language })
    }

    /// Get the configured language.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&mut self, audio: &[f32], sample_rate: u32) -> Result<String> {
        debug!(
            samples = audio.len(),
            sample_rate = sample_rate,
            duration_secs = audio.len() as f32 / sample_rate as f32,
            "Transcribing utterance"
        );

        // Whisper expects 16kHz audio
        if sample_rate != 16000 {
            return Err(VoiceError::Audio(format!(
                "Whisper expects 16kHz audio, got {sample_rate}Hz. Resample before calling transcribe."
            )));
        }

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        // Configure language (None = auto-detect)
        params.set_language(self.language.as_deref());

        // Disable printing to stdout
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        // One utterance per call, so a single segment suffices
        params.set_single_segment(true);

        self.state
            .full(params, audio)
            .map_err(|e| VoiceError::Audio(format!("Whisper inference failed: {e}")))?;

        // Collect all segments
        let num_segments = self.state.full_n_segments();
        let mut result = String::new();

        for i in 0..num_segments {
            if let Some(segment) = self.state.get_segment(i) {
                if let Ok(text) = segment.to_str_lossy() {
                    result.push_str(&text);
                }
            }
        }

        debug!(text_len = result.len(), "Transcription complete");

        Ok(result.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_model_unavailable() {
        let result = WhisperTranscriber::new("/nonexistent/friday2-stt-ftwb.bin", None);
        assert!(matches!(
            result,
            Err(VoiceError::ModelUnavailable(_))
        ));
    }
}
