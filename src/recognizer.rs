//! Speech recognizer: blocks until an utterance is heard on the input
//! device and returns its transcription.
//!
//! The recognizer owns and orchestrates:
//! - Audio capture from microphone
//! - Energy-based utterance endpointing
//! - Silence trimming and resampling to 16kHz
//! - Speech-to-text transcription

use crate::audio::{self, AudioResampler, AudioSource, MicSource, TARGET_SAMPLE_RATE};
use crate::config::{ModelConfig, RecognizerConfig};
use crate::error::{Result, VoiceError};
use crate::transcribe::{Transcriber, WhisperTranscriber};
use crate::vad::{self, VadConfig, VadEvent, VadStateMachine};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How long a single audio read waits before re-checking timeouts.
const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Blocking speech-to-text front end.
///
/// Created once with a loaded model and reused across utterances. Each
/// `transcribe` call opens the default input device, waits for speech,
/// records until trailing silence, and returns the decoded text.
pub struct SpeechRecognizer {
    config: RecognizerConfig,
    transcriber: Box<dyn Transcriber>,
}

impl SpeechRecognizer {
    /// Load the recognition model and prepare for capture.
    ///
    /// Fails fast with `ModelUnavailable` when the artifact at `model_path`
    /// cannot be loaded.
    pub fn new(
        config: RecognizerConfig,
        model: &ModelConfig,
        model_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let language = if model.language == "auto" {
            None
        } else {
            Some(model.language.clone())
        };

        let transcriber = WhisperTranscriber::new(model_path, language)?;
        Ok(Self::with_transcriber(config, Box::new(transcriber)))
    }

    /// Create a recognizer over a custom transcription backend.
    pub fn with_transcriber(config: RecognizerConfig, transcriber: Box<dyn Transcriber>) -> Self {
        Self { config, transcriber }
    }

    /// Listen on the default input device and transcribe one utterance.
    ///
    /// Blocks until speech is detected, recorded, and decoded. With no
    /// listen timeout configured this waits indefinitely for speech.
    pub fn transcribe(&mut self) -> Result<String> {
        self.transcribe_with_cancel(&CancellationToken::new())
    }

    /// Like `transcribe`, but abandons the capture when `cancel` fires.
    ///
    /// A cancelled call returns an empty string rather than an error.
    pub fn transcribe_with_cancel(&mut self, cancel: &CancellationToken) -> Result<String> {
        let mut source = MicSource::start()?;
        self.transcribe_from(&mut source, cancel)
    }

    /// Transcribe one utterance from an arbitrary audio source.
    pub fn transcribe_from(
        &mut self,
        source: &mut dyn AudioSource,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let source_rate = source.sample_rate();

        // Keep chunk duration constant across source rates
        let chunk_size = (self.config.chunk_samples as u64 * source_rate as u64
            / TARGET_SAMPLE_RATE as u64)
            .max(1) as usize;

        let mut endpointer = VadStateMachine::new(VadConfig {
            threshold: self.config.silence_threshold,
            min_speech_chunks: 1,
            min_silence_chunks: vad::chunks_for_duration(
                self.config.silence_hang_secs,
                source_rate,
                chunk_size,
            )
            .max(1),
        });

        if self.config.debug {
            info!("Listening for speech");
        }

        let deadline = self
            .config
            .listen_timeout_secs
            .map(|secs| Instant::now() + Duration::from_secs_f32(secs));

        let mut pending: Vec<f32> = Vec::new();
        let mut utterance: Vec<f32> = Vec::new();
        let mut recording = false;

        'listen: loop {
            if cancel.is_cancelled() {
                debug!("Capture cancelled");
                return Ok(String::new());
            }

            if !recording {
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        let timeout =
                            Duration::from_secs_f32(self.config.listen_timeout_secs.unwrap_or(0.0));
                        return Err(VoiceError::RecognitionTimeout(timeout));
                    }
                }
            }

            let Some(samples) = source.read(READ_TIMEOUT) else {
                // Source ended; an utterance in progress is still usable
                if recording {
                    break 'listen;
                }
                return Err(VoiceError::Audio(
                    "audio source ended before speech was detected".to_string(),
                ));
            };
            pending.extend(samples);

            while pending.len() >= chunk_size {
                let chunk: Vec<f32> = pending.drain(..chunk_size).collect();
                let peak = audio::peak(&chunk);

                if recording {
                    utterance.extend_from_slice(&chunk);
                }

                match endpointer.process(peak) {
                    Some(VadEvent::SpeechStart) => {
                        recording = true;
                        utterance.clear();
                        utterance.extend_from_slice(&chunk);
                        if self.config.debug {
                            debug!("Speech detected, recording");
                        }
                    }
                    Some(VadEvent::SpeechEnd) => {
                        break 'listen;
                    }
                    None => {}
                }
            }
        }

        if self.config.debug {
            debug!(
                samples = utterance.len(),
                duration_secs = utterance.len() as f32 / source_rate as f32,
                "Recording stopped"
            );
        }

        if utterance.is_empty() {
            return Ok(String::new());
        }

        let trimmed = audio::trim_silence(&utterance, self.config.silence_threshold, chunk_size);

        if self.config.dump_audio {
            self.dump_utterance(&trimmed, source_rate);
        }

        let samples_16k = if source_rate == TARGET_SAMPLE_RATE {
            trimmed
        } else {
            let mut resampler = AudioResampler::new(source_rate, TARGET_SAMPLE_RATE, 1024)?;
            resampler.process(&trimmed)?
        };

        let text = self
            .transcriber
            .transcribe(&samples_16k, TARGET_SAMPLE_RATE)?;

        if self.config.debug {
            info!(text = %text, "Transcription complete");
        }

        Ok(text)
    }

    /// Write the captured utterance to the data directory for inspection.
    fn dump_utterance(&self, samples: &[f32], sample_rate: u32) {
        match Self::dump_path() {
            Ok(path) => match audio::write_wav(&path, samples, sample_rate) {
                Ok(()) => debug!(path = %path.display(), "Wrote utterance dump"),
                Err(e) => warn!(error = %e, "Failed to write utterance dump"),
            },
            Err(e) => warn!(error = %e, "Failed to resolve utterance dump path"),
        }
    }

    fn dump_path() -> anyhow::Result<PathBuf> {
        let dir = crate::dirs::data_dir()?.join("captures");
        std::fs::create_dir_all(&dir)?;
        let stamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Ok(dir.join(format!("utterance-{stamp}.wav")))
    }
}

#[cfg(test)]
#[path = "recognizer_test.rs"]
mod tests;
