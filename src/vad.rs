//! Speech endpointing by energy gating.
//!
//! Detects utterance boundaries from per-chunk peak amplitude: recording
//! starts on the first chunk above the silence threshold and ends after a
//! run of consecutive silent chunks.

use tracing::{debug, trace};

/// Default peak amplitude (full scale 0.0-1.0) separating speech from
/// silence. Matches a threshold of 1000 on 16-bit samples.
pub const DEFAULT_THRESHOLD: f32 = 0.03;

/// Default seconds of consecutive silence that end an utterance.
pub const DEFAULT_HANG_SECS: f32 = 3.0;

/// Endpointer event indicating speech state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadEvent {
    /// Speech started.
    SpeechStart,
    /// Speech ended.
    SpeechEnd,
}

/// Configuration for the endpointer state machine.
#[derive(Debug, Clone)]
pub struct VadConfig {
    /// Peak amplitude at or above which a chunk counts as speech.
    pub threshold: f32,
    /// Minimum consecutive speech chunks before triggering SpeechStart.
    pub min_speech_chunks: usize,
    /// Minimum consecutive silence chunks before triggering SpeechEnd.
    pub min_silence_chunks: usize,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_speech_chunks: 1,
            min_silence_chunks: chunks_for_duration(DEFAULT_HANG_SECS, 16000, 1024),
        }
    }
}

/// Number of chunks spanning `secs` of audio.
pub fn chunks_for_duration(secs: f32, sample_rate: u32, chunk_size: usize) -> usize {
    ((secs * sample_rate as f32) / chunk_size as f32) as usize
}

/// State machine tracking speech/silence transitions from chunk peaks.
#[derive(Debug)]
pub struct VadStateMachine {
    config: VadConfig,
    is_speaking: bool,
    speech_chunk_count: usize,
    silence_chunk_count: usize,
}

impl VadStateMachine {
    /// Create a new endpointer state machine.
    pub fn new(config: VadConfig) -> Self {
        Self {
            config,
            is_speaking: false,
            speech_chunk_count: 0,
            silence_chunk_count: 0,
        }
    }

    /// Process one chunk's peak amplitude and return any state change event.
    pub fn process(&mut self, peak: f32) -> Option<VadEvent> {
        let is_speech = peak >= self.config.threshold;

        trace!(
            peak = peak,
            threshold = self.config.threshold,
            is_speech = is_speech,
            speaking = self.is_speaking,
            speech_chunks = self.speech_chunk_count,
            silence_chunks = self.silence_chunk_count,
            "Endpointer processing chunk"
        );

        if is_speech {
            self.speech_chunk_count += 1;
            self.silence_chunk_count = 0;

            if !self.is_speaking && self.speech_chunk_count >= self.config.min_speech_chunks {
                self.is_speaking = true;
                debug!("Speech started");
                return Some(VadEvent::SpeechStart);
            }
        } else {
            self.silence_chunk_count += 1;
            self.speech_chunk_count = 0;

            if self.is_speaking && self.silence_chunk_count >= self.config.min_silence_chunks {
                self.is_speaking = false;
                debug!("Speech ended");
                return Some(VadEvent::SpeechEnd);
            }
        }

        None
    }

    /// Check if currently in speaking state.
    pub fn is_speaking(&self) -> bool {
        self.is_speaking
    }

    /// Reset the state machine.
    pub fn reset(&mut self) {
        self.is_speaking = false;
        self.speech_chunk_count = 0;
        self.silence_chunk_count = 0;
    }
}

#[cfg(test)]
#[path = "vad_test.rs"]
mod tests;
