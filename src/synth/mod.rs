//! Speech synthesis.
//!
//! This module provides a trait abstraction for synthesis backends and a
//! native implementation over the platform's text-to-speech engine.

use crate::error::Result;

mod native;

pub use native::NativeBackend;

/// Words per minute corresponding to the platform's normal speaking rate.
pub const NORMAL_RATE_WPM: u32 = 150;

/// Speech synthesis backend.
///
/// The synthesizer talks to this seam so the concrete engine can be swapped
/// or replaced with a deterministic test double.
pub trait SpeechBackend: Send {
    /// Set the speaking rate in words per minute.
    fn set_rate_wpm(&mut self, wpm: u32) -> Result<()>;

    /// Set playback volume, 0.0-1.0.
    fn set_volume(&mut self, volume: f32) -> Result<()>;

    /// Select a voice by index into the platform's voice list.
    fn set_voice_index(&mut self, idx: usize) -> Result<()>;

    /// Render text as audible speech, blocking until playback completes.
    fn speak(&mut self, text: &str) -> Result<()>;
}

/// Create the platform-appropriate synthesis backend.
pub fn create_backend() -> Result<Box<dyn SpeechBackend>> {
    Ok(Box::new(NativeBackend::new()?))
}
