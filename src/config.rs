//! Configuration management for friday.
//!
//! Handles loading, saving, and providing defaults for the voice I/O
//! configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub recognizer: RecognizerConfig,
    pub synthesizer: SynthesizerConfig,
    pub logging: LoggingConfig,
}

/// Configuration for the speech recognition model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Stock whisper.cpp model to fetch when no explicit path is given.
    pub model: SpeechModel,
    /// Language to transcribe. The assistant's fine-tuned model is
    /// English-only, so this defaults to "en"; use "auto" to let the
    /// model detect.
    pub language: String,
    /// Explicit path to a GGML model file (e.g. the fine-tuned Friday
    /// model). Overrides `model` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
}

/// Supported stock speech recognition models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SpeechModel {
    WhisperTiny,
    WhisperTinyEn,
    WhisperBase,
    #[default]
    WhisperBaseEn,
    WhisperSmall,
    WhisperSmallEn,
}

/// Configuration for utterance capture and endpointing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Emit per-utterance diagnostics (listening / speech detected /
    /// recording stopped) at debug level.
    pub debug: bool,
    /// Peak amplitude (0.0-1.0 full scale) below which a chunk counts as
    /// silence.
    pub silence_threshold: f32,
    /// Seconds of consecutive silence that end an utterance.
    pub silence_hang_secs: f32,
    /// Samples per endpointing chunk at 16kHz.
    pub chunk_samples: usize,
    /// Give up listening after this many seconds without speech.
    /// Absent means wait indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_timeout_secs: Option<f32>,
    /// Write each captured utterance to a WAV file in the data directory.
    pub dump_audio: bool,
}

/// Configuration for speech synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Log each spoken message at info level.
    pub debug: bool,
    /// Speaking rate in words per minute. Must be positive.
    pub rate_wpm: u32,
    /// Playback volume, 0.0-1.0.
    pub volume: f32,
    /// Voice to select, as an index into the platform's voice list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_index: Option<usize>,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: LogLevel,
}

/// Log verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to a tracing filter directive string for this crate.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "friday_voice=error",
            LogLevel::Warn => "friday_voice=warn",
            LogLevel::Info => "friday_voice=info",
            LogLevel::Debug => "friday_voice=debug",
            LogLevel::Trace => "friday_voice=trace",
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: SpeechModel::default(),
            language: "en".to_string(),
            model_path: None,
        }
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            debug: true,
            silence_threshold: 0.03,
            silence_hang_secs: 3.0,
            chunk_samples: 1024,
            listen_timeout_secs: None,
            dump_audio: false,
        }
    }
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            debug: true,
            rate_wpm: 150,
            volume: 1.0,
            voice_index: None,
        }
    }
}

impl Config {
    /// Returns the default config directory path.
    /// `~/.config/friday/` (or `$XDG_CONFIG_HOME/friday/`)
    pub fn config_dir() -> Result<PathBuf> {
        crate::dirs::config_dir()
    }

    /// Returns the default config file path.
    /// `~/.config/friday/config.toml`
    pub fn config_path() -> Result<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// Returns the default data directory path.
    /// `~/.local/share/friday/` (or `$XDG_DATA_HOME/friday/`)
    pub fn data_dir() -> Result<PathBuf> {
        crate::dirs::data_dir()
    }

    /// Returns the default models directory path.
    /// `~/.local/share/friday/models/`
    pub fn models_dir() -> Result<PathBuf> {
        Self::data_dir().map(|p| p.join("models"))
    }

    /// Load configuration from the default path.
    /// Returns defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file as TOML")
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
