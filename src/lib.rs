pub mod audio;
pub mod config;
pub mod dirs;
pub mod error;
pub mod models;
pub mod recognizer;
pub mod synth;
pub mod synthesizer;
pub mod transcribe;
pub mod vad;

pub use error::{Result, VoiceError};
pub use recognizer::SpeechRecognizer;
pub use synthesizer::VoiceSynthesizer;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Application-specific environment variable for log filtering (overrides config).
const LOG_ENV_VAR: &str = "FRIDAY_LOG";

/// Entry point for the `friday` binary: configures logging, resolves the
/// speech model, and runs the voice loop until interrupted.
pub async fn run() -> anyhow::Result<()> {
    let config = config::Config::load().unwrap_or_default();

    // FRIDAY_LOG env var overrides config file level
    let filter = EnvFilter::builder()
        .with_env_var(LOG_ENV_VAR)
        .with_default_directive(config.logging.level.as_directive().parse()?)
        .from_env()?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Route whisper.cpp and GGML logs through tracing
    whisper_rs::install_logging_hooks();

    // Resolve the recognition model, with download progress on first run
    let manager = models::ModelManager::new()?;
    let progress = ProgressBar::no_length();
    progress.set_style(ProgressStyle::with_template(
        "{bytes}/{total_bytes} {wide_bar} {eta}",
    )?);

    let model_path = manager
        .resolve(&config.model, &|done, total| {
            if let Some(total) = total {
                progress.set_length(total);
            }
            progress.set_position(done);
        })
        .await
        .context("Failed to resolve speech model")?;
    progress.finish_and_clear();

    let recognizer = SpeechRecognizer::new(config.recognizer.clone(), &config.model, &model_path)
        .context("Failed to initialize speech recognizer")?;
    let synthesizer = VoiceSynthesizer::new(config.synthesizer.clone())
        .context("Failed to initialize voice synthesizer")?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            signal_cancel.cancel();
        }
    });

    // Audio I/O is blocking; keep it off the async runtime
    tokio::task::spawn_blocking(move || voice_loop(recognizer, synthesizer, &cancel))
        .await
        .context("Voice loop panicked")??;

    Ok(())
}

/// Greet, then echo each utterance back until cancelled.
fn voice_loop(
    mut recognizer: SpeechRecognizer,
    mut synthesizer: VoiceSynthesizer,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    synthesizer.speak("All systems online.")?;

    while !cancel.is_cancelled() {
        let text = recognizer.transcribe_with_cancel(cancel)?;
        if text.is_empty() {
            continue;
        }

        info!(text = %text, "Heard");
        synthesizer.speak(&text)?;
    }

    info!("Voice loop stopped");
    Ok(())
}
