//! End-to-end tests for the voice pipeline, driven by WAV fixtures and
//! deterministic backends instead of live audio hardware.

use std::collections::VecDeque;
use std::time::Duration;

use friday_voice::audio::AudioSource;
use friday_voice::config::{Config, RecognizerConfig};
use friday_voice::error::VoiceError;
use friday_voice::synth::SpeechBackend;
use friday_voice::transcribe::Transcriber;
use friday_voice::{SpeechRecognizer, VoiceSynthesizer};
use tokio_util::sync::CancellationToken;

const SAMPLE_RATE: u32 = 16000;

/// Write a WAV fixture containing silence, a 440Hz tone, then silence.
fn write_fixture(path: &std::path::Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).expect("create fixture");

    let silence = (0.3 * SAMPLE_RATE as f32) as usize;
    let tone = (0.5 * SAMPLE_RATE as f32) as usize;

    for _ in 0..silence {
        writer.write_sample(0i16).unwrap();
    }
    for i in 0..tone {
        let sample =
            (2.0 * std::f32::consts::PI * 440.0 * i as f32 / SAMPLE_RATE as f32).sin() * 0.5;
        writer.write_sample((sample * 32767.0) as i16).unwrap();
    }
    for _ in 0..silence {
        writer.write_sample(0i16).unwrap();
    }

    writer.finalize().unwrap();
}

/// Load WAV file as f32 samples.
fn load_wav_samples(path: &std::path::Path) -> Vec<f32> {
    let mut reader = hound::WavReader::open(path).expect("open fixture");
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, SAMPLE_RATE);

    reader
        .samples::<i16>()
        .map(|s| s.unwrap() as f32 / 32768.0)
        .collect()
}

/// Audio source serving pre-recorded samples in fixed-size batches.
struct WavSource {
    sample_rate: u32,
    batches: VecDeque<Vec<f32>>,
}

impl WavSource {
    fn new(samples: &[f32], sample_rate: u32, batch: usize) -> Self {
        Self {
            sample_rate,
            batches: samples.chunks(batch).map(<[f32]>::to_vec).collect(),
        }
    }
}

impl AudioSource for WavSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read(&mut self, _timeout: Duration) -> Option<Vec<f32>> {
        self.batches.pop_front()
    }
}

/// Deterministic stand-in for the recognition model.
struct KeywordTranscriber {
    utterance: &'static str,
}

impl Transcriber for KeywordTranscriber {
    fn transcribe(&mut self, audio: &[f32], sample_rate: u32) -> friday_voice::Result<String> {
        assert_eq!(sample_rate, SAMPLE_RATE);
        assert!(!audio.is_empty(), "transcriber fed empty audio");
        Ok(self.utterance.to_string())
    }
}

/// Deterministic timing backend for synthesis.
#[derive(Default)]
struct TimingBackend {
    rate_wpm: u32,
    playback: std::sync::Arc<std::sync::Mutex<Option<Duration>>>,
}

impl SpeechBackend for TimingBackend {
    fn set_rate_wpm(&mut self, wpm: u32) -> friday_voice::Result<()> {
        self.rate_wpm = wpm;
        Ok(())
    }

    fn set_volume(&mut self, _volume: f32) -> friday_voice::Result<()> {
        Ok(())
    }

    fn set_voice_index(&mut self, _idx: usize) -> friday_voice::Result<()> {
        Ok(())
    }

    fn speak(&mut self, text: &str) -> friday_voice::Result<()> {
        let words = text.split_whitespace().count() as f32;
        *self.playback.lock().unwrap() =
            Some(Duration::from_secs_f32(words / self.rate_wpm as f32 * 60.0));
        Ok(())
    }
}

#[test]
fn recognizes_utterance_from_wav_fixture() {
    let temp = tempfile::TempDir::new().unwrap();
    let fixture = temp.path().join("turn_on_the_lights.wav");
    write_fixture(&fixture);

    let samples = load_wav_samples(&fixture);
    let mut source = WavSource::new(&samples, SAMPLE_RATE, 1600);

    let config = RecognizerConfig {
        silence_hang_secs: 0.2,
        ..Default::default()
    };
    let mut recognizer = SpeechRecognizer::with_transcriber(
        config,
        Box::new(KeywordTranscriber {
            utterance: "Turn on the lights",
        }),
    );

    let text = recognizer
        .transcribe_from(&mut source, &CancellationToken::new())
        .unwrap();

    assert_eq!(text.to_lowercase(), "turn on the lights");
}

#[test]
fn silent_fixture_never_reaches_the_model() {
    let samples = vec![0.0f32; SAMPLE_RATE as usize];
    let mut source = WavSource::new(&samples, SAMPLE_RATE, 1600);

    let mut recognizer = SpeechRecognizer::with_transcriber(
        RecognizerConfig::default(),
        Box::new(KeywordTranscriber { utterance: "nope" }),
    );

    let result = recognizer.transcribe_from(&mut source, &CancellationToken::new());

    assert!(matches!(result, Err(VoiceError::Audio(_))));
}

#[test]
fn synthesizer_playback_duration_matches_rate() {
    let config = Config::parse(
        r#"
[synthesizer]
rate_wpm = 150
debug = false
"#,
    )
    .unwrap();

    let backend = TimingBackend::default();
    let playback = backend.playback.clone();

    let mut synth =
        VoiceSynthesizer::with_backend(config.synthesizer, Box::new(backend)).unwrap();

    synth.speak("hello world").unwrap();

    // 2 words at 150 wpm = 0.8 seconds
    let duration = playback.lock().unwrap().expect("backend spoke");
    let expected = Duration::from_secs_f32(2.0 / 150.0 * 60.0);
    assert!(duration.abs_diff(expected) < Duration::from_millis(10));
    assert_eq!(synth.rate_wpm(), 150);
}

#[test]
fn invalid_rate_from_config_is_rejected() {
    let config = Config::parse(
        r#"
[synthesizer]
rate_wpm = 0
"#,
    )
    .unwrap();

    let result =
        VoiceSynthesizer::with_backend(config.synthesizer, Box::new(TimingBackend::default()));

    assert!(matches!(
        result,
        Err(VoiceError::InvalidConfiguration(_))
    ));
}
