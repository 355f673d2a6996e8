//! Audio capture and processing.
//!
//! Handles microphone input capture, downmixing, resampling to 16kHz mono
//! for speech recognition, and WAV export of captured utterances.

use crate::error::{Result, VoiceError};
use audioadapter_buffers::direct::SequentialSliceOfVecs;
use rubato::audioadapter::Adapter;
use rubato::{Fft, FixedSync, Resampler};
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

/// Target sample rate for speech recognition models.
pub const TARGET_SAMPLE_RATE: u32 = 16000;

/// Audio buffer containing mono f32 samples at a known sample rate.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a new audio buffer.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create an empty buffer at the given sample rate.
    pub fn empty(sample_rate: u32) -> Self {
        Self {
            samples: Vec::new(),
            sample_rate,
        }
    }

    /// Duration of the buffer in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Append samples from another buffer. Panics if sample rates don't match.
    pub fn append(&mut self, other: &AudioBuffer) {
        assert_eq!(
            self.sample_rate, other.sample_rate,
            "Cannot append buffers with different sample rates"
        );
        self.samples.extend_from_slice(&other.samples);
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Peak absolute amplitude of a slice of samples.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Convert multi-channel interleaved samples to mono by averaging all channels.
pub fn to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels == 1 {
        return samples.to_vec();
    }

    let channels = channels as usize;
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Strip leading and trailing silence from an utterance.
///
/// Scans `window`-sized blocks and keeps everything from the first to the
/// last block whose peak reaches `threshold`. Returns the input unchanged
/// when no block does.
pub fn trim_silence(samples: &[f32], threshold: f32, window: usize) -> Vec<f32> {
    let window = window.max(1);

    let first = samples
        .chunks(window)
        .position(|chunk| peak(chunk) >= threshold);

    let Some(first) = first else {
        return samples.to_vec();
    };

    let last = samples
        .chunks(window)
        .rposition(|chunk| peak(chunk) >= threshold)
        .unwrap_or(first);

    let start = first * window;
    let end = ((last + 1) * window).min(samples.len());
    samples[start..end].to_vec()
}

/// Write mono f32 samples to a 16-bit PCM WAV file.
pub fn write_wav(path: impl AsRef<Path>, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path.as_ref(), spec)
        .map_err(|e| VoiceError::Audio(format!("Failed to create WAV file: {e}")))?;

    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        writer
            .write_sample(value)
            .map_err(|e| VoiceError::Audio(format!("Failed to write WAV sample: {e}")))?;
    }

    writer
        .finalize()
        .map_err(|e| VoiceError::Audio(format!("Failed to finalize WAV file: {e}")))?;

    Ok(())
}

/// Resampler for converting audio between sample rates.
pub struct AudioResampler {
    resampler: Fft<f32>,
    chunk_size_in: usize,
    chunk_size_out: usize,
}

impl AudioResampler {
    /// Create a new resampler.
    ///
    /// # Arguments
    /// * `input_rate` - Input sample rate in Hz
    /// * `output_rate` - Output sample rate in Hz
    /// * `chunk_size` - Number of input samples per processing chunk
    pub fn new(input_rate: u32, output_rate: u32, chunk_size: usize) -> Result<Self> {
        let resampler = Fft::new(
            input_rate as usize,
            output_rate as usize,
            chunk_size,
            1, // sub_chunks
            1, // channels
            FixedSync::Input,
        )
        .map_err(|e| VoiceError::Audio(format!("Failed to create resampler: {e}")))?;

        let chunk_size_out = resampler.output_frames_max();

        Ok(Self {
            resampler,
            chunk_size_in: chunk_size,
            chunk_size_out,
        })
    }

    /// Resample audio data. Trailing samples short of a full chunk are
    /// zero-padded through the resampler.
    pub fn process(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let mut output = Vec::new();

        for chunk in input.chunks(self.chunk_size_in) {
            let mut padded;
            let chunk = if chunk.len() == self.chunk_size_in {
                chunk
            } else {
                padded = chunk.to_vec();
                padded.resize(self.chunk_size_in, 0.0);
                &padded[..]
            };

            let input_vecs = vec![chunk.to_vec()];
            let input_adapter =
                SequentialSliceOfVecs::new(&input_vecs, 1, chunk.len()).expect("valid input");
            let resampled = self
                .resampler
                .process(&input_adapter, 0, None)
                .map_err(|e| VoiceError::Audio(format!("Resampling failed: {e}")))?;

            for frame_idx in 0..resampled.frames() {
                output.push(resampled.read_sample(0, frame_idx).unwrap_or(0.0));
            }
        }

        Ok(output)
    }

    /// Get the required input chunk size.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size_in
    }

    /// Get the output chunk size for a given input chunk.
    pub fn output_chunk_size(&self) -> usize {
        self.chunk_size_out
    }
}

/// A source of mono audio samples.
///
/// The recognizer reads from this seam so tests can drive it with scripted
/// audio instead of a live microphone.
pub trait AudioSource {
    /// Native sample rate of the source in Hz.
    fn sample_rate(&self) -> u32;

    /// Blocking read of the next batch of mono samples.
    ///
    /// Returns `Some(samples)` when data arrived (possibly empty when the
    /// wait timed out with nothing buffered), or `None` when the source has
    /// ended and no further data will come.
    fn read(&mut self, timeout: Duration) -> Option<Vec<f32>>;
}

/// Audio capture from the default input device.
pub struct MicSource {
    stream: cpal::Stream,
    receiver: mpsc::Receiver<Vec<f32>>,
    sample_rate: u32,
    channels: u16,
}

impl MicSource {
    /// Start capturing audio from the default input device.
    pub fn start() -> Result<Self> {
        use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| VoiceError::AudioDevice("No input device available".to_string()))?;

        let config = device.default_input_config().map_err(|e| {
            VoiceError::AudioDevice(format!("Failed to get default input config: {e}"))
        })?;

        let sample_rate = config.sample_rate();
        let channels = config.channels();

        let (sender, receiver) = mpsc::channel();

        let err_fn = |err| tracing::error!(error = %err, "Audio stream error");

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config.into(),
                move |data: &[f32], _| {
                    let _ = sender.send(data.to_vec());
                },
                err_fn,
                None,
            ),
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config.into(),
                move |data: &[i16], _| {
                    let samples: Vec<f32> = data.iter().map(|&s| s as f32 / 32768.0).collect();
                    let _ = sender.send(samples);
                },
                err_fn,
                None,
            ),
            cpal::SampleFormat::U16 => device.build_input_stream(
                &config.into(),
                move |data: &[u16], _| {
                    let samples: Vec<f32> = data
                        .iter()
                        .map(|&s| (s as f32 - 32768.0) / 32768.0)
                        .collect();
                    let _ = sender.send(samples);
                },
                err_fn,
                None,
            ),
            format => {
                return Err(VoiceError::AudioDevice(format!(
                    "Unsupported sample format: {format:?}"
                )));
            }
        }
        .map_err(|e| VoiceError::AudioDevice(format!("Failed to build input stream: {e}")))?;

        stream
            .play()
            .map_err(|e| VoiceError::AudioDevice(format!("Failed to start audio stream: {e}")))?;

        Ok(Self {
            stream,
            receiver,
            sample_rate,
            channels,
        })
    }

    /// Get the number of channels of the input device.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Stop the audio stream.
    pub fn stop(self) {
        use cpal::traits::StreamTrait;
        let _ = self.stream.pause();
        drop(self);
    }
}

impl AudioSource for MicSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read(&mut self, timeout: Duration) -> Option<Vec<f32>> {
        let mut all_samples = match self.receiver.recv_timeout(timeout) {
            Ok(samples) => samples,
            Err(mpsc::RecvTimeoutError::Timeout) => return Some(Vec::new()),
            Err(mpsc::RecvTimeoutError::Disconnected) => return None,
        };

        // Drain whatever else has accumulated
        while let Ok(samples) = self.receiver.try_recv() {
            all_samples.extend(samples);
        }

        Some(to_mono(&all_samples, self.channels))
    }
}

#[cfg(test)]
#[path = "audio_test.rs"]
mod tests;
