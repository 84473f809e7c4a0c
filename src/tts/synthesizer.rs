use super::interface::{Result, TtsError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Mono audio produced by a synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Everything a synthesizer is bound to at construction. Mirrors the
/// engine's eight positional settings; empty paths mean "feature disabled".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesizerConfig {
    pub model_path: PathBuf,
    pub model_config_path: PathBuf,
    pub speakers_file_path: PathBuf,
    pub vocoder_path: PathBuf,
    pub vocoder_config_path: PathBuf,
    pub encoder_path: PathBuf,
    pub encoder_config_path: PathBuf,
    pub use_gpu: bool,
}

// ── Synthesizer Traits ─────────────────────────────────

/// Runtime bound to one acoustic model / vocoder pair.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Run inference over `text`.
    async fn tts(&self, text: &str) -> Result<Waveform>;

    /// Persist a waveform as 16-bit PCM WAV. Nothing is cleaned up if the
    /// write fails part way.
    async fn save_wav(&self, waveform: &Waveform, path: &Path) -> Result<()> {
        let waveform = waveform.clone();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || write_wav(&waveform, &path))
            .await
            .map_err(|e| TtsError::SynthesisFailed(format!("WAV writer task failed: {}", e)))?
    }
}

/// Builds synthesizers. Called once per speak request.
#[async_trait]
pub trait SynthesizerFactory: Send + Sync {
    async fn build(&self, config: SynthesizerConfig) -> Result<Box<dyn Synthesizer>>;
}

// ── WAV I/O ────────────────────────────────────────────

/// Write `waveform` as mono 16-bit PCM, peak-normalized to full scale.
pub fn write_wav(waveform: &Waveform, path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let peak = waveform
        .samples
        .iter()
        .fold(0.0f32, |acc, s| acc.max(s.abs()));
    let scale = i16::MAX as f32 / peak.max(0.01);

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in &waveform.samples {
        let scaled = (sample * scale).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        writer.write_sample(scaled)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Decode a WAV file into a mono waveform, averaging channels.
pub fn read_wav(path: &Path) -> Result<Waveform> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()?,
        hound::SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<std::result::Result<Vec<f32>, _>>()?
        }
    };

    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok(Waveform::new(samples, spec.sample_rate))
}
