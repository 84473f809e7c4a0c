use crate::tts::config::PluginConfig;
use crate::tts::interface::{Result, TtsError};
use crate::tts::model_id::ModelId;
use crate::tts::model_manager::{DownloadedModel, ModelItem, ModelRegistry};
use crate::tts::neural::NeuralLocalTts;
use crate::tts::synthesizer::{Synthesizer, SynthesizerConfig, SynthesizerFactory, Waveform};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::Span;

// ── Fake registry ───────────────────────────────────────────

/// Registry that "downloads" by writing placeholder artifacts under `root`.
pub struct FakeRegistry {
    models: Vec<String>,
    vocoders: HashMap<String, String>,
    root: PathBuf,
    downloads: Mutex<Vec<String>>,
}

impl FakeRegistry {
    pub fn new(models: &[&str], root: &Path) -> Self {
        Self {
            models: models.iter().map(|m| m.to_string()).collect(),
            vocoders: HashMap::new(),
            root: root.to_path_buf(),
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_vocoder(mut self, model: &str, vocoder: &str) -> Self {
        self.vocoders.insert(model.to_string(), vocoder.to_string());
        self
    }

    /// Every identifier passed to `download_model`, in call order.
    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelRegistry for FakeRegistry {
    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(self.models.clone())
    }

    async fn download_model(&self, id: &ModelId) -> Result<DownloadedModel> {
        self.downloads.lock().unwrap().push(id.to_string());

        let dir = self.root.join(id.cache_folder());
        std::fs::create_dir_all(&dir)?;
        let model_path = dir.join("model_file.pth");
        std::fs::write(&model_path, b"weights")?;
        let config_path = dir.join("config.json");
        std::fs::write(&config_path, b"{}")?;

        Ok(DownloadedModel {
            model_path,
            config_path,
            item: ModelItem {
                default_vocoder: self.vocoders.get(&id.to_string()).cloned(),
                ..Default::default()
            },
        })
    }
}

// ── Fake synthesizer ────────────────────────────────────────

/// Records every synthesizer it builds and every text spoken through them.
#[derive(Default)]
pub struct FakeSynthesizerFactory {
    built: Arc<Mutex<Vec<SynthesizerConfig>>>,
    spoken: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl FakeSynthesizerFactory {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn built(&self) -> Vec<SynthesizerConfig> {
        self.built.lock().unwrap().clone()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl SynthesizerFactory for FakeSynthesizerFactory {
    async fn build(&self, config: SynthesizerConfig) -> Result<Box<dyn Synthesizer>> {
        self.built.lock().unwrap().push(config);
        Ok(Box::new(FakeSynthesizer {
            spoken: self.spoken.clone(),
            fail: self.fail,
        }))
    }
}

struct FakeSynthesizer {
    spoken: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

#[async_trait]
impl Synthesizer for FakeSynthesizer {
    async fn tts(&self, text: &str) -> Result<Waveform> {
        self.spoken.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(TtsError::SynthesisFailed("injected failure".into()));
        }
        Ok(sine(440.0, 0.1, 16_000))
    }
}

/// A short tone, enough to produce a non-trivial WAV.
pub fn sine(freq: f32, secs: f32, sample_rate: u32) -> Waveform {
    let n = (secs * sample_rate as f32) as usize;
    let samples = (0..n)
        .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
        .collect();
    Waveform::new(samples, sample_rate)
}

// ── Plugin setup ────────────────────────────────────────────

pub const EN_DE_MODELS: &[&str] = &[
    "tts_models/en/ek1/tacotron2",
    "tts_models/en/ljspeech/tacotron2-DDC",
    "tts_models/en/ljspeech/glow-tts",
    "tts_models/de/thorsten/tacotron2-DCA",
];

/// Build a plugin over fakes rooted in `root`.
pub async fn build_plugin(
    lang: &str,
    models: &[&str],
    root: &Path,
    synths: FakeSynthesizerFactory,
) -> Result<(NeuralLocalTts, Arc<FakeRegistry>, Arc<FakeSynthesizerFactory>)> {
    crate::init_tracing();
    let registry = Arc::new(FakeRegistry::new(models, root));
    let synths = Arc::new(synths);
    let plugin = NeuralLocalTts::with_backends(
        lang,
        PluginConfig::default(),
        registry.clone(),
        synths.clone(),
        Span::none(),
    )
    .await?;
    Ok((plugin, registry, synths))
}

// ── Archives ────────────────────────────────────────────────

/// Zip `files` in memory, as a model release would be packaged.
pub fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in files {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}
