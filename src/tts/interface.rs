use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use super::model_id::ModelId;
use super::validator::TtsValidator;

// ── Error Types ────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TtsError {
    #[error("No TTS model found for language: {0}")]
    ModelNotFound(String),
    #[error("Invalid model identifier: {0}")]
    InvalidModelId(String),
    #[error("Model download failed: {0}")]
    DownloadFailed(String),
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),
    #[error("TTS dependencies not installed: {0}")]
    MissingDependency(String),
    #[error("TTS config error: {0}")]
    ConfigError(String),
    #[error("TTS plugin not found: {0}")]
    PluginNotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TtsError>;

// ── Speak Requests ─────────────────────────────────────

/// Per-utterance options passed by the host alongside the sentence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeakerOptions {
    /// Overrides the plugin's configured language for this call only.
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SpeakRequest {
    pub sentence: String,
    pub output_path: PathBuf,
    pub speaker: SpeakerOptions,
}

impl SpeakRequest {
    pub fn new(sentence: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            sentence: sentence.into(),
            output_path: output_path.into(),
            speaker: SpeakerOptions::default(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.speaker.language = Some(language.into());
        self
    }
}

/// Second element of a speak result. The adapter never produces phoneme data,
/// so a successful call always carries `None` here.
pub type Phonemes = Option<String>;

// ── Resolved Artifacts ─────────────────────────────────

/// Local locations of an acoustic model and its vocoder, ready to be handed
/// to a synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModelPaths {
    pub model_id: ModelId,
    pub model_path: PathBuf,
    pub model_config_path: PathBuf,
    pub vocoder_path: PathBuf,
    pub vocoder_config_path: PathBuf,
}

// ── Plugin Trait ───────────────────────────────────────

/// Contract between a voice assistant host and a speech backend.
#[async_trait]
pub trait TtsPlugin: Send + Sync {
    /// Name the host registered this plugin under (e.g., "neural_local")
    fn name(&self) -> &str;

    /// Default language used when a request carries no override
    fn lang(&self) -> &str;

    /// File extension of the audio this plugin writes
    fn audio_ext(&self) -> &str;

    /// Locate (and fetch if needed) the model pair for a language
    async fn resolve(&self, language: &str) -> Result<ResolvedModelPaths>;

    /// Synthesize `request.sentence` into `request.output_path`.
    ///
    /// Returns the output path unchanged. If the sentence contains nothing
    /// speakable no file is written, so callers must check the file exists.
    async fn speak(&self, request: SpeakRequest) -> Result<(PathBuf, Phonemes)>;

    /// Validator the host runs before using the plugin
    fn validator(&self) -> &dyn TtsValidator;
}
