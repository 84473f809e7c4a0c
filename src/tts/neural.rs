use super::cli_backend::CliSynthesizerFactory;
use super::config::PluginConfig;
use super::interface::{Phonemes, ResolvedModelPaths, Result, SpeakRequest, TtsPlugin};
use super::markup::format_speak_tags;
use super::model_manager::{ModelManager, ModelRegistry};
use super::selector::ModelSelector;
use super::synthesizer::{Synthesizer, SynthesizerConfig, SynthesizerFactory};
use super::validator::{NeuralTtsValidator, TtsValidator};
use crate::config::HostConfig;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, Instrument, Span};

pub const PLUGIN_NAME: &str = "neural_local";

/// Local neural TTS plugin.
///
/// Every speak call resolves its model pair and builds a fresh synthesizer;
/// nothing but the model list and the preferred model name is kept between
/// calls. All work runs inline on the caller's task.
pub struct NeuralLocalTts {
    lang: String,
    selector: ModelSelector,
    synthesizers: Arc<dyn SynthesizerFactory>,
    validator: NeuralTtsValidator,
    span: Span,
}

impl NeuralLocalTts {
    /// Build the plugin with the manifest-backed registry and the CLI engine.
    /// `config` falls back to the host's `tts.neural_local` section.
    pub async fn new(lang: &str, config: Option<PluginConfig>, host: &HostConfig) -> Result<Self> {
        let config = match config {
            Some(config) => config,
            None => PluginConfig::from_host(host, PLUGIN_NAME)?,
        };
        let registry = Arc::new(ModelManager::from_config(&config)?);
        let synthesizers = Arc::new(CliSynthesizerFactory::from_config(&config));
        let span = info_span!("tts_plugin", plugin = PLUGIN_NAME);
        Self::with_backends(lang, config, registry, synthesizers, span).await
    }

    /// Build the plugin on explicit backends, logging under `span`.
    ///
    /// The default language is resolved eagerly so a usable model is on disk
    /// before the first utterance.
    pub async fn with_backends(
        lang: &str,
        config: PluginConfig,
        registry: Arc<dyn ModelRegistry>,
        synthesizers: Arc<dyn SynthesizerFactory>,
        span: Span,
    ) -> Result<Self> {
        let selector = ModelSelector::new(registry, config.preferred_model.clone())
            .instrument(span.clone())
            .await?;
        let plugin = Self {
            lang: lang.to_string(),
            selector,
            synthesizers,
            validator: NeuralTtsValidator::new(config.tts_bin.clone()),
            span,
        };
        plugin
            .get_synthesizer(lang)
            .instrument(plugin.span.clone())
            .await?;
        Ok(plugin)
    }

    async fn get_synthesizer(&self, language: &str) -> Result<Box<dyn Synthesizer>> {
        let started = Instant::now();
        let paths = self.selector.resolve(language).await?;
        let synthesizer = self.synthesizers.build(synthesizer_config(&paths)).await?;
        debug!("Get synthesizer time={:?}", started.elapsed());
        Ok(synthesizer)
    }
}

/// Bind a synthesizer to resolved paths. Speaker embeddings, the speaker
/// encoder and GPU inference are always off.
fn synthesizer_config(paths: &ResolvedModelPaths) -> SynthesizerConfig {
    SynthesizerConfig {
        model_path: paths.model_path.clone(),
        model_config_path: paths.model_config_path.clone(),
        speakers_file_path: PathBuf::new(),
        vocoder_path: paths.vocoder_path.clone(),
        vocoder_config_path: paths.vocoder_config_path.clone(),
        encoder_path: PathBuf::new(),
        encoder_config_path: PathBuf::new(),
        use_gpu: false,
    }
}

#[async_trait]
impl TtsPlugin for NeuralLocalTts {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn lang(&self) -> &str {
        &self.lang
    }

    fn audio_ext(&self) -> &str {
        "wav"
    }

    async fn resolve(&self, language: &str) -> Result<ResolvedModelPaths> {
        self.selector
            .resolve(language)
            .instrument(self.span.clone())
            .await
    }

    async fn speak(&self, request: SpeakRequest) -> Result<(PathBuf, Phonemes)> {
        async move {
            let language = request
                .speaker
                .language
                .as_deref()
                .unwrap_or(&self.lang);

            let to_speak = format_speak_tags(&request.sentence);
            debug!("{}", to_speak);
            if to_speak.is_empty() {
                info!("Nothing to speak in {:?}", request.sentence);
                return Ok((request.output_path, None));
            }

            let synthesizer = self.get_synthesizer(language).await?;

            let started = Instant::now();
            let waveform = synthesizer.tts(&to_speak).await?;
            debug!("Synthesis time={:?}", started.elapsed());

            let started = Instant::now();
            synthesizer.save_wav(&waveform, &request.output_path).await?;
            debug!("File access time={:?}", started.elapsed());

            Ok((request.output_path, None))
        }
        .instrument(self.span.clone())
        .await
    }

    fn validator(&self) -> &dyn TtsValidator {
        &self.validator
    }
}
