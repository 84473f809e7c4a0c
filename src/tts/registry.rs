use super::config::PluginConfig;
use super::interface::{Result, TtsError, TtsPlugin};
use super::neural::{NeuralLocalTts, PLUGIN_NAME};
use super::validator::{NeuralTtsValidator, TtsValidator};
use crate::config::HostConfig;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use tracing::{info, warn};

pub type PluginFuture<'a> = Pin<Box<dyn Future<Output = Result<Box<dyn TtsPlugin>>> + Send + 'a>>;

/// Builds a plugin from `(language, explicit config, host config)`.
pub type PluginConstructor =
    for<'a> fn(String, Option<PluginConfig>, &'a HostConfig) -> PluginFuture<'a>;

/// Builds the validator a plugin would run, without constructing the plugin.
pub type ValidatorConstructor = fn(&PluginConfig) -> Box<dyn TtsValidator>;

#[derive(Clone, Copy)]
struct PluginEntry {
    construct: PluginConstructor,
    validator: ValidatorConstructor,
}

/// Typed table of TTS plugins the host looks up by name.
pub struct PluginRegistry {
    entries: HashMap<String, PluginEntry>,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(PLUGIN_NAME, construct_neural_local, neural_local_validator);
        registry
    }
}

impl PluginRegistry {
    /// An empty registry. Use `default()` for the built-in plugins.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a plugin. Overwrites if the name already exists.
    pub fn register(
        &mut self,
        name: &str,
        construct: PluginConstructor,
        validator: ValidatorConstructor,
    ) {
        let entry = PluginEntry {
            construct,
            validator,
        };
        if self.entries.insert(name.to_string(), entry).is_some() {
            warn!("[TTS] Replacing plugin constructor: {}", name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered plugin names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn entry(&self, name: &str) -> Result<PluginEntry> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| TtsError::PluginNotFound(name.to_string()))
    }

    /// Run the named plugin's checks against `config`.
    pub fn validate(&self, name: &str, config: &PluginConfig) -> Result<()> {
        (self.entry(name)?.validator)(config).validate()
    }

    /// Construct the plugin registered under `name`.
    pub async fn create(
        &self,
        name: &str,
        lang: &str,
        config: Option<PluginConfig>,
        host: &HostConfig,
    ) -> Result<Box<dyn TtsPlugin>> {
        let entry = self.entry(name)?;
        info!("[TTS] Creating plugin: {}", name);
        (entry.construct)(lang.to_string(), config, host).await
    }

    /// Read the plugin's `tts.<name>` section, validate, then construct.
    ///
    /// Construction may download models, so nothing is fetched for a plugin
    /// whose checks fail.
    pub async fn load(
        &self,
        name: &str,
        lang: &str,
        host: &HostConfig,
    ) -> Result<Box<dyn TtsPlugin>> {
        let config = PluginConfig::from_host(host, name)?;
        self.validate(name, &config)?;
        self.create(name, lang, Some(config), host).await
    }
}

fn construct_neural_local(
    lang: String,
    config: Option<PluginConfig>,
    host: &HostConfig,
) -> PluginFuture<'_> {
    Box::pin(async move {
        let plugin = NeuralLocalTts::new(&lang, config, host).await?;
        Ok(Box::new(plugin) as Box<dyn TtsPlugin>)
    })
}

fn neural_local_validator(config: &PluginConfig) -> Box<dyn TtsValidator> {
    Box::new(NeuralTtsValidator::new(config.tts_bin.clone()))
}
