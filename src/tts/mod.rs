pub mod cli_backend;
pub mod config;
pub mod interface;
pub mod markup;
pub mod model_id;
pub mod model_manager;
pub mod neural;
pub mod registry;
pub mod selector;
pub mod synthesizer;
pub mod validator;

#[cfg(test)]
mod tests;

pub use config::PluginConfig;
pub use interface::{
    Phonemes, ResolvedModelPaths, Result, SpeakRequest, SpeakerOptions, TtsError, TtsPlugin,
};
pub use model_id::ModelId;
pub use model_manager::{DownloadedModel, ModelItem, ModelManager, ModelRegistry};
pub use neural::{NeuralLocalTts, PLUGIN_NAME};
pub use registry::PluginRegistry;
pub use selector::{ModelSelector, SelectionCriteria, DEFAULT_VOCODER};
pub use synthesizer::{Synthesizer, SynthesizerConfig, SynthesizerFactory, Waveform};
pub use validator::{NeuralTtsValidator, TtsValidator};
