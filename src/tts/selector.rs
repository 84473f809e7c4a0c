use super::interface::{ResolvedModelPaths, Result, TtsError};
use super::model_id::ModelId;
use super::model_manager::ModelRegistry;
use std::sync::Arc;
use tracing::{debug, info};

/// Vocoder used when a model's metadata names none.
pub const DEFAULT_VOCODER: &str = "vocoder_models/universal/libri-tts/fullband-melgan";

/// Strip the region from a language tag: `en-us` → `en`.
pub fn normalize_language(language: &str) -> &str {
    language.split('-').next().unwrap_or(language)
}

/// Pick a model for `language` from `models`, scanned in registry order.
///
/// Selection algorithm:
///   1. A model matches when its language field contains the normalized
///      language as a substring
///   2. The first match named `preferred_model` wins immediately
///   3. Otherwise the LAST match scanned is returned, since every ordinary
///      match overwrites the previous one
///   4. No match → `None`
///
/// Rule 3 can land on a vocoder entry, because the registry lists vocoders
/// alongside acoustic models. Hosts depend on this ordering, so it stays.
pub fn select_model<'a>(
    models: &'a [ModelId],
    language: &str,
    preferred_model: &str,
) -> Option<&'a ModelId> {
    let language = normalize_language(language);
    let mut selected = None;
    for model in models {
        debug!("{}|{}", model.language, model.name);
        if model.language.contains(language) {
            selected = Some(model);
            if model.name == preferred_model {
                break;
            }
        }
    }
    selected
}

/// What one resolve call asks the selector for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCriteria {
    pub requested_language: String,
    pub preferred_model: String,
}

impl SelectionCriteria {
    pub fn select<'a>(&self, models: &'a [ModelId]) -> Option<&'a ModelId> {
        select_model(models, &self.requested_language, &self.preferred_model)
    }
}

/// Resolves a language to local model + vocoder artifacts.
///
/// The identifier list is fetched once at construction and reused for every
/// resolve. Downloads are delegated to the registry; nothing here retries or
/// locks the cache.
pub struct ModelSelector {
    registry: Arc<dyn ModelRegistry>,
    models: Vec<ModelId>,
    preferred_model: String,
}

impl ModelSelector {
    pub async fn new(registry: Arc<dyn ModelRegistry>, preferred_model: String) -> Result<Self> {
        let models = registry
            .list_models()
            .await?
            .iter()
            .map(|m| m.parse::<ModelId>())
            .collect::<Result<Vec<_>>>()?;
        debug!("Registry lists {} models", models.len());
        Ok(Self {
            registry,
            models,
            preferred_model,
        })
    }

    /// Choose a model identifier without touching the registry.
    pub fn select(&self, language: &str) -> Result<&ModelId> {
        let criteria = SelectionCriteria {
            requested_language: language.to_string(),
            preferred_model: self.preferred_model.clone(),
        };
        criteria
            .select(&self.models)
            .ok_or_else(|| TtsError::ModelNotFound(criteria.requested_language))
    }

    /// Choose a model for `language` and make it and its vocoder available
    /// locally.
    pub async fn resolve(&self, language: &str) -> Result<ResolvedModelPaths> {
        let model_id = self.select(language)?.clone();
        info!("Selected model {} for language {}", model_id, language);

        let model = self.registry.download_model(&model_id).await?;

        let vocoder_id: ModelId = model
            .item
            .default_vocoder
            .as_deref()
            .unwrap_or(DEFAULT_VOCODER)
            .parse()?;
        debug!("Using vocoder {}", vocoder_id);
        let vocoder = self.registry.download_model(&vocoder_id).await?;

        Ok(ResolvedModelPaths {
            model_id,
            model_path: model.model_path,
            model_config_path: model.config_path,
            vocoder_path: vocoder.model_path,
            vocoder_config_path: vocoder.config_path,
        })
    }
}
