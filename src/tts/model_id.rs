use super::interface::TtsError;
use std::fmt;
use std::str::FromStr;

/// A registry identifier of the form `type/language/dataset/name`,
/// e.g. `tts_models/en/ljspeech/tacotron2-DDC`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelId {
    pub model_type: String,
    pub language: String,
    pub dataset: String,
    pub name: String,
}

impl ModelId {
    pub fn new(model_type: &str, language: &str, dataset: &str, name: &str) -> Self {
        Self {
            model_type: model_type.to_string(),
            language: language.to_string(),
            dataset: dataset.to_string(),
            name: name.to_string(),
        }
    }

    /// Folder name used for this model inside the local cache.
    pub fn cache_folder(&self) -> String {
        format!(
            "{}--{}--{}--{}",
            self.model_type, self.language, self.dataset, self.name
        )
    }
}

impl FromStr for ModelId {
    type Err = TtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [model_type, language, dataset, name]
                if parts.iter().all(|p| !p.is_empty()) =>
            {
                Ok(Self::new(model_type, language, dataset, name))
            }
            _ => Err(TtsError::InvalidModelId(s.to_string())),
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.model_type, self.language, self.dataset, self.name
        )
    }
}
