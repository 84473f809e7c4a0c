use super::cli_backend::locate_engine;
use super::interface::{Result, TtsError};
use std::path::PathBuf;

/// Checks the host runs before handing utterances to a plugin.
pub trait TtsValidator: Send + Sync {
    /// Fails when the synthesis engine is not installed.
    fn validate_dependencies(&self) -> Result<()>;

    fn validate_lang(&self) -> Result<()>;

    fn validate_connection(&self) -> Result<()>;

    /// Run every check, stopping at the first failure.
    fn validate(&self) -> Result<()> {
        self.validate_dependencies()?;
        self.validate_lang()?;
        self.validate_connection()
    }
}

pub struct NeuralTtsValidator {
    tts_bin: Option<PathBuf>,
}

impl NeuralTtsValidator {
    pub fn new(tts_bin: Option<PathBuf>) -> Self {
        Self { tts_bin }
    }
}

impl TtsValidator for NeuralTtsValidator {
    fn validate_dependencies(&self) -> Result<()> {
        match locate_engine(self.tts_bin.as_deref()) {
            Some(_) => Ok(()),
            None => Err(TtsError::MissingDependency(
                "neural TTS engine not installed, please run pip install TTS".into(),
            )),
        }
    }

    // Every language is accepted until the host supplies a whitelist.
    fn validate_lang(&self) -> Result<()> {
        Ok(())
    }

    // Synthesis is local.
    fn validate_connection(&self) -> Result<()> {
        Ok(())
    }
}
