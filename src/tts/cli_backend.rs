use super::config::PluginConfig;
use super::interface::{Result, TtsError};
use super::synthesizer::{read_wav, Synthesizer, SynthesizerConfig, SynthesizerFactory, Waveform};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Executable name of the neural TTS engine.
pub const DEFAULT_TTS_BIN: &str = "tts";

/// Find the engine executable: an explicit path must exist, otherwise the
/// name is looked up on PATH.
pub fn locate_engine(configured: Option<&Path>) -> Option<PathBuf> {
    match configured {
        Some(path) if path.components().count() > 1 => {
            path.exists().then(|| path.to_path_buf())
        }
        Some(name) => which::which(name).ok(),
        None => which::which(DEFAULT_TTS_BIN).ok(),
    }
}

/// Neural synthesizer driven through the engine's command line.
///
/// Each `tts` call runs the engine once with the bound model paths, writing
/// into a scratch WAV that is decoded and then discarded.
pub struct CliSynthesizer {
    bin: PathBuf,
    config: SynthesizerConfig,
}

impl CliSynthesizer {
    pub fn new(bin: PathBuf, config: SynthesizerConfig) -> Self {
        Self { bin, config }
    }

    fn command(&self, text: &str, out_path: &Path) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.arg("--text").arg(text);
        cmd.arg("--model_path").arg(&self.config.model_path);
        cmd.arg("--config_path").arg(&self.config.model_config_path);
        cmd.arg("--vocoder_path").arg(&self.config.vocoder_path);
        cmd.arg("--vocoder_config_path")
            .arg(&self.config.vocoder_config_path);
        if !self.config.speakers_file_path.as_os_str().is_empty() {
            cmd.arg("--speakers_file_path")
                .arg(&self.config.speakers_file_path);
        }
        if !self.config.encoder_path.as_os_str().is_empty() {
            cmd.arg("--encoder_path").arg(&self.config.encoder_path);
            cmd.arg("--encoder_config_path")
                .arg(&self.config.encoder_config_path);
        }
        if self.config.use_gpu {
            cmd.arg("--use_cuda").arg("true");
        }
        cmd.arg("--out_path").arg(out_path);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }
}

#[async_trait]
impl Synthesizer for CliSynthesizer {
    async fn tts(&self, text: &str) -> Result<Waveform> {
        let scratch = tempfile::Builder::new()
            .prefix("tts_")
            .suffix(".wav")
            .tempfile()?;
        let out_path = scratch.path().to_path_buf();

        let mut cmd = self.command(text, &out_path);
        debug!(command = ?cmd, "Running neural TTS engine");
        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TtsError::MissingDependency(format!(
                    "engine `{}` not found",
                    self.bin.display()
                ))
            } else {
                TtsError::Io(e)
            }
        })?;

        if !output.status.success() {
            return Err(TtsError::SynthesisFailed(format!(
                "engine exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let waveform = tokio::task::spawn_blocking(move || read_wav(&out_path))
            .await
            .map_err(|e| TtsError::SynthesisFailed(format!("WAV reader task failed: {}", e)))??;
        drop(scratch);

        if waveform.is_empty() {
            return Err(TtsError::SynthesisFailed("engine produced no audio".into()));
        }
        Ok(waveform)
    }
}

/// Builds [`CliSynthesizer`]s for a fixed engine executable.
pub struct CliSynthesizerFactory {
    bin: PathBuf,
}

impl CliSynthesizerFactory {
    pub fn new(bin: PathBuf) -> Self {
        Self { bin }
    }

    pub fn from_config(config: &PluginConfig) -> Self {
        Self::new(
            config
                .tts_bin
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TTS_BIN)),
        )
    }
}

#[async_trait]
impl SynthesizerFactory for CliSynthesizerFactory {
    async fn build(&self, config: SynthesizerConfig) -> Result<Box<dyn Synthesizer>> {
        Ok(Box::new(CliSynthesizer::new(self.bin.clone(), config)))
    }
}
