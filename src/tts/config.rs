use super::interface::{Result, TtsError};
use crate::config::HostConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PREFERRED_MODEL: &str = "tacotron2-DDC";

// ── Plugin Config ──────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Model name that wins over a plain language match
    #[serde(default = "default_preferred_model")]
    pub preferred_model: String,

    /// Alternative model manifest; the bundled one is used when unset
    #[serde(default)]
    pub models_file: Option<PathBuf>,

    /// Where downloaded models live. Falls back to `$TTS_HOME/tts`, then
    /// `tts` under the platform data dir.
    #[serde(default)]
    pub model_cache_dir: Option<PathBuf>,

    /// Synthesis engine executable, looked up on PATH when unset
    #[serde(default)]
    pub tts_bin: Option<PathBuf>,
}

fn default_preferred_model() -> String {
    DEFAULT_PREFERRED_MODEL.to_string()
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            preferred_model: default_preferred_model(),
            models_file: None,
            model_cache_dir: None,
            tts_bin: None,
        }
    }
}

impl PluginConfig {
    /// Look up this plugin's section in the host-wide config.
    /// A missing section yields the defaults.
    pub fn from_host(host: &HostConfig, plugin_name: &str) -> Result<Self> {
        match host.tts.get(plugin_name) {
            Some(section) => serde_json::from_value(section.clone()).map_err(|e| {
                TtsError::ConfigError(format!("invalid `tts.{}` section: {}", plugin_name, e))
            }),
            None => Ok(Self::default()),
        }
    }

    /// Resolve the model cache directory.
    pub fn resolve_cache_dir(&self) -> PathBuf {
        cache_dir_from(
            self.model_cache_dir.as_deref(),
            std::env::var_os("TTS_HOME").map(PathBuf::from),
        )
    }
}

/// `explicit`, else `<tts_home>/tts`, else `<data dir>/tts`. The engine keeps
/// its own cache at the same place, so downloads are shared with it.
fn cache_dir_from(explicit: Option<&Path>, tts_home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    let base = tts_home
        .filter(|home| !home.as_os_str().is_empty())
        .or_else(dirs_next::data_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("tts")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_section_uses_defaults() {
        let host = HostConfig::default();
        let config = PluginConfig::from_host(&host, "neural_local").unwrap();
        assert_eq!(config.preferred_model, "tacotron2-DDC");
        assert!(config.models_file.is_none());
    }

    #[test]
    fn section_overrides_preferred_model() {
        let mut host = HostConfig::default();
        host.tts.insert(
            "neural_local".to_string(),
            json!({ "preferred_model": "glow-tts" }),
        );
        let config = PluginConfig::from_host(&host, "neural_local").unwrap();
        assert_eq!(config.preferred_model, "glow-tts");
    }

    #[test]
    fn malformed_section_is_config_error() {
        let mut host = HostConfig::default();
        host.tts.insert(
            "neural_local".to_string(),
            json!({ "preferred_model": 42 }),
        );
        let err = PluginConfig::from_host(&host, "neural_local").unwrap_err();
        assert!(matches!(err, TtsError::ConfigError(_)));
    }

    #[test]
    fn explicit_cache_dir_wins() {
        let config = PluginConfig {
            model_cache_dir: Some(PathBuf::from("/tmp/models")),
            ..Default::default()
        };
        assert_eq!(config.resolve_cache_dir(), PathBuf::from("/tmp/models"));
    }

    #[test]
    fn tts_home_holds_a_tts_subfolder() {
        let dir = cache_dir_from(None, Some(PathBuf::from("/srv/coqui")));
        assert_eq!(dir, PathBuf::from("/srv/coqui/tts"));
    }

    #[test]
    fn explicit_cache_dir_beats_tts_home() {
        let dir = cache_dir_from(
            Some(Path::new("/tmp/models")),
            Some(PathBuf::from("/srv/coqui")),
        );
        assert_eq!(dir, PathBuf::from("/tmp/models"));
    }

    #[test]
    fn empty_tts_home_is_ignored() {
        let dir = cache_dir_from(None, Some(PathBuf::new()));
        assert_ne!(dir, PathBuf::from("tts"));
        assert!(dir.ends_with("tts"));
    }
}
