pub mod config;
pub mod tts;

use crate::config::HostConfig;
use crate::tts::{PluginRegistry, Result, TtsPlugin};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber honoring `RUST_LOG` (default `info`).
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Host entry point: read the host config, check the named plugin's
/// dependencies, then construct it from the default registry.
pub async fn load_plugin(
    name: &str,
    lang: &str,
    host_config_path: &Path,
) -> Result<Box<dyn TtsPlugin>> {
    let host = HostConfig::load(host_config_path);
    PluginRegistry::default().load(name, lang, &host).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::TtsError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_engine_fails_before_any_download() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("models");
        let host_path = tmp.path().join("host.json");
        let host = serde_json::json!({
            "tts": {
                "neural_local": {
                    "tts_bin": "/definitely/not/here/tts",
                    "model_cache_dir": cache,
                }
            }
        });
        std::fs::write(&host_path, host.to_string()).unwrap();

        let err = load_plugin("neural_local", "en-us", &host_path)
            .await
            .err()
            .unwrap();

        assert!(matches!(err, TtsError::MissingDependency(_)));
        assert!(!cache.exists(), "no model may be fetched");
    }

    #[tokio::test]
    async fn unknown_plugin_name_is_reported() {
        let tmp = TempDir::new().unwrap();
        let err = load_plugin("mystery", "en-us", &tmp.path().join("absent.json"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, TtsError::PluginNotFound(name) if name == "mystery"));
    }
}
