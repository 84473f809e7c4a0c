//! Shared config utilities for loading JSON config files
//! and the host-wide configuration plugins read their sections from.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Host-wide configuration. Each TTS plugin owns the `tts.<plugin name>`
/// section; everything else belongs to the host and is ignored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub tts: HashMap<String, serde_json::Value>,
}

impl HostConfig {
    pub fn load(path: &Path) -> Self {
        load_json_config(path, "Host")
    }
}

/// Generic load for any Serde config type with a `Default` implementation.
/// Falls back to `T::default()` if the file is missing or unparsable.
pub fn load_json_config<T: DeserializeOwned + Default>(path: &Path, label: &str) -> T {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<T>(&content) {
            Ok(config) => {
                info!(target: "config", "[{}] Loaded config from {}", label, path.display());
                config
            }
            Err(e) => {
                warn!(
                    target: "config",
                    "[{}] Failed to parse config {}: {}, using defaults",
                    label,
                    path.display(),
                    e
                );
                T::default()
            }
        },
        Err(_) => {
            info!(
                target: "config",
                "[{}] No config file at {}, using defaults",
                label,
                path.display()
            );
            T::default()
        }
    }
}
