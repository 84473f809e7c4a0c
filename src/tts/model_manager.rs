use super::config::PluginConfig;
use super::interface::{Result, TtsError};
use super::model_id::ModelId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Manifest shipped with the crate, used when no `models_file` is configured.
const BUNDLED_MANIFEST: &str = include_str!("../../resources/models.json");

// ── Registry Types ─────────────────────────────────────

/// Registry metadata for a single model. Unknown keys are kept in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelItem {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub github_rls_url: Option<String>,
    #[serde(default)]
    pub default_vocoder: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct DownloadedModel {
    pub model_path: PathBuf,
    pub config_path: PathBuf,
    pub item: ModelItem,
}

/// Source of model identifiers and local model artifacts.
#[async_trait]
pub trait ModelRegistry: Send + Sync {
    /// All identifiers as `type/language/dataset/name`, in registry order.
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Make the model available locally, downloading it if absent.
    async fn download_model(&self, id: &ModelId) -> Result<DownloadedModel>;
}

// ── ModelManager ───────────────────────────────────────

/// Manifest-backed registry that downloads zipped model releases into a
/// local cache, one folder per model.
///
/// Manifest layout: `{ type: { language: { dataset: { name: item } } } }`.
/// Document order is registry order.
pub struct ModelManager {
    manifest: Map<String, Value>,
    output_prefix: PathBuf,
    client: reqwest::Client,
}

impl ModelManager {
    pub fn new(manifest_json: &str, output_prefix: impl Into<PathBuf>) -> Result<Self> {
        let manifest = match serde_json::from_str::<Value>(manifest_json)? {
            Value::Object(map) => map,
            _ => {
                return Err(TtsError::ConfigError(
                    "model manifest must be a JSON object".into(),
                ))
            }
        };
        Ok(Self {
            manifest,
            output_prefix: output_prefix.into(),
            client: reqwest::Client::new(),
        })
    }

    pub fn bundled(output_prefix: impl Into<PathBuf>) -> Result<Self> {
        Self::new(BUNDLED_MANIFEST, output_prefix)
    }

    pub fn from_file(path: &Path, output_prefix: impl Into<PathBuf>) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TtsError::ConfigError(format!(
                "cannot read model manifest {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::new(&content, output_prefix)
    }

    pub fn from_config(config: &PluginConfig) -> Result<Self> {
        let output_prefix = config.resolve_cache_dir();
        match config.models_file {
            Some(ref path) => Self::from_file(path, output_prefix),
            None => Self::bundled(output_prefix),
        }
    }

    fn identifiers(&self) -> Vec<String> {
        let mut ids = Vec::new();
        for (model_type, langs) in &self.manifest {
            let Some(langs) = langs.as_object() else { continue };
            for (lang, datasets) in langs {
                let Some(datasets) = datasets.as_object() else { continue };
                for (dataset, models) in datasets {
                    let Some(models) = models.as_object() else { continue };
                    for name in models.keys() {
                        ids.push(format!("{}/{}/{}/{}", model_type, lang, dataset, name));
                    }
                }
            }
        }
        ids
    }

    fn model_item(&self, id: &ModelId) -> Result<ModelItem> {
        let item = self
            .manifest
            .get(&id.model_type)
            .and_then(|v| v.get(&id.language))
            .and_then(|v| v.get(&id.dataset))
            .and_then(|v| v.get(&id.name))
            .ok_or_else(|| TtsError::ModelNotFound(id.to_string()))?;
        Ok(serde_json::from_value(item.clone())?)
    }

    async fn fetch(&self, url: &str) -> Result<reqwest::Response> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TtsError::DownloadFailed(format!(
                "{} returned {}",
                url, status
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl ModelRegistry for ModelManager {
    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(self.identifiers())
    }

    async fn download_model(&self, id: &ModelId) -> Result<DownloadedModel> {
        let item = self.model_item(id)?;
        let output_path = self.output_prefix.join(id.cache_folder());

        if tokio::fs::try_exists(&output_path).await? {
            info!("{} is already downloaded.", id);
        } else {
            let url = item.github_rls_url.as_deref().ok_or_else(|| {
                TtsError::DownloadFailed(format!("{} has no download url", id))
            })?;
            info!("Downloading model to {}", output_path.display());
            let archive = self.fetch(url).await?.bytes().await?;
            debug!("Fetched {} bytes for {}", archive.len(), id);

            tokio::fs::create_dir_all(&output_path).await?;
            let target = output_path.clone();
            let extracted = tokio::task::spawn_blocking(move || {
                extract_flat(&archive, &target)?;
                update_paths(&target)
            })
            .await
            .map_err(|e| TtsError::DownloadFailed(format!("extract task failed: {}", e)))?;
            if let Err(e) = extracted {
                // A half-written folder would be mistaken for a finished download.
                let _ = tokio::fs::remove_dir_all(&output_path).await;
                return Err(e);
            }
        }

        let (model_path, config_path) = locate_artifacts(&output_path).await?;
        Ok(DownloadedModel {
            model_path,
            config_path,
            item,
        })
    }
}

/// Unpack every file of a zip archive directly into `dir`, dropping any
/// folder structure inside the archive.
fn extract_flat(data: &[u8], dir: &Path) -> Result<()> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let file_name = match entry
            .enclosed_name()
            .and_then(|p| p.file_name().map(|n| n.to_owned()))
        {
            Some(name) => name,
            None => continue,
        };
        let mut outfile = std::fs::File::create(dir.join(file_name))?;
        std::io::copy(&mut entry, &mut outfile)?;
    }
    Ok(())
}

/// Side files a release may ship next to its `config.json`, and the config
/// entries that should point at them.
const SIDE_FILES: &[(&str, &[&str])] = &[
    ("scale_stats.npy", &["audio.stats_path"]),
    (
        "speakers.json",
        &[
            "speakers_file",
            "model_args.speakers_file",
            "d_vector_file",
            "model_args.d_vector_file",
        ],
    ),
    (
        "speakers.pth",
        &[
            "speakers_file",
            "model_args.speakers_file",
            "d_vector_file",
            "model_args.d_vector_file",
        ],
    ),
];

/// Repoint paths in a freshly extracted `config.json` at the side files
/// unpacked beside it. Release configs carry the paths of the machine that
/// trained the model. Only entries the config already declares are changed.
fn update_paths(dir: &Path) -> Result<()> {
    let config_path = dir.join("config.json");
    if !config_path.is_file() {
        return Ok(());
    }

    let mut config: Value = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;
    let mut changed = false;
    for (file, fields) in SIDE_FILES {
        let local = dir.join(file);
        if !local.is_file() {
            continue;
        }
        for field in fields.iter() {
            if set_existing(&mut config, field, &local.to_string_lossy()) {
                debug!("Set {} to {}", field, local.display());
                changed = true;
            }
        }
    }

    if changed {
        std::fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    }
    Ok(())
}

/// Replace the value at a dotted `field` path, if that entry exists.
fn set_existing(config: &mut Value, field: &str, value: &str) -> bool {
    let mut node = config;
    let mut keys = field.split('.').peekable();
    while let Some(key) = keys.next() {
        let Some(child) = node.get_mut(key) else {
            return false;
        };
        if keys.peek().is_none() {
            *child = Value::String(value.to_string());
            return true;
        }
        node = child;
    }
    false
}

/// Find `config.json` and the checkpoint (`*.pth` / `*.pth.tar`) in a
/// model folder.
async fn locate_artifacts(dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let config_path = dir.join("config.json");
    if !tokio::fs::try_exists(&config_path).await? {
        return Err(TtsError::DownloadFailed(format!(
            "no config.json in {}",
            dir.display()
        )));
    }

    let mut checkpoints = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.ends_with(".pth") || name.ends_with(".pth.tar") {
            checkpoints.push(entry.path());
        }
    }
    checkpoints.sort();

    let model_path = checkpoints.into_iter().next().ok_or_else(|| {
        TtsError::DownloadFailed(format!("no model checkpoint in {}", dir.display()))
    })?;
    Ok((model_path, config_path))
}
