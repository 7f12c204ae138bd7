//! Configuration system for diabrisk.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> CLI args.
//! Configuration is loaded from `~/.config/diabrisk/config.toml` and/or `.diabrisk/config.toml`
//! in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiabriskConfig {
    #[serde(default)]
    pub artifact: ArtifactConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where the trained model artifact lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Path to the JSON artifact, relative paths resolve against the workspace.
    #[serde(default = "default_artifact_path")]
    pub path: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            path: default_artifact_path(),
        }
    }
}

fn default_artifact_path() -> PathBuf {
    PathBuf::from("diabetes_model.json")
}

/// The patient dataset shown alongside the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
    /// Field delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Rows returned by the dataset preview when none are requested.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            delimiter: default_delimiter(),
            preview_rows: default_preview_rows(),
        }
    }
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("diabetes_dataset.csv")
}

fn default_delimiter() -> char {
    ','
}

fn default_preview_rows() -> usize {
    10
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on preview rows a client may request.
    #[serde(default = "default_max_preview_rows")]
    pub max_preview_rows: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_preview_rows: default_max_preview_rows(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_max_preview_rows() -> usize {
    500
}

/// Values supplied on the command line; `None` leaves lower layers untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub artifact_path: Option<PathBuf>,
    pub dataset_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl ConfigOverrides {
    fn to_value(&self) -> serde_json::Value {
        let mut root = serde_json::Map::new();
        let mut section = |name: &str, key: &str, value: serde_json::Value| {
            root.entry(name.to_string())
                .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()))
                .as_object_mut()
                .map(|m| m.insert(key.to_string(), value));
        };
        if let Some(p) = &self.artifact_path {
            section("artifact", "path", serde_json::json!(p));
        }
        if let Some(p) = &self.dataset_path {
            section("dataset", "path", serde_json::json!(p));
        }
        if let Some(h) = &self.host {
            section("server", "host", serde_json::json!(h));
        }
        if let Some(p) = self.port {
            section("server", "port", serde_json::json!(p));
        }
        serde_json::Value::Object(root)
    }
}

impl DiabriskConfig {
    /// Make relative file paths absolute against `workspace`.
    pub fn resolve_paths(mut self, workspace: &Path) -> Self {
        if self.artifact.path.is_relative() {
            self.artifact.path = workspace.join(&self.artifact.path);
        }
        if self.dataset.path.is_relative() {
            self.dataset.path = workspace.join(&self.dataset.path);
        }
        self
    }
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "diabrisk", "diabrisk")
        .map(|d| d.config_dir().join("config.toml"))
}

fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".diabrisk").join("config.toml")
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (CLI flags)
/// 2. Environment variables (prefixed with `DIABRISK_`)
/// 3. Workspace-local config (`.diabrisk/config.toml`)
/// 4. User config (`~/.config/diabrisk/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&ConfigOverrides>,
) -> Result<DiabriskConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(DiabriskConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // DIABRISK_SERVER__PORT, DIABRISK_ARTIFACT__PATH, ...
    figment = figment.merge(Env::prefixed("DIABRISK_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides.to_value()));
    }

    let config: DiabriskConfig = figment.extract().map_err(Box::new)?;
    Ok(match workspace {
        Some(ws) => config.resolve_paths(ws),
        None => config,
    })
}

/// Check whether any diabrisk configuration file exists.
pub fn config_exists(workspace: Option<&Path>) -> bool {
    if user_config_path().is_some_and(|p| p.exists()) {
        return true;
    }
    workspace.is_some_and(|ws| workspace_config_path(ws).exists())
}
