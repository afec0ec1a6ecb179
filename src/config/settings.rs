use super::{ConfigError, DEFAULT_STATE_DIR};
use crate::context::ContextLimits;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const MODEL_ENDPOINT_ENV: &str = "TASKRAILS_MODEL_ENDPOINT";
pub const MODEL_API_KEY_ENV: &str = "TASKRAILS_API_KEY";
pub const MODEL_ID_ENV: &str = "TASKRAILS_MODEL";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_state_root")]
    pub state_root: PathBuf,
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub project: ProjectSettings,
    #[serde(default)]
    pub context: ContextLimits,
    #[serde(default)]
    pub prompt: PromptSettings,
    #[serde(default)]
    pub remote: RemoteSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            state_root: default_state_root(),
            model: ModelSettings::default(),
            project: ProjectSettings::default(),
            context: ContextLimits::default(),
            prompt: PromptSettings::default(),
            remote: RemoteSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: default_api_key(),
            model: default_model(),
            temperature: default_temperature(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProjectSettings {
    #[serde(default = "default_memory_bank")]
    pub memory_bank: PathBuf,
    #[serde(default = "default_flow_file")]
    pub flow_file: PathBuf,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            memory_bank: default_memory_bank(),
            flow_file: default_flow_file(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PromptSettings {
    #[serde(default)]
    pub template_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RemoteSettings {
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            step_delay_ms: default_step_delay_ms(),
        }
    }
}

fn default_state_root() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_DIR)
}

fn default_endpoint() -> String {
    "http://localhost:1234/v1".to_string()
}

fn default_api_key() -> String {
    "lm-studio".to_string()
}

fn default_model() -> String {
    "qwen2.5-coder-7b-instruct".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_read_timeout_ms() -> u64 {
    300_000
}

fn default_memory_bank() -> PathBuf {
    PathBuf::from("memory-bank")
}

fn default_flow_file() -> PathBuf {
    PathBuf::from("project_flow.mmd")
}

fn default_step_delay_ms() -> u64 {
    1_500
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Applies `TASKRAILS_MODEL_ENDPOINT`, `TASKRAILS_API_KEY` and `TASKRAILS_MODEL`.
    pub fn apply_env_overrides(&mut self) {
        let read = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        if let Some(endpoint) = read(MODEL_ENDPOINT_ENV) {
            self.model.endpoint = endpoint;
        }
        if let Some(api_key) = read(MODEL_API_KEY_ENV) {
            self.model.api_key = api_key;
        }
        if let Some(model) = read(MODEL_ID_ENV) {
            self.model.model = model;
        }
    }

    /// Rebases every relative path onto `base`.
    pub fn anchor_paths(&mut self, base: &Path) {
        let anchor = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        anchor(&mut self.state_root);
        anchor(&mut self.project.memory_bank);
        anchor(&mut self.project.flow_file);
        if let Some(template) = self.prompt.template_path.as_mut() {
            anchor(template);
        }
    }

    /// Endpoint and model id are checked when the model client is built, so a
    /// bad value leaves the inspection commands usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::Settings(format!(
                "`model.temperature` must be within 0.0..=2.0, got {}",
                self.model.temperature
            )));
        }
        if self.model.read_timeout_ms == 0 {
            return Err(ConfigError::Settings(
                "`model.read_timeout_ms` must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn event_log_path(&self) -> PathBuf {
        self.state_root.join("logs/session.log")
    }
}
