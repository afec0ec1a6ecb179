use crate::config::ConfigError;
use std::path::PathBuf;

pub const CONFIG_PATH_ENV: &str = "TASKRAILS_CONFIG";
pub const DEFAULT_CONFIG_FILE_NAME: &str = "taskrails.yaml";
pub const DEFAULT_STATE_DIR: &str = ".taskrails";

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let cwd = std::env::current_dir().map_err(ConfigError::WorkingDirectoryUnavailable)?;
    Ok(cwd.join(DEFAULT_CONFIG_FILE_NAME))
}
