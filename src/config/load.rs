use super::{default_config_path, ConfigError, Settings};
use std::path::Path;

pub fn load_settings() -> Result<Settings, ConfigError> {
    let path = default_config_path()?;
    load_settings_from(&path)
}

/// A missing file is not an error; defaults apply.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let mut settings = if path.exists() {
        Settings::from_path(path)?
    } else {
        Settings::default()
    };
    settings.apply_env_overrides();

    let base = match path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        Some(parent) => parent.to_path_buf(),
        None => std::env::current_dir().map_err(ConfigError::WorkingDirectoryUnavailable)?,
    };
    settings.anchor_paths(&base);
    settings.validate()?;
    Ok(settings)
}
