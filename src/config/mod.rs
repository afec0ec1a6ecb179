pub mod error;
pub mod load;
pub mod paths;
pub mod settings;

pub use error::ConfigError;
pub use load::{load_settings, load_settings_from};
pub use paths::{
    default_config_path, CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE_NAME, DEFAULT_STATE_DIR,
};
pub use settings::{
    ModelSettings, ProjectSettings, PromptSettings, RemoteSettings, Settings, MODEL_API_KEY_ENV,
    MODEL_ENDPOINT_ENV, MODEL_ID_ENV,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_model_env() {
        std::env::remove_var(MODEL_ENDPOINT_ENV);
        std::env::remove_var(MODEL_API_KEY_ENV);
        std::env::remove_var(MODEL_ID_ENV);
    }

    #[test]
    fn missing_config_file_yields_defaults_anchored_at_parent() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_model_env();
        let dir = tempdir().expect("tempdir");

        let settings = load_settings_from(&dir.path().join("taskrails.yaml")).expect("defaults");
        assert_eq!(settings.model.endpoint, "http://localhost:1234/v1");
        assert_eq!(settings.model.model, "qwen2.5-coder-7b-instruct");
        assert!((settings.model.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(settings.project.memory_bank, dir.path().join("memory-bank"));
        assert_eq!(settings.project.flow_file, dir.path().join("project_flow.mmd"));
        assert_eq!(
            settings.event_log_path(),
            dir.path().join(".taskrails/logs/session.log")
        );
        assert_eq!(settings.context.specs_max_chars, 2000);
        assert_eq!(settings.context.tech_stack_max_chars, 1000);
        assert_eq!(settings.context.architecture_max_chars, 1000);
    }

    #[test]
    fn partial_yaml_keeps_section_defaults() {
        let settings: Settings = serde_yaml::from_str(
            r#"
model:
  model: llama-3.1-8b
project:
  flow_file: docs/flow.mmd
"#,
        )
        .expect("parse settings");

        assert_eq!(settings.model.model, "llama-3.1-8b");
        assert_eq!(settings.model.api_key, "lm-studio");
        assert_eq!(settings.project.flow_file, PathBuf::from("docs/flow.mmd"));
        assert_eq!(settings.project.memory_bank, PathBuf::from("memory-bank"));
        assert_eq!(settings.remote.step_delay_ms, 1500);
        assert!(settings.prompt.template_path.is_none());
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_model_env();
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("taskrails.yaml");
        fs::write(
            &path,
            "model:\n  endpoint: http://file-host:1234/v1\n  model: from-file\n",
        )
        .expect("write config");

        std::env::set_var(MODEL_ENDPOINT_ENV, "http://env-host:9999/v1");
        std::env::set_var(MODEL_ID_ENV, "from-env");
        let loaded = load_settings_from(&path);
        clear_model_env();

        let settings = loaded.expect("load");
        assert_eq!(settings.model.endpoint, "http://env-host:9999/v1");
        assert_eq!(settings.model.model, "from-env");
    }

    #[test]
    fn absolute_paths_are_not_rebased() {
        let mut settings = Settings::default();
        settings.project.flow_file = PathBuf::from("/srv/flow.mmd");
        settings.anchor_paths(std::path::Path::new("/work"));
        assert_eq!(settings.project.flow_file, PathBuf::from("/srv/flow.mmd"));
        assert_eq!(settings.project.memory_bank, PathBuf::from("/work/memory-bank"));
    }

    #[test]
    fn validation_rejects_out_of_range_temperature() {
        let mut settings = Settings::default();
        settings.model.temperature = 3.5;
        let err = settings.validate().expect_err("temperature");
        assert!(err.to_string().contains("model.temperature"));
    }

    #[test]
    fn endpoint_and_model_id_are_left_to_the_model_client() {
        let mut settings = Settings::default();
        settings.model.endpoint = "localhost:1234/v1".to_string();
        settings.model.model = String::new();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn invalid_yaml_reports_path() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("taskrails.yaml");
        fs::write(&path, "model: [unclosed").expect("write config");

        let err = load_settings_from(&path).expect_err("parse failure");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("taskrails.yaml"));
    }
}
