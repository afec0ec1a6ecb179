use crate::config::{load_settings as config_load_settings, ConfigError, Settings};
use crate::context::ContextStore;
use crate::conversation::{CompletionOptions, ConversationEngine};
use crate::flow::FlowGraphReader;
use crate::prompt::{PromptComposer, PromptError};
use crate::provider::{CompletionClient, OpenAiCompatClient};
use crate::remote::SimulatedRemoteExecutor;
use crate::shared::EventLog;
use serde_json::Value;
use std::fs;
use std::sync::Arc;
use std::time::Duration;

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

pub fn map_prompt_err(err: PromptError) -> String {
    err.to_string()
}

pub fn load_settings() -> Result<Settings, String> {
    config_load_settings().map_err(map_config_err)
}

pub fn event_log(settings: &Settings) -> EventLog {
    EventLog::new(settings.event_log_path())
}

pub fn context_store(settings: &Settings) -> ContextStore {
    ContextStore::new(settings.project.memory_bank.clone(), settings.context)
}

pub fn flow_reader(settings: &Settings) -> FlowGraphReader {
    FlowGraphReader::new(settings.project.flow_file.clone())
}

pub fn prompt_composer(settings: &Settings) -> Result<PromptComposer, String> {
    let store = context_store(settings);
    match settings.prompt.template_path.as_deref() {
        Some(path) => PromptComposer::from_template_file(store, path),
        None => PromptComposer::new(store),
    }
    .map_err(map_prompt_err)
}

/// Engine wired to the configured model. A client that cannot be built
/// yields an engine whose turns report the model as unavailable.
pub fn conversation_engine(settings: &Settings, log: &EventLog) -> Result<ConversationEngine, String> {
    let composer = prompt_composer(settings)?;
    let client = OpenAiCompatClient::new(&settings.model)
        .map(|client| Arc::new(client) as Arc<dyn CompletionClient>);
    if let Err(err) = &client {
        log.warn(
            "model_client_unavailable",
            &err.to_string(),
            &[("endpoint", Value::String(settings.model.endpoint.clone()))],
        );
    }
    Ok(ConversationEngine::from_client_result(
        flow_reader(settings),
        composer,
        client,
        CompletionOptions::from(&settings.model),
    ))
}

pub fn remote_executor(settings: &Settings) -> SimulatedRemoteExecutor {
    SimulatedRemoteExecutor::new(Duration::from_millis(settings.remote.step_delay_ms))
}

/// Records a warning when the flow file exists but cannot be read as text.
pub fn warn_if_flow_unreadable(reader: &FlowGraphReader, log: &EventLog) {
    let path = reader.path();
    if !path.exists() {
        return;
    }
    if let Err(err) = fs::read_to_string(path) {
        log.warn(
            "flow_file_unreadable",
            &err.to_string(),
            &[("path", Value::String(path.display().to_string()))],
        );
    }
}
