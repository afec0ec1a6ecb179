use crate::config::ModelSettings;
use crate::provider::sse::{SseEvents, DONE_MARKER};
use crate::provider::types::{ChatCompletionChunk, ModelList};
use crate::provider::{ChatRequest, CompletionClient, CompletionStream, ProviderError};
use std::io::{BufReader, Read};
use std::time::Duration;

const CHAT_COMPLETIONS_PATH: &str = "chat/completions";
const MODELS_PATH: &str = "models";
const ERROR_BODY_PREVIEW_CHARS: usize = 500;

/// Streaming client for OpenAI-compatible local servers (LM Studio, llama.cpp, Ollama).
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    agent: ureq::Agent,
    api_base: String,
    api_key: String,
}

impl OpenAiCompatClient {
    pub fn new(settings: &ModelSettings) -> Result<Self, ProviderError> {
        let endpoint = settings.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ProviderError::InvalidConfig(format!(
                "endpoint `{endpoint}` must start with http:// or https://"
            )));
        }
        if settings.model.trim().is_empty() {
            return Err(ProviderError::InvalidConfig(
                "model id must be non-empty".to_string(),
            ));
        }
        let api_base = endpoint
            .trim_end_matches('/')
            .trim_end_matches(CHAT_COMPLETIONS_PATH)
            .trim_end_matches('/')
            .to_string();

        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(settings.connect_timeout_ms))
            .timeout_read(Duration::from_millis(settings.read_timeout_ms))
            .build();

        Ok(Self {
            agent,
            api_base,
            api_key: settings.api_key.clone(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    fn authorized(&self, request: ureq::Request) -> ureq::Request {
        if self.api_key.trim().is_empty() {
            request
        } else {
            request.set("Authorization", &format!("Bearer {}", self.api_key))
        }
    }

    /// Lists the model ids served at `{endpoint}/models`.
    pub fn check_connection(&self) -> Result<Vec<String>, ProviderError> {
        let url = self.endpoint(MODELS_PATH);
        let response = self
            .authorized(self.agent.get(&url))
            .call()
            .map_err(map_ureq_error)?;
        let models = response
            .into_json::<ModelList>()
            .map_err(|err| ProviderError::MalformedEvent(format!("invalid model list: {err}")))?;
        Ok(models.data.into_iter().map(|model| model.id).collect())
    }
}

impl CompletionClient for OpenAiCompatClient {
    fn stream_chat(&self, request: &ChatRequest) -> Result<CompletionStream, ProviderError> {
        let url = self.endpoint(CHAT_COMPLETIONS_PATH);
        let response = self
            .authorized(self.agent.post(&url))
            .set("Accept", "text/event-stream")
            .send_json(request)
            .map_err(map_ureq_error)?;

        let reader: Box<dyn Read + Send> = Box::new(response.into_reader());
        Ok(Box::new(ChatDeltaStream {
            events: SseEvents::new(BufReader::new(reader)),
            done: false,
        }))
    }
}

fn map_ureq_error(err: ureq::Error) -> ProviderError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            ProviderError::Status {
                status,
                body: body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect(),
            }
        }
        ureq::Error::Transport(transport) => ProviderError::Transport(transport.to_string()),
    }
}

/// Turns SSE chunks into the text deltas of `choices[0]`.
struct ChatDeltaStream<R> {
    events: SseEvents<R>,
    done: bool,
}

impl<R: std::io::BufRead> Iterator for ChatDeltaStream<R> {
    type Item = Result<String, ProviderError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let data = match self.events.next()? {
                Ok(data) => data,
                Err(err) => {
                    self.done = true;
                    return Some(Err(ProviderError::StreamRead(err.to_string())));
                }
            };
            if data.trim() == DONE_MARKER {
                self.done = true;
                return None;
            }

            let chunk = match serde_json::from_str::<ChatCompletionChunk>(&data) {
                Ok(chunk) => chunk,
                Err(err) => {
                    self.done = true;
                    return Some(Err(ProviderError::MalformedEvent(format!(
                        "invalid stream chunk: {err}"
                    ))));
                }
            };
            if let Some(error) = chunk.error {
                self.done = true;
                return Some(Err(ProviderError::Remote(error.message)));
            }

            let content = chunk
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
                .filter(|content| !content.is_empty());
            if let Some(content) = content {
                return Some(Ok(content));
            }
        }
        None
    }
}
