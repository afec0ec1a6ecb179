use super::{ConversationHistory, TurnFragment};
use crate::config::ModelSettings;
use crate::flow::{active_label, ActiveNode, FlowGraphReader};
use crate::prompt::PromptComposer;
use crate::provider::{ChatMessage, ChatRequest, CompletionClient, CompletionStream, ProviderError};
use std::sync::Arc;

/// Fixed fragment emitted when the model client could not be built at startup.
pub const MODEL_UNAVAILABLE_MESSAGE: &str =
    "cannot reach the local model server; check that it is running";

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub model: String,
    pub temperature: f32,
}

impl From<&ModelSettings> for CompletionOptions {
    fn from(settings: &ModelSettings) -> Self {
        Self {
            model: settings.model.clone(),
            temperature: settings.temperature,
        }
    }
}

#[derive(Clone)]
enum ModelBinding {
    Ready(Arc<dyn CompletionClient>),
    Unavailable(String),
}

/// Drives single turns against the model. Never mutates the caller's history.
#[derive(Clone)]
pub struct ConversationEngine {
    flow: FlowGraphReader,
    composer: PromptComposer,
    model: ModelBinding,
    options: CompletionOptions,
}

impl ConversationEngine {
    pub fn new(
        flow: FlowGraphReader,
        composer: PromptComposer,
        client: Arc<dyn CompletionClient>,
        options: CompletionOptions,
    ) -> Self {
        Self {
            flow,
            composer,
            model: ModelBinding::Ready(client),
            options,
        }
    }

    /// An engine whose every turn yields [`MODEL_UNAVAILABLE_MESSAGE`].
    pub fn without_model(
        flow: FlowGraphReader,
        composer: PromptComposer,
        reason: impl Into<String>,
        options: CompletionOptions,
    ) -> Self {
        Self {
            flow,
            composer,
            model: ModelBinding::Unavailable(reason.into()),
            options,
        }
    }

    pub fn from_client_result(
        flow: FlowGraphReader,
        composer: PromptComposer,
        client: Result<Arc<dyn CompletionClient>, ProviderError>,
        options: CompletionOptions,
    ) -> Self {
        match client {
            Ok(client) => Self::new(flow, composer, client, options),
            Err(err) => Self::without_model(flow, composer, err.to_string(), options),
        }
    }

    pub fn model_unavailable_reason(&self) -> Option<&str> {
        match &self.model {
            ModelBinding::Ready(_) => None,
            ModelBinding::Unavailable(reason) => Some(reason),
        }
    }

    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    pub fn active_node(&self) -> Option<ActiveNode> {
        self.flow.active_node()
    }

    pub fn context_summary(&self) -> String {
        self.composer.context().context_summary()
    }

    /// The system prompt as it would be sent right now.
    pub fn system_prompt(&self) -> String {
        let node = self.flow.active_node();
        self.composer.build_system_prompt(active_label(node.as_ref()))
    }

    /// Full request for `user_text`: `[system, ...history, user]`.
    pub fn build_request(&self, user_text: &str, history: &ConversationHistory) -> ChatRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt()));
        messages.extend(history.turns().iter().cloned());
        messages.push(ChatMessage::user(user_text));
        ChatRequest {
            model: self.options.model.clone(),
            messages,
            temperature: self.options.temperature,
            stream: true,
        }
    }

    /// Snapshots the active node and context now; the model is contacted on
    /// the first poll of the returned stream.
    pub fn submit_turn(&self, user_text: &str, history: &ConversationHistory) -> TurnStream {
        let state = match &self.model {
            ModelBinding::Ready(client) => TurnState::Pending {
                client: Arc::clone(client),
                request: self.build_request(user_text, history),
            },
            ModelBinding::Unavailable(_) => TurnState::Unavailable,
        };
        TurnStream { state }
    }
}

enum TurnState {
    Pending {
        client: Arc<dyn CompletionClient>,
        request: ChatRequest,
    },
    Unavailable,
    Streaming(CompletionStream),
    Finished,
}

/// Fragments of one assistant turn. Ends after the first failure.
pub struct TurnStream {
    state: TurnState,
}

impl TurnStream {
    /// The request this turn will send, until the first poll consumes it.
    pub fn pending_request(&self) -> Option<&ChatRequest> {
        match &self.state {
            TurnState::Pending { request, .. } => Some(request),
            _ => None,
        }
    }
}

impl Iterator for TurnStream {
    type Item = TurnFragment;

    fn next(&mut self) -> Option<Self::Item> {
        match std::mem::replace(&mut self.state, TurnState::Finished) {
            TurnState::Finished => None,
            TurnState::Unavailable => Some(TurnFragment::Failed(
                MODEL_UNAVAILABLE_MESSAGE.to_string(),
            )),
            TurnState::Pending { client, request } => match client.stream_chat(&request) {
                Ok(stream) => {
                    self.state = TurnState::Streaming(stream);
                    self.next()
                }
                Err(err) => Some(TurnFragment::Failed(err.to_string())),
            },
            TurnState::Streaming(mut stream) => match stream.next() {
                Some(Ok(text)) => {
                    self.state = TurnState::Streaming(stream);
                    Some(TurnFragment::Text(text))
                }
                Some(Err(err)) => Some(TurnFragment::Failed(err.to_string())),
                None => None,
            },
        }
    }
}
