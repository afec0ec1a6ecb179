pub mod openai_compat;
pub mod sse;
pub mod types;

pub use openai_compat::OpenAiCompatClient;
pub use types::{ChatMessage, ChatRequest, ChatRole};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("invalid model client configuration: {0}")]
    InvalidConfig(String),
    #[error("model server request failed: {0}")]
    Transport(String),
    #[error("model server returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model stream read failed: {0}")]
    StreamRead(String),
    #[error("model stream event could not be parsed: {0}")]
    MalformedEvent(String),
    #[error("model server reported an error: {0}")]
    Remote(String),
}

/// Incremental text deltas of one completion, in generation order.
pub type CompletionStream = Box<dyn Iterator<Item = Result<String, ProviderError>> + Send>;

/// Starts streamed chat completions. The seam where tests substitute a double.
pub trait CompletionClient: Send + Sync {
    fn stream_chat(&self, request: &ChatRequest) -> Result<CompletionStream, ProviderError>;
}
