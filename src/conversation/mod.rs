pub mod engine;
pub mod history;

pub use engine::{CompletionOptions, ConversationEngine, TurnStream, MODEL_UNAVAILABLE_MESSAGE};
pub use history::{ConversationHistory, ConversationTurn};

/// One piece of an assistant turn as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnFragment {
    Text(String),
    /// Terminal; nothing follows it in the same turn.
    Failed(String),
}

impl TurnFragment {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl std::fmt::Display for TurnFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Failed(message) => write!(f, "Error: {message}"),
        }
    }
}

/// Accumulated output of one assistant turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamedResponse {
    pub text: String,
    pub failure: Option<String>,
}

impl StreamedResponse {
    pub fn push(&mut self, fragment: &TurnFragment) {
        match fragment {
            TurnFragment::Text(text) => self.text.push_str(text),
            TurnFragment::Failed(message) => self.failure = Some(message.clone()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

impl FromIterator<TurnFragment> for StreamedResponse {
    fn from_iter<I: IntoIterator<Item = TurnFragment>>(iter: I) -> Self {
        let mut response = Self::default();
        for fragment in iter {
            response.push(&fragment);
        }
        response
    }
}
