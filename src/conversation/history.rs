use crate::provider::ChatMessage;
use serde::Serialize;

pub type ConversationTurn = ChatMessage;

/// User and assistant turns of one session, oldest first.
///
/// The system turn is never stored; it is rebuilt for each submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(ChatMessage::assistant(content));
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ChatRole;

    #[test]
    fn history_appends_in_order_and_serializes_as_messages() {
        let mut history = ConversationHistory::new();
        history.push_user("add login");
        history.push_assistant("which provider?");
        history.push_user("email");

        assert_eq!(history.len(), 3);
        assert_eq!(history.turns()[2].role, ChatRole::User);
        assert_eq!(history.turns()[2].content, "email");

        let json = serde_json::to_value(&history).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!([
                {"role": "user", "content": "add login"},
                {"role": "assistant", "content": "which provider?"},
                {"role": "user", "content": "email"},
            ])
        );
    }
}
