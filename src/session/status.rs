use serde::{Deserialize, Serialize};

/// Operator-visible state of a relay session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Ready,
    Thinking,
    ConversationActive,
    AwaitingApproval,
    Executing,
    Completed,
}

impl SessionStatus {
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Ready, SessionStatus::Thinking)
                | (SessionStatus::ConversationActive, SessionStatus::Thinking)
                | (SessionStatus::AwaitingApproval, SessionStatus::Thinking)
                | (SessionStatus::Completed, SessionStatus::Thinking)
                | (SessionStatus::Thinking, SessionStatus::ConversationActive)
                | (SessionStatus::Thinking, SessionStatus::AwaitingApproval)
                | (SessionStatus::AwaitingApproval, SessionStatus::Executing)
                | (SessionStatus::AwaitingApproval, SessionStatus::ConversationActive)
                | (SessionStatus::Executing, SessionStatus::Completed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Ready => "ready",
            SessionStatus::Thinking => "thinking",
            SessionStatus::ConversationActive => "conversation_active",
            SessionStatus::AwaitingApproval => "awaiting_approval",
            SessionStatus::Executing => "executing",
            SessionStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
