pub mod status;

use crate::conversation::{ConversationEngine, ConversationHistory, StreamedResponse, TurnFragment};
use crate::extract::actionable_instruction;
use crate::remote::RemoteExecutor;
use crate::shared::EventLog;
use serde_json::Value;

pub use status::SessionStatus;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session state transition `{from}` -> `{to}` is invalid")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },
    #[error("no instruction is awaiting approval")]
    NoPendingInstruction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub response: StreamedResponse,
    pub instruction: Option<String>,
    pub failed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub instruction: String,
    pub log_lines: Vec<String>,
}

/// One operator conversation plus its approval workflow.
///
/// Turns run one at a time; `send` and `approve` take `&mut self`.
pub struct RelaySession {
    engine: ConversationEngine,
    history: ConversationHistory,
    status: SessionStatus,
    pending: Option<String>,
    log: EventLog,
}

impl RelaySession {
    pub fn new(engine: ConversationEngine, log: EventLog) -> Self {
        Self {
            engine,
            history: ConversationHistory::new(),
            status: SessionStatus::Ready,
            pending: None,
            log,
        }
    }

    pub fn engine(&self) -> &ConversationEngine {
        &self.engine
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn pending_instruction(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    fn transition(&mut self, next: SessionStatus) -> Result<(), SessionError> {
        if !self.status.can_transition_to(next) {
            return Err(SessionError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Streams one turn, forwarding each fragment, then records it in history.
    pub fn send<F>(&mut self, user_text: &str, mut on_fragment: F) -> Result<TurnOutcome, SessionError>
    where
        F: FnMut(&TurnFragment),
    {
        self.transition(SessionStatus::Thinking)?;
        self.pending = None;
        let active = self.engine.active_node();
        self.log.info(
            "turn_submitted",
            "user turn submitted",
            &[
                ("chars", Value::from(user_text.chars().count())),
                ("history_turns", Value::from(self.history.len())),
                (
                    "active_node",
                    active
                        .as_ref()
                        .map(|node| Value::String(node.id.clone()))
                        .unwrap_or(Value::Null),
                ),
            ],
        );

        let mut response = StreamedResponse::default();
        for fragment in self.engine.submit_turn(user_text, &self.history) {
            on_fragment(&fragment);
            response.push(&fragment);
        }

        self.history.push_user(user_text);
        if let Some(failure) = response.failure.as_deref() {
            if !response.text.is_empty() {
                self.history.push_assistant(response.text.clone());
            }
            self.log.error(
                "turn_failed",
                failure,
                &[("partial_chars", Value::from(response.text.chars().count()))],
            );
            self.transition(SessionStatus::ConversationActive)?;
            return Ok(TurnOutcome {
                response,
                instruction: None,
                failed: true,
            });
        }

        self.history.push_assistant(response.text.clone());
        self.log.info(
            "turn_completed",
            "assistant turn completed",
            &[("chars", Value::from(response.text.chars().count()))],
        );

        let instruction = actionable_instruction(&response.text);
        match instruction.as_deref() {
            Some(text) => {
                self.log.info(
                    "instruction_extracted",
                    "final instruction awaiting approval",
                    &[("chars", Value::from(text.chars().count()))],
                );
                self.pending = Some(text.to_string());
                self.transition(SessionStatus::AwaitingApproval)?;
            }
            None => self.transition(SessionStatus::ConversationActive)?,
        }

        Ok(TurnOutcome {
            response,
            instruction,
            failed: false,
        })
    }

    /// Hands the pending instruction to `executor`, forwarding its log lines.
    pub fn approve<F>(
        &mut self,
        executor: &dyn RemoteExecutor,
        mut on_log: F,
    ) -> Result<ExecutionReport, SessionError>
    where
        F: FnMut(&str),
    {
        let instruction = self
            .pending
            .clone()
            .ok_or(SessionError::NoPendingInstruction)?;
        self.transition(SessionStatus::Executing)?;
        self.pending = None;
        self.log.info(
            "execution_started",
            "instruction approved for remote execution",
            &[("chars", Value::from(instruction.chars().count()))],
        );

        let mut log_lines = Vec::new();
        for line in executor.execute(&instruction) {
            on_log(&line);
            self.log.info("execution_step", &line, &[]);
            log_lines.push(line);
        }

        self.transition(SessionStatus::Completed)?;
        self.log.info(
            "execution_completed",
            "remote execution finished",
            &[("steps", Value::from(log_lines.len()))],
        );
        Ok(ExecutionReport {
            instruction,
            log_lines,
        })
    }

    /// Drops the pending instruction and returns to conversation.
    pub fn reject(&mut self) -> Result<String, SessionError> {
        let instruction = self
            .pending
            .clone()
            .ok_or(SessionError::NoPendingInstruction)?;
        self.transition(SessionStatus::ConversationActive)?;
        self.pending = None;
        self.log.info("instruction_rejected", "pending instruction discarded", &[]);
        Ok(instruction)
    }
}
