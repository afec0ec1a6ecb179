pub mod template;

use crate::context::ContextStore;
use crate::extract::{FINAL_PROMPT_CLOSE, FINAL_PROMPT_OPEN};
use std::fs;
use std::path::Path;

pub use template::{Placeholder, PromptTemplate};

pub const DEFAULT_SYSTEM_TEMPLATE: &str = "\
You are the relay architect for Taskrails, standing between the operator and a remote coding agent.
Your goal is to turn the operator's loosely worded requests into precise engineering prompts that the remote agent can execute.

[Current flow task]
{{active_task}}

[Project context summary]
{{context}}

[Rules]
1. Decide whether the request is ambiguous. If it is, ask the operator a clarifying question and stop there.
2. If the request is clear, write an engineering prompt for the remote agent with ordered steps, file paths and acceptance criteria.
3. IMPORTANT: wrap the final prompt for the remote agent in {{open_tag}} and {{close_tag}}.
4. Outside the {{open_tag}} block, explain your plan to the operator in plain language.
";

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("unclosed placeholder in template")]
    UnclosedPlaceholder,
    #[error("empty placeholder in template")]
    EmptyPlaceholder,
    #[error("unsupported placeholder `{{{{{0}}}}}`")]
    UnknownPlaceholder(String),
    #[error("template must reference `{{{{open_tag}}}}` and `{{{{close_tag}}}}`")]
    MissingDelimiter,
    #[error("failed to read prompt template {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Builds the system prompt from the active task label and live project context.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    context: ContextStore,
    template: PromptTemplate,
}

impl PromptComposer {
    pub fn new(context: ContextStore) -> Result<Self, PromptError> {
        Self::with_template(context, DEFAULT_SYSTEM_TEMPLATE)
    }

    pub fn with_template(context: ContextStore, template: &str) -> Result<Self, PromptError> {
        let template = PromptTemplate::parse(template)?;
        if !template.uses(Placeholder::OpenTag) || !template.uses(Placeholder::CloseTag) {
            return Err(PromptError::MissingDelimiter);
        }
        Ok(Self { context, template })
    }

    pub fn from_template_file(context: ContextStore, path: &Path) -> Result<Self, PromptError> {
        let raw = fs::read_to_string(path).map_err(|source| PromptError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::with_template(context, &raw)
    }

    pub fn context(&self) -> &ContextStore {
        &self.context
    }

    /// Rereads the context documents on every call.
    pub fn build_system_prompt(&self, active_label: &str) -> String {
        let summary = self.context.context_summary();
        self.template.render(|placeholder| match placeholder {
            Placeholder::ActiveTask => active_label.to_string(),
            Placeholder::Context => summary.clone(),
            Placeholder::OpenTag => FINAL_PROMPT_OPEN.to_string(),
            Placeholder::CloseTag => FINAL_PROMPT_CLOSE.to_string(),
        })
    }
}
