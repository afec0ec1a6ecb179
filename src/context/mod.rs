use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SPECS_DOCUMENT: &str = "specs.md";
pub const TECH_STACK_DOCUMENT: &str = "tech-stack.md";
pub const ARCHITECTURE_DOCUMENT: &str = "architecture.md";

/// Per-document character ceilings for the context summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextLimits {
    #[serde(default = "default_specs_max_chars")]
    pub specs_max_chars: usize,
    #[serde(default = "default_secondary_max_chars")]
    pub tech_stack_max_chars: usize,
    #[serde(default = "default_secondary_max_chars")]
    pub architecture_max_chars: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            specs_max_chars: default_specs_max_chars(),
            tech_stack_max_chars: default_secondary_max_chars(),
            architecture_max_chars: default_secondary_max_chars(),
        }
    }
}

impl ContextLimits {
    pub fn total_chars(&self) -> usize {
        self.specs_max_chars + self.tech_stack_max_chars + self.architecture_max_chars
    }
}

fn default_specs_max_chars() -> usize {
    2000
}

fn default_secondary_max_chars() -> usize {
    1000
}

/// Reads project reference documents from the memory-bank directory.
///
/// Holds nothing but the directory and limits; every call rereads the files.
#[derive(Debug, Clone)]
pub struct ContextStore {
    root: PathBuf,
    limits: ContextLimits,
}

impl ContextStore {
    pub fn new(root: impl Into<PathBuf>, limits: ContextLimits) -> Self {
        Self {
            root: root.into(),
            limits,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn limits(&self) -> ContextLimits {
        self.limits
    }

    /// Full text of `name`, or an empty string when it cannot be read.
    pub fn read_document(&self, name: &str) -> String {
        fs::read_to_string(self.root.join(name)).unwrap_or_default()
    }

    pub fn context_summary(&self) -> String {
        let specs = self.read_document(SPECS_DOCUMENT);
        let tech = self.read_document(TECH_STACK_DOCUMENT);
        let arch = self.read_document(ARCHITECTURE_DOCUMENT);
        format!(
            "{}\n{}\n{}",
            truncate_chars(&specs, self.limits.specs_max_chars),
            truncate_chars(&tech, self.limits.tech_stack_max_chars),
            truncate_chars(&arch, self.limits.architecture_max_chars),
        )
    }

    /// Markdown documents present in the directory, sorted by name.
    pub fn list_documents(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut names = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(".md"))
            .collect::<Vec<_>>();
        names.sort();
        names
    }
}

/// Hard cut after `max_chars` characters; not word-aware.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
