use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

// `id["label"]:::active` or `id[label]:::active`. A quoted label may contain
// `]`; an unquoted one may not, so `a[x]:::done --> b[y]:::active` resolves to
// `b`. Neither spans a line break.
static ACTIVE_NODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\w+)\[(?:"([^"\n]*)"|([^\]\n]*?))\]:::active"#)
        .expect("active node pattern compiles")
});

/// Placeholder handed to the prompt composer when no node is active.
pub const NO_ACTIVE_NODE_LABEL: &str = "General Task (No Active Node)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveNode {
    pub id: String,
    pub label: String,
}

/// Looks up the active task in a mermaid flow diagram.
#[derive(Debug, Clone)]
pub struct FlowGraphReader {
    path: PathBuf,
}

impl FlowGraphReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rereads the diagram. Missing or unreadable files mean no active node.
    pub fn active_node(&self) -> Option<ActiveNode> {
        let content = fs::read_to_string(&self.path).ok()?;
        find_active_node(&content)
    }
}

/// First `:::active` node in file order; later ones are ignored.
pub fn find_active_node(diagram: &str) -> Option<ActiveNode> {
    let captures = ACTIVE_NODE_PATTERN.captures(diagram)?;
    let label = captures.get(2).or_else(|| captures.get(3))?;
    Some(ActiveNode {
        id: captures[1].to_string(),
        label: label.as_str().to_string(),
    })
}

pub fn active_label(node: Option<&ActiveNode>) -> &str {
    node.map(|node| node.label.as_str())
        .unwrap_or(NO_ACTIVE_NODE_LABEL)
}
