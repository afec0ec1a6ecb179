use std::sync::LazyLock;

use regex::Regex;

pub const FINAL_PROMPT_OPEN: &str = "<final_prompt>";
pub const FINAL_PROMPT_CLOSE: &str = "</final_prompt>";

static FINAL_PROMPT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        "(?s){}(.*?){}",
        regex::escape(FINAL_PROMPT_OPEN),
        regex::escape(FINAL_PROMPT_CLOSE)
    );
    Regex::new(&pattern).expect("final prompt pattern compiles")
});

/// Trimmed body of the first `<final_prompt>` block in `response`.
///
/// A start tag without a closing tag yields `None`; only the first pair counts.
pub fn extract_final_instruction(response: &str) -> Option<String> {
    FINAL_PROMPT_PATTERN
        .captures(response)
        .map(|captures| captures[1].trim().to_string())
}

/// Like [`extract_final_instruction`], but an empty block counts as no instruction.
pub fn actionable_instruction(response: &str) -> Option<String> {
    extract_final_instruction(response).filter(|instruction| !instruction.is_empty())
}
