#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Chat,
    Active,
    Context,
    Prompt,
    Extract,
    Health,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "chat" => CliVerb::Chat,
        "active" => CliVerb::Active,
        "context" => CliVerb::Context,
        "prompt" => CliVerb::Prompt,
        "extract" => CliVerb::Extract,
        "health" => CliVerb::Health,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  chat                                 Start an interactive relay session".to_string(),
        "  active                               Show the active node of the flow diagram"
            .to_string(),
        "  context [--full]                     Show the memory-bank context summary".to_string(),
        "  prompt                               Print the system prompt for the next turn"
            .to_string(),
        "  extract <file|->                     Extract the final instruction from a response"
            .to_string(),
        "  health                               Check the model server connection".to_string(),
        "  help                                 Show this help".to_string(),
    ]
}

pub fn chat_help_lines() -> Vec<String> {
    vec![
        "Chat commands:".to_string(),
        "  /approve                             Send the pending instruction to the remote agent"
            .to_string(),
        "  /reject                              Discard the pending instruction".to_string(),
        "  /status                              Show session status".to_string(),
        "  /exit                                Leave the session".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    let mut lines = vec![
        "taskrails".to_string(),
        "Relays operator requests through a local model and gates the result behind approval."
            .to_string(),
        String::new(),
    ];
    lines.extend(cli_help_lines());
    lines.push(String::new());
    lines.extend(chat_help_lines());
    lines.join("\n")
}
