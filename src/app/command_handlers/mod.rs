use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod chat;
pub mod health;
pub mod inspect;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Chat => chat::cmd_chat(&args[1..]),
        CliVerb::Active => inspect::cmd_active(&args[1..]),
        CliVerb::Context => inspect::cmd_context(&args[1..]),
        CliVerb::Prompt => inspect::cmd_prompt(&args[1..]),
        CliVerb::Extract => inspect::cmd_extract(&args[1..]),
        CliVerb::Health => health::cmd_health(&args[1..]),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
