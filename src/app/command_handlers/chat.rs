use crate::app::cli::chat_help_lines;
use crate::app::command_support::{
    conversation_engine, event_log, flow_reader, load_settings, remote_executor,
    warn_if_flow_unreadable,
};
use crate::flow::active_label;
use crate::remote::RemoteExecutor;
use crate::session::{RelaySession, SessionError};
use std::io::{BufRead, Write};

pub const CHAT_EXIT_COMMANDS: &[&str] = &["/exit", "exit", "quit"];

pub fn is_chat_exit_command(message: &str) -> bool {
    CHAT_EXIT_COMMANDS
        .iter()
        .any(|command| message.eq_ignore_ascii_case(command))
}

pub fn cmd_chat(args: &[String]) -> Result<String, String> {
    if !args.is_empty() {
        return Err("usage: chat".to_string());
    }

    let settings = load_settings()?;
    let log = event_log(&settings);
    warn_if_flow_unreadable(&flow_reader(&settings), &log);
    let engine = conversation_engine(&settings, &log)?;
    let executor = remote_executor(&settings);
    let mut session = RelaySession::new(engine, log);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_chat_loop(&mut session, &executor, stdin.lock(), &mut stdout.lock())
}

/// Reads operator lines from `input` until exit or EOF, streaming replies to `out`.
pub fn run_chat_loop<R, W>(
    session: &mut RelaySession,
    executor: &dyn RemoteExecutor,
    input: R,
    out: &mut W,
) -> Result<String, String>
where
    R: BufRead,
    W: Write,
{
    let io_err = |e: std::io::Error| format!("failed to write chat output: {e}");
    let mut lines = input.lines();

    writeln!(out, "{}", status_block(session)).map_err(io_err)?;
    writeln!(out, "{}", chat_help_lines().join("\n")).map_err(io_err)?;

    loop {
        write!(out, "\nyou> ").map_err(io_err)?;
        out.flush().map_err(io_err)?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.map_err(|e| format!("failed to read chat input: {e}"))?;
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if is_chat_exit_command(message) {
            break;
        }

        match message {
            "/status" => writeln!(out, "{}", status_block(session)).map_err(io_err)?,
            "/approve" => {
                let mut write_failure = None;
                let result = session.approve(executor, |line| {
                    forward_output(out, &mut write_failure, format_args!("{line}\n"));
                });
                if let Some(err) = write_failure {
                    return Err(io_err(err));
                }
                if let Err(err) = result {
                    writeln!(out, "{}", session_error_line(&err)).map_err(io_err)?;
                }
                writeln!(out, "status={}", session.status()).map_err(io_err)?;
            }
            "/reject" => {
                match session.reject() {
                    Ok(_) => writeln!(out, "instruction discarded").map_err(io_err)?,
                    Err(err) => writeln!(out, "{}", session_error_line(&err)).map_err(io_err)?,
                }
                writeln!(out, "status={}", session.status()).map_err(io_err)?;
            }
            _ => {
                write!(out, "assistant> ").map_err(io_err)?;
                let mut write_failure = None;
                let outcome = session
                    .send(message, |fragment| {
                        forward_output(out, &mut write_failure, format_args!("{fragment}"));
                    })
                    .map_err(|e| e.to_string())?;
                if let Some(err) = write_failure {
                    return Err(io_err(err));
                }
                writeln!(out).map_err(io_err)?;
                if let Some(instruction) = outcome.instruction {
                    writeln!(
                        out,
                        "\n--- final instruction ---\n{instruction}\n---\n/approve to send it to the remote agent, /reject to keep talking"
                    )
                    .map_err(io_err)?;
                }
                writeln!(out, "status={}", session.status()).map_err(io_err)?;
            }
        }
    }

    writeln!(out).map_err(io_err)?;
    Ok(format!(
        "chat_closed=true\nturns={}\nstatus={}",
        session.history().len(),
        session.status()
    ))
}

/// Writes and flushes `text` unless an earlier write in the same callback failed.
fn forward_output<W: Write>(
    out: &mut W,
    failure: &mut Option<std::io::Error>,
    text: std::fmt::Arguments<'_>,
) {
    if failure.is_some() {
        return;
    }
    if let Err(err) = out.write_fmt(text).and_then(|()| out.flush()) {
        *failure = Some(err);
    }
}

fn status_block(session: &RelaySession) -> String {
    let node = session.engine().active_node();
    let mut lines = vec![
        format!("status={}", session.status()),
        format!("active_task={}", active_label(node.as_ref())),
        format!("turns={}", session.history().len()),
        format!(
            "pending_instruction={}",
            session.pending_instruction().is_some()
        ),
    ];
    if let Some(reason) = session.engine().model_unavailable_reason() {
        lines.push(format!("model_unavailable={reason}"));
    }
    lines.join("\n")
}

fn session_error_line(err: &SessionError) -> String {
    format!("error={err}")
}
