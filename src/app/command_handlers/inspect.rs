use crate::app::command_support::{
    context_store, event_log, flow_reader, load_settings, prompt_composer, warn_if_flow_unreadable,
};
use crate::context::{
    truncate_chars, ARCHITECTURE_DOCUMENT, SPECS_DOCUMENT, TECH_STACK_DOCUMENT,
};
use crate::extract::extract_final_instruction;
use crate::flow::{active_label, FlowGraphReader};
use std::fs;
use std::io::Read;

pub fn cmd_active(args: &[String]) -> Result<String, String> {
    if !args.is_empty() {
        return Err("usage: active".to_string());
    }
    let settings = load_settings()?;
    let reader = flow_reader(&settings);
    warn_if_flow_unreadable(&reader, &event_log(&settings));
    Ok(render_active(&reader))
}

fn render_active(reader: &FlowGraphReader) -> String {
    let node = reader.active_node();
    let mut lines = vec![format!("flow_file={}", reader.path().display())];
    match &node {
        Some(node) => {
            lines.push(format!("active_node={}", node.id));
            lines.push(format!("active_label={}", node.label));
        }
        None => lines.push("active_node=none".to_string()),
    }
    lines.push(format!("active_task={}", active_label(node.as_ref())));
    lines.join("\n")
}

pub fn cmd_context(args: &[String]) -> Result<String, String> {
    let full = match args {
        [] => false,
        [flag] if flag == "--full" => true,
        _ => return Err("usage: context [--full]".to_string()),
    };

    let settings = load_settings()?;
    let store = context_store(&settings);
    let limits = store.limits();
    let documents = store.list_documents();
    let segment_chars = |name: &str, max: usize| {
        truncate_chars(&store.read_document(name), max)
            .chars()
            .count()
    };
    let summary = store.context_summary();

    let mut lines = vec![
        format!("memory_bank={}", store.root().display()),
        format!(
            "documents={}",
            if documents.is_empty() {
                "none".to_string()
            } else {
                documents.join(",")
            }
        ),
        format!(
            "specs_chars={}",
            segment_chars(SPECS_DOCUMENT, limits.specs_max_chars)
        ),
        format!(
            "tech_stack_chars={}",
            segment_chars(TECH_STACK_DOCUMENT, limits.tech_stack_max_chars)
        ),
        format!(
            "architecture_chars={}",
            segment_chars(ARCHITECTURE_DOCUMENT, limits.architecture_max_chars)
        ),
        format!("summary_chars={}", summary.chars().count()),
        format!("summary_limit_chars={}", limits.total_chars() + 2),
    ];
    if full {
        lines.push(String::new());
        lines.push(summary);
    }
    Ok(lines.join("\n"))
}

pub fn cmd_prompt(args: &[String]) -> Result<String, String> {
    if !args.is_empty() {
        return Err("usage: prompt".to_string());
    }
    let settings = load_settings()?;
    let composer = prompt_composer(&settings)?;
    let node = flow_reader(&settings).active_node();
    Ok(composer.build_system_prompt(active_label(node.as_ref())))
}

pub fn cmd_extract(args: &[String]) -> Result<String, String> {
    if args.len() != 1 {
        return Err("usage: extract <file|->".to_string());
    }

    let raw = if args[0] == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        raw
    } else {
        fs::read_to_string(&args[0]).map_err(|e| format!("failed to read {}: {e}", args[0]))?
    };
    Ok(render_extraction(&raw))
}

fn render_extraction(response: &str) -> String {
    match extract_final_instruction(response) {
        Some(instruction) if instruction.is_empty() => {
            "instruction_found=true\ninstruction_empty=true".to_string()
        }
        Some(instruction) => format!(
            "instruction_found=true\ninstruction_empty=false\ninstruction_chars={}\n\n{instruction}",
            instruction.chars().count()
        ),
        None => "instruction_found=false".to_string(),
    }
}
