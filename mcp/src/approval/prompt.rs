//! Blocking approval channel.
//!
//! The terminal dialog:
//!
//! ```text
//! ==================================================
//! Check required: create_event
//! ==================================================
//!
//! Parameters to execute:
//!    title: Dentist
//!    ...
//!
//! Options:
//!    [Enter] Approve and execute
//!    [e] Modify parameters
//!    [n] Cancel
//! ```
//!
//! `e` walks every argument (Enter keeps the value) and ends with a `[Y/n]`
//! confirmation. Anything other than `e` or `n` approves.

use std::io::{self, BufRead, Write};

use serde_json::Value;

use super::manager::ApprovalDecision;
use crate::inventory::ToolArgs;

/// Synchronous decision maker for sensitive calls.
pub trait ApprovalPrompter: Send + Sync {
    fn decide(&self, tool_name: &str, args: &ToolArgs) -> ApprovalDecision;
}

/// Prompter reading from the process's stdin.
///
/// Read or write failures count as a cancellation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl ApprovalPrompter for TerminalPrompter {
    fn decide(&self, tool_name: &str, args: &ToolArgs) -> ApprovalDecision {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut input = stdin.lock();
        let mut output = stdout.lock();
        prompt_decision(&mut input, &mut output, tool_name, args)
            .unwrap_or_else(|e| ApprovalDecision::cancelled_because(format!("prompt failed: {e}")))
    }
}

/// Run the approval dialog over arbitrary line-based streams.
pub fn prompt_decision<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    tool_name: &str,
    args: &ToolArgs,
) -> io::Result<ApprovalDecision> {
    let rule = "=".repeat(50);
    writeln!(output, "\n{rule}")?;
    writeln!(output, "Check required: {tool_name}")?;
    writeln!(output, "{rule}")?;
    writeln!(output, "\nParameters to execute:")?;
    write_args(output, args)?;
    writeln!(output, "\nOptions:")?;
    writeln!(output, "   [Enter] Approve and execute")?;
    writeln!(output, "   [e] Modify parameters")?;
    writeln!(output, "   [n] Cancel")?;

    let choice = ask(input, output, "\nChoice: ")?;
    match choice.to_lowercase().as_str() {
        "n" => Ok(ApprovalDecision::cancelled()),
        "e" => edit_args(input, output, args),
        _ => Ok(ApprovalDecision::approved()),
    }
}

fn edit_args<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    args: &ToolArgs,
) -> io::Result<ApprovalDecision> {
    writeln!(output, "\nModify parameters (Enter if no changes)")?;

    let mut edited = args.clone();
    for (key, value) in args.iter() {
        let answer = ask(input, output, &format!("   {key} [{}]: ", display_value(value)))?;
        if !answer.is_empty() {
            edited.insert(key.clone(), convert_like(value, &answer));
        }
    }

    writeln!(output, "\nModified parameters:")?;
    write_args(output, &edited)?;

    let confirm = ask(input, output, "\nExecute with these parameters? [Y/n]: ")?;
    if confirm.eq_ignore_ascii_case("n") {
        return Ok(ApprovalDecision::cancelled());
    }
    if &edited == args {
        Ok(ApprovalDecision::approved())
    } else {
        Ok(ApprovalDecision::modified(edited))
    }
}

/// Best-effort conversion keeping the original value's type.
/// Falls back to the raw string when the input does not parse.
fn convert_like(original: &Value, raw: &str) -> Value {
    match original {
        Value::Number(n) if n.is_i64() || n.is_u64() => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        Value::Number(_) => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        Value::Bool(_) => match raw.to_ascii_lowercase().as_str() {
            "true" | "y" | "yes" => Value::Bool(true),
            "false" | "n" | "no" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        _ => Value::String(raw.to_string()),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_args<W: Write>(output: &mut W, args: &ToolArgs) -> io::Result<()> {
    for (key, value) in args.iter() {
        writeln!(output, "   {key}: {}", display_value(value))?;
    }
    Ok(())
}

/// Print a prompt and read one trimmed line. EOF reads as an empty line.
fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<String> {
    write!(output, "{prompt}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
