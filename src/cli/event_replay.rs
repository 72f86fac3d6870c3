use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::tools::{ApplyOutcome, DisplayOutput, ToolCallEvent, ToolInvocationTracker};
use tracing::debug;

/// Feed newline-delimited events into a tracker. Blank lines are skipped; a
/// malformed line aborts with its line number.
pub fn replay_lines<R: BufRead>(
    reader: R,
    tracker: &mut ToolInvocationTracker,
) -> Result<usize, Box<dyn Error>> {
    let mut applied = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: ToolCallEvent = serde_json::from_str(&line)
            .map_err(|err| format!("Invalid tool call event on line {}: {err}", index + 1))?;
        if tracker.apply(event) != ApplyOutcome::Ignored {
            applied += 1;
        }
    }
    Ok(applied)
}

pub fn format_tracker(tracker: &ToolInvocationTracker) -> String {
    let mut output = String::new();
    for call in tracker.calls() {
        let name = tracker
            .display_name(&call.tool_call_id)
            .unwrap_or_else(|| call.raw_type.clone());
        output.push_str(&format!(
            "{} [{}] {}\n",
            call.tool_call_id,
            call.state.as_str(),
            name
        ));
        if let Some(error_text) = tracker.error_text(&call.tool_call_id) {
            output.push_str(&format!("  error: {error_text}\n"));
        }
        match tracker.display_output(&call.tool_call_id) {
            Some(DisplayOutput::Truncated(truncated)) => {
                output.push_str(&format!("  {}\n", truncated.message));
                output.push_str(&format!("  preview: {}\n", truncated.preview));
            }
            Some(DisplayOutput::Full(value)) => {
                output.push_str(&format!("  output: {value}\n"));
            }
            None => {}
        }
    }
    output
}

pub fn replay_events(path: Option<&Path>, limit: usize) -> Result<(), Box<dyn Error>> {
    let mut tracker = ToolInvocationTracker::new(limit);
    let applied = match path {
        Some(path) => replay_lines(BufReader::new(File::open(path)?), &mut tracker)?,
        None => replay_lines(io::stdin().lock(), &mut tracker)?,
    };
    debug!(applied, calls = tracker.len(), "Replayed tool call events");
    print!("{}", format_tracker(&tracker));
    Ok(())
}
