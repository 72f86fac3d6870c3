use super::events::ToolCallEvent;
use super::names::{display_name, resolve_target_tool_name};
use super::truncation::{truncate_output, DisplayOutput};
use crate::core::config::data::DEFAULT_TOOL_OUTPUT_LIMIT;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Inserted,
    Updated,
    /// Late, duplicate, or backwards event; the tracked call is unchanged.
    Ignored,
}

/// Latest state of every tool call in one model run.
///
/// Calls are keyed by `tool_call_id`, so updates for different calls may
/// interleave freely. Within a call the state only moves forward, and once a
/// call is terminal nothing further is accepted for it.
#[derive(Debug, Clone)]
pub struct ToolInvocationTracker {
    limit: usize,
    calls: HashMap<String, ToolCallEvent>,
    order: Vec<String>,
}

impl Default for ToolInvocationTracker {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL_OUTPUT_LIMIT)
    }
}

impl ToolInvocationTracker {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            calls: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn apply(&mut self, event: ToolCallEvent) -> ApplyOutcome {
        let current = match self.calls.entry(event.tool_call_id.clone()) {
            Entry::Vacant(slot) => {
                self.order.push(slot.key().clone());
                slot.insert(event);
                return ApplyOutcome::Inserted;
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };

        if current.state.is_terminal() || event.state.rank() < current.state.rank() {
            trace!(
                tool_call_id = %event.tool_call_id,
                current = current.state.as_str(),
                incoming = event.state.as_str(),
                "Dropping stale tool call event"
            );
            return ApplyOutcome::Ignored;
        }

        let ToolCallEvent {
            tool_call_id: _,
            raw_type,
            tool_name,
            input,
            state,
            output,
            error_text,
        } = event;
        if raw_type != current.raw_type {
            trace!(
                tool_call_id = %current.tool_call_id,
                kept = %current.raw_type,
                incoming = %raw_type,
                "Keeping first tool call type"
            );
        }
        current.state = state;
        if tool_name.is_some() {
            current.tool_name = tool_name;
        }
        if !input.is_null() {
            current.input = input;
        }
        if output.is_some() {
            current.output = output;
        }
        if error_text.is_some() {
            current.error_text = error_text;
        }
        ApplyOutcome::Updated
    }

    pub fn get(&self, tool_call_id: &str) -> Option<&ToolCallEvent> {
        self.calls.get(tool_call_id)
    }

    /// Calls in the order they first appeared.
    pub fn calls(&self) -> impl Iterator<Item = &ToolCallEvent> {
        self.order.iter().filter_map(|id| self.calls.get(id))
    }

    pub fn pending(&self) -> impl Iterator<Item = &ToolCallEvent> {
        self.calls().filter(|call| !call.state.is_terminal())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn display_name(&self, tool_call_id: &str) -> Option<String> {
        self.get(tool_call_id).map(display_name)
    }

    /// The call's output as the UI should see it, truncated past the limit.
    pub fn display_output(&self, tool_call_id: &str) -> Option<DisplayOutput> {
        let call = self.get(tool_call_id)?;
        let output = call.output.as_ref()?;
        Some(truncate_output(
            resolve_target_tool_name(call),
            output,
            self.limit,
        ))
    }

    pub fn error_text(&self, tool_call_id: &str) -> Option<&str> {
        self.get(tool_call_id)?.error_text.as_deref()
    }
}
