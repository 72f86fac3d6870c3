//! Tool-call lifecycle tracking for display.

pub mod events;
pub mod names;
pub mod tracker;
pub mod truncation;

pub use events::{ToolCallEvent, ToolCallState};
pub use tracker::{ApplyOutcome, ToolInvocationTracker};
pub use truncation::{truncate_output, DisplayOutput, TruncatedOutput};
