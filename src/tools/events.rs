use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle of one tool call as reported by the model-run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolCallState {
    InputStreaming,
    InputAvailable,
    OutputAvailable,
    OutputError,
}

impl ToolCallState {
    /// Position in the lifecycle. Both terminal states share the top rank.
    pub fn rank(self) -> u8 {
        match self {
            ToolCallState::InputStreaming => 0,
            ToolCallState::InputAvailable => 1,
            ToolCallState::OutputAvailable | ToolCallState::OutputError => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ToolCallState::OutputAvailable | ToolCallState::OutputError
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToolCallState::InputStreaming => "input-streaming",
            ToolCallState::InputAvailable => "input-available",
            ToolCallState::OutputAvailable => "output-available",
            ToolCallState::OutputError => "output-error",
        }
    }
}

/// One snapshot of a tool call. `input` and `output` are whatever the tool
/// produced; only the nested `toolName` field is ever looked at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallEvent {
    pub tool_call_id: String,
    #[serde(rename = "type", alias = "rawType")]
    pub raw_type: String,
    #[serde(
        default,
        alias = "explicitToolName",
        skip_serializing_if = "Option::is_none"
    )]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub input: Value,
    pub state: ToolCallState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

impl ToolCallEvent {
    pub fn new(
        tool_call_id: impl Into<String>,
        raw_type: impl Into<String>,
        state: ToolCallState,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            raw_type: raw_type.into(),
            tool_name: None,
            input: Value::Null,
            state,
            output: None,
            error_text: None,
        }
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn with_input(mut self, input: Value) -> Self {
        self.input = input;
        self
    }

    pub fn with_output(mut self, output: Value) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_error_text(mut self, error_text: impl Into<String>) -> Self {
        self.error_text = Some(error_text.into());
        self
    }

    /// `input.toolName`, when the input carries one.
    pub fn input_tool_name(&self) -> Option<&str> {
        nested_tool_name(&self.input)
    }

    /// `output.toolName`, when output is present and carries one.
    pub fn output_tool_name(&self) -> Option<&str> {
        self.output.as_ref().and_then(nested_tool_name)
    }
}

fn nested_tool_name(value: &Value) -> Option<&str> {
    value
        .get("toolName")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_stream_payload() {
        let event: ToolCallEvent = serde_json::from_value(json!({
            "toolCallId": "call-1",
            "type": "tool-search_documents",
            "input": {"query": "rust"},
            "state": "output-error",
            "errorText": "timeout"
        }))
        .expect("event should parse");

        assert_eq!(event.raw_type, "tool-search_documents");
        assert_eq!(event.state, ToolCallState::OutputError);
        assert_eq!(event.error_text.as_deref(), Some("timeout"));
        assert_eq!(event.output, None);
        assert_eq!(event.tool_name, None);
    }

    #[test]
    fn accepts_explicit_tool_name_alias() {
        let event: ToolCallEvent = serde_json::from_value(json!({
            "toolCallId": "call-2",
            "rawType": "dynamic-tool",
            "explicitToolName": "fetch_page",
            "state": "input-streaming"
        }))
        .expect("event should parse");

        assert_eq!(event.tool_name.as_deref(), Some("fetch_page"));
        assert!(event.input.is_null());
    }

    #[test]
    fn nested_tool_names_ignore_blank_and_non_string_values() {
        let event = ToolCallEvent::new("c", "execute_tool", ToolCallState::OutputAvailable)
            .with_input(json!({"toolName": "  "}))
            .with_output(json!({"toolName": 7}));
        assert_eq!(event.input_tool_name(), None);
        assert_eq!(event.output_tool_name(), None);
    }

    #[test]
    fn ranks_are_monotonic_through_the_lifecycle() {
        assert!(ToolCallState::InputStreaming.rank() < ToolCallState::InputAvailable.rank());
        assert!(ToolCallState::InputAvailable.rank() < ToolCallState::OutputAvailable.rank());
        assert_eq!(
            ToolCallState::OutputAvailable.rank(),
            ToolCallState::OutputError.rank()
        );
        assert!(!ToolCallState::InputAvailable.is_terminal());
        assert!(ToolCallState::OutputError.is_terminal());
        assert_eq!(
            serde_json::to_value(ToolCallState::InputAvailable).unwrap(),
            json!(ToolCallState::InputAvailable.as_str())
        );
    }
}
