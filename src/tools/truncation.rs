//! Display-safe tool output.
//!
//! Oversized results are replaced by a bounded preview. Size is measured in
//! characters: a string result by its contents, anything else by its JSON
//! serialization. The same input always produces the same output.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TruncatedOutput {
    pub tool_name: String,
    pub actual_size: usize,
    pub limit: usize,
    pub preview: String,
    pub message: String,
    pub truncated: bool,
}

/// What the UI receives in place of a raw tool result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DisplayOutput {
    Full(Value),
    Truncated(TruncatedOutput),
}

impl DisplayOutput {
    pub fn is_truncated(&self) -> bool {
        matches!(self, DisplayOutput::Truncated(_))
    }
}

fn output_text(output: &Value) -> String {
    match output {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn output_size(output: &Value) -> usize {
    match output {
        Value::String(text) => text.chars().count(),
        other => other.to_string().chars().count(),
    }
}

pub fn truncate_output(tool_name: &str, output: &Value, limit: usize) -> DisplayOutput {
    let actual_size = output_size(output);
    if actual_size <= limit {
        return DisplayOutput::Full(output.clone());
    }

    let preview: String = output_text(output).chars().take(limit).collect();
    let message = format!(
        "Output from {tool_name} was truncated: {actual_size} characters exceeds the \
         {limit} character display limit."
    );
    DisplayOutput::Truncated(TruncatedOutput {
        tool_name: tool_name.to_string(),
        actual_size,
        limit,
        preview,
        message,
        truncated: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn oversized_string_is_truncated_to_limit() {
        let output = Value::String("x".repeat(10_000));
        let display = truncate_output("search_documents", &output, 2_000);

        let DisplayOutput::Truncated(truncated) = &display else {
            panic!("expected truncation");
        };
        assert_eq!(truncated.actual_size, 10_000);
        assert_eq!(truncated.limit, 2_000);
        assert!(truncated.preview.chars().count() <= 2_000);
        assert!(truncated.truncated);
        assert!(truncated.message.contains("search_documents"));

        let serialized = serde_json::to_value(&display).unwrap();
        assert_eq!(serialized["truncated"], json!(true));
        assert_eq!(serialized["actualSize"], json!(10_000));
        assert_eq!(serialized["toolName"], json!("search_documents"));
    }

    #[test]
    fn small_result_passes_through_untagged() {
        let output = json!({"items": ["a".repeat(480)]});
        assert!(output_size(&output) < 2_000);

        let display = truncate_output("search_documents", &output, 2_000);
        assert_eq!(display, DisplayOutput::Full(output.clone()));
        assert!(!display.is_truncated());
        assert_eq!(serde_json::to_value(&display).unwrap(), output);
    }

    #[test]
    fn structured_output_is_measured_by_serialized_size() {
        let output = json!({"rows": vec!["abcdefgh"; 500]});
        let size = output.to_string().chars().count();
        let display = truncate_output("query", &output, 100);

        let DisplayOutput::Truncated(truncated) = display else {
            panic!("expected truncation");
        };
        assert_eq!(truncated.actual_size, size);
        assert_eq!(truncated.preview, output.to_string()[..100]);
    }

    #[test]
    fn truncation_is_deterministic_and_char_safe() {
        let output = Value::String("é".repeat(50));
        let first = truncate_output("t", &output, 10);
        let second = truncate_output("t", &output, 10);
        assert_eq!(first, second);

        let DisplayOutput::Truncated(truncated) = first else {
            panic!("expected truncation");
        };
        assert_eq!(truncated.actual_size, 50);
        assert_eq!(truncated.preview, "é".repeat(10));
    }

    #[test]
    fn size_equal_to_limit_is_not_truncated() {
        let output = Value::String("y".repeat(64));
        assert!(!truncate_output("t", &output, 64).is_truncated());
        assert!(truncate_output("t", &output, 63).is_truncated());
    }
}
