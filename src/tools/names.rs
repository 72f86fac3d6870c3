use super::events::ToolCallEvent;

/// Generic wrapper tool whose real target is named inside its payload.
pub const EXECUTE_TOOL_WRAPPER: &str = "execute_tool";

const TOOL_TYPE_PREFIX: &str = "tool-";

/// The call's own tool name: explicit name, then `tool-<name>`, then the raw
/// type as-is.
pub fn resolve_tool_name(event: &ToolCallEvent) -> &str {
    if let Some(name) = event.tool_name.as_deref().filter(|name| !name.is_empty()) {
        return name;
    }
    match event.raw_type.strip_prefix(TOOL_TYPE_PREFIX) {
        Some(name) if !name.is_empty() => name,
        _ => &event.raw_type,
    }
}

/// The tool the call is actually about. For the `execute_tool` wrapper this is
/// `input.toolName`, or `output.toolName` once output has arrived.
pub fn resolve_target_tool_name(event: &ToolCallEvent) -> &str {
    let name = resolve_tool_name(event);
    if name != EXECUTE_TOOL_WRAPPER {
        return name;
    }
    event
        .input_tool_name()
        .or_else(|| event.output_tool_name())
        .unwrap_or(name)
}

/// `search_documents` -> `Search Documents`.
pub fn humanize_tool_name(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn display_name(event: &ToolCallEvent) -> String {
    humanize_tool_name(resolve_target_tool_name(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::events::ToolCallState;
    use serde_json::json;

    #[test]
    fn prefixed_raw_type_resolves_to_bare_name() {
        let event = ToolCallEvent::new("c1", "tool-search_documents", ToolCallState::InputStreaming);
        assert_eq!(resolve_tool_name(&event), "search_documents");
        assert_eq!(display_name(&event), "Search Documents");
    }

    #[test]
    fn explicit_name_wins_over_raw_type() {
        let event = ToolCallEvent::new("c1", "tool-search_documents", ToolCallState::InputStreaming)
            .with_tool_name("fetch_page");
        assert_eq!(resolve_tool_name(&event), "fetch_page");
    }

    #[test]
    fn unprefixed_raw_type_is_used_verbatim() {
        let event = ToolCallEvent::new("c1", "dynamic-tool", ToolCallState::InputStreaming);
        assert_eq!(resolve_tool_name(&event), "dynamic-tool");
        let bare_prefix = ToolCallEvent::new("c2", "tool-", ToolCallState::InputStreaming);
        assert_eq!(resolve_tool_name(&bare_prefix), "tool-");
    }

    #[test]
    fn wrapper_reads_nested_name_from_input() {
        let event = ToolCallEvent::new("c1", "tool-execute_tool", ToolCallState::InputAvailable)
            .with_input(json!({"toolName": "get_user_documents", "args": {}}));
        assert_eq!(resolve_target_tool_name(&event), "get_user_documents");
        assert_eq!(display_name(&event), "Get User Documents");

        let raw = ToolCallEvent::new("c2", "execute_tool", ToolCallState::InputAvailable)
            .with_input(json!({"toolName": "get_user_documents"}));
        assert_eq!(display_name(&raw), "Get User Documents");
    }

    #[test]
    fn wrapper_falls_back_to_output_name_then_itself() {
        let streaming = ToolCallEvent::new("c1", "execute_tool", ToolCallState::InputStreaming)
            .with_input(json!({"partial": true}));
        assert_eq!(resolve_target_tool_name(&streaming), EXECUTE_TOOL_WRAPPER);
        assert_eq!(display_name(&streaming), "Execute Tool");

        let finished = streaming
            .with_output(json!({"toolName": "list_files", "result": []}));
        assert_eq!(resolve_target_tool_name(&finished), "list_files");
    }

    #[test]
    fn humanize_splits_on_underscores_and_dashes() {
        assert_eq!(humanize_tool_name("search_documents"), "Search Documents");
        assert_eq!(humanize_tool_name("web-search__v2"), "Web Search V2");
        assert_eq!(humanize_tool_name("ünicode_name"), "Ünicode Name");
        assert_eq!(humanize_tool_name(""), "");
    }
}
