//! Built-in fallbacks for chat-tool settings.

pub const KEY_TOOLS_ENABLED: &str = "agent.tools.enabled";
pub const KEY_TOOLS_MAX_STEPS: &str = "agent.tools.maxSteps";
pub const KEY_TOOLS_SYSTEM_PROMPT: &str = "agent.tools.systemPrompt";

pub const DEFAULT_TOOLS_ENABLED: bool = true;
pub const DEFAULT_TOOLS_MAX_STEPS: u32 = 10;

/// Instruction text used when the backend supplies no system prompt.
///
/// Must name both `discover_tools` and `execute_tool`; the chat UI checks for
/// them when deciding whether the tool-calling preamble is present.
pub const DEFAULT_TOOLS_SYSTEM_PROMPT: &str = "You can use remote tools to help the user. \
Call discover_tools first to list the tools available in this session and read their input \
schemas. Then call execute_tool with the chosen tool's name as toolName and its arguments. \
Only call tools that discover_tools returned, never invent tool names, and summarise tool \
results for the user instead of pasting them verbatim.";
