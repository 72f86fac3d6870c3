use std::error::Error;

use crate::core::config::{ChatToolConfig, ClientConfig};
use crate::core::session::SessionIdentity;
use crate::gateway::settings::SettingsClient;

pub fn format_chat_tool_config(config: &ChatToolConfig) -> String {
    let mut output = String::new();
    output.push_str(&format!("enabled:    {}\n", config.enabled));
    output.push_str(&format!("max steps:  {}\n", config.max_steps));
    output.push_str("system prompt:\n");
    for line in config.system_prompt.lines() {
        output.push_str("  ");
        output.push_str(line);
        output.push('\n');
    }
    output
}

pub async fn show_settings(
    client: reqwest::Client,
    config: &ClientConfig,
    session: &SessionIdentity,
) -> Result<(), Box<dyn Error>> {
    let settings = SettingsClient::new(client, config.backend_url());
    let resolved = settings.fetch_chat_tool_config(session).await?;
    print!("{}", format_chat_tool_config(&resolved));
    Ok(())
}
