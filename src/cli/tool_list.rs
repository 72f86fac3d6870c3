use std::error::Error;

use crate::core::config::ClientConfig;
use crate::core::session::SessionIdentity;
use crate::mcp::{McpSessionManager, ToolCatalog};
use crate::tools::names::humanize_tool_name;

pub fn format_catalog(catalog: &ToolCatalog) -> String {
    if catalog.is_empty() {
        return "No tools advertised.\n".to_string();
    }

    let mut output = format!("{} tool(s):\n", catalog.len());
    for tool in catalog {
        let title = tool
            .title
            .clone()
            .unwrap_or_else(|| humanize_tool_name(&tool.name));
        output.push_str(&format!("- {} ({})\n", tool.name, title));
        if let Some(description) = tool
            .description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
        {
            output.push_str(&format!("    {}\n", description.lines().next().unwrap_or("")));
        }
    }
    output
}

pub async fn list_tools(
    client: reqwest::Client,
    config: &ClientConfig,
    session: &SessionIdentity,
    remote_url: &str,
    token_name: &str,
) -> Result<(), Box<dyn Error>> {
    let manager = McpSessionManager::new(client, config.gateway_url());
    let mut mcp_session = match manager.open(session, remote_url, token_name).await {
        Ok(mcp_session) => mcp_session,
        Err(err) if err.is_unauthorized() => {
            return Err(format!("{err}\nSign in again and refresh the session identity.").into())
        }
        Err(err) => return Err(err.into()),
    };

    print!("{}", format_catalog(mcp_session.catalog()));
    manager.close(&mut mcp_session).await;
    Ok(())
}
