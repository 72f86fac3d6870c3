use rust_mcp_schema::Tool;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Tools advertised by one MCP server, in listing order.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<Tool>,
    index: HashMap<String, usize>,
}

impl ToolCatalog {
    /// Builds a catalog from listing pages. A name listed twice keeps its
    /// first definition.
    pub fn from_tools(tools: impl IntoIterator<Item = Tool>) -> Self {
        let mut catalog = Self::default();
        for tool in tools {
            if catalog.index.contains_key(&tool.name) {
                debug!(tool = %tool.name, "Ignoring duplicate tool definition");
                continue;
            }
            catalog.index.insert(tool.name.clone(), catalog.tools.len());
            catalog.tools.push(tool);
        }
        catalog
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.index.get(name).map(|&position| &self.tools[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|tool| tool.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tool> {
        self.tools.iter()
    }

    /// The tool's `inputSchema` as a JSON value, ready for validation.
    pub fn input_schema(&self, name: &str) -> Option<Value> {
        let tool = self.get(name)?;
        serde_json::to_value(&tool.input_schema).ok()
    }
}

impl<'a> IntoIterator for &'a ToolCatalog {
    type Item = &'a Tool;
    type IntoIter = std::slice::Iter<'a, Tool>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
pub(crate) fn tool(name: &str, schema: Value) -> Tool {
    serde_json::from_value(serde_json::json!({
        "name": name,
        "inputSchema": schema,
        "icons": []
    }))
    .expect("tool should parse")
}
