//! Tool system for external agent runtimes.
//!
//! Each coordination action is also exposed as a JSON-schema'd tool so an
//! agent loop can call it by name with JSON arguments. Tools return a JSON
//! document as a string. Outcome text still comes from the [`ToolContext`]'s
//! responder, and notes live in the context's own notepad.

mod calendar;
mod contact;
mod email;
mod human;
mod notes;
mod sql;

pub use calendar::ScheduleCalendar;
pub use contact::CallContact;
pub use email::SendEmail;
pub use human::HumanInLoop;
pub use notes::ManageNotes;
pub use sql::{AnalyzeQueryPerformance, ExecuteSqlQuery};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::notes::Notepad;
use crate::responder::Responder;

/// Notepad shared by the tools of one context.
pub type SharedNotepad = Arc<RwLock<Notepad>>;

/// Everything a tool may touch while executing.
#[derive(Clone)]
pub struct ToolContext {
    pub responder: Arc<dyn Responder>,
    pub notes: SharedNotepad,
}

impl ToolContext {
    /// Context with a fresh, empty notepad.
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self {
            responder,
            notes: Arc::new(RwLock::new(Notepad::new())),
        }
    }
}

/// Information about a tool for display purposes.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Function-calling schema for a tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Trait for implementing tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool.
    fn name(&self) -> &str;

    /// A description of what this tool does.
    fn description(&self) -> &str;

    /// JSON schema for the tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<String>;
}

/// Registry of available tools.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new registry with all built-in tools.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(CallContact));
        registry.register(Arc::new(ScheduleCalendar));
        registry.register(Arc::new(SendEmail));
        registry.register(Arc::new(ManageNotes));
        registry.register(Arc::new(HumanInLoop));
        registry.register(Arc::new(ExecuteSqlQuery));
        registry.register(Arc::new(AnalyzeQueryPerformance));
        tracing::debug!("Tool registry ready with {} tools", registry.tools.len());
        registry
    }

    /// Create an empty registry (no built-in tools).
    pub fn empty() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// List all available tools, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolInfo> {
        let mut tools: Vec<ToolInfo> = self
            .tools
            .values()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Check if a tool exists by name.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get tool schemas in function-calling format.
    pub fn get_tool_schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self
            .tools
            .values()
            .map(|t| ToolSchema {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Execute a tool by name.
    pub async fn execute(
        &self,
        name: &str,
        args: Value,
        ctx: &ToolContext,
    ) -> anyhow::Result<String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: {}", name))?;

        tool.execute(args, ctx).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
