//! MCP server for quantlink: exposes the edge, lineage, path and tag
//! operations via the Model Context Protocol.
//!
//! Tools: 4 link + 2 traversal + 5 tag = 11 total.

pub mod params;

use params::*;
use crate::error::QuantlinkResult;
use crate::events::TracingObserver;
use crate::QuantlinkApi;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ok_text(text: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn err_text(msg: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg)]))
}

/// Render an API response as pretty JSON, or its error as an error result.
fn respond<T: Serialize>(result: QuantlinkResult<T>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(response) => match serde_json::to_string_pretty(&response) {
            Ok(json) => ok_text(json),
            Err(e) => err_text(format!("failed to serialize response: {}", e)),
        },
        Err(e) => err_text(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// QuantlinkMcpServer
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct QuantlinkMcpServer {
    api: QuantlinkApi,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl QuantlinkMcpServer {
    pub fn new(api: QuantlinkApi) -> Self {
        Self {
            api,
            tool_router: Self::tool_router(),
        }
    }

    // ── Link tools ──────────────────────────────────────────────────────

    #[tool(description = "Create a typed relationship between two research entities (no-op if it already exists)")]
    fn create_link(
        &self,
        Parameters(p): Parameters<CreateLinkParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.api.create_link(
            &p.source_type,
            &p.source_id,
            &p.target_type,
            &p.target_id,
            &p.relation,
            p.is_bidirectional,
            p.metadata,
        ))
    }

    #[tool(description = "Delete a relationship identified by source, target and relation")]
    fn delete_link(
        &self,
        Parameters(p): Parameters<LinkKeyParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.api.delete_link(
            &p.source_type,
            &p.source_id,
            &p.target_type,
            &p.target_id,
            &p.relation,
        ))
    }

    #[tool(description = "List an entity's outgoing relationships, plus incoming bidirectional ones")]
    fn get_edges(
        &self,
        Parameters(p): Parameters<GetEdgesParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.api.get_edges(
            &p.entity_type,
            &p.entity_id,
            p.include_bidirectional.unwrap_or(true),
        ))
    }

    #[tool(description = "Remove every relationship touching an entity (call when the entity is deleted)")]
    fn delete_entity(
        &self,
        Parameters(p): Parameters<EntityParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.api.delete_entity(&p.entity_type, &p.entity_id))
    }

    // ── Traversal tools ─────────────────────────────────────────────────

    #[tool(description = "Trace lineage: what an entity derives from (backward) or what depends on it (forward)")]
    fn trace_lineage(
        &self,
        Parameters(p): Parameters<TraceLineageParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.api.trace_lineage(
            &p.entity_type,
            &p.entity_id,
            p.direction.as_deref(),
            p.max_depth,
        ))
    }

    #[tool(description = "Find the shortest connection between two entities, ignoring edge direction")]
    fn find_path(
        &self,
        Parameters(p): Parameters<FindPathParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.api.find_path(
            &p.source_type,
            &p.source_id,
            &p.target_type,
            &p.target_id,
            p.max_depth,
        ))
    }

    // ── Tag tools ───────────────────────────────────────────────────────

    #[tool(description = "Attach a tag to an entity")]
    fn add_tag(&self, Parameters(p): Parameters<TagParams>) -> Result<CallToolResult, McpError> {
        respond(self.api.add_tag(&p.entity_type, &p.entity_id, &p.tag))
    }

    #[tool(description = "Detach a tag from an entity")]
    fn remove_tag(&self, Parameters(p): Parameters<TagParams>) -> Result<CallToolResult, McpError> {
        respond(self.api.remove_tag(&p.entity_type, &p.entity_id, &p.tag))
    }

    #[tool(description = "List an entity's tags, most recent first")]
    fn get_entity_tags(
        &self,
        Parameters(p): Parameters<EntityParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.api.get_entity_tags(&p.entity_type, &p.entity_id))
    }

    #[tool(description = "List entities carrying a tag, optionally filtered by entity type")]
    fn get_entities_by_tag(
        &self,
        Parameters(p): Parameters<EntitiesByTagParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.api
                .get_entities_by_tag(&p.tag, p.entity_type.as_deref()),
        )
    }

    #[tool(description = "List all tags with usage counts")]
    fn list_all_tags(&self) -> Result<CallToolResult, McpError> {
        respond(self.api.list_all_tags())
    }
}

#[tool_handler]
impl ServerHandler for QuantlinkMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "quantlink MCP server: lineage, paths and tags across research artifacts (data, factors, strategies, notes, research)"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run_mcp_server(db_path: PathBuf) -> i32 {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            return 1;
        }
    };

    rt.block_on(async {
        let api = match QuantlinkApi::open(&db_path) {
            Ok(api) => api.with_observer(Arc::new(TracingObserver)),
            Err(e) => {
                eprintln!("failed to open database at {}: {}", db_path.display(), e);
                return 1;
            }
        };

        let server = QuantlinkMcpServer::new(api);

        tracing::info!("quantlink mcp server starting on stdio ({})", db_path.display());

        let service = match server.serve(rmcp::transport::stdio()).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("failed to start MCP server: {}", e);
                return 1;
            }
        };

        if let Err(e) = service.waiting().await {
            eprintln!("MCP server error: {}", e);
            return 1;
        }

        0
    })
}
