//! MCP tool parameter structs with schemars-derived JSON schemas.

use schemars::JsonSchema;
use serde::Deserialize;

// ── Link params ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateLinkParams {
    #[schemars(description = "Source entity type: data, factor, strategy, note, research, experience or tag")]
    pub source_type: String,
    #[schemars(description = "Source entity ID")]
    pub source_id: String,
    #[schemars(description = "Target entity type")]
    pub target_type: String,
    #[schemars(description = "Target entity ID")]
    pub target_id: String,
    #[schemars(description = "Relation: derived_from, applied_to, verifies, references, summarizes, has_tag or related")]
    pub relation: String,
    #[schemars(description = "Surface the edge on reverse lookups (defaults to true only for 'related')")]
    pub is_bidirectional: Option<bool>,
    #[schemars(description = "Free-form JSON object stored with the edge")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LinkKeyParams {
    pub source_type: String,
    pub source_id: String,
    pub target_type: String,
    pub target_id: String,
    #[schemars(description = "Relation of the edge to delete")]
    pub relation: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetEdgesParams {
    #[schemars(description = "Entity type")]
    pub entity_type: String,
    #[schemars(description = "Entity ID")]
    pub entity_id: String,
    #[schemars(description = "Also return incoming edges flagged bidirectional (default true)")]
    pub include_bidirectional: Option<bool>,
}

// ── Traversal params ────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TraceLineageParams {
    pub entity_type: String,
    pub entity_id: String,
    #[schemars(description = "'backward' (what it depends on, default) or 'forward' (what depends on it)")]
    pub direction: Option<String>,
    #[schemars(description = "Maximum depth, 1-10 (default 5)")]
    pub max_depth: Option<i64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FindPathParams {
    pub source_type: String,
    pub source_id: String,
    pub target_type: String,
    pub target_id: String,
    #[schemars(description = "Maximum number of hops, 1-10 (default 5)")]
    pub max_depth: Option<i64>,
}

// ── Tag params ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TagParams {
    pub entity_type: String,
    pub entity_id: String,
    #[schemars(description = "Tag text")]
    pub tag: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EntityParams {
    #[schemars(description = "Entity type")]
    pub entity_type: String,
    #[schemars(description = "Entity ID")]
    pub entity_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EntitiesByTagParams {
    #[schemars(description = "Tag text")]
    pub tag: String,
    #[schemars(description = "Only return entities of this type")]
    pub entity_type: Option<String>,
}
