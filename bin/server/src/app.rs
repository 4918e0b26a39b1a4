//! HTTP routes and handlers.
//!
//! The API is a thin layer over the registry, store, and orchestrator:
//! CRUD for agents, graph synthesis, run triggering (fire-and-forget),
//! execution history, and the ad-hoc planning passthrough.

use crate::error::ApiError;
use amber_relay_agent::{AgentDefinition, AgentEdge, AgentNode, AgentStatus, synthesize_agent};
use amber_relay_core::{AgentId, ExecutionId, OwnerId};
use amber_relay_engine::{AgentRegistry, ExecutionMode, ExecutionStore, Orchestrator};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state.
pub struct AppState {
    pub registry: Arc<dyn AgentRegistry>,
    pub store: Arc<dyn ExecutionStore>,
    pub orchestrator: Arc<Orchestrator>,
    pub owner: OwnerId,
}

/// Builds the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/agents", post(create_agent).get(list_agents))
        .route("/api/v1/agents/synthesize", post(synthesize))
        .route("/api/v1/agents/execute-adhoc", post(execute_adhoc))
        .route(
            "/api/v1/agents/{id}",
            get(get_agent).put(update_agent).delete(delete_agent),
        )
        .route("/api/v1/agents/{id}/execute", post(execute_agent))
        .route("/api/v1/agents/{id}/run", post(execute_agent))
        .route("/api/v1/agents/{id}/executions", get(list_executions))
        .route("/api/v1/executions/{id}", get(get_execution))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn parse_agent_id(raw: &str) -> Result<AgentId, ApiError> {
    AgentId::from_str(raw).map_err(|_| ApiError::BadRequest("Invalid agent id".to_string()))
}

/// Body for creating an agent.
#[derive(Debug, Deserialize)]
pub struct CreateAgentRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<AgentNode>,
    #[serde(default)]
    pub edges: Vec<AgentEdge>,
    #[serde(default)]
    pub status: Option<AgentStatus>,
}

async fn create_agent(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateAgentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut agent = AgentDefinition::new(state.owner.clone(), body.name, body.description)
        .with_graph(body.nodes, body.edges);
    if let Some(status) = body.status {
        agent = agent.with_status(status);
    }
    let agent = state.registry.insert(agent).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

async fn list_agents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AgentDefinition>>, ApiError> {
    Ok(Json(state.registry.find(&state.owner).await?))
}

async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AgentDefinition>, ApiError> {
    let id = parse_agent_id(&id)?;
    state
        .registry
        .find_one(id, &state.owner)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Agent not found".to_string()))
}

/// Body for updating an agent. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateAgentRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub nodes: Option<Vec<AgentNode>>,
    pub edges: Option<Vec<AgentEdge>>,
    pub status: Option<AgentStatus>,
    pub schedule: Option<String>,
}

async fn update_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateAgentRequest>,
) -> Result<Json<AgentDefinition>, ApiError> {
    let id = parse_agent_id(&id)?;
    let mut agent = state
        .registry
        .find_one(id, &state.owner)
        .await?
        .ok_or_else(|| ApiError::NotFound("Agent not found".to_string()))?;

    if let Some(name) = body.name {
        agent.name = name;
    }
    if let Some(description) = body.description {
        agent.description = description;
    }
    if let Some(nodes) = body.nodes {
        agent.nodes = nodes;
    }
    if let Some(edges) = body.edges {
        agent.edges = edges;
    }
    if let Some(status) = body.status {
        agent.status = status;
    }
    if let Some(schedule) = body.schedule {
        agent.schedule = Some(schedule);
    }
    agent.touch();

    state
        .registry
        .update(agent)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Agent not found".to_string()))
}

async fn delete_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_agent_id(&id)?;
    if state.registry.delete(id, &state.owner).await? {
        Ok(Json(json!({ "message": "Agent deleted" })))
    } else {
        Err(ApiError::NotFound("Agent not found".to_string()))
    }
}

/// Body for synthesizing an agent from natural language.
#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub description: String,
    pub name: Option<String>,
}

async fn synthesize(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SynthesizeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.description.trim().is_empty() {
        return Err(ApiError::BadRequest("Description is required".to_string()));
    }
    let name = body.name.unwrap_or_else(|| "Generated Agent".to_string());
    let agent = synthesize_agent(state.owner.clone(), name, body.description);
    let agent = state.registry.insert(agent).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

/// Response for the execute endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub message: &'static str,
    pub agent_id: String,
    pub agent_name: String,
    pub mode: ExecutionMode,
    pub status: &'static str,
}

async fn execute_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ExecuteResponse>, ApiError> {
    let id = parse_agent_id(&id)?;
    let handle = state.orchestrator.start(id, state.owner.clone()).await?;

    let response = ExecuteResponse {
        message: "Agent execution started",
        agent_id: handle.agent_id.to_string(),
        agent_name: handle.agent_name.clone(),
        mode: handle.mode,
        status: "running",
    };
    // fire-and-forget: the run keeps going after the response is sent,
    // and its outcome lands on the execution record
    drop(handle);

    Ok(Json(response))
}

/// Query parameters for the executions listing.
#[derive(Debug, Deserialize)]
pub struct ExecutionsQuery {
    pub limit: Option<usize>,
}

async fn list_executions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ExecutionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_agent_id(&id)?;
    let limit = query.limit.unwrap_or(10);
    let executions = state.store.list_for_agent(id, &state.owner, limit).await?;
    Ok(Json(executions))
}

async fn get_execution(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = ExecutionId::from_str(&id)
        .map_err(|_| ApiError::BadRequest("Invalid execution id".to_string()))?;
    state
        .store
        .find(id, &state.owner)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Execution not found".to_string()))
}

/// Body for ad-hoc execution.
#[derive(Debug, Deserialize)]
pub struct AdhocRequest {
    #[serde(default)]
    pub prompt: String,
}

async fn execute_adhoc(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AdhocRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if body.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("Prompt is required".to_string()));
    }

    // bypasses persistence entirely: no agent, no execution record
    let output = state.orchestrator.run_adhoc(&body.prompt).await?;
    Ok(Json(json!({
        "status": "success",
        "data": {
            "output": output,
            "timestamp": Utc::now(),
        }
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_response_serializes_the_wire_shape() {
        let response = ExecuteResponse {
            message: "Agent execution started",
            agent_id: AgentId::new().to_string(),
            agent_name: "Reporter".to_string(),
            mode: ExecutionMode::SmartAi,
            status: "running",
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["mode"], "smart-ai");
        assert_eq!(json["status"], "running");
        assert!(json.get("agentId").is_some());
        assert!(json.get("agentName").is_some());
    }

    #[test]
    fn adhoc_request_defaults_to_empty_prompt() {
        let body: AdhocRequest = serde_json::from_str("{}").expect("deserialize");
        assert!(body.prompt.is_empty());
    }

    #[test]
    fn create_request_accepts_minimal_body() {
        let body: CreateAgentRequest =
            serde_json::from_str(r#"{"name": "Reporter"}"#).expect("deserialize");
        assert_eq!(body.name, "Reporter");
        assert!(body.nodes.is_empty());
        assert!(body.status.is_none());
    }
}
