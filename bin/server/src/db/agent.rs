//! Postgres repository for agent definitions.

use amber_relay_agent::{AgentDefinition, AgentEdge, AgentNode, AgentStatus};
use amber_relay_core::{AgentId, OwnerId};
use amber_relay_engine::{AgentRegistry, RegistryError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

fn status_as_str(status: AgentStatus) -> &'static str {
    match status {
        AgentStatus::Draft => "draft",
        AgentStatus::Active => "active",
        AgentStatus::Paused => "paused",
    }
}

fn status_from_str(s: &str) -> AgentStatus {
    match s {
        "active" => AgentStatus::Active,
        "paused" => AgentStatus::Paused,
        _ => AgentStatus::Draft,
    }
}

fn backend_error(e: impl std::fmt::Display) -> RegistryError {
    RegistryError::Backend {
        message: e.to_string(),
    }
}

/// Row type for agent queries.
#[derive(FromRow)]
struct AgentRow {
    id: String,
    owner: String,
    name: String,
    description: String,
    status: String,
    nodes: serde_json::Value,
    edges: serde_json::Value,
    triggers: serde_json::Value,
    actions: serde_json::Value,
    schedule: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AgentRow {
    fn try_into_record(self) -> Result<AgentDefinition, RegistryError> {
        let id = AgentId::from_str(&self.id).map_err(backend_error)?;
        let nodes: Vec<AgentNode> = serde_json::from_value(self.nodes).map_err(backend_error)?;
        let edges: Vec<AgentEdge> = serde_json::from_value(self.edges).map_err(backend_error)?;
        let triggers: Vec<String> =
            serde_json::from_value(self.triggers).map_err(backend_error)?;
        let actions: Vec<String> = serde_json::from_value(self.actions).map_err(backend_error)?;

        Ok(AgentDefinition {
            id,
            owner: OwnerId::new(self.owner),
            name: self.name,
            description: self.description,
            nodes,
            edges,
            status: status_from_str(&self.status),
            triggers,
            actions,
            schedule: self.schedule,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const AGENT_COLUMNS: &str = "id, owner, name, description, status, nodes, edges, \
     triggers, actions, schedule, created_at, updated_at";

/// Repository for agent definition storage.
pub struct AgentRepository {
    pool: PgPool,
}

impl AgentRepository {
    /// Creates a new repository.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgentRegistry for AgentRepository {
    async fn insert(&self, agent: AgentDefinition) -> Result<AgentDefinition, RegistryError> {
        sqlx::query(
            r#"
            INSERT INTO agents
                (id, owner, name, description, status, nodes, edges,
                 triggers, actions, schedule, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(agent.id.to_string())
        .bind(agent.owner.as_str())
        .bind(&agent.name)
        .bind(&agent.description)
        .bind(status_as_str(agent.status))
        .bind(serde_json::to_value(&agent.nodes).map_err(backend_error)?)
        .bind(serde_json::to_value(&agent.edges).map_err(backend_error)?)
        .bind(serde_json::to_value(&agent.triggers).map_err(backend_error)?)
        .bind(serde_json::to_value(&agent.actions).map_err(backend_error)?)
        .bind(&agent.schedule)
        .bind(agent.created_at)
        .bind(agent.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend_error)?;

        Ok(agent)
    }

    async fn find(&self, owner: &OwnerId) -> Result<Vec<AgentDefinition>, RegistryError> {
        let rows: Vec<AgentRow> = sqlx::query_as(&format!(
            "SELECT {AGENT_COLUMNS} FROM agents WHERE owner = $1 ORDER BY updated_at DESC"
        ))
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(backend_error)?;

        rows.into_iter().map(AgentRow::try_into_record).collect()
    }

    async fn find_one(
        &self,
        id: AgentId,
        owner: &OwnerId,
    ) -> Result<Option<AgentDefinition>, RegistryError> {
        let row: Option<AgentRow> = sqlx::query_as(&format!(
            "SELECT {AGENT_COLUMNS} FROM agents WHERE id = $1 AND owner = $2"
        ))
        .bind(id.to_string())
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_error)?;

        row.map(AgentRow::try_into_record).transpose()
    }

    async fn update(
        &self,
        agent: AgentDefinition,
    ) -> Result<Option<AgentDefinition>, RegistryError> {
        let result = sqlx::query(
            r#"
            UPDATE agents
            SET name = $3, description = $4, status = $5, nodes = $6, edges = $7,
                triggers = $8, actions = $9, schedule = $10, updated_at = $11
            WHERE id = $1 AND owner = $2
            "#,
        )
        .bind(agent.id.to_string())
        .bind(agent.owner.as_str())
        .bind(&agent.name)
        .bind(&agent.description)
        .bind(status_as_str(agent.status))
        .bind(serde_json::to_value(&agent.nodes).map_err(backend_error)?)
        .bind(serde_json::to_value(&agent.edges).map_err(backend_error)?)
        .bind(serde_json::to_value(&agent.triggers).map_err(backend_error)?)
        .bind(serde_json::to_value(&agent.actions).map_err(backend_error)?)
        .bind(&agent.schedule)
        .bind(agent.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend_error)?;

        if result.rows_affected() == 0 {
            Ok(None)
        } else {
            Ok(Some(agent))
        }
    }

    async fn delete(&self, id: AgentId, owner: &OwnerId) -> Result<bool, RegistryError> {
        let result = sqlx::query("DELETE FROM agents WHERE id = $1 AND owner = $2")
            .bind(id.to_string())
            .bind(owner.as_str())
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrip() {
        for status in [AgentStatus::Draft, AgentStatus::Active, AgentStatus::Paused] {
            assert_eq!(status_from_str(status_as_str(status)), status);
        }
        // unknown strings fall back to draft
        assert_eq!(status_from_str("archived"), AgentStatus::Draft);
    }

    #[test]
    fn row_conversion_rejects_bad_id() {
        let row = AgentRow {
            id: "not-a-ulid".to_string(),
            owner: "tenant-1".to_string(),
            name: "x".to_string(),
            description: String::new(),
            status: "draft".to_string(),
            nodes: serde_json::json!([]),
            edges: serde_json::json!([]),
            triggers: serde_json::json!([]),
            actions: serde_json::json!([]),
            schedule: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(row.try_into_record().is_err());
    }

    #[test]
    fn row_conversion_parses_graph_lists() {
        let agent_id = AgentId::new();
        let row = AgentRow {
            id: agent_id.to_string(),
            owner: "tenant-1".to_string(),
            name: "Reporter".to_string(),
            description: "daily email".to_string(),
            status: "active".to_string(),
            nodes: serde_json::json!([{
                "id": "trigger-1",
                "type": "scheduleTrigger",
                "position": {"x": 100.0, "y": 50.0},
                "data": {"label": "Schedule Trigger", "type": "trigger"}
            }]),
            edges: serde_json::json!([]),
            triggers: serde_json::json!(["Schedule Trigger"]),
            actions: serde_json::json!(["Send Email"]),
            schedule: Some("Daily".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let agent = row.try_into_record().expect("valid row");
        assert_eq!(agent.id, agent_id);
        assert_eq!(agent.status, AgentStatus::Active);
        assert_eq!(agent.nodes.len(), 1);
        assert_eq!(agent.triggers, vec!["Schedule Trigger"]);
    }
}
