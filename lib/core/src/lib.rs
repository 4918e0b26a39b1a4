//! Core domain types for the amber-relay automation platform.
//!
//! Provides the strongly-typed identifiers shared by every other crate:
//! ULID-backed ids for agents and executions, and the opaque owner
//! subject that scopes all registry and store operations.

pub mod id;

pub use id::{AgentId, ExecutionId, OwnerId, ParseIdError};
