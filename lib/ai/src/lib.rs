//! AI plan generation for the amber-relay automation platform.
//!
//! This crate owns the intent-driven planning path:
//!
//! - **Plan Model**: ordered typed steps plus a summary, with a total
//!   step-kind dispatch (unknown kinds are first-class, not errors)
//! - **Prompt**: the fixed template sent to the plan inference service
//! - **Parsing**: code-fence-tolerant strict-JSON parsing that degrades
//!   to an empty plan instead of failing the run
//! - **Backend**: the narrow interface to the external inference service

pub mod backend;
pub mod error;
pub mod plan;
pub mod prompt;

pub use backend::{HttpPlanBackend, PlanBackend};
pub use error::PlanError;
pub use plan::{Plan, PlanStep, StepKind, parse_plan};
pub use prompt::plan_prompt;
