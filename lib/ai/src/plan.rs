//! Execution plan model and response parsing.
//!
//! A plan is produced fresh for every run and never persisted on its own.
//! Its step kinds are a trust boundary: the `type` field comes back from
//! an AI model (or user input on the graph path), so the enum closes over
//! the known kinds and carries everything else in `Unknown`. Downstream
//! dispatch is total and unknown kinds are a deliberate no-op, never an
//! error.

use serde::{Deserialize, Serialize};

/// The kind of work a plan step describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepKind {
    /// Call an external HTTP API.
    ApiCall,
    /// Read rows from the configured tabular data source.
    DataFetch,
    /// Send the configured notification email.
    Email,
    /// AI analysis over prior data.
    Analysis,
    /// Generic automation work.
    Automation,
    /// Any kind outside the known set, preserved verbatim.
    Unknown(String),
}

impl StepKind {
    /// Returns the wire tag for this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ApiCall => "api_call",
            Self::DataFetch => "data_fetch",
            Self::Email => "email",
            Self::Analysis => "analysis",
            Self::Automation => "automation",
            Self::Unknown(tag) => tag,
        }
    }
}

impl From<String> for StepKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "api_call" => Self::ApiCall,
            // google_sheets is the legacy alias for spreadsheet reads
            "data_fetch" | "google_sheets" => Self::DataFetch,
            "email" => Self::Email,
            "analysis" => Self::Analysis,
            "automation" => Self::Automation,
            _ => Self::Unknown(tag),
        }
    }
}

impl From<StepKind> for String {
    fn from(kind: StepKind) -> Self {
        kind.as_str().to_string()
    }
}

fn default_step_status() -> String {
    "planned".to_string()
}

/// One planned unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    /// What to do, as a short imperative phrase.
    pub action: String,
    /// Step kind; drives interpreter dispatch.
    #[serde(rename = "type")]
    pub kind: StepKind,
    /// Free-text elaboration of the step.
    #[serde(default)]
    pub details: String,
    /// Display status supplied by the planner; not a state machine.
    #[serde(default = "default_step_status")]
    pub status: String,
}

impl PlanStep {
    /// Creates a step in the default "planned" status.
    #[must_use]
    pub fn new(action: impl Into<String>, kind: StepKind, details: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            kind,
            details: details.into(),
            status: default_step_status(),
        }
    }
}

/// An ordered list of steps plus a summary, generated per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Steps in execution order.
    #[serde(default)]
    pub steps: Vec<PlanStep>,
    /// Short human-readable description of the plan.
    #[serde(default)]
    pub summary: String,
}

impl Plan {
    /// Creates a plan from steps and a summary.
    #[must_use]
    pub fn new(steps: Vec<PlanStep>, summary: impl Into<String>) -> Self {
        Self {
            steps,
            summary: summary.into(),
        }
    }

    /// The plan substituted for any response that fails to parse.
    #[must_use]
    pub fn unparseable() -> Self {
        Self {
            steps: Vec::new(),
            summary: "Failed to parse AI response".to_string(),
        }
    }

    /// Returns true if the plan has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Removes markdown code-fence markup from a model response.
///
/// Every ```` ```json ```` marker (any case on the language tag) and every
/// bare ```` ``` ```` marker is removed, mirroring the global replace the
/// response format has always tolerated.
fn strip_code_fences(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(b"```") {
            i += 3;
            // swallow a "json" language tag in any case
            if bytes[i..].len() >= 4 && bytes[i..i + 4].eq_ignore_ascii_case(b"json") {
                i += 4;
            }
        } else {
            // text is valid UTF-8, so copy the full scalar value
            let ch = text[i..].chars().next().unwrap_or('\u{FFFD}');
            cleaned.push(ch);
            i += ch.len_utf8();
        }
    }
    cleaned.trim().to_string()
}

/// Parses a plan out of a raw model response.
///
/// Surrounding code-fence markup is stripped first. Any parse failure
/// yields [`Plan::unparseable`]: a malformed response must never crash a
/// run, it just produces an empty plan.
#[must_use]
pub fn parse_plan(response: &str) -> Plan {
    let trimmed = response.trim();
    let cleaned = if trimmed.starts_with("```") {
        strip_code_fences(trimmed)
    } else {
        trimmed.to_string()
    };
    serde_json::from_str(&cleaned).unwrap_or_else(|_| Plan::unparseable())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN_JSON: &str = r#"{
        "steps": [
            {"action": "Fetch the sheet", "type": "data_fetch", "details": "rows A1:C100", "status": "planned"},
            {"action": "Send the report", "type": "email", "details": "", "status": "planned"}
        ],
        "summary": "Fetch then email"
    }"#;

    #[test]
    fn parses_bare_json() {
        let plan = parse_plan(PLAN_JSON);
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].kind, StepKind::DataFetch);
        assert_eq!(plan.summary, "Fetch then email");
    }

    #[test]
    fn fenced_json_parses_identically() {
        let fenced = format!("```json\n{PLAN_JSON}\n```");
        assert_eq!(parse_plan(&fenced), parse_plan(PLAN_JSON));

        let upper = format!("```JSON\n{PLAN_JSON}\n```");
        assert_eq!(parse_plan(&upper), parse_plan(PLAN_JSON));
    }

    #[test]
    fn garbage_degrades_to_empty_plan() {
        let plan = parse_plan("I could not produce a plan, sorry!");
        assert!(plan.is_empty());
        assert_eq!(plan.summary, "Failed to parse AI response");
    }

    #[test]
    fn fenced_garbage_degrades_to_empty_plan() {
        let plan = parse_plan("```\nnot json at all\n```");
        assert!(plan.is_empty());
        assert_eq!(plan.summary, "Failed to parse AI response");
    }

    #[test]
    fn unknown_step_kind_is_preserved() {
        let plan = parse_plan(
            r#"{"steps": [{"action": "x", "type": "quantum_leap"}], "summary": "s"}"#,
        );
        assert_eq!(
            plan.steps[0].kind,
            StepKind::Unknown("quantum_leap".to_string())
        );
        assert_eq!(plan.steps[0].status, "planned");
    }

    #[test]
    fn google_sheets_alias_normalizes_to_data_fetch() {
        let plan = parse_plan(
            r#"{"steps": [{"action": "x", "type": "google_sheets"}], "summary": "s"}"#,
        );
        assert_eq!(plan.steps[0].kind, StepKind::DataFetch);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let plan = parse_plan(r#"{"summary": "nothing to do"}"#);
        assert!(plan.steps.is_empty());
        assert_eq!(plan.summary, "nothing to do");
    }

    #[test]
    fn step_kind_serializes_to_wire_tag() {
        let step = PlanStep::new("call it", StepKind::ApiCall, "GET /x");
        let json = serde_json::to_value(&step).expect("serialize");
        assert_eq!(json["type"], "api_call");
    }
}
