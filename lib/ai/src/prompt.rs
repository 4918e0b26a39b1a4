//! The plan generation prompt.
//!
//! The template is fixed: only the task description is interpolated, and
//! the response contract (strict JSON, the exact step shape) is part of
//! the template text itself.

/// Builds the planning prompt for a task description.
#[must_use]
pub fn plan_prompt(task: &str) -> String {
    format!(
        r#"You are an AI automation agent. Understand this user automation task and generate a structured execution plan.
Task: "{task}"
Return STRICT JSON ONLY. Format exactly like:
{{
  "steps": [
    {{
      "action": "What to do",
      "type": "api_call | data_fetch | email | analysis | automation",
      "details": "Explain specifically",
      "status": "planned"
    }}
  ],
  "summary": "Short description"
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_the_task() {
        let prompt = plan_prompt("email me the weather daily");
        assert!(prompt.contains("\"email me the weather daily\""));
        assert!(prompt.contains("STRICT JSON ONLY"));
    }

    #[test]
    fn prompt_names_every_known_step_kind() {
        let prompt = plan_prompt("x");
        for kind in ["api_call", "data_fetch", "email", "analysis", "automation"] {
            assert!(prompt.contains(kind));
        }
    }
}
