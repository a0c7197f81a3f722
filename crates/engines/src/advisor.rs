//! Advisor (external model) boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// A structured prompt for one advisor call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorPrompt {
    /// Instruction framing, including the required strict-JSON shape.
    pub system: String,
    /// The snapshot/query payload, already serialized.
    pub user: String,
}

impl AdvisorPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Advisor call failure.
///
/// Every variant is absorbed by the coordinator; none of these ever reach an
/// engine caller.
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("advisor call timed out")]
    Timeout,

    #[error("advisor unavailable: {0}")]
    Unavailable(String),

    #[error("malformed advisor payload: {0}")]
    Malformed(String),
}

/// The external AI collaborator.
///
/// One call, one structured JSON result. Implementations must respect their
/// own transport timeout; the coordinator additionally races the whole call
/// against its budget.
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Model identifier reported in `Decision::Ai`.
    fn model(&self) -> &str;

    async fn complete(&self, prompt: &AdvisorPrompt) -> Result<JsonValue, AdvisorError>;
}

/// Pull the first top-level JSON object out of free-form model output.
///
/// Models wrap JSON in prose or code fences often enough that a strict parse
/// of the whole response would reject usable answers; schema validation
/// afterwards is what actually gates trust.
pub fn extract_json_object(text: &str) -> Option<JsonValue> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    let parsed: JsonValue = serde_json::from_str(&text[start..=end]).ok()?;
    parsed.is_object().then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_from_fenced_output() {
        let text = "Sure! Here you go:\n```json\n{\"reasons\": {\"A\": \"low\"}}\n```";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["reasons"]["A"], "low");
    }

    #[test]
    fn rejects_non_object_and_garbage() {
        assert!(extract_json_object("[1, 2, 3]").is_none());
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("} backwards {").is_none());
    }
}
