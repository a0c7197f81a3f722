use serde::{Deserialize, Serialize};

/// A decision result with its provenance.
///
/// The payload of both variants comes from the same deterministic
/// computation; the `Ai` variant additionally carries advisor-enriched text
/// and the model id that produced it. Chosen by the coordinator, never by
/// subclassing or flags inside the engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Decision<T> {
    Ai { model: String, payload: T },
    Fallback { payload: T },
}

impl<T> Decision<T> {
    pub fn source(&self) -> &'static str {
        match self {
            Decision::Ai { .. } => "ai",
            Decision::Fallback { .. } => "fallback",
        }
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            Decision::Ai { model, .. } => Some(model),
            Decision::Fallback { .. } => None,
        }
    }

    pub fn payload(&self) -> &T {
        match self {
            Decision::Ai { payload, .. } | Decision::Fallback { payload } => payload,
        }
    }

    pub fn into_payload(self) -> T {
        match self {
            Decision::Ai { payload, .. } | Decision::Fallback { payload } => payload,
        }
    }
}
