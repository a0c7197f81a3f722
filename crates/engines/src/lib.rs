//! `stockline-engines`
//!
//! **Responsibility:** the three AI-assisted decision engines and the policy
//! that keeps them available when the AI is not.
//!
//! Doctrine, in order of importance:
//! - The deterministic computation is the engine. It always runs, it is pure,
//!   and re-running it on an unchanged snapshot yields identical output.
//! - The advisor (external model) only ever *enriches text* — reorder
//!   reasons, anomaly explanations — or proposes a filter that is validated
//!   against a closed schema. It never decides what to reorder, never flags
//!   or unflags an anomaly, and never mutates domain state.
//! - Advisor failure is not a failure. Timeout, transport error, malformed
//!   payload and schema rejection all degrade silently to the fallback; the
//!   only caller-visible difference is the provenance tag.

pub mod advisor;
pub mod anomaly;
pub mod coordinator;
pub mod decision;
pub mod intent;
pub mod reorder;

pub use advisor::{extract_json_object, Advisor, AdvisorError, AdvisorPrompt};
pub use anomaly::{AnomalyAlert, AnomalyParams, Severity};
pub use coordinator::FallbackCoordinator;
pub use decision::Decision;
pub use intent::QueryIntent;
pub use reorder::ReorderSuggestion;
