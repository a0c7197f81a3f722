//! Decision fallback coordinator.
//!
//! Shared policy wrapping every engine: the deterministic payload is computed
//! by the caller before this point and is the answer of record; the advisor
//! call only races a bounded timeout for a chance to enrich it. No advisor
//! outcome can fail a request or delay the deterministic result beyond the
//! budget, and the advisor never holds any store lock — it sees only
//! already-read snapshots serialized into the prompt.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::advisor::{Advisor, AdvisorPrompt};
use crate::decision::Decision;

/// Default advisor budget: a few seconds, never indefinite.
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(4);

#[derive(Clone)]
pub struct FallbackCoordinator {
    advisor: Option<Arc<dyn Advisor>>,
    budget: Duration,
}

impl FallbackCoordinator {
    pub fn new(advisor: Arc<dyn Advisor>, budget: Duration) -> Self {
        Self {
            advisor: Some(advisor),
            budget,
        }
    }

    /// Coordinator with no advisor configured: every decision is a fallback.
    pub fn offline() -> Self {
        Self {
            advisor: None,
            budget: DEFAULT_BUDGET,
        }
    }

    pub fn is_online(&self) -> bool {
        self.advisor.is_some()
    }

    /// Resolve one decision.
    ///
    /// `fallback` is the finished deterministic payload. `prompt` is `None`
    /// when there is nothing worth asking (e.g. an empty candidate list).
    /// `enrich` validates the advisor's JSON against the engine's schema and
    /// returns the enriched payload, or `None` to reject it — rejection is
    /// silent and yields the fallback.
    pub async fn resolve<T, F>(
        &self,
        engine: &'static str,
        prompt: Option<AdvisorPrompt>,
        fallback: T,
        enrich: F,
    ) -> Decision<T>
    where
        F: FnOnce(&T, &JsonValue) -> Option<T>,
    {
        let (Some(advisor), Some(prompt)) = (self.advisor.as_deref(), prompt) else {
            return Decision::Fallback { payload: fallback };
        };

        let outcome = tokio::time::timeout(self.budget, advisor.complete(&prompt)).await;

        let value = match outcome {
            Err(_) => {
                warn!(engine, budget_ms = self.budget.as_millis() as u64, "advisor timed out; using fallback");
                return Decision::Fallback { payload: fallback };
            }
            Ok(Err(err)) => {
                warn!(engine, error = %err, "advisor call failed; using fallback");
                return Decision::Fallback { payload: fallback };
            }
            Ok(Ok(value)) => value,
        };

        match enrich(&fallback, &value) {
            Some(payload) => {
                debug!(engine, model = advisor.model(), "advisor enrichment accepted");
                Decision::Ai {
                    model: advisor.model().to_string(),
                    payload,
                }
            }
            None => {
                warn!(engine, "advisor response failed schema validation; using fallback");
                Decision::Fallback { payload: fallback }
            }
        }
    }
}

impl core::fmt::Debug for FallbackCoordinator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FallbackCoordinator")
            .field("online", &self.is_online())
            .field("budget", &self.budget)
            .finish()
    }
}
