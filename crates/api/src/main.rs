use std::sync::Arc;

use stockline_engines::{Advisor, FallbackCoordinator};
use stockline_store::advisor::{advisor_budget_from_env, OpenAiAdvisor};
use stockline_store::{InventoryService, MemoryStore};

#[tokio::main]
async fn main() {
    stockline_observability::init();

    let coordinator = match OpenAiAdvisor::from_env() {
        Some(advisor) => {
            tracing::info!(model = advisor.model(), "advisor configured");
            FallbackCoordinator::new(Arc::new(advisor), advisor_budget_from_env())
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set; all decisions use the deterministic fallback");
            FallbackCoordinator::offline()
        }
    };

    let service = InventoryService::new(Arc::new(MemoryStore::new()), coordinator);

    if let Err(e) = stockline_api::app::seed::seed_demo(&service) {
        tracing::error!(error = %e, "demo seed failed");
        std::process::exit(1);
    }

    let app = stockline_api::app::build_app(service);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
