use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use matchday_registry::RecipientRegistry;
use matchday_scheduler::SchedulerHandle;
use matchday_telegram::RegistrationStatus;

/// State behind the liveness probe.
pub struct AppState {
    pub scheduler: SchedulerHandle,
    pub registry: RecipientRegistry,
    /// Present only in webhook mode.
    pub registration: Option<RegistrationStatus>,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health — liveness probe, returns scheduler and registration state.
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let webhook = match &state.registration {
        Some(status) if status.matched() => "matched",
        Some(_) => "mismatched",
        None => "n/a",
    };
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "pending_reminders": state.scheduler.pending_count(),
        "next_fire_at": state.scheduler.next_fire_at().map(|dt| dt.to_rfc3339()),
        "recipients": state.registry.count().unwrap_or(0),
        "webhook": webhook,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchday_scheduler::SchedulerEngine;

    fn state(registration: Option<RegistrationStatus>) -> Arc<AppState> {
        let (tx, _rx) = tokio::sync::mpsc::channel(4);
        Arc::new(AppState {
            scheduler: SchedulerEngine::new(tx).handle(),
            registry: RecipientRegistry::new(rusqlite::Connection::open_in_memory().unwrap())
                .unwrap(),
            registration,
        })
    }

    #[tokio::test]
    async fn health_reports_ok_and_counts() {
        let state = state(None);
        state.registry.add("1001").unwrap();

        let Json(body) = health_handler(State(state)).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["pending_reminders"], 0);
        assert_eq!(body["recipients"], 1);
        assert_eq!(body["webhook"], "n/a");
    }

    #[tokio::test]
    async fn health_reports_webhook_mismatch_until_first_check() {
        let Json(body) = health_handler(State(state(Some(RegistrationStatus::new())))).await;
        assert_eq!(body["webhook"], "mismatched");
    }
}
