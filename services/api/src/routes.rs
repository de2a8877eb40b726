use crate::infra::{AppState, LedgerService};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use credit_core::error::AppError;
use credit_core::lending::{lending_router, CreditScoreRecord, CustomerId, LendingServiceError};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_lending_routes(service: Arc<LedgerService>) -> axum::Router {
    lending_router(service.clone())
        .route(
            "/credit-score/:customer_id",
            axum::routing::get(credit_score_endpoint).layer(Extension(service)),
        )
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Last stored score snapshot; 404 until the customer has been through an eligibility check.
pub(crate) async fn credit_score_endpoint(
    Extension(service): Extension<Arc<LedgerService>>,
    Path(customer_id): Path<u64>,
) -> Result<Json<CreditScoreRecord>, AppError> {
    let customer_id = CustomerId(customer_id);
    service
        .credit_score(customer_id)?
        .map(Json)
        .ok_or(AppError::Lending(LendingServiceError::CustomerNotFound(
            customer_id,
        )))
}
