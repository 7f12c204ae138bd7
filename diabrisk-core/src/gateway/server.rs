//! Gateway routes built on axum.

use super::api::{ApiError, DatasetQuery, DatasetResponse, HealthResponse};
use crate::context::{PredictionOutcome, SharedContext};
use crate::form::{FormSchema, PatientForm, form_schema};
use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    routing::{get, post},
};
use diabrisk_ml::{ArtifactSummary, LoadStatus};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the axum router for the gateway.
pub fn router(ctx: SharedContext) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/model", get(model_handler))
        .route("/api/dataset", get(dataset_handler))
        .route("/api/form", get(form_handler))
        .route("/api/predict", post(predict_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Health check endpoint.
async fn health_handler(State(ctx): State<SharedContext>) -> Json<HealthResponse> {
    let artifact = ctx.artifact().status();
    let status = if artifact == LoadStatus::Loaded {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        artifact,
        dataset: ctx.dataset().status(),
        uptime_secs: ctx.uptime_secs(),
    })
}

async fn model_handler(State(ctx): State<SharedContext>) -> Result<Json<ArtifactSummary>, ApiError> {
    let artifact = ctx.require_artifact()?;
    Ok(Json(artifact.summary()))
}

async fn dataset_handler(
    State(ctx): State<SharedContext>,
    Query(query): Query<DatasetQuery>,
) -> Result<Json<DatasetResponse>, ApiError> {
    let state = ctx.dataset();
    let dataset = state.dataset().ok_or_else(|| {
        ApiError::unavailable(
            state
                .warning()
                .unwrap_or_else(|| "dataset unavailable".to_string()),
        )
    })?;

    let rows = query
        .rows
        .unwrap_or(ctx.config().dataset.preview_rows)
        .min(ctx.config().server.max_preview_rows);

    Ok(Json(DatasetResponse {
        location: dataset.info().location.clone(),
        row_count: dataset.row_count(),
        column_count: dataset.column_count(),
        preview: dataset.preview(rows),
        schema: dataset.schema(),
        target_counts: dataset.target_counts(),
    }))
}

async fn form_handler() -> Json<FormSchema> {
    Json(form_schema())
}

async fn predict_handler(
    State(ctx): State<SharedContext>,
    body: Result<Json<PatientForm>, JsonRejection>,
) -> Result<Json<PredictionOutcome>, ApiError> {
    let Json(form) = body.inspect_err(|e| {
        tracing::warn!(error = %e, "Rejected prediction request body");
    })?;
    Ok(Json(ctx.predict(&form)?))
}

/// Bind to the configured address and serve until Ctrl-C.
pub async fn run(ctx: SharedContext) -> Result<(), std::io::Error> {
    let addr = format!("{}:{}", ctx.config().server.host, ctx.config().server.port);
    let app = router(ctx);

    tracing::info!("Gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
