use crate::batch::{evaluate_batch, BatchReport, EvaluationRequest};
use crate::error::ApiError;
use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use safety_index::scoring::{
    EvaluationResult, KpiDefinition, MetricCatalog, RiskProfile, RiskProfileRegistry,
};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CatalogView<'a> {
    pub(crate) total_weight: f64,
    /// Category key to display label, for the categories the catalog uses.
    pub(crate) categories: BTreeMap<&'static str, &'static str>,
    pub(crate) definitions: &'a [KpiDefinition],
}

impl<'a> CatalogView<'a> {
    pub(crate) fn new(catalog: &'a MetricCatalog) -> Self {
        Self {
            total_weight: catalog.total_weight(),
            categories: catalog
                .iter()
                .map(|definition| (definition.category.key(), definition.category.label()))
                .collect(),
            definitions: catalog.definitions(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfilesView<'a> {
    pub(crate) profiles: &'a [RiskProfile],
    pub(crate) domains: &'a BTreeMap<String, String>,
}

impl<'a> ProfilesView<'a> {
    pub(crate) fn new(registry: &'a RiskProfileRegistry) -> Self {
        Self {
            profiles: registry.profiles(),
            domains: registry.domains(),
        }
    }
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/kpis", get(kpis_endpoint))
        .route("/api/v1/profiles", get(profiles_endpoint))
        .route("/api/v1/evaluate", post(evaluate_endpoint))
        .route("/api/v1/evaluate/batch", post(evaluate_batch_endpoint))
        .layer(Extension(state))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
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

pub(crate) async fn kpis_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let view = serde_json::to_value(CatalogView::new(state.engine.catalog()))?;
    Ok(Json(view))
}

pub(crate) async fn profiles_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let view = serde_json::to_value(ProfilesView::new(state.engine.registry()))?;
    Ok(Json(view))
}

pub(crate) async fn evaluate_endpoint(
    Extension(state): Extension<AppState>,
    Json(request): Json<EvaluationRequest>,
) -> Result<Json<EvaluationResult>, ApiError> {
    request.validate()?;
    Ok(Json(state.engine.evaluate(&request.unit, &request.input)))
}

pub(crate) async fn evaluate_batch_endpoint(
    Extension(state): Extension<AppState>,
    Json(requests): Json<Vec<EvaluationRequest>>,
) -> Result<Json<BatchReport>, ApiError> {
    let evaluations = evaluate_batch(Arc::clone(&state.engine), requests).await?;
    Ok(Json(BatchReport::new(evaluations)))
}
