//! HTTP request handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Form, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde_json::json;
use tracing::{info, warn};

use crate::data::PatientRecord;
use crate::inference::Prediction;

use super::error::{Result, ServerError};
use super::form::FormValues;
use super::page::{render_page, PageOutcome};
use super::state::{AppState, ModelStatus};

// ============================================================================
// UI Handlers
// ============================================================================

/// Render the empty form, or the unavailable page when no model is loaded
pub async fn serve_index(State(state): State<Arc<AppState>>) -> Html<String> {
    let outcome = match &state.model {
        ModelStatus::Ready(_) => PageOutcome::Idle,
        ModelStatus::Unavailable { reason } => PageOutcome::Unavailable(reason),
    };
    Html(render_page(&outcome, &FormValues::default()))
}

/// Handle a form submission and render the page with the outcome
pub async fn submit_prediction(
    State(state): State<Arc<AppState>>,
    Form(values): Form<HashMap<String, String>>,
) -> (StatusCode, Html<String>) {
    let values = FormValues::from(values);

    let engine = match &state.model {
        ModelStatus::Ready(engine) => engine,
        ModelStatus::Unavailable { reason } => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Html(render_page(&PageOutcome::Unavailable(reason), &values)),
            );
        }
    };

    let record = match values.parse() {
        Ok(record) => record,
        Err(errors) => {
            info!(errors = errors.len(), "Rejected prediction form");
            let page = render_page(&PageOutcome::from_form_errors(&errors), &values);
            return (ServerError::InvalidForm(errors).status_code(), Html(page));
        }
    };

    match engine.predict(&record) {
        Ok(prediction) => {
            info!(
                label = %prediction.label,
                confidence = prediction.confidence,
                "Form prediction"
            );
            (StatusCode::OK, Html(render_page(&PageOutcome::Result(&prediction), &values)))
        }
        Err(e) => {
            let err = ServerError::from(e);
            warn!(error = %err, "Form prediction failed");
            let outcome = PageOutcome::Error(vec![err.public_message()]);
            (err.status_code(), Html(render_page(&outcome, &values)))
        }
    }
}

// ============================================================================
// JSON API Handlers
// ============================================================================

/// Predict one record posted as JSON
pub async fn api_predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<PatientRecord>, JsonRejection>,
) -> Result<Json<Prediction>> {
    let engine = state.engine()?;
    let Json(record) = payload?;
    record.validate()?;
    let prediction = engine.predict(&record)?;
    info!(label = %prediction.label, confidence = prediction.confidence, "API prediction");
    Ok(Json(prediction))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let uptime = chrono::Utc::now().signed_duration_since(state.started_at);
    let stats = match &state.model {
        ModelStatus::Ready(engine) => Some(engine.stats()),
        ModelStatus::Unavailable { .. } => None,
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model_loaded": state.is_model_loaded(),
        "uptime_secs": uptime.num_seconds(),
        "inference": stats,
    }))
}

/// Metadata of the loaded artifact
pub async fn model_info(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>> {
    let engine = state.engine()?;
    let artifact = engine.artifact();

    let importances: Vec<serde_json::Value> = artifact
        .pipeline
        .feature_importances()
        .into_iter()
        .map(|(feature, importance)| json!({ "feature": feature, "importance": importance }))
        .collect();

    Ok(Json(json!({
        "path": state.config.artifact_path.display().to_string(),
        "classes": artifact.target_mapping,
        "metadata": artifact.metadata,
        "feature_importances": importances,
    })))
}
