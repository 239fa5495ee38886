use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::collections::HashMap;

use crate::core::metrics;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::{HealthResponse, RootResponse};

pub(crate) async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let response = RootResponse {
        message: state.settings().api().project_name.clone(),
        version: state.settings().api().version.clone(),
        quizzes_url: format!("{}/quizzes", state.settings().api().api_v1_str),
    };

    Json(response)
}

pub(crate) async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut status = "healthy".to_string();
    let mut components = HashMap::new();

    components.insert(
        "quiz_store".to_string(),
        state.settings().quiz().store_backend.as_str().to_string(),
    );

    match state.db() {
        None => {
            components.insert("database".to_string(), "disabled".to_string());
        }
        Some(pool) => match repositories::health::ping(pool).await {
            Ok(()) => {
                components.insert("database".to_string(), "healthy".to_string());
            }
            Err(err) => {
                components.insert("database".to_string(), format!("unhealthy: {err}"));
                status = "unhealthy".to_string();
            }
        },
    }

    Json(HealthResponse { service: "classquiz-api".to_string(), status, components })
}

pub(crate) async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    if !state.settings().telemetry().prometheus_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }

    match metrics::render() {
        Some(body) => ([(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
            .into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
