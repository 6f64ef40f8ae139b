use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::metrics::encode_metrics;
use crate::state::AppState;

const SERVICE_NAME: &str = "mediacut";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

#[derive(Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub started_at: DateTime<Utc>,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn root(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: SERVICE_NAME,
        version: VERSION,
        started_at: state.started_at(),
        endpoints: vec![
            EndpointInfo {
                method: "POST",
                path: "/convert",
                description: "Extract the audio track of an uploaded video as MP3",
            },
            EndpointInfo {
                method: "POST",
                path: "/clip",
                description: "Cut clips out of an uploaded video and return them as a ZIP",
            },
            EndpointInfo {
                method: "GET",
                path: "/health",
                description: "Liveness check",
            },
            EndpointInfo {
                method: "GET",
                path: "/metrics",
                description: "Prometheus metrics",
            },
        ],
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
