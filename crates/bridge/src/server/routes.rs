use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::Server;
use crate::{metrics, relay::relay_batch, sources};

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn metrics_text() -> Response {
    match metrics::gather_metrics() {
        Ok(text) => text.into_response(),
        Err(e) => {
            error!("Error gathering metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Alertmanager webhook receiver.
///
/// Answers 400 only when the body cannot be decoded. Once it decodes, the
/// answer is always 200 "ok", however many of the forwards failed.
pub async fn webhook(State(server): State<Arc<Server>>, body: Bytes) -> Response {
    let batch = match sources::decode(&body) {
        Ok(batch) => batch,
        Err(e) => {
            warn!(error = %e, "Rejected Alertmanager payload");
            metrics::record_webhook(false);
            return (
                StatusCode::BAD_REQUEST,
                format!("failed to parse request: {}", e),
            )
                .into_response();
        }
    };
    metrics::record_webhook(true);

    info!(
        status = %batch.status,
        version = %batch.version,
        alerts = batch.alerts.len(),
        "Received Alertmanager webhook"
    );

    let outcomes = relay_batch(server.notifier.as_ref(), &batch).await;
    let failed = outcomes.iter().filter(|o| !o.is_delivered()).count();
    if failed > 0 {
        warn!(failed, total = outcomes.len(), "Some alerts could not be forwarded");
    }

    (StatusCode::OK, "ok").into_response()
}
