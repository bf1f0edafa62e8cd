//! HTTP surface for docrelay.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /events` – Accept a storage notification event, run the extraction
//!   pipeline over its object references in order, and return the sink
//!   acknowledgements (`forwarded`). A failing reference fails the whole request.
//! - `GET /metrics` – Observe forwarding counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! The HTTP surface is the invocation boundary: pipeline errors surface here as a
//! plain `500` with the error text, leaving platform-level retries to the caller.

use crate::event::StorageEvent;
use crate::pipeline::{PipelineApi, PipelineError};
use crate::sink::SinkAck;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the pipeline surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: PipelineApi + 'static,
{
    Router::new()
        .route("/events", post(process_event::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

/// Success response for the `POST /events` endpoint.
#[derive(Serialize)]
struct EventResponse {
    /// Sink acknowledgements in reference order.
    forwarded: Vec<SinkAck>,
}

/// Run the extraction pipeline over one storage event.
async fn process_event<S>(
    State(service): State<Arc<S>>,
    Json(event): Json<StorageEvent>,
) -> Result<Json<EventResponse>, AppError>
where
    S: PipelineApi,
{
    let forwarded = service.process_event(event).await.map_err(|error| {
        tracing::error!(error = %error, "Event processing failed");
        AppError(error)
    })?;
    tracing::info!(forwarded = forwarded.len(), "Event processed");
    Ok(Json(EventResponse { forwarded }))
}

/// Response body for `GET /metrics`.
#[derive(Serialize)]
struct MetricsResponse {
    events_processed: u64,
    records_forwarded: u64,
}

/// Return a concise metrics snapshot with forwarding counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsResponse>
where
    S: PipelineApi,
{
    let snapshot = service.metrics_snapshot();
    Json(MetricsResponse {
        events_processed: snapshot.events_processed,
        records_forwarded: snapshot.records_forwarded,
    })
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "process_event",
                method: "POST",
                path: "/events",
                description: "Run the extraction pipeline over a storage notification event. Response returns { \"forwarded\": [ack, ...] } in reference order.",
                request_example: Some(json!({
                    "records": [
                        { "bucket": "survey-uploads", "key": "input/IMG_6155.png" }
                    ]
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return forwarding counters useful for observability dashboards.",
                request_example: None,
            },
            CommandDescriptor {
                name: "commands",
                method: "GET",
                path: "/commands",
                description: "Return this command catalog.",
                request_example: None,
            },
        ],
    })
}

struct AppError(PipelineError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(inner: PipelineError) -> Self {
        Self(inner)
    }
}
