use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::shipment::ShipmentData;
use crate::tracking::Source;

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

#[derive(Serialize)]
pub struct TrackResponse<'a> {
    pub source: Source,
    pub data: &'a ShipmentData,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub cache_entries: usize,
    pub in_flight: usize,
}

/// `GET /track?ref=<reference>`
pub async fn track_shipment(
    State(state): State<AppState>,
    query: Result<Query<TrackQuery>, QueryRejection>,
) -> Response {
    let start = Instant::now();
    // A query string that does not decode (e.g. `ref` given twice) counts as
    // no usable `ref`.
    let reference = match &query {
        Ok(Query(query)) => query.reference.as_deref().map(str::trim),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected /track query string");
            None
        }
    };
    let response = match reference {
        None | Some("") => ApiError::MissingRef.into_response(),
        Some(reference) => match state.tracking.get_tracking(reference).await {
            Ok(tracked) => (
                StatusCode::OK,
                Json(TrackResponse {
                    source: tracked.source,
                    data: &tracked.data,
                }),
            )
                .into_response(),
            Err(e) => {
                tracing::warn!(reference = %reference, error = %e, "Tracking lookup failed");
                ApiError::from(e).into_response()
            }
        },
    };

    metrics::record_request(response.status().as_u16(), start);
    response
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        cache_entries: state.tracking.cache_len(),
        in_flight: state.tracking.in_flight_len(),
    })
}

pub async fn unknown_route(uri: Uri) -> ApiError {
    ApiError::UnknownRoute(format!("No route for {}", uri.path()))
}
