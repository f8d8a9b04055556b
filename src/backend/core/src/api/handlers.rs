//! API request handlers with proper error propagation.
//!
//! All handlers return `Result<impl IntoResponse, QuorumError>` so that errors
//! are automatically converted to appropriate HTTP status codes via the
//! `IntoResponse` implementation on `QuorumError`.

use axum::{
    extract::{FromRequest, Path, Request, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{ApiResponse, AppState};
use crate::error::{QuorumError, Result};
use crate::events::{ContainerEvent, ContainerState, VerifiedContainer};

// ═══════════════════════════════════════════════════════════════════════════════
// Health & Metrics
// ═══════════════════════════════════════════════════════════════════════════════

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.service.store();
    let (status, store_status) = match store.ping().await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(e) => {
            e.log();
            (StatusCode::SERVICE_UNAVAILABLE, "unreachable")
        }
    };

    (
        status,
        Json(serde_json::json!({
            "status": if status == StatusCode::OK { "healthy" } else { "degraded" },
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now().to_rfc3339(),
            "components": [
                { "name": "event_store", "backend": store.backend_name(), "status": store_status }
            ]
        })),
    )
}

pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    (
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// Extractors
// ═══════════════════════════════════════════════════════════════════════════════

/// JSON body extractor whose rejections (bad syntax, wrong field types,
/// missing content type) are reported as a structured validation error.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = QuorumError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                QuorumError::validation(format!("Invalid request body: {}", rejection.body_text()))
            })?;

        Ok(Self(value))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Container Handlers
// ═══════════════════════════════════════════════════════════════════════════════

/// Body of `POST /containers/events`.
///
/// Fields are kept as raw strings so that every rejection goes through
/// [`CreateEventRequest::into_event`] and gets a structured error.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(default)]
    pub container_id: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub source: Option<String>,
}

impl CreateEventRequest {
    /// Validate and convert into a domain event.
    pub fn into_event(self) -> Result<ContainerEvent> {
        if self.container_id.trim().is_empty() {
            return Err(QuorumError::missing_field("containerId"));
        }
        if self.state.is_empty() {
            return Err(QuorumError::missing_field("state"));
        }
        if self.timestamp.is_empty() {
            return Err(QuorumError::missing_field("timestamp"));
        }

        let state: ContainerState = self.state.parse()?;
        let timestamp = parse_timestamp(&self.timestamp)?;

        Ok(ContainerEvent {
            container_id: self.container_id,
            state,
            timestamp,
            source: self.source,
        })
    }
}

/// ISO-8601 shapes outside RFC 3339: optional seconds, and `Z`, `+hh`,
/// `+hhmm` or `+hh:mm` offsets.
const ZONED_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M%#z"];

/// Zone-less date-times, read as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Accept ISO-8601 date-times (RFC 3339 plus the shapes above) and bare
/// dates (midnight UTC).
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }
    Err(QuorumError::invalid_timestamp(raw))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecordedResponse {
    pub message: String,
    /// A corruption alert reached the configured channel.
    pub alert_published: bool,
}

pub async fn create_event(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateEventRequest>,
) -> Result<impl IntoResponse> {
    let event = req.into_event()?;
    let outcome = state.service.append_event(event).await?;

    let response = EventRecordedResponse {
        message: "Event recorded".to_string(),
        alert_published: outcome.alert_published,
    };
    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

/// Body of `GET /containers/:id/status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub id: String,
    #[serde(rename = "estado")]
    pub state: ContainerState,
}

pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let resolved = state.service.resolve_state(&id).await?;
    Ok(Json(ApiResponse::success(StatusResponse {
        id,
        state: resolved,
    })))
}

pub async fn list_verified(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let verified: Vec<VerifiedContainer> = state.service.list_verified().await?;
    Ok(Json(ApiResponse::success(verified)))
}
