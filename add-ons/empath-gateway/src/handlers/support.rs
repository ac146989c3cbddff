//! Support handler: runs one message through the pipeline and maps every failure to a
//! `{"detail": ...}` JSON response.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use empath_core::{PipelineError, SupportRequest, SupportResponse};
use tracing::Instrument;

use crate::AppState;

/// Failure as seen by the HTTP client.
pub(crate) enum SupportError {
    /// Body did not decode into a `SupportRequest`; keeps the rejection's 4xx status.
    Body(JsonRejection),
    /// Any pipeline failure; always 500.
    Pipeline(PipelineError),
}

impl From<PipelineError> for SupportError {
    fn from(e: PipelineError) -> Self {
        Self::Pipeline(e)
    }
}

impl From<JsonRejection> for SupportError {
    fn from(e: JsonRejection) -> Self {
        Self::Body(e)
    }
}

impl IntoResponse for SupportError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            SupportError::Body(rejection) => (rejection.status(), rejection.body_text()),
            SupportError::Pipeline(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };
        (status, axum::Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

/// POST /support – mood, three agents, three reflections, conductor, safety checks.
pub(crate) async fn support(
    State(state): State<AppState>,
    body: Result<Json<SupportRequest>, JsonRejection>,
) -> Result<axum::Json<SupportResponse>, SupportError> {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!(target: "empath::gateway", "support", %request_id);

    async move {
        let Json(req) = body.map_err(|rejection| {
            tracing::warn!(target: "empath::gateway", error = %rejection.body_text(), "Rejected /support body");
            SupportError::from(rejection)
        })?;
        match state.orchestrator.handle(&req).await {
            Ok(res) => {
                tracing::info!(target: "empath::gateway", "Support reply sent");
                Ok(axum::Json(res))
            }
            Err(e) => {
                tracing::error!(target: "empath::gateway", error = %e, "/support failed");
                Err(e.into())
            }
        }
    }
    .instrument(span)
    .await
}
