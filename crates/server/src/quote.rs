use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use swallow_core::{InterfaceError, QuoteOrchestrator, QuoteResponse};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct QuoteState {
    orchestrator: Arc<QuoteOrchestrator>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// HTTP face of an [`InterfaceError`].
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.0.error().to_string(),
            message: self.0.message().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

pub fn router(orchestrator: Arc<QuoteOrchestrator>) -> Router {
    Router::new()
        .route("/quote/{project_id}", post(generate_quote))
        .with_state(QuoteState { orchestrator })
}

pub async fn generate_quote(
    State(state): State<QuoteState>,
    project_id: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let Path(project_id) = project_id.map_err(|rejection| {
        info!(
            event_name = "quote.path_rejected",
            correlation_id = %correlation_id,
            reason = %rejection.body_text(),
            "quote path could not be decoded"
        );
        ApiError(InterfaceError::BadRequest { message: rejection.body_text() })
    })?;
    let span =
        info_span!("quote_request", correlation_id = %correlation_id, project_id = %project_id);

    async move {
        let Json(raw_quote) = body.map_err(|rejection| {
            info!(
                event_name = "quote.body_rejected",
                reason = %rejection.body_text(),
                "quote body could not be decoded"
            );
            ApiError(InterfaceError::BadRequest { message: rejection.body_text() })
        })?;

        let outcome = state.orchestrator.handle(&project_id, &raw_quote).await;
        let outcome_label = outcome.label();
        let response = outcome.into_response().map(Json).map_err(ApiError);
        let status = match &response {
            Ok(_) => StatusCode::OK,
            Err(error) => error.status(),
        };

        info!(
            event_name = "quote.completed",
            outcome = outcome_label,
            status = status.as_u16(),
            "quote request completed"
        );
        response
    }
    .instrument(span)
    .await
}
