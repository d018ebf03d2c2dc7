use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    routing, Json, Router,
};
use mailbridge_core_submission_contracts::{SubmissionError, SubmissionFeatureService};

use super::{error, internal_server_error, success, validate};
use crate::models::ApiContactRequest;

pub fn router(service: Arc<impl SubmissionFeatureService>) -> Router<()> {
    Router::new()
        .route("/submit-request", routing::post(submit_request))
        .with_state(service)
}

async fn submit_request(
    service: State<Arc<impl SubmissionFeatureService>>,
    payload: Result<Json<ApiContactRequest>, JsonRejection>,
) -> Response {
    let request = match validate(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match service.submit(request).await {
        Ok(_) => success(StatusCode::CREATED, "Request submitted successfully"),
        Err(SubmissionError::Delivery(err)) => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to submit request: {err:#}"),
        ),
        Err(SubmissionError::Other(err)) => internal_server_error(err),
    }
}
