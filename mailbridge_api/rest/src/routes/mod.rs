use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mailbridge_models::contact::{ContactRequest, ContactRequestInput};
use tracing::info;

use crate::models::{ApiContactRequest, ApiResponse};

pub mod meta;
pub mod notification;
pub mod submission;

pub fn internal_server_error(err: impl Into<anyhow::Error>) -> Response {
    let err = err.into();
    tracing::error!("internal server error: {err:#}");
    error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

pub fn error(code: StatusCode, message: impl Into<String>) -> Response {
    envelope(code, false, message)
}

fn success(code: StatusCode, message: impl Into<String>) -> Response {
    envelope(code, true, message)
}

fn envelope(code: StatusCode, success: bool, message: impl Into<String>) -> Response {
    let response = ApiResponse {
        success,
        message: message.into(),
    };
    (code, Json(response)).into_response()
}

/// Decode and validate the body of an action endpoint. Every rejection is a
/// `400 Bad Request`.
fn validate(
    payload: Result<Json<ApiContactRequest>, JsonRejection>,
) -> Result<ContactRequest, Response> {
    let Json(request) = payload.map_err(|rejection| {
        info!("rejected malformed contact request: {rejection}");
        error(StatusCode::BAD_REQUEST, rejection.body_text())
    })?;

    ContactRequest::try_from(ContactRequestInput::from(request)).map_err(|err| {
        info!("rejected invalid contact request: {err}");
        error(StatusCode::BAD_REQUEST, err.to_string())
    })
}
