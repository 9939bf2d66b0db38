use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use quill_infra::StoreError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// A directory fault is surfaced to the generic 500 path, never retried.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    tracing::error!(error = %err, "site directory fault");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "store_error",
        "site directory unavailable",
    )
}
