use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{HttpStatusCode, SlotwiseError};

pub mod client;

/// Builds the JSON error body every Slotwise endpoint answers with.
///
/// `kind` is a stable machine-readable tag the booking UI switches on.
pub fn error_response(status_code: StatusCode, kind: &str, message: String) -> Response {
    let body = Json(json!({
        "error": {
            "kind": kind,
            "message": message,
            "code": status_code.as_u16(),
        }
    }));
    (status_code, body).into_response()
}

/// Extension trait for SlotwiseError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    fn into_http_response(self) -> Response;
}

impl SlotwiseError {
    fn kind(&self) -> &'static str {
        match self {
            SlotwiseError::AuthError(_) => "unauthorized",
            SlotwiseError::UnavailableError(_) => "unavailable",
            SlotwiseError::InternalError(_) => "internal",
        }
    }
}

impl IntoHttpResponse for SlotwiseError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let kind = self.kind();
        error_response(status_code, kind, self.to_string())
    }
}

impl IntoResponse for SlotwiseError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_status() {
        let response = SlotwiseError::AuthError("admin key".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_unavailable_maps_to_503() {
        let response = SlotwiseError::UnavailableError("admin".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
