// --- File: crates/slotwise_booking/src/auth.rs ---

use axum::{
    body::Body as AxumBody,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use constant_time_eq::constant_time_eq;
use slotwise_common::SlotwiseError;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::handlers::BookingState;

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

/// Guards the admin routes with the shared key from `admin.api_key`.
///
/// Without a configured key the admin surface is switched off (503), so a
/// missing secret never opens it up.
pub async fn admin_auth_middleware(
    State(state): State<Arc<BookingState>>,
    req: Request<AxumBody>,
    next: Next,
) -> Response {
    let Some(expected) = state.admin_key.as_deref().filter(|k| !k.is_empty()) else {
        warn!("Admin request rejected: no admin key configured");
        return SlotwiseError::UnavailableError("admin access is not configured".to_string())
            .into_response();
    };

    let provided = req
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(provided) if constant_time_eq(provided.as_bytes(), expected.as_bytes()) => {
            debug!("Admin request authenticated");
            next.run(req).await
        }
        Some(_) => {
            warn!("Admin request rejected: invalid key");
            SlotwiseError::AuthError("invalid admin key".to_string()).into_response()
        }
        None => {
            warn!("Admin request rejected: missing {} header", ADMIN_KEY_HEADER);
            SlotwiseError::AuthError(format!("missing {ADMIN_KEY_HEADER} header")).into_response()
        }
    }
}
