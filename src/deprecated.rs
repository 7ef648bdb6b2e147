//! Removed API endpoints.
//!
//! These answer `410 Gone` with a fixed JSON body for every supported
//! method. They never look at the request and are mounted outside the gate.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

/// A permanently removed endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeprecatedEndpoint {
    /// Route path.
    pub path: &'static str,
    /// Message returned in the `error` field.
    pub message: &'static str,
}

/// Manual notification trigger, replaced by automatic delivery.
pub const TEST_NOTIFICATION: DeprecatedEndpoint = DeprecatedEndpoint {
    path: "/api/test-notification",
    message: "This endpoint has been deprecated. Notifications are sent automatically.",
};

/// Session dump used while debugging sign-in.
pub const DEBUG_SESSION: DeprecatedEndpoint = DeprecatedEndpoint {
    path: "/api/debug/session",
    message: "This debug endpoint has been removed.",
};

/// Every removed endpoint.
pub const ENDPOINTS: [DeprecatedEndpoint; 2] = [TEST_NOTIFICATION, DEBUG_SESSION];

#[derive(Serialize)]
struct GoneBody {
    error: &'static str,
}

impl IntoResponse for DeprecatedEndpoint {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::GONE, Json(GoneBody { error: self.message })).into_response()
    }
}

/// Routes answering `410 Gone` for GET and POST on every removed endpoint.
pub fn routes() -> Router {
    ENDPOINTS.into_iter().fold(Router::new(), |router, endpoint| {
        router.route(
            endpoint.path,
            get(move || async move { endpoint }).post(move || async move { endpoint }),
        )
    })
}
