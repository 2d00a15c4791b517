//! Every leaf crate defines its own narrow `thiserror` enum. This is the
//! one place they all meet: wrap whichever error a handler produced into a
//! uniform JSON body, using `AtriumError`'s existing code/status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use atrium_core::error::AtriumError;

pub struct GatewayError(pub AtriumError);

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({ "error": self.0.to_string(), "code": self.0.code() }));
        (status, body).into_response()
    }
}

impl From<AtriumError> for GatewayError {
    fn from(e: AtriumError) -> Self {
        GatewayError(e)
    }
}

impl From<atrium_context::ContextError> for GatewayError {
    fn from(e: atrium_context::ContextError) -> Self {
        let mapped = match e {
            atrium_context::ContextError::Transient(m) => AtriumError::StoreTransient(m),
            atrium_context::ContextError::Fatal(m) => AtriumError::StoreFatal(m),
            atrium_context::ContextError::NotFound(m) => AtriumError::NotFound(m),
        };
        GatewayError(mapped)
    }
}

impl From<atrium_memory::MemoryError> for GatewayError {
    fn from(e: atrium_memory::MemoryError) -> Self {
        GatewayError(AtriumError::Internal(e.to_string()))
    }
}

impl From<atrium_approval::ApprovalError> for GatewayError {
    fn from(e: atrium_approval::ApprovalError) -> Self {
        let mapped = match e {
            atrium_approval::ApprovalError::NotFound(m) => AtriumError::NotFound(m),
            other => AtriumError::Internal(other.to_string()),
        };
        GatewayError(mapped)
    }
}
