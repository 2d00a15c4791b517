use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::context::WhatsAppContext;
use crate::handlers;

/// Builds the `/api/mcp*` route group. Nest this under the gateway's main
/// router at whatever prefix the deployment wants.
pub fn build_router<C: WhatsAppContext>(ctx: Arc<C>) -> Router {
    Router::new()
        .route("/api/mcp", get(handlers::probe::<C>).post(handlers::handle_message::<C>))
        .route("/api/mcp/validate", get(handlers::validate::<C>).post(handlers::validate::<C>))
        .with_state(ctx)
}
