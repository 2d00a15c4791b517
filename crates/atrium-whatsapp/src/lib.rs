pub mod auth;
pub mod context;
pub mod handlers;
pub mod router;
pub mod types;

pub use context::{BridgeTurnResult, WhatsAppContext};
pub use router::build_router;
pub use types::{IncomingPayload, OutgoingEnvelope};
