pub mod config;
pub mod error;
pub mod types;

pub use config::AtriumConfig;
pub use error::{AtriumError, Result};
pub use types::{
    Channel, ContextDependency, CreativeRequirement, Dimensions, EmotionalComplexity,
    EngagementLevel, IntentDecision, IntentTag, ReasoningType, ResponseLength, RoutingLane,
    SessionId, TechnicalComplexity, Turn, UserId,
};
