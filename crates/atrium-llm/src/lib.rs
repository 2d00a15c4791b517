pub mod mock;
pub mod openai_compat;
pub mod provider;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use provider::{ChatRequest, ChatResponse, LlmProvider, Message, ProviderError, Role};
pub use router::{ProviderRouter, ProviderSlot};
