//! Test double for [`LlmProvider`], used by `atrium-engine` and
//! `atrium-dispatch` unit tests so classification/rendering paths can be
//! exercised without a live network dependency.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::provider::{ChatRequest, ChatResponse, LlmProvider, ProviderError};

enum Reply {
    Ok(String),
    Err(ProviderError),
}

/// A provider that returns a queue of canned replies in order, or a fixed
/// reply repeated forever when the queue runs dry.
pub struct MockProvider {
    name: String,
    queue: Mutex<Vec<Reply>>,
    default: String,
}

impl MockProvider {
    pub fn new(name: impl Into<String>, default_reply: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue: Mutex::new(Vec::new()),
            default: default_reply.into(),
        }
    }

    pub fn push_ok(&self, reply: impl Into<String>) {
        self.queue.lock().unwrap().push(Reply::Ok(reply.into()));
    }

    pub fn push_err(&self, err: ProviderError) {
        self.queue.lock().unwrap().push(Reply::Err(err));
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let next = {
            let mut q = self.queue.lock().unwrap();
            if q.is_empty() {
                None
            } else {
                Some(q.remove(0))
            }
        };
        let content = match next {
            Some(Reply::Ok(text)) => text,
            Some(Reply::Err(err)) => return Err(err),
            None => self.default.clone(),
        };
        Ok(ChatResponse {
            content,
            model: req.model.clone(),
            tokens_in: 0,
            tokens_out: 0,
            stop_reason: "stop".to_string(),
        })
    }
}
