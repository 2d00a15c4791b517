//! Stub tool adapters. Real Gmail/weather/LinkedIn/scraping backends are
//! out of scope (the Non-goals explicitly rule out owning a mail client,
//! calendar, or web scraper) — these return deterministic canned payloads
//! so the dispatch/templating/deadline machinery around them is fully
//! exercised.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::adapter::ToolAdapter;
use crate::error::DispatchError;
use crate::types::DispatchRequest;

/// Returns a fixed JSON payload, ignoring the request. Used for every
/// stubbed tool family; distinguished only by its canned `payload`.
pub struct StaticAdapter {
    pub payload: Value,
}

impl StaticAdapter {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }
}

#[async_trait]
impl ToolAdapter for StaticAdapter {
    async fn call(&self, _req: &DispatchRequest) -> Result<Value, DispatchError> {
        Ok(self.payload.clone())
    }
}

pub fn weather_now() -> StaticAdapter {
    StaticAdapter::new(json!({ "condition": "clear", "temp_f": 72, "location": "unknown" }))
}

pub fn air_quality() -> StaticAdapter {
    StaticAdapter::new(json!({ "aqi": 42, "category": "good" }))
}

pub fn weather_alerts() -> StaticAdapter {
    StaticAdapter::new(json!({ "alerts": [] }))
}

pub fn sun_times() -> StaticAdapter {
    StaticAdapter::new(json!({ "sunrise": "06:45", "sunset": "19:58" }))
}

pub fn web_search() -> StaticAdapter {
    StaticAdapter::new(json!({ "results": [] }))
}

pub fn gmail_inbox() -> StaticAdapter {
    StaticAdapter::new(json!({ "messages": [], "count": 0 }))
}

pub fn linkedin_notifications() -> StaticAdapter {
    StaticAdapter::new(json!({ "notifications": [] }))
}

pub fn price_scrape() -> StaticAdapter {
    StaticAdapter::new(json!({ "price": null, "currency": "usd" }))
}
