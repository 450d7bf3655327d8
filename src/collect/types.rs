// src/collect/types.rs
use chrono::{DateTime, Utc};

/// One parsed review entry, not yet persisted. `review_id` may be empty when
/// the remote feed supplied none; the ingestion pipeline synthesizes one.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ReviewRecord {
    pub review_id: String,
    pub author: String,
    pub title: String,
    pub text: String,
    pub rating: i64, // 0 when the feed had no usable rating; rejected later
    pub version: String,
    pub date: Option<DateTime<Utc>>,
    pub source: String,
    pub language: String,
}

/// Result of fetching a single feed page. A failed page contributes zero
/// records but stays visible to telemetry instead of vanishing in a catch-all.
#[derive(Debug, Default)]
pub struct PageFetch {
    pub records: Vec<ReviewRecord>,
    pub failed: bool,
}

impl PageFetch {
    pub fn failed() -> Self {
        Self {
            records: Vec::new(),
            failed: true,
        }
    }
}

#[async_trait::async_trait]
pub trait ReviewSource: Send + Sync {
    /// Fetch up to `max_pages` pages of reviews for an app/country pair.
    /// Never errors: page-level failures degrade the result size.
    async fn fetch(&self, app_id: &str, country: &str, max_pages: u32) -> Vec<ReviewRecord>;
    fn name(&self) -> &'static str;
}
