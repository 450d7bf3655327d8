// src/collect/rss.rs
//! iTunes customer-reviews RSS feed (JSON rendition), paginated.

use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::collect::types::{PageFetch, ReviewRecord, ReviewSource};
use crate::normalize::clean_text;

// Field values in the feed arrive wrapped as {"label": "..."}.
#[derive(Debug, Deserialize, Default)]
struct Label {
    #[serde(default)]
    label: String,
}

#[derive(Debug, Deserialize)]
struct FeedDoc {
    feed: Option<Feed>,
}

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: Option<Label>,
    title: Option<Label>,
    content: Option<Label>,
    // Absent on the app-metadata entry that leads some pages; such entries
    // are not reviews and are skipped.
    #[serde(rename = "im:rating")]
    rating: Option<Label>,
    author: Option<Author>,
    #[serde(rename = "im:version")]
    version: Option<Label>,
    updated: Option<Label>,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: Option<Label>,
}

fn parse_feed_date(ts: &str) -> Option<DateTime<Utc>> {
    // RFC 3339 with offset or trailing 'Z'; anything else degrades to None.
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub struct RssCollector {
    http: reqwest::Client,
}

impl RssCollector {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .user_agent("appstore-review-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        Self { http }
    }

    fn page_url(app_id: &str, country: &str, page: u32) -> String {
        format!(
            "https://itunes.apple.com/{country}/rss/customerreviews/page={page}/id={app_id}/sortby=mostrecent/json"
        )
    }

    /// Parse one feed page body. A document without `feed` or `entry` yields
    /// zero records; malformed JSON marks the page failed.
    pub fn parse_page(body: &str) -> PageFetch {
        let t0 = std::time::Instant::now();

        let doc: FeedDoc = match serde_json::from_str(body) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(error = %e, "malformed feed page json");
                return PageFetch::failed();
            }
        };

        let entries = doc.feed.map(|f| f.entry).unwrap_or_default();
        let mut records = Vec::with_capacity(entries.len());
        for e in entries {
            let Some(rating) = e.rating else {
                continue; // app metadata, not a review
            };
            let rating = rating.label.trim().parse::<i64>().unwrap_or(0);

            records.push(ReviewRecord {
                review_id: e.id.map(|l| l.label).unwrap_or_default(),
                author: e
                    .author
                    .and_then(|a| a.name)
                    .map(|l| l.label)
                    .unwrap_or_default(),
                title: clean_text(&e.title.map(|l| l.label).unwrap_or_default()),
                text: clean_text(&e.content.map(|l| l.label).unwrap_or_default()),
                rating,
                version: e.version.map(|l| l.label).unwrap_or_default(),
                date: e
                    .updated
                    .map(|l| l.label)
                    .filter(|s| !s.is_empty())
                    .and_then(|s| parse_feed_date(&s)),
                source: "rss".to_string(),
                language: String::new(),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("collect_parse_ms").record(ms);
        counter!("collect_records_total").increment(records.len() as u64);

        PageFetch {
            records,
            failed: false,
        }
    }

    async fn fetch_page(&self, app_id: &str, country: &str, page: u32) -> PageFetch {
        let url = Self::page_url(app_id, country, page);
        let resp = match self.http.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, page, "feed page request failed");
                return PageFetch::failed();
            }
        };
        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), page, "feed page non-success status");
            return PageFetch::failed();
        }
        match resp.text().await {
            Ok(body) => Self::parse_page(&body),
            Err(e) => {
                tracing::warn!(error = %e, page, "feed page body read failed");
                PageFetch::failed()
            }
        }
    }
}

impl Default for RssCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ReviewSource for RssCollector {
    async fn fetch(&self, app_id: &str, country: &str, max_pages: u32) -> Vec<ReviewRecord> {
        let mut out = Vec::new();
        for page in 1..=max_pages {
            let fetched = self.fetch_page(app_id, country, page).await;
            if fetched.failed {
                counter!("collect_pages_failed_total").increment(1);
                continue;
            }
            out.extend(fetched.records);
        }
        out
    }

    fn name(&self) -> &'static str {
        "rss"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_without_entry_field_yields_zero_records() {
        let page = RssCollector::parse_page(r#"{"feed":{"author":{"name":{"label":"iTunes Store"}}}}"#);
        assert!(!page.failed);
        assert!(page.records.is_empty());
    }

    #[test]
    fn malformed_json_marks_page_failed() {
        let page = RssCollector::parse_page("{not json");
        assert!(page.failed);
        assert!(page.records.is_empty());
    }

    #[test]
    fn date_z_suffix_is_utc_and_garbage_is_none() {
        let d = parse_feed_date("2024-03-01T12:30:00Z").expect("parse Z");
        assert_eq!(d.to_rfc3339(), "2024-03-01T12:30:00+00:00");
        assert!(parse_feed_date("yesterday-ish").is_none());
    }
}
