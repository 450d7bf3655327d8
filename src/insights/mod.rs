// src/insights/mod.rs
pub mod keywords;
pub mod recommender;
pub mod sentiment;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::store::StoredReview;
use crate::summary::round2;
use recommender::DynRecommender;
use sentiment::{Sentiment, SentimentClassifier};

pub const TOP_KEYWORDS: usize = 15;

/// Qualitative aggregation for one app/country key. Derived per request.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InsightsSnapshot {
    pub sentiment_counts: BTreeMap<String, u64>,
    pub sentiment_percent: BTreeMap<String, f64>,
    pub top_negative_keywords: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Holds the ML-backed capabilities. Constructed once at startup and shared
/// through `AppState`; nothing here is a process-wide singleton.
pub struct InsightEngine {
    classifier: Arc<dyn SentimentClassifier>,
    recommender: DynRecommender,
}

impl InsightEngine {
    pub fn new(classifier: Arc<dyn SentimentClassifier>, recommender: DynRecommender) -> Self {
        Self {
            classifier,
            recommender,
        }
    }

    pub async fn analyze(&self, rows: &[StoredReview]) -> InsightsSnapshot {
        // One classification pass; the labels feed both the tallies and the
        // negative filter.
        let labels: Vec<Sentiment> = rows.iter().map(|r| self.classifier.classify(&r.text)).collect();

        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for label in &labels {
            *counts.entry(label.as_str().to_string()).or_insert(0) += 1;
        }

        let total = labels.len().max(1) as f64; // no divide-by-zero on empty keys
        let percent = counts
            .iter()
            .map(|(k, v)| (k.clone(), round2(*v as f64 * 100.0 / total)))
            .collect();

        let negatives: Vec<String> = rows
            .iter()
            .zip(&labels)
            .filter(|(_, label)| **label == Sentiment::Negative)
            .map(|(r, _)| r.text.clone())
            .collect();

        let top_negative_keywords = keywords::top_keywords(&negatives, TOP_KEYWORDS);
        let recommendations = if negatives.is_empty() {
            vec!["No sufficiently negative feedback found to generate recommendations.".to_string()]
        } else {
            self.recommender.recommend(&negatives).await
        };

        InsightsSnapshot {
            sentiment_counts: counts,
            sentiment_percent: percent,
            top_negative_keywords,
            recommendations,
        }
    }
}
