// tests/insights_engine.rs
//
// Insight engine behavior: single classification pass per review, tally
// consistency, and fail-soft recommendation wiring.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use appstore_review_analyzer::insights::recommender::{DisabledRecommender, MockRecommender};
use appstore_review_analyzer::insights::sentiment::{LexiconClassifier, Sentiment, SentimentClassifier};
use appstore_review_analyzer::insights::InsightEngine;
use appstore_review_analyzer::store::StoredReview;

fn row(review_id: &str, rating: i64, text: &str) -> StoredReview {
    StoredReview {
        id: 0,
        app_id: "1".to_string(),
        country: "us".to_string(),
        review_id: review_id.to_string(),
        author: String::new(),
        title: String::new(),
        text: text.to_string(),
        rating,
        version: String::new(),
        date: None,
        source: "rss".to_string(),
        language: String::new(),
    }
}

/// Counts classify() invocations so the one-pass property is observable.
struct CountingClassifier {
    calls: Arc<AtomicUsize>,
    inner: LexiconClassifier,
}

impl SentimentClassifier for CountingClassifier {
    fn classify(&self, text: &str) -> Sentiment {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.classify(text)
    }
    fn name(&self) -> &'static str {
        "counting"
    }
}

fn engine_with(classifier: Arc<dyn SentimentClassifier>) -> InsightEngine {
    InsightEngine::new(
        classifier,
        Arc::new(MockRecommender {
            fixed: vec![
                "Fix crashes on login".to_string(),
                "Reduce ad frequency".to_string(),
                "Improve sync reliability".to_string(),
            ],
        }),
    )
}

#[tokio::test]
async fn classification_runs_exactly_once_per_review() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = engine_with(Arc::new(CountingClassifier {
        calls: calls.clone(),
        inner: LexiconClassifier::new(),
    }));

    let rows = vec![
        row("a", 5, "Love it"),
        row("b", 1, "Terrible, crashes constantly"),
        row("c", 3, "it opens and closes"),
    ];
    engine.analyze(&rows).await;

    assert_eq!(calls.load(Ordering::SeqCst), rows.len());
}

#[tokio::test]
async fn counts_and_percentages_are_consistent() {
    let engine = engine_with(Arc::new(LexiconClassifier::new()));
    let rows = vec![
        row("a", 5, "Love it, great app"),
        row("b", 5, "great and helpful"),
        row("c", 1, "Terrible, crashes constantly"),
        row("d", 3, "it opens and closes"),
    ];
    let snap = engine.analyze(&rows).await;

    let count_total: u64 = snap.sentiment_counts.values().sum();
    assert_eq!(count_total, 4);
    let pct_total: f64 = snap.sentiment_percent.values().sum();
    assert!((pct_total - 100.0).abs() < 0.05, "got {pct_total}");
    assert_eq!(snap.sentiment_counts.get("positive"), Some(&2));
    assert_eq!(snap.sentiment_counts.get("negative"), Some(&1));
    assert_eq!(snap.sentiment_counts.get("neutral"), Some(&1));
}

#[tokio::test]
async fn zero_reviews_yield_empty_snapshot_without_panicking() {
    let engine = engine_with(Arc::new(LexiconClassifier::new()));
    let snap = engine.analyze(&[]).await;

    assert!(snap.sentiment_counts.is_empty());
    assert!(snap.sentiment_percent.is_empty());
    assert!(snap.top_negative_keywords.is_empty());
    assert_eq!(snap.recommendations.len(), 1, "explanatory line, not a fallback burst");
}

#[tokio::test]
async fn all_positive_reviews_skip_the_recommender() {
    let engine = engine_with(Arc::new(LexiconClassifier::new()));
    let rows = vec![row("a", 5, "Love it"), row("b", 5, "great")];
    let snap = engine.analyze(&rows).await;

    assert!(snap.top_negative_keywords.is_empty());
    assert_eq!(snap.recommendations.len(), 1);
    assert!(snap.recommendations[0].contains("No sufficiently negative feedback"));
}

#[tokio::test]
async fn negative_reviews_drive_keywords_and_recommendations() {
    let engine = engine_with(Arc::new(LexiconClassifier::new()));
    let rows = vec![
        row("a", 1, "Crashes on login every time, terrible"),
        row("b", 2, "Crashes after the update, awful and slow"),
    ];
    let snap = engine.analyze(&rows).await;

    assert!(snap.top_negative_keywords.iter().any(|k| k.contains("crashes")));
    assert!(snap.top_negative_keywords.len() <= 15);
    assert_eq!(snap.recommendations.len(), 3);
}

#[tokio::test]
async fn disabled_recommender_still_produces_a_nonempty_list() {
    let engine = InsightEngine::new(Arc::new(LexiconClassifier::new()), Arc::new(DisabledRecommender));
    let rows = vec![row("a", 1, "Terrible, crashes constantly")];
    let snap = engine.analyze(&rows).await;

    assert!((3..=5).contains(&snap.recommendations.len()));
}
