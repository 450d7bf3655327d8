// src/summary.rs
use std::collections::BTreeMap;

use crate::store::StoredReview;

/// Aggregate rating metrics for one app/country key. Derived on every
/// request from the stored rows; never cached.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub count: u64,
    pub average_rating: f64,
    /// Rating value (stringified, ascending) -> percentage of rated reviews.
    pub distribution: BTreeMap<String, f64>,
}

impl MetricsSnapshot {
    pub fn empty() -> Self {
        Self {
            count: 0,
            average_rating: 0.0,
            distribution: BTreeMap::new(),
        }
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn summarize(rows: &[StoredReview]) -> MetricsSnapshot {
    if rows.is_empty() {
        return MetricsSnapshot::empty();
    }

    let ratings: Vec<i64> = rows.iter().map(|r| r.rating).collect();
    let total = ratings.len() as u64;
    let avg = ratings.iter().sum::<i64>() as f64 / total as f64;

    let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
    for r in &ratings {
        *counts.entry(*r).or_insert(0) += 1;
    }
    let distribution = counts
        .into_iter()
        .map(|(rating, n)| (rating.to_string(), round2(n as f64 * 100.0 / total as f64)))
        .collect();

    MetricsSnapshot {
        count: total,
        average_rating: round2(avg),
        distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(rating: i64) -> StoredReview {
        StoredReview {
            id: 0,
            app_id: "1".into(),
            country: "us".into(),
            review_id: format!("r{rating}"),
            author: String::new(),
            title: String::new(),
            text: String::new(),
            rating,
            version: String::new(),
            date: None,
            source: "rss".into(),
            language: String::new(),
        }
    }

    #[test]
    fn empty_set_yields_zeroed_snapshot() {
        let m = summarize(&[]);
        assert_eq!(m, MetricsSnapshot::empty());
    }

    #[test]
    fn five_five_three_example() {
        let rows = vec![row(5), row(5), row(3)];
        let m = summarize(&rows);
        assert_eq!(m.count, 3);
        assert_eq!(m.average_rating, 4.33);
        assert_eq!(m.distribution.get("3"), Some(&33.33));
        assert_eq!(m.distribution.get("5"), Some(&66.67));
    }

    #[test]
    fn distribution_percentages_sum_to_about_100() {
        let rows = vec![row(1), row(2), row(2), row(4), row(5), row(5), row(5)];
        let m = summarize(&rows);
        let sum: f64 = m.distribution.values().sum();
        assert!((sum - 100.0).abs() < 0.05, "sum was {sum}");
    }

    #[test]
    fn distribution_keys_sort_ascending() {
        let rows = vec![row(5), row(1), row(3)];
        let keys: Vec<String> = summarize(&rows).distribution.into_keys().collect();
        assert_eq!(keys, vec!["1", "3", "5"]);
    }
}
