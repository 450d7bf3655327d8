// src/ingest.rs
//! Collection pipeline: fetch a candidate pool, sample it, drop unrated
//! entries, and insert what the store has not seen for this key.

use anyhow::Result;
use metrics::{counter, gauge};
use once_cell::sync::OnceCell;
use rand::seq::SliceRandom;
use tracing::info;

use crate::collect::types::ReviewRecord;
use crate::collect::{SourceRegistry, DEFAULT_PAGE_BUDGET};
use crate::normalize::clean_text;
use crate::store::{NewReview, ReviewStore};

/// One-time metrics registration (so series show up on /admin/metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        metrics::describe_counter!("ingest_inserted_total", "Rows inserted into the review store.");
        metrics::describe_counter!(
            "ingest_duplicates_total",
            "Candidates skipped because the natural key already exists."
        );
        metrics::describe_counter!(
            "ingest_rejected_total",
            "Candidates rejected for a missing or zero rating."
        );
        metrics::describe_counter!("collect_records_total", "Review entries parsed from feed pages.");
        metrics::describe_counter!("collect_pages_failed_total", "Feed pages that failed to fetch or parse.");
        metrics::describe_histogram!("collect_parse_ms", "Feed page parse time in milliseconds.");
        metrics::describe_gauge!("ingest_last_run_ts", "Unix ts of the last collect call.");
    });
}

/// Collect reviews for an app/country pair and persist the new ones.
///
/// Returns `(inserted, net_new)`: rows inserted by this call, and the
/// difference between the stored count after and before it. The two agree
/// for any single non-concurrent call; both are reported because the
/// pre/post diff is the contract checked by API callers.
pub async fn collect_reviews(
    store: &ReviewStore,
    registry: &SourceRegistry,
    app_id: &str,
    country: &str,
    how_many: usize,
    preference: &str,
) -> Result<(u64, i64)> {
    ensure_metrics_described();

    let Some(source) = registry.resolve(preference) else {
        return Ok((0, 0));
    };
    let mut pool = source.fetch(app_id, country, DEFAULT_PAGE_BUDGET).await;
    if pool.is_empty() {
        return Ok((0, 0));
    }

    // Shuffle before sampling so a pool larger than `how_many` does not
    // bias toward the newest pages.
    pool.shuffle(&mut rand::rng());
    pool.truncate(how_many);

    let mut rejected = 0u64;
    let candidates: Vec<NewReview> = pool
        .into_iter()
        .filter_map(|r| {
            if r.rating <= 0 {
                rejected += 1;
                return None;
            }
            Some(to_new_review(app_id, country, r))
        })
        .collect();

    let candidate_count = candidates.len() as u64;
    let before = store.count(app_id, country).await?;
    let inserted = store.insert_batch(candidates).await?;
    let after = store.count(app_id, country).await?;

    let duplicates = candidate_count - inserted;
    counter!("ingest_inserted_total").increment(inserted);
    counter!("ingest_duplicates_total").increment(duplicates);
    counter!("ingest_rejected_total").increment(rejected);
    gauge!("ingest_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
    info!(
        app_id,
        country,
        source = source.name(),
        inserted,
        duplicates,
        rejected,
        "collect run finished"
    );

    Ok((inserted, after as i64 - before as i64))
}

fn to_new_review(app_id: &str, country: &str, r: ReviewRecord) -> NewReview {
    let review_id = if r.review_id.is_empty() {
        format!("rss-{}", rand::random::<u32>())
    } else {
        r.review_id
    };
    NewReview {
        app_id: app_id.to_string(),
        country: country.to_string(),
        review_id,
        author: clean_text(&r.author),
        title: clean_text(&r.title),
        text: clean_text(&r.text),
        rating: r.rating,
        version: r.version,
        date: r.date,
        source: r.source,
        language: r.language,
    }
}
