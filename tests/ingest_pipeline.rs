// tests/ingest_pipeline.rs
//
// End-to-end ingestion against an in-memory store and a fixture source:
// sampling bounds, unrated rejection, natural-key de-duplication, and the
// inserted == net_new contract.

use appstore_review_analyzer::collect::types::{ReviewRecord, ReviewSource};
use appstore_review_analyzer::collect::SourceRegistry;
use appstore_review_analyzer::ingest::collect_reviews;
use appstore_review_analyzer::store::ReviewStore;

struct FixtureSource {
    records: Vec<ReviewRecord>,
}

#[async_trait::async_trait]
impl ReviewSource for FixtureSource {
    async fn fetch(&self, _app_id: &str, _country: &str, _max_pages: u32) -> Vec<ReviewRecord> {
        self.records.clone()
    }
    fn name(&self) -> &'static str {
        "fixture"
    }
}

fn record(review_id: &str, rating: i64, text: &str) -> ReviewRecord {
    ReviewRecord {
        review_id: review_id.to_string(),
        author: "tester".to_string(),
        title: "title".to_string(),
        text: text.to_string(),
        rating,
        version: "1.0".to_string(),
        date: None,
        source: "rss".to_string(),
        language: String::new(),
    }
}

fn registry(records: Vec<ReviewRecord>) -> SourceRegistry {
    SourceRegistry::new(vec![Box::new(FixtureSource { records })])
}

async fn mem_store() -> ReviewStore {
    ReviewStore::open(":memory:").await.expect("open :memory:")
}

#[tokio::test]
async fn empty_pool_short_circuits_to_zero() {
    let store = mem_store().await;
    let reg = registry(Vec::new());
    let (inserted, net_new) = collect_reviews(&store, &reg, "1", "us", 100, "auto")
        .await
        .unwrap();
    assert_eq!((inserted, net_new), (0, 0));
}

#[tokio::test]
async fn pool_smaller_than_how_many_inserts_whole_pool() {
    let store = mem_store().await;
    let reg = registry(vec![
        record("a", 5, "great"),
        record("b", 4, "good"),
        record("c", 1, "bad"),
    ]);
    let (inserted, net_new) = collect_reviews(&store, &reg, "1", "us", 5, "auto")
        .await
        .unwrap();
    assert_eq!(inserted, 3, "3 distinct rated records, not how_many");
    assert_eq!(net_new, 3);
}

#[tokio::test]
async fn unrated_records_are_rejected_silently() {
    let store = mem_store().await;
    let reg = registry(vec![
        record("a", 5, "great"),
        record("b", 0, "no rating came through"),
    ]);
    let (inserted, net_new) = collect_reviews(&store, &reg, "1", "us", 10, "auto")
        .await
        .unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(net_new, 1);
    assert_eq!(store.count("1", "us").await.unwrap(), 1);
}

#[tokio::test]
async fn second_run_over_unchanged_feed_inserts_nothing() {
    let store = mem_store().await;
    let reg = registry(vec![record("a", 5, "great"), record("b", 2, "meh")]);

    let (first, _) = collect_reviews(&store, &reg, "1", "us", 10, "auto").await.unwrap();
    assert_eq!(first, 2);

    let (second, net_new) = collect_reviews(&store, &reg, "1", "us", 10, "auto").await.unwrap();
    assert_eq!(second, 0, "idempotent against an unchanged feed");
    assert_eq!(net_new, 0);
    assert_eq!(store.count("1", "us").await.unwrap(), 2);
}

#[tokio::test]
async fn natural_key_is_unique_even_within_one_batch() {
    let store = mem_store().await;
    let reg = registry(vec![
        record("same-id", 5, "first copy"),
        record("same-id", 5, "second copy"),
    ]);
    let (inserted, net_new) = collect_reviews(&store, &reg, "1", "us", 10, "auto").await.unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(net_new, 1);
}

#[tokio::test]
async fn inserted_always_equals_net_new_for_single_calls() {
    let store = mem_store().await;
    // seed a row under the same key first
    let reg0 = registry(vec![record("seed", 3, "ok")]);
    collect_reviews(&store, &reg0, "1", "us", 10, "auto").await.unwrap();

    let reg = registry(vec![
        record("seed", 3, "duplicate of stored row"),
        record("x", 0, "unrated"),
        record("y", 4, "fresh"),
    ]);
    let (inserted, net_new) = collect_reviews(&store, &reg, "1", "us", 10, "auto").await.unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(net_new, 1);
}

#[tokio::test]
async fn keys_are_scoped_per_app_and_country() {
    let store = mem_store().await;
    let reg = registry(vec![record("a", 5, "great")]);

    collect_reviews(&store, &reg, "1", "us", 10, "auto").await.unwrap();
    let (inserted, _) = collect_reviews(&store, &reg, "1", "de", 10, "auto").await.unwrap();

    assert_eq!(inserted, 1, "same review id under another country is a new row");
    assert_eq!(store.count("1", "us").await.unwrap(), 1);
    assert_eq!(store.count("1", "de").await.unwrap(), 1);
}

#[tokio::test]
async fn listing_orders_by_date_descending_with_undated_rows_last() {
    use chrono::{TimeZone, Utc};

    let store = mem_store().await;
    let mut older = record("older", 4, "fine");
    older.date = Some(Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap());
    let mut newer = record("newer", 5, "great");
    newer.date = Some(Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap());
    let undated = record("undated", 3, "ok");

    let reg = registry(vec![older, undated, newer]);
    collect_reviews(&store, &reg, "1", "us", 10, "auto").await.unwrap();

    let ids: Vec<String> = store
        .list("1", "us", 10)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.review_id)
        .collect();
    assert_eq!(ids, vec!["newer", "older", "undated"]);
}

#[tokio::test]
async fn records_without_ids_get_synthesized_ones() {
    let store = mem_store().await;
    let reg = registry(vec![record("", 5, "no id from the feed")]);

    let (inserted, _) = collect_reviews(&store, &reg, "1", "us", 10, "auto").await.unwrap();
    assert_eq!(inserted, 1);

    let rows = store.list("1", "us", 10).await.unwrap();
    assert!(rows[0].review_id.starts_with("rss-"), "got '{}'", rows[0].review_id);
}
