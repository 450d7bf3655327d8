// src/store.rs
//! SQLite-backed review store. One table, unique on the natural key
//! (app_id, country, review_id); rows are inserted once and never updated.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use tokio_rusqlite::Connection;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    app_id TEXT NOT NULL,
    country TEXT NOT NULL,
    review_id TEXT NOT NULL,
    author TEXT NOT NULL DEFAULT '',
    title TEXT NOT NULL DEFAULT '',
    text TEXT NOT NULL DEFAULT '',
    rating INTEGER NOT NULL,
    version TEXT NOT NULL DEFAULT '',
    date TEXT,
    source TEXT NOT NULL DEFAULT '',
    language TEXT NOT NULL DEFAULT '',
    UNIQUE(app_id, country, review_id)
);

CREATE INDEX IF NOT EXISTS idx_reviews_app_country ON reviews(app_id, country);
CREATE INDEX IF NOT EXISTS idx_reviews_date ON reviews(date DESC);
"#;

/// A persisted review row.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredReview {
    #[serde(skip_serializing)]
    pub id: i64,
    pub app_id: String,
    pub country: String,
    pub review_id: String,
    pub author: String,
    pub title: String,
    pub text: String,
    pub rating: i64,
    pub version: String,
    pub date: Option<DateTime<Utc>>,
    pub source: String,
    pub language: String,
}

/// A row ready for insertion (normalized, rated, id defaulted).
#[derive(Debug, Clone)]
pub struct NewReview {
    pub app_id: String,
    pub country: String,
    pub review_id: String,
    pub author: String,
    pub title: String,
    pub text: String,
    pub rating: i64,
    pub version: String,
    pub date: Option<DateTime<Utc>>,
    pub source: String,
    pub language: String,
}

pub struct ReviewStore {
    conn: Connection,
}

impl ReviewStore {
    /// Open (or create) the database at `path` and apply the schema.
    /// `:memory:` is accepted for tests.
    pub async fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).await?;
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;
        Ok(Self { conn })
    }

    /// Insert a batch in a single transaction. Natural-key conflicts are
    /// resolved by the unique constraint itself (`ON CONFLICT DO NOTHING`),
    /// so concurrent collect calls cannot produce duplicate rows. Returns
    /// the number of rows actually inserted.
    pub async fn insert_batch(&self, rows: Vec<NewReview>) -> Result<u64> {
        let inserted = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut inserted = 0u64;
                {
                    let mut stmt = tx.prepare(
                        r#"INSERT INTO reviews
                               (app_id, country, review_id, author, title, text,
                                rating, version, date, source, language)
                           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                           ON CONFLICT(app_id, country, review_id) DO NOTHING"#,
                    )?;
                    for r in rows {
                        let changed = stmt.execute(params![
                            r.app_id,
                            r.country,
                            r.review_id,
                            r.author,
                            r.title,
                            r.text,
                            r.rating,
                            r.version,
                            r.date.map(|dt| dt.to_rfc3339()),
                            r.source,
                            r.language,
                        ])?;
                        inserted += changed as u64;
                    }
                }
                tx.commit()?;
                Ok(inserted)
            })
            .await?;
        Ok(inserted)
    }

    pub async fn count(&self, app_id: &str, country: &str) -> Result<u64> {
        let (app_id, country) = (app_id.to_string(), country.to_string());
        let n = self
            .conn
            .call(move |conn| {
                let n: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM reviews WHERE app_id = ?1 AND country = ?2",
                    params![app_id, country],
                    |row| row.get(0),
                )?;
                Ok(n)
            })
            .await?;
        Ok(n as u64)
    }

    /// Stored reviews for a key, newest first, undated rows last.
    pub async fn list(&self, app_id: &str, country: &str, limit: u32) -> Result<Vec<StoredReview>> {
        let (app_id, country) = (app_id.to_string(), country.to_string());
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT id, app_id, country, review_id, author, title, text,
                              rating, version, date, source, language
                       FROM reviews
                       WHERE app_id = ?1 AND country = ?2
                       ORDER BY date DESC NULLS LAST
                       LIMIT ?3"#,
                )?;
                let rows = stmt
                    .query_map(params![app_id, country, limit], |row| Ok(review_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;
        Ok(rows)
    }

    /// All stored reviews for a key, insertion order. Aggregations and
    /// exports recompute from this on every request.
    pub async fn all_for(&self, app_id: &str, country: &str) -> Result<Vec<StoredReview>> {
        let (app_id, country) = (app_id.to_string(), country.to_string());
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT id, app_id, country, review_id, author, title, text,
                              rating, version, date, source, language
                       FROM reviews
                       WHERE app_id = ?1 AND country = ?2"#,
                )?;
                let rows = stmt
                    .query_map(params![app_id, country], |row| Ok(review_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;
        Ok(rows)
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn review_from_row(row: &Row) -> StoredReview {
    StoredReview {
        id: row.get(0).unwrap_or_default(),
        app_id: row.get(1).unwrap_or_default(),
        country: row.get(2).unwrap_or_default(),
        review_id: row.get(3).unwrap_or_default(),
        author: row.get(4).unwrap_or_default(),
        title: row.get(5).unwrap_or_default(),
        text: row.get(6).unwrap_or_default(),
        rating: row.get(7).unwrap_or_default(),
        version: row.get(8).unwrap_or_default(),
        date: row
            .get::<_, Option<String>>(9)
            .ok()
            .flatten()
            .and_then(|s| parse_datetime(&s)),
        source: row.get(10).unwrap_or_default(),
        language: row.get(11).unwrap_or_default(),
    }
}
