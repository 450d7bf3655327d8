// src/api.rs
use std::path::Path;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::collect::SourceRegistry;
use crate::error::ApiError;
use crate::export;
use crate::ingest;
use crate::insights::{InsightEngine, InsightsSnapshot};
use crate::report;
use crate::store::{ReviewStore, StoredReview};
use crate::summary::{self, MetricsSnapshot};

const MAX_LIMIT: u32 = 1000;
const MAX_HOW_MANY: usize = 1000;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ReviewStore>,
    pub sources: Arc<SourceRegistry>,
    pub insights: Arc<InsightEngine>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/collect", post(collect))
        .route("/reviews", get(list_reviews))
        .route("/reviews/download", get(download_reviews))
        .route("/metrics", get(metrics))
        .route("/insights", get(insights))
        .route("/report", get(report))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

fn default_country() -> String {
    "us".to_string()
}

fn default_how_many() -> usize {
    100
}

fn default_source() -> String {
    "auto".to_string()
}

fn default_format() -> String {
    "csv".to_string()
}

#[derive(serde::Deserialize)]
struct CollectReq {
    app_id: String,
    #[serde(default = "default_country")]
    country: String,
    #[serde(default = "default_how_many")]
    how_many: usize,
    #[serde(default = "default_source")]
    source: String,
}

#[derive(serde::Serialize)]
struct CollectResp {
    status: &'static str,
    inserted: u64,
    new_records: i64,
}

async fn collect(
    State(state): State<AppState>,
    Json(body): Json<CollectReq>,
) -> Result<Json<CollectResp>, ApiError> {
    if body.how_many == 0 || body.how_many > MAX_HOW_MANY {
        return Err(ApiError::BadRequest(format!(
            "how_many must be between 1 and {MAX_HOW_MANY}"
        )));
    }

    let (inserted, new_records) = ingest::collect_reviews(
        &state.store,
        &state.sources,
        &body.app_id,
        &body.country,
        body.how_many,
        &body.source,
    )
    .await?;

    Ok(Json(CollectResp {
        status: "ok",
        inserted,
        new_records,
    }))
}

#[derive(serde::Deserialize)]
struct ReviewsQuery {
    app_id: String,
    country: String,
    limit: Option<u32>,
}

async fn list_reviews(
    State(state): State<AppState>,
    Query(q): Query<ReviewsQuery>,
) -> Result<Json<Vec<StoredReview>>, ApiError> {
    let limit = q.limit.unwrap_or(100);
    if limit > MAX_LIMIT {
        return Err(ApiError::BadRequest(format!("limit must be <= {MAX_LIMIT}")));
    }
    let rows = state.store.list(&q.app_id, &q.country, limit).await?;
    Ok(Json(rows))
}

#[derive(serde::Deserialize)]
struct KeyQuery {
    app_id: String,
    country: String,
}

#[derive(serde::Serialize)]
struct MetricsResp {
    app_id: String,
    country: String,
    #[serde(flatten)]
    snapshot: MetricsSnapshot,
}

async fn metrics(
    State(state): State<AppState>,
    Query(q): Query<KeyQuery>,
) -> Result<Json<MetricsResp>, ApiError> {
    let rows = state.store.all_for(&q.app_id, &q.country).await?;
    Ok(Json(MetricsResp {
        snapshot: summary::summarize(&rows),
        app_id: q.app_id,
        country: q.country,
    }))
}

#[derive(serde::Serialize)]
struct InsightsResp {
    app_id: String,
    country: String,
    #[serde(flatten)]
    snapshot: InsightsSnapshot,
}

async fn insights(
    State(state): State<AppState>,
    Query(q): Query<KeyQuery>,
) -> Result<Json<InsightsResp>, ApiError> {
    let rows = state.store.all_for(&q.app_id, &q.country).await?;
    let snapshot = state.insights.analyze(&rows).await;
    Ok(Json(InsightsResp {
        snapshot,
        app_id: q.app_id,
        country: q.country,
    }))
}

#[derive(serde::Deserialize)]
struct DownloadQuery {
    app_id: String,
    country: String,
    #[serde(default = "default_format")]
    format: String,
    #[serde(default)]
    save_local: bool,
}

async fn download_reviews(
    State(state): State<AppState>,
    Query(q): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let rows = state.store.all_for(&q.app_id, &q.country).await?;

    let (bytes, content_type, ext) = match q.format.as_str() {
        "csv" => (export::to_csv(&rows).into_bytes(), "text/csv", "csv"),
        "json" => (export::to_json(&rows)?, "application/json", "json"),
        other => {
            return Err(ApiError::BadRequest(format!(
                "unsupported format '{other}', expected csv or json"
            )))
        }
    };

    let filename = format!("reviews_{}_{}.{ext}", q.app_id, q.country);
    if q.save_local {
        export::save_local(Path::new(&filename), &bytes)?;
    }

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[derive(serde::Deserialize)]
struct ReportQuery {
    app_id: String,
    country: String,
    #[serde(default)]
    save_local: bool,
}

async fn report(
    State(state): State<AppState>,
    Query(q): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let rows = state.store.all_for(&q.app_id, &q.country).await?;
    let metrics = summary::summarize(&rows);
    let insights = state.insights.analyze(&rows).await;
    let html = report::render_report(&q.app_id, &q.country, &metrics, &insights);

    let filename = format!("report_{}_{}.html", q.app_id, q.country);
    if q.save_local {
        export::save_local(Path::new(&filename), html.as_bytes())?;
    }

    Ok((
        [(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )],
        Html(html),
    )
        .into_response())
}
