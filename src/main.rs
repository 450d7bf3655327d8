//! App-Store Review Analysis Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the store, collectors, insight
//! capabilities, and telemetry.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use appstore_review_analyzer::api::{self, AppState};
use appstore_review_analyzer::collect::SourceRegistry;
use appstore_review_analyzer::config::AppConfig;
use appstore_review_analyzer::insights::recommender::build_recommender;
use appstore_review_analyzer::insights::sentiment::LexiconClassifier;
use appstore_review_analyzer::insights::InsightEngine;
use appstore_review_analyzer::store::ReviewStore;
use appstore_review_analyzer::telemetry::Telemetry;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("appstore_review_analyzer=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::from_env();
    tracing::info!(
        db_path = %config.db_path,
        recommender = %config.recommender.provider,
        "starting review analysis service"
    );

    // Capabilities are built exactly once here and injected via AppState;
    // no lazily-initialized process-wide singletons.
    let telemetry = Telemetry::init()?;
    let store = Arc::new(ReviewStore::open(&config.db_path).await?);
    let sources = Arc::new(SourceRegistry::with_rss());
    let insights = Arc::new(InsightEngine::new(
        Arc::new(LexiconClassifier::new()),
        build_recommender(&config.recommender),
    ));

    let state = AppState {
        store,
        sources,
        insights,
    };
    let router = api::create_router(state).merge(telemetry.router());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, router).await?;

    Ok(())
}
