// src/config.rs
//! Environment-driven configuration. One variable selects the storage file;
//! the recommender provider is opt-in and disabled by default.

use std::env;

pub const ENV_DB_PATH: &str = "REVIEWS_DB_PATH";
pub const DEFAULT_DB_PATH: &str = "reviews.db";

pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

pub const ENV_RECS_PROVIDER: &str = "RECS_PROVIDER";
pub const ENV_RECS_MODEL: &str = "RECS_MODEL";
pub const DEFAULT_RECS_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: String,
    pub bind_addr: String,
    pub recommender: RecommenderConfig,
}

#[derive(Debug, Clone)]
pub struct RecommenderConfig {
    /// "openai" | "disabled"
    pub provider: String,
    pub model: String,
    pub api_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let provider = env::var(ENV_RECS_PROVIDER)
            .unwrap_or_else(|_| "disabled".to_string())
            .to_lowercase();
        Self {
            db_path: env::var(ENV_DB_PATH).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
            bind_addr: env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            recommender: RecommenderConfig {
                provider,
                model: env::var(ENV_RECS_MODEL).unwrap_or_else(|_| DEFAULT_RECS_MODEL.to_string()),
                api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            },
        }
    }
}
