// src/insights/recommender.rs
//! Recommendation generation capability: turns negative review texts into
//! 3-5 short imperative actions for the development team. Provider failures
//! never reach the caller; every path degrades to a generic fallback list.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::config::RecommenderConfig;

#[async_trait::async_trait]
pub trait Recommender: Send + Sync {
    /// Generate recommendations from negative review texts. Infallible by
    /// contract; implementations fall back instead of erroring.
    async fn recommend(&self, negative_texts: &[String]) -> Vec<String>;
    fn provider_name(&self) -> &'static str;
}

pub type DynRecommender = Arc<dyn Recommender>;

/// Factory: build a recommender according to config and environment.
///
/// * If `RECS_TEST_MODE=mock`, returns a deterministic mock.
/// * Else if the provider is `openai` and a key is present, the real client.
/// * Else a disabled client that always answers with the fallback list.
pub fn build_recommender(config: &RecommenderConfig) -> DynRecommender {
    if std::env::var("RECS_TEST_MODE").map(|v| v == "mock").unwrap_or(false) {
        return Arc::new(MockRecommender {
            fixed: fallback_recommendations(),
        });
    }

    match config.provider.as_str() {
        "openai" if !config.api_key.is_empty() => Arc::new(OpenAiRecommender::new(config)),
        _ => Arc::new(DisabledRecommender),
    }
}

/// Generic but plausible actions, used whenever a provider cannot produce a
/// valid structured result.
pub fn fallback_recommendations() -> Vec<String> {
    vec![
        "Reduce crashes and errors in top user flows".to_string(),
        "Clarify pricing, trials and cancellation inside the app".to_string(),
        "Improve login and account recovery reliability".to_string(),
        "Optimize performance on older devices and slow networks".to_string(),
        "Tighten billing, refunds and support escalation paths".to_string(),
    ]
}

// ------------------------------------------------------------
// OpenAI provider
// ------------------------------------------------------------

pub struct OpenAiRecommender {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

const SYSTEM_PROMPT: &str = "ROLE: Senior product analyst for a mobile app. \
TASK: Read the NEGATIVE_REVIEWS and produce 3-5 ACTIONABLE recommendations for the DEVELOPMENT TEAM. \
STYLE: Imperative, concise (<= 18 words each), specific. Do NOT quote or repeat user text. \
OUTPUT: STRICTLY a JSON array of strings. No extra text, no markdown.";

impl OpenAiRecommender {
    pub fn new(config: &RecommenderConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("appstore-review-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn fetch(&self, reviews_block: &str) -> Option<Vec<String>> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let user = format!(
            "NEGATIVE_REVIEWS (for analysis only - DO NOT QUOTE OR REPEAT):\n{reviews_block}\n\n\
             Now output ONLY a JSON array of 3-5 short, actionable recommendations."
        );
        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: 0.2,
            max_tokens: 220,
        };

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let body: Resp = resp.json().await.ok()?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("");

        let blob = extract_json_array(content)?;
        let arr: Vec<String> = serde_json::from_str(&blob).ok()?;
        let arr = dedupe_keep_order(arr);
        if (3..=5).contains(&arr.len()) {
            Some(arr)
        } else {
            None
        }
    }
}

#[async_trait::async_trait]
impl Recommender for OpenAiRecommender {
    async fn recommend(&self, negative_texts: &[String]) -> Vec<String> {
        let block = format_reviews_block(negative_texts, 240, 10);
        match self.fetch(&block).await {
            Some(recs) => recs,
            None => {
                tracing::warn!(provider = "openai", "recommendation generation fell back");
                counter!("recommender_fallback_total").increment(1);
                fallback_recommendations()
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

/// Used when no provider is configured; always answers with the fallback.
pub struct DisabledRecommender;

#[async_trait::async_trait]
impl Recommender for DisabledRecommender {
    async fn recommend(&self, _negative_texts: &[String]) -> Vec<String> {
        fallback_recommendations()
    }

    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic recommender for tests and local runs.
#[derive(Clone)]
pub struct MockRecommender {
    pub fixed: Vec<String>,
}

#[async_trait::async_trait]
impl Recommender for MockRecommender {
    async fn recommend(&self, _negative_texts: &[String]) -> Vec<String> {
        self.fixed.clone()
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

// ------------------------------------------------------------
// Prompt and output helpers
// ------------------------------------------------------------

/// Compact, representative block of review bullets. Head plus tail when
/// there are more texts than fit, so the sample is not all-newest.
pub(crate) fn format_reviews_block(texts: &[String], per_item_chars: usize, max_items: usize) -> String {
    let texts: Vec<&str> = texts.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect();
    if texts.is_empty() {
        return "(none)".to_string();
    }

    let sample: Vec<&str> = if texts.len() <= max_items {
        texts
    } else {
        let head = max_items / 2;
        let tail = max_items / 2;
        texts[..head]
            .iter()
            .chain(texts[texts.len() - tail..].iter())
            .copied()
            .collect()
    };

    let mut out = String::new();
    for t in sample {
        out.push_str("\n- ");
        out.extend(t.chars().take(per_item_chars));
    }
    out
}

/// Extract the first balanced JSON array from free-form model output,
/// honoring strings and escapes.
pub(crate) fn extract_json_array(text: &str) -> Option<String> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    let mut in_str = false;
    let mut esc = false;

    for (i, ch) in text[start..].char_indices() {
        if in_str {
            if esc {
                esc = false;
            } else if ch == '\\' {
                esc = true;
            } else if ch == '"' {
                in_str = false;
            }
            continue;
        }
        match ch {
            '"' => in_str = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..start + i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Case-insensitive de-duplication that keeps first occurrences and strips
/// trailing periods.
pub(crate) fn dedupe_keep_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for s in items {
        let t = s.trim().trim_end_matches('.').to_string();
        let key = t.to_lowercase();
        if !key.is_empty() && seen.insert(key) {
            out.push(t);
        }
    }
    out
}
