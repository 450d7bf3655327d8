// src/insights/keywords.rs
//! Document-frequency-weighted keyword extraction over negative review
//! texts: unigram + bigram tf-idf, smoothed idf, per-document L2
//! normalization, ranked by mean relevance across documents.

use std::collections::HashMap;

const MAX_FEATURES: usize = 500;

static STOP_WORDS: &[&str] = &[
    "a", "about", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "but", "by", "can", "could", "did", "do", "does",
    "doing", "down", "during", "each", "few", "for", "from", "further", "had", "has", "have",
    "having", "he", "her", "here", "hers", "him", "his", "how", "if", "in", "into", "is", "it",
    "its", "itself", "just", "me", "more", "most", "my", "myself", "now", "of", "off", "on",
    "once", "only", "or", "other", "our", "ours", "out", "over", "own", "same", "she", "should",
    "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "then", "there",
    "these", "they", "this", "those", "through", "to", "too", "under", "until", "up", "very",
    "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "would", "you", "your", "yours", "yourself",
];

fn is_stop_word(w: &str) -> bool {
    STOP_WORDS.binary_search(&w).is_ok()
}

/// Word tokens of at least two characters, lower-cased, stop words removed.
fn content_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(|t| t.to_ascii_lowercase())
        .filter(|t| !is_stop_word(t))
        .collect()
}

/// Unigrams plus adjacent bigrams of the content tokens.
fn terms(text: &str) -> Vec<String> {
    let tokens = content_tokens(text);
    let mut out = Vec::with_capacity(tokens.len() * 2);
    out.extend(tokens.iter().cloned());
    for pair in tokens.windows(2) {
        out.push(format!("{} {}", pair[0], pair[1]));
    }
    out
}

/// Top `top_k` terms across `texts` by mean tf-idf. Empty input or
/// all-stop-word input yields an empty list. Ordering is deterministic:
/// score descending, then term descending.
pub fn top_keywords(texts: &[String], top_k: usize) -> Vec<String> {
    if texts.is_empty() || top_k == 0 {
        return Vec::new();
    }

    let docs: Vec<Vec<String>> = texts.iter().map(|t| terms(t)).collect();
    let n_docs = docs.len();

    // Document frequency and corpus frequency per term.
    let mut df: HashMap<&str, usize> = HashMap::new();
    let mut cf: HashMap<&str, usize> = HashMap::new();
    for doc in &docs {
        let mut seen: Vec<&str> = Vec::new();
        for t in doc {
            *cf.entry(t.as_str()).or_insert(0) += 1;
            if !seen.contains(&t.as_str()) {
                seen.push(t.as_str());
                *df.entry(t.as_str()).or_insert(0) += 1;
            }
        }
    }
    if df.is_empty() {
        return Vec::new();
    }

    // Cap the vocabulary at the most frequent terms, alphabetic tie-break.
    let mut vocab: Vec<&str> = df.keys().copied().collect();
    vocab.sort_by(|a, b| cf[b].cmp(&cf[a]).then(a.cmp(b)));
    vocab.truncate(MAX_FEATURES);
    let index: HashMap<&str, usize> = vocab.iter().enumerate().map(|(i, t)| (*t, i)).collect();

    let idf: Vec<f64> = vocab
        .iter()
        .map(|t| ((1.0 + n_docs as f64) / (1.0 + df[t] as f64)).ln() + 1.0)
        .collect();

    // Mean of L2-normalized tf-idf vectors over all documents.
    let mut means = vec![0.0f64; vocab.len()];
    for doc in &docs {
        let mut weights = vec![0.0f64; vocab.len()];
        for t in doc {
            if let Some(&i) = index.get(t.as_str()) {
                weights[i] += idf[i];
            }
        }
        let norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (m, w) in means.iter_mut().zip(&weights) {
                *m += w / norm;
            }
        }
    }
    for m in &mut means {
        *m /= n_docs as f64;
    }

    let mut ranked: Vec<(f64, &str)> = means.into_iter().zip(vocab).collect();
    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal).then(b.1.cmp(a.1)));
    ranked
        .into_iter()
        .take(top_k)
        .map(|(_, t)| t.to_string())
        .collect()
}
