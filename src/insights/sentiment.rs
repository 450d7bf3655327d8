// src/insights/sentiment.rs
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Positive => "positive",
        }
    }
}

/// Sentiment classification capability. Consumed by the insight engine;
/// assumed deterministic per call, so one pass per review suffices.
pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Sentiment;
    fn name(&self) -> &'static str;
}

/// Bundled lexicon classifier with short-range negation handling.
#[derive(Debug, Clone, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Summed lexicon score over the tokens. A negator within the previous
    /// 1..=3 tokens inverts the sign of a scored word.
    pub fn score_text(&self, text: &str) -> i32 {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;

        for i in 0..tokens.len() {
            let base = self.word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
        }

        score
    }
}

impl SentimentClassifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Sentiment {
        if text.trim().is_empty() {
            return Sentiment::Neutral;
        }
        match self.score_text(text) {
            s if s < 0 => Sentiment::Negative,
            s if s > 0 => Sentiment::Positive,
            _ => Sentiment::Neutral,
        }
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

/// Lower-cased tokens. Apostrophes survive tokenization so contracted
/// negators ("isn't", "can't") stay in one piece.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|t| t.trim_matches('\'').to_ascii_lowercase())
        .filter(|t| !t.is_empty())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "don't"
            | "doesn't"
            | "didn't"
            | "cannot"
            | "without"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_neutral() {
        let c = LexiconClassifier::new();
        assert_eq!(c.classify(""), Sentiment::Neutral);
        assert_eq!(c.classify("   "), Sentiment::Neutral);
    }

    #[test]
    fn praise_scores_positive() {
        let c = LexiconClassifier::new();
        assert_eq!(c.classify("Great app, love the new design"), Sentiment::Positive);
    }

    #[test]
    fn complaints_score_negative() {
        let c = LexiconClassifier::new();
        assert_eq!(
            c.classify("Constant crash after the update, terrible and slow"),
            Sentiment::Negative
        );
    }

    #[test]
    fn negation_flips_polarity() {
        let c = LexiconClassifier::new();
        assert_eq!(c.classify("not great"), Sentiment::Negative);
    }

    #[test]
    fn unknown_words_stay_neutral() {
        let c = LexiconClassifier::new();
        assert_eq!(c.classify("the weather outside today"), Sentiment::Neutral);
    }
}
