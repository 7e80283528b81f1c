//! News impact and sentiment scoring.

use crate::types::{NewsItem, NewsSentiment, SentimentLabel};
use tracing::info;

/// Impact and sentiment scoring for news headlines.
pub trait NewsScorer: Send + Sync {
    /// Relevance of a headline to the instrument, in [0, 1].
    fn score_impact(&self, title: &str) -> f64;

    /// Aggregate sentiment over a batch. `None` when there is nothing to score.
    fn sentiment(&self, items: &[NewsItem]) -> Option<NewsSentiment>;

    /// Copy `items` with their impact filled in by this scorer.
    fn score_items(&self, items: &[NewsItem]) -> Vec<NewsItem> {
        items
            .iter()
            .map(|item| NewsItem {
                impact: self.score_impact(&item.title),
                ..item.clone()
            })
            .collect()
    }
}

const HIGH_IMPACT_KEYWORDS: &[&str] = &[
    "fed", "federal reserve", "interest rate", "inflation", "cpi", "ppi", "powell", "yellen",
    "treasury", "dollar", "usd", "recession", "war", "conflict", "crisis", "surge", "plunge",
    "crash", "rally", "soar", "jump", "spike", "tumble", "slump",
];

const GOLD_KEYWORDS: &[&str] = &[
    "gold", "xau", "bullion", "precious metal", "safe haven", "ounce", "troy", "spot gold",
    "gold futures", "gold price",
];

const POSITIVE_KEYWORDS: &[&str] = &[
    "rally", "soar", "jump", "spike", "surge", "gain", "rise", "climb", "bullish", "uptrend",
    "support", "positive", "optimistic",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "plunge", "crash", "tumble", "slump", "drop", "fall", "decline", "sink", "bearish",
    "downtrend", "resistance", "negative", "pessimistic",
];

/// Impact given to headlines that never mention the instrument.
const UNRELATED_IMPACT: f64 = 0.3;

/// Case-insensitive substring keyword matcher.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    instrument_keywords: Vec<String>,
}

impl Default for KeywordScorer {
    fn default() -> Self {
        Self::new(GOLD_KEYWORDS.iter().map(|k| k.to_string()).collect())
    }
}

impl KeywordScorer {
    /// Scorer for a custom instrument keyword list (lowercase).
    pub fn new(instrument_keywords: Vec<String>) -> Self {
        Self { instrument_keywords }
    }

    fn hits<'a>(text: &str, keywords: impl IntoIterator<Item = &'a str>) -> u32 {
        keywords.into_iter().filter(|k| text.contains(k)).count() as u32
    }
}

impl NewsScorer for KeywordScorer {
    fn score_impact(&self, title: &str) -> f64 {
        let title = title.to_lowercase();

        let related = self
            .instrument_keywords
            .iter()
            .any(|k| title.contains(k.as_str()));
        if !related {
            return UNRELATED_IMPACT;
        }

        let count = Self::hits(&title, HIGH_IMPACT_KEYWORDS.iter().copied());
        0.5 + (count as f64 * 0.1).min(0.5)
    }

    fn sentiment(&self, items: &[NewsItem]) -> Option<NewsSentiment> {
        if items.is_empty() {
            return None;
        }

        let (positive_count, negative_count) = items.iter().fold((0, 0), |(pos, neg), item| {
            let title = item.title.to_lowercase();
            (
                pos + Self::hits(&title, POSITIVE_KEYWORDS.iter().copied()),
                neg + Self::hits(&title, NEGATIVE_KEYWORDS.iter().copied()),
            )
        });

        let total = positive_count + negative_count;
        let score = if total > 0 {
            (positive_count as f64 - negative_count as f64) / total as f64
        } else {
            0.0
        };
        let label = SentimentLabel::from_score(score);

        info!("News sentiment analysis: {} (score {:.2})", label, score);

        Some(NewsSentiment {
            label,
            score,
            positive_count,
            negative_count,
            total_articles: items.len(),
        })
    }
}
