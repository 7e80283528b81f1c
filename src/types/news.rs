use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A news article relevant to the monitored instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub date: DateTime<Utc>,
    pub url: String,
    /// Relevance weight in [0, 1]. Unscored feed items default to 0.
    #[serde(default)]
    pub impact: f64,
}

impl NewsItem {
    /// Dedup key: title and source joined by `|`.
    pub fn id(&self) -> String {
        format!("{}|{}", self.title, self.source)
    }
}

/// Overall mood of recent headlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Bullish,
    Bearish,
    Neutral,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score > 0.2 {
            SentimentLabel::Bullish
        } else if score < -0.2 {
            SentimentLabel::Bearish
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Bullish => "Bullish",
            SentimentLabel::Bearish => "Bearish",
            SentimentLabel::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate sentiment over a batch of headlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSentiment {
    pub label: SentimentLabel,
    /// Score in [-1, 1].
    pub score: f64,
    pub positive_count: u32,
    pub negative_count: u32,
    pub total_articles: usize,
}
