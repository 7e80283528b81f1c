//! Human-readable titles and bodies for notification events.

use crate::types::{NewsItem, NewsSentiment, PriceState, SentimentLabel, SignalSummary, SignalType};
use std::fmt::Write;

/// Headlines listed in the end-of-day report.
pub const EOD_HEADLINE_LIMIT: usize = 5;

/// RSI zone label for display.
pub fn rsi_label(rsi: f64, overbought: f64, oversold: f64) -> &'static str {
    if rsi > overbought {
        "Overbought"
    } else if rsi < oversold {
        "Oversold"
    } else {
        "Neutral"
    }
}

fn direction(change: f64) -> &'static str {
    if change >= 0.0 {
        "Up"
    } else {
        "Down"
    }
}

pub fn price_title(instrument: &str, change: f64) -> String {
    format!("{} Price {}", instrument, direction(change))
}

pub fn price_message(instrument: &str, current: f64, previous: f64, change: f64, pct: f64) -> String {
    format!(
        "{} price moved {} by ${:.2} ({:.2}%)\nCurrent price: ${:.2}\nPrevious price: ${:.2}",
        instrument,
        direction(change).to_lowercase(),
        change.abs(),
        pct.abs(),
        current,
        previous
    )
}

pub fn signal_title(instrument: &str, signal_type: SignalType) -> String {
    format!("{} Trading Signal: {}", instrument, signal_type)
}

/// Indicator breakdown shared by signal alerts, lookups and the EOD report.
pub fn signal_details(summary: &SignalSummary, overbought: f64, oversold: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Signal: {}", summary.signal_type);
    let _ = writeln!(out, "Strength: {:.2}", summary.strength);
    let _ = writeln!(out, "Price: ${:.2}", summary.price);

    match summary.rsi {
        Some(rsi) => {
            let _ = writeln!(out, "RSI: {:.2} ({})", rsi, rsi_label(rsi, overbought, oversold));
        }
        None => {
            let _ = writeln!(out, "RSI: n/a");
        }
    }

    if let (Some(line), Some(signal)) = (summary.macd, summary.macd_signal) {
        let _ = writeln!(out, "MACD: {:.4}", line);
        let _ = writeln!(out, "MACD Signal: {:.4}", signal);
        let relation = if line > signal {
            "MACD is above signal line (Bullish)"
        } else {
            "MACD is below signal line (Bearish)"
        };
        let _ = writeln!(out, "{}", relation);
    }

    for (period, value) in &summary.moving_averages {
        let _ = writeln!(out, "MA{}: ${:.2}", period, value);
    }

    if let Some(support) = summary.closest_support {
        let _ = writeln!(out, "Closest support: ${:.2}", support);
    }
    if let Some(resistance) = summary.closest_resistance {
        let _ = writeln!(out, "Closest resistance: ${:.2}", resistance);
    }

    out.trim_end().to_string()
}

pub fn news_title(instrument: &str, item: &NewsItem) -> String {
    format!("{} News: {}", instrument, item.title)
}

pub fn news_message(item: &NewsItem) -> String {
    format!(
        "{}\nSource: {}\nDate: {}\nImpact: {:.2}\n{}",
        item.title,
        item.source,
        item.date.format("%Y-%m-%d %H:%M UTC"),
        item.impact,
        item.url
    )
}

pub fn eod_title(instrument: &str) -> String {
    format!("{} Trading: End-of-Day Report", instrument)
}

/// Next-day outlook from the technical signal, qualified by news sentiment.
///
/// Returns the outlook label and the reasons behind it.
pub fn forecast(
    summary: Option<&SignalSummary>,
    sentiment: Option<&NewsSentiment>,
) -> (&'static str, Vec<String>) {
    let mut reasons = Vec::new();

    let technical = match summary.map(|s| s.signal_type) {
        Some(SignalType::Buy) => {
            reasons.push("Technical indicators point to a BUY signal".to_string());
            "Bullish"
        }
        Some(SignalType::Sell) => {
            reasons.push("Technical indicators point to a SELL signal".to_string());
            "Bearish"
        }
        Some(SignalType::Neutral) => {
            reasons.push("Technical indicators are neutral".to_string());
            "Neutral"
        }
        None => "Neutral",
    };

    let outlook = match sentiment.map(|s| s.label) {
        Some(SentimentLabel::Bullish) => {
            reasons.push("News sentiment is bullish".to_string());
            if technical == "Bearish" { "Mixed" } else { "Bullish" }
        }
        Some(SentimentLabel::Bearish) => {
            reasons.push("News sentiment is bearish".to_string());
            if technical == "Bullish" { "Mixed" } else { "Bearish" }
        }
        Some(SentimentLabel::Neutral) | None => technical,
    };

    (outlook, reasons)
}

pub fn eod_message(
    instrument: &str,
    price: Option<&PriceState>,
    summary: Option<&SignalSummary>,
    sentiment: Option<&NewsSentiment>,
    latest_news: &[NewsItem],
    overbought: f64,
    oversold: f64,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "PRICE SUMMARY");
    match price {
        Some(p) => {
            let _ = writeln!(out, "Current {} price: ${:.2}", instrument.to_lowercase(), p.current_price);
            if let (Some(change), Some(pct)) = (p.change, p.percent_change) {
                let sign = if change >= 0.0 { "+" } else { "-" };
                let _ = writeln!(out, "Daily change: {}${:.2} ({}{:.2}%)", sign, change.abs(), sign, pct.abs());
            }
        }
        None => {
            let _ = writeln!(out, "Price data unavailable");
        }
    }

    let _ = writeln!(out, "\nTECHNICAL ANALYSIS");
    match summary {
        Some(s) => {
            let _ = writeln!(out, "{}", signal_details(s, overbought, oversold));
        }
        None => {
            let _ = writeln!(out, "Technical analysis unavailable");
        }
    }

    let _ = writeln!(out, "\nNEWS SUMMARY");
    match sentiment {
        Some(s) => {
            let _ = writeln!(
                out,
                "Sentiment: {} ({:+.2}) across {} articles",
                s.label, s.score, s.total_articles
            );
        }
        None => {
            let _ = writeln!(out, "Sentiment unavailable");
        }
    }
    for item in latest_news.iter().take(EOD_HEADLINE_LIMIT) {
        let _ = writeln!(out, "- {} ({})", item.title, item.source);
    }

    let (outlook, reasons) = forecast(summary, sentiment);
    let _ = writeln!(out, "\nFORECAST FOR TOMORROW");
    let _ = writeln!(out, "Outlook: {}", outlook);
    for reason in reasons {
        let _ = writeln!(out, "- {}", reason);
    }

    out.trim_end().to_string()
}
