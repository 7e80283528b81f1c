use crate::error::AppError;
use crate::types::NotificationType;
use chrono::NaiveTime;
use std::env;
use std::path::PathBuf;
use tracing::warn;

/// Webhook recipient for notification delivery.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Recipient name used in logs.
    pub name: String,
    /// Endpoint receiving JSON notification events.
    pub url: String,
    /// Event types this recipient opted into (empty = all).
    pub types: Vec<NotificationType>,
}

/// Indicator window and threshold settings.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub moving_average_periods: Vec<usize>,
    /// Bars on each side compared when scanning for support/resistance.
    pub level_window: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            moving_average_periods: vec![20, 50, 200],
            level_window: 10,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
        }
    }
}

/// Alert thresholds and labels.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertConfig {
    /// Display name used in notification titles (e.g. "Gold").
    pub instrument_name: String,
    /// Absolute percentage move that triggers a price alert.
    pub price_change_threshold: f64,
    /// Minimum impact for news to take part in dedup.
    pub news_impact_threshold: f64,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    /// Maximum notifications retained in history. Values above 100 are
    /// treated as 100.
    pub history_limit: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            instrument_name: "Gold".to_string(),
            price_change_threshold: 0.5,
            news_impact_threshold: 0.7,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            history_limit: 100,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Seconds between monitoring cycles.
    pub check_interval: u64,
    /// Price alert threshold (percentage).
    pub price_change_threshold: f64,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    /// Local time of day after which the end-of-day report is due.
    pub eod_report_time: NaiveTime,
    pub news_impact_threshold: f64,
    pub moving_average_periods: Vec<usize>,
    /// Market data symbol (Yahoo Finance notation).
    pub symbol: String,
    /// Display name for the instrument.
    pub instrument_name: String,
    /// Yahoo Finance chart range (e.g. "5d").
    pub bar_range: String,
    /// Yahoo Finance bar interval (e.g. "15m").
    pub bar_interval: String,
    /// Optional JSON news feed endpoint.
    pub news_feed_url: Option<String>,
    /// Notification history file (`.db`/`.sqlite` selects SQLite).
    pub history_path: PathBuf,
    /// Webhook recipients.
    pub webhooks: Vec<WebhookConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            check_interval: 900,
            price_change_threshold: 0.5,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            eod_report_time: default_eod_time(),
            news_impact_threshold: 0.7,
            moving_average_periods: vec![20, 50, 200],
            symbol: "GC=F".to_string(),
            instrument_name: "Gold".to_string(),
            bar_range: "5d".to_string(),
            bar_interval: "15m".to_string(),
            news_feed_url: None,
            history_path: PathBuf::from("data/notification_history.json"),
            webhooks: Vec::new(),
        }
    }
}

fn default_eod_time() -> NaiveTime {
    NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default()
}

/// Parse `HH` or `HH:MM` into a time of day.
pub fn parse_eod_time(value: &str) -> Result<NaiveTime, AppError> {
    let mut parts = value.trim().splitn(2, ':');
    let hour: u32 = parts
        .next()
        .and_then(|h| h.trim().parse().ok())
        .ok_or_else(|| AppError::Config(format!("invalid EOD hour in {:?}", value)))?;
    let minute: u32 = match parts.next() {
        Some(m) => m
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("invalid EOD minute in {:?}", value)))?,
        None => 0,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| AppError::Config(format!("EOD time out of range: {:?}", value)))
}

/// Parse a comma separated period list such as `20,50,200`.
pub fn parse_periods(value: &str) -> Result<Vec<usize>, AppError> {
    let periods = value
        .split(',')
        .filter(|p| !p.trim().is_empty())
        .map(|p| {
            p.trim()
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| AppError::Config(format!("invalid moving average period {:?}", p)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if periods.is_empty() {
        return Err(AppError::Config("no moving average periods given".to_string()));
    }
    Ok(periods)
}

/// Parse webhook recipients.
/// Format: "name|url|price,signal,news,eod;name2|url2" (types optional).
pub fn parse_webhooks(value: &str) -> Vec<WebhookConfig> {
    value
        .split(';')
        .filter_map(|entry| {
            let parts: Vec<&str> = entry.split('|').collect();
            if parts.len() < 2 || parts[1].trim().is_empty() {
                return None;
            }
            let types = parts
                .get(2)
                .map(|t| t.split(',').filter_map(NotificationType::from_str).collect())
                .unwrap_or_default();
            Some(WebhookConfig {
                name: parts[0].trim().to_string(),
                url: parts[1].trim().to_string(),
                types,
            })
        })
        .collect()
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(v) => v.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable {}={:?}", key, v);
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let eod_report_time = env::var("EOD_REPORT_TIME")
            .ok()
            .map(|v| {
                parse_eod_time(&v).unwrap_or_else(|e| {
                    warn!("{}; using {}", e, defaults.eod_report_time.format("%H:%M"));
                    defaults.eod_report_time
                })
            })
            .unwrap_or(defaults.eod_report_time);

        let moving_average_periods = env::var("MOVING_AVERAGE_PERIODS")
            .ok()
            .map(|v| {
                parse_periods(&v).unwrap_or_else(|e| {
                    warn!("{}; using defaults", e);
                    defaults.moving_average_periods.clone()
                })
            })
            .unwrap_or_else(|| defaults.moving_average_periods.clone());

        Self {
            check_interval: env_parse("CHECK_INTERVAL", defaults.check_interval),
            price_change_threshold: env_parse(
                "PRICE_CHANGE_THRESHOLD",
                defaults.price_change_threshold,
            ),
            rsi_overbought: env_parse("RSI_OVERBOUGHT", defaults.rsi_overbought),
            rsi_oversold: env_parse("RSI_OVERSOLD", defaults.rsi_oversold),
            eod_report_time,
            news_impact_threshold: env_parse(
                "NEWS_IMPACT_THRESHOLD",
                defaults.news_impact_threshold,
            ),
            moving_average_periods,
            symbol: env::var("SYMBOL").unwrap_or(defaults.symbol),
            instrument_name: env::var("INSTRUMENT_NAME").unwrap_or(defaults.instrument_name),
            bar_range: env::var("BAR_RANGE").unwrap_or(defaults.bar_range),
            bar_interval: env::var("BAR_INTERVAL").unwrap_or(defaults.bar_interval),
            news_feed_url: env::var("NEWS_FEED_URL").ok().filter(|u| !u.is_empty()),
            history_path: env::var("HISTORY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.history_path),
            webhooks: env::var("NOTIFY_WEBHOOKS")
                .map(|v| parse_webhooks(&v))
                .unwrap_or_default(),
        }
    }

    pub fn indicator_config(&self) -> IndicatorConfig {
        IndicatorConfig {
            moving_average_periods: self.moving_average_periods.clone(),
            rsi_overbought: self.rsi_overbought,
            rsi_oversold: self.rsi_oversold,
            ..IndicatorConfig::default()
        }
    }

    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig {
            instrument_name: self.instrument_name.clone(),
            price_change_threshold: self.price_change_threshold,
            news_impact_threshold: self.news_impact_threshold,
            rsi_overbought: self.rsi_overbought,
            rsi_oversold: self.rsi_oversold,
            ..AlertConfig::default()
        }
    }

    /// Whether history should be kept in SQLite rather than a JSON file.
    pub fn uses_sqlite_history(&self) -> bool {
        matches!(
            self.history_path.extension().and_then(|e| e.to_str()),
            Some("db") | Some("sqlite")
        )
    }
}
