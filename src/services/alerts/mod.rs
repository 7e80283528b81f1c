//! Alert state machine.
//!
//! Each observation channel (price, signal, news) starts unseeded. The first
//! observation seeds it and emits nothing; later observations emit an event
//! only when the channel's transition rule holds. State is updated on every
//! call, whether or not an event was emitted.

pub mod format;
mod history;
mod state;

pub use history::{open_history_store, HistoryStore, JsonHistoryStore, SqliteHistoryStore};
pub use state::AlertState;

use crate::config::AlertConfig;
use crate::types::{
    NewsItem, NewsSentiment, NotificationEvent, NotificationType, PriceState, SignalSummary,
    SignalType,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// Owns the alert state and the notification history store.
pub struct AlertStateMachine {
    config: AlertConfig,
    state: AlertState,
    store: Box<dyn HistoryStore>,
}

impl AlertStateMachine {
    /// Create a state machine, loading history from `store`.
    ///
    /// Missing or unreadable history starts empty.
    pub fn new(config: AlertConfig, store: Box<dyn HistoryStore>) -> Self {
        let history = match store.load() {
            Ok(events) => events,
            Err(e) => {
                warn!("Starting with empty notification history: {}", e);
                Vec::new()
            }
        };

        Self {
            state: AlertState::with_history(history, config.history_limit),
            config,
            store,
        }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    pub fn state(&self) -> &AlertState {
        &self.state
    }

    /// Record when the last monitoring cycle ran.
    pub fn mark_checked(&mut self, at: DateTime<Utc>) {
        self.state.last_check_time = Some(at);
    }

    /// Emit a PRICE event when the move since the previous call reaches the
    /// threshold. The baseline always moves to `current_price`.
    pub fn check_price_movement(&mut self, current_price: f64) -> Option<NotificationEvent> {
        if !current_price.is_finite() || current_price <= 0.0 {
            warn!("Ignoring invalid price {}", current_price);
            return None;
        }

        let previous = match self.state.last_price.replace(current_price) {
            Some(previous) => previous,
            None => {
                debug!("Price baseline seeded at {:.2}", current_price);
                return None;
            }
        };

        let change = current_price - previous;
        let percent_change = change / previous * 100.0;

        if percent_change.abs() < self.config.price_change_threshold {
            debug!("Price move {:.3}% below threshold", percent_change);
            return None;
        }

        let instrument = &self.config.instrument_name;
        info!("{} price moved {:.2}% ({:.2} -> {:.2})", instrument, percent_change, previous, current_price);

        Some(
            NotificationEvent::new(
                NotificationType::Price,
                format::price_title(instrument, change),
                format::price_message(instrument, current_price, previous, change, percent_change),
            )
            .with_data("current_price", current_price)
            .with_data("previous_price", previous)
            .with_data("price_change", change)
            .with_data("percent_change", percent_change),
        )
    }

    /// Emit a SIGNAL event when the signal type changes to BUY or SELL.
    pub fn check_technical_signals(&mut self, summary: &SignalSummary) -> Option<NotificationEvent> {
        let current = summary.signal_type;
        let previous = match self.state.last_signal_type.replace(current) {
            Some(previous) => previous,
            None => {
                debug!("Signal baseline seeded at {}", current);
                return None;
            }
        };

        if current == previous || current == SignalType::Neutral {
            return None;
        }

        let instrument = &self.config.instrument_name;
        info!("{} signal changed {} -> {}", instrument, previous, current);

        let mut event = NotificationEvent::new(
            NotificationType::Signal,
            format::signal_title(instrument, current),
            format::signal_details(summary, self.config.rsi_overbought, self.config.rsi_oversold),
        )
        .with_data("signal_type", current.as_str())
        .with_data("previous_signal_type", previous.as_str())
        .with_data("strength", summary.strength)
        .with_data("price", summary.price);

        for (key, value) in [
            ("rsi", summary.rsi),
            ("macd", summary.macd),
            ("macd_signal", summary.macd_signal),
            ("closest_support", summary.closest_support),
            ("closest_resistance", summary.closest_resistance),
        ] {
            if let Some(value) = value {
                event = event.with_data(key, value);
            }
        }

        Some(event)
    }

    /// Emit one NEWS event per high-impact item not present in the previous
    /// call's set. The remembered set is replaced, not merged.
    pub fn check_news(&mut self, items: &[NewsItem]) -> Vec<NotificationEvent> {
        let high_impact: Vec<&NewsItem> = items
            .iter()
            .filter(|item| item.impact >= self.config.news_impact_threshold)
            .collect();
        let current_ids: HashSet<String> = high_impact.iter().map(|item| item.id()).collect();

        let previous_ids = match self.state.last_news_ids.replace(current_ids) {
            Some(ids) => ids,
            None => {
                debug!("News baseline seeded with {} items", high_impact.len());
                return Vec::new();
            }
        };

        let instrument = &self.config.instrument_name;
        let mut emitted = HashSet::new();
        let events: Vec<NotificationEvent> = high_impact
            .into_iter()
            .filter(|item| {
                let id = item.id();
                !previous_ids.contains(&id) && emitted.insert(id)
            })
            .map(|item| {
                NotificationEvent::new(
                    NotificationType::News,
                    format::news_title(instrument, item),
                    format::news_message(item),
                )
                .with_data("title", item.title.as_str())
                .with_data("source", item.source.as_str())
                .with_data("date", item.date.to_rfc3339())
                .with_data("impact", item.impact)
                .with_data("url", item.url.as_str())
            })
            .collect();

        if !events.is_empty() {
            info!("{} new high-impact news items", events.len());
        }
        events
    }

    /// Assemble the end-of-day report. Does not check whether one was
    /// already sent today.
    pub fn generate_eod_report(
        &self,
        date: NaiveDate,
        price: Option<&PriceState>,
        summary: Option<&SignalSummary>,
        sentiment: Option<&NewsSentiment>,
        latest_news: &[NewsItem],
    ) -> NotificationEvent {
        let instrument = &self.config.instrument_name;
        let message = format::eod_message(
            instrument,
            price,
            summary,
            sentiment,
            latest_news,
            self.config.rsi_overbought,
            self.config.rsi_oversold,
        );

        let mut event = NotificationEvent::new(NotificationType::Eod, format::eod_title(instrument), message)
            .with_data("date", date.format("%Y-%m-%d").to_string());

        if let Some(p) = price {
            event = event.with_data("current_price", p.current_price);
            if let Some(change) = p.change {
                event = event.with_data("price_change", change);
            }
            if let Some(pct) = p.percent_change {
                event = event.with_data("percent_change", pct);
            }
        }
        if let Some(s) = summary {
            event = event.with_data("signal", s.signal_type.as_str());
        }
        if let Some(s) = sentiment {
            event = event.with_data("sentiment", s.label.as_str());
        }

        event
    }

    /// Append to history and persist the retained entries.
    ///
    /// A failed write is logged; the in-memory history stays authoritative.
    pub fn add_notification(&mut self, event: NotificationEvent) {
        debug!("Recording {} notification: {}", event.notification_type.as_str(), event.title);
        self.state.push_history(event, self.config.history_limit);

        let retained: Vec<NotificationEvent> = self.state.notification_history.iter().cloned().collect();
        if let Err(e) = self.store.save(&retained) {
            error!("Failed to persist notification history: {}", e);
        }
    }

    /// The most recent `limit` notifications, oldest first.
    pub fn recent_notifications(&self, limit: usize) -> Vec<&NotificationEvent> {
        let history = &self.state.notification_history;
        history.iter().skip(history.len().saturating_sub(limit)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct MemoryStore {
        saved: Arc<Mutex<Vec<NotificationEvent>>>,
    }

    impl HistoryStore for MemoryStore {
        fn load(&self) -> Result<Vec<NotificationEvent>> {
            Ok(self.saved.lock().unwrap().clone())
        }

        fn save(&self, events: &[NotificationEvent]) -> Result<()> {
            *self.saved.lock().unwrap() = events.to_vec();
            Ok(())
        }
    }

    struct CorruptStore;

    impl HistoryStore for CorruptStore {
        fn load(&self) -> Result<Vec<NotificationEvent>> {
            Err(AppError::Persistence("bad json".to_string()))
        }

        fn save(&self, _events: &[NotificationEvent]) -> Result<()> {
            Ok(())
        }
    }

    fn machine() -> AlertStateMachine {
        AlertStateMachine::new(AlertConfig::default(), Box::new(MemoryStore::default()))
    }

    fn summary(signal_type: SignalType) -> SignalSummary {
        SignalSummary {
            timestamp: 0,
            signal_type,
            strength: 0.5,
            price: 1900.0,
            rsi: Some(50.0),
            macd: None,
            macd_signal: None,
            macd_histogram: None,
            moving_averages: BTreeMap::new(),
            closest_support: None,
            closest_resistance: None,
            support_levels: vec![],
            resistance_levels: vec![],
        }
    }

    fn news(title: &str, impact: f64) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            source: "Wire".to_string(),
            date: Utc::now(),
            url: format!("https://news.example.com/{}", title),
            impact,
        }
    }

    #[test]
    fn test_price_event_carries_both_deltas() {
        let mut alerts = machine();
        assert!(alerts.check_price_movement(1900.0).is_none());

        let event = alerts.check_price_movement(1881.0).unwrap();
        assert_eq!(event.notification_type, NotificationType::Price);
        assert_eq!(event.title, "Gold Price Down");
        assert_eq!(event.data_f64("previous_price"), Some(1900.0));
        assert!((event.data_f64("price_change").unwrap() + 19.0).abs() < 1e-9);
        assert!((event.data_f64("percent_change").unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_price_leaves_baseline() {
        let mut alerts = machine();
        alerts.check_price_movement(1900.0);
        assert!(alerts.check_price_movement(f64::NAN).is_none());
        assert!(alerts.check_price_movement(0.0).is_none());
        assert_eq!(alerts.state().last_price, Some(1900.0));
    }

    #[test]
    fn test_signal_event_on_change_to_directional() {
        let mut alerts = machine();
        assert!(alerts.check_technical_signals(&summary(SignalType::Neutral)).is_none());
        let event = alerts.check_technical_signals(&summary(SignalType::Buy)).unwrap();
        assert_eq!(event.title, "Gold Trading Signal: BUY");
        assert_eq!(event.data["previous_signal_type"], "NEUTRAL");
        assert_eq!(event.data_f64("rsi"), Some(50.0));
        assert!(!event.data.contains_key("macd"));
    }

    #[test]
    fn test_news_below_threshold_is_ignored() {
        let mut alerts = machine();
        alerts.check_news(&[]);
        let events = alerts.check_news(&[news("minor", 0.5), news("major", 0.8)]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data["title"], "major");
        assert_eq!(events[0].title, "Gold News: major");
    }

    #[test]
    fn test_news_duplicate_ids_in_batch_emit_once() {
        let mut alerts = machine();
        alerts.check_news(&[]);
        let events = alerts.check_news(&[news("fed", 0.9), news("fed", 0.9)]);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_eod_report_data_fields() {
        let alerts = machine();
        let price = PriceState {
            current_price: 1920.0,
            change: Some(20.0),
            percent_change: Some(1.05),
        };
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let event = alerts.generate_eod_report(date, Some(&price), Some(&summary(SignalType::Sell)), None, &[]);

        assert_eq!(event.notification_type, NotificationType::Eod);
        assert_eq!(event.title, "Gold Trading: End-of-Day Report");
        assert_eq!(event.data["date"], "2024-03-01");
        assert_eq!(event.data["signal"], "SELL");
        assert_eq!(event.data_f64("price_change"), Some(20.0));
        assert!(!event.data.contains_key("sentiment"));
        assert!(alerts.state().notification_history.is_empty());
    }

    #[test]
    fn test_add_notification_persists_retained_history() {
        let store = MemoryStore::default();
        let config = AlertConfig {
            history_limit: 3,
            ..AlertConfig::default()
        };
        let mut alerts = AlertStateMachine::new(config, Box::new(store.clone()));

        for i in 0..5 {
            alerts.add_notification(NotificationEvent::new(NotificationType::Price, format!("n{}", i), ""));
        }

        let saved = store.saved.lock().unwrap();
        assert_eq!(saved.len(), 3);
        assert_eq!(saved[0].title, "n2");

        let recent = alerts.recent_notifications(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].title, "n4");
    }

    #[test]
    fn test_history_reloaded_from_store() {
        let store = MemoryStore::default();
        {
            let mut alerts = AlertStateMachine::new(AlertConfig::default(), Box::new(store.clone()));
            alerts.add_notification(NotificationEvent::new(NotificationType::News, "kept", ""));
        }
        let alerts = AlertStateMachine::new(AlertConfig::default(), Box::new(store));
        assert_eq!(alerts.recent_notifications(10)[0].title, "kept");
        assert!(alerts.state().last_price.is_none());
    }

    #[test]
    fn test_corrupt_history_starts_empty() {
        let alerts = AlertStateMachine::new(AlertConfig::default(), Box::new(CorruptStore));
        assert!(alerts.state().notification_history.is_empty());
    }
}
