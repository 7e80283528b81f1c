use crate::types::{NotificationEvent, SignalType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Hard cap on retained notifications, whatever the configured limit.
pub const MAX_HISTORY: usize = 100;

/// Everything the alert state machine remembers between checks.
///
/// A `None` baseline means that channel has not been seeded yet; the first
/// observation seeds it without emitting anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    pub last_price: Option<f64>,
    pub last_signal_type: Option<SignalType>,
    pub last_news_ids: Option<HashSet<String>>,
    pub last_check_time: Option<DateTime<Utc>>,
    /// Oldest first, bounded by the configured history limit and `MAX_HISTORY`.
    pub notification_history: VecDeque<NotificationEvent>,
}

impl AlertState {
    /// Fresh state carrying previously persisted history.
    pub fn with_history(history: Vec<NotificationEvent>, limit: usize) -> Self {
        let mut state = Self::default();
        for event in history {
            state.push_history(event, limit);
        }
        state
    }

    /// Append an event, discarding the oldest entries beyond `limit`
    /// (never more than `MAX_HISTORY`).
    pub fn push_history(&mut self, event: NotificationEvent, limit: usize) {
        let limit = limit.min(MAX_HISTORY);
        self.notification_history.push_back(event);
        while self.notification_history.len() > limit {
            self.notification_history.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NotificationType;

    #[test]
    fn test_with_history_keeps_newest() {
        let events: Vec<_> = (0..5)
            .map(|i| NotificationEvent::new(NotificationType::Price, format!("e{}", i), ""))
            .collect();
        let state = AlertState::with_history(events, 3);
        let titles: Vec<_> = state
            .notification_history
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, vec!["e2", "e3", "e4"]);
        assert!(state.last_price.is_none());
        assert!(state.last_news_ids.is_none());
    }

    #[test]
    fn test_history_limit_is_capped() {
        let mut state = AlertState::default();
        for i in 0..150 {
            state.push_history(
                NotificationEvent::new(NotificationType::News, format!("e{}", i), ""),
                500,
            );
        }
        assert_eq!(state.notification_history.len(), MAX_HISTORY);
        assert_eq!(state.notification_history[0].title, "e50");
    }
}
