//! Notification event types emitted by the alert state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Notification type categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Price,
    Signal,
    News,
    Eod,
}

impl NotificationType {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationType::Price => "price",
            NotificationType::Signal => "signal",
            NotificationType::News => "news",
            NotificationType::Eod => "eod",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "price" => Some(NotificationType::Price),
            "signal" => Some(NotificationType::Signal),
            "news" => Some(NotificationType::News),
            "eod" => Some(NotificationType::Eod),
            _ => None,
        }
    }
}

/// A notification produced by one alert check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Unique notification ID
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub timestamp: DateTime<Utc>,
    /// Short title
    pub title: String,
    /// Human-readable body
    pub message: String,
    /// Named fields describing the observation
    #[serde(default)]
    pub data: BTreeMap<String, Value>,
}

impl NotificationEvent {
    pub fn new(
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            notification_type,
            timestamp: Utc::now(),
            title: title.into(),
            message: message.into(),
            data: BTreeMap::new(),
        }
    }

    /// Attach a named data field.
    pub fn with_data(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    /// Read a numeric data field.
    pub fn data_f64(&self, key: &str) -> Option<f64> {
        self.data.get(key).and_then(Value::as_f64)
    }
}
