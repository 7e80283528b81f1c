//! Notification delivery.
//!
//! Every event is logged. Subscribers configured with a webhook URL also get
//! the event POSTed as JSON, filtered by their delivery preferences.

use crate::config::WebhookConfig;
use crate::error::Result;
use crate::types::{NotificationEvent, NotificationType};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Which event types a subscriber receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPreferences {
    pub price_alerts: bool,
    pub signal_alerts: bool,
    pub news_alerts: bool,
    pub eod_reports: bool,
}

impl Default for DeliveryPreferences {
    fn default() -> Self {
        Self {
            price_alerts: true,
            signal_alerts: true,
            news_alerts: true,
            eod_reports: true,
        }
    }
}

impl DeliveryPreferences {
    /// Opt in to exactly `types`; an empty list means everything.
    pub fn from_types(types: &[NotificationType]) -> Self {
        if types.is_empty() {
            return Self::default();
        }
        Self {
            price_alerts: types.contains(&NotificationType::Price),
            signal_alerts: types.contains(&NotificationType::Signal),
            news_alerts: types.contains(&NotificationType::News),
            eod_reports: types.contains(&NotificationType::Eod),
        }
    }

    pub fn accepts(&self, notification_type: NotificationType) -> bool {
        match notification_type {
            NotificationType::Price => self.price_alerts,
            NotificationType::Signal => self.signal_alerts,
            NotificationType::News => self.news_alerts,
            NotificationType::Eod => self.eod_reports,
        }
    }
}

/// A webhook recipient.
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub name: String,
    pub url: String,
    pub preferences: DeliveryPreferences,
}

impl From<&WebhookConfig> for Subscriber {
    fn from(config: &WebhookConfig) -> Self {
        Self {
            name: config.name.clone(),
            url: config.url.clone(),
            preferences: DeliveryPreferences::from_types(&config.types),
        }
    }
}

/// Sends notification events to subscribers.
pub struct Dispatcher {
    client: Client,
    subscribers: Vec<Subscriber>,
}

impl Dispatcher {
    pub fn new(subscribers: Vec<Subscriber>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client, subscribers })
    }

    pub fn from_webhooks(webhooks: &[WebhookConfig]) -> Result<Self> {
        Self::new(webhooks.iter().map(Subscriber::from).collect())
    }

    pub fn subscribers(&self) -> &[Subscriber] {
        &self.subscribers
    }

    /// Subscribers whose preferences accept this event.
    pub fn recipients<'a>(&'a self, event: &'a NotificationEvent) -> impl Iterator<Item = &'a Subscriber> + 'a {
        self.subscribers
            .iter()
            .filter(move |s| s.preferences.accepts(event.notification_type))
    }

    /// Log and deliver events. Returns the number of successful deliveries.
    pub async fn dispatch(&self, events: &[NotificationEvent]) -> usize {
        let mut delivered = 0;

        for event in events {
            info!("[{}] {}", event.notification_type.as_str(), event.title);
            debug!("{}", event.message);

            for subscriber in self.recipients(event) {
                match self.post(subscriber, event).await {
                    Ok(()) => delivered += 1,
                    Err(e) => warn!("Delivery to {} failed: {}", subscriber.name, e),
                }
            }
        }

        delivered
    }

    async fn post(&self, subscriber: &Subscriber, event: &NotificationEvent) -> Result<()> {
        self.client
            .post(&subscriber.url)
            .json(event)
            .send()
            .await?
            .error_for_status()?;
        debug!("Delivered {} to {}", event.id, subscriber.name);
        Ok(())
    }
}
