//! One monitoring cycle: indicators, signal, alerts and the daily report.

use super::alerts::{format, AlertStateMachine, HistoryStore};
use super::news::NewsScorer;
use super::scheduler::ReportScheduler;
use super::signals::{IndicatorEngine, SignalAggregator};
use crate::config::Config;
use crate::types::{BarSeries, NewsItem, NotificationEvent, PriceState, SignalSummary};
use chrono::{DateTime, Local, Utc};
use std::fmt::Write;
use tracing::{debug, info};

/// Headlines shown by the news lookup and carried into the daily report.
const LATEST_NEWS_LIMIT: usize = 5;

/// Drives the indicator engine, aggregator, alert state machine and report
/// scheduler for one instrument.
pub struct Monitor {
    engine: IndicatorEngine,
    aggregator: SignalAggregator,
    alerts: AlertStateMachine,
    scheduler: ReportScheduler,
    scorer: Box<dyn NewsScorer>,
    /// Most recent successfully fetched news, already scored.
    latest_news: Vec<NewsItem>,
}

impl Monitor {
    pub fn new(config: &Config, store: Box<dyn HistoryStore>, scorer: Box<dyn NewsScorer>) -> Self {
        let indicator_config = config.indicator_config();
        Self {
            engine: IndicatorEngine::new(&indicator_config),
            aggregator: SignalAggregator::new(&indicator_config),
            alerts: AlertStateMachine::new(config.alert_config(), store),
            scheduler: ReportScheduler::new(config.eod_report_time),
            scorer,
            latest_news: Vec::new(),
        }
    }

    pub fn alerts(&self) -> &AlertStateMachine {
        &self.alerts
    }

    pub fn scheduler(&self) -> &ReportScheduler {
        &self.scheduler
    }

    /// Run one cycle over freshly fetched data.
    ///
    /// `news` is `None` when the news fetch failed; the news check is then
    /// skipped and its state left untouched. Returns the events recorded in
    /// history this cycle: price, signal, news, then the daily report.
    pub fn run_cycle(
        &mut self,
        series: &BarSeries,
        news: Option<&[NewsItem]>,
        now: DateTime<Local>,
    ) -> Vec<NotificationEvent> {
        self.alerts.mark_checked(now.with_timezone(&Utc));
        let mut events = Vec::new();

        if let Some(price) = series.current_price() {
            events.extend(self.alerts.check_price_movement(price));
        }

        let summary = self.summary(series);
        if let Some(summary) = &summary {
            events.extend(self.alerts.check_technical_signals(summary));
        }

        if let Some(items) = news {
            let scored = newest_first(self.scorer.score_items(items));
            events.extend(self.alerts.check_news(&scored));
            self.latest_news = scored;
        } else {
            debug!("News unavailable this cycle");
        }

        if self.scheduler.poll(now.naive_local()) {
            events.push(self.eod_report(series, summary.as_ref(), now));
        }

        for event in &events {
            self.alerts.add_notification(event.clone());
        }

        info!("Cycle complete: {} notifications", events.len());
        events
    }

    fn summary(&self, series: &BarSeries) -> Option<SignalSummary> {
        let indicators = self.engine.compute(series);
        self.aggregator.signal_summary(series, &indicators)
    }

    fn eod_report(
        &self,
        series: &BarSeries,
        summary: Option<&SignalSummary>,
        now: DateTime<Local>,
    ) -> NotificationEvent {
        let price = PriceState::from_series(series);
        let sentiment = self.scorer.sentiment(&self.latest_news);
        let headlines = &self.latest_news[..self.latest_news.len().min(LATEST_NEWS_LIMIT)];
        self.alerts.generate_eod_report(
            now.date_naive(),
            price.as_ref(),
            summary,
            sentiment.as_ref(),
            headlines,
        )
    }

    fn instrument(&self) -> &str {
        &self.alerts.config().instrument_name
    }

    /// Current price, change and low/high range across the loaded bars.
    pub fn price_text(&self, series: Option<&BarSeries>) -> String {
        let (series, state) = match series.and_then(|s| PriceState::from_series(s).map(|state| (s, state))) {
            Some(found) => found,
            None => return format!("Unable to fetch {} price data. Please try again later.", self.instrument()),
        };

        let mut out = format!("Current {} price: ${:.2}", self.instrument(), state.current_price);
        if let (Some(change), Some(pct)) = (state.change, state.percent_change) {
            let _ = write!(out, "\nChange: {:+.2} ({:+.2}%)", change, pct);
        }
        if let Some((low, high)) = series.price_range() {
            let _ = write!(out, "\nRange: ${:.2} - ${:.2}", low, high);
        }
        out
    }

    /// Latest technical signal breakdown.
    pub fn signal_text(&self, series: Option<&BarSeries>) -> String {
        let config = self.alerts.config();
        match series.and_then(|s| self.summary(s)) {
            Some(summary) => format!(
                "{}\n{}",
                format::signal_title(self.instrument(), summary.signal_type),
                format::signal_details(&summary, config.rsi_overbought, config.rsi_oversold)
            ),
            None => format!(
                "Unable to generate {} trading signals. Please try again later.",
                self.instrument()
            ),
        }
    }

    /// Latest headlines with their impact scores and the overall sentiment.
    pub fn news_text(&self, news: Option<&[NewsItem]>) -> String {
        let items = match news {
            Some(items) if !items.is_empty() => newest_first(self.scorer.score_items(items)),
            _ => return format!("Unable to fetch {} news. Please try again later.", self.instrument()),
        };

        let mut out = format!("Latest {} news:", self.instrument());
        for item in items.iter().take(LATEST_NEWS_LIMIT) {
            let _ = write!(
                out,
                "\n- {} ({}, {}) impact {:.2}\n  {}",
                item.title,
                item.source,
                item.date.format("%Y-%m-%d"),
                item.impact,
                item.url
            );
        }
        if let Some(sentiment) = self.scorer.sentiment(&items) {
            let _ = write!(
                out,
                "\n\nOverall Sentiment: {} (Score: {:.2})",
                sentiment.label, sentiment.score
            );
        }
        out
    }

    /// An end-of-day style report for right now. Does not claim the daily
    /// report slot or touch history.
    pub fn report_text(&self, series: Option<&BarSeries>, news: Option<&[NewsItem]>, now: DateTime<Local>) -> String {
        let series = match series.filter(|s| !s.is_empty()) {
            Some(series) => series,
            None => return format!("Unable to generate {} report. Please try again later.", self.instrument()),
        };

        let news = news.map(|items| newest_first(self.scorer.score_items(items))).unwrap_or_default();
        let summary = self.summary(series);
        let sentiment = self.scorer.sentiment(&news);
        let headlines = &news[..news.len().min(LATEST_NEWS_LIMIT)];

        let event = self.alerts.generate_eod_report(
            now.date_naive(),
            PriceState::from_series(series).as_ref(),
            summary.as_ref(),
            sentiment.as_ref(),
            headlines,
        );
        format!("{}\n\n{}", event.title, event.message)
    }
}

fn newest_first(mut items: Vec<NewsItem>) -> Vec<NewsItem> {
    items.sort_by(|a, b| b.date.cmp(&a.date));
    items
}
