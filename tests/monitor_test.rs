//! Integration tests for the report scheduler and full monitoring cycles

use aurum::config::Config;
use aurum::services::{JsonHistoryStore, KeywordScorer, Monitor, ReportScheduler};
use aurum::types::{BarSeries, NewsItem, NotificationType, OhlcBar};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn series(closes: &[f64]) -> BarSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcBar {
            timestamp: 1_714_550_400_000 + i as i64 * 900_000,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 500.0,
        })
        .collect();
    BarSeries::new(bars).unwrap()
}

// =============================================================================
// Report scheduler
// =============================================================================

#[test]
fn test_scheduler_fires_once_per_day_under_frequent_polling() {
    let mut scheduler = ReportScheduler::new(NaiveTime::from_hms_opt(16, 0, 0).unwrap());

    let mut fired = Vec::new();
    let mut now = at(1, 15, 0);
    while now < at(2, 0, 0) {
        if scheduler.poll(now) {
            fired.push(now);
        }
        now += Duration::minutes(5);
    }

    assert_eq!(fired, vec![at(1, 16, 0)]);
}

#[test]
fn test_scheduler_fires_late_on_first_poll_after_trigger() {
    let mut scheduler = ReportScheduler::new(NaiveTime::from_hms_opt(16, 30, 0).unwrap());

    assert!(!scheduler.poll(at(1, 16, 29)));
    assert!(scheduler.poll(at(1, 18, 37)));
    assert!(!scheduler.poll(at(1, 23, 59)));

    // A skipped day does not fire retroactively in the morning.
    assert!(!scheduler.poll(at(3, 8, 0)));
    assert!(scheduler.poll(at(3, 21, 0)));
}

// =============================================================================
// Monitor cycles
// =============================================================================

#[test]
fn test_cycles_emit_price_news_and_single_eod() {
    let dir = tempfile::tempdir().unwrap();
    let history_path = dir.path().join("history.json");
    let config = Config {
        history_path: history_path.clone(),
        ..Config::default()
    };
    let mut monitor = Monitor::new(
        &config,
        Box::new(JsonHistoryStore::new(&history_path)),
        Box::new(KeywordScorer::default()),
    );

    let headline = |title: &str| NewsItem {
        title: title.to_string(),
        source: "Kitco".to_string(),
        date: Utc::now(),
        url: "https://news.example.com/gold".to_string(),
        impact: 0.0,
    };
    let day = |hour: u32| Local.with_ymd_and_hms(2024, 5, 2, hour, 0, 0).unwrap();

    // Seed every channel.
    let first = monitor.run_cycle(&series(&[1900.0, 1900.0]), Some(&[]), day(10));
    assert!(first.is_empty());

    // 1% move plus one high-impact headline.
    let news = [
        headline("Gold price spikes as Fed signals interest rate cut"),
        headline("Markets quiet ahead of holiday"),
    ];
    let second = monitor.run_cycle(&series(&[1900.0, 1919.0]), Some(&news), day(11));
    let kinds: Vec<_> = second.iter().map(|e| e.notification_type).collect();
    assert_eq!(kinds, vec![NotificationType::Price, NotificationType::News]);

    // After the trigger time: the report is last, and only once.
    let third = monitor.run_cycle(&series(&[1900.0, 1919.0]), Some(&news), day(16));
    assert_eq!(third.len(), 1);
    assert_eq!(third[0].notification_type, NotificationType::Eod);
    assert_eq!(third[0].data["date"], "2024-05-02");
    assert!(third[0].message.contains("Gold price spikes"));

    let fourth = monitor.run_cycle(&series(&[1900.0, 1919.0]), None, day(17));
    assert!(fourth.is_empty());

    assert_eq!(monitor.alerts().recent_notifications(100).len(), 3);
    let saved = std::fs::read_to_string(&history_path).unwrap();
    assert!(saved.contains("End-of-Day Report"));
}

#[test]
fn test_cycle_with_full_history_reports_signal_in_eod() {
    let config = Config::default();
    let dir = tempfile::tempdir().unwrap();
    let mut monitor = Monitor::new(
        &config,
        Box::new(JsonHistoryStore::new(dir.path().join("h.json"))),
        Box::new(KeywordScorer::default()),
    );

    let closes: Vec<f64> = (0..220).map(|i| 1800.0 * 1.003f64.powi(i)).collect();
    let evening = Local.with_ymd_and_hms(2024, 5, 2, 16, 15, 0).unwrap();
    let events = monitor.run_cycle(&series(&closes), None, evening);

    let eod = events.last().unwrap();
    assert_eq!(eod.notification_type, NotificationType::Eod);
    assert_eq!(eod.data["signal"], "BUY");
    assert!(eod.message.contains("Outlook: Bullish"));
    assert_eq!(monitor.alerts().state().last_signal_type.map(|s| s.as_str()), Some("BUY"));
}
