use aurum::config::Config;
use aurum::delivery::Dispatcher;
use aurum::services::{open_history_store, HistoryStore, JsonHistoryStore, KeywordScorer, Monitor};
use aurum::sources::{NewsFeedClient, YahooFinanceClient};
use aurum::types::{BarSeries, NewsItem};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "aurum")]
#[command(about = "Technical signal and alert monitor")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll market data and emit alerts until interrupted (default)
    Watch,
    /// Print the current price
    Price,
    /// Print the latest technical signal
    Signal,
    /// Print the latest headlines
    News,
    /// Print an end-of-day style report for now
    Report,
    /// Print recent notifications from history
    History {
        /// Number of notifications to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aurum=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => watch(config).await,
        Command::History { limit } => {
            let monitor = build_monitor(&config);
            for event in monitor.alerts().recent_notifications(limit) {
                println!(
                    "{} [{}] {}",
                    event.timestamp.format("%Y-%m-%d %H:%M"),
                    event.notification_type.as_str(),
                    event.title
                );
            }
            Ok(())
        }
        Command::Price => {
            let (sources, monitor) = lookup_context(&config)?;
            println!("{}", monitor.price_text(sources.bars(&config).await.as_ref()));
            Ok(())
        }
        Command::Signal => {
            let (sources, monitor) = lookup_context(&config)?;
            println!("{}", monitor.signal_text(sources.bars(&config).await.as_ref()));
            Ok(())
        }
        Command::News => {
            let (sources, monitor) = lookup_context(&config)?;
            println!("{}", monitor.news_text(sources.news().await.as_deref()));
            Ok(())
        }
        Command::Report => {
            let (sources, monitor) = lookup_context(&config)?;
            let series = sources.bars(&config).await;
            let news = sources.news().await;
            println!(
                "{}",
                monitor.report_text(series.as_ref(), news.as_deref(), Local::now())
            );
            Ok(())
        }
    }
}

fn lookup_context(config: &Config) -> anyhow::Result<(Sources, Monitor)> {
    Ok((Sources::new(config)?, build_monitor(config)))
}

/// Upstream market data and news clients.
struct Sources {
    yahoo: YahooFinanceClient,
    news: Option<NewsFeedClient>,
}

impl Sources {
    fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            yahoo: YahooFinanceClient::new()?,
            news: config
                .news_feed_url
                .as_deref()
                .map(NewsFeedClient::new)
                .transpose()?,
        })
    }

    async fn bars(&self, config: &Config) -> Option<BarSeries> {
        match self
            .yahoo
            .fetch_bars(&config.symbol, &config.bar_range, &config.bar_interval)
            .await
        {
            Ok(series) => Some(series),
            Err(e) => {
                warn!("Failed to fetch {} bars: {}", config.symbol, e);
                None
            }
        }
    }

    async fn news(&self) -> Option<Vec<NewsItem>> {
        let client = self.news.as_ref()?;
        match client.fetch().await {
            Ok(items) => Some(items),
            Err(e) => {
                warn!("Failed to fetch news: {}", e);
                None
            }
        }
    }
}

fn build_monitor(config: &Config) -> Monitor {
    let store: Box<dyn HistoryStore> =
        match open_history_store(&config.history_path, config.uses_sqlite_history()) {
            Ok(store) => store,
            Err(e) => {
                let fallback = config.history_path.with_extension("json");
                warn!("History store unavailable ({}); using {:?}", e, fallback);
                Box::new(JsonHistoryStore::new(fallback))
            }
        };

    Monitor::new(config, store, Box::new(KeywordScorer::default()))
}

async fn watch(config: Config) -> anyhow::Result<()> {
    let sources = Sources::new(&config)?;
    let dispatcher = Dispatcher::from_webhooks(&config.webhooks)?;
    let mut monitor = build_monitor(&config);

    info!(
        "Monitoring {} ({}) every {}s, EOD report at {}",
        config.instrument_name,
        config.symbol,
        config.check_interval,
        config.eod_report_time.format("%H:%M")
    );
    info!("{} webhook subscribers", dispatcher.subscribers().len());

    let mut ticker = interval(Duration::from_secs(config.check_interval.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                return Ok(());
            }
        }

        let series = match sources.bars(&config).await {
            Some(series) => series,
            None => {
                warn!("Skipping cycle");
                continue;
            }
        };
        let news = sources.news().await;

        let events = monitor.run_cycle(&series, news.as_deref(), Local::now());
        if !events.is_empty() {
            let delivered = dispatcher.dispatch(&events).await;
            info!("Delivered {} of {} notifications", delivered, events.len());
        }
    }
}
