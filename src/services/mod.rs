pub mod alerts;
pub mod monitor;
pub mod news;
pub mod scheduler;
pub mod signals;

pub use alerts::{open_history_store, AlertState, AlertStateMachine, HistoryStore, JsonHistoryStore, SqliteHistoryStore};
pub use monitor::Monitor;
pub use news::{KeywordScorer, NewsScorer};
pub use scheduler::ReportScheduler;
pub use signals::{IndicatorEngine, IndicatorSet, SignalAggregator};
