pub mod news_feed;
pub mod yahoo;

pub use news_feed::NewsFeedClient;
pub use yahoo::YahooFinanceClient;
