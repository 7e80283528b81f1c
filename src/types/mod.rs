pub mod chart;
pub mod news;
pub mod notification;
pub mod signals;

pub use chart::*;
pub use news::*;
pub use notification::*;
pub use signals::*;
