pub mod calendar;
pub mod dedup;
pub mod normalize;
pub mod rules;
pub mod sentiment;
pub mod source;
pub mod state;
pub mod types;
pub mod watchlist;

pub use calendar::MarketCalendar;
pub use dedup::{DedupStore, DedupValue, RealertPolicy};
pub use source::MarketDataSource;
pub use state::AlertState;
pub use types::{AlertEvent, HistoryBar, MoverRecord, OptionContract, RuleKind};
pub use watchlist::{WatchReason, Watchlist, WatchlistEntry};
