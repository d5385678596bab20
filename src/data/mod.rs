//! Data module - dataset sources, loading and aggregation

mod loader;
mod model;
mod processor;
mod source;

pub use loader::{
    DataLoader, DEFAULT_POLL_YEAR_END, DEFAULT_POLL_YEAR_START, DEFAULT_TOP_N,
    DEFAULT_WINDOW_DAYS,
};
pub use model::{HashtagMention, Party, PollRecord, TrendingEntry, UnknownParty};
pub use processor::{format_date, parse_date, DataProcessor};
pub use source::{DashboardStore, Dataset, ReadSource, Snapshot};
