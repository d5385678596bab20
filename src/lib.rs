//! svpol insights - hashtag trends, party polls and party likeness
//!
//! Data layer behind the #svpol dashboard: time-windowed access to daily
//! hashtag mention counts and party polls, the trending-hashtag ranking,
//! poll statistics, likeness inference and PNG chart export.

pub mod charts;
pub mod clock;
pub mod config;
pub mod data;
pub mod error;
pub mod ml;
pub mod stats;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use data::{
    DashboardStore, DataLoader, Dataset, HashtagMention, Party, PollRecord, ReadSource, Snapshot,
    TrendingEntry,
};
pub use error::{DataError, DataResult, ModelError};
