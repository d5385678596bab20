//! Stats module - poll support statistics

mod calculator;

pub use calculator::{PartySummary, StatsCalculator};
