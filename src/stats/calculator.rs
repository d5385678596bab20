//! Statistics Calculator Module
//! Descriptive statistics of party support across poll records.

use crate::data::{Party, PollRecord};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Support statistics for a single party.
#[derive(Debug, Clone, Serialize)]
pub struct PartySummary {
    pub party: Party,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub p05: f64,
    pub p95: f64,
    pub min: f64,
    pub max: f64,
    /// Support in the most recently published poll, with its date.
    pub latest: Option<(NaiveDate, f64)>,
}

impl PartySummary {
    fn empty(party: Party) -> Self {
        Self {
            party,
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            p05: f64::NAN,
            p95: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            latest: None,
        }
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for one party's support values.
    pub fn summarize(party: Party, records: &[&PollRecord]) -> PartySummary {
        let n = records.len();
        if n == 0 {
            return PartySummary::empty(party);
        }

        let values: Vec<f64> = records.iter().map(|r| r.support).collect();
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };
        let std = if n > 1 { values.iter().std_dev() } else { 0.0 };

        let latest = records
            .iter()
            .max_by_key(|r| r.publdate)
            .map(|r| (r.publdate, r.support));

        PartySummary {
            party,
            count: n,
            mean: values.iter().mean(),
            median,
            std,
            p05: Self::percentile(&sorted, 5.0),
            p95: Self::percentile(&sorted, 95.0),
            min: sorted[0],
            max: sorted[n - 1],
            latest,
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Summaries for every party present in `records`, in party order.
    pub fn party_summaries(records: &[PollRecord]) -> Vec<PartySummary> {
        let mut by_party: BTreeMap<Party, Vec<&PollRecord>> = BTreeMap::new();
        for record in records {
            by_party.entry(record.party).or_default().push(record);
        }

        let groups: Vec<(Party, Vec<&PollRecord>)> = by_party.into_iter().collect();
        let mut summaries: Vec<PartySummary> = groups
            .par_iter()
            .map(|(party, rows)| Self::summarize(*party, rows))
            .collect();
        summaries.sort_by_key(|s| s.party);
        summaries
    }
}
