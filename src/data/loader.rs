//! Hashtag and poll data loader.
//! Time-windowed access to both datasets and the trending-hashtag ranking.

use crate::clock::{Clock, SystemClock};
use crate::data::model::{HashtagMention, Party, PollRecord, TrendingEntry};
use crate::data::processor::{parse_date, DataProcessor};
use crate::data::source::{Dataset, ReadSource};
use crate::error::{DataError, DataResult};
use chrono::{Days, NaiveDate};
use polars::prelude::*;
use tracing::debug;

pub const DEFAULT_WINDOW_DAYS: u32 = 365;
pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_POLL_YEAR_START: i32 = 2000;
pub const DEFAULT_POLL_YEAR_END: i32 = 2022;

/// Read-only access to the hashtag and poll datasets.
///
/// Every call fetches the dataset from the source and filters in memory, so
/// identical calls against an unchanged source return identical rows.
pub struct DataLoader {
    source: Box<dyn ReadSource>,
    clock: Box<dyn Clock>,
}

impl DataLoader {
    pub fn new(source: impl ReadSource + 'static) -> Self {
        Self::with_clock(source, SystemClock)
    }

    pub fn with_clock(source: impl ReadSource + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            source: Box::new(source),
            clock: Box::new(clock),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn frame(&self, dataset: Dataset) -> DataResult<DataFrame> {
        let raw = self.source.fetch(dataset)?;
        let df = DataProcessor::conform(&raw, dataset)?;
        debug!(%dataset, rows = df.height(), "fetched dataset");
        Ok(df)
    }

    fn hashtag_frame(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        filter: Option<&str>,
    ) -> DataResult<DataFrame> {
        let df = self.frame(Dataset::Hashtags)?;
        let df = DataProcessor::filter_date_range(&df, "date", start, end)?;
        match filter {
            Some(tag) => DataProcessor::filter_by_value(&df, "hashtag", tag),
            None => Ok(df),
        }
    }

    /// Mentions dated within `[start, end]`, optionally for one exact hashtag.
    pub fn load_hashtags(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        filter: Option<&str>,
    ) -> DataResult<Vec<HashtagMention>> {
        if start > end {
            return Ok(Vec::new());
        }
        let df = self.hashtag_frame(start, end, filter)?;
        mentions_from_frame(&df)
    }

    /// Hashtags ranked by total mentions over the last `window_days` days.
    pub fn trending_entries(
        &self,
        window_days: u32,
        top_n: usize,
    ) -> DataResult<Vec<TrendingEntry>> {
        let today = self.today();
        let start = today
            .checked_sub_days(Days::new(u64::from(window_days)))
            .unwrap_or(NaiveDate::MIN);

        let df = self.hashtag_frame(start, today, None)?;
        let mut ranked = DataProcessor::rank_by_total(&df, Dataset::Hashtags, "hashtag", "count")?;
        ranked.truncate(top_n);

        debug!(%start, %today, returned = ranked.len(), "ranked trending hashtags");
        Ok(ranked)
    }

    /// Names of the `top_n` most mentioned hashtags in the trailing window.
    pub fn trending_hashtags(&self, window_days: u32, top_n: usize) -> DataResult<Vec<String>> {
        Ok(self
            .trending_entries(window_days, top_n)?
            .into_iter()
            .map(|e| e.hashtag)
            .collect())
    }

    /// Poll rows published between Jan 1 of `year_start` and Dec 31 of `year_end`.
    pub fn load_party_poll_numbers(
        &self,
        year_start: i32,
        year_end: i32,
    ) -> DataResult<Vec<PollRecord>> {
        let df = self.poll_frame(year_start, year_end)?;
        polls_from_frame(&df)
    }

    fn poll_frame(&self, year_start: i32, year_end: i32) -> DataResult<DataFrame> {
        let (start, end) = year_bounds(year_start, year_end)?;
        let df = self.frame(Dataset::Polls)?;
        DataProcessor::filter_date_range(&df, "publdate", start, end)
    }

    /// Every mention of one hashtag, oldest first.
    pub fn hashtag_timeseries(&self, hashtag: &str) -> DataResult<Vec<HashtagMention>> {
        let df = self.frame(Dataset::Hashtags)?;
        let df = DataProcessor::filter_by_value(&df, "hashtag", hashtag)?;
        let df = DataProcessor::sort_by_columns(&df, &["date"])?;
        mentions_from_frame(&df)
    }

    /// Distinct hashtags in the order they first appear in the dataset.
    pub fn hashtag_names(&self, limit: Option<usize>) -> DataResult<Vec<String>> {
        let df = self.frame(Dataset::Hashtags)?;
        let mut names = DataProcessor::unique_values(&df, "hashtag")?;
        if let Some(limit) = limit {
            names.truncate(limit);
        }
        Ok(names)
    }

    /// Polling institutes present in the poll dataset, sorted.
    pub fn poll_companies(&self) -> DataResult<Vec<String>> {
        let df = self.frame(Dataset::Polls)?;
        let mut companies = DataProcessor::unique_values(&df, "company")?;
        companies.sort();
        Ok(companies)
    }

    /// Publication dates of one company's polls, oldest first.
    pub fn poll_publication_dates(&self, company: &str) -> DataResult<Vec<NaiveDate>> {
        let df = self.frame(Dataset::Polls)?;
        let df = DataProcessor::filter_by_value(&df, "company", company)?;
        let mut dates: Vec<NaiveDate> = DataProcessor::unique_values(&df, "publdate")?
            .iter()
            .map(|d| {
                parse_date(d).ok_or_else(|| {
                    DataError::malformed(Dataset::Polls, format!("invalid publdate {d:?}"))
                })
            })
            .collect::<DataResult<_>>()?;
        dates.sort();
        Ok(dates)
    }

    /// One company's poll at `publdate`, or its most recent poll when none is given.
    pub fn company_poll(
        &self,
        company: &str,
        publdate: Option<NaiveDate>,
    ) -> DataResult<Vec<PollRecord>> {
        let date = match publdate {
            Some(date) => date,
            None => match self.poll_publication_dates(company)?.last() {
                Some(latest) => *latest,
                None => return Ok(Vec::new()),
            },
        };

        let df = self.frame(Dataset::Polls)?;
        let df = DataProcessor::filter_by_value(&df, "company", company)?;
        let df = DataProcessor::filter_date_range(&df, "publdate", date, date)?;
        let mut records = polls_from_frame(&df)?;
        records.sort_by_key(|r| r.party);
        Ok(records)
    }

    /// One company's polls within a year range, ordered by date then party.
    pub fn company_poll_timeseries(
        &self,
        company: &str,
        year_start: i32,
        year_end: i32,
    ) -> DataResult<Vec<PollRecord>> {
        let df = self.poll_frame(year_start, year_end)?;
        let df = DataProcessor::filter_by_value(&df, "company", company)?;
        let mut records = polls_from_frame(&df)?;
        records.sort_by(|a, b| a.publdate.cmp(&b.publdate).then(a.party.cmp(&b.party)));
        Ok(records)
    }
}

/// Inclusive date bounds for a year range.
fn year_bounds(year_start: i32, year_end: i32) -> DataResult<(NaiveDate, NaiveDate)> {
    for year in [year_start, year_end] {
        if !(1000..=9999).contains(&year) {
            return Err(DataError::InvalidRange(format!(
                "{year} is not a four-digit year"
            )));
        }
    }
    let start = NaiveDate::from_ymd_opt(year_start, 1, 1)
        .ok_or_else(|| DataError::InvalidRange(format!("no Jan 1 in {year_start}")))?;
    let end = NaiveDate::from_ymd_opt(year_end, 12, 31)
        .ok_or_else(|| DataError::InvalidRange(format!("no Dec 31 in {year_end}")))?;
    Ok((start, end))
}

fn mentions_from_frame(df: &DataFrame) -> DataResult<Vec<HashtagMention>> {
    let hashtags = df.column("hashtag")?.str()?;
    let dates = df.column("date")?.str()?;
    let counts = df.column("count")?.i64()?;

    hashtags
        .into_iter()
        .zip(dates.into_iter())
        .zip(counts.into_iter())
        .enumerate()
        .map(|(i, ((hashtag, date), count))| {
            let invalid = |what: &str| {
                DataError::malformed(Dataset::Hashtags, format!("row {i}: {what}"))
            };
            let hashtag = hashtag.ok_or_else(|| invalid("null hashtag"))?;
            let date = date.and_then(parse_date).ok_or_else(|| invalid("invalid date"))?;
            let count = count
                .and_then(|c| u64::try_from(c).ok())
                .ok_or_else(|| invalid("invalid count"))?;
            Ok(HashtagMention {
                hashtag: hashtag.to_string(),
                date,
                count,
            })
        })
        .collect()
}

fn polls_from_frame(df: &DataFrame) -> DataResult<Vec<PollRecord>> {
    let companies = df.column("company")?.str()?;
    let dates = df.column("publdate")?.str()?;
    let parties = df.column("party")?.str()?;
    let supports = df.column("support")?.f64()?;

    companies
        .into_iter()
        .zip(dates.into_iter())
        .zip(parties.into_iter())
        .zip(supports.into_iter())
        .enumerate()
        .map(|(i, (((company, publdate), party), support))| {
            let invalid = |what: String| {
                DataError::malformed(Dataset::Polls, format!("row {i}: {what}"))
            };
            let company = company.ok_or_else(|| invalid("null company".into()))?;
            let publdate = publdate
                .and_then(parse_date)
                .ok_or_else(|| invalid("invalid publdate".into()))?;
            let party = party
                .ok_or_else(|| invalid("null party".into()))?
                .parse::<Party>()
                .map_err(|e| invalid(e.to_string()))?;
            let support = support
                .filter(|s| s.is_finite())
                .ok_or_else(|| invalid("invalid support".into()))?;
            Ok(PollRecord {
                company: company.to_string(),
                publdate,
                party,
                support,
            })
        })
        .collect()
}
