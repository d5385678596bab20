//! Read sources for the hashtag and poll datasets.
//!
//! A source returns every row of a dataset as a DataFrame; all filtering
//! happens in the loader.

use crate::data::model::{HashtagMention, PollRecord};
use crate::error::{DataError, DataResult};
use polars::prelude::*;
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Datasets the dashboard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dataset {
    Hashtags,
    Polls,
}

impl Dataset {
    /// Columns a frame must carry for this dataset.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Dataset::Hashtags => &["hashtag", "date", "count"],
            Dataset::Polls => &["company", "publdate", "party", "support"],
        }
    }

    /// Column holding the row's calendar date.
    pub fn date_column(self) -> &'static str {
        match self {
            Dataset::Hashtags => "date",
            Dataset::Polls => "publdate",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dataset::Hashtags => "hashtags",
            Dataset::Polls => "polls",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read-only access to whole datasets.
pub trait ReadSource: Send + Sync {
    fn fetch(&self, dataset: Dataset) -> DataResult<DataFrame>;
}

/// Hashtags from the tweet database, polls from the exported poll CSV.
#[derive(Debug, Clone)]
pub struct DashboardStore {
    database: PathBuf,
    polls_csv: PathBuf,
}

impl DashboardStore {
    pub fn new(database: impl Into<PathBuf>, polls_csv: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            polls_csv: polls_csv.into(),
        }
    }

    pub fn database(&self) -> &Path {
        &self.database
    }

    pub fn polls_csv(&self) -> &Path {
        &self.polls_csv
    }

    /// Read the hashtags table over a connection that lives only for this call.
    fn fetch_hashtags(&self) -> DataResult<DataFrame> {
        let dataset = Dataset::Hashtags;
        let conn = Connection::open_with_flags(
            &self.database,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| DataError::unavailable(dataset, e))?;

        let mut stmt = conn
            .prepare("SELECT hashtag, date, count FROM hashtags")
            .map_err(|e| DataError::unavailable(dataset, e))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .map_err(|e| DataError::unavailable(dataset, e))?;

        let mut hashtags: Vec<String> = Vec::new();
        let mut dates: Vec<String> = Vec::new();
        let mut counts: Vec<i64> = Vec::new();
        for row in rows {
            let (hashtag, date, count) = row.map_err(|e| DataError::malformed(dataset, e))?;
            hashtags.push(hashtag);
            dates.push(date);
            counts.push(count);
        }

        debug!(rows = hashtags.len(), path = %self.database.display(), "read hashtags table");

        let df = DataFrame::new(vec![
            Column::new("hashtag".into(), hashtags),
            Column::new("date".into(), dates),
            Column::new("count".into(), counts),
        ])?;
        Ok(df)
    }

    fn fetch_polls(&self) -> DataResult<DataFrame> {
        let dataset = Dataset::Polls;
        if !self.polls_csv.exists() {
            return Err(DataError::unavailable(
                dataset,
                format!("{} does not exist", self.polls_csv.display()),
            ));
        }

        let df = LazyCsvReader::new(&self.polls_csv)
            .with_infer_schema_length(Some(10000))
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|e| DataError::unavailable(dataset, e))?;

        debug!(rows = df.height(), path = %self.polls_csv.display(), "read poll csv");
        Ok(df)
    }
}

impl ReadSource for DashboardStore {
    fn fetch(&self, dataset: Dataset) -> DataResult<DataFrame> {
        match dataset {
            Dataset::Hashtags => self.fetch_hashtags(),
            Dataset::Polls => self.fetch_polls(),
        }
    }
}

/// Immutable in-memory copy of the datasets.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    hashtags: Option<DataFrame>,
    polls: Option<DataFrame>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every dataset from `source` once.
    pub fn capture(source: &dyn ReadSource) -> DataResult<Self> {
        Ok(Self {
            hashtags: Some(source.fetch(Dataset::Hashtags)?),
            polls: Some(source.fetch(Dataset::Polls)?),
        })
    }

    pub fn from_records(mentions: &[HashtagMention], polls: &[PollRecord]) -> DataResult<Self> {
        Ok(Self::new()
            .with_hashtags(Self::mentions_frame(mentions)?)
            .with_polls(Self::polls_frame(polls)?))
    }

    pub fn with_hashtags(mut self, df: DataFrame) -> Self {
        self.hashtags = Some(df);
        self
    }

    pub fn with_polls(mut self, df: DataFrame) -> Self {
        self.polls = Some(df);
        self
    }

    pub fn mentions_frame(mentions: &[HashtagMention]) -> DataResult<DataFrame> {
        let df = DataFrame::new(vec![
            Column::new(
                "hashtag".into(),
                mentions.iter().map(|m| m.hashtag.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "date".into(),
                mentions
                    .iter()
                    .map(|m| m.date.format("%Y-%m-%d").to_string())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                "count".into(),
                mentions.iter().map(|m| m.count as i64).collect::<Vec<_>>(),
            ),
        ])?;
        Ok(df)
    }

    pub fn polls_frame(polls: &[PollRecord]) -> DataResult<DataFrame> {
        let df = DataFrame::new(vec![
            Column::new(
                "company".into(),
                polls.iter().map(|p| p.company.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "publdate".into(),
                polls
                    .iter()
                    .map(|p| p.publdate.format("%Y-%m-%d").to_string())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                "party".into(),
                polls
                    .iter()
                    .map(|p| p.party.code().to_string())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                "support".into(),
                polls.iter().map(|p| p.support).collect::<Vec<_>>(),
            ),
        ])?;
        Ok(df)
    }
}

impl ReadSource for Snapshot {
    fn fetch(&self, dataset: Dataset) -> DataResult<DataFrame> {
        let frame = match dataset {
            Dataset::Hashtags => self.hashtags.as_ref(),
            Dataset::Polls => self.polls.as_ref(),
        };
        frame
            .cloned()
            .ok_or_else(|| DataError::unavailable(dataset, "not present in snapshot"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Party;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn snapshot_frames_carry_dataset_columns() {
        let snapshot = Snapshot::from_records(
            &[HashtagMention {
                hashtag: "#svpol".into(),
                date: day(2021, 3, 1),
                count: 42,
            }],
            &[PollRecord {
                company: "Sifo".into(),
                publdate: day(2021, 3, 2),
                party: Party::MP,
                support: 4.1,
            }],
        )
        .unwrap();

        for dataset in [Dataset::Hashtags, Dataset::Polls] {
            let df = snapshot.fetch(dataset).unwrap();
            let names: Vec<String> = df
                .get_column_names()
                .iter()
                .map(|s| s.to_string())
                .collect();
            assert_eq!(names, dataset.columns());
            assert_eq!(df.height(), 1);
        }
    }

    #[test]
    fn empty_snapshot_reports_unavailable() {
        let err = Snapshot::new().fetch(Dataset::Polls).unwrap_err();
        assert!(matches!(
            err,
            DataError::DataUnavailable {
                dataset: Dataset::Polls,
                ..
            }
        ));
    }

    #[test]
    fn missing_database_is_unavailable() {
        let store = DashboardStore::new("/nonexistent/tweets.db", "/nonexistent/polls.csv");
        assert!(matches!(
            store.fetch(Dataset::Hashtags),
            Err(DataError::DataUnavailable { .. })
        ));
        assert!(matches!(
            store.fetch(Dataset::Polls),
            Err(DataError::DataUnavailable { .. })
        ));
    }
}
