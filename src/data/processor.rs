//! Data Processor Module
//! Column conformance, date-range filtering and aggregation over dataset frames.
//!
//! Dates travel through the frames as canonical `YYYY-MM-DD` strings so that
//! range filters are plain string comparisons.

use crate::data::model::TrendingEntry;
use crate::data::source::Dataset;
use crate::error::{DataError, DataResult};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashSet;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a stored date, tolerating a trailing time component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10)?;
    match raw.as_bytes().get(10) {
        None | Some(b' ') | Some(b'T') => NaiveDate::parse_from_str(head, DATE_FORMAT).ok(),
        Some(_) => None,
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Handles the frame operations behind every loader query.
pub struct DataProcessor;

impl DataProcessor {
    /// Check the dataset's columns are present, cast them to their expected
    /// types and rewrite the date column into canonical form.
    pub fn conform(df: &DataFrame, dataset: Dataset) -> DataResult<DataFrame> {
        let present: HashSet<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        if let Some(missing) = dataset.columns().iter().find(|c| !present.contains(**c)) {
            return Err(DataError::unavailable(
                dataset,
                format!("missing column '{missing}'"),
            ));
        }

        let exprs: Vec<Expr> = match dataset {
            Dataset::Hashtags => vec![
                col("hashtag").cast(DataType::String),
                col("date").cast(DataType::String),
                col("count").cast(DataType::Int64),
            ],
            Dataset::Polls => vec![
                col("company").cast(DataType::String),
                col("publdate").cast(DataType::String),
                col("party").cast(DataType::String),
                col("support").cast(DataType::Float64),
            ],
        };
        let mut conformed = df.clone().lazy().select(exprs).collect()?;
        Self::check_rows(&conformed, dataset)?;

        let date_col = dataset.date_column();
        let dates: Vec<String> = conformed
            .column(date_col)?
            .str()?
            .into_iter()
            .enumerate()
            .map(|(i, raw)| {
                raw.and_then(parse_date).map(format_date).ok_or_else(|| {
                    DataError::malformed(
                        dataset,
                        format!("row {i}: invalid {date_col} {:?}", raw.unwrap_or("null")),
                    )
                })
            })
            .collect::<DataResult<_>>()?;
        conformed.with_column(Column::new(date_col.into(), dates))?;

        Ok(conformed)
    }

    /// Reject the first row holding a null, a negative count or a non-finite support.
    fn check_rows(df: &DataFrame, dataset: Dataset) -> DataResult<()> {
        for name in dataset.columns() {
            let column = df.column(name)?;
            let bad_row = match column.dtype() {
                DataType::Int64 => column
                    .i64()?
                    .into_iter()
                    .position(|v| v.map_or(true, |c| c < 0)),
                DataType::Float64 => column
                    .f64()?
                    .into_iter()
                    .position(|v| v.map_or(true, |s| !s.is_finite())),
                _ => column.str()?.into_iter().position(|v| v.is_none()),
            };
            if let Some(row) = bad_row {
                return Err(DataError::malformed(
                    dataset,
                    format!("row {row}: invalid {name}"),
                ));
            }
        }
        Ok(())
    }

    /// Keep rows whose date lies in `[start, end]`; an inverted range keeps nothing.
    pub fn filter_date_range(
        df: &DataFrame,
        date_col: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DataResult<DataFrame> {
        if start > end {
            return Ok(df.head(Some(0)));
        }

        let filtered = df
            .clone()
            .lazy()
            .filter(
                col(date_col)
                    .gt_eq(lit(format_date(start)))
                    .and(col(date_col).lt_eq(lit(format_date(end)))),
            )
            .collect()?;
        Ok(filtered)
    }

    /// Keep rows whose `column` equals `value` exactly.
    pub fn filter_by_value(df: &DataFrame, column: &str, value: &str) -> DataResult<DataFrame> {
        let filtered = df
            .clone()
            .lazy()
            .filter(col(column).eq(lit(value)))
            .collect()?;
        Ok(filtered)
    }

    /// Sum `value_col` per `key_col` and rank by total descending, ties by key ascending.
    pub fn rank_by_total(
        df: &DataFrame,
        dataset: Dataset,
        key_col: &str,
        value_col: &str,
    ) -> DataResult<Vec<TrendingEntry>> {
        let grouped = df
            .clone()
            .lazy()
            .group_by([col(key_col)])
            .agg([col(value_col).sum().alias("total_count")])
            .collect()?;

        let keys = grouped.column(key_col)?.str()?;
        let totals = grouped.column("total_count")?.cast(&DataType::Int64)?;
        let totals = totals.i64()?;

        let mut entries: Vec<TrendingEntry> = keys
            .into_iter()
            .zip(totals.into_iter())
            .map(|(key, total)| {
                let invalid = |what: String| DataError::malformed(dataset, what);
                let key = key.ok_or_else(|| invalid(format!("null {key_col}")))?;
                let total = total
                    .and_then(|t| u64::try_from(t).ok())
                    .ok_or_else(|| invalid(format!("invalid total for {key}")))?;
                Ok(TrendingEntry {
                    hashtag: key.to_string(),
                    total_count: total,
                })
            })
            .collect::<DataResult<_>>()?;

        entries.sort_by(|a, b| {
            b.total_count
                .cmp(&a.total_count)
                .then_with(|| a.hashtag.cmp(&b.hashtag))
        });
        Ok(entries)
    }

    /// Distinct non-null values of a string column in first-seen order.
    pub fn unique_values(df: &DataFrame, column: &str) -> DataResult<Vec<String>> {
        let mut seen = HashSet::new();
        let values = df
            .column(column)?
            .str()?
            .into_iter()
            .flatten()
            .filter(|v| seen.insert(v.to_string()))
            .map(|v| v.to_string())
            .collect();
        Ok(values)
    }

    /// Sort rows by the given columns, ascending.
    pub fn sort_by_columns(df: &DataFrame, columns: &[&str]) -> DataResult<DataFrame> {
        let sorted = df.sort(columns.to_vec(), SortMultipleOptions::default())?;
        Ok(sorted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mentions_df() -> DataFrame {
        DataFrame::new(vec![
            Column::new("hashtag".into(), ["#a", "#b", "#a", "#c"]),
            Column::new(
                "date".into(),
                ["2021-01-01", "2021-01-15", "2021-01-31 00:00:00", "2021-02-01"],
            ),
            Column::new("count".into(), [5i64, 10, 3, 7]),
        ])
        .unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_date_accepts_timestamps() {
        assert_eq!(parse_date("2021-01-31"), Some(day(2021, 1, 31)));
        assert_eq!(parse_date("2021-01-31 00:00:00"), Some(day(2021, 1, 31)));
        assert_eq!(parse_date("2021-01-31T12:00:00"), Some(day(2021, 1, 31)));
        assert_eq!(parse_date("2021-01-311"), None);
        assert_eq!(parse_date("31/01/2021"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn conform_canonicalises_dates() {
        let df = DataProcessor::conform(&mentions_df(), Dataset::Hashtags).unwrap();
        let dates: Vec<&str> = df
            .column("date")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(dates[2], "2021-01-31");
    }

    #[test]
    fn conform_rejects_missing_columns() {
        let df = mentions_df().drop("count").unwrap();
        let err = DataProcessor::conform(&df, Dataset::Hashtags).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable { .. }));
        assert!(err.to_string().contains("count"));
    }

    #[test]
    fn conform_rejects_bad_dates() {
        let df = DataFrame::new(vec![
            Column::new("hashtag".into(), ["#a"]),
            Column::new("date".into(), ["yesterday"]),
            Column::new("count".into(), [1i64]),
        ])
        .unwrap();
        let err = DataProcessor::conform(&df, Dataset::Hashtags).unwrap_err();
        assert!(matches!(err, DataError::MalformedRecord { .. }));
    }

    #[test]
    fn date_range_is_inclusive() {
        let df = DataProcessor::conform(&mentions_df(), Dataset::Hashtags).unwrap();
        let filtered =
            DataProcessor::filter_date_range(&df, "date", day(2021, 1, 1), day(2021, 1, 31))
                .unwrap();
        assert_eq!(filtered.height(), 3);

        let inverted =
            DataProcessor::filter_date_range(&df, "date", day(2021, 6, 1), day(2021, 1, 1))
                .unwrap();
        assert_eq!(inverted.height(), 0);
    }

    #[test]
    fn ranking_sums_and_breaks_ties_by_name() {
        let df = DataFrame::new(vec![
            Column::new("hashtag".into(), ["#z", "#a", "#m", "#a"]),
            Column::new("count".into(), [4i64, 2, 9, 2]),
        ])
        .unwrap();
        let ranked =
            DataProcessor::rank_by_total(&df, Dataset::Hashtags, "hashtag", "count").unwrap();
        let order: Vec<(&str, u64)> = ranked
            .iter()
            .map(|e| (e.hashtag.as_str(), e.total_count))
            .collect();
        assert_eq!(order, vec![("#m", 9), ("#a", 4), ("#z", 4)]);
    }

    #[test]
    fn ranking_rejects_negative_totals() {
        let df = DataFrame::new(vec![
            Column::new("hashtag".into(), ["#a", "#b"]),
            Column::new("count".into(), [5i64, -20]),
        ])
        .unwrap();
        let err = DataProcessor::rank_by_total(&df, Dataset::Hashtags, "hashtag", "count")
            .unwrap_err();
        assert!(matches!(err, DataError::MalformedRecord { .. }));
    }

    #[test]
    fn conform_rejects_nulls_and_negative_counts() {
        let df = DataFrame::new(vec![
            Column::new("hashtag".into(), [Some("#a"), None]),
            Column::new("date".into(), ["2022-05-01", "2022-05-01"]),
            Column::new("count".into(), [5i64, 100]),
        ])
        .unwrap();
        let err = DataProcessor::conform(&df, Dataset::Hashtags).unwrap_err();
        assert!(err.to_string().contains("row 1: invalid hashtag"));

        let df = DataFrame::new(vec![
            Column::new("hashtag".into(), ["#a", "#b"]),
            Column::new("date".into(), ["2022-05-01", "2022-05-01"]),
            Column::new("count".into(), [5i64, -20]),
        ])
        .unwrap();
        let err = DataProcessor::conform(&df, Dataset::Hashtags).unwrap_err();
        assert!(err.to_string().contains("row 1: invalid count"));
    }

    #[test]
    fn unique_values_keep_first_seen_order() {
        let values = DataProcessor::unique_values(&mentions_df(), "hashtag").unwrap();
        assert_eq!(values, vec!["#a", "#b", "#c"]);
    }
}
