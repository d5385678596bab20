//! Static Chart Renderer
//! Writes the dashboard figures as PNG files.
//!
//! Figures:
//! 1. Hashtag mentions over time (single line)
//! 2. Party support over time for one polling institute (line per party)
//! 3. One institute's poll on a single publication date (bar per party)
//! 4. Party likeness (bar per party)

use crate::data::{HashtagMention, Party, PollRecord};
use crate::ml::Likeness;
use chrono::{Days, NaiveDate};
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const FONT: &str = "sans-serif";
const LINE_COLOR: RGBColor = RGBColor(52, 152, 219);

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Nothing to plot: {0}")]
    NoData(String),
    #[error("Chart rendering failed: {0}")]
    Drawing(String),
}

fn drawing(err: impl Display) -> ChartError {
    ChartError::Drawing(err.to_string())
}

fn party_color(party: Party) -> RGBColor {
    let (r, g, b) = party.color();
    RGBColor(r, g, b)
}

/// X-axis span covering `dates`, widened to one day when all dates coincide.
pub fn date_span(dates: impl IntoIterator<Item = NaiveDate>) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = dates.into_iter();
    let first = dates.next()?;
    let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    if min == max {
        let next = max.checked_add_days(Days::new(1)).unwrap_or(max);
        return Some((min, next));
    }
    Some((min, max))
}

/// Y-axis ceiling with headroom above the largest value.
pub fn value_ceiling(max: f64) -> f64 {
    if max.is_finite() && max > 0.0 {
        (max + max / 10.0).ceil()
    } else {
        1.0
    }
}

/// Renders the dashboard figures to PNG.
#[derive(Debug, Clone, Copy)]
pub struct ChartRenderer {
    width: u32,
    height: u32,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(1024, 640)
    }
}

impl ChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Line chart of one hashtag's daily mentions; `series` must be sorted by date.
    pub fn render_hashtag_timeseries(
        &self,
        path: &Path,
        hashtag: &str,
        series: &[HashtagMention],
    ) -> Result<(), ChartError> {
        let (start, end) = date_span(series.iter().map(|m| m.date))
            .ok_or_else(|| ChartError::NoData(format!("no mentions of {hashtag}")))?;
        let y_max = value_ceiling(series.iter().map(|m| m.count as f64).fold(0.0, f64::max));

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Mentions of {hashtag}"), (FONT, 24))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(start..end, 0f64..y_max)
            .map_err(drawing)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("# of Tweets")
            .draw()
            .map_err(drawing)?;

        chart
            .draw_series(LineSeries::new(
                series.iter().map(|m| (m.date, m.count as f64)),
                LINE_COLOR.stroke_width(2),
            ))
            .map_err(drawing)?;

        root.present().map_err(drawing)?;
        debug!(path = %path.display(), points = series.len(), "rendered hashtag timeseries");
        Ok(())
    }

    /// One support line per party for a single polling institute.
    pub fn render_party_lines(
        &self,
        path: &Path,
        company: &str,
        polls: &[PollRecord],
    ) -> Result<(), ChartError> {
        let (start, end) = date_span(polls.iter().map(|p| p.publdate))
            .ok_or_else(|| ChartError::NoData(format!("no polls from {company}")))?;
        let y_max = value_ceiling(polls.iter().map(|p| p.support).fold(0.0, f64::max));

        let mut by_party: BTreeMap<Party, Vec<(NaiveDate, f64)>> = BTreeMap::new();
        for poll in polls {
            by_party
                .entry(poll.party)
                .or_default()
                .push((poll.publdate, poll.support));
        }

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Party support, {company}"), (FONT, 24))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(start..end, 0f64..y_max)
            .map_err(drawing)?;

        chart
            .configure_mesh()
            .x_desc("Publishing Date")
            .y_desc("Support")
            .draw()
            .map_err(drawing)?;

        for (party, mut points) in by_party {
            points.sort_by_key(|(date, _)| *date);
            let color = party_color(party);
            chart
                .draw_series(LineSeries::new(points, color.stroke_width(2)))
                .map_err(drawing)?
                .label(party.code())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(drawing)?;

        root.present().map_err(drawing)?;
        debug!(path = %path.display(), rows = polls.len(), "rendered party lines");
        Ok(())
    }

    /// Bar per party for one institute's poll; `polls` share a publication date.
    pub fn render_poll_bar(
        &self,
        path: &Path,
        company: &str,
        polls: &[PollRecord],
    ) -> Result<(), ChartError> {
        let first = polls
            .first()
            .ok_or_else(|| ChartError::NoData(format!("no poll from {company}")))?;
        let n = polls.len() as u32;
        let y_max = value_ceiling(polls.iter().map(|p| p.support).fold(0.0, f64::max));

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("{company}, {}", first.publdate), (FONT, 24))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..n).into_segmented(), 0f64..y_max)
            .map_err(drawing)?;

        let label = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) => polls
                .get(*i as usize)
                .map(|p| p.party.code().to_string())
                .unwrap_or_default(),
            _ => String::new(),
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Party")
            .y_desc("Support")
            .x_label_formatter(&label)
            .draw()
            .map_err(drawing)?;

        chart
            .draw_series(polls.iter().enumerate().map(|(i, poll)| {
                let i = i as u32;
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), poll.support),
                    ],
                    party_color(poll.party).filled(),
                );
                bar.set_margin(0, 0, 8, 8);
                bar
            }))
            .map_err(drawing)?;

        root.present().map_err(drawing)?;
        debug!(path = %path.display(), parties = polls.len(), "rendered poll bars");
        Ok(())
    }

    /// Bar per parliamentary party, coloured like the poll charts.
    pub fn render_likeness(&self, path: &Path, likeness: &Likeness) -> Result<(), ChartError> {
        let scores = likeness.scores();
        if scores.is_empty() {
            return Err(ChartError::NoData("empty likeness".into()));
        }
        let n = scores.len() as u32;

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Party likeness", (FONT, 24))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..n).into_segmented(), 0f64..100f64)
            .map_err(drawing)?;

        let label = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) => scores
                .get(*i as usize)
                .map(|(p, _)| p.code().to_string())
                .unwrap_or_default(),
            _ => String::new(),
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Party")
            .y_desc("Similarity (%)")
            .x_label_formatter(&label)
            .draw()
            .map_err(drawing)?;

        chart
            .draw_series(scores.iter().enumerate().map(|(i, (party, score))| {
                let i = i as u32;
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), *score),
                    ],
                    party_color(*party).filled(),
                );
                bar.set_margin(0, 0, 8, 8);
                bar
            }))
            .map_err(drawing)?;

        root.present().map_err(drawing)?;
        debug!(path = %path.display(), "rendered likeness bars");
        Ok(())
    }
}
