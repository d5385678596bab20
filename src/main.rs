//! svpol - command line front end for the #svpol dashboard data.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use svpol_insights::charts::ChartRenderer;
use svpol_insights::data::{DEFAULT_POLL_YEAR_END, DEFAULT_POLL_YEAR_START};
use svpol_insights::ml::{self, LikenessModel};
use svpol_insights::stats::StatsCalculator;
use svpol_insights::{Config, DashboardStore, DataLoader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "svpol", version, about = "Explore Swedish political Twitter and party polls")]
struct Cli {
    /// Configuration file; defaults to config/default.toml and SVPOL__ variables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Most mentioned hashtags over the trailing window.
    Trending {
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        top: Option<usize>,
        /// Include summed mention counts.
        #[arg(long)]
        totals: bool,
    },
    /// Daily mentions within a date range.
    Hashtags {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        filter: Option<String>,
    },
    /// Every mention of one hashtag, oldest first.
    Timeseries { hashtag: String },
    /// Poll rows within a year range.
    Polls {
        #[arg(long, default_value_t = DEFAULT_POLL_YEAR_START)]
        from: i32,
        #[arg(long, default_value_t = DEFAULT_POLL_YEAR_END)]
        to: i32,
        #[arg(long)]
        company: Option<String>,
    },
    /// Polling institutes in the dataset.
    Companies,
    /// One institute's poll, latest unless a date is given.
    LatestPoll {
        company: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Per-party support statistics within a year range.
    Summary {
        #[arg(long, default_value_t = DEFAULT_POLL_YEAR_START)]
        from: i32,
        #[arg(long, default_value_t = DEFAULT_POLL_YEAR_END)]
        to: i32,
    },
    /// Party likeness of free text.
    Predict { text: String },
    /// Write a dashboard figure as PNG.
    Render {
        #[command(subcommand)]
        figure: Figure,
    },
}

#[derive(Subcommand, Debug)]
enum Figure {
    /// Mentions of one hashtag over time.
    Hashtag { hashtag: String },
    /// Party support lines for one institute.
    Parties {
        company: String,
        #[arg(long, default_value_t = DEFAULT_POLL_YEAR_START)]
        from: i32,
        #[arg(long, default_value_t = DEFAULT_POLL_YEAR_END)]
        to: i32,
    },
    /// One institute's poll as party bars, latest unless a date is given.
    Poll {
        company: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Likeness bars for free text.
    Likeness { text: String },
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text(value);
    }
    Ok(())
}

fn chart_path(config: &Config, name: &str) -> Result<PathBuf> {
    let dir = &config.charts.output_dir;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating chart directory {}", dir.display()))?;
    let file: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    Ok(dir.join(format!("{file}.png")))
}

fn load_model(config: &Config) -> Result<Box<dyn LikenessModel>> {
    ml::load_model(config.model.lexicon.as_deref()).context("loading likeness model")
}

fn report_written(path: &Path) {
    info!(path = %path.display(), "chart written");
    println!("{}", path.display());
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "svpol_insights=info,svpol=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .context("loading configuration")?;

    let store = DashboardStore::new(config.data.database.clone(), config.data.polls_csv.clone());
    let loader = DataLoader::new(store);
    let json = cli.json;

    match cli.command {
        Command::Trending { days, top, totals } => {
            let days = days.unwrap_or(config.trending.window_days);
            let top = top.unwrap_or(config.trending.top_n);
            if totals {
                let entries = loader.trending_entries(days, top)?;
                emit(json, &entries, |entries| {
                    for e in entries {
                        println!("{:<30} {:>10}", e.hashtag, e.total_count);
                    }
                })?;
            } else {
                let tags = loader.trending_hashtags(days, top)?;
                emit(json, &tags, |tags| {
                    for tag in tags {
                        println!("{tag}");
                    }
                })?;
            }
        }
        Command::Hashtags { start, end, filter } => {
            let rows = loader.load_hashtags(start, end, filter.as_deref())?;
            emit(json, &rows, |rows| {
                for m in rows {
                    println!("{} {:<30} {:>8}", m.date, m.hashtag, m.count);
                }
            })?;
        }
        Command::Timeseries { hashtag } => {
            let rows = loader.hashtag_timeseries(&hashtag)?;
            emit(json, &rows, |rows| {
                for m in rows {
                    println!("{} {:>8}", m.date, m.count);
                }
            })?;
        }
        Command::Polls { from, to, company } => {
            let rows = match company {
                Some(company) => loader.company_poll_timeseries(&company, from, to)?,
                None => loader.load_party_poll_numbers(from, to)?,
            };
            emit(json, &rows, |rows| {
                for p in rows {
                    println!("{} {:<12} {:<10} {:>6.1}", p.publdate, p.company, p.party, p.support);
                }
            })?;
        }
        Command::Companies => {
            let companies = loader.poll_companies()?;
            emit(json, &companies, |companies| {
                for c in companies {
                    println!("{c}");
                }
            })?;
        }
        Command::LatestPoll { company, date } => {
            let rows = loader.company_poll(&company, date)?;
            emit(json, &rows, |rows| {
                for p in rows {
                    println!("{} {:<10} {:>6.1}", p.publdate, p.party, p.support);
                }
            })?;
        }
        Command::Summary { from, to } => {
            let polls = loader.load_party_poll_numbers(from, to)?;
            let summaries = StatsCalculator::party_summaries(&polls);
            emit(json, &summaries, |summaries| {
                println!(
                    "{:<10} {:>6} {:>7} {:>7} {:>7} {:>7} {:>7}",
                    "party", "n", "mean", "median", "std", "p05", "p95"
                );
                for s in summaries {
                    println!(
                        "{:<10} {:>6} {:>7.2} {:>7.2} {:>7.2} {:>7.2} {:>7.2}",
                        s.party, s.count, s.mean, s.median, s.std, s.p05, s.p95
                    );
                }
            })?;
        }
        Command::Predict { text } => {
            let likeness = load_model(&config)?.predict(&text)?;
            emit(json, &likeness, |likeness| {
                for (party, score) in likeness.scores() {
                    println!("{:<4} {:>6.1}%", party, score);
                }
            })?;
        }
        Command::Render { figure } => {
            let renderer = ChartRenderer::new(config.charts.width, config.charts.height);
            let path = match figure {
                Figure::Hashtag { hashtag } => {
                    let series = loader.hashtag_timeseries(&hashtag)?;
                    let path = chart_path(&config, &format!("hashtag_{hashtag}"))?;
                    renderer.render_hashtag_timeseries(&path, &hashtag, &series)?;
                    path
                }
                Figure::Parties { company, from, to } => {
                    let polls = loader.company_poll_timeseries(&company, from, to)?;
                    let path = chart_path(&config, &format!("parties_{company}_{from}_{to}"))?;
                    renderer.render_party_lines(&path, &company, &polls)?;
                    path
                }
                Figure::Poll { company, date } => {
                    let polls = loader.company_poll(&company, date)?;
                    let stamp = polls
                        .first()
                        .map(|p| p.publdate.to_string())
                        .unwrap_or_default();
                    let path = chart_path(&config, &format!("poll_{company}_{stamp}"))?;
                    renderer.render_poll_bar(&path, &company, &polls)?;
                    path
                }
                Figure::Likeness { text } => {
                    let likeness = load_model(&config)?.predict(&text)?;
                    let path = chart_path(&config, "likeness")?;
                    renderer.render_likeness(&path, &likeness)?;
                    path
                }
            };
            report_written(&path);
        }
    }

    Ok(())
}
