//! Application configuration.

use crate::data::{DEFAULT_TOP_N, DEFAULT_WINDOW_DAYS};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub trending: TrendingConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub charts: ChartsConfig,
}

/// Where the datasets live.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// SQLite database holding the `hashtags` table.
    #[serde(default = "default_database")]
    pub database: PathBuf,
    /// CSV export of the party poll dataset.
    #[serde(default = "default_polls_csv")]
    pub polls_csv: PathBuf,
}

/// Trending window defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct TrendingConfig {
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfig {
    /// Lexicon model file; the uniform baseline is used when unset.
    #[serde(default)]
    pub lexicon: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartsConfig {
    #[serde(default = "default_chart_width")]
    pub width: u32,
    #[serde(default = "default_chart_height")]
    pub height: u32,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_database() -> PathBuf {
    PathBuf::from("data/tweets.db")
}

fn default_polls_csv() -> PathBuf {
    PathBuf::from("data/partisympatier.csv")
}

const fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

const fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

const fn default_chart_width() -> u32 {
    1024
}

const fn default_chart_height() -> u32 {
    640
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("charts")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            polls_csv: default_polls_csv(),
        }
    }
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            top_n: default_top_n(),
        }
    }
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
            output_dir: default_output_dir(),
        }
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("SVPOL")
        .separator("__")
        .try_parsing(true)
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `SVPOL_ENV`)
    /// 3. Environment variables with `SVPOL__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("SVPOL_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(environment())
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse("");
        assert_eq!(config.data.database, PathBuf::from("data/tweets.db"));
        assert_eq!(config.trending.window_days, 365);
        assert_eq!(config.trending.top_n, 10);
        assert!(config.model.lexicon.is_none());
        assert_eq!(config.charts.width, 1024);
    }

    #[test]
    fn sections_override_defaults() {
        let config = parse(
            r#"
            [data]
            polls_csv = "/srv/svpol/polls.csv"

            [trending]
            window_days = 30

            [model]
            lexicon = "models/lexicon.json"
            "#,
        );
        assert_eq!(config.data.polls_csv, PathBuf::from("/srv/svpol/polls.csv"));
        assert_eq!(config.data.database, PathBuf::from("data/tweets.db"));
        assert_eq!(config.trending.window_days, 30);
        assert_eq!(config.trending.top_n, 10);
        assert_eq!(
            config.model.lexicon,
            Some(PathBuf::from("models/lexicon.json"))
        );
    }
}
