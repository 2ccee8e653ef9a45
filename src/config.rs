use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

use crate::forest::ForestConfig;
use crate::match_store::DATE_FORMAT;
use crate::predictor::DEFAULT_KICKOFF_HOUR;
use crate::rolling::DEFAULT_WINDOW;

const DEFAULT_DATA_PATH: &str = "matches.csv";
const DEFAULT_SPLIT_DATE: (i32, u32, u32) = (2022, 1, 1);
const DEFAULT_SCRAPE_DELAY_MS: u64 = 1000;
const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone)]
pub struct Settings {
    pub data_path: PathBuf,
    pub window: usize,
    pub forest: ForestConfig,
    pub split_date: NaiveDate,
    pub kickoff_hour: u8,
    pub scrape_delay: Duration,
    pub scrape_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        let (y, m, d) = DEFAULT_SPLIT_DATE;
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            window: DEFAULT_WINDOW,
            forest: ForestConfig::default(),
            split_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
            kickoff_hour: DEFAULT_KICKOFF_HOUR,
            scrape_delay: Duration::from_millis(DEFAULT_SCRAPE_DELAY_MS),
            scrape_timeout: Duration::from_secs(DEFAULT_SCRAPE_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Reads overrides from the environment. Unset or unparseable values keep
    /// their defaults; `.env` files should be loaded by the caller beforehand.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let forest = ForestConfig {
            n_trees: get("FOREST_TREES")
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(defaults.forest.n_trees)
                .clamp(1, 1000),
            min_samples_split: get("FOREST_MIN_SAMPLES_SPLIT")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(defaults.forest.min_samples_split)
                .max(2),
            seed: get("FOREST_SEED")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.forest.seed),
            ..defaults.forest
        };

        Self {
            data_path: get("MATCHES_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            window: get("ROLLING_WINDOW")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(defaults.window)
                .clamp(1, 20),
            forest,
            split_date: get("SPLIT_DATE")
                .and_then(|v| NaiveDate::parse_from_str(&v, DATE_FORMAT).ok())
                .unwrap_or(defaults.split_date),
            kickoff_hour: get("KICKOFF_HOUR")
                .and_then(|v| v.parse::<u8>().ok())
                .unwrap_or(defaults.kickoff_hour)
                .min(23),
            scrape_delay: get("SCRAPE_DELAY_MS")
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.scrape_delay),
            scrape_timeout: get("SCRAPE_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .map(|s| Duration::from_secs(s.max(1)))
                .unwrap_or(defaults.scrape_timeout),
        }
    }
}

/// Loads `.env.local` then `.env` if present.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

/// Logger for the binaries; `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_when_nothing_is_set() {
        let s = Settings::from_lookup(|_| None);
        assert_eq!(s.window, 3);
        assert_eq!(s.forest.n_trees, 50);
        assert_eq!(s.forest.min_samples_split, 10);
        assert_eq!(s.forest.seed, 1);
        assert_eq!(s.kickoff_hour, 15);
        assert_eq!(s.split_date, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
        assert_eq!(s.data_path, PathBuf::from("matches.csv"));
    }

    #[test]
    fn overrides_are_parsed_and_clamped() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ROLLING_WINDOW", "0"),
            ("FOREST_TREES", "80"),
            ("KICKOFF_HOUR", "99"),
            ("SPLIT_DATE", "2021-08-01"),
            ("MATCHES_CSV", " data/pl.csv "),
            ("FOREST_SEED", "not-a-number"),
        ]);
        let s = Settings::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(s.window, 1);
        assert_eq!(s.forest.n_trees, 80);
        assert_eq!(s.forest.seed, 1);
        assert_eq!(s.kickoff_hour, 23);
        assert_eq!(s.split_date, NaiveDate::from_ymd_opt(2021, 8, 1).unwrap());
        assert_eq!(s.data_path, PathBuf::from("data/pl.csv"));
    }
}
