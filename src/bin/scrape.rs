use anyhow::{Context, Result, anyhow};

use pl_predictor::cli_args;
use pl_predictor::config::{self, Settings};
use pl_predictor::fbref::{self, FbrefScraper};

const DEFAULT_FROM_YEAR: i32 = 2023;
const DEFAULT_TO_YEAR: i32 = 2020;

fn main() -> Result<()> {
    config::load_dotenv();
    config::init_logging();

    let settings = Settings::from_env();
    let from = cli_args::parse_i32_arg("--from").unwrap_or(DEFAULT_FROM_YEAR);
    let to = cli_args::parse_i32_arg("--to").unwrap_or(DEFAULT_TO_YEAR);
    if from < to {
        return Err(anyhow!("--from ({from}) must not be earlier than --to ({to})"));
    }
    let out = cli_args::parse_path_arg("--out").unwrap_or_else(|| settings.data_path.clone());

    let scraper = FbrefScraper::new(&settings)?;
    let rows = scraper
        .scrape(from, to)
        .with_context(|| format!("scrape seasons {from}..={to}"))?;
    if rows.is_empty() {
        return Err(anyhow!("scrape produced no rows"));
    }

    fbref::write_matches_csv(&out, &rows)?;

    println!("Scrape complete");
    println!("Seasons: {from} -> {to}");
    println!("Rows: {}", rows.len());
    println!("Output: {}", out.display());
    Ok(())
}
