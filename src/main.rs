use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chrono::Local;

use pl_predictor::cli_args;
use pl_predictor::config::{self, Settings};
use pl_predictor::features;
use pl_predictor::match_store;
use pl_predictor::predictor::{PredictionResult, Predictor};

fn main() -> Result<()> {
    config::load_dotenv();
    config::init_logging();

    let mut settings = Settings::from_env();
    if let Some(path) = cli_args::parse_path_arg("--data") {
        settings.data_path = path;
    }
    let json = cli_args::has_flag("--json");

    let records = match_store::load_matches(&settings.data_path)?;
    let table = features::prepare_features(&records, settings.window)
        .context("prepare feature table")?;
    let mut predictor =
        Predictor::new(settings.forest).with_kickoff_hour(settings.kickoff_hour);

    println!("Welcome to the Football Match Predictor!");
    println!("Enter the names of two teams to predict the match outcome.");
    println!("Note: Team names must match exactly as they appear in the dataset.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        let Some(home) = prompt(&mut lines, "\nEnter home team name: ")? else {
            break;
        };
        let Some(away) = prompt(&mut lines, "Enter away team name: ")? else {
            break;
        };

        let today = Local::now().date_naive();
        match predictor.predict_fixture(&table, &home, &away, today) {
            Ok(result) => print_result(&result, json)?,
            Err(err) => {
                println!("\nError: {err}");
                println!("Please check team names and try again.");
                continue;
            }
        }

        let Some(another) = prompt(&mut lines, "\nPredict another match? (y/n): ")? else {
            break;
        };
        if !another.eq_ignore_ascii_case("y") {
            break;
        }
    }

    Ok(())
}

fn prompt(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    label: &str,
) -> Result<Option<String>> {
    print!("{label}");
    io::stdout().flush().context("flush stdout")?;
    match lines.next() {
        Some(line) => Ok(Some(line.context("read stdin")?.trim().to_string())),
        None => Ok(None),
    }
}

fn print_result(result: &PredictionResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result).context("serialize prediction")?);
        return Ok(());
    }
    println!("\nPrediction Results:");
    println!("Home Team: {}", result.home_team);
    println!("Away Team: {}", result.away_team);
    println!("Home Win Probability: {}%", result.home_win_probability);
    println!("Away Win Probability: {}%", result.away_win_probability);
    println!("Predicted Winner: {}", result.predicted_winner);
    Ok(())
}
