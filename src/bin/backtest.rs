use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;

use pl_predictor::cli_args;
use pl_predictor::config::{self, Settings};
use pl_predictor::features;
use pl_predictor::match_store::{self, DATE_FORMAT};
use pl_predictor::pairing;
use pl_predictor::predictor::Predictor;

fn main() -> Result<()> {
    config::load_dotenv();
    config::init_logging();

    let mut settings = Settings::from_env();
    if let Some(path) = cli_args::parse_path_arg("--data") {
        settings.data_path = path;
    }
    if let Some(raw) = cli_args::parse_str_arg("--split") {
        settings.split_date = NaiveDate::parse_from_str(&raw, DATE_FORMAT)
            .with_context(|| format!("invalid --split {raw:?}, expected YYYY-MM-DD"))?;
    }

    let records = match_store::load_matches(&settings.data_path)?;
    let table = features::prepare_features(&records, settings.window)
        .context("prepare feature table")?;
    if table.rows.is_empty() {
        return Err(anyhow!(
            "no rows with {} prior matches in {}",
            settings.window,
            settings.data_path.display()
        ));
    }

    let mut predictor = Predictor::new(settings.forest);
    let eval = predictor
        .evaluate(&table.rows, settings.split_date)
        .context("evaluate split")?;

    println!("Walk-forward evaluation");
    println!("Data: {}", settings.data_path.display());
    println!("Split date: {} (rows on this date are excluded)", settings.split_date);
    println!("Rolling window: {}", table.window);
    println!("Train rows: {}", eval.train_rows);
    println!("Test rows: {}", eval.test_rows());
    println!("Model Precision: {:.3}", eval.precision);
    println!("Accuracy: {:.3}", eval.accuracy);

    let pairs = pairing::pair_perspectives(&eval.rows);
    let summary = pairing::summarize(&pairs);
    println!();
    println!("Paired fixtures: {}", summary.pairs);
    println!(
        "Tipped win vs tipped non-win: {} picks, {} won ({:.3})",
        summary.confident,
        summary.confident_wins,
        summary.confident_precision()
    );

    if let Some(out) = cli_args::parse_path_arg("--out") {
        let mut wtr = csv::Writer::from_path(&out)
            .with_context(|| format!("create {}", out.display()))?;
        for row in &eval.rows {
            wtr.serialize(row).context("write evaluated row")?;
        }
        wtr.flush().context("flush evaluated rows")?;
        println!("Wrote {} rows to {}", eval.rows.len(), out.display());
    }

    Ok(())
}
