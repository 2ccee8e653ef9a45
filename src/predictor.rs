use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::PipelineError;
use crate::features::FeatureTable;
use crate::forest::{ForestConfig, RandomForest};
use crate::match_store::{MatchResult, Venue};
use crate::metrics;
use crate::rolling::{self, RolledMatchRecord};
use crate::team_names::canonical_team_name;

pub const DEFAULT_KICKOFF_HOUR: u8 = 15;

/// A probabilistic classifier over binary targets, used as a black box.
pub trait BinaryClassifier {
    /// Full refit; any previous state is discarded.
    fn fit(&mut self, features: &[Vec<f64>], labels: &[u8]) -> Result<(), PipelineError>;

    /// Probability of the positive class for each row.
    fn predict_proba(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, PipelineError>;

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<u8>, PipelineError> {
        Ok(self
            .predict_proba(features)?
            .into_iter()
            .map(|p| u8::from(p > 0.5))
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedRow {
    pub date: NaiveDate,
    pub team: String,
    pub opponent: String,
    pub result: MatchResult,
    pub actual: u8,
    pub predicted: u8,
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub rows: Vec<EvaluatedRow>,
    pub train_rows: usize,
    pub precision: f64,
    pub accuracy: f64,
}

impl Evaluation {
    pub fn test_rows(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub home_team: String,
    pub away_team: String,
    pub home_win_probability: f64,
    pub away_win_probability: f64,
    pub predicted_winner: String,
}

impl PredictionResult {
    /// `p_home` is the home team's win probability in [0, 1].
    pub fn from_probability(home: &str, away: &str, p_home: f64) -> Self {
        let p_home = p_home.clamp(0.0, 1.0);
        Self {
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_win_probability: round2(p_home * 100.0),
            away_win_probability: round2((1.0 - p_home) * 100.0),
            predicted_winner: if p_home > 0.5 { home } else { away }.to_string(),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[derive(Debug, Clone)]
pub struct Predictor<C = RandomForest> {
    classifier: C,
    kickoff_hour: u8,
}

impl Predictor<RandomForest> {
    pub fn new(config: ForestConfig) -> Self {
        Self::with_classifier(RandomForest::new(config))
    }
}

impl Default for Predictor<RandomForest> {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

impl<C: BinaryClassifier> Predictor<C> {
    pub fn with_classifier(classifier: C) -> Self {
        Self {
            classifier,
            kickoff_hour: DEFAULT_KICKOFF_HOUR,
        }
    }

    /// Kickoff hour used for synthetic fixtures; clamped to 0..=23.
    pub fn with_kickoff_hour(mut self, hour: u8) -> Self {
        self.kickoff_hour = hour.min(23);
        self
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn train(&mut self, rows: &[RolledMatchRecord]) -> Result<(), PipelineError> {
        self.fit_on(rows.iter()).map(|_| ())
    }

    fn fit_on<'a>(
        &mut self,
        rows: impl Iterator<Item = &'a RolledMatchRecord>,
    ) -> Result<usize, PipelineError> {
        let (x, y): (Vec<Vec<f64>>, Vec<u8>) = rows.map(|r| (r.features(), r.target())).unzip();
        self.classifier.fit(&x, &y)?;
        Ok(x.len())
    }

    /// Trains on rows dated before `split_date` and scores rows dated after it.
    /// Rows on `split_date` itself belong to neither side.
    pub fn evaluate(
        &mut self,
        rows: &[RolledMatchRecord],
        split_date: NaiveDate,
    ) -> Result<Evaluation, PipelineError> {
        let train_rows = self.fit_on(rows.iter().filter(|r| r.date() < split_date))?;

        let test: Vec<&RolledMatchRecord> = rows.iter().filter(|r| r.date() > split_date).collect();
        let features: Vec<Vec<f64>> = test.iter().map(|r| r.features()).collect();
        let predicted = self.classifier.predict(&features)?;

        let evaluated: Vec<EvaluatedRow> = test
            .iter()
            .zip(&predicted)
            .map(|(row, &predicted)| {
                let rec = &row.encoded.record;
                EvaluatedRow {
                    date: rec.date,
                    team: rec.team.clone(),
                    opponent: rec.opponent.clone(),
                    result: rec.result,
                    actual: row.target(),
                    predicted,
                }
            })
            .collect();

        let actual: Vec<u8> = evaluated.iter().map(|r| r.actual).collect();
        let precision = metrics::precision(&predicted, &actual);
        let accuracy = metrics::accuracy(&predicted, &actual);

        log::info!(
            "evaluated split {split_date}: train={} test={} precision={precision:.3}",
            train_rows,
            evaluated.len()
        );

        Ok(Evaluation {
            rows: evaluated,
            train_rows,
            precision,
            accuracy,
        })
    }

    /// Win probability for `team_a` hosting `team_b` on `as_of`.
    ///
    /// Uses `team_a`'s latest rolled statistics dated on or before `as_of` and
    /// retrains on every rolled row up to that date.
    pub fn predict_match(
        &mut self,
        table: &FeatureTable,
        team_a: &str,
        team_b: &str,
        as_of: NaiveDate,
    ) -> Result<f64, PipelineError> {
        let Some(matches_a) = table.raw_match_count(team_a) else {
            return Err(PipelineError::UnknownTeam(team_a.to_string()));
        };
        if table.raw_match_count(team_b).is_none() {
            return Err(PipelineError::UnknownTeam(team_b.to_string()));
        }

        let opponent_code = table
            .opponent_codes
            .code_of(team_b)
            .or_else(|| table.opponent_codes.code_of(canonical_team_name(team_b)))
            .ok_or_else(|| PipelineError::NoOpponentCode(team_b.to_string()))?;

        let latest = table
            .rows_for(team_a)
            .filter(|r| r.date() <= as_of)
            .max_by_key(|r| r.date())
            .ok_or_else(|| PipelineError::InsufficientHistory {
                team: team_a.to_string(),
                matches: matches_a,
                required: table.window,
            })?;

        // An unseen venue label gets the next free code, as a fresh encoding pass would.
        let venue_code = table
            .venue_codes
            .code_of(Venue::Home.label())
            .unwrap_or(table.venue_codes.len() as u32);
        let day_code = as_of.weekday().num_days_from_monday() as u8;
        let row = rolling::feature_vector(
            venue_code,
            opponent_code,
            self.kickoff_hour,
            day_code,
            &latest.rolling,
        );

        self.fit_on(table.rows.iter().filter(|r| r.date() <= as_of))?;
        self.classifier
            .predict_proba(&[row])?
            .first()
            .copied()
            .ok_or_else(|| PipelineError::Classifier("no probability returned".to_string()))
    }

    pub fn predict_fixture(
        &mut self,
        table: &FeatureTable,
        home: &str,
        away: &str,
        as_of: NaiveDate,
    ) -> Result<PredictionResult, PipelineError> {
        let p_home = self.predict_match(table, home, away, as_of)?;
        Ok(PredictionResult::from_probability(home, away, p_home))
    }
}
