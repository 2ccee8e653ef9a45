use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::predictor::EvaluatedRow;
use crate::team_names::canonical_team_name;

/// One fixture seen from both sides: `team`'s prediction next to the prediction
/// made for its opponent on the same date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedPrediction {
    pub date: NaiveDate,
    pub team: String,
    pub opponent: String,
    pub actual: u8,
    pub predicted: u8,
    pub opponent_actual: u8,
    pub opponent_predicted: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairingSummary {
    pub pairs: usize,
    /// Pairs where the team was tipped to win and its opponent was not.
    pub confident: usize,
    pub confident_wins: usize,
}

impl PairingSummary {
    /// Share of confident picks that were actual wins; 0 without confident picks.
    pub fn confident_precision(&self) -> f64 {
        if self.confident == 0 {
            return 0.0;
        }
        self.confident_wins as f64 / self.confident as f64
    }
}

/// Joins rows on date and canonical team name against the opponent column.
///
/// Squad pages spell clubs in full ("Manchester United") while opponent cells
/// use the short form ("Manchester Utd"), so the team side is normalised first.
pub fn pair_perspectives(rows: &[EvaluatedRow]) -> Vec<PairedPrediction> {
    let mut by_opponent: HashMap<(NaiveDate, &str), Vec<&EvaluatedRow>> = HashMap::new();
    for row in rows {
        by_opponent
            .entry((row.date, row.opponent.as_str()))
            .or_default()
            .push(row);
    }

    let mut out = Vec::new();
    for row in rows {
        let key = (row.date, canonical_team_name(&row.team));
        let Some(mirrors) = by_opponent.get(&key) else {
            continue;
        };
        for mirror in mirrors {
            out.push(PairedPrediction {
                date: row.date,
                team: row.team.clone(),
                opponent: row.opponent.clone(),
                actual: row.actual,
                predicted: row.predicted,
                opponent_actual: mirror.actual,
                opponent_predicted: mirror.predicted,
            });
        }
    }
    out
}

pub fn summarize(pairs: &[PairedPrediction]) -> PairingSummary {
    let mut summary = PairingSummary {
        pairs: pairs.len(),
        confident: 0,
        confident_wins: 0,
    };
    for p in pairs {
        if p.predicted == 1 && p.opponent_predicted == 0 {
            summary.confident += 1;
            if p.actual == 1 {
                summary.confident_wins += 1;
            }
        }
    }
    summary
}
