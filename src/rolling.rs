use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::encoding::EncodedMatchRecord;
use crate::match_store::{MatchStats, STAT_COLUMNS};

pub const DEFAULT_WINDOW: usize = 3;

pub const FEATURE_COUNT: usize = 4 + STAT_COLUMNS.len();

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "venue_code",
    "opp_code",
    "hour",
    "day_code",
    "gf_rolling",
    "ga_rolling",
    "sh_rolling",
    "sot_rolling",
    "dist_rolling",
    "fk_rolling",
    "pk_rolling",
    "pkatt_rolling",
];

/// An encoded row plus trailing means of the same team's previous matches.
#[derive(Debug, Clone, PartialEq)]
pub struct RolledMatchRecord {
    pub encoded: EncodedMatchRecord,
    pub rolling: MatchStats,
}

impl RolledMatchRecord {
    pub fn date(&self) -> NaiveDate {
        self.encoded.record.date
    }

    pub fn team(&self) -> &str {
        &self.encoded.record.team
    }

    pub fn target(&self) -> u8 {
        self.encoded.target
    }

    pub fn features(&self) -> Vec<f64> {
        feature_vector(
            self.encoded.venue_code,
            self.encoded.opponent_code,
            self.encoded.hour,
            self.encoded.day_code,
            &self.rolling,
        )
    }
}

/// Builds a model input row in `FEATURE_NAMES` order.
pub fn feature_vector(
    venue_code: u32,
    opponent_code: u32,
    hour: u8,
    day_code: u8,
    rolling: &MatchStats,
) -> Vec<f64> {
    let mut out = Vec::with_capacity(FEATURE_COUNT);
    out.push(venue_code as f64);
    out.push(opponent_code as f64);
    out.push(hour as f64);
    out.push(day_code as f64);
    out.extend(rolling.values());
    out
}

/// Rolls one team's rows. Rows are ordered by date first (stable), so callers may
/// pass them in any order.
pub fn roll_team(rows: &[EncodedMatchRecord], window: usize) -> Vec<RolledMatchRecord> {
    let mut sorted: Vec<&EncodedMatchRecord> = rows.iter().collect();
    sorted.sort_by_key(|r| r.record.date);
    roll_sorted(&sorted, window)
}

/// Groups rows by team and rolls each group independently, one team per rayon
/// task. Output is ordered by team name, then date.
pub fn roll_by_team(rows: &[EncodedMatchRecord], window: usize) -> Vec<RolledMatchRecord> {
    let mut groups: BTreeMap<&str, Vec<&EncodedMatchRecord>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.record.team.as_str()).or_default().push(row);
    }

    let groups: Vec<Vec<&EncodedMatchRecord>> = groups.into_values().collect();
    let rolled: Vec<Vec<RolledMatchRecord>> = groups
        .into_par_iter()
        .map(|mut team_rows| {
            team_rows.sort_by_key(|r| r.record.date);
            roll_sorted(&team_rows, window)
        })
        .collect();
    rolled.into_iter().flatten().collect()
}

/// History for a row is the `window` matches before its date. Matches on the
/// same date never see each other, and a window holding a blank statistic
/// drops the row.
fn roll_sorted(rows: &[&EncodedMatchRecord], window: usize) -> Vec<RolledMatchRecord> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(rows.len().saturating_sub(window));
    let mut day_start = 0;
    for i in 0..rows.len() {
        if i > 0 && rows[i].record.date != rows[i - 1].record.date {
            day_start = i;
        }
        if day_start < window {
            continue;
        }
        let prior = &rows[day_start - window..day_start];
        if prior.iter().any(|r| !r.record.stats.is_complete()) {
            continue;
        }

        let mut sums = [0.0_f64; STAT_COLUMNS.len()];
        for r in prior {
            for (sum, v) in sums.iter_mut().zip(r.record.stats.values()) {
                *sum += v;
            }
        }
        let means = sums.map(|s| s / window as f64);
        out.push(RolledMatchRecord {
            encoded: rows[i].clone(),
            rolling: MatchStats::from_values(means),
        });
    }
    out
}
