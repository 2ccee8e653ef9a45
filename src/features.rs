use std::collections::BTreeMap;

use crate::encoding::{self, CategoryCodes};
use crate::error::PipelineError;
use crate::match_store::MatchRecord;
use crate::rolling::{self, RolledMatchRecord};

/// The training table for one pipeline run, with the code tables it was encoded
/// against and per-team match counts from the raw store.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    pub rows: Vec<RolledMatchRecord>,
    pub venue_codes: CategoryCodes,
    pub opponent_codes: CategoryCodes,
    pub window: usize,
    team_matches: BTreeMap<String, usize>,
}

impl FeatureTable {
    /// Number of raw matches for a team, before rows without enough history were dropped.
    pub fn raw_match_count(&self, team: &str) -> Option<usize> {
        self.team_matches.get(team).copied()
    }

    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.team_matches.keys().map(String::as_str)
    }

    pub fn rows_for<'a>(&'a self, team: &'a str) -> impl Iterator<Item = &'a RolledMatchRecord> {
        self.rows.iter().filter(move |r| r.team() == team)
    }
}

/// Encodes and rolls the full store. Any encoding error aborts the run.
pub fn prepare_features(
    records: &[MatchRecord],
    window: usize,
) -> Result<FeatureTable, PipelineError> {
    let encoded = encoding::encode_matches(records)?;
    let window = window.max(1);
    let rows = rolling::roll_by_team(&encoded.rows, window);

    let mut team_matches: BTreeMap<String, usize> = BTreeMap::new();
    for rec in records {
        *team_matches.entry(rec.team.clone()).or_insert(0) += 1;
    }

    log::debug!(
        "prepared {} feature rows from {} matches ({} teams, window {})",
        rows.len(),
        records.len(),
        team_matches.len(),
        window
    );

    Ok(FeatureTable {
        rows,
        venue_codes: encoded.venue_codes,
        opponent_codes: encoded.opponent_codes,
        window,
        team_matches,
    })
}
