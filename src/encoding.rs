use std::collections::BTreeSet;

use crate::error::PipelineError;
use crate::match_store::{MatchRecord, MatchResult};

/// Integer codes for a categorical column, assigned in sorted label order.
///
/// Codes are only meaningful for the encoding pass that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCodes {
    labels: Vec<String>,
}

impl CategoryCodes {
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let set: BTreeSet<&str> = labels.into_iter().collect();
        Self {
            labels: set.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn code_of(&self, label: &str) -> Option<u32> {
        self.labels
            .binary_search_by(|l| l.as_str().cmp(label))
            .ok()
            .map(|idx| idx as u32)
    }

    pub fn label_of(&self, code: u32) -> Option<&str> {
        self.labels.get(code as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedMatchRecord {
    pub record: MatchRecord,
    pub venue_code: u32,
    pub opponent_code: u32,
    pub hour: u8,
    pub day_code: u8,
    /// 1 for a win; draws and losses are both 0.
    pub target: u8,
}

#[derive(Debug, Clone, Default)]
pub struct EncodedTable {
    pub rows: Vec<EncodedMatchRecord>,
    pub venue_codes: CategoryCodes,
    pub opponent_codes: CategoryCodes,
}

pub fn win_target(result: MatchResult) -> u8 {
    u8::from(result == MatchResult::Win)
}

/// Encodes every record. Any unparseable kickoff fails the whole pass.
pub fn encode_matches(records: &[MatchRecord]) -> Result<EncodedTable, PipelineError> {
    let venue_codes = CategoryCodes::from_labels(records.iter().map(|r| r.venue.label()));
    let opponent_codes = CategoryCodes::from_labels(records.iter().map(|r| r.opponent.as_str()));

    let mut rows = Vec::with_capacity(records.len());
    for (idx, rec) in records.iter().enumerate() {
        let Some(hour) = rec.kickoff_hour() else {
            return Err(PipelineError::malformed(
                idx + 1,
                "time",
                &rec.time,
                "expected HH:MM",
            ));
        };
        // Both lookups hit: the code tables were built from these same records.
        let venue_code = venue_codes.code_of(rec.venue.label()).unwrap_or_default();
        let opponent_code = opponent_codes.code_of(&rec.opponent).unwrap_or_default();

        rows.push(EncodedMatchRecord {
            record: rec.clone(),
            venue_code,
            opponent_code,
            hour,
            day_code: rec.day_of_week(),
            target: win_target(rec.result),
        });
    }

    Ok(EncodedTable {
        rows,
        venue_codes,
        opponent_codes,
    })
}
