use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Statistic columns in the order they appear in feature vectors.
pub const STAT_COLUMNS: [&str; 8] = ["gf", "ga", "sh", "sot", "dist", "fk", "pk", "pkatt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    pub fn label(self) -> &'static str {
        match self {
            Venue::Home => "Home",
            Venue::Away => "Away",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Home" => Some(Venue::Home),
            "Away" => Some(Venue::Away),
            _ => None,
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    Win,
    Draw,
    Loss,
}

impl MatchResult {
    pub fn code(self) -> &'static str {
        match self {
            MatchResult::Win => "W",
            MatchResult::Draw => "D",
            MatchResult::Loss => "L",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "W" => Some(MatchResult::Win),
            "D" => Some(MatchResult::Draw),
            "L" => Some(MatchResult::Loss),
            _ => None,
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Per-match performance numbers for one team. A blank cell in the source is
/// NaN, as fbref leaves `dist` empty for a side without shots.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchStats {
    pub gf: f64,
    pub ga: f64,
    pub sh: f64,
    pub sot: f64,
    pub dist: f64,
    pub fk: f64,
    pub pk: f64,
    pub pkatt: f64,
}

impl MatchStats {
    pub fn values(&self) -> [f64; 8] {
        [
            self.gf, self.ga, self.sh, self.sot, self.dist, self.fk, self.pk, self.pkatt,
        ]
    }

    /// False when any statistic was left blank.
    pub fn is_complete(&self) -> bool {
        self.values().iter().all(|v| v.is_finite())
    }

    pub fn from_values(v: [f64; 8]) -> Self {
        Self {
            gf: v[0],
            ga: v[1],
            sh: v[2],
            sot: v[3],
            dist: v[4],
            fk: v[5],
            pk: v[6],
            pkatt: v[7],
        }
    }
}

/// One team's participation in one fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub date: NaiveDate,
    /// Kickoff as published, "HH:MM" optionally followed by a local-time note.
    pub time: String,
    pub team: String,
    pub opponent: String,
    pub venue: Venue,
    pub result: MatchResult,
    pub stats: MatchStats,
}

impl MatchRecord {
    /// Monday = 0 .. Sunday = 6.
    pub fn day_of_week(&self) -> u8 {
        self.date.weekday().num_days_from_monday() as u8
    }

    pub fn kickoff_hour(&self) -> Option<u8> {
        parse_kickoff_hour(&self.time)
    }
}

/// Parses the hour out of an "HH:MM" kickoff. Anything after the minutes is ignored
/// ("20:00 (21:00)" is 20).
pub fn parse_kickoff_hour(raw: &str) -> Option<u8> {
    let (hour, rest) = raw.trim().split_once(':')?;
    let minutes = rest.get(..2)?;
    if hour.is_empty() || !hour.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !minutes.bytes().all(|b| b.is_ascii_digit()) || minutes.parse::<u8>().ok()? > 59 {
        return None;
    }
    let hour = hour.parse::<u8>().ok()?;
    (hour <= 23).then_some(hour)
}

#[derive(Debug, Deserialize)]
struct CsvMatchRow {
    date: String,
    time: String,
    venue: String,
    opponent: String,
    result: String,
    team: String,
    gf: String,
    ga: String,
    sh: String,
    sot: String,
    dist: String,
    fk: String,
    pk: String,
    pkatt: String,
}

impl CsvMatchRow {
    fn into_record(self, row: usize) -> Result<MatchRecord, PipelineError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT)
            .map_err(|e| PipelineError::malformed(row, "date", &self.date, e.to_string()))?;
        if parse_kickoff_hour(&self.time).is_none() {
            return Err(PipelineError::malformed(
                row,
                "time",
                &self.time,
                "expected HH:MM",
            ));
        }
        let venue = Venue::parse(&self.venue).ok_or_else(|| {
            PipelineError::malformed(row, "venue", &self.venue, "expected Home or Away")
        })?;
        let result = MatchResult::parse(&self.result).ok_or_else(|| {
            PipelineError::malformed(row, "result", &self.result, "expected W, D or L")
        })?;

        let team = self.team.trim().to_string();
        let opponent = self.opponent.trim().to_string();
        if team.is_empty() {
            return Err(PipelineError::malformed(row, "team", self.team, "empty"));
        }
        if opponent.is_empty() {
            return Err(PipelineError::malformed(row, "opponent", self.opponent, "empty"));
        }

        let stats = MatchStats {
            gf: parse_stat(row, "gf", &self.gf)?,
            ga: parse_stat(row, "ga", &self.ga)?,
            sh: parse_stat(row, "sh", &self.sh)?,
            sot: parse_stat(row, "sot", &self.sot)?,
            dist: parse_stat(row, "dist", &self.dist)?,
            fk: parse_stat(row, "fk", &self.fk)?,
            pk: parse_stat(row, "pk", &self.pk)?,
            pkatt: parse_stat(row, "pkatt", &self.pkatt)?,
        };

        Ok(MatchRecord {
            date,
            time: self.time.trim().to_string(),
            team,
            opponent,
            venue,
            result,
            stats,
        })
    }
}

/// Blank is missing (NaN). Text that is not a finite, non-negative number is an error.
fn parse_stat(row: usize, field: &'static str, raw: &str) -> Result<f64, PipelineError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| PipelineError::malformed(row, field, raw, "not a number"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(PipelineError::malformed(
            row,
            field,
            raw,
            "expected a finite, non-negative number",
        ));
    }
    Ok(value)
}

/// Rejects a second row for the same (team, date, opponent).
pub fn check_unique(records: &[MatchRecord]) -> Result<(), PipelineError> {
    let mut seen: HashSet<(&str, NaiveDate, &str)> = HashSet::with_capacity(records.len());
    for (idx, rec) in records.iter().enumerate() {
        if !seen.insert((rec.team.as_str(), rec.date, rec.opponent.as_str())) {
            return Err(PipelineError::malformed(
                idx + 1,
                "team",
                format!("{} vs {} on {}", rec.team, rec.opponent, rec.date),
                "duplicate team/date/opponent",
            ));
        }
    }
    Ok(())
}

/// Reads match rows from CSV with a header. Unknown columns are ignored.
/// Row numbers in errors are 1-based and exclude the header.
pub fn read_matches<R: io::Read>(reader: R) -> Result<Vec<MatchRecord>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut out = Vec::new();
    for (idx, row) in rdr.deserialize::<CsvMatchRow>().enumerate() {
        let raw = row.with_context(|| format!("read csv row {}", idx + 1))?;
        out.push(raw.into_record(idx + 1)?);
    }
    check_unique(&out)?;
    Ok(out)
}

pub fn load_matches(path: &Path) -> Result<Vec<MatchRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("open match file {}", path.display()))?;
    let records =
        read_matches(file).with_context(|| format!("load matches from {}", path.display()))?;
    log::info!("loaded {} match rows from {}", records.len(), path.display());
    Ok(records)
}
