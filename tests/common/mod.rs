#![allow(dead_code)]

use chrono::{Datelike, NaiveDate};

use pl_predictor::match_store::{MatchRecord, MatchResult, MatchStats, Venue};

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid test date")
}

/// A record whose statistics are all derived from `gf` so rolled means are easy
/// to predict.
pub fn record(team: &str, day: &str, opponent: &str, result: MatchResult, gf: f64) -> MatchRecord {
    let venue = if date(day).day0() % 2 == 0 {
        Venue::Home
    } else {
        Venue::Away
    };
    MatchRecord {
        date: date(day),
        time: "15:00".to_string(),
        team: team.to_string(),
        opponent: opponent.to_string(),
        venue,
        result,
        stats: MatchStats {
            gf,
            ga: 1.0,
            sh: gf * 4.0,
            sot: gf * 2.0,
            dist: 17.5,
            fk: 1.0,
            pk: 0.0,
            pkatt: 0.0,
        },
    }
}

pub fn result_for(gf: f64) -> MatchResult {
    if gf >= 2.0 {
        MatchResult::Win
    } else if gf == 1.0 {
        MatchResult::Draw
    } else {
        MatchResult::Loss
    }
}

/// Two teams, eight matches each, with a shared match day on 2021-12-06.
pub fn two_team_season() -> Vec<MatchRecord> {
    let arsenal = [
        ("2021-11-01", 1.0),
        ("2021-11-08", 2.0),
        ("2021-11-15", 3.0),
        ("2021-11-22", 0.0),
        ("2021-11-29", 4.0),
        ("2021-12-06", 1.0),
        ("2021-12-13", 2.0),
        ("2021-12-20", 3.0),
    ];
    let chelsea = [
        ("2021-11-02", 0.0),
        ("2021-11-09", 0.0),
        ("2021-11-16", 1.0),
        ("2021-11-23", 2.0),
        ("2021-11-30", 1.0),
        ("2021-12-06", 3.0),
        ("2021-12-14", 0.0),
        ("2021-12-21", 2.0),
    ];
    let mut out = Vec::new();
    for (day, gf) in arsenal {
        out.push(record("Arsenal", day, "Chelsea", result_for(gf), gf));
    }
    for (day, gf) in chelsea {
        out.push(record("Chelsea", day, "Arsenal", result_for(gf), gf));
    }
    out
}
