use chrono::NaiveDate;

use pl_predictor::match_store::MatchResult;
use pl_predictor::pairing::{pair_perspectives, summarize};
use pl_predictor::predictor::EvaluatedRow;

fn row(day: u32, team: &str, opponent: &str, actual: u8, predicted: u8) -> EvaluatedRow {
    EvaluatedRow {
        date: NaiveDate::from_ymd_opt(2022, 9, day).expect("valid date"),
        team: team.to_string(),
        opponent: opponent.to_string(),
        result: if actual == 1 {
            MatchResult::Win
        } else {
            MatchResult::Loss
        },
        actual,
        predicted,
    }
}

#[test]
fn pairs_join_full_names_against_opponent_cells() {
    let rows = vec![
        row(4, "Manchester United", "Arsenal", 1, 1),
        row(4, "Arsenal", "Manchester Utd", 0, 0),
        row(10, "Chelsea", "Fulham", 1, 1),
    ];
    let pairs = pair_perspectives(&rows);
    assert_eq!(pairs.len(), 2);

    let united = pairs
        .iter()
        .find(|p| p.team == "Manchester United")
        .expect("united side paired");
    assert_eq!(united.opponent, "Arsenal");
    assert_eq!(united.predicted, 1);
    assert_eq!(united.opponent_predicted, 0);

    let summary = summarize(&pairs);
    assert_eq!(summary.pairs, 2);
    assert_eq!(summary.confident, 1);
    assert_eq!(summary.confident_wins, 1);
    assert_eq!(summary.confident_precision(), 1.0);
}

#[test]
fn pairing_requires_the_same_date() {
    let rows = vec![
        row(4, "Arsenal", "Chelsea", 1, 1),
        row(5, "Chelsea", "Arsenal", 0, 0),
    ];
    assert!(pair_perspectives(&rows).is_empty());
    assert_eq!(summarize(&[]).confident_precision(), 0.0);
}
