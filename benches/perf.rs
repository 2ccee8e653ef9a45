use chrono::{Duration, NaiveDate};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use pl_predictor::encoding::encode_matches;
use pl_predictor::features::prepare_features;
use pl_predictor::forest::{ForestConfig, RandomForest};
use pl_predictor::match_store::{MatchRecord, MatchResult, MatchStats, Venue};
use pl_predictor::predictor::{BinaryClassifier, Predictor};

const TEAMS: [&str; 20] = [
    "Arsenal",
    "Aston Villa",
    "Bournemouth",
    "Brentford",
    "Brighton",
    "Chelsea",
    "Crystal Palace",
    "Everton",
    "Fulham",
    "Leeds United",
    "Leicester City",
    "Liverpool",
    "Manchester City",
    "Manchester Utd",
    "Newcastle Utd",
    "Nottingham Forest",
    "Southampton",
    "Tottenham",
    "West Ham",
    "Wolves",
];

/// Two seasons of 38 matches per club with deterministic stat lines.
fn synthetic_league() -> Vec<MatchRecord> {
    let start = NaiveDate::from_ymd_opt(2020, 9, 12).expect("valid date");
    let mut out = Vec::new();
    for (t, team) in TEAMS.iter().enumerate() {
        for round in 0..76usize {
            let opponent = TEAMS[(t + 1 + round % 19) % TEAMS.len()];
            let gf = ((t * 7 + round * 3) % 5) as f64;
            let ga = ((t * 3 + round * 5) % 4) as f64;
            let result = if gf > ga {
                MatchResult::Win
            } else if gf < ga {
                MatchResult::Loss
            } else {
                MatchResult::Draw
            };
            out.push(MatchRecord {
                date: start + Duration::days(round as i64 * 7),
                time: if round % 3 == 0 { "12:30" } else { "15:00" }.to_string(),
                team: team.to_string(),
                opponent: opponent.to_string(),
                venue: if round % 2 == 0 { Venue::Home } else { Venue::Away },
                result,
                stats: MatchStats::from_values([
                    gf,
                    ga,
                    gf * 4.0 + 6.0,
                    gf * 2.0 + 1.0,
                    15.0 + (round % 6) as f64,
                    (round % 2) as f64,
                    0.0,
                    if round % 7 == 0 { 1.0 } else { 0.0 },
                ]),
            });
        }
    }
    out
}

fn bench_encode(c: &mut Criterion) {
    let records = synthetic_league();
    c.bench_function("encode_matches", |b| {
        b.iter(|| {
            let table = encode_matches(black_box(&records)).unwrap();
            black_box(table.rows.len());
        })
    });
}

fn bench_prepare_features(c: &mut Criterion) {
    let records = synthetic_league();
    c.bench_function("prepare_features", |b| {
        b.iter(|| {
            let table = prepare_features(black_box(&records), black_box(3)).unwrap();
            black_box(table.rows.len());
        })
    });
}

fn bench_forest_fit(c: &mut Criterion) {
    let table = prepare_features(&synthetic_league(), 3).unwrap();
    let x: Vec<Vec<f64>> = table.rows.iter().map(|r| r.features()).collect();
    let y: Vec<u8> = table.rows.iter().map(|r| r.target()).collect();
    let config = ForestConfig {
        n_trees: 20,
        ..ForestConfig::default()
    };

    c.bench_function("forest_fit", |b| {
        b.iter(|| {
            let mut forest = RandomForest::new(config);
            forest.fit(black_box(&x), black_box(&y)).unwrap();
            black_box(forest.is_fitted());
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let table = prepare_features(&synthetic_league(), 3).unwrap();
    let split = NaiveDate::from_ymd_opt(2021, 9, 1).expect("valid date");
    let config = ForestConfig {
        n_trees: 20,
        ..ForestConfig::default()
    };

    c.bench_function("evaluate", |b| {
        b.iter(|| {
            let mut predictor = Predictor::new(config);
            let eval = predictor.evaluate(black_box(&table.rows), split).unwrap();
            black_box(eval.precision);
        })
    });
}

criterion_group!(
    perf,
    bench_encode,
    bench_prepare_features,
    bench_forest_fit,
    bench_evaluate
);
criterion_main!(perf);
