use std::fs;
use std::path::PathBuf;

use pl_predictor::PipelineError;
use pl_predictor::match_store::{MatchResult, Venue, load_matches, read_matches};

const HEADER: &str = "date,time,comp,round,day,venue,result,gf,ga,opponent,sh,sot,dist,fk,pk,pkatt,season,team";

fn csv_with(rows: &[&str]) -> String {
    let mut out = String::from(HEADER);
    for row in rows {
        out.push('\n');
        out.push_str(row);
    }
    out.push('\n');
    out
}

fn pipeline_error(err: &anyhow::Error) -> &PipelineError {
    err.downcast_ref::<PipelineError>()
        .expect("error should carry a PipelineError")
}

#[test]
fn reads_rows_and_ignores_extra_columns() {
    let raw = csv_with(&[
        "2022-08-05,20:00,Premier League,Matchweek 1,Fri,Away,W,2,0,Crystal Palace,10,2,18.7,0,0,0,2023,Arsenal",
        "2022-08-13,15:00 (16:00),Premier League,Matchweek 2,Sat,Home,L,1,2,Leicester City,17,5,16.1,1,1,1,2023,Arsenal",
    ]);
    let rows = read_matches(raw.as_bytes()).expect("valid csv");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].team, "Arsenal");
    assert_eq!(rows[0].venue, Venue::Away);
    assert_eq!(rows[0].result, MatchResult::Win);
    assert_eq!(rows[0].kickoff_hour(), Some(20));
    assert_eq!(rows[1].kickoff_hour(), Some(15));
    assert_eq!(rows[1].stats.dist, 16.1);
    assert_eq!(rows[1].stats.pkatt, 1.0);
}

#[test]
fn blank_statistic_loads_as_missing() {
    // fbref leaves the distance cell empty for a side without shots.
    let raw = csv_with(&[
        "2022-08-05,20:00,Premier League,Matchweek 1,Fri,Away,L,0,2,Crystal Palace,0,0,,0,0,0,2023,Arsenal",
        "2022-08-13,15:00,Premier League,Matchweek 2,Sat,Home,W,2,0,Leicester City,12,5,16.0,1,0,0,2023,Arsenal",
    ]);
    let rows = read_matches(raw.as_bytes()).expect("blank is not malformed");
    assert_eq!(rows.len(), 2);
    assert!(rows[0].stats.dist.is_nan());
    assert_eq!(rows[0].stats.sh, 0.0);
    assert!(!rows[0].stats.is_complete());
    assert!(rows[1].stats.is_complete());
}

#[test]
fn unparseable_statistic_is_rejected() {
    let raw = csv_with(&[
        "2022-08-05,20:00,Premier League,Matchweek 1,Fri,Away,W,2,0,Crystal Palace,10,2,far,0,0,0,2023,Arsenal",
    ]);
    let err = read_matches(raw.as_bytes()).expect_err("text in dist");
    match pipeline_error(&err) {
        PipelineError::MalformedInput { row, field, .. } => {
            assert_eq!(*row, 1);
            assert_eq!(*field, "dist");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn negative_statistic_is_rejected() {
    let raw = csv_with(&[
        "2022-08-05,20:00,Premier League,Matchweek 1,Fri,Away,W,-1,0,Crystal Palace,10,2,18.7,0,0,0,2023,Arsenal",
    ]);
    let err = read_matches(raw.as_bytes()).expect_err("negative gf");
    assert!(matches!(
        pipeline_error(&err),
        PipelineError::MalformedInput { field: "gf", .. }
    ));
}

#[test]
fn bad_date_and_labels_are_rejected() {
    let cases = [
        ("05/08/2022,20:00,PL,1,Fri,Away,W,2,0,Palace,10,2,18.7,0,0,0,2023,Arsenal", "date"),
        ("2022-08-05,evening,PL,1,Fri,Away,W,2,0,Palace,10,2,18.7,0,0,0,2023,Arsenal", "time"),
        ("2022-08-05,20:00,PL,1,Fri,Neutral,W,2,0,Palace,10,2,18.7,0,0,0,2023,Arsenal", "venue"),
        ("2022-08-05,20:00,PL,1,Fri,Away,Won,2,0,Palace,10,2,18.7,0,0,0,2023,Arsenal", "result"),
    ];
    for (row, expected_field) in cases {
        let raw = csv_with(&[row]);
        let err = read_matches(raw.as_bytes()).expect_err(expected_field);
        match pipeline_error(&err) {
            PipelineError::MalformedInput { field, .. } => assert_eq!(*field, expected_field),
            other => panic!("unexpected error {other:?}"),
        }
    }
}

#[test]
fn duplicate_fixture_is_rejected() {
    let row = "2022-08-05,20:00,Premier League,Matchweek 1,Fri,Away,W,2,0,Crystal Palace,10,2,18.7,0,0,0,2023,Arsenal";
    let raw = csv_with(&[row, row]);
    let err = read_matches(raw.as_bytes()).expect_err("duplicate");
    assert!(matches!(
        pipeline_error(&err),
        PipelineError::MalformedInput { row: 2, .. }
    ));
}

#[test]
fn missing_required_column_fails() {
    let raw = "date,time,venue,opponent,result,team\n2022-08-05,20:00,Away,Palace,W,Arsenal\n";
    assert!(read_matches(raw.as_bytes()).is_err());
}

#[test]
fn loads_from_disk() {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("matches_small.csv");
    let rows = load_matches(&path).expect("fixture loads");
    assert_eq!(rows.len(), 8);
    assert!(rows.iter().any(|r| r.team == "Manchester United"));
    assert!(rows.iter().any(|r| r.opponent == "Manchester Utd"));
}

#[test]
fn missing_file_is_an_error() {
    let path = std::env::temp_dir().join("pl_predictor_missing_matches.csv");
    let _ = fs::remove_file(&path);
    assert!(load_matches(&path).is_err());
}
