use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use league_fairness_lib::db::repositories::match_repository::{MatchRepository, MatchRow};
use league_fairness_lib::db::repositories::team_repository::TeamRepository;
use league_fairness_lib::db::repositories::venue_repository::VenueRepository;
use league_fairness_lib::db::DbPool;
use league_fairness_lib::error::AppError;
use league_fairness_lib::models::fixture::{MatchRecord, MatchSlot};
use league_fairness_lib::models::team::Team;
use league_fairness_lib::models::venue::Venue;
use league_fairness_lib::services::diagnostics::{FairnessEvent, MemoryEventSink};
use league_fairness_lib::services::season_fairness_service::render_markdown_report;
use league_fairness_lib::services::seasonal_fairness::SEASON_NOT_STARTED;
use league_fairness_lib::AppState;
use serde_json::json;
use tempfile::{tempdir, TempDir};

const SEASON: &str = "2024-2025";

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

fn fixture(
    id: i64,
    home: i64,
    away: i64,
    date: (i32, u32, u32),
    kickoff: (u32, u32),
    location: &str,
    season: &str,
) -> MatchRecord {
    MatchRecord {
        id,
        home_team_id: Some(home),
        away_team_id: Some(away),
        match_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).expect("valid date"),
        kickoff_time: Some(hm(kickoff.0, kickoff.1)),
        location: Some(location.to_string()),
        season: Some(season.to_string()),
        is_cup: false,
        is_playoff: false,
    }
}

fn seeded_state() -> (AppState, Arc<MemoryEventSink>, TempDir) {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("league.sqlite")).expect("db pool");
    let sink = Arc::new(MemoryEventSink::new());
    let state = AppState::with_sink(pool.clone(), sink.clone());

    pool.with_connection(|conn| {
        TeamRepository::insert(
            conn,
            &Team::new(1, "ZVC Dageraad").with_preferences(json!({
                "days": ["maandag"],
                "timeslots": ["19:00"],
                "venues": [5],
                "notes": "geen zaterdag"
            })),
        )?;
        TeamRepository::insert(conn, &Team::new(2, "Futsal Elders"))?;
        TeamRepository::insert(conn, &Team::new(3, "Rode Duivels"))?;
        TeamRepository::set_raw_preferences(conn, 3, Some("{days: maandag"))?;

        VenueRepository::insert(
            conn,
            &Venue {
                id: 5,
                name: Some("Sporthal Dageraad".to_string()),
                venue_name: None,
            },
        )?;
        VenueRepository::insert(
            conn,
            &Venue {
                id: 7,
                name: None,
                venue_name: Some("Sporthal Elders".to_string()),
            },
        )?;

        // Monday 19:15 at the preferred hall.
        let preferred = fixture(1, 1, 2, (2024, 9, 2), (19, 15), "Sporthal Dageraad", SEASON);
        MatchRepository::insert(conn, &preferred)?;
        // Tuesday 21:00 elsewhere.
        let elsewhere = fixture(2, 2, 1, (2024, 9, 10), (21, 0), "Elders", SEASON);
        MatchRepository::insert(conn, &elsewhere)?;
        let mut cup = fixture(3, 1, 3, (2024, 9, 12), (20, 0), "Elders", SEASON);
        cup.is_cup = true;
        MatchRepository::insert(conn, &cup)?;
        // Monday 2024-09-16, 17:00 UTC is 19:00 in Brussels.
        MatchRepository::insert_row(
            conn,
            &MatchRow {
                id: 4,
                home_team_id: Some(3),
                away_team_id: Some(1),
                match_date: "2024-09-16T17:00:00Z".to_string(),
                location: Some("sporthal  dageraad".to_string()),
                season: Some(SEASON.to_string()),
                is_cup: false,
                is_playoff: false,
            },
        )?;
        let last_season = fixture(5, 1, 2, (2023, 9, 5), (22, 0), "Elders", "2023-2024");
        MatchRepository::insert(conn, &last_season)?;
        Ok(())
    })
    .expect("seed league");

    (state, sink, dir)
}

#[test]
fn season_report_scores_each_side_and_flags_underserved_teams() {
    let (state, _sink, _dir) = seeded_state();
    let report = state
        .fairness()
        .compute_season(Some(SEASON))
        .expect("season report");

    assert_eq!(report.season.as_deref(), Some(SEASON));
    assert_eq!(report.qualifying_matches, 3);
    assert_eq!(report.policy_version, 1);

    let picky = report.result.team(1).expect("team 1");
    assert_eq!(picky.total_matches, 3);
    assert!((picky.cumulative_score - 6.0).abs() < 1e-9);
    assert!((picky.average_score - 2.0).abs() < 1e-9);
    assert_eq!(picky.fairness_deficit, 0.0);

    let open = report.result.team(2).expect("team 2");
    assert_eq!(open.total_matches, 2);
    assert!((open.average_score - 3.0).abs() < 1e-9);

    // Unreadable preferences count as none.
    let unreadable = report.result.team(3).expect("team 3");
    assert_eq!(unreadable.total_matches, 1);
    assert!((unreadable.average_score - 3.0).abs() < 1e-9);

    let metrics = &report.result.metrics;
    assert_eq!(metrics.teams_needing_boost, vec![1]);
    assert_eq!(metrics.min_score, 2.0);
    assert_eq!(metrics.max_score, 3.0);
    assert!((metrics.fairness_score - 90.0).abs() < 1e-9);
    assert!((metrics.overall_average - 8.0 / 3.0).abs() < 1e-9);

    let markdown = render_markdown_report(&report);
    assert!(markdown.contains("Fairness score: 90.0 / 100"));
    assert!(markdown.contains("| 1 | 3 | 2.00 | 0.00 | yes |"));
}

#[test]
fn recomputation_is_idempotent() {
    let (state, _sink, _dir) = seeded_state();
    let service = state.fairness();
    let first = service.compute_season(Some(SEASON)).expect("first");
    let second = service.compute_season(Some(SEASON)).expect("second");
    assert_eq!(first, second);
    assert!(!first.input_digest.is_empty());
}

#[test]
fn boost_follows_season_results() {
    let (state, _sink, _dir) = seeded_state();
    let service = state.fairness();

    // 2.0 is below 80% of the 2.67 league average.
    assert!((service.boost_for_team(1, Some(SEASON)).expect("boost") - 1.5).abs() < 1e-9);
    assert!((service.boost_for_team(2, Some(SEASON)).expect("boost") - 1.0).abs() < 1e-9);
    assert_eq!(service.boost_for_team(42, Some(SEASON)).expect("boost"), 0.0);
}

#[test]
fn empty_season_returns_baseline() {
    let (state, _sink, _dir) = seeded_state();
    let report = state
        .fairness()
        .compute_season(Some("2030-2031"))
        .expect("baseline report");

    assert_eq!(report.qualifying_matches, 0);
    assert_eq!(report.result.metrics.fairness_score, 100.0);
    assert_eq!(
        report.result.metrics.recommendations,
        vec![SEASON_NOT_STARTED.to_string()]
    );
    assert_eq!(report.result.per_team.len(), 3);
}

#[test]
fn candidate_slots_fall_back_when_nothing_fits() {
    let (state, sink, _dir) = seeded_state();
    let service = state.fairness();

    let saturday_morning = vec![
        MatchSlot::new(6, hm(10, 0), hm(11, 30), "Sporthal Elders"),
        MatchSlot::new(6, hm(12, 0), hm(13, 30), "Elders"),
    ];
    let scores = service
        .score_candidate_slots(1, &saturday_morning)
        .expect("scores");
    assert_eq!(scores, vec![3.0, 3.0]);
    assert_eq!(
        sink.events(),
        vec![FairnessEvent::AdaptiveFallbackApplied {
            team_id: 1,
            series_len: 2
        }]
    );

    let mixed = vec![
        MatchSlot::new(1, hm(18, 45), hm(20, 15), "Dageraad"),
        MatchSlot::new(6, hm(10, 0), hm(11, 30), "Elders"),
    ];
    let scores = service.score_candidate_slots(1, &mixed).expect("scores");
    assert_eq!(scores, vec![3.0, 0.0]);
    assert_eq!(sink.events().len(), 1);
}

#[test]
fn ad_hoc_scoring_requires_known_team() {
    let (state, _sink, _dir) = seeded_state();
    let service = state.fairness();

    let slot = MatchSlot::new(2, hm(19, 15), hm(20, 45), "Dageraad");
    let score = service.score_slot(1, &slot).expect("score");
    assert_eq!(score.score, 2.0);
    assert_eq!(score.matched_dimensions, 2);
    assert_eq!(score.provided_dimensions, 3);

    let err = service.score_slot(404, &slot).expect_err("unknown team");
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn async_wrapper_matches_blocking_computation() {
    let (state, _sink, _dir) = seeded_state();
    let blocking = state
        .fairness()
        .compute_season(Some(SEASON))
        .expect("blocking");
    let asynchronous = state
        .fairness()
        .compute_season_async(Some(SEASON.to_string()))
        .await
        .expect("async");
    assert_eq!(blocking, asynchronous);
}
