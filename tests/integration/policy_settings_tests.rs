use chrono::NaiveTime;
use league_fairness_lib::db::repositories::team_repository::TeamRepository;
use league_fairness_lib::db::repositories::venue_repository::VenueRepository;
use league_fairness_lib::error::{AppError, AppResult};
use league_fairness_lib::models::fixture::MatchSlot;
use league_fairness_lib::models::settings::{FairnessPolicy, FairnessPolicyUpdate};
use league_fairness_lib::models::team::Team;
use league_fairness_lib::models::venue::Venue;
use league_fairness_lib::services::policy_service::PolicyService;
use league_fairness_lib::utils::logger::init_logging;
use league_fairness_lib::AppState;
use serde_json::json;
use tempfile::tempdir;

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

#[test]
fn updates_persist_and_bump_version() -> AppResult<()> {
    let dir = tempdir().expect("temp dir");
    let state = AppState::open(&dir.path().join("policy.sqlite"))?;

    let updated = state.policy().update(FairnessPolicyUpdate {
        expected_minimum_score: Some(2.0),
        boost_cap: Some(3.0),
        league_timezone: Some(" Europe/Amsterdam ".to_string()),
        ..Default::default()
    })?;
    assert_eq!(updated.version, 2);
    assert_eq!(updated.league_timezone, "Europe/Amsterdam");

    // A fresh service reads the stored overrides back.
    let reloaded = PolicyService::new(state.db().clone()).get()?;
    assert_eq!(reloaded, updated);
    assert_eq!(reloaded.fuzzy_tolerance_minutes, 30);

    let unchanged = state.policy().update(FairnessPolicyUpdate::default())?;
    assert_eq!(unchanged.version, 2);
    Ok(())
}

#[test]
fn invalid_values_are_rejected_without_side_effects() -> AppResult<()> {
    let dir = tempdir().expect("temp dir");
    let state = AppState::open(&dir.path().join("policy.sqlite"))?;
    let policy = state.policy();

    let err = policy
        .update(FairnessPolicyUpdate {
            fuzzy_tolerance_minutes: Some(-5),
            ..Default::default()
        })
        .expect_err("negative tolerance");
    match err {
        AppError::Validation { details, .. } => {
            let details = details.expect("validation details");
            assert_eq!(details["field"], json!("fuzzyToleranceMinutes"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = policy
        .update(FairnessPolicyUpdate {
            league_timezone: Some("Mars/Olympus".to_string()),
            ..Default::default()
        })
        .expect_err("unknown timezone");
    assert!(matches!(err, AppError::Validation { .. }));

    assert_eq!(policy.get()?, FairnessPolicy::default());
    assert_eq!(PolicyService::new(state.db().clone()).get()?, FairnessPolicy::default());
    Ok(())
}

#[test]
fn tolerance_change_reaches_slot_scoring() -> AppResult<()> {
    let dir = tempdir().expect("temp dir");
    let state = AppState::open(&dir.path().join("policy.sqlite"))?;

    state.db().with_connection(|conn| {
        TeamRepository::insert(
            conn,
            &Team::new(1, "Early Birds").with_preferences(json!({"timeslots": ["19:00"]})),
        )?;
        VenueRepository::insert(
            conn,
            &Venue {
                id: 1,
                name: Some("Sporthal Dageraad".to_string()),
                venue_name: None,
            },
        )
    })?;

    let slot = MatchSlot::new(3, hm(19, 15), hm(20, 45), "Dageraad");
    assert_eq!(state.fairness().score_slot(1, &slot)?.score, 3.0);

    state.policy().update(FairnessPolicyUpdate {
        fuzzy_tolerance_minutes: Some(10),
        ..Default::default()
    })?;
    assert_eq!(state.fairness().score_slot(1, &slot)?.score, 0.0);

    let restored = state.policy().reset()?;
    assert_eq!(
        restored,
        FairnessPolicy {
            version: 3,
            ..FairnessPolicy::default()
        }
    );
    assert_eq!(state.fairness().score_slot(1, &slot)?.score, 3.0);
    Ok(())
}

#[test]
fn logging_initializes_once() -> AppResult<()> {
    let dir = tempdir().expect("temp dir");
    let log_dir = dir.path().join("logs");
    init_logging(&log_dir)?;
    init_logging(&log_dir)?;
    assert!(log_dir.is_dir());
    Ok(())
}
