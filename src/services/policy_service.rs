use std::str::FromStr;
use std::sync::RwLock;

use serde_json::json;
use tracing::{info, warn};

use crate::db::repositories::settings_repository::{AppSettingRow, SettingsRepository};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::settings::{FairnessPolicy, FairnessPolicyUpdate};
use crate::services::time_utils;

const KEY_PREFIX: &str = "fairness.";
const KEY_VERSION: &str = "fairness.version";
const KEY_EXPECTED_MINIMUM: &str = "fairness.expected_minimum_score";
const KEY_FUZZY_TOLERANCE: &str = "fairness.fuzzy_tolerance_minutes";
const KEY_NOMINAL_MINUTES: &str = "fairness.nominal_match_minutes";
const KEY_BOOST_CAP: &str = "fairness.boost_cap";
const KEY_UNDERSERVED_RATIO: &str = "fairness.underserved_ratio";
const KEY_UNDERSERVED_BONUS: &str = "fairness.underserved_bonus";
const KEY_LEAGUE_TIMEZONE: &str = "fairness.league_timezone";

const MAX_SCORE: f64 = 3.0;
const MAX_TOLERANCE_MINUTES: i64 = 180;
const MIN_MATCH_MINUTES: i64 = 15;
const MAX_MATCH_MINUTES: i64 = 240;

/// Persisted fairness policy overrides, layered over `FairnessPolicy::default()`.
pub struct PolicyService {
    db: DbPool,
    cache: RwLock<Option<FairnessPolicy>>,
}

impl PolicyService {
    pub fn new(db: DbPool) -> Self {
        Self {
            db,
            cache: RwLock::new(None),
        }
    }

    pub fn get(&self) -> AppResult<FairnessPolicy> {
        if let Ok(guard) = self.cache.read() {
            if let Some(policy) = guard.as_ref() {
                return Ok(policy.clone());
            }
        }

        let policy = self.load_policy_from_db()?;
        self.store_cache(policy.clone());
        Ok(policy)
    }

    pub fn update(&self, input: FairnessPolicyUpdate) -> AppResult<FairnessPolicy> {
        let mut current = self.get()?;
        if input.is_empty() {
            return Ok(current);
        }

        if let Some(value) = input.expected_minimum_score {
            ensure_range("expectedMinimumScore", value, f64::MIN_POSITIVE, MAX_SCORE)?;
            current.expected_minimum_score = value;
        }

        if let Some(value) = input.fuzzy_tolerance_minutes {
            ensure_range("fuzzyToleranceMinutes", value, 0, MAX_TOLERANCE_MINUTES)?;
            current.fuzzy_tolerance_minutes = value;
        }

        if let Some(value) = input.nominal_match_minutes {
            ensure_range("nominalMatchMinutes", value, MIN_MATCH_MINUTES, MAX_MATCH_MINUTES)?;
            current.nominal_match_minutes = value;
        }

        if let Some(value) = input.boost_cap {
            ensure_range("boostCap", value, 1.0, f64::MAX)?;
            current.boost_cap = value;
        }

        if let Some(value) = input.underserved_ratio {
            ensure_range("underservedRatio", value, f64::MIN_POSITIVE, 1.0)?;
            current.underserved_ratio = value;
        }

        if let Some(value) = input.underserved_bonus {
            ensure_range("underservedBonus", value, 0.0, f64::MAX)?;
            current.underserved_bonus = value;
        }

        if let Some(value) = input.league_timezone.as_ref() {
            let trimmed = value.trim();
            time_utils::parse_timezone(trimmed)?;
            current.league_timezone = trimmed.to_string();
        }

        current.version += 1;
        self.persist(&current)?;
        info!(target: "app::settings", version = current.version, "fairness policy updated");

        self.store_cache(current.clone());
        Ok(current)
    }

    /// Drops every stored override. The version keeps counting up.
    pub fn reset(&self) -> AppResult<FairnessPolicy> {
        let policy = FairnessPolicy {
            version: self.get()?.version + 1,
            ..FairnessPolicy::default()
        };

        self.db.with_connection(|conn| {
            SettingsRepository::delete_prefixed(conn, KEY_PREFIX)?;
            SettingsRepository::upsert(conn, KEY_VERSION, &policy.version.to_string())
        })?;
        info!(target: "app::settings", version = policy.version, "fairness policy reset");

        self.store_cache(policy.clone());
        Ok(policy)
    }

    fn persist(&self, policy: &FairnessPolicy) -> AppResult<()> {
        let entries = [
            (KEY_VERSION, policy.version.to_string()),
            (KEY_EXPECTED_MINIMUM, policy.expected_minimum_score.to_string()),
            (KEY_FUZZY_TOLERANCE, policy.fuzzy_tolerance_minutes.to_string()),
            (KEY_NOMINAL_MINUTES, policy.nominal_match_minutes.to_string()),
            (KEY_BOOST_CAP, policy.boost_cap.to_string()),
            (KEY_UNDERSERVED_RATIO, policy.underserved_ratio.to_string()),
            (KEY_UNDERSERVED_BONUS, policy.underserved_bonus.to_string()),
            (KEY_LEAGUE_TIMEZONE, policy.league_timezone.clone()),
        ];

        self.db.with_connection(|conn| {
            for (key, value) in &entries {
                SettingsRepository::upsert(conn, key, value)?;
            }
            Ok(())
        })
    }

    fn load_policy_from_db(&self) -> AppResult<FairnessPolicy> {
        let rows = self
            .db
            .with_connection(|conn| SettingsRepository::list_prefixed(conn, KEY_PREFIX))?;

        let mut policy = FairnessPolicy::default();
        for row in rows {
            apply_row(&mut policy, &row);
        }
        Ok(policy)
    }

    fn store_cache(&self, policy: FairnessPolicy) {
        if let Ok(mut guard) = self.cache.write() {
            *guard = Some(policy);
        }
    }
}

fn apply_row(policy: &mut FairnessPolicy, row: &AppSettingRow) {
    let applied = match row.key.as_str() {
        KEY_VERSION => parse_into(&row.value, &mut policy.version),
        KEY_EXPECTED_MINIMUM => parse_into(&row.value, &mut policy.expected_minimum_score),
        KEY_FUZZY_TOLERANCE => parse_into(&row.value, &mut policy.fuzzy_tolerance_minutes),
        KEY_NOMINAL_MINUTES => parse_into(&row.value, &mut policy.nominal_match_minutes),
        KEY_BOOST_CAP => parse_into(&row.value, &mut policy.boost_cap),
        KEY_UNDERSERVED_RATIO => parse_into(&row.value, &mut policy.underserved_ratio),
        KEY_UNDERSERVED_BONUS => parse_into(&row.value, &mut policy.underserved_bonus),
        KEY_LEAGUE_TIMEZONE => {
            let ok = row.value.trim().parse::<chrono_tz::Tz>().is_ok();
            if ok {
                policy.league_timezone = row.value.trim().to_string();
            }
            ok
        }
        _ => {
            warn!(target: "app::settings", key = %row.key, "unknown fairness setting");
            return;
        }
    };

    if !applied {
        warn!(
            target: "app::settings",
            key = %row.key,
            value = %row.value,
            updated_at = %row.updated_at,
            "ignoring unreadable fairness setting"
        );
    }
}

fn parse_into<T: FromStr>(raw: &str, slot: &mut T) -> bool {
    match raw.trim().parse::<T>() {
        Ok(value) => {
            *slot = value;
            true
        }
        Err(_) => false,
    }
}

fn ensure_range<T>(field: &str, value: T, min: T, max: T) -> AppResult<()>
where
    T: PartialOrd + Copy + serde::Serialize,
{
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(AppError::validation_with_details(
            format!("{field} is out of range"),
            json!({"field": field, "value": value, "min": min, "max": max}),
        ))
    }
}
