//! Boundary between the loosely-typed stored preference payloads and the
//! strict `NormalizedPreferences` value used by the scorer.
//!
//! Nothing in here fails: unknown keys, unrecognized day names, non-numeric
//! venue ids and malformed payloads all collapse to "no preference".

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::debug;

use crate::models::team::{NormalizedPreferences, PreferredPlayMoments, Team, TeamId};
use crate::models::venue::VenueId;

const DAY_KEYS: [&str; 3] = ["days", "preferredDays", "preferred_days"];
const TIMESLOT_KEYS: [&str; 3] = ["timeslots", "preferredTimeslots", "preferred_timeslots"];
const VENUE_KEYS: [&str; 3] = ["venues", "preferredVenues", "preferred_venues"];
const NOTES_KEYS: [&str; 1] = ["notes"];

const DAY_NAMES: [(&str, u8); 35] = [
    ("maandag", 1),
    ("dinsdag", 2),
    ("woensdag", 3),
    ("donderdag", 4),
    ("vrijdag", 5),
    ("zaterdag", 6),
    ("zondag", 7),
    ("ma", 1),
    ("di", 2),
    ("wo", 3),
    ("do", 4),
    ("vr", 5),
    ("za", 6),
    ("zo", 7),
    ("monday", 1),
    ("tuesday", 2),
    ("wednesday", 3),
    ("thursday", 4),
    ("friday", 5),
    ("saturday", 6),
    ("sunday", 7),
    ("mon", 1),
    ("tue", 2),
    ("wed", 3),
    ("thu", 4),
    ("fri", 5),
    ("sat", 6),
    ("sun", 7),
    ("mo", 1),
    ("tu", 2),
    ("we", 3),
    ("th", 4),
    ("fr", 5),
    ("sa", 6),
    ("su", 7),
];

/// Keyed by team id; when an id repeats, the first listed team wins.
pub fn normalize(raw_teams: &[Team]) -> HashMap<TeamId, NormalizedPreferences> {
    let mut normalized = HashMap::with_capacity(raw_teams.len());
    for team in raw_teams {
        if normalized.contains_key(&team.team_id) {
            debug!(target: "app::fairness", team_id = team.team_id, "duplicate team ignored");
            continue;
        }
        let prefs = normalize_preferences(team.preferred_play_moments.as_ref());
        debug!(
            target: "app::fairness",
            team_id = team.team_id,
            dimensions = prefs.preference_count(),
            "normalized team preferences"
        );
        normalized.insert(team.team_id, prefs);
    }
    normalized
}

pub fn normalize_preferences(raw: Option<&PreferredPlayMoments>) -> NormalizedPreferences {
    let Some(raw) = raw else {
        return NormalizedPreferences::default();
    };

    match raw.as_value() {
        JsonValue::Object(map) => normalize_object(map),
        // Some rows hold the payload JSON-encoded a second time.
        JsonValue::String(encoded) => match serde_json::from_str::<JsonValue>(encoded) {
            Ok(JsonValue::Object(map)) => normalize_object(&map),
            _ => NormalizedPreferences::default(),
        },
        _ => NormalizedPreferences::default(),
    }
}

fn normalize_object(map: &JsonMap<String, JsonValue>) -> NormalizedPreferences {
    let days: BTreeSet<u8> = entries(map, &DAY_KEYS)
        .into_iter()
        .filter_map(parse_day)
        .collect();

    let timeslots: BTreeSet<String> = entries(map, &TIMESLOT_KEYS)
        .into_iter()
        .filter_map(|value| value.as_str())
        .map(|label| label.trim().to_lowercase())
        .filter(|label| !label.is_empty())
        .collect();

    let venues: BTreeSet<VenueId> = entries(map, &VENUE_KEYS)
        .into_iter()
        .filter_map(parse_venue_id)
        .collect();

    let notes = lookup(map, &NOTES_KEYS)
        .and_then(|value| value.as_str())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    NormalizedPreferences {
        notes,
        ..NormalizedPreferences::new(days, timeslots, venues)
    }
}

fn lookup<'a>(map: &'a JsonMap<String, JsonValue>, keys: &[&str]) -> Option<&'a JsonValue> {
    keys.iter().find_map(|key| map.get(*key))
}

/// Values listed under the first matching key; a lone scalar counts as a
/// one-element list.
fn entries<'a>(map: &'a JsonMap<String, JsonValue>, keys: &[&str]) -> Vec<&'a JsonValue> {
    match lookup(map, keys) {
        Some(JsonValue::Array(items)) => items.iter().collect(),
        Some(JsonValue::Null) | None => Vec::new(),
        Some(scalar) => vec![scalar],
    }
}

fn parse_day(value: &JsonValue) -> Option<u8> {
    match value {
        JsonValue::Number(_) => integral(value).and_then(day_in_range),
        JsonValue::String(raw) => {
            let token = raw.trim().to_lowercase();
            if let Ok(number) = token.parse::<i64>() {
                return day_in_range(number);
            }
            DAY_NAMES
                .iter()
                .find(|(name, _)| *name == token)
                .map(|(_, code)| *code)
        }
        _ => None,
    }
}

fn day_in_range(value: i64) -> Option<u8> {
    if (1..=7).contains(&value) {
        Some(value as u8)
    } else {
        None
    }
}

fn parse_venue_id(value: &JsonValue) -> Option<VenueId> {
    let id = match value {
        JsonValue::Number(_) => integral(value)?,
        JsonValue::String(raw) => raw.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (id > 0).then_some(id)
}

fn integral(value: &JsonValue) -> Option<i64> {
    if let Some(number) = value.as_i64() {
        return Some(number);
    }
    value
        .as_f64()
        .filter(|number| number.fract() == 0.0 && number.is_finite())
        .map(|number| number as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prefs(payload: JsonValue) -> NormalizedPreferences {
        normalize_preferences(Some(&PreferredPlayMoments(payload)))
    }

    #[test]
    fn day_tokens_in_several_locales_collapse_to_iso_codes() {
        let normalized = prefs(json!({
            "days": [1, "3", "Vrijdag", " za ", "sunday", "Tue", 9, "someday", true]
        }));
        let days: Vec<u8> = normalized.days.expect("days").into_iter().collect();
        assert_eq!(days, vec![1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn timeslots_are_trimmed_and_lowercased_only() {
        let normalized = prefs(json!({"timeslots": [" 19:00 ", "Avond", "", 1900]}));
        let slots: Vec<String> = normalized.timeslots.expect("timeslots").into_iter().collect();
        assert_eq!(slots, vec!["19:00".to_string(), "avond".to_string()]);
    }

    #[test]
    fn venue_ids_must_be_numeric() {
        let normalized = prefs(json!({"venues": [5, "7", 3.0, "Dageraad", -2, null]}));
        let venues: Vec<VenueId> = normalized.venues.expect("venues").into_iter().collect();
        assert_eq!(venues, vec![3, 5, 7]);
    }

    #[test]
    fn empty_dimensions_are_absent_not_match_nothing() {
        let normalized = prefs(json!({
            "days": [],
            "timeslots": ["  "],
            "venues": ["unknown"],
            "notes": "liefst niet op vrijdag"
        }));
        assert!(normalized.days.is_none());
        assert!(normalized.timeslots.is_none());
        assert!(normalized.venues.is_none());
        assert_eq!(normalized.preference_count(), 0);
        assert_eq!(normalized.notes.as_deref(), Some("liefst niet op vrijdag"));
    }

    #[test]
    fn alternate_keys_scalars_and_encoded_payloads_are_understood() {
        let normalized = prefs(json!({"preferredDays": "maandag", "preferred_venues": 4}));
        assert_eq!(normalized.preference_count(), 2);

        let encoded = prefs(JsonValue::String(r#"{"days":["wo"]}"#.to_string()));
        assert_eq!(
            encoded.days.expect("days").into_iter().collect::<Vec<_>>(),
            vec![3]
        );
    }

    #[test]
    fn malformed_payloads_degrade_to_no_preference() {
        assert_eq!(normalize_preferences(None).preference_count(), 0);
        assert_eq!(prefs(json!([1, 2, 3])).preference_count(), 0);
        assert_eq!(prefs(JsonValue::String("{not json".into())).preference_count(), 0);
        assert_eq!(prefs(json!({"days": {"monday": true}})).preference_count(), 0);
    }

    #[test]
    fn normalize_keys_results_by_team() {
        let teams = vec![
            Team::new(1, "Zaal Oost").with_preferences(json!({"days": [2]})),
            Team::new(2, "Futsal West"),
        ];
        let map = normalize(&teams);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&1].preference_count(), 1);
        assert_eq!(map[&2].preference_count(), 0);
    }

    #[test]
    fn repeated_team_ids_keep_first_payload() {
        let teams = vec![
            Team::new(4, "Zaal Oost").with_preferences(json!({"days": ["ma"]})),
            Team::new(4, "Zaal Oost (kopie)")
                .with_preferences(json!({"days": ["za"], "venues": [3]})),
        ];
        let map = normalize(&teams);
        assert_eq!(map.len(), 1);
        let days: Vec<u8> = map[&4].days.clone().expect("days").into_iter().collect();
        assert_eq!(days, vec![1]);
        assert!(map[&4].venues.is_none());
    }
}
