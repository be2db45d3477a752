use crate::models::fairness::SlotScore;
use crate::models::fixture::MatchSlot;
use crate::models::settings::{FairnessPolicy, DEFAULT_FUZZY_TOLERANCE_MINUTES};
use crate::models::team::NormalizedPreferences;
use crate::models::venue::VenueDirectory;
use crate::services::time_utils;

/// Score given to teams that never stated a preference.
pub const NO_PREFERENCE_SCORE: f64 = 3.0;

/// Fixed (provided, matched) -> score policy table. Deliberately not a
/// linear scale; change it only together with the league's fairness policy.
pub fn lookup_score(provided: usize, matched: usize) -> f64 {
    match (provided, matched) {
        (1, 1) => 3.0,
        (2, 2) => 3.0,
        (2, 1) => 1.5,
        (3, 3) => 3.0,
        (3, 2) => 2.0,
        (3, 1) => 1.0,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SlotScorer {
    fuzzy_tolerance_minutes: i64,
}

impl Default for SlotScorer {
    fn default() -> Self {
        Self {
            fuzzy_tolerance_minutes: DEFAULT_FUZZY_TOLERANCE_MINUTES,
        }
    }
}

impl SlotScorer {
    pub fn new(fuzzy_tolerance_minutes: i64) -> Self {
        Self {
            fuzzy_tolerance_minutes: fuzzy_tolerance_minutes.max(0),
        }
    }

    pub fn from_policy(policy: &FairnessPolicy) -> Self {
        Self::new(policy.fuzzy_tolerance_minutes)
    }

    pub fn score(
        &self,
        prefs: Option<&NormalizedPreferences>,
        slot: &MatchSlot,
        venues: &VenueDirectory,
    ) -> SlotScore {
        let prefs = match prefs {
            Some(prefs) if !prefs.is_unconstrained() => prefs,
            _ => {
                return SlotScore {
                    score: NO_PREFERENCE_SCORE,
                    matched_dimensions: 0,
                    provided_dimensions: 0,
                }
            }
        };

        let provided = prefs.preference_count();
        let matched = [
            self.day_matches(prefs, slot),
            self.timeslot_matches(prefs, slot),
            self.venue_matches(prefs, slot, venues),
        ]
        .iter()
        .filter(|hit| **hit)
        .count();

        SlotScore {
            score: lookup_score(provided, matched),
            matched_dimensions: matched,
            provided_dimensions: provided,
        }
    }

    fn day_matches(&self, prefs: &NormalizedPreferences, slot: &MatchSlot) -> bool {
        prefs
            .days
            .as_ref()
            .is_some_and(|days| days.contains(&slot.day_of_week))
    }

    fn timeslot_matches(&self, prefs: &NormalizedPreferences, slot: &MatchSlot) -> bool {
        let Some(labels) = prefs.timeslots.as_ref() else {
            return false;
        };
        let Some(start) = slot.start_time else {
            return false;
        };

        let exact = [slot.start_label(), slot.composite_label()]
            .into_iter()
            .flatten()
            .any(|label| labels.contains(&label));
        if exact {
            return true;
        }

        labels
            .iter()
            .filter_map(|label| time_utils::parse_clock_label(label))
            .any(|preferred| {
                time_utils::within_minutes(start, preferred, self.fuzzy_tolerance_minutes)
            })
    }

    fn venue_matches(
        &self,
        prefs: &NormalizedPreferences,
        slot: &MatchSlot,
        venues: &VenueDirectory,
    ) -> bool {
        let Some(preferred) = prefs.venues.as_ref() else {
            return false;
        };
        let Some(name) = slot.venue_name.as_deref() else {
            return false;
        };
        venues
            .resolve(name)
            .is_some_and(|id| preferred.contains(&id))
    }
}
