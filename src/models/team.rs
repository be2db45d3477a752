use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::models::venue::VenueId;

pub type TeamId = i64;

/// Team read model as stored by the team-management side.
///
/// `preferred_play_moments` is kept as loosely-typed JSON; it only becomes
/// trustworthy after it passes through the preference normalizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub team_id: TeamId,
    pub team_name: String,
    #[serde(default)]
    pub preferred_play_moments: Option<PreferredPlayMoments>,
}

impl Team {
    pub fn new(team_id: TeamId, team_name: impl Into<String>) -> Self {
        Self {
            team_id,
            team_name: team_name.into(),
            preferred_play_moments: None,
        }
    }

    pub fn with_preferences(mut self, payload: JsonValue) -> Self {
        self.preferred_play_moments = Some(PreferredPlayMoments(payload));
        self
    }
}

/// Raw preference payload exactly as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct PreferredPlayMoments(pub JsonValue);

impl PreferredPlayMoments {
    pub fn as_value(&self) -> &JsonValue {
        &self.0
    }
}

/// Canonical per-team preferences. A dimension is `None` when the team did
/// not constrain it; an empty set is never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPreferences {
    #[serde(default)]
    pub days: Option<BTreeSet<u8>>,
    #[serde(default)]
    pub timeslots: Option<BTreeSet<String>>,
    #[serde(default)]
    pub venues: Option<BTreeSet<VenueId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NormalizedPreferences {
    pub fn new(
        days: BTreeSet<u8>,
        timeslots: BTreeSet<String>,
        venues: BTreeSet<VenueId>,
    ) -> Self {
        Self {
            days: non_empty(days),
            timeslots: non_empty(timeslots),
            venues: non_empty(venues),
            notes: None,
        }
    }

    /// Number of configured dimensions, 0..=3.
    pub fn preference_count(&self) -> usize {
        [
            self.days.is_some(),
            self.timeslots.is_some(),
            self.venues.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    pub fn is_unconstrained(&self) -> bool {
        self.preference_count() == 0
    }
}

fn non_empty<T: Ord>(set: BTreeSet<T>) -> Option<BTreeSet<T>> {
    if set.is_empty() {
        None
    } else {
        Some(set)
    }
}
