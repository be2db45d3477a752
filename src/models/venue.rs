use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub type VenueId = i64;

const VENUE_PREFIX: &str = "sporthal ";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: VenueId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub venue_name: Option<String>,
}

/// Lookup table from normalized venue names to ids.
///
/// Both name columns of every venue are indexed. When two venues normalize
/// to the same name, the one listed first wins.
#[derive(Debug, Clone, Default)]
pub struct VenueDirectory {
    by_name: HashMap<String, VenueId>,
}

impl VenueDirectory {
    pub fn new(venues: &[Venue]) -> Self {
        let mut by_name = HashMap::new();
        for venue in venues {
            for raw in [venue.name.as_deref(), venue.venue_name.as_deref()]
                .into_iter()
                .flatten()
            {
                let key = normalize_venue_name(raw);
                if !key.is_empty() {
                    by_name.entry(key).or_insert(venue.id);
                }
            }
        }
        Self { by_name }
    }

    pub fn resolve(&self, venue_name: &str) -> Option<VenueId> {
        let key = normalize_venue_name(venue_name);
        if key.is_empty() {
            return None;
        }
        self.by_name.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Lowercases, collapses whitespace and drops a leading "Sporthal " token.
pub fn normalize_venue_name(raw: &str) -> String {
    let collapsed = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    match collapsed.strip_prefix(VENUE_PREFIX) {
        Some(rest) => rest.to_string(),
        None => collapsed,
    }
}
