use serde::{Deserialize, Serialize};

use crate::models::team::TeamId;

/// Outcome of scoring one team against one slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlotScore {
    pub score: f64,
    pub matched_dimensions: usize,
    pub provided_dimensions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamSeasonalFairness {
    pub team_id: TeamId,
    pub total_matches: u32,
    pub cumulative_score: f64,
    pub average_score: f64,
    pub expected_minimum_score: f64,
    pub fairness_deficit: f64,
}

impl TeamSeasonalFairness {
    pub fn has_played(&self) -> bool {
        self.total_matches > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalFairnessMetrics {
    pub overall_average: f64,
    pub standard_deviation: f64,
    pub min_score: f64,
    pub max_score: f64,
    pub fairness_score: f64,
    pub teams_needing_boost: Vec<TeamId>,
    pub recommendations: Vec<String>,
}

/// Pure output of one fairness computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalFairnessResult {
    pub metrics: SeasonalFairnessMetrics,
    pub per_team: Vec<TeamSeasonalFairness>,
}

impl SeasonalFairnessResult {
    pub fn team(&self, team_id: TeamId) -> Option<&TeamSeasonalFairness> {
        self.per_team.iter().find(|entry| entry.team_id == team_id)
    }
}

/// Fairness result as handed to administrators and the external scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalFairnessReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    pub policy_version: u32,
    pub input_digest: String,
    pub qualifying_matches: usize,
    #[serde(flatten)]
    pub result: SeasonalFairnessResult,
}
