use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::models::fairness::{
    SeasonalFairnessMetrics, SeasonalFairnessResult, TeamSeasonalFairness,
};
use crate::models::fixture::MatchRecord;
use crate::models::settings::{
    FairnessPolicy, DEFAULT_EXPECTED_MINIMUM_SCORE, DEFAULT_NOMINAL_MATCH_MINUTES,
};
use crate::models::team::{Team, TeamId};
use crate::models::venue::{Venue, VenueDirectory};
use crate::services::preference_normalizer;
use crate::services::slot_scorer::SlotScorer;

const MAX_SPREAD_PENALTY: f64 = 50.0;
const SPREAD_PENALTY_FACTOR: f64 = 10.0;
const MAX_DEFICIT_PENALTY: f64 = 50.0;
const DEFICIT_PENALTY_FACTOR: f64 = 5.0;
const HIGH_SPREAD_THRESHOLD: f64 = 0.5;
const BELOW_PAR_SHARE_THRESHOLD: f64 = 0.5;
const AVERAGE_EPSILON: f64 = 1e-9;

pub const SEASON_NOT_STARTED: &str =
    "Season has not started: there are no regular-season matches to evaluate yet.";

/// Mean, population standard deviation and range of a set of averages.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreDistribution {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Returns all zeros for an empty slice.
pub fn distribution(values: &[f64]) -> ScoreDistribution {
    if values.is_empty() {
        return ScoreDistribution::default();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    ScoreDistribution {
        mean,
        std_dev: variance.sqrt(),
        min,
        max,
    }
}

/// League-wide average over teams that played at least one qualifying match.
pub fn overall_average(per_team: &[TeamSeasonalFairness]) -> f64 {
    let averages: Vec<f64> = per_team
        .iter()
        .filter(|entry| entry.has_played())
        .map(|entry| entry.average_score)
        .collect();
    distribution(&averages).mean
}

#[derive(Debug, Clone, Copy)]
pub struct SeasonalFairnessAggregator {
    scorer: SlotScorer,
    expected_minimum_score: f64,
    nominal_match_minutes: i64,
}

impl Default for SeasonalFairnessAggregator {
    fn default() -> Self {
        Self {
            scorer: SlotScorer::default(),
            expected_minimum_score: DEFAULT_EXPECTED_MINIMUM_SCORE,
            nominal_match_minutes: DEFAULT_NOMINAL_MATCH_MINUTES,
        }
    }
}

impl SeasonalFairnessAggregator {
    pub fn from_policy(policy: &FairnessPolicy) -> Self {
        Self {
            scorer: SlotScorer::from_policy(policy),
            expected_minimum_score: policy.expected_minimum_score,
            nominal_match_minutes: policy.nominal_match_minutes,
        }
    }

    /// Regular-season matches with both sides assigned.
    pub fn qualifying<'a>(matches: &'a [MatchRecord]) -> impl Iterator<Item = &'a MatchRecord> {
        matches
            .iter()
            .filter(|record| record.is_regular_season() && record.participants().is_some())
    }

    pub fn compute(
        &self,
        teams: &[Team],
        matches: &[MatchRecord],
        venues: &[Venue],
    ) -> SeasonalFairnessResult {
        let roster = unique_roster(teams);
        let qualifying: Vec<&MatchRecord> = Self::qualifying(matches).collect();

        if qualifying.is_empty() {
            debug!(target: "app::fairness", teams = roster.len(), "no qualifying matches");
            return self.baseline(&roster);
        }

        let preferences = preference_normalizer::normalize(teams);
        let directory = VenueDirectory::new(venues);

        let mut totals: BTreeMap<TeamId, (f64, u32)> =
            roster.iter().map(|id| (*id, (0.0, 0))).collect();

        for record in qualifying {
            let Some((home, away)) = record.participants() else {
                continue;
            };
            let slot = record.to_slot(self.nominal_match_minutes);

            for team_id in [home, away] {
                match totals.get_mut(&team_id) {
                    Some((cumulative, count)) => {
                        let result =
                            self.scorer.score(preferences.get(&team_id), &slot, &directory);
                        *cumulative += result.score;
                        *count += 1;
                    }
                    None => {
                        debug!(
                            target: "app::fairness",
                            match_id = record.id,
                            team_id,
                            "match side is not part of the roster"
                        );
                    }
                }
            }
        }

        let per_team: Vec<TeamSeasonalFairness> = roster
            .iter()
            .map(|team_id| {
                let (cumulative, count) = totals.get(team_id).copied().unwrap_or((0.0, 0));
                self.team_entry(*team_id, cumulative, count)
            })
            .collect();

        let metrics = self.metrics(&per_team);
        SeasonalFairnessResult { metrics, per_team }
    }

    fn team_entry(&self, team_id: TeamId, cumulative: f64, count: u32) -> TeamSeasonalFairness {
        let (average, deficit) = if count > 0 {
            let average = cumulative / count as f64;
            (average, (self.expected_minimum_score - average).max(0.0))
        } else {
            (0.0, 0.0)
        };

        TeamSeasonalFairness {
            team_id,
            total_matches: count,
            cumulative_score: cumulative,
            average_score: average,
            expected_minimum_score: self.expected_minimum_score,
            fairness_deficit: deficit,
        }
    }

    fn metrics(&self, per_team: &[TeamSeasonalFairness]) -> SeasonalFairnessMetrics {
        let played: Vec<&TeamSeasonalFairness> =
            per_team.iter().filter(|entry| entry.has_played()).collect();
        let averages: Vec<f64> = played.iter().map(|entry| entry.average_score).collect();
        let stats = distribution(&averages);

        let total_deficit: f64 = per_team.iter().map(|entry| entry.fairness_deficit).sum();
        let spread_penalty =
            ((stats.max - stats.min) * SPREAD_PENALTY_FACTOR).min(MAX_SPREAD_PENALTY);
        let deficit_penalty = (total_deficit * DEFICIT_PENALTY_FACTOR).min(MAX_DEFICIT_PENALTY);
        let fairness_score = (100.0 - spread_penalty - deficit_penalty).clamp(0.0, 100.0);

        // Idle teams average 0 and are listed once anyone has played.
        let teams_needing_boost: Vec<TeamId> = if played.is_empty() {
            Vec::new()
        } else {
            per_team
                .iter()
                .filter(|entry| {
                    entry.average_score < stats.mean - AVERAGE_EPSILON
                        || entry.fairness_deficit > 0.0
                })
                .map(|entry| entry.team_id)
                .collect()
        };

        let below_minimum = per_team
            .iter()
            .filter(|entry| entry.fairness_deficit > 0.0)
            .count();

        let recommendations = self.recommendations(
            &stats,
            total_deficit,
            below_minimum,
            teams_needing_boost.len(),
            played.len(),
        );

        SeasonalFairnessMetrics {
            overall_average: stats.mean,
            standard_deviation: stats.std_dev,
            min_score: stats.min,
            max_score: stats.max,
            fairness_score,
            teams_needing_boost,
            recommendations,
        }
    }

    fn recommendations(
        &self,
        stats: &ScoreDistribution,
        total_deficit: f64,
        below_minimum: usize,
        needing_boost: usize,
        played: usize,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        if stats.std_dev > HIGH_SPREAD_THRESHOLD {
            recommendations.push(format!(
                "Preference satisfaction varies widely between teams (standard deviation {:.2}); review how popular slots are distributed.",
                stats.std_dev
            ));
        }

        if total_deficit > 0.0 {
            recommendations.push(format!(
                "{} team(s) average below the minimum of {:.1} points; prioritise their preferred play moments in the next scheduling round.",
                below_minimum, self.expected_minimum_score
            ));
        }

        if played > 0 && needing_boost as f64 / played as f64 > BELOW_PAR_SHARE_THRESHOLD {
            recommendations.push(
                "More than half of the league is below par; the available slots may not fit the stated preferences."
                    .to_string(),
            );
        }

        if recommendations.is_empty() {
            recommendations
                .push("Preference satisfaction is balanced across the league.".to_string());
        }

        recommendations
    }

    fn baseline(&self, roster: &[TeamId]) -> SeasonalFairnessResult {
        let per_team = roster
            .iter()
            .map(|team_id| self.team_entry(*team_id, 0.0, 0))
            .collect();

        SeasonalFairnessResult {
            metrics: SeasonalFairnessMetrics {
                overall_average: 0.0,
                standard_deviation: 0.0,
                min_score: 0.0,
                max_score: 0.0,
                fairness_score: 100.0,
                teams_needing_boost: Vec::new(),
                recommendations: vec![SEASON_NOT_STARTED.to_string()],
            },
            per_team,
        }
    }
}

/// Team ids in roster order, first occurrence wins.
fn unique_roster(teams: &[Team]) -> Vec<TeamId> {
    let mut seen = HashSet::new();
    teams
        .iter()
        .map(|team| team.team_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

pub fn compute_fairness(
    teams: &[Team],
    matches: &[MatchRecord],
    venues: &[Venue],
) -> SeasonalFairnessResult {
    SeasonalFairnessAggregator::default().compute(teams, matches, venues)
}
