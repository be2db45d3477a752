use crate::models::fairness::TeamSeasonalFairness;
use crate::models::settings::{
    FairnessPolicy, DEFAULT_BOOST_CAP, DEFAULT_UNDERSERVED_BONUS, DEFAULT_UNDERSERVED_RATIO,
};
use crate::models::team::TeamId;
use crate::services::seasonal_fairness::overall_average;

const BASE_BOOST: f64 = 1.0;

/// Turns a team's seasonal deficit into a scheduling weight multiplier.
#[derive(Debug, Clone, Copy)]
pub struct FairnessBoostCalculator {
    boost_cap: f64,
    underserved_ratio: f64,
    underserved_bonus: f64,
}

impl Default for FairnessBoostCalculator {
    fn default() -> Self {
        Self {
            boost_cap: DEFAULT_BOOST_CAP,
            underserved_ratio: DEFAULT_UNDERSERVED_RATIO,
            underserved_bonus: DEFAULT_UNDERSERVED_BONUS,
        }
    }
}

impl FairnessBoostCalculator {
    pub fn from_policy(policy: &FairnessPolicy) -> Self {
        Self {
            boost_cap: policy.boost_cap,
            underserved_ratio: policy.underserved_ratio,
            underserved_bonus: policy.underserved_bonus,
        }
    }

    /// `0.0` for teams missing from `per_team`.
    pub fn boost(&self, team_id: TeamId, per_team: &[TeamSeasonalFairness]) -> f64 {
        let Some(entry) = per_team.iter().find(|entry| entry.team_id == team_id) else {
            return 0.0;
        };

        let mut boost = (BASE_BOOST + entry.fairness_deficit).min(self.boost_cap);
        if entry.average_score < overall_average(per_team) * self.underserved_ratio {
            boost += self.underserved_bonus;
        }
        boost
    }
}

pub fn boost(team_id: TeamId, per_team: &[TeamSeasonalFairness]) -> f64 {
    FairnessBoostCalculator::default().boost(team_id, per_team)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(team_id: TeamId, matches: u32, average: f64) -> TeamSeasonalFairness {
        TeamSeasonalFairness {
            team_id,
            total_matches: matches,
            cumulative_score: average * matches as f64,
            average_score: average,
            expected_minimum_score: 1.5,
            fairness_deficit: if matches > 0 { (1.5 - average).max(0.0) } else { 0.0 },
        }
    }

    #[test]
    fn unknown_team_gets_zero() {
        assert_eq!(boost(42, &[entry(1, 3, 2.0)]), 0.0);
        assert_eq!(boost(42, &[]), 0.0);
    }

    #[test]
    fn satisfied_team_gets_neutral_boost() {
        let per_team = [entry(1, 4, 3.0), entry(2, 4, 2.5)];
        assert_eq!(boost(1, &per_team), 1.0);
        // 2.5 is above 80% of the 2.75 league average.
        assert_eq!(boost(2, &per_team), 1.0);
    }

    #[test]
    fn deficit_raises_boost_and_cap_applies_before_bonus() {
        let per_team = [entry(1, 4, 3.0), entry(2, 4, 3.0), entry(3, 4, 1.0)];
        // overall 7/3 ~ 2.33; 1.0 < 1.87, deficit 0.5 -> 1.5 + 0.5
        assert!((boost(3, &per_team) - 2.0).abs() < 1e-9);

        let starved = [entry(1, 4, 3.0), entry(2, 4, 0.0)];
        // deficit 1.5 capped to 2.0, plus the under-served bonus
        assert!((boost(2, &starved) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn policy_values_are_respected() {
        let policy = FairnessPolicy {
            boost_cap: 1.2,
            underserved_bonus: 0.0,
            ..FairnessPolicy::default()
        };
        let calculator = FairnessBoostCalculator::from_policy(&policy);
        let per_team = [entry(1, 4, 3.0), entry(2, 4, 0.0)];
        assert!((calculator.boost(2, &per_team) - 1.2).abs() < 1e-9);
    }
}
