use serde::{Deserialize, Serialize};

pub const DEFAULT_EXPECTED_MINIMUM_SCORE: f64 = 1.5;
pub const DEFAULT_FUZZY_TOLERANCE_MINUTES: i64 = 30;
pub const DEFAULT_NOMINAL_MATCH_MINUTES: i64 = 90;
pub const DEFAULT_BOOST_CAP: f64 = 2.0;
pub const DEFAULT_UNDERSERVED_RATIO: f64 = 0.8;
pub const DEFAULT_UNDERSERVED_BONUS: f64 = 0.5;
pub const DEFAULT_LEAGUE_TIMEZONE: &str = "Europe/Brussels";

/// Tunable fairness policy. Defaults reproduce the league's published policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FairnessPolicy {
    pub version: u32,
    pub expected_minimum_score: f64,
    pub fuzzy_tolerance_minutes: i64,
    pub nominal_match_minutes: i64,
    pub boost_cap: f64,
    pub underserved_ratio: f64,
    pub underserved_bonus: f64,
    pub league_timezone: String,
}

impl Default for FairnessPolicy {
    fn default() -> Self {
        Self {
            version: 1,
            expected_minimum_score: DEFAULT_EXPECTED_MINIMUM_SCORE,
            fuzzy_tolerance_minutes: DEFAULT_FUZZY_TOLERANCE_MINUTES,
            nominal_match_minutes: DEFAULT_NOMINAL_MATCH_MINUTES,
            boost_cap: DEFAULT_BOOST_CAP,
            underserved_ratio: DEFAULT_UNDERSERVED_RATIO,
            underserved_bonus: DEFAULT_UNDERSERVED_BONUS,
            league_timezone: DEFAULT_LEAGUE_TIMEZONE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FairnessPolicyUpdate {
    #[serde(default)]
    pub expected_minimum_score: Option<f64>,
    #[serde(default)]
    pub fuzzy_tolerance_minutes: Option<i64>,
    #[serde(default)]
    pub nominal_match_minutes: Option<i64>,
    #[serde(default)]
    pub boost_cap: Option<f64>,
    #[serde(default)]
    pub underserved_ratio: Option<f64>,
    #[serde(default)]
    pub underserved_bonus: Option<f64>,
    #[serde(default)]
    pub league_timezone: Option<String>,
}

impl FairnessPolicyUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
