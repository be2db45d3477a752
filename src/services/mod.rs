pub mod adaptive_fallback;
pub mod diagnostics;
pub mod fairness_boost;
pub mod policy_service;
pub mod preference_normalizer;
pub mod season_fairness_service;
pub mod seasonal_fairness;
pub mod slot_scorer;
pub mod time_utils;
