//! Play-moment preference scoring and seasonal fairness for league scheduling.
//!
//! The scoring core (`services::preference_normalizer`, `slot_scorer`,
//! `adaptive_fallback`, `seasonal_fairness`, `fairness_boost`) is pure and
//! synchronous. `services::season_fairness_service` materializes league data
//! from SQLite before handing it to that core.

pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use error::{AppError, AppResult};
pub use state::AppState;
