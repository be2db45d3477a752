use crate::models::team::TeamId;
use crate::services::diagnostics::{FairnessEvent, FairnessEventSink};
use crate::services::slot_scorer::NO_PREFERENCE_SCORE;

/// Replaces an all-zero score series with the no-preference score.
///
/// A team whose preferences no slot in the inventory can satisfy is scored as
/// if it had no preferences for this pass. Any non-zero entry leaves the
/// series untouched. An empty series is returned as is without an event.
pub fn apply_fallback(team_id: TeamId, scores: &[f64], sink: &dyn FairnessEventSink) -> Vec<f64> {
    if scores.is_empty() || scores.iter().any(|score| *score != 0.0) {
        return scores.to_vec();
    }

    sink.emit(FairnessEvent::AdaptiveFallbackApplied {
        team_id,
        series_len: scores.len(),
    });
    vec![NO_PREFERENCE_SCORE; scores.len()]
}
