use std::sync::Arc;

use tracing::{debug, info};

use crate::db::repositories::match_repository::MatchRepository;
use crate::db::repositories::team_repository::TeamRepository;
use crate::db::repositories::venue_repository::VenueRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::fairness::{SeasonalFairnessReport, SlotScore};
use crate::models::fixture::{MatchRecord, MatchSlot};
use crate::models::team::{Team, TeamId};
use crate::models::venue::{Venue, VenueDirectory};
use crate::services::adaptive_fallback::apply_fallback;
use crate::services::diagnostics::FairnessEventSink;
use crate::services::fairness_boost::FairnessBoostCalculator;
use crate::services::policy_service::PolicyService;
use crate::services::preference_normalizer::normalize_preferences;
use crate::services::seasonal_fairness::SeasonalFairnessAggregator;
use crate::services::slot_scorer::SlotScorer;
use crate::services::time_utils;
use crate::utils::fingerprint;

/// Everything one fairness computation reads, fully materialized up front.
#[derive(Debug, Clone, Default)]
pub struct SeasonInputs {
    pub teams: Vec<Team>,
    pub matches: Vec<MatchRecord>,
    pub venues: Vec<Venue>,
}

/// Fetches league data and runs the pure scoring and fairness core over it.
pub struct SeasonFairnessService {
    db: DbPool,
    policy: Arc<PolicyService>,
    sink: Arc<dyn FairnessEventSink>,
}

impl SeasonFairnessService {
    pub fn new(db: DbPool, policy: Arc<PolicyService>, sink: Arc<dyn FairnessEventSink>) -> Self {
        Self { db, policy, sink }
    }

    pub fn load_inputs(&self, season: Option<&str>) -> AppResult<SeasonInputs> {
        let policy = self.policy.get()?;
        let tz = time_utils::parse_timezone(&policy.league_timezone)?;

        self.db.with_connection(|conn| {
            Ok(SeasonInputs {
                teams: TeamRepository::list_all(conn)?,
                matches: MatchRepository::list_by_season(conn, season, tz)?,
                venues: VenueRepository::list_all(conn)?,
            })
        })
    }

    pub fn compute_season(&self, season: Option<&str>) -> AppResult<SeasonalFairnessReport> {
        let policy = self.policy.get()?;
        let inputs = self.load_inputs(season)?;

        let aggregator = SeasonalFairnessAggregator::from_policy(&policy);
        let qualifying_matches = SeasonalFairnessAggregator::qualifying(&inputs.matches).count();
        let result = aggregator.compute(&inputs.teams, &inputs.matches, &inputs.venues);
        let input_digest =
            fingerprint::input_digest(&inputs.teams, &inputs.matches, &inputs.venues)?;

        info!(
            target: "app::fairness",
            season = season.unwrap_or("all"),
            teams = inputs.teams.len(),
            qualifying_matches,
            fairness_score = result.metrics.fairness_score,
            teams_needing_boost = result.metrics.teams_needing_boost.len(),
            "seasonal fairness computed"
        );

        Ok(SeasonalFairnessReport {
            season: season.map(str::to_string),
            policy_version: policy.version,
            input_digest,
            qualifying_matches,
            result,
        })
    }

    /// Runs `compute_season` on the blocking pool as one unit of work.
    pub async fn compute_season_async(
        self: Arc<Self>,
        season: Option<String>,
    ) -> AppResult<SeasonalFairnessReport> {
        tokio::task::spawn_blocking(move || self.compute_season(season.as_deref()))
            .await
            .map_err(|err| AppError::other(format!("fairness computation aborted: {err}")))?
    }

    pub fn boost_for_team(&self, team_id: TeamId, season: Option<&str>) -> AppResult<f64> {
        let policy = self.policy.get()?;
        let report = self.compute_season(season)?;
        let boost =
            FairnessBoostCalculator::from_policy(&policy).boost(team_id, &report.result.per_team);
        debug!(target: "app::fairness", team_id, boost, "fairness boost computed");
        Ok(boost)
    }

    /// Ad hoc evaluation of one slot for one team.
    pub fn score_slot(&self, team_id: TeamId, slot: &MatchSlot) -> AppResult<SlotScore> {
        let (team, directory, scorer) = self.scoring_context(team_id)?;
        let prefs = normalize_preferences(team.preferred_play_moments.as_ref());
        Ok(scorer.score(Some(&prefs), slot, &directory))
    }

    /// Scores candidate slots for a team and applies the all-zero fallback.
    pub fn score_candidate_slots(
        &self,
        team_id: TeamId,
        slots: &[MatchSlot],
    ) -> AppResult<Vec<f64>> {
        let (team, directory, scorer) = self.scoring_context(team_id)?;
        let prefs = normalize_preferences(team.preferred_play_moments.as_ref());

        let scores: Vec<f64> = slots
            .iter()
            .map(|slot| scorer.score(Some(&prefs), slot, &directory).score)
            .collect();

        Ok(apply_fallback(team_id, &scores, self.sink.as_ref()))
    }

    fn scoring_context(&self, team_id: TeamId) -> AppResult<(Team, VenueDirectory, SlotScorer)> {
        let policy = self.policy.get()?;
        let (team, venues) = self.db.with_connection(|conn| {
            let team =
                TeamRepository::find_by_id(conn, team_id)?.ok_or_else(AppError::not_found)?;
            let venues = VenueRepository::list_all(conn)?;
            Ok((team, venues))
        })?;

        Ok((team, VenueDirectory::new(&venues), SlotScorer::from_policy(&policy)))
    }
}

/// Administrator-facing summary of a fairness report.
pub fn render_markdown_report(report: &SeasonalFairnessReport) -> String {
    let metrics = &report.result.metrics;
    let mut content = String::new();

    content.push_str("# Play-moment fairness report\n\n");
    content.push_str(&format!(
        "Season: {}\n\nPolicy version: {}\n\nQualifying matches: {}\n\n",
        report.season.as_deref().unwrap_or("all seasons"),
        report.policy_version,
        report.qualifying_matches
    ));

    content.push_str("## League metrics\n");
    content.push_str(&format!(
        "- Fairness score: {:.1} / 100\n- Average satisfaction: {:.2} / 3\n- Standard deviation: {:.2}\n- Range: {:.2} - {:.2}\n\n",
        metrics.fairness_score,
        metrics.overall_average,
        metrics.standard_deviation,
        metrics.min_score,
        metrics.max_score
    ));

    content.push_str("## Teams\n");
    content.push_str("| Team | Matches | Average | Deficit | Boost needed |\n");
    content.push_str("|------|---------|---------|---------|--------------|\n");
    for entry in &report.result.per_team {
        let flagged = metrics.teams_needing_boost.contains(&entry.team_id);
        content.push_str(&format!(
            "| {} | {} | {:.2} | {:.2} | {} |\n",
            entry.team_id,
            entry.total_matches,
            entry.average_score,
            entry.fairness_deficit,
            if flagged { "yes" } else { "no" }
        ));
    }
    content.push('\n');

    content.push_str("## Recommendations\n");
    for recommendation in &metrics.recommendations {
        content.push_str(&format!("- {}\n", recommendation));
    }

    content
}
