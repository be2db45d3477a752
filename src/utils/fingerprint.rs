use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::error::AppResult;
use crate::models::fixture::MatchRecord;
use crate::models::team::Team;
use crate::models::venue::Venue;

/// Deterministic digest of a fairness computation's inputs.
///
/// Records are sorted by id before hashing, so the digest does not depend on
/// the order the data store returned them in.
pub fn input_digest(
    teams: &[Team],
    matches: &[MatchRecord],
    venues: &[Venue],
) -> AppResult<String> {
    let mut teams: Vec<&Team> = teams.iter().collect();
    teams.sort_by_key(|team| team.team_id);
    let mut matches: Vec<&MatchRecord> = matches.iter().collect();
    matches.sort_by_key(|record| record.id);
    let mut venues: Vec<&Venue> = venues.iter().collect();
    venues.sort_by_key(|venue| venue.id);

    let payload = json!({
        "teams": teams,
        "matches": matches,
        "venues": venues,
    });

    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(&payload)?);
    Ok(STANDARD_NO_PAD.encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: i64) -> MatchRecord {
        MatchRecord {
            id,
            home_team_id: Some(1),
            away_team_id: Some(2),
            match_date: NaiveDate::from_ymd_opt(2024, 9, id as u32).expect("date"),
            kickoff_time: None,
            location: None,
            season: None,
            is_cup: false,
            is_playoff: false,
        }
    }

    #[test]
    fn digest_ignores_input_order_but_not_content() -> AppResult<()> {
        let teams = vec![Team::new(1, "A"), Team::new(2, "B")];
        let forward = input_digest(&teams, &[record(1), record(2)], &[])?;
        let backward = input_digest(&teams, &[record(2), record(1)], &[])?;
        assert_eq!(forward, backward);

        let changed = input_digest(&teams, &[record(1), record(3)], &[])?;
        assert_ne!(forward, changed);
        Ok(())
    }
}
