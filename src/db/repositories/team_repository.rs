use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::error::AppResult;
use crate::models::team::{PreferredPlayMoments, Team, TeamId};

#[derive(Debug, Clone)]
pub struct TeamRow {
    pub id: TeamId,
    pub name: String,
    pub preferred_play_moments: Option<String>,
}

impl TeamRow {
    pub fn from_team(team: &Team) -> AppResult<Self> {
        let preferred_play_moments = match team.preferred_play_moments.as_ref() {
            Some(payload) => Some(serde_json::to_string(payload.as_value())?),
            None => None,
        };

        Ok(Self {
            id: team.team_id,
            name: team.team_name.trim().to_string(),
            preferred_play_moments,
        })
    }

    /// Unreadable preference JSON is dropped, the team itself is kept.
    pub fn into_team(self) -> Team {
        let preferred_play_moments = self
            .preferred_play_moments
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| match serde_json::from_str::<JsonValue>(raw) {
                Ok(value) => Some(PreferredPlayMoments(value)),
                Err(err) => {
                    warn!(
                        target: "app::db",
                        team_id = self.id,
                        error = %err,
                        "ignoring unreadable preferred play moments"
                    );
                    None
                }
            });

        Team {
            team_id: self.id,
            team_name: self.name,
            preferred_play_moments,
        }
    }
}

impl TryFrom<&Row<'_>> for TeamRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            preferred_play_moments: row.get("preferred_play_moments")?,
        })
    }
}

pub struct TeamRepository;

impl TeamRepository {
    pub fn insert(conn: &Connection, team: &Team) -> AppResult<()> {
        let row = TeamRow::from_team(team)?;
        conn.execute(
            r#"
                INSERT INTO teams (id, name, preferred_play_moments)
                VALUES (:id, :name, :preferred_play_moments)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    preferred_play_moments = excluded.preferred_play_moments
            "#,
            named_params! {
                ":id": row.id,
                ":name": &row.name,
                ":preferred_play_moments": &row.preferred_play_moments,
            },
        )?;
        Ok(())
    }

    pub fn list_all(conn: &Connection) -> AppResult<Vec<Team>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, name, preferred_play_moments
                FROM teams
                ORDER BY id ASC
            "#,
        )?;

        let teams = stmt
            .query_map([], |row| TeamRow::try_from(row))?
            .map(|row| row.map(TeamRow::into_team))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(teams)
    }

    pub fn find_by_id(conn: &Connection, team_id: TeamId) -> AppResult<Option<Team>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, name, preferred_play_moments
                FROM teams
                WHERE id = :id
            "#,
        )?;

        let row = stmt
            .query_row(named_params! {":id": team_id}, |row| TeamRow::try_from(row))
            .optional()?;

        Ok(row.map(TeamRow::into_team))
    }

    /// Writes raw payload text as-is, bypassing JSON encoding.
    pub fn set_raw_preferences(
        conn: &Connection,
        team_id: TeamId,
        raw: Option<&str>,
    ) -> AppResult<usize> {
        let updated = conn.execute(
            "UPDATE teams SET preferred_play_moments = :raw WHERE id = :id",
            named_params! {":raw": raw, ":id": team_id},
        )?;
        Ok(updated)
    }
}
