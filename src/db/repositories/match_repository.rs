use std::convert::TryFrom;

use chrono_tz::Tz;
use rusqlite::{named_params, Connection, Row};
use tracing::warn;

use crate::error::AppResult;
use crate::models::fixture::MatchRecord;
use crate::models::team::TeamId;
use crate::services::time_utils;

/// Match row as stored; `match_date` is free-form text from the data store.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRow {
    pub id: i64,
    pub home_team_id: Option<TeamId>,
    pub away_team_id: Option<TeamId>,
    pub match_date: String,
    pub location: Option<String>,
    pub season: Option<String>,
    pub is_cup: bool,
    pub is_playoff: bool,
}

impl MatchRow {
    pub fn from_record(record: &MatchRecord) -> Self {
        let match_date = match record.kickoff_time {
            Some(kickoff) => record
                .match_date
                .and_time(kickoff)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            None => record.match_date.format("%Y-%m-%d").to_string(),
        };

        Self {
            id: record.id,
            home_team_id: record.home_team_id,
            away_team_id: record.away_team_id,
            match_date,
            location: record.location.clone(),
            season: record.season.clone(),
            is_cup: record.is_cup,
            is_playoff: record.is_playoff,
        }
    }

    /// `None` when the stored date cannot be read.
    pub fn into_record(self, tz: Tz) -> Option<MatchRecord> {
        let Some((match_date, kickoff_time)) =
            time_utils::parse_match_datetime(&self.match_date, tz)
        else {
            warn!(
                target: "app::db",
                match_id = self.id,
                match_date = %self.match_date,
                "skipping match with unreadable date"
            );
            return None;
        };

        Some(MatchRecord {
            id: self.id,
            home_team_id: self.home_team_id,
            away_team_id: self.away_team_id,
            match_date,
            kickoff_time,
            location: self
                .location
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            season: self.season,
            is_cup: self.is_cup,
            is_playoff: self.is_playoff,
        })
    }
}

impl TryFrom<&Row<'_>> for MatchRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            home_team_id: row.get("home_team_id")?,
            away_team_id: row.get("away_team_id")?,
            match_date: row.get("match_date")?,
            location: row.get("location")?,
            season: row.get("season")?,
            is_cup: row.get("is_cup")?,
            is_playoff: row.get("is_playoff")?,
        })
    }
}

pub struct MatchRepository;

impl MatchRepository {
    pub fn insert(conn: &Connection, record: &MatchRecord) -> AppResult<()> {
        Self::insert_row(conn, &MatchRow::from_record(record))
    }

    pub fn insert_row(conn: &Connection, row: &MatchRow) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO matches (
                    id,
                    home_team_id,
                    away_team_id,
                    match_date,
                    location,
                    season,
                    is_cup,
                    is_playoff
                ) VALUES (
                    :id,
                    :home_team_id,
                    :away_team_id,
                    :match_date,
                    :location,
                    :season,
                    :is_cup,
                    :is_playoff
                )
                ON CONFLICT(id) DO UPDATE SET
                    home_team_id = excluded.home_team_id,
                    away_team_id = excluded.away_team_id,
                    match_date = excluded.match_date,
                    location = excluded.location,
                    season = excluded.season,
                    is_cup = excluded.is_cup,
                    is_playoff = excluded.is_playoff
            "#,
            named_params! {
                ":id": row.id,
                ":home_team_id": row.home_team_id,
                ":away_team_id": row.away_team_id,
                ":match_date": &row.match_date,
                ":location": &row.location,
                ":season": &row.season,
                ":is_cup": row.is_cup,
                ":is_playoff": row.is_playoff,
            },
        )?;
        Ok(())
    }

    /// All matches of a season (every season when `season` is `None`),
    /// including cup and playoff fixtures.
    pub fn list_by_season(
        conn: &Connection,
        season: Option<&str>,
        tz: Tz,
    ) -> AppResult<Vec<MatchRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT
                    id,
                    home_team_id,
                    away_team_id,
                    match_date,
                    location,
                    season,
                    is_cup,
                    is_playoff
                FROM matches
                WHERE (:season IS NULL OR season = :season)
                ORDER BY match_date ASC, id ASC
            "#,
        )?;

        let rows = stmt
            .query_map(named_params! {":season": season}, |row| MatchRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_record(tz))
            .collect())
    }
}
