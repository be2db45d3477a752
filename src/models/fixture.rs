use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::team::TeamId;

/// Match read model. Only the fields the fairness engine needs are kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: i64,
    #[serde(default)]
    pub home_team_id: Option<TeamId>,
    #[serde(default)]
    pub away_team_id: Option<TeamId>,
    pub match_date: NaiveDate,
    /// Local kickoff time; `None` when the record only carries a date.
    #[serde(default)]
    pub kickoff_time: Option<NaiveTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub is_cup: bool,
    #[serde(default)]
    pub is_playoff: bool,
}

impl MatchRecord {
    pub fn is_regular_season(&self) -> bool {
        !self.is_cup && !self.is_playoff
    }

    /// Home and away ids, when both sides are assigned.
    pub fn participants(&self) -> Option<(TeamId, TeamId)> {
        match (self.home_team_id, self.away_team_id) {
            (Some(home), Some(away)) => Some((home, away)),
            _ => None,
        }
    }

    pub fn to_slot(&self, nominal_minutes: i64) -> MatchSlot {
        let day_of_week = self.match_date.weekday().number_from_monday() as u8;
        let end_time = self
            .kickoff_time
            .map(|start| start + Duration::minutes(nominal_minutes));

        MatchSlot {
            day_of_week,
            start_time: self.kickoff_time,
            end_time,
            venue_name: self.location.clone(),
        }
    }
}

/// A candidate or actual day/time/venue assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchSlot {
    /// ISO day of week, Monday = 1 .. Sunday = 7.
    pub day_of_week: u8,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub venue_name: Option<String>,
}

impl MatchSlot {
    pub fn new(
        day_of_week: u8,
        start_time: NaiveTime,
        end_time: NaiveTime,
        venue_name: impl Into<String>,
    ) -> Self {
        Self {
            day_of_week,
            start_time: Some(start_time),
            end_time: Some(end_time),
            venue_name: Some(venue_name.into()),
        }
    }

    pub fn start_label(&self) -> Option<String> {
        self.start_time.map(|time| time.format("%H:%M").to_string())
    }

    pub fn composite_label(&self) -> Option<String> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(format!(
                "{}-{}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )),
            _ => None,
        }
    }
}
