use std::convert::TryFrom;

use rusqlite::{named_params, Connection, Row};

use crate::error::AppResult;
use crate::models::venue::Venue;

impl TryFrom<&Row<'_>> for Venue {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            venue_name: row.get("venue_name")?,
        })
    }
}

pub struct VenueRepository;

impl VenueRepository {
    pub fn insert(conn: &Connection, venue: &Venue) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO venues (id, name, venue_name)
                VALUES (:id, :name, :venue_name)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    venue_name = excluded.venue_name
            "#,
            named_params! {
                ":id": venue.id,
                ":name": &venue.name,
                ":venue_name": &venue.venue_name,
            },
        )?;
        Ok(())
    }

    /// Ordered by id so name collisions resolve the same way on every call.
    pub fn list_all(conn: &Connection) -> AppResult<Vec<Venue>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, name, venue_name
                FROM venues
                ORDER BY id ASC
            "#,
        )?;

        let venues = stmt
            .query_map([], |row| Venue::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(venues)
    }
}
