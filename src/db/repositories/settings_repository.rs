use std::convert::TryFrom;

use rusqlite::{named_params, Connection, Row};

use crate::error::AppResult;

#[derive(Debug, Clone)]
pub struct AppSettingRow {
    pub key: String,
    pub value: String,
    pub updated_at: String,
}

impl TryFrom<&Row<'_>> for AppSettingRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            key: row.get("key")?,
            value: row.get("value")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct SettingsRepository;

impl SettingsRepository {
    /// Rows whose key starts with `prefix`, ordered by key.
    pub fn list_prefixed(conn: &Connection, prefix: &str) -> AppResult<Vec<AppSettingRow>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT key, value, updated_at
                FROM app_settings
                WHERE substr(key, 1, length(:prefix)) = :prefix
                ORDER BY key ASC
            "#,
        )?;

        let rows = stmt
            .query_map(named_params! {":prefix": prefix}, |row| {
                AppSettingRow::try_from(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn upsert(conn: &Connection, key: &str, value: &str) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO app_settings (key, value)
                VALUES (:key, :value)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = CURRENT_TIMESTAMP
            "#,
            named_params! {":key": key, ":value": value},
        )?;

        Ok(())
    }

    pub fn delete_prefixed(conn: &Connection, prefix: &str) -> AppResult<usize> {
        let deleted = conn.execute(
            "DELETE FROM app_settings WHERE substr(key, 1, length(:prefix)) = :prefix",
            named_params! {":prefix": prefix},
        )?;
        Ok(deleted)
    }
}
