use crate::domain::entities::strategy::{Strategy, StrategyDefinition};
use crate::domain::error::DomainError;
use crate::domain::ports::strategy_repository::*;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::Mutex;
use tracing::warn;

const SELECT_COLS: &str = "id, name, version, definition, created_at, updated_at";

pub struct SqliteStrategyRepo {
    conn: Mutex<Connection>,
}

impl SqliteStrategyRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_strategy(row: &rusqlite::Row) -> Result<Strategy, rusqlite::Error> {
        let definition_str: String = row.get(3)?;
        let created_str: String = row.get(4)?;
        let updated_str: String = row.get(5)?;

        let definition: StrategyDefinition =
            serde_json::from_str(&definition_str).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    3,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(Strategy {
            id: row.get(0)?,
            name: row.get(1)?,
            version: row.get(2)?,
            definition,
            created_at: parse_timestamp(&created_str),
            updated_at: parse_timestamp(&updated_str),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, DomainError> {
        self.conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            warn!(value = s, "invalid timestamp in strategies table, using now");
            Utc::now()
        })
}

impl StrategyRepository for SqliteStrategyRepo {
    fn insert(&self, strategy: &Strategy) -> Result<(), DomainError> {
        let definition = serde_json::to_string(&strategy.definition)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO strategies (id, name, version, step_count, definition, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                strategy.id,
                strategy.name,
                strategy.version,
                strategy.definition.steps.len() as i64,
                definition,
                strategy.created_at.to_rfc3339(),
                strategy.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to insert strategy: {e}")))?;
        Ok(())
    }

    fn update(&self, strategy: &Strategy, expected_version: u32) -> Result<(), DomainError> {
        let definition = serde_json::to_string(&strategy.definition)?;
        let conn = self.lock()?;
        let rows = conn
            .execute(
                "UPDATE strategies SET name = ?1, version = ?2, step_count = ?3, definition = ?4, updated_at = ?5
                 WHERE id = ?6 AND version = ?7",
                params![
                    strategy.name,
                    strategy.version,
                    strategy.definition.steps.len() as i64,
                    definition,
                    strategy.updated_at.to_rfc3339(),
                    strategy.id,
                    expected_version,
                ],
            )
            .map_err(|e| DomainError::Database(format!("Failed to update strategy: {e}")))?;
        if rows == 1 {
            return Ok(());
        }

        let current: Option<u32> = conn
            .query_row(
                "SELECT version FROM strategies WHERE id = ?1",
                params![strategy.id],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(DomainError::Database(other.to_string())),
            })?;
        match current {
            None => Err(DomainError::NotFound(format!(
                "Strategy not found: {}",
                strategy.id
            ))),
            Some(version) => Err(DomainError::Conflict(format!(
                "Strategy {} was modified concurrently (stored version {version}, expected {expected_version})",
                strategy.id
            ))),
        }
    }

    fn get(&self, id: &str) -> Result<Option<Strategy>, DomainError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("SELECT {SELECT_COLS} FROM strategies WHERE id = ?1"))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], Self::row_to_strategy)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let strategy = rows
            .next()
            .transpose()
            .map_err(|e| DomainError::Database(format!("Failed to read strategy {id}: {e}")))?;
        Ok(strategy)
    }

    fn list(&self) -> Result<Vec<StrategySummary>, DomainError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, version, step_count, updated_at FROM strategies ORDER BY updated_at DESC",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let summaries = stmt
            .query_map([], |row| {
                let steps: i64 = row.get(3)?;
                let updated_str: String = row.get(4)?;
                Ok(StrategySummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    version: row.get(2)?,
                    steps: steps.max(0) as usize,
                    updated_at: parse_timestamp(&updated_str),
                })
            })
            .map_err(|e| DomainError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(summaries)
    }

    fn delete(&self, id: &str) -> Result<(), DomainError> {
        let conn = self.lock()?;
        let rows = conn
            .execute("DELETE FROM strategies WHERE id = ?1", params![id])
            .map_err(|e| DomainError::Database(format!("Failed to delete strategy: {e}")))?;
        if rows == 0 {
            return Err(DomainError::NotFound(format!("Strategy not found: {id}")));
        }
        Ok(())
    }
}
