//! SQLite backend.
//!
//! Layout of the `workouts` table:
//!
//! - `filename`, `sport`: text
//! - `duration`: integer seconds
//! - `distance`: meters at centimeter precision, nullable
//! - `avg_heart_rate`, `max_heart_rate`, `calories`: integers, nullable
//! - `uploaded_at`: unix seconds, defaults to now

use std::str::FromStr;

use chrono::DateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use crate::error::StoreError;
use crate::store::WorkoutStore;
use crate::types::workout::{Sport, StoredWorkout, WorkoutSummary};

const LIST_WORKOUTS: &str = r#"
    SELECT id, filename, sport, duration, distance, avg_heart_rate, max_heart_rate, calories, uploaded_at
    FROM workouts
    ORDER BY uploaded_at DESC, id DESC
"#;

const GET_WORKOUT: &str = r#"
    SELECT id, filename, sport, duration, distance, avg_heart_rate, max_heart_rate, calories, uploaded_at
    FROM workouts
    WHERE id = ?
"#;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database and initializes the schema.
    ///
    /// # Arguments
    ///
    /// * `database_url` - SQLite connection string (e.g., "sqlite:fitlog.db" or "sqlite::memory:")
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to an in-memory database is its own database.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        let store = Self { pool };
        store.initialize_schema().await?;

        Ok(store)
    }

    async fn initialize_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workouts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                sport TEXT NOT NULL DEFAULT 'unknown',
                duration INTEGER NOT NULL,
                distance REAL,
                avg_heart_rate INTEGER,
                max_heart_rate INTEGER,
                calories INTEGER,
                uploaded_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_workouts_uploaded_at
            ON workouts(uploaded_at)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl WorkoutStore for SqliteStore {
    async fn create(&self, summary: &WorkoutSummary) -> Result<i64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO workouts
                (filename, sport, duration, distance, avg_heart_rate, max_heart_rate, calories, uploaded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&summary.filename)
        .bind(summary.sport.as_str())
        .bind(summary.duration)
        .bind(summary.distance)
        .bind(summary.avg_heart_rate.map(i64::from))
        .bind(summary.max_heart_rate.map(i64::from))
        .bind(summary.calories.map(i64::from))
        .bind(summary.uploaded_at.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn list_all(&self) -> Result<Vec<StoredWorkout>, StoreError> {
        let rows = sqlx::query(LIST_WORKOUTS).fetch_all(&self.pool).await?;

        rows.iter().map(workout_from_row).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<StoredWorkout>, StoreError> {
        let row = sqlx::query(GET_WORKOUT)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(workout_from_row).transpose()
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM workouts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn workout_from_row(row: &SqliteRow) -> Result<StoredWorkout, StoreError> {
    let id: i64 = row.try_get("id")?;
    let sport: String = row.try_get("sport")?;
    let uploaded_at: i64 = row.try_get("uploaded_at")?;
    let uploaded_at = DateTime::from_timestamp(uploaded_at, 0).ok_or_else(|| StoreError::CorruptRow {
        id,
        reason: format!("uploaded_at {uploaded_at} is out of range"),
    })?;

    Ok(StoredWorkout {
        id,
        summary: WorkoutSummary {
            filename: row.try_get("filename")?,
            sport: sport.parse().unwrap_or(Sport::Unknown),
            duration: row.try_get("duration")?,
            distance: row.try_get("distance")?,
            avg_heart_rate: narrow(id, "avg_heart_rate", row.try_get("avg_heart_rate")?)?,
            max_heart_rate: narrow(id, "max_heart_rate", row.try_get("max_heart_rate")?)?,
            calories: narrow(id, "calories", row.try_get("calories")?)?,
            uploaded_at,
        },
    })
}

fn narrow<T: TryFrom<i64>>(
    id: i64,
    column: &str,
    value: Option<i64>,
) -> Result<Option<T>, StoreError> {
    value
        .map(|v| {
            T::try_from(v).map_err(|_| StoreError::CorruptRow {
                id,
                reason: format!("{column} value {v} is out of range"),
            })
        })
        .transpose()
}
