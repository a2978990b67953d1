//! Creature repository implementation for SQLite

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::application::ports::outbound::{CreatureRepositoryPort, RepositoryError};
use crate::domain::entities::Creature;
use crate::domain::value_objects::CreatureId;

type CreatureRow = (i64, DateTime<Utc>, String, Option<String>);

/// Repository for Creature rows
pub struct SqliteCreatureRepository {
    pool: SqlitePool,
}

impl SqliteCreatureRepository {
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS creatures (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TEXT NOT NULL,
                name TEXT NOT NULL,
                asset_directory TEXT
            )
        "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

fn row_to_creature((id, created_at, name, asset_directory): CreatureRow) -> Creature {
    Creature {
        id: CreatureId::from_i64(id),
        created_at,
        name,
        asset_directory,
    }
}

fn database_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

#[async_trait]
impl CreatureRepositoryPort for SqliteCreatureRepository {
    async fn create(&self, name: &str) -> Result<Creature, RepositoryError> {
        let created_at = Utc::now();
        let result = sqlx::query("INSERT INTO creatures (created_at, name) VALUES (?, ?)")
            .bind(created_at)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        let creature = Creature {
            id: CreatureId::from_i64(result.last_insert_rowid()),
            created_at,
            name: name.to_string(),
            asset_directory: None,
        };
        tracing::debug!(creature_id = %creature.id, "Created creature row");
        Ok(creature)
    }

    async fn get(&self, id: CreatureId) -> Result<Option<Creature>, RepositoryError> {
        let row: Option<CreatureRow> = sqlx::query_as(
            "SELECT id, created_at, name, asset_directory FROM creatures WHERE id = ?",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(row_to_creature))
    }

    async fn list(&self) -> Result<Vec<Creature>, RepositoryError> {
        let rows: Vec<CreatureRow> = sqlx::query_as(
            "SELECT id, created_at, name, asset_directory FROM creatures ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(rows.into_iter().map(row_to_creature).collect())
    }

    async fn update(&self, creature: &Creature) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE creatures SET created_at = ?, name = ?, asset_directory = ? WHERE id = ?",
        )
        .bind(creature.created_at)
        .bind(&creature.name)
        .bind(&creature.asset_directory)
        .bind(creature.id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(creature.id));
        }
        Ok(())
    }

    async fn delete(&self, id: CreatureId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM creatures WHERE id = ?")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        tracing::debug!(creature_id = %id, "Deleted creature row");
        Ok(())
    }
}
