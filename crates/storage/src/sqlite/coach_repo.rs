use chrono::{DateTime, Utc};
use coach_core::model::{Coach, CoachId};

use super::SqliteRepository;
use super::mapping::{coach_id_from_i64, coach_id_to_i64, conn_err, map_coach_row, write_err};
use crate::repository::{CoachRepository, NewCoachRecord, StorageError};

#[async_trait::async_trait]
impl CoachRepository for SqliteRepository {
    async fn insert_coach(&self, record: NewCoachRecord) -> Result<Coach, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO coaches (name, email, phone, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, 1, ?4, ?4)
            ",
        )
        .bind(record.coach.name.as_str())
        .bind(record.coach.email.as_deref())
        .bind(record.coach.phone.as_deref())
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        let id = coach_id_from_i64(res.last_insert_rowid())?;
        Ok(Coach::from_new(id, record.coach, record.created_at))
    }

    async fn get_coach(&self, id: CoachId) -> Result<Option<Coach>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, email, phone, is_active, created_at, updated_at
            FROM coaches WHERE id = ?1 AND is_active = 1
            ",
        )
        .bind(coach_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn_err)?;

        row.as_ref().map(map_coach_row).transpose()
    }

    async fn list_active_coaches(&self) -> Result<Vec<Coach>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, email, phone, is_active, created_at, updated_at
            FROM coaches
            WHERE is_active = 1
            ORDER BY name ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn_err)?;

        rows.iter().map(map_coach_row).collect()
    }

    async fn update_coach(&self, coach: &Coach) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE coaches
            SET name = ?2, email = ?3, phone = ?4, updated_at = ?5
            WHERE id = ?1 AND is_active = 1
            ",
        )
        .bind(coach_id_to_i64(coach.id())?)
        .bind(coach.name().as_str())
        .bind(coach.email())
        .bind(coach.phone())
        .bind(coach.updated_at())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn deactivate_coach(&self, id: CoachId, at: DateTime<Utc>) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE coaches SET is_active = 0, updated_at = ?2
            WHERE id = ?1 AND is_active = 1
            ",
        )
        .bind(coach_id_to_i64(id)?)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(conn_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
