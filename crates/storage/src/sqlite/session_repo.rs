use coach_core::model::{CoachId, SessionId, TrainingSession};
use coach_core::progress::HourTotal;

use super::SqliteRepository;
use super::mapping::{
    coach_id_to_i64, conn_err, map_hour_total_row, map_session_row, session_id_from_i64,
    session_id_to_i64,
};
use crate::repository::{NewSessionRecord, SessionRepository, StorageError};

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn insert_session(
        &self,
        record: NewSessionRecord,
    ) -> Result<TrainingSession, StorageError> {
        let coach_id = coach_id_to_i64(record.coach_id)?;
        let mut tx = self.pool.begin().await.map_err(conn_err)?;

        let active = sqlx::query("SELECT 1 FROM coaches WHERE id = ?1 AND is_active = 1")
            .bind(coach_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn_err)?;
        if active.is_none() {
            return Err(StorageError::NotFound);
        }

        let session = &record.session;
        let res = sqlx::query(
            r"
            INSERT INTO sessions (
                coach_id, date, equipment, session_type, half_hours, notes, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            ",
        )
        .bind(coach_id)
        .bind(session.date)
        .bind(session.equipment.as_str())
        .bind(session.session_type.as_str())
        .bind(i64::from(session.hours.half_hours()))
        .bind(session.notes.as_deref())
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(conn_err)?;

        let id = session_id_from_i64(res.last_insert_rowid())?;
        tx.commit().await.map_err(conn_err)?;

        Ok(TrainingSession::from_new(
            id,
            record.coach_id,
            record.session,
            record.created_at,
        ))
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<TrainingSession>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, coach_id, date, equipment, session_type, half_hours, notes, created_at, updated_at
            FROM sessions WHERE id = ?1
            ",
        )
        .bind(session_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn_err)?;

        row.as_ref().map(map_session_row).transpose()
    }

    async fn list_sessions(
        &self,
        coach_id: CoachId,
    ) -> Result<Vec<TrainingSession>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, coach_id, date, equipment, session_type, half_hours, notes, created_at, updated_at
            FROM sessions
            WHERE coach_id = ?1
            ORDER BY date DESC, created_at DESC, id DESC
            ",
        )
        .bind(coach_id_to_i64(coach_id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn_err)?;

        rows.iter().map(map_session_row).collect()
    }

    async fn update_session(&self, session: &TrainingSession) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE sessions
            SET date = ?2, equipment = ?3, session_type = ?4, half_hours = ?5, notes = ?6, updated_at = ?7
            WHERE id = ?1
            ",
        )
        .bind(session_id_to_i64(session.id())?)
        .bind(session.date())
        .bind(session.equipment().as_str())
        .bind(session.session_type().as_str())
        .bind(i64::from(session.hours().half_hours()))
        .bind(session.notes())
        .bind(session.updated_at())
        .execute(&self.pool)
        .await
        .map_err(conn_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_session(&self, id: SessionId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM sessions WHERE id = ?1")
            .bind(session_id_to_i64(id)?)
            .execute(&self.pool)
            .await
            .map_err(conn_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_sessions_for_coach(&self, coach_id: CoachId) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM sessions WHERE coach_id = ?1")
            .bind(coach_id_to_i64(coach_id)?)
            .execute(&self.pool)
            .await
            .map_err(conn_err)?;
        Ok(res.rows_affected())
    }

    async fn hour_totals(&self, coach_id: CoachId) -> Result<Vec<HourTotal>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT equipment, session_type,
                   SUM(half_hours) AS half_hours,
                   COUNT(*) AS sessions
            FROM sessions
            WHERE coach_id = ?1
            GROUP BY equipment, session_type
            ",
        )
        .bind(coach_id_to_i64(coach_id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn_err)?;

        rows.iter().map(map_hour_total_row).collect()
    }
}
