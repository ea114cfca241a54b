use coach_core::model::{
    Coach, CoachId, Equipment, Hours, SessionId, SessionType, TrainingSession,
};
use coach_core::progress::HourTotal;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Map a write failure, turning unique-index violations into `Conflict`.
pub(crate) fn write_err(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        _ => StorageError::Connection(e.to_string()),
    }
}

pub(crate) fn conn_err(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn coach_id_from_i64(v: i64) -> Result<CoachId, StorageError> {
    Ok(CoachId::new(i64_to_u64("coach_id", v)?))
}

pub(crate) fn coach_id_to_i64(id: CoachId) -> Result<i64, StorageError> {
    u64_to_i64("coach_id", id.value())
}

pub(crate) fn session_id_from_i64(v: i64) -> Result<SessionId, StorageError> {
    Ok(SessionId::new(i64_to_u64("session_id", v)?))
}

pub(crate) fn session_id_to_i64(id: SessionId) -> Result<i64, StorageError> {
    u64_to_i64("session_id", id.value())
}

fn half_hours_from_i64(v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid half_hours: {v}")))
}

pub(crate) fn map_coach_row(row: &SqliteRow) -> Result<Coach, StorageError> {
    Coach::from_persisted(
        coach_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<Option<String>, _>("email").map_err(ser)?,
        row.try_get::<Option<String>, _>("phone").map_err(ser)?,
        row.try_get::<i64, _>("is_active").map_err(ser)? != 0,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_session_row(row: &SqliteRow) -> Result<TrainingSession, StorageError> {
    let equipment: Equipment = row
        .try_get::<String, _>("equipment")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let session_type: SessionType = row
        .try_get::<String, _>("session_type")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let hours = Hours::from_half_hours(half_hours_from_i64(
        row.try_get::<i64, _>("half_hours").map_err(ser)?,
    )?)
    .map_err(ser)?;

    Ok(TrainingSession::from_persisted(
        session_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        coach_id_from_i64(row.try_get::<i64, _>("coach_id").map_err(ser)?)?,
        row.try_get("date").map_err(ser)?,
        equipment,
        session_type,
        hours,
        row.try_get::<Option<String>, _>("notes").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    ))
}

pub(crate) fn map_hour_total_row(row: &SqliteRow) -> Result<HourTotal, StorageError> {
    let sessions: i64 = row.try_get("sessions").map_err(ser)?;
    Ok(HourTotal {
        equipment: row
            .try_get::<String, _>("equipment")
            .map_err(ser)?
            .parse()
            .map_err(ser)?,
        session_type: row
            .try_get::<String, _>("session_type")
            .map_err(ser)?
            .parse()
            .map_err(ser)?,
        half_hours: half_hours_from_i64(row.try_get::<i64, _>("half_hours").map_err(ser)?)?,
        sessions: u32::try_from(sessions)
            .map_err(|_| StorageError::Serialization(format!("invalid session count: {sessions}")))?,
    })
}
