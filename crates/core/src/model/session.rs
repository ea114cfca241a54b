use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{CoachId, SessionId};

/// Maximum notes length, in characters, after trimming.
pub const NOTES_MAX_CHARS: usize = 500;

/// Largest number of half hours a single session may record (24h).
pub const MAX_HALF_HOURS: u8 = 48;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("invalid date: {0} (expected YYYY-MM-DD or RFC 3339)")]
    InvalidDate(String),

    #[error("date {date} is in the future (today is {today})")]
    FutureDate { date: NaiveDate, today: NaiveDate },

    #[error(transparent)]
    Equipment(#[from] ParseEquipmentError),

    #[error(transparent)]
    SessionType(#[from] ParseSessionTypeError),

    #[error("hours must be between 0.5 and 24 (got {0})")]
    HoursOutOfRange(f64),

    #[error("hours must be a multiple of 0.5 (got {0})")]
    HoursNotHalfStep(f64),

    #[error("notes cannot exceed {NOTES_MAX_CHARS} characters (got {len})")]
    NotesTooLong { len: usize },
}

//
// ─── EQUIPMENT / TYPE ──────────────────────────────────────────────────────────
//

/// Apparatus category a session was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Equipment {
    Reformer,
    Mat,
    Chair,
}

impl Equipment {
    /// Every equipment, in display order.
    pub const ALL: [Equipment; 3] = [Equipment::Reformer, Equipment::Mat, Equipment::Chair];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reformer => "reformer",
            Self::Mat => "mat",
            Self::Chair => "chair",
        }
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("equipment must be reformer, mat or chair (got {0:?})")]
pub struct ParseEquipmentError(pub String);

impl FromStr for Equipment {
    type Err = ParseEquipmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reformer" => Ok(Self::Reformer),
            "mat" => Ok(Self::Mat),
            "chair" => Ok(Self::Chair),
            other => Err(ParseEquipmentError(other.to_string())),
        }
    }
}

/// Nature of a training session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Practice,
    Observation,
}

impl SessionType {
    pub const ALL: [SessionType; 2] = [SessionType::Practice, SessionType::Observation];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Practice => "practice",
            Self::Observation => "observation",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("type must be practice or observation (got {0:?})")]
pub struct ParseSessionTypeError(pub String);

impl FromStr for SessionType {
    type Err = ParseSessionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "practice" => Ok(Self::Practice),
            "observation" => Ok(Self::Observation),
            other => Err(ParseSessionTypeError(other.to_string())),
        }
    }
}

//
// ─── HOURS ─────────────────────────────────────────────────────────────────────
//

/// Session duration, held as a whole number of half hours in `1..=48`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hours(u8);

impl Hours {
    /// Validate a duration expressed in hours.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::HoursOutOfRange` outside `[0.5, 24]` and
    /// `SessionError::HoursNotHalfStep` for values such as `1.3`.
    pub fn from_hours(hours: f64) -> Result<Self, SessionError> {
        if !hours.is_finite() || !(0.5..=24.0).contains(&hours) {
            return Err(SessionError::HoursOutOfRange(hours));
        }
        let doubled = hours * 2.0;
        if doubled.fract() != 0.0 {
            return Err(SessionError::HoursNotHalfStep(hours));
        }
        // doubled is an integer in 1..=48 here
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let half_hours = doubled as u8;
        Ok(Self(half_hours))
    }

    /// Rebuild from a stored half-hour count.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::HoursOutOfRange` if the count is outside `1..=48`.
    pub fn from_half_hours(half_hours: u32) -> Result<Self, SessionError> {
        match u8::try_from(half_hours) {
            Ok(n) if (1..=MAX_HALF_HOURS).contains(&n) => Ok(Self(n)),
            _ => Err(SessionError::HoursOutOfRange(f64::from(half_hours) / 2.0)),
        }
    }

    #[must_use]
    pub fn half_hours(self) -> u32 {
        u32::from(self.0)
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

//
// ─── DATES / NOTES ─────────────────────────────────────────────────────────────
//

/// Parse a session date from `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps are reduced to their UTC calendar date.
///
/// # Errors
///
/// Returns `SessionError::InvalidDate` if neither format matches.
pub fn parse_session_date(raw: &str) -> Result<NaiveDate, SessionError> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| SessionError::InvalidDate(raw.to_string()))
}

fn check_not_future(date: NaiveDate, today: NaiveDate) -> Result<NaiveDate, SessionError> {
    if date > today {
        return Err(SessionError::FutureDate { date, today });
    }
    Ok(date)
}

fn normalize_notes(notes: Option<String>) -> Result<Option<String>, SessionError> {
    let Some(notes) = notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
    else {
        return Ok(None);
    };
    let len = notes.chars().count();
    if len > NOTES_MAX_CHARS {
        return Err(SessionError::NotesTooLong { len });
    }
    Ok(Some(notes))
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// Unvalidated input for a new session, as received from a client.
#[derive(Clone, Debug)]
pub struct SessionDraft {
    pub date: String,
    pub equipment: String,
    pub session_type: String,
    pub hours: f64,
    pub notes: Option<String>,
}

/// A session that passed validation but has no identity yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSession {
    pub date: NaiveDate,
    pub equipment: Equipment,
    pub session_type: SessionType,
    pub hours: Hours,
    pub notes: Option<String>,
}

impl SessionDraft {
    /// Validate every field against `today`.
    ///
    /// # Errors
    ///
    /// Returns the first `SessionError` encountered.
    pub fn validate(self, today: NaiveDate) -> Result<NewSession, SessionError> {
        let date = check_not_future(parse_session_date(&self.date)?, today)?;
        Ok(NewSession {
            date,
            equipment: self.equipment.parse()?,
            session_type: self.session_type.parse()?,
            hours: Hours::from_hours(self.hours)?,
            notes: normalize_notes(self.notes)?,
        })
    }
}

/// Partial update of a session. `None` keeps the current value; empty notes
/// clear them.
#[derive(Clone, Debug, Default)]
pub struct SessionPatch {
    pub date: Option<String>,
    pub equipment: Option<String>,
    pub session_type: Option<String>,
    pub hours: Option<f64>,
    pub notes: Option<String>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// A persisted training session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingSession {
    id: SessionId,
    coach_id: CoachId,
    date: NaiveDate,
    equipment: Equipment,
    session_type: SessionType,
    hours: Hours,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TrainingSession {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn from_persisted(
        id: SessionId,
        coach_id: CoachId,
        date: NaiveDate,
        equipment: Equipment,
        session_type: SessionType,
        hours: Hours,
        notes: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            coach_id,
            date,
            equipment,
            session_type,
            hours,
            notes,
            created_at,
            updated_at,
        }
    }

    /// Give a validated session its store-assigned identity.
    #[must_use]
    pub fn from_new(
        id: SessionId,
        coach_id: CoachId,
        session: NewSession,
        now: DateTime<Utc>,
    ) -> Self {
        Self::from_persisted(
            id,
            coach_id,
            session.date,
            session.equipment,
            session.session_type,
            session.hours,
            session.notes,
            now,
            now,
        )
    }

    /// Apply a partial update. Changed fields go through the same checks as
    /// a new session.
    ///
    /// # Errors
    ///
    /// Returns the first `SessionError` encountered; `self` is left untouched.
    pub fn apply_patch(
        &self,
        patch: SessionPatch,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let mut updated = self.clone();
        if let Some(date) = patch.date {
            updated.date = check_not_future(parse_session_date(&date)?, today)?;
        }
        if let Some(equipment) = patch.equipment {
            updated.equipment = equipment.parse()?;
        }
        if let Some(session_type) = patch.session_type {
            updated.session_type = session_type.parse()?;
        }
        if let Some(hours) = patch.hours {
            updated.hours = Hours::from_hours(hours)?;
        }
        if patch.notes.is_some() {
            updated.notes = normalize_notes(patch.notes)?;
        }
        updated.updated_at = now;
        Ok(updated)
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn coach_id(&self) -> CoachId {
        self.coach_id
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn equipment(&self) -> Equipment {
        self.equipment
    }

    #[must_use]
    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    #[must_use]
    pub fn hours(&self) -> Hours {
        self.hours
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
