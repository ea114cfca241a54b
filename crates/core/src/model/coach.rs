use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use thiserror::Error;

use crate::model::ids::CoachId;

/// Minimum coach name length, in characters, after trimming.
pub const NAME_MIN_CHARS: usize = 2;
/// Maximum coach name length, in characters, after trimming.
pub const NAME_MAX_CHARS: usize = 50;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("email pattern compiles")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9 +().-]{6,20}$").expect("phone pattern compiles"));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CoachError {
    #[error("coach name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters (got {len})")]
    NameLength { len: usize },

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("invalid phone number: {0}")]
    InvalidPhone(String),
}

/// Validated coach name (trimmed, 2..=50 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoachName(String);

impl CoachName {
    /// Create a validated coach name.
    ///
    /// # Errors
    ///
    /// Returns `CoachError::NameLength` if the trimmed name is too short or too long.
    pub fn new(value: impl Into<String>) -> Result<Self, CoachError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let len = trimmed.chars().count();
        if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
            return Err(CoachError::NameLength { len });
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CoachName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

fn validate_email(value: Option<String>) -> Result<Option<String>, CoachError> {
    match normalize_optional(value) {
        Some(email) => {
            let email = email.to_lowercase();
            if EMAIL_RE.is_match(&email) {
                Ok(Some(email))
            } else {
                Err(CoachError::InvalidEmail(email))
            }
        }
        None => Ok(None),
    }
}

fn validate_phone(value: Option<String>) -> Result<Option<String>, CoachError> {
    match normalize_optional(value) {
        Some(phone) => {
            let digits = phone.chars().filter(char::is_ascii_digit).count();
            if PHONE_RE.is_match(&phone) && digits >= 6 {
                Ok(Some(phone))
            } else {
                Err(CoachError::InvalidPhone(phone))
            }
        }
        None => Ok(None),
    }
}

/// Unvalidated input for a new coach.
#[derive(Clone, Debug, Default)]
pub struct CoachDraft {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A coach that passed validation but has no identity yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCoach {
    pub name: CoachName,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CoachDraft {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns `CoachError` if the name, email or phone is invalid.
    pub fn validate(self) -> Result<NewCoach, CoachError> {
        Ok(NewCoach {
            name: CoachName::new(self.name)?,
            email: validate_email(self.email)?,
            phone: validate_phone(self.phone)?,
        })
    }
}

/// Partial update of a coach. `None` keeps the current value; an empty
/// email or phone clears it.
#[derive(Clone, Debug, Default)]
pub struct CoachPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CoachPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// A persisted coach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coach {
    id: CoachId,
    name: CoachName,
    email: Option<String>,
    phone: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Coach {
    /// Rehydrate a coach from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `CoachError` if the stored name no longer validates.
    pub fn from_persisted(
        id: CoachId,
        name: String,
        email: Option<String>,
        phone: Option<String>,
        active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, CoachError> {
        Ok(Self {
            id,
            name: CoachName::new(name)?,
            email,
            phone,
            active,
            created_at,
            updated_at,
        })
    }

    /// Give a validated coach its store-assigned identity.
    #[must_use]
    pub fn from_new(id: CoachId, coach: NewCoach, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: coach.name,
            email: coach.email,
            phone: coach.phone,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, re-validating every changed field.
    ///
    /// # Errors
    ///
    /// Returns `CoachError` if a changed field is invalid.
    pub fn apply_patch(&self, patch: CoachPatch, now: DateTime<Utc>) -> Result<Self, CoachError> {
        let mut updated = self.clone();
        if let Some(name) = patch.name {
            updated.name = CoachName::new(name)?;
        }
        if patch.email.is_some() {
            updated.email = validate_email(patch.email)?;
        }
        if patch.phone.is_some() {
            updated.phone = validate_phone(patch.phone)?;
        }
        updated.updated_at = now;
        Ok(updated)
    }

    #[must_use]
    pub fn id(&self) -> CoachId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &CoachName {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
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
