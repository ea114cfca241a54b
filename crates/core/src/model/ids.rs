use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a Coach
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoachId(u64);

impl CoachId {
    /// Creates a new `CoachId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Unique identifier for a training Session
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    /// Creates a new `SessionId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for CoachId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CoachId({})", self.0)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for CoachId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
    raw: String,
}

impl ParseIdError {
    /// Name of the id type that failed to parse (`"coach"` or `"session"`).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} id: {}", self.kind, self.raw)
    }
}

impl std::error::Error for ParseIdError {}

/// Largest id the store can hand out (SQLite rowids are signed 64-bit).
const MAX_ID: u64 = i64::MAX.unsigned_abs();

// Store-assigned ids lie in 1..=MAX_ID, so anything outside can never match.
fn parse_positive(kind: &'static str, s: &str) -> Result<u64, ParseIdError> {
    match s.trim().parse::<u64>() {
        Ok(v) if (1..=MAX_ID).contains(&v) => Ok(v),
        _ => Err(ParseIdError {
            kind,
            raw: s.to_string(),
        }),
    }
}

impl FromStr for CoachId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_positive("coach", s).map(CoachId::new)
    }
}

impl FromStr for SessionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_positive("session", s).map(SessionId::new)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coach_id_display() {
        let id = CoachId::new(42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_coach_id_from_str() {
        let id: CoachId = "123".parse().unwrap();
        assert_eq!(id, CoachId::new(123));
    }

    #[test]
    fn test_coach_id_from_str_invalid() {
        let err = "not-a-number".parse::<CoachId>().unwrap_err();
        assert_eq!(err.kind(), "coach");
        assert_eq!(err.to_string(), "invalid coach id: not-a-number");
    }

    #[test]
    fn test_zero_id_is_rejected() {
        assert!("0".parse::<SessionId>().is_err());
        assert!("0".parse::<CoachId>().is_err());
    }

    #[test]
    fn test_ids_beyond_rowid_range_are_rejected() {
        let max: CoachId = "9223372036854775807".parse().unwrap();
        assert_eq!(max, CoachId::new(MAX_ID));

        let err = "9223372036854775808".parse::<CoachId>().unwrap_err();
        assert_eq!(err.kind(), "coach");
        assert!("18446744073709551615".parse::<SessionId>().is_err());
    }

    #[test]
    fn test_session_id_from_str() {
        let id: SessionId = "456".parse().unwrap();
        assert_eq!(id, SessionId::new(456));
        assert_eq!(format!("{id:?}"), "SessionId(456)");
    }
}
