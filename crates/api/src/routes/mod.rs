pub mod coaches;
pub mod health;
pub mod sessions;

use chrono::{DateTime, SecondsFormat, Utc};

pub use coaches::CoachRoutes;
pub use health::HealthRoutes;
pub use sessions::SessionRoutes;

/// Timestamps leave the API as RFC 3339 with millisecond precision.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
