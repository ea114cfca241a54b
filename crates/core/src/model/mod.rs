mod coach;
mod ids;
mod objectives;
mod session;

pub use ids::{CoachId, ParseIdError, SessionId};

pub use coach::{
    Coach, CoachDraft, CoachError, CoachName, CoachPatch, NAME_MAX_CHARS, NAME_MIN_CHARS, NewCoach,
};
pub use objectives::{ObjectiveTargets, Objectives, ObjectivesError};
pub use session::{
    Equipment, Hours, MAX_HALF_HOURS, NOTES_MAX_CHARS, NewSession, ParseEquipmentError,
    ParseSessionTypeError, SessionDraft, SessionError, SessionPatch, SessionType, TrainingSession,
    parse_session_date,
};
