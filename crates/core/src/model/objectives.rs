use serde::Serialize;
use thiserror::Error;

use crate::model::session::{Equipment, SessionType};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ObjectivesError {
    #[error("{equipment} objectives must be positive")]
    NonPositive { equipment: Equipment },
}

/// Certification targets, in hours, for one equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObjectiveTargets {
    pub practice: u32,
    pub observation: u32,
    pub total: u32,
}

impl ObjectiveTargets {
    #[must_use]
    pub const fn new(practice: u32, observation: u32, total: u32) -> Self {
        Self {
            practice,
            observation,
            total,
        }
    }

    #[must_use]
    pub const fn for_type(&self, session_type: SessionType) -> u32 {
        match session_type {
            SessionType::Practice => self.practice,
            SessionType::Observation => self.observation,
        }
    }

    const fn is_positive(&self) -> bool {
        self.practice > 0 && self.observation > 0 && self.total > 0
    }
}

/// Immutable objective table, one entry per equipment.
///
/// Every target is positive, which keeps percentage computation total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Objectives {
    reformer: ObjectiveTargets,
    mat: ObjectiveTargets,
    chair: ObjectiveTargets,
}

impl Objectives {
    /// The certification programme's fixed hour requirements.
    pub const CERTIFICATION: Objectives = Objectives {
        reformer: ObjectiveTargets::new(22, 5, 27),
        mat: ObjectiveTargets::new(12, 3, 15),
        chair: ObjectiveTargets::new(12, 3, 15),
    };

    /// Build a custom table.
    ///
    /// # Errors
    ///
    /// Returns `ObjectivesError::NonPositive` if any target is zero.
    pub fn new(
        reformer: ObjectiveTargets,
        mat: ObjectiveTargets,
        chair: ObjectiveTargets,
    ) -> Result<Self, ObjectivesError> {
        let table = Self {
            reformer,
            mat,
            chair,
        };
        for equipment in Equipment::ALL {
            if !table.for_equipment(equipment).is_positive() {
                return Err(ObjectivesError::NonPositive { equipment });
            }
        }
        Ok(table)
    }

    #[must_use]
    pub const fn for_equipment(&self, equipment: Equipment) -> ObjectiveTargets {
        match equipment {
            Equipment::Reformer => self.reformer,
            Equipment::Mat => self.mat,
            Equipment::Chair => self.chair,
        }
    }
}

impl Default for Objectives {
    fn default() -> Self {
        Self::CERTIFICATION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certification_table_matches_programme() {
        let table = Objectives::CERTIFICATION;
        assert_eq!(
            table.for_equipment(Equipment::Reformer),
            ObjectiveTargets::new(22, 5, 27)
        );
        assert_eq!(
            table.for_equipment(Equipment::Mat),
            ObjectiveTargets::new(12, 3, 15)
        );
        assert_eq!(
            table.for_equipment(Equipment::Chair),
            ObjectiveTargets::new(12, 3, 15)
        );
        assert_eq!(
            table
                .for_equipment(Equipment::Reformer)
                .for_type(SessionType::Observation),
            5
        );
    }

    #[test]
    fn custom_table_rejects_zero_targets() {
        let ok = ObjectiveTargets::new(1, 1, 2);
        let err = Objectives::new(ok, ObjectiveTargets::new(4, 0, 4), ok).unwrap_err();
        assert_eq!(
            err,
            ObjectivesError::NonPositive {
                equipment: Equipment::Mat
            }
        );
        assert!(Objectives::new(ok, ok, ok).is_ok());
    }
}
