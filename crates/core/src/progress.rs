//! Progress aggregation.
//!
//! Session hours are summed per (equipment, type) in half-hour units and
//! compared against an [`Objectives`] table. Percentages are clamped to 100.

use crate::model::{Equipment, ObjectiveTargets, Objectives, SessionType, TrainingSession};

/// Summed hours for one (equipment, type) group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourTotal {
    pub equipment: Equipment,
    pub session_type: SessionType,
    pub half_hours: u32,
    pub sessions: u32,
}

/// Group sessions by (equipment, type), in the order groups first appear.
#[must_use]
pub fn totals_from_sessions(sessions: &[TrainingSession]) -> Vec<HourTotal> {
    let mut totals: Vec<HourTotal> = Vec::new();
    for session in sessions {
        let key = (session.equipment(), session.session_type());
        match totals
            .iter_mut()
            .find(|t| (t.equipment, t.session_type) == key)
        {
            Some(total) => {
                total.half_hours = total.half_hours.saturating_add(session.hours().half_hours());
                total.sessions = total.sessions.saturating_add(1);
            }
            None => totals.push(HourTotal {
                equipment: key.0,
                session_type: key.1,
                half_hours: session.hours().half_hours(),
                sessions: 1,
            }),
        }
    }
    totals
}

/// `min(100, 100 × actual / target)`.
#[must_use]
pub fn percentage(actual: f64, target: u32) -> f64 {
    if target == 0 {
        return 100.0;
    }
    (actual * 100.0 / f64::from(target)).min(100.0)
}

fn half_hours_to_hours(half_hours: u32) -> f64 {
    f64::from(half_hours) / 2.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct HalfHourSplit {
    practice: u32,
    observation: u32,
}

impl HalfHourSplit {
    fn collect(totals: &[HourTotal], equipment: Equipment) -> Self {
        totals
            .iter()
            .filter(|t| t.equipment == equipment)
            .fold(Self::default(), |mut acc, t| {
                match t.session_type {
                    SessionType::Practice => acc.practice = acc.practice.saturating_add(t.half_hours),
                    SessionType::Observation => {
                        acc.observation = acc.observation.saturating_add(t.half_hours);
                    }
                }
                acc
            })
    }

    fn total(self) -> u32 {
        self.practice.saturating_add(self.observation)
    }
}

/// Progress towards the objectives of one equipment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquipmentProgress {
    pub equipment: Equipment,
    pub practice: f64,
    pub observation: f64,
    pub total: f64,
    pub objectives: ObjectiveTargets,
    pub practice_percentage: f64,
    pub observation_percentage: f64,
    pub total_percentage: f64,
}

impl EquipmentProgress {
    fn compute(equipment: Equipment, split: HalfHourSplit, objectives: ObjectiveTargets) -> Self {
        let practice = half_hours_to_hours(split.practice);
        let observation = half_hours_to_hours(split.observation);
        let total = half_hours_to_hours(split.total());
        Self {
            equipment,
            practice,
            observation,
            total,
            objectives,
            practice_percentage: percentage(practice, objectives.practice),
            observation_percentage: percentage(observation, objectives.observation),
            total_percentage: percentage(total, objectives.total),
        }
    }
}

/// Progress for every equipment, always in [`Equipment::ALL`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    entries: [EquipmentProgress; 3],
}

impl Progress {
    /// Compare grouped totals with the objective table.
    ///
    /// Equipment without any sessions is reported with zero hours.
    #[must_use]
    pub fn from_totals(objectives: &Objectives, totals: &[HourTotal]) -> Self {
        let entries = Equipment::ALL.map(|equipment| {
            EquipmentProgress::compute(
                equipment,
                HalfHourSplit::collect(totals, equipment),
                objectives.for_equipment(equipment),
            )
        });
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, equipment: Equipment) -> &EquipmentProgress {
        let idx = match equipment {
            Equipment::Reformer => 0,
            Equipment::Mat => 1,
            Equipment::Chair => 2,
        };
        &self.entries[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &EquipmentProgress> {
        self.entries.iter()
    }
}

/// Hours logged on one equipment, without objectives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquipmentHours {
    pub equipment: Equipment,
    pub practice: f64,
    pub observation: f64,
    pub total: f64,
}

/// Session count and hours for a coach, per equipment.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionsSummary {
    pub total_sessions: u32,
    pub total_hours: f64,
    pub by_equipment: [EquipmentHours; 3],
}

impl SessionsSummary {
    #[must_use]
    pub fn from_totals(totals: &[HourTotal]) -> Self {
        let total_sessions = totals
            .iter()
            .fold(0_u32, |acc, t| acc.saturating_add(t.sessions));
        let total_half_hours = totals
            .iter()
            .fold(0_u32, |acc, t| acc.saturating_add(t.half_hours));
        let by_equipment = Equipment::ALL.map(|equipment| {
            let split = HalfHourSplit::collect(totals, equipment);
            EquipmentHours {
                equipment,
                practice: half_hours_to_hours(split.practice),
                observation: half_hours_to_hours(split.observation),
                total: half_hours_to_hours(split.total()),
            }
        });
        Self {
            total_sessions,
            total_hours: half_hours_to_hours(total_half_hours),
            by_equipment,
        }
    }
}
