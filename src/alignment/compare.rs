use serde::Serialize;

use crate::config::{Attribute, Tolerances};
use crate::error::DiffError;
use crate::pitch::{cents_deviation, note_from_frequency};
use crate::types::{DiffType, Note};

/// Raw deviation divided by its tolerance, per attribute. Values above 1.0
/// are out of tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Severities {
    pub pitch: f64,
    pub velocity: f64,
    pub start: f64,
    pub end: f64,
}

impl Severities {
    pub fn get(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::Pitch => self.pitch,
            Attribute::Velocity => self.velocity,
            Attribute::Start => self.start,
            Attribute::End => self.end,
        }
    }

    pub fn within_tolerance(&self, attribute: Attribute) -> bool {
        self.get(attribute) <= 1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub severities: Severities,
    /// The one attribute worth reporting, if any.
    pub reported: Option<Attribute>,
}

impl From<Attribute> for DiffType {
    fn from(attribute: Attribute) -> Self {
        match attribute {
            Attribute::Pitch => DiffType::Pitch,
            Attribute::Velocity => DiffType::Velocity,
            Attribute::Start => DiffType::Start,
            Attribute::End => DiffType::End,
        }
    }
}

/// Severities of a played note against the (tempo-rescaled) expected note.
///
/// Pitch is measured in cents from the tempered note nearest the expected
/// frequency, so a detuned score entry does not bias the result.
pub fn severities(ideal: &Note, actual: &Note, tolerances: &Tolerances) -> Result<Severities, DiffError> {
    let reference_note = note_from_frequency(ideal.pitch)?;
    let cents = cents_deviation(actual.pitch, reference_note)?;

    let velocity_delta = (f64::from(actual.velocity) - f64::from(ideal.velocity)).abs();
    let velocity_tolerance =
        (f64::from(ideal.velocity) * tolerances.velocity_ratio).max(tolerances.min_velocity);

    Ok(Severities {
        pitch: cents.abs() / tolerances.pitch_cents,
        velocity: velocity_delta / velocity_tolerance,
        start: (actual.start - ideal.start).abs() / tolerances.start_secs,
        end: (actual.end - ideal.end).abs() / tolerances.end_secs,
    })
}

/// Highest severity above 1.0; on equal severity the attribute listed first
/// in `priority` wins.
pub fn select_reportable(severities: &Severities, priority: &[Attribute]) -> Option<Attribute> {
    let mut best: Option<(Attribute, f64)> = None;
    for &attribute in priority {
        let severity = severities.get(attribute);
        if severity <= 1.0 {
            continue;
        }
        match best {
            Some((_, top)) if severity <= top => {}
            _ => best = Some((attribute, severity)),
        }
    }
    best.map(|(attribute, _)| attribute)
}

pub fn compare_notes(
    ideal: &Note,
    actual: &Note,
    tolerances: &Tolerances,
    priority: &[Attribute],
) -> Result<Comparison, DiffError> {
    let severities = severities(ideal, actual, tolerances)?;
    Ok(Comparison {
        severities,
        reported: select_reportable(&severities, priority),
    })
}
