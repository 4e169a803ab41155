use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DiffError;

/// Matched-pair attributes the comparator can report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Pitch,
    Velocity,
    Start,
    End,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [
        Attribute::Pitch,
        Attribute::Velocity,
        Attribute::Start,
        Attribute::End,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::Pitch => "pitch",
            Attribute::Velocity => "velocity",
            Attribute::Start => "start",
            Attribute::End => "end",
        }
    }
}

/// Deviation allowed before a matched pair is reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    pub pitch_cents: f64,
    /// Fraction of the ideal velocity.
    pub velocity_ratio: f64,
    /// Lower bound for the velocity tolerance. The effective tolerance is
    /// `max(ideal * velocity_ratio, min_velocity)` rather than a plain 20% of
    /// the ideal, so quiet notes are not flagged for a single unit of
    /// difference and a velocity-0 ideal still has a non-zero tolerance.
    pub min_velocity: f64,
    pub start_secs: f64,
    pub end_secs: f64,
}

impl Tolerances {
    pub const DEFAULT_PITCH_CENTS: f64 = 50.0;
    pub const DEFAULT_VELOCITY_RATIO: f64 = 0.2;
    pub const DEFAULT_MIN_VELOCITY: f64 = 1.0;
    pub const DEFAULT_TIMING_SECS: f64 = 0.15;
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            pitch_cents: Self::DEFAULT_PITCH_CENTS,
            velocity_ratio: Self::DEFAULT_VELOCITY_RATIO,
            min_velocity: Self::DEFAULT_MIN_VELOCITY,
            start_secs: Self::DEFAULT_TIMING_SECS,
            end_secs: Self::DEFAULT_TIMING_SECS,
        }
    }
}

/// Cost model of the alignment DP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentWeights {
    pub time_weight: f64,
    /// Onset difference that costs `time_weight`.
    pub time_scale_secs: f64,
    /// Cost per semitone of pitch distance.
    pub pitch_weight: f64,
    pub pitch_cost_cap_semitones: f64,
    pub missing_penalty: f64,
    pub extra_penalty: f64,
    /// Notes further apart than this (rescaled time) are never matched.
    pub band_secs: f64,
    /// Above this many DP cells the search is restricted to the time band.
    pub full_dp_cell_limit: usize,
}

impl Default for AlignmentWeights {
    fn default() -> Self {
        Self {
            time_weight: 1.0,
            time_scale_secs: 0.5,
            pitch_weight: 0.25,
            pitch_cost_cap_semitones: 12.0,
            missing_penalty: 2.0,
            extra_penalty: 2.0,
            band_secs: 4.0,
            full_dp_cell_limit: 4_000_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub tolerances: Tolerances,
    pub alignment: AlignmentWeights,
    /// Tie-break order when several attributes share the highest severity.
    pub priority: Vec<Attribute>,
    /// Percentage points removed from tuning accuracy per extra note.
    pub extra_note_penalty_percent: f64,
    /// Shift both sequences so their first note starts at 0.0.
    pub anchor_first_onset: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            tolerances: Tolerances::default(),
            alignment: AlignmentWeights::default(),
            priority: Attribute::ALL.to_vec(),
            extra_note_penalty_percent: 5.0,
            anchor_first_onset: false,
        }
    }
}

impl DiffConfig {
    pub fn load(path: &Path) -> Result<Self, DiffError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| DiffError::io("read diff config", e))?;
        serde_json::from_str(&data).map_err(|e| DiffError::json("parse diff config", e))
    }

    pub fn validate(&self) -> Result<(), DiffError> {
        let t = &self.tolerances;
        require_positive("tolerances.pitch_cents", t.pitch_cents)?;
        require_positive("tolerances.velocity_ratio", t.velocity_ratio)?;
        require_positive("tolerances.min_velocity", t.min_velocity)?;
        require_positive("tolerances.start_secs", t.start_secs)?;
        require_positive("tolerances.end_secs", t.end_secs)?;

        let a = &self.alignment;
        require_non_negative("alignment.time_weight", a.time_weight)?;
        require_positive("alignment.time_scale_secs", a.time_scale_secs)?;
        require_non_negative("alignment.pitch_weight", a.pitch_weight)?;
        require_non_negative("alignment.pitch_cost_cap_semitones", a.pitch_cost_cap_semitones)?;
        require_non_negative("alignment.missing_penalty", a.missing_penalty)?;
        require_non_negative("alignment.extra_penalty", a.extra_penalty)?;
        require_positive("alignment.band_secs", a.band_secs)?;

        require_non_negative("extra_note_penalty_percent", self.extra_note_penalty_percent)?;

        if self.priority.len() != Attribute::ALL.len()
            || Attribute::ALL
                .iter()
                .any(|attr| !self.priority.contains(attr))
        {
            return Err(DiffError::invalid_config(format!(
                "priority must list each of pitch, velocity, start, end exactly once (got {:?})",
                self.priority
            )));
        }
        Ok(())
    }
}

fn require_positive(field: &str, value: f64) -> Result<(), DiffError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DiffError::invalid_config(format!(
            "{field} must be finite and > 0 (got {value})"
        )))
    }
}

fn require_non_negative(field: &str, value: f64) -> Result<(), DiffError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DiffError::invalid_config(format!(
            "{field} must be finite and >= 0 (got {value})"
        )))
    }
}
