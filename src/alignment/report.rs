use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alignment::emit::{group_by_measure, MeasureGroup};
use crate::alignment::score::PerformanceScore;
use crate::error::{DiffError, NoteWarning};
use crate::types::{ActualNote, Condition, Diff, DiffOutput, DiffType, ExpectedNote};

pub const SCHEMA_VERSION: u32 = 1;

/// Score notes as rendered at `tempo` BPM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreFile {
    pub tempo: f64,
    pub notes: Vec<ExpectedNote>,
}

/// Notes extracted from a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingFile {
    pub notes: Vec<ActualNote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_tempo: Option<f64>,
}

pub fn load_score(path: &Path) -> Result<ScoreFile, DiffError> {
    let data = std::fs::read_to_string(path).map_err(|e| DiffError::io("read score file", e))?;
    serde_json::from_str(&data).map_err(|e| DiffError::json("parse score file", e))
}

pub fn load_recording(path: &Path) -> Result<RecordingFile, DiffError> {
    let data =
        std::fs::read_to_string(path).map_err(|e| DiffError::io("read recording file", e))?;
    serde_json::from_str(&data).map_err(|e| DiffError::json("parse recording file", e))
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    #[serde(flatten)]
    pub body: ReportBody,
    pub warnings: Vec<NoteWarning>,
    pub conditions: Vec<Condition>,
    pub score: Option<PerformanceScore>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub expected_path: String,
    pub actual_path: String,
    pub reference_tempo: f64,
    pub observed_tempo: Option<f64>,
    pub tempo_compensated: bool,
    pub tempo_scale: f64,
    pub expected_count: usize,
    pub actual_count: usize,
    pub matched_count: usize,
    pub counts: DiffCounts,
}

/// Diffs either as one flat list (`"diffs"`) or per measure (`"measures"`).
#[derive(Debug, Clone, Serialize)]
pub enum ReportBody {
    #[serde(rename = "diffs")]
    Flat(Vec<Diff>),
    #[serde(rename = "measures")]
    Grouped(Vec<MeasureGroup>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffCounts {
    pub total: u32,
    pub pitch: u32,
    pub velocity: u32,
    pub start: u32,
    pub end: u32,
    pub extra: u32,
    pub missing: u32,
}

impl DiffCounts {
    pub fn from_diffs(diffs: &[Diff]) -> Self {
        let mut counts = Self::default();
        for diff in diffs {
            counts.total += 1;
            let slot = match diff.diff_type() {
                DiffType::Pitch => &mut counts.pitch,
                DiffType::Velocity => &mut counts.velocity,
                DiffType::Start => &mut counts.start,
                DiffType::End => &mut counts.end,
                DiffType::Extra => &mut counts.extra,
                DiffType::Missing => &mut counts.missing,
            };
            *slot += 1;
        }
        counts
    }
}

/// Where the compared sequences came from.
#[derive(Debug, Clone)]
pub struct ReportSource {
    pub generated_at: String,
    pub expected_path: String,
    pub actual_path: String,
    pub reference_tempo: f64,
    pub observed_tempo: Option<f64>,
}

pub fn build_report(source: ReportSource, output: DiffOutput, group: bool) -> Report {
    let counts = DiffCounts::from_diffs(&output.diffs);
    let body = if group {
        ReportBody::Grouped(group_by_measure(&output.diffs))
    } else {
        ReportBody::Flat(output.diffs)
    };

    Report {
        schema_version: SCHEMA_VERSION,
        meta: Meta {
            generated_at: source.generated_at,
            expected_path: source.expected_path,
            actual_path: source.actual_path,
            reference_tempo: source.reference_tempo,
            observed_tempo: source.observed_tempo,
            tempo_compensated: output.meta.tempo_compensated,
            tempo_scale: output.meta.tempo_scale,
            expected_count: output.meta.expected_count,
            actual_count: output.meta.actual_count,
            matched_count: output.meta.matched_count,
            counts,
        },
        body,
        warnings: output.warnings,
        conditions: output.meta.conditions,
        score: output.score,
    }
}
