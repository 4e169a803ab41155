use std::fmt;

use serde::{Deserialize, Serialize};

use crate::alignment::score::PerformanceScore;
use crate::error::NoteWarning;

/// One sounded note: frequency in Hz, MIDI-style velocity and a
/// `[start, end)` interval in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: f64,
    pub velocity: u8,
    pub start: f64,
    pub end: f64,
}

impl Note {
    pub fn new(pitch: f64, velocity: u8, start: f64, end: f64) -> Self {
        Self {
            pitch,
            velocity,
            start,
            end,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A note observed in the recording. It carries no musical metadata.
pub type ActualNote = Note;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    #[default]
    Note,
    Rest,
}

/// A note from the score together with where it sits in the piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedNote {
    #[serde(flatten)]
    pub note: Note,
    /// Pitch class and octave, e.g. `"C#4"`, or `"Rest"`.
    pub name: String,
    /// Duration class as written in the score, e.g. `"dotted quarter"`.
    #[serde(rename = "type")]
    pub duration_type: String,
    pub measure: u32,
    /// 1-based order within the measure.
    pub position: u32,
    #[serde(default)]
    pub element: ElementKind,
}

impl ExpectedNote {
    pub fn is_rest(&self) -> bool {
        self.element == ElementKind::Rest
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceKind {
    Expected,
    Actual,
}

impl SequenceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SequenceKind::Expected => "expected",
            SequenceKind::Actual => "actual",
        }
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffType {
    Pitch,
    Velocity,
    Start,
    End,
    Extra,
    Missing,
}

impl DiffType {
    pub fn as_str(self) -> &'static str {
        match self {
            DiffType::Pitch => "pitch",
            DiffType::Velocity => "velocity",
            DiffType::Start => "start",
            DiffType::End => "end",
            DiffType::Extra => "extra",
            DiffType::Missing => "missing",
        }
    }
}

/// Where a run of extra notes sits relative to the expected notes around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    Before,
    Between,
    After,
}

/// Score context attached to a diff: the expected note itself for matched
/// and missing diffs, the surrounding reference notes for extras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteInfo {
    Note(ExpectedNote),
    Context(Vec<ExpectedNote>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffBody {
    pub diff_type: DiffType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal_idx: Option<usize>,
    pub ideal_val: Option<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_idx: Option<usize>,
    pub actual_val: Option<Note>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diff {
    pub diff: DiffBody,
    pub note_info: NoteInfo,
    pub description: Option<Placement>,
    /// Every recorded note of a merged extra run, in recording order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_notes: Vec<Note>,
}

impl Diff {
    pub fn diff_type(&self) -> DiffType {
        self.diff.diff_type
    }

    /// Measure this diff is presented under. Extras take the measure of
    /// their first reference note; extras with no reference have none.
    pub fn measure(&self) -> Option<u32> {
        match &self.note_info {
            NoteInfo::Note(expected) => Some(expected.measure),
            NoteInfo::Context(references) => references.first().map(|r| r.measure),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiffInput {
    pub expected: Vec<ExpectedNote>,
    pub actual: Vec<ActualNote>,
    /// Tempo (BPM) the expected timestamps were rendered at.
    pub reference_tempo: f64,
    /// Performer's average tempo (BPM). `None` disables tempo compensation.
    pub observed_tempo: Option<f64>,
}

/// Degraded-input situations that still produce a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    EmptyExpected,
    EmptyActual,
    MissingTempo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffMeta {
    pub tempo_compensated: bool,
    pub tempo_scale: f64,
    pub conditions: Vec<Condition>,
    pub expected_count: usize,
    pub actual_count: usize,
    pub matched_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffOutput {
    pub diffs: Vec<Diff>,
    pub warnings: Vec<NoteWarning>,
    pub meta: DiffMeta,
    pub score: Option<PerformanceScore>,
}
