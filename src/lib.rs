pub mod alignment;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod pitch;
pub mod types;

pub use alignment::emit::{flatten_groups, group_by_measure, MeasureGroup};
pub use alignment::report::{
    build_report, load_recording, load_score, RecordingFile, Report, ReportSource, ScoreFile,
};
pub use alignment::score::PerformanceScore;
pub use config::{AlignmentWeights, Attribute, DiffConfig, Tolerances};
pub use error::{DiffError, NoteIssue, NoteWarning};
pub use pipeline::builder::PerformanceDifferBuilder;
pub use pipeline::runtime::PerformanceDiffer;
pub use pipeline::traits::{AttributeComparator, SequenceAligner};
pub use types::{
    ActualNote, Condition, Diff, DiffBody, DiffInput, DiffMeta, DiffOutput, DiffType,
    ElementKind, ExpectedNote, Note, NoteInfo, Placement, SequenceKind,
};

/// Diffs a performance against its score with the default configuration.
///
/// `reference_tempo` is the BPM the expected timestamps were rendered at;
/// `observed_tempo` the performer's average BPM, if known.
pub fn diff(
    expected: &[ExpectedNote],
    actual: &[ActualNote],
    reference_tempo: f64,
    observed_tempo: Option<f64>,
) -> Result<DiffOutput, DiffError> {
    let differ = PerformanceDifferBuilder::new(DiffConfig::default()).build()?;
    differ.diff(&DiffInput {
        expected: expected.to_vec(),
        actual: actual.to_vec(),
        reference_tempo,
        observed_tempo,
    })
}
