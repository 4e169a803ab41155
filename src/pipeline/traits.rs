use crate::alignment::compare::Comparison;
use crate::alignment::dp::Alignment;
use crate::alignment::tempo::TempoScale;
use crate::config::AlignmentWeights;
use crate::error::DiffError;
use crate::types::Note;

/// Finds a monotonic correspondence between two start-ordered sequences.
pub trait SequenceAligner: Send + Sync {
    fn align(
        &self,
        expected: &[Note],
        actual: &[Note],
        weights: &AlignmentWeights,
    ) -> Result<Alignment, DiffError>;
}

/// Judges one matched pair. `ideal` is already on the recording's clock;
/// `tempo` is the factor that put it there, for stretching timing tolerances.
pub trait AttributeComparator: Send + Sync {
    fn compare(
        &self,
        ideal: &Note,
        actual: &Note,
        tempo: &TempoScale,
    ) -> Result<Comparison, DiffError>;
}
