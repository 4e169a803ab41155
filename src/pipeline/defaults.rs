use crate::alignment::compare::{compare_notes, Comparison};
use crate::alignment::dp::{align_notes, Alignment};
use crate::alignment::tempo::TempoScale;
use crate::config::{AlignmentWeights, Attribute, Tolerances};
use crate::error::DiffError;
use crate::pipeline::traits::{AttributeComparator, SequenceAligner};
use crate::types::Note;

pub struct DpSequenceAligner;

impl SequenceAligner for DpSequenceAligner {
    fn align(
        &self,
        expected: &[Note],
        actual: &[Note],
        weights: &AlignmentWeights,
    ) -> Result<Alignment, DiffError> {
        align_notes(expected, actual, weights)
    }
}

pub struct ToleranceComparator {
    tolerances: Tolerances,
    priority: Vec<Attribute>,
}

impl ToleranceComparator {
    pub fn new(tolerances: Tolerances, priority: Vec<Attribute>) -> Self {
        Self {
            tolerances,
            priority,
        }
    }
}

impl AttributeComparator for ToleranceComparator {
    fn compare(
        &self,
        ideal: &Note,
        actual: &Note,
        tempo: &TempoScale,
    ) -> Result<Comparison, DiffError> {
        let tolerances = tempo.scale_tolerances(&self.tolerances);
        compare_notes(ideal, actual, &tolerances, &self.priority)
    }
}
