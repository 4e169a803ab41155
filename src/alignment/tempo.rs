use crate::config::{AlignmentWeights, Tolerances};
use crate::types::Note;

/// Factor applied to expected timestamps so they share the recording's clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoScale {
    pub factor: f64,
    /// `false` when no usable tempo pair was supplied and timing is compared
    /// on raw timestamps.
    pub compensated: bool,
}

impl TempoScale {
    pub const IDENTITY: TempoScale = TempoScale {
        factor: 1.0,
        compensated: false,
    };

    /// `reference_tempo / observed_tempo`, or identity when either tempo is
    /// missing, non-finite or not positive, or their ratio is.
    pub fn resolve(reference_tempo: f64, observed_tempo: Option<f64>) -> Self {
        let usable = |value: f64| value.is_finite() && value > 0.0;
        let factor = observed_tempo
            .filter(|&observed| usable(observed) && usable(reference_tempo))
            .map(|observed| reference_tempo / observed)
            .filter(|&factor| usable(factor));
        match factor {
            Some(factor) => TempoScale {
                factor,
                compensated: true,
            },
            None => {
                tracing::warn!(
                    reference_tempo,
                    observed_tempo = ?observed_tempo,
                    "tempo: no usable tempo pair; timing diffs are not tempo-compensated"
                );
                Self::IDENTITY
            }
        }
    }

    pub fn apply(&self, note: &Note) -> Note {
        Note {
            start: note.start * self.factor,
            end: note.end * self.factor,
            ..*note
        }
    }

    pub fn apply_all(&self, notes: &mut [Note]) {
        for note in notes.iter_mut() {
            *note = self.apply(note);
        }
    }

    /// Timing tolerances are written in score seconds; stretch them onto the
    /// recording's clock alongside the expected notes.
    pub fn scale_tolerances(&self, tolerances: &Tolerances) -> Tolerances {
        Tolerances {
            start_secs: tolerances.start_secs * self.factor,
            end_secs: tolerances.end_secs * self.factor,
            ..tolerances.clone()
        }
    }

    /// Same for the aligner's time constants, so match costs and the band
    /// do not depend on how fast the piece was played.
    pub fn scale_weights(&self, weights: &AlignmentWeights) -> AlignmentWeights {
        AlignmentWeights {
            time_scale_secs: weights.time_scale_secs * self.factor,
            band_secs: weights.band_secs * self.factor,
            ..weights.clone()
        }
    }
}

/// Shifts a sequence so its first note starts at 0.0. Recordings usually
/// carry some lead-in before the first onset.
pub fn shift_start_to_zero(notes: &mut [Note]) {
    let Some(offset) = notes.first().map(|n| n.start) else {
        return;
    };
    for note in notes.iter_mut() {
        note.start -= offset;
        note.end -= offset;
    }
}
