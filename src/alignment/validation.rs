use crate::error::{DiffError, NoteIssue, NoteWarning};
use crate::types::{ExpectedNote, Note, SequenceKind};

/// Highest MIDI velocity.
pub const MAX_VELOCITY: u8 = 127;

/// Anything that carries a [`Note`] and can take part in alignment.
pub trait SequenceNote {
    fn note(&self) -> &Note;

    /// Score rests hold a place in the measure but are never aligned.
    fn is_rest(&self) -> bool {
        false
    }
}

impl SequenceNote for Note {
    fn note(&self) -> &Note {
        self
    }
}

impl SequenceNote for ExpectedNote {
    fn note(&self) -> &Note {
        &self.note
    }

    fn is_rest(&self) -> bool {
        ExpectedNote::is_rest(self)
    }
}

/// Notes that passed validation, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedSequence {
    pub notes: Vec<Note>,
    /// `original_indices[k]` is the caller's index of `notes[k]`.
    pub original_indices: Vec<usize>,
}

impl ValidatedSequence {
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Checks the shape of a single note.
pub fn check_note(note: &Note) -> Result<(), NoteIssue> {
    if !(note.pitch.is_finite() && note.pitch > 0.0) {
        return Err(NoteIssue::InvalidPitch { pitch: note.pitch });
    }
    if !(note.start.is_finite() && note.end.is_finite() && note.start >= 0.0 && note.end > note.start)
    {
        return Err(NoteIssue::InvalidInterval {
            start: note.start,
            end: note.end,
        });
    }
    if note.velocity > MAX_VELOCITY {
        return Err(NoteIssue::InvalidVelocity {
            velocity: note.velocity,
        });
    }
    Ok(())
}

/// Drops rests and invalid notes, recording a warning for each invalid one,
/// then enforces the non-decreasing start order the aligner relies on.
pub fn validate_sequence<T: SequenceNote>(
    sequence: SequenceKind,
    input: &[T],
    warnings: &mut Vec<NoteWarning>,
) -> Result<ValidatedSequence, DiffError> {
    let mut validated = ValidatedSequence {
        notes: Vec::with_capacity(input.len()),
        original_indices: Vec::with_capacity(input.len()),
    };

    for (index, item) in input.iter().enumerate() {
        if item.is_rest() {
            continue;
        }
        let note = item.note();
        if let Err(issue) = check_note(note) {
            tracing::warn!(
                sequence = sequence.as_str(),
                index,
                issue = %issue,
                "validation: note excluded from alignment"
            );
            warnings.push(NoteWarning {
                sequence,
                index,
                issue,
            });
            continue;
        }

        if let Some(previous) = validated.notes.last() {
            if note.start < previous.start {
                return Err(DiffError::UnorderedSequence { sequence, index });
            }
        }
        validated.notes.push(*note);
        validated.original_indices.push(index);
    }

    Ok(validated)
}
