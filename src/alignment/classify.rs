//! Turns an alignment path into diff records.
//!
//! Matched pairs become at most one attribute diff each, unmatched expected
//! notes become `missing` diffs, and runs of unmatched played notes are
//! merged into a single `extra` diff placed relative to the score notes
//! around them.

use crate::alignment::compare::Comparison;
use crate::alignment::dp::{AlignStep, Alignment};
use crate::alignment::emit::AnchoredDiff;
use crate::alignment::validation::ValidatedSequence;
use crate::error::DiffError;
use crate::types::{Diff, DiffBody, DiffType, ExpectedNote, NoteInfo, Placement};

/// Everything the classifier reads. Alignment indices refer to the
/// validated sequences; diff indices are translated back to the caller's.
pub struct ClassifyContext<'a> {
    pub alignment: &'a Alignment,
    /// Validated expected notes after tempo rescaling.
    pub expected: &'a ValidatedSequence,
    pub actual: &'a ValidatedSequence,
    /// The caller's expected notes, used as `note_info`.
    pub score: &'a [ExpectedNote],
}

impl ClassifyContext<'_> {
    fn score_note(&self, expected: usize) -> Result<ExpectedNote, DiffError> {
        self.expected
            .original_indices
            .get(expected)
            .and_then(|&original| self.score.get(original))
            .cloned()
            .ok_or_else(|| {
                DiffError::alignment(
                    "classify",
                    format!("expected index {expected} has no score note"),
                )
            })
    }
}

/// A merged run of extra notes, by validated actual index.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ExtraRun {
    /// Path positions of the first and last extra in the run.
    first_position: usize,
    last_position: usize,
    actual: Vec<usize>,
}

/// Reference expected notes found on each side of every path position.
struct References {
    before: Vec<Option<usize>>,
    after: Vec<Option<usize>>,
}

impl References {
    /// Nearest matched expected note on each side, falling back to the
    /// nearest missing one when that side has no match.
    fn scan(steps: &[AlignStep]) -> Self {
        let len = steps.len();
        let mut before = vec![None; len];
        let mut after = vec![None; len];

        let (mut matched, mut missing) = (None, None);
        for (position, step) in steps.iter().enumerate() {
            before[position] = matched.or(missing);
            match *step {
                AlignStep::Match { expected, .. } => matched = Some(expected),
                AlignStep::Missing { expected } => missing = Some(expected),
                AlignStep::Extra { .. } => {}
            }
        }

        let (mut matched, mut missing) = (None, None);
        for (position, step) in steps.iter().enumerate().rev() {
            after[position] = matched.or(missing);
            match *step {
                AlignStep::Match { expected, .. } => matched = Some(expected),
                AlignStep::Missing { expected } => missing = Some(expected),
                AlignStep::Extra { .. } => {}
            }
        }

        Self { before, after }
    }
}

fn extra_runs(steps: &[AlignStep], actual: &ValidatedSequence) -> Vec<ExtraRun> {
    let mut runs: Vec<ExtraRun> = Vec::new();
    for (position, step) in steps.iter().enumerate() {
        let AlignStep::Extra { actual: index } = *step else {
            continue;
        };
        let original = actual.original_indices[index];
        let extends_last = runs.last().is_some_and(|run| {
            run.actual
                .last()
                .is_some_and(|&last| actual.original_indices[last] + 1 == original)
        });
        match runs.last_mut() {
            Some(run) if extends_last => {
                run.actual.push(index);
                run.last_position = position;
            }
            _ => runs.push(ExtraRun {
                first_position: position,
                last_position: position,
                actual: vec![index],
            }),
        }
    }
    runs
}

fn extra_diff(
    ctx: &ClassifyContext<'_>,
    run: &ExtraRun,
    references: &References,
) -> Result<Diff, DiffError> {
    let previous = references.before[run.first_position];
    let next = references.after[run.last_position];

    let (description, reference_indices) = match (previous, next) {
        (Some(previous), Some(next)) => (Some(Placement::Between), vec![previous, next]),
        (None, Some(next)) => (Some(Placement::Before), vec![next]),
        (Some(previous), None) => (Some(Placement::After), vec![previous]),
        (None, None) => (None, Vec::new()),
    };
    let note_info = reference_indices
        .into_iter()
        .map(|index| ctx.score_note(index))
        .collect::<Result<Vec<_>, _>>()?;

    let extra_notes: Vec<_> = run.actual.iter().map(|&k| ctx.actual.notes[k]).collect();
    let first = run.actual[0];

    Ok(Diff {
        diff: DiffBody {
            diff_type: DiffType::Extra,
            ideal_idx: None,
            ideal_val: None,
            actual_idx: Some(ctx.actual.original_indices[first]),
            actual_val: extra_notes.first().copied(),
        },
        note_info: NoteInfo::Context(note_info),
        description,
        extra_notes,
    })
}

fn missing_diff(ctx: &ClassifyContext<'_>, expected: usize) -> Result<Diff, DiffError> {
    Ok(Diff {
        diff: DiffBody {
            diff_type: DiffType::Missing,
            ideal_idx: Some(ctx.expected.original_indices[expected]),
            ideal_val: Some(ctx.expected.notes[expected]),
            actual_idx: None,
            actual_val: None,
        },
        note_info: NoteInfo::Note(ctx.score_note(expected)?),
        description: None,
        extra_notes: Vec::new(),
    })
}

fn deviation_diff(
    ctx: &ClassifyContext<'_>,
    expected: usize,
    actual: usize,
    diff_type: DiffType,
) -> Result<Diff, DiffError> {
    Ok(Diff {
        diff: DiffBody {
            diff_type,
            ideal_idx: Some(ctx.expected.original_indices[expected]),
            ideal_val: Some(ctx.expected.notes[expected]),
            actual_idx: Some(ctx.actual.original_indices[actual]),
            actual_val: Some(ctx.actual.notes[actual]),
        },
        note_info: NoteInfo::Note(ctx.score_note(expected)?),
        description: None,
        extra_notes: Vec::new(),
    })
}

/// Walks the path once and produces every diff anchored at its path
/// position. `comparisons[k]` belongs to `alignment.matches[k]`.
pub fn classify(
    ctx: &ClassifyContext<'_>,
    comparisons: &[Comparison],
) -> Result<Vec<AnchoredDiff>, DiffError> {
    let steps = &ctx.alignment.steps;
    if comparisons.len() != ctx.alignment.matches.len() {
        return Err(DiffError::alignment(
            "classify",
            format!(
                "{} comparisons for {} matched pairs",
                comparisons.len(),
                ctx.alignment.matches.len()
            ),
        ));
    }

    let references = References::scan(steps);
    let mut runs = extra_runs(steps, ctx.actual).into_iter().peekable();
    let mut comparisons = comparisons.iter();
    let mut diffs = Vec::new();

    for (position, step) in steps.iter().enumerate() {
        match *step {
            AlignStep::Match { expected, actual } => {
                let reported = comparisons.next().and_then(|c| c.reported);
                if let Some(attribute) = reported {
                    diffs.push(AnchoredDiff {
                        position,
                        diff: deviation_diff(ctx, expected, actual, attribute.into())?,
                    });
                }
            }
            AlignStep::Missing { expected } => diffs.push(AnchoredDiff {
                position,
                diff: missing_diff(ctx, expected)?,
            }),
            AlignStep::Extra { .. } => {
                if let Some(run) = runs.next_if(|run| run.first_position == position) {
                    diffs.push(AnchoredDiff {
                        position,
                        diff: extra_diff(ctx, &run, &references)?,
                    });
                }
            }
        }
    }

    tracing::debug!(
        steps = steps.len(),
        diffs = diffs.len(),
        "classify: path converted to diffs"
    );
    Ok(diffs)
}
