use crate::alignment::classify::{classify, ClassifyContext};
use crate::alignment::dp::{AlignStep, Alignment};
use crate::alignment::emit::emit;
use crate::alignment::score::score_performance;
use crate::alignment::tempo::{shift_start_to_zero, TempoScale};
use crate::alignment::validation::validate_sequence;
use crate::config::DiffConfig;
use crate::error::DiffError;
use crate::pipeline::traits::{AttributeComparator, SequenceAligner};
use crate::types::{Condition, DiffInput, DiffMeta, DiffOutput, SequenceKind};

/// Compares a performance against its score. Holds no per-call state, so
/// one instance can serve any number of threads.
pub struct PerformanceDiffer {
    config: DiffConfig,
    sequence_aligner: Box<dyn SequenceAligner>,
    attribute_comparator: Box<dyn AttributeComparator>,
}

pub(crate) struct PerformanceDifferParts {
    pub config: DiffConfig,
    pub sequence_aligner: Box<dyn SequenceAligner>,
    pub attribute_comparator: Box<dyn AttributeComparator>,
}

impl PerformanceDiffer {
    pub(crate) fn from_parts(parts: PerformanceDifferParts) -> Self {
        Self {
            config: parts.config,
            sequence_aligner: parts.sequence_aligner,
            attribute_comparator: parts.attribute_comparator,
        }
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    pub fn diff(&self, input: &DiffInput) -> Result<DiffOutput, DiffError> {
        let mut warnings = Vec::new();
        let mut expected =
            validate_sequence(SequenceKind::Expected, &input.expected, &mut warnings)?;
        let mut actual = validate_sequence(SequenceKind::Actual, &input.actual, &mut warnings)?;

        let mut conditions = Vec::new();
        if expected.is_empty() {
            conditions.push(Condition::EmptyExpected);
        }
        if actual.is_empty() {
            conditions.push(Condition::EmptyActual);
        }

        let tempo = TempoScale::resolve(input.reference_tempo, input.observed_tempo);
        if !tempo.compensated {
            conditions.push(Condition::MissingTempo);
        }
        tempo.apply_all(&mut expected.notes);

        if self.config.anchor_first_onset {
            shift_start_to_zero(&mut expected.notes);
            shift_start_to_zero(&mut actual.notes);
        }

        let weights = tempo.scale_weights(&self.config.alignment);
        let aligned = self
            .sequence_aligner
            .align(&expected.notes, &actual.notes, &weights)?;
        check_alignment(&aligned, expected.len(), actual.len())?;
        // Only the checked path is trusted; the summary lists are derived from it.
        let alignment = Alignment::from_steps(aligned.steps);

        let comparisons = alignment
            .matches
            .iter()
            .map(|&(e, a)| {
                self.attribute_comparator
                    .compare(&expected.notes[e], &actual.notes[a], &tempo)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let ctx = ClassifyContext {
            alignment: &alignment,
            expected: &expected,
            actual: &actual,
            score: &input.expected,
        };
        let diffs = emit(classify(&ctx, &comparisons)?);

        let score = score_performance(
            &comparisons,
            expected.len(),
            alignment.unmatched_actual.len(),
            self.config.extra_note_penalty_percent,
        );

        tracing::debug!(
            expected = expected.len(),
            actual = actual.len(),
            matched = alignment.matches.len(),
            diffs = diffs.len(),
            warnings = warnings.len(),
            tempo_scale = tempo.factor,
            "diff: performance compared"
        );

        Ok(DiffOutput {
            diffs,
            warnings,
            meta: DiffMeta {
                tempo_compensated: tempo.compensated,
                tempo_scale: tempo.factor,
                conditions,
                expected_count: expected.len(),
                actual_count: actual.len(),
                matched_count: alignment.matches.len(),
            },
            score,
        })
    }
}

/// A pluggable aligner must visit every note exactly once, in order.
fn check_alignment(alignment: &Alignment, n: usize, m: usize) -> Result<(), DiffError> {
    let (mut next_expected, mut next_actual) = (0usize, 0usize);
    for step in &alignment.steps {
        let (expected, actual) = match *step {
            AlignStep::Match { expected, actual } => (Some(expected), Some(actual)),
            AlignStep::Missing { expected } => (Some(expected), None),
            AlignStep::Extra { actual } => (None, Some(actual)),
        };
        if let Some(expected) = expected {
            if expected != next_expected {
                return Err(DiffError::alignment(
                    "aligner output",
                    format!("expected index {expected} out of order (wanted {next_expected})"),
                ));
            }
            next_expected += 1;
        }
        if let Some(actual) = actual {
            if actual != next_actual {
                return Err(DiffError::alignment(
                    "aligner output",
                    format!("actual index {actual} out of order (wanted {next_actual})"),
                ));
            }
            next_actual += 1;
        }
    }
    if next_expected != n || next_actual != m {
        return Err(DiffError::alignment(
            "aligner output",
            format!("path covers {next_expected}/{n} expected and {next_actual}/{m} actual notes"),
        ));
    }
    Ok(())
}
