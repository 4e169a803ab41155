use serde::{Deserialize, Serialize};

use crate::alignment::compare::Comparison;
use crate::config::Attribute;

/// Summary percentages for one performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceScore {
    pub tuning_accuracy: f64,
    pub dynamics_accuracy: f64,
    pub timing_accuracy: f64,
    pub matched_notes: usize,
    pub missing_notes: usize,
    pub extra_notes: usize,
}

fn percent(count: usize, total: usize) -> f64 {
    count as f64 / total as f64 * 100.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Scores matched pairs against all valid expected notes. Each extra played
/// note costs `extra_note_penalty_percent` of tuning accuracy.
///
/// Returns `None` when there are no expected notes to score against.
pub fn score_performance(
    comparisons: &[Comparison],
    expected_count: usize,
    extra_count: usize,
    extra_note_penalty_percent: f64,
) -> Option<PerformanceScore> {
    if expected_count == 0 {
        return None;
    }

    let count = |ok: fn(&Comparison) -> bool| comparisons.iter().filter(|c| ok(c)).count();
    let in_tune = count(|c| c.severities.within_tolerance(Attribute::Pitch));
    let dynamics = count(|c| c.severities.within_tolerance(Attribute::Velocity));
    let timing = count(|c| {
        c.severities.within_tolerance(Attribute::Start)
            && c.severities.within_tolerance(Attribute::End)
    });

    let tuning = percent(in_tune, expected_count) - extra_count as f64 * extra_note_penalty_percent;

    Some(PerformanceScore {
        tuning_accuracy: round2(tuning.max(0.0)),
        dynamics_accuracy: round2(percent(dynamics, expected_count)),
        timing_accuracy: round2(percent(timing, expected_count)),
        matched_notes: comparisons.len(),
        missing_notes: expected_count.saturating_sub(comparisons.len()),
        extra_notes: extra_count,
    })
}
