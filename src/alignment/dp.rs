use crate::config::AlignmentWeights;
use crate::error::DiffError;
use crate::pitch::semitone_distance;
use crate::types::Note;

/// Costs closer than this are treated as equal so tie-breaking stays
/// deterministic under floating-point noise.
const COST_EPSILON: f64 = 1e-9;

/// One move along the alignment path. Indices refer to the slices passed to
/// [`align_notes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignStep {
    Match { expected: usize, actual: usize },
    Missing { expected: usize },
    Extra { actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Alignment {
    /// Full path in order; both indices are non-decreasing along it.
    pub steps: Vec<AlignStep>,
    pub matches: Vec<(usize, usize)>,
    pub unmatched_expected: Vec<usize>,
    pub unmatched_actual: Vec<usize>,
}

impl Alignment {
    pub fn from_steps(steps: Vec<AlignStep>) -> Self {
        let mut matches = Vec::new();
        let mut unmatched_expected = Vec::new();
        let mut unmatched_actual = Vec::new();
        for step in &steps {
            match *step {
                AlignStep::Match { expected, actual } => matches.push((expected, actual)),
                AlignStep::Missing { expected } => unmatched_expected.push(expected),
                AlignStep::Extra { actual } => unmatched_actual.push(actual),
            }
        }
        Self {
            steps,
            matches,
            unmatched_expected,
            unmatched_actual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Origin,
    Match,
    SkipExpected,
    SkipActual,
}

/// Inclusive range of DP columns evaluated for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowWindow {
    start: usize,
    end: usize,
}

impl RowWindow {
    fn contains(&self, j: usize) -> bool {
        j >= self.start && j <= self.end
    }

    fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Cost of pairing an expected note with a played note, or `None` when the
/// onsets are too far apart to ever be the same note.
pub fn match_cost(expected: &Note, actual: &Note, weights: &AlignmentWeights) -> Option<f64> {
    let onset_delta = (actual.start - expected.start).abs();
    if !(onset_delta <= weights.band_secs) {
        return None;
    }
    let semitones = semitone_distance(actual.pitch, expected.pitch)
        .ok()?
        .min(weights.pitch_cost_cap_semitones);
    Some(
        weights.time_weight * onset_delta / weights.time_scale_secs
            + weights.pitch_weight * semitones,
    )
}

/// Minimum-cost monotonic alignment of two start-ordered note sequences.
///
/// Match pairs one expected with one played note, `Missing` skips an
/// expected note and `Extra` skips a played one. Ties prefer a match, then
/// the skip that keeps the earlier-starting note first on the path.
pub fn align_notes(
    expected: &[Note],
    actual: &[Note],
    weights: &AlignmentWeights,
) -> Result<Alignment, DiffError> {
    let n = expected.len();
    let m = actual.len();
    if n == 0 || m == 0 {
        let steps = (0..n)
            .map(|expected| AlignStep::Missing { expected })
            .chain((0..m).map(|actual| AlignStep::Extra { actual }))
            .collect();
        return Ok(Alignment::from_steps(steps));
    }

    let cells = (n + 1).saturating_mul(m + 1);
    let windows = if cells <= weights.full_dp_cell_limit {
        vec![RowWindow { start: 0, end: m }; n + 1]
    } else {
        banded_windows(expected, actual, weights.band_secs)
    };
    tracing::debug!(
        expected_len = n,
        actual_len = m,
        cells,
        banded = cells > weights.full_dp_cell_limit,
        "dp: aligning sequences"
    );

    let mut steps_by_row: Vec<Vec<Step>> = Vec::with_capacity(n + 1);

    let row0 = windows[0];
    let mut prev_cost: Vec<f64> = (row0.start..=row0.end)
        .map(|j| j as f64 * weights.extra_penalty)
        .collect();
    steps_by_row.push(
        (row0.start..=row0.end)
            .map(|j| if j == 0 { Step::Origin } else { Step::SkipActual })
            .collect(),
    );
    let mut prev_window = row0;

    for i in 1..=n {
        let window = windows[i];
        let expected_note = &expected[i - 1];
        let mut curr_cost = vec![f64::INFINITY; window.len()];
        let mut curr_steps = vec![Step::Origin; window.len()];

        for j in window.start..=window.end {
            let match_c = if j >= 1 && prev_window.contains(j - 1) {
                let base = prev_cost[j - 1 - prev_window.start];
                match match_cost(expected_note, &actual[j - 1], weights) {
                    Some(cost) if base.is_finite() => base + cost,
                    _ => f64::INFINITY,
                }
            } else {
                f64::INFINITY
            };
            let missing_c = if prev_window.contains(j) {
                prev_cost[j - prev_window.start] + weights.missing_penalty
            } else {
                f64::INFINITY
            };
            let extra_c = if j > window.start {
                curr_cost[j - 1 - window.start] + weights.extra_penalty
            } else {
                f64::INFINITY
            };

            let actual_start = if j >= 1 { Some(actual[j - 1].start) } else { None };
            let (cost, step) = choose_step(
                match_c,
                missing_c,
                extra_c,
                expected_note.start,
                actual_start,
            );
            curr_cost[j - window.start] = cost;
            curr_steps[j - window.start] = step;
        }

        steps_by_row.push(curr_steps);
        prev_cost = curr_cost;
        prev_window = window;
    }

    let total_cost = prev_cost[m - prev_window.start];
    if !total_cost.is_finite() {
        return Err(DiffError::alignment(
            "dp",
            format!("no finite path to ({n}, {m})"),
        ));
    }

    let steps = backtrack(&steps_by_row, &windows, n, m)?;
    let alignment = Alignment::from_steps(steps);
    tracing::debug!(
        total_cost,
        matched = alignment.matches.len(),
        missing = alignment.unmatched_expected.len(),
        extra = alignment.unmatched_actual.len(),
        "dp: alignment complete"
    );
    Ok(alignment)
}

#[inline]
fn choose_step(
    match_c: f64,
    missing_c: f64,
    extra_c: f64,
    expected_start: f64,
    actual_start: Option<f64>,
) -> (f64, Step) {
    let skip = if missing_c < extra_c - COST_EPSILON {
        (missing_c, Step::SkipExpected)
    } else if extra_c < missing_c - COST_EPSILON {
        (extra_c, Step::SkipActual)
    } else {
        // The step into (i, j) is the last one taken, so the later-starting
        // note is the one consumed here. Equal onsets put the expected note
        // first on the path.
        match actual_start {
            Some(actual_start) if expected_start <= actual_start => (extra_c, Step::SkipActual),
            _ => (missing_c, Step::SkipExpected),
        }
    };

    if match_c.is_finite() && match_c <= skip.0 + COST_EPSILON {
        (match_c, Step::Match)
    } else {
        skip
    }
}

fn backtrack(
    steps_by_row: &[Vec<Step>],
    windows: &[RowWindow],
    n: usize,
    m: usize,
) -> Result<Vec<AlignStep>, DiffError> {
    let mut path = Vec::with_capacity(n + m);
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        let window = windows[i];
        if !window.contains(j) {
            return Err(DiffError::alignment(
                "dp backtrack",
                format!("cell ({i}, {j}) outside evaluated window"),
            ));
        }
        match steps_by_row[i][j - window.start] {
            Step::Match => {
                path.push(AlignStep::Match {
                    expected: i - 1,
                    actual: j - 1,
                });
                i -= 1;
                j -= 1;
            }
            Step::SkipExpected => {
                path.push(AlignStep::Missing { expected: i - 1 });
                i -= 1;
            }
            Step::SkipActual => {
                path.push(AlignStep::Extra { actual: j - 1 });
                j -= 1;
            }
            Step::Origin => {
                return Err(DiffError::alignment(
                    "dp backtrack",
                    format!("reached origin marker at ({i}, {j})"),
                ));
            }
        }
    }
    path.reverse();
    Ok(path)
}

/// Per-row column windows covering every match inside the time band.
///
/// Row `i` starts at the first played note inside the band of
/// `expected[i - 1]` and ends where the band of `expected[i]` ends, so every
/// diagonal into the next row has its source cell evaluated. Windows are
/// monotone and overlap their predecessor, so a skip-only path from `(0, 0)`
/// to `(n, m)` always exists.
fn banded_windows(expected: &[Note], actual: &[Note], band_secs: f64) -> Vec<RowWindow> {
    let n = expected.len();
    let m = actual.len();

    // (played notes starting before the band, played notes starting before its end)
    let mut bounds = Vec::with_capacity(n);
    let mut below = 0usize;
    let mut upto = 0usize;
    for note in expected {
        while below < m && actual[below].start < note.start - band_secs {
            below += 1;
        }
        upto = upto.max(below);
        while upto < m && actual[upto].start <= note.start + band_secs {
            upto += 1;
        }
        bounds.push((below, upto));
    }

    (0..=n)
        .map(|row| RowWindow {
            start: if row == 0 { 0 } else { bounds[row - 1].0 },
            end: if row == n { m } else { bounds[row].1 },
        })
        .collect()
}
