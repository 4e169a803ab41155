use std::sync::Arc;

use performance_diff::pitch::{cents_deviation, frequency_to_note_name, note_from_frequency};
use performance_diff::{
    diff, flatten_groups, group_by_measure, Condition, DiffConfig, DiffInput, DiffOutput,
    DiffType, ElementKind, ExpectedNote, Note, NoteInfo, PerformanceDifferBuilder, Placement,
    SequenceKind,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const DEFAULT_SEED: u64 = 0x5eed_2024;
const REFERENCE_TEMPO: f64 = 96.0;
const NOTES_PER_MEASURE: usize = 4;

/// C major, C4 to C5.
const SCALE_HZ: [f64; 8] = [261.63, 293.66, 329.63, 349.23, 392.0, 440.0, 493.88, 523.25];

fn seed() -> u64 {
    std::env::var("PERFORMANCE_DIFF_IT_SEED")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_SEED)
}

fn random_score(rng: &mut StdRng, len: usize) -> Vec<ExpectedNote> {
    let mut start = rng.gen_range(0.0..0.5);
    (0..len)
        .map(|i| {
            let pitch = *SCALE_HZ.choose(rng).expect("scale is not empty");
            let duration = rng.gen_range(0.2..0.35);
            let note = Note::new(pitch, rng.gen_range(40..=110), start, start + duration);
            start += rng.gen_range(0.4..1.0);
            ExpectedNote {
                note,
                name: frequency_to_note_name(pitch)
                    .map(|n| n.to_string())
                    .unwrap_or_default(),
                duration_type: "quarter".to_string(),
                measure: (i / NOTES_PER_MEASURE) as u32 + 1,
                position: (i % NOTES_PER_MEASURE) as u32 + 1,
                element: ElementKind::Note,
            }
        })
        .collect()
}

fn played(score: &[ExpectedNote]) -> Vec<Note> {
    score.iter().map(|e| e.note).collect()
}

/// Late notes on both sides of the 0.15 s tolerance.
const DELAYS_SECS: [f64; 3] = [0.1, 0.13, 0.17];

/// Wrong pitches, dynamics and timing, dropped notes and stray notes.
/// Delays stay below the 0.2 s half-gap between onsets, so start order is
/// kept. Strays only go between two notes that were both played, so no
/// stray can stand in for a dropped note.
fn sloppy_take(rng: &mut StdRng, score: &[ExpectedNote]) -> Vec<Note> {
    let dropped: Vec<bool> = score.iter().map(|_| rng.gen_bool(0.1)).collect();
    let mut take = Vec::new();
    for (i, expected) in score.iter().enumerate() {
        if dropped[i] {
            continue;
        }
        let mut note = expected.note;
        if rng.gen_bool(0.2) {
            let semitone: f64 = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            note.pitch *= 2f64.powf(semitone / 12.0);
        }
        if rng.gen_bool(0.2) {
            note.velocity = if note.velocity > 75 { 10 } else { 127 };
        }
        if rng.gen_bool(0.2) {
            let delay = *DELAYS_SECS.choose(rng).expect("delays are not empty");
            note.start += delay;
            note.end += delay;
        }
        take.push(note);

        let next_played = score.get(i + 1).filter(|_| !dropped[i + 1]);
        if let Some(next) = next_played {
            if rng.gen_bool(0.1) {
                let mid = (expected.note.start + next.note.start) / 2.0;
                take.push(Note::new(2093.0, 60, mid, mid + 0.1));
            }
        }
    }
    take
}

fn run(score: &[ExpectedNote], take: &[Note], observed_tempo: Option<f64>) -> DiffOutput {
    diff(score, take, REFERENCE_TEMPO, observed_tempo).expect("diff should succeed")
}

type Classification = Vec<(DiffType, Option<usize>, Option<usize>, Option<Placement>)>;

fn classification(output: &DiffOutput) -> Classification {
    output
        .diffs
        .iter()
        .map(|d| {
            (
                d.diff_type(),
                d.diff.ideal_idx,
                d.diff.actual_idx,
                d.description,
            )
        })
        .collect()
}

#[test]
fn identical_performance_has_no_diffs() {
    let mut rng = StdRng::seed_from_u64(seed());
    for len in [1, 5, 32] {
        let score = random_score(&mut rng, len);
        let output = run(&score, &played(&score), Some(REFERENCE_TEMPO));
        assert!(output.diffs.is_empty(), "len {len}: {:?}", output.diffs);
        assert_eq!(output.meta.matched_count, len);
    }
}

#[test]
fn single_deletion_is_one_missing_diff() {
    let mut rng = StdRng::seed_from_u64(seed());
    let score = random_score(&mut rng, 12);
    for k in [0, 5, 11] {
        let mut take = played(&score);
        take.remove(k);
        let output = run(&score, &take, Some(REFERENCE_TEMPO));
        assert_eq!(output.diffs.len(), 1, "deleting {k}");
        let missing = &output.diffs[0];
        assert_eq!(missing.diff_type(), DiffType::Missing);
        assert_eq!(missing.diff.ideal_idx, Some(k));
        assert_eq!(missing.diff.ideal_val, Some(score[k].note));
        assert_eq!(missing.note_info, NoteInfo::Note(score[k].clone()));
    }
}

#[test]
fn single_insertion_is_one_extra_between_neighbours() {
    let mut rng = StdRng::seed_from_u64(seed());
    let score = random_score(&mut rng, 10);
    let k = 4;
    let mid = (score[k - 1].note.start + score[k].note.start) / 2.0;
    let mut take = played(&score);
    take.insert(k, Note::new(2093.0, 70, mid, mid + 0.1));

    let output = run(&score, &take, Some(REFERENCE_TEMPO));
    assert_eq!(output.diffs.len(), 1);
    let extra = &output.diffs[0];
    assert_eq!(extra.diff_type(), DiffType::Extra);
    assert_eq!(extra.description, Some(Placement::Between));
    assert_eq!(extra.diff.actual_idx, Some(k));
    assert_eq!(
        extra.note_info,
        NoteInfo::Context(vec![score[k - 1].clone(), score[k].clone()])
    );
}

#[test]
fn leading_and_trailing_extras() {
    let mut rng = StdRng::seed_from_u64(seed());
    let score = random_score(&mut rng, 4);
    let first = score[0].note.start;
    let last = score[3].note.end;
    let mut take = vec![Note::new(2093.0, 60, first, first + 0.05)];
    take.extend(played(&score).into_iter().map(|n| Note {
        start: n.start + 0.06,
        end: n.end + 0.06,
        ..n
    }));
    take.push(Note::new(2093.0, 60, last + 0.5, last + 0.6));
    take.push(Note::new(2349.3, 60, last + 0.7, last + 0.8));

    let output = run(&score, &take, Some(REFERENCE_TEMPO));
    let placements: Vec<_> = output
        .diffs
        .iter()
        .map(|d| (d.diff_type(), d.description, d.extra_notes.len()))
        .collect();
    assert_eq!(
        placements,
        vec![
            (DiffType::Extra, Some(Placement::Before), 1),
            (DiffType::Extra, Some(Placement::After), 2),
        ]
    );
}

#[test]
fn semitone_sharp_note_is_pitch_diff_of_about_100_cents() {
    let score = vec![ExpectedNote {
        note: Note::new(440.0, 80, 0.0, 0.5),
        name: "A4".to_string(),
        duration_type: "quarter".to_string(),
        measure: 1,
        position: 1,
        element: ElementKind::Note,
    }];
    let take = vec![Note::new(466.16, 80, 0.0, 0.5)];
    let output = run(&score, &take, Some(REFERENCE_TEMPO));
    assert_eq!(output.diffs.len(), 1);
    let body = &output.diffs[0].diff;
    assert_eq!(body.diff_type, DiffType::Pitch);

    let ideal = body.ideal_val.expect("ideal note");
    let actual = body.actual_val.expect("actual note");
    let reference = note_from_frequency(ideal.pitch).unwrap();
    let cents = cents_deviation(actual.pitch, reference).unwrap();
    assert!((cents - 100.0).abs() < 0.5, "cents = {cents}");
}

#[test]
fn output_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(seed());
    for _ in 0..5 {
        let score = random_score(&mut rng, 40);
        let take = sloppy_take(&mut rng, &score);
        let first = serde_json::to_string(&run(&score, &take, Some(100.0))).unwrap();
        let second = serde_json::to_string(&run(&score, &take, Some(100.0))).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn grouping_round_trips() {
    let mut rng = StdRng::seed_from_u64(seed());
    for _ in 0..5 {
        let score = random_score(&mut rng, 40);
        let take = sloppy_take(&mut rng, &score);
        let output = run(&score, &take, Some(REFERENCE_TEMPO));
        let groups = group_by_measure(&output.diffs);
        for pair in groups.windows(2) {
            assert_ne!(pair[0].measure, pair[1].measure);
        }
        assert_eq!(flatten_groups(groups), output.diffs);
    }
}

#[test]
fn tempo_compensation_preserves_classification() {
    let mut rng = StdRng::seed_from_u64(seed());
    for ratio in [0.8, 1.25] {
        let score = random_score(&mut rng, 24);
        let take = sloppy_take(&mut rng, &score);
        let baseline = run(&score, &take, Some(REFERENCE_TEMPO));

        let rushed: Vec<Note> = take
            .iter()
            .map(|n| Note {
                start: n.start / ratio,
                end: n.end / ratio,
                ..*n
            })
            .collect();
        let compensated = run(&score, &rushed, Some(REFERENCE_TEMPO * ratio));

        assert!(compensated.meta.tempo_compensated);
        assert_eq!(classification(&compensated), classification(&baseline));
    }
}

#[test]
fn late_note_stays_within_tolerance_after_tempo_change() {
    let score: Vec<ExpectedNote> = (0..4)
        .map(|i| ExpectedNote {
            note: Note::new(440.0, 80, i as f64 * 0.5, i as f64 * 0.5 + 0.4),
            name: "A4".to_string(),
            duration_type: "quarter".to_string(),
            measure: 1,
            position: i + 1,
            element: ElementKind::Note,
        })
        .collect();
    let mut take = played(&score);
    take[2].start += 0.13;
    take[2].end += 0.13;
    assert!(run(&score, &take, Some(REFERENCE_TEMPO)).diffs.is_empty());

    let ratio = 0.8;
    let slower: Vec<Note> = take
        .iter()
        .map(|n| Note {
            start: n.start / ratio,
            end: n.end / ratio,
            ..*n
        })
        .collect();
    let output = run(&score, &slower, Some(REFERENCE_TEMPO * ratio));
    assert!(output.meta.tempo_compensated);
    assert!(output.diffs.is_empty(), "{:?}", output.diffs);
    assert_eq!(output.meta.matched_count, 4);
}

#[test]
fn missing_tempo_compares_raw_timestamps() {
    let mut rng = StdRng::seed_from_u64(seed());
    let score = random_score(&mut rng, 6);
    let output = run(&score, &played(&score), None);
    assert!(output.diffs.is_empty());
    assert!(!output.meta.tempo_compensated);
    assert_eq!(output.meta.tempo_scale, 1.0);
    assert_eq!(output.meta.conditions, vec![Condition::MissingTempo]);
}

#[test]
fn invalid_notes_become_warnings() {
    let mut rng = StdRng::seed_from_u64(seed());
    let score = random_score(&mut rng, 6);
    let mut take = played(&score);
    take[2].pitch = 0.0;

    let output = run(&score, &take, Some(REFERENCE_TEMPO));
    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.warnings[0].sequence, SequenceKind::Actual);
    assert_eq!(output.warnings[0].index, 2);
    assert_eq!(output.meta.actual_count, 5);
    assert_eq!(output.diffs.len(), 1);
    assert_eq!(output.diffs[0].diff_type(), DiffType::Missing);
    assert_eq!(output.diffs[0].diff.ideal_idx, Some(2));
}

#[test]
fn rests_in_the_score_are_ignored() {
    let mut rng = StdRng::seed_from_u64(seed());
    let mut score = random_score(&mut rng, 5);
    let take = played(&score);
    let gap = score[2].note.end;
    score.insert(
        3,
        ExpectedNote {
            note: Note::new(0.0, 0, gap, gap + 0.1),
            name: "Rest".to_string(),
            duration_type: "16th".to_string(),
            measure: score[2].measure,
            position: score[2].position + 1,
            element: ElementKind::Rest,
        },
    );
    let output = run(&score, &take, Some(REFERENCE_TEMPO));
    assert!(output.diffs.is_empty());
    assert!(output.warnings.is_empty());
    assert_eq!(output.meta.expected_count, 5);
}

#[test]
fn differ_can_be_shared_across_threads() {
    let differ = Arc::new(
        PerformanceDifferBuilder::new(DiffConfig::default())
            .build()
            .expect("default config is valid"),
    );
    let mut rng = StdRng::seed_from_u64(seed());
    let score = random_score(&mut rng, 30);
    let take = sloppy_take(&mut rng, &score);
    let input = DiffInput {
        expected: score,
        actual: take,
        reference_tempo: REFERENCE_TEMPO,
        observed_tempo: Some(REFERENCE_TEMPO),
    };
    let reference = serde_json::to_string(&differ.diff(&input).unwrap()).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let differ = Arc::clone(&differ);
                let input = &input;
                scope.spawn(move || serde_json::to_string(&differ.diff(input).unwrap()).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), reference);
        }
    });
}
