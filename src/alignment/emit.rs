use serde::Serialize;

use crate::types::Diff;

/// A diff together with the alignment path position it was produced at.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchoredDiff {
    pub position: usize,
    pub diff: Diff,
}

/// Diffs that share a measure, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureGroup {
    /// `None` for extras that have no score note to hang on.
    pub measure: Option<u32>,
    pub diffs: Vec<Diff>,
}

/// Orders diffs along the alignment path. The sort is stable, so diffs
/// anchored at the same position keep the order they were produced in.
pub fn emit(mut anchored: Vec<AnchoredDiff>) -> Vec<Diff> {
    anchored.sort_by_key(|a| a.position);
    anchored.into_iter().map(|a| a.diff).collect()
}

/// Splits the flat list into consecutive runs sharing a measure. A measure
/// may appear in more than one group when diffs of another measure sit
/// between them on the path.
pub fn group_by_measure(diffs: &[Diff]) -> Vec<MeasureGroup> {
    let mut groups: Vec<MeasureGroup> = Vec::new();
    for diff in diffs {
        let measure = diff.measure();
        match groups.last_mut() {
            Some(group) if group.measure == measure => group.diffs.push(diff.clone()),
            _ => groups.push(MeasureGroup {
                measure,
                diffs: vec![diff.clone()],
            }),
        }
    }
    groups
}

pub fn flatten_groups(groups: Vec<MeasureGroup>) -> Vec<Diff> {
    groups.into_iter().flat_map(|g| g.diffs).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DiffBody, DiffType, ElementKind, ExpectedNote, Note, NoteInfo};

    fn missing(measure: u32, index: usize) -> Diff {
        let note = Note::new(440.0, 80, index as f64, index as f64 + 0.5);
        Diff {
            diff: DiffBody {
                diff_type: DiffType::Missing,
                ideal_idx: Some(index),
                ideal_val: Some(note),
                actual_idx: None,
                actual_val: None,
            },
            note_info: NoteInfo::Note(ExpectedNote {
                note,
                name: "A4".to_string(),
                duration_type: "quarter".to_string(),
                measure,
                position: 1,
                element: ElementKind::Note,
            }),
            description: None,
            extra_notes: Vec::new(),
        }
    }

    #[test]
    fn emit_orders_by_position_and_keeps_ties_stable() {
        let anchored = vec![
            AnchoredDiff { position: 4, diff: missing(1, 2) },
            AnchoredDiff { position: 1, diff: missing(1, 0) },
            AnchoredDiff { position: 4, diff: missing(1, 3) },
        ];
        let ideal: Vec<_> = emit(anchored)
            .iter()
            .map(|d| d.diff.ideal_idx)
            .collect();
        assert_eq!(ideal, vec![Some(0), Some(2), Some(3)]);
    }

    #[test]
    fn grouping_follows_consecutive_measures() {
        let diffs = vec![missing(1, 0), missing(1, 1), missing(2, 2), missing(1, 3)];
        let groups = group_by_measure(&diffs);
        let measures: Vec<_> = groups.iter().map(|g| g.measure).collect();
        assert_eq!(measures, vec![Some(1), Some(2), Some(1)]);
        assert_eq!(groups[0].diffs.len(), 2);
        assert_eq!(flatten_groups(groups), diffs);
    }

    #[test]
    fn empty_list_has_no_groups() {
        assert!(group_by_measure(&[]).is_empty());
        assert!(emit(Vec::new()).is_empty());
    }
}
