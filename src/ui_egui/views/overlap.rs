//! Side-by-side lane assignment for overlapping events within one day.
//!
//! Occurrences are grouped into maximal overlap clusters (connected
//! components of the "time ranges intersect" relation). Every member of a
//! cluster shares the cluster's size as its lane count, and lanes are handed
//! out in identity order so the same events never swap places between frames.

use std::collections::HashMap;

use crate::models::occurrence::{Occurrence, OccurrenceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneAssignment {
    pub lane: usize,
    pub lane_count: usize,
}

impl LaneAssignment {
    pub const FULL_WIDTH: LaneAssignment = LaneAssignment {
        lane: 0,
        lane_count: 1,
    };

    /// Horizontal `(offset, width)` of this lane inside a column of `column_width`.
    pub fn horizontal_span(&self, column_width: f32) -> (f32, f32) {
        let lane_count = self.lane_count.max(1) as f32;
        let width = column_width / lane_count;
        (self.lane as f32 * width, width)
    }
}

/// Assign lanes for the occurrences of a single day.
///
/// Occurrences dated differently from the first one are still laid out, but
/// never overlap anything on another date.
pub fn layout(occurrences: &[Occurrence]) -> HashMap<OccurrenceId, LaneAssignment> {
    let mut assignments = HashMap::with_capacity(occurrences.len());

    for cluster in overlap_clusters(occurrences) {
        let mut members: Vec<&Occurrence> = cluster.into_iter().map(|i| &occurrences[i]).collect();
        members.sort_by(|a, b| a.id.cmp(&b.id));
        let lane_count = members.len();
        for (lane, occurrence) in members.into_iter().enumerate() {
            assignments.insert(occurrence.id.clone(), LaneAssignment { lane, lane_count });
        }
    }

    assignments
}

/// Indices of `occurrences` grouped into connected overlap components.
fn overlap_clusters(occurrences: &[Occurrence]) -> Vec<Vec<usize>> {
    let mut parent: Vec<usize> = (0..occurrences.len()).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for a in 0..occurrences.len() {
        for b in (a + 1)..occurrences.len() {
            if occurrences[a].overlaps(&occurrences[b]) {
                let (root_a, root_b) = (find(&mut parent, a), find(&mut parent, b));
                if root_a != root_b {
                    parent[root_b] = root_a;
                }
            }
        }
    }

    let mut clusters: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..occurrences.len() {
        let root = find(&mut parent, i);
        clusters.entry(root).or_default().push(i);
    }
    clusters.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventDefinition;
    use crate::models::occurrence::DefinitionRef;
    use chrono::{NaiveDate, NaiveTime};

    fn occurrence(id: i64, start: (u32, u32), end: (u32, u32)) -> Occurrence {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let def = EventDefinition::new(
            format!("Event {}", id),
            date,
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        )
        .unwrap();
        Occurrence::from_definition(&def, DefinitionRef::Saved(id), date)
    }

    #[test]
    fn test_lone_event_is_full_width() {
        let events = vec![occurrence(1, (9, 0), (10, 0))];
        let lanes = layout(&events);
        assert_eq!(lanes[&events[0].id], LaneAssignment::FULL_WIDTH);
    }

    #[test]
    fn test_two_overlapping_and_one_separate() {
        let events = vec![
            occurrence(1, (9, 0), (10, 0)),
            occurrence(2, (9, 30), (10, 30)),
            occurrence(3, (11, 0), (12, 0)),
        ];
        let lanes = layout(&events);

        let a = lanes[&events[0].id];
        let b = lanes[&events[1].id];
        assert_eq!(a.lane_count, 2);
        assert_eq!(b.lane_count, 2);
        assert_ne!(a.lane, b.lane);
        assert_eq!(lanes[&events[2].id], LaneAssignment::FULL_WIDTH);
    }

    #[test]
    fn test_touching_events_do_not_share_lanes() {
        let events = vec![
            occurrence(1, (9, 0), (10, 0)),
            occurrence(2, (10, 0), (11, 0)),
        ];
        let lanes = layout(&events);
        assert_eq!(lanes[&events[0].id], LaneAssignment::FULL_WIDTH);
        assert_eq!(lanes[&events[1].id], LaneAssignment::FULL_WIDTH);
    }

    #[test]
    fn test_chain_forms_one_cluster() {
        // 1 overlaps 2, 2 overlaps 3, 1 does not overlap 3
        let events = vec![
            occurrence(1, (9, 0), (10, 0)),
            occurrence(2, (9, 45), (11, 0)),
            occurrence(3, (10, 30), (12, 0)),
        ];
        let lanes = layout(&events);
        let mut seen: Vec<usize> = events.iter().map(|e| lanes[&e.id].lane).collect();
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2]);
        assert!(events.iter().all(|e| lanes[&e.id].lane_count == 3));
    }

    #[test]
    fn test_lane_order_is_stable_by_identity() {
        let forward = vec![
            occurrence(2, (9, 0), (10, 0)),
            occurrence(1, (9, 0), (10, 0)),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = layout(&forward);
        let b = layout(&reversed);
        assert_eq!(a, b);
        // "1@..." sorts first
        assert_eq!(a[&forward[1].id].lane, 0);
    }

    #[test]
    fn test_horizontal_span() {
        let lane = LaneAssignment {
            lane: 1,
            lane_count: 4,
        };
        assert_eq!(lane.horizontal_span(200.0), (50.0, 50.0));
    }
}
