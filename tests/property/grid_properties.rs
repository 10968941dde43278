// Property-based tests for the grid math
// Mapper round trips, snapping, lane layout, recurrence bounds and gesture outcomes

#[path = "../fixtures/mod.rs"]
mod fixtures;

use chrono::Duration;
use egui::pos2;
use proptest::prelude::*;

use fixtures::{date, time, week_geometry};
use plan_grid::models::event::EventDefinition;
use plan_grid::models::occurrence::{DefinitionRef, Occurrence, OccurrenceId};
use plan_grid::models::recurrence::{Frequency, RecurrenceRule, MAX_OCCURRENCES};
use plan_grid::services::event::recurrence::expand;
use plan_grid::ui_egui::gesture::{DragTarget, GestureMachine, GestureOutcome, CLICK_SLOP};
use plan_grid::ui_egui::resize::ResizeHandle;
use plan_grid::ui_egui::time_mapper::{
    minutes_of, snap, time_from_minutes, SnapGrid, TimeMapper, LATEST_ENDPOINT,
};
use plan_grid::ui_egui::views::overlap::layout;

fn occurrence(index: usize, start: i32, length: i32) -> Occurrence {
    let definition = EventDefinition::new(
        format!("Event {}", index),
        date(14),
        time_from_minutes(start),
        time_from_minutes(start + length),
    )
    .unwrap();
    Occurrence::from_definition(&definition, DefinitionRef::Saved(index as i64), date(14))
}

fn target(start: i32, end: i32) -> DragTarget {
    DragTarget {
        occurrence: OccurrenceId::new(DefinitionRef::Saved(1), date(14)),
        source: DefinitionRef::Saved(1),
        date: date(14),
        start,
        end,
    }
}

fn machine() -> GestureMachine {
    let mut machine = GestureMachine::default();
    machine.set_geometry(week_geometry());
    machine
}

proptest! {
    /// Property: a whole minute survives minutes -> pixels -> minutes
    #[test]
    fn prop_mapper_round_trip(minutes in 0..1440i32, hour_height in 20.0f32..200.0) {
        let mapper = TimeMapper::new(hour_height);
        let offset = mapper.minutes_to_offset(minutes);
        prop_assert_eq!(mapper.offset_to_minutes(offset), minutes);
    }

    /// Property: offsets outside the day clamp into it
    #[test]
    fn prop_offset_is_clamped(pixels in -5000.0f32..5000.0) {
        let minutes = TimeMapper::new(60.0).offset_to_minutes(pixels);
        prop_assert!((0..1440).contains(&minutes));
    }

    /// Property: snapping lands on the grid, moves at most half a step and is idempotent
    #[test]
    fn prop_snap_is_idempotent(minutes in -2000..2000i32, resolution in prop::sample::select(vec![5u32, 10, 15, 30, 60])) {
        let snapped = snap(minutes, resolution);
        prop_assert_eq!(snapped.rem_euclid(resolution as i32), 0);
        prop_assert!((snapped - minutes).abs() <= resolution as i32 / 2);
        prop_assert_eq!(snap(snapped, resolution), snapped);
    }

    /// Property: sticky snapping always returns a grid line next to the raw value
    #[test]
    fn prop_sticky_snap_stays_near(raw in 0..1440i32, previous in 0..96i32) {
        let grid = SnapGrid::default();
        let result = grid.snap_sticky(raw, Some(previous * 15));
        prop_assert_eq!(result % 15, 0);
        prop_assert!((result - raw).abs() < 15);
    }

    /// Property: overlapping occurrences never share a lane
    #[test]
    fn prop_overlaps_get_distinct_lanes(events in prop::collection::vec((0..1380i32, 15..180i32), 1..12)) {
        let occurrences: Vec<Occurrence> = events
            .iter()
            .enumerate()
            .map(|(i, (start, length))| occurrence(i, *start, (*length).min(1439 - start)))
            .collect();
        let lanes = layout(&occurrences);
        prop_assert_eq!(lanes.len(), occurrences.len());

        for a in &occurrences {
            let lane_a = lanes[&a.id];
            prop_assert!(lane_a.lane < lane_a.lane_count);
            for b in &occurrences {
                if a.id != b.id && a.overlaps(b) {
                    let lane_b = lanes[&b.id];
                    prop_assert_ne!(lane_a.lane, lane_b.lane);
                    prop_assert_eq!(lane_a.lane_count, lane_b.lane_count);
                }
            }
        }
    }

    /// Property: no rule ever yields more than the cap, all within [anchor, until]
    #[test]
    fn prop_recurrence_is_bounded(
        days in 0..4000i64,
        frequency in prop::sample::select(vec![Frequency::Daily, Frequency::Weekly, Frequency::Monthly]),
    ) {
        let anchor = date(31);
        let until = anchor + Duration::days(days);
        let mut definition = EventDefinition::new("Series", anchor, time(9, 0), time(10, 0)).unwrap();
        definition.recurrence = Some(RecurrenceRule::new(frequency, until));

        let occurrences = expand(&definition);
        prop_assert!(!occurrences.is_empty());
        prop_assert!(occurrences.len() <= MAX_OCCURRENCES);
        for pair in occurrences.windows(2) {
            prop_assert!(pair[0].date < pair[1].date);
        }
        prop_assert!(occurrences.iter().all(|o| o.date >= anchor && o.date <= until));
    }

    /// Property: resizing any event keeps the minimum duration and the day bounds
    #[test]
    fn prop_resize_respects_floor(
        (start, duration) in (15..=240i32).prop_flat_map(|d| (0..=(1380 - d), Just(d))),
        y in -500.0f32..2000.0,
        top in any::<bool>(),
    ) {
        let end = start + duration;
        let mut machine = machine();
        let (handle, origin) = if top {
            (ResizeHandle::Top, pos2(150.0, start as f32 + 2.0))
        } else {
            (ResizeHandle::Bottom, pos2(150.0, end as f32 - 2.0))
        };
        machine.begin_resize(target(start, end), handle, origin).unwrap();

        match machine.release(pos2(150.0, y)) {
            Some(GestureOutcome::Clicked(_)) => prop_assert!((y - origin.y).abs() < CLICK_SLOP),
            Some(GestureOutcome::Resized { start: new_start, end: new_end, .. }) => {
                let (new_start, new_end) = (minutes_of(new_start), minutes_of(new_end));
                prop_assert!(new_end - new_start >= 15);
                prop_assert!(new_start >= 0 && new_end <= LATEST_ENDPOINT);
                if top {
                    prop_assert_eq!(new_end, end);
                } else {
                    prop_assert_eq!(new_start, start);
                }
            }
            other => prop_assert!(false, "unexpected outcome {:?}", other),
        }
    }

    /// Property: moving any event keeps its duration and lands on the grid inside the day
    #[test]
    fn prop_move_preserves_duration(
        (start, duration) in (1..=600i32).prop_flat_map(|d| (0..=(1439 - d), Just(d))),
        x in 0.0f32..699.0,
        y in -500.0f32..2000.0,
    ) {
        let mut machine = machine();
        let origin = pos2(150.0, start as f32 + duration as f32 / 2.0);
        machine.begin_move(target(start, start + duration), origin).unwrap();

        let release = pos2(x, y);
        match machine.release(release) {
            Some(GestureOutcome::Clicked(_)) => prop_assert!(release.distance(origin) < CLICK_SLOP),
            Some(GestureOutcome::Moved { start: new_start, end: new_end, .. }) => {
                let (new_start, new_end) = (minutes_of(new_start), minutes_of(new_end));
                prop_assert_eq!(new_end - new_start, duration);
                prop_assert_eq!(new_start % 15, 0);
                prop_assert!(new_start >= 0 && new_end <= LATEST_ENDPOINT);
            }
            other => prop_assert!(false, "unexpected outcome {:?}", other),
        }
    }

    /// Property: pressing and releasing in place on any event is a click, never a move or resize
    #[test]
    fn prop_release_in_place_is_a_click(
        (start, duration) in (1..=600i32).prop_flat_map(|d| (0..=(1439 - d), Just(d))),
        dx in -2.0f32..2.0,
        dy in -2.0f32..2.0,
        handle in prop::sample::select(vec![None, Some(ResizeHandle::Top), Some(ResizeHandle::Bottom)]),
    ) {
        let target = target(start, start + duration);
        let origin = pos2(150.0, start as f32 + duration as f32 / 2.0);
        let mut machine = machine();
        match handle {
            Some(handle) => machine.begin_resize(target.clone(), handle, origin).unwrap(),
            None => machine.begin_move(target.clone(), origin).unwrap(),
        }

        let outcome = machine.release(pos2(origin.x + dx, origin.y + dy));
        prop_assert_eq!(outcome, Some(GestureOutcome::Clicked(target)));
    }
}
