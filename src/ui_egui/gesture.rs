//! The single active pointer gesture on the time grid.
//!
//! Every transient drag field lives inside one [`Gesture`] value, so there is
//! exactly one source of truth for what the pointer is doing. The machine
//! turns pointer positions into a [`Proposal`] for the live preview and into
//! a [`GestureOutcome`] on release. It never touches the event set itself;
//! the surface applies outcomes.

use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveTime};
use egui::Pos2;

use super::geometry::GridGeometry;
use super::resize::ResizeHandle;
use super::throttle::PointerThrottle;
use super::time_mapper::{minutes_of, time_from_minutes, SnapGrid, LATEST_ENDPOINT};
use crate::error::{GridError, GridResult};
use crate::models::occurrence::{DefinitionRef, Occurrence, OccurrenceId};
use crate::models::settings::GridSettings;

/// Shortest event a resize may produce, in minutes
pub const MIN_DURATION_MINUTES: i32 = 15;

/// Pointer travel, in points, below which a press on an event is a click
pub const CLICK_SLOP: f32 = 3.0;

/// The occurrence a gesture is acting on, captured at gesture start.
#[derive(Debug, Clone, PartialEq)]
pub struct DragTarget {
    pub occurrence: OccurrenceId,
    pub source: DefinitionRef,
    pub date: NaiveDate,
    pub start: i32,
    pub end: i32,
}

impl DragTarget {
    pub fn from_occurrence(occurrence: &Occurrence) -> Self {
        Self {
            occurrence: occurrence.id.clone(),
            source: occurrence.source,
            date: occurrence.date,
            start: minutes_of(occurrence.start),
            end: minutes_of(occurrence.end),
        }
    }

    pub fn duration(&self) -> i32 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeState {
    pub date: NaiveDate,
    /// Start of the slot the gesture began in
    pub anchor: i32,
    /// Snapped minute under the pointer
    pub live: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub target: DragTarget,
    pub pointer_origin: Pos2,
    pub proposed_start: i32,
    /// `None` while the pointer is over no resolvable column
    pub proposed_date: Option<NaiveDate>,
    /// The pointer has left the click slop at least once
    pub travelled: bool,
}

impl DragState {
    fn new(target: DragTarget, pointer_origin: Pos2) -> Self {
        Self {
            proposed_start: target.start,
            proposed_date: Some(target.date),
            travelled: false,
            target,
            pointer_origin,
        }
    }

    pub fn is_cross_day(&self) -> bool {
        self.proposed_date
            .map_or(false, |date| date != self.target.date)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeState {
    pub target: DragTarget,
    pub pointer_origin_y: f32,
    /// Live value of the endpoint being dragged
    pub moving: i32,
    pub travelled: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    RangeSelecting(RangeState),
    Moving(DragState),
    ResizingStart(ResizeState),
    ResizingEnd(ResizeState),
    /// The drag target is the freshly created clone, never the original
    Duplicating(DragState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    RangeSelecting,
    Moving,
    ResizingStart,
    ResizingEnd,
    Duplicating,
}

impl Gesture {
    pub fn kind(&self) -> Option<GestureKind> {
        match self {
            Gesture::Idle => None,
            Gesture::RangeSelecting(_) => Some(GestureKind::RangeSelecting),
            Gesture::Moving(_) => Some(GestureKind::Moving),
            Gesture::ResizingStart(_) => Some(GestureKind::ResizingStart),
            Gesture::ResizingEnd(_) => Some(GestureKind::ResizingEnd),
            Gesture::Duplicating(_) => Some(GestureKind::Duplicating),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    /// Working-set clone created for this gesture, if any.
    pub fn draft(&self) -> Option<DefinitionRef> {
        match self {
            Gesture::Duplicating(state) => Some(state.target.source),
            Gesture::Idle
            | Gesture::RangeSelecting(_)
            | Gesture::Moving(_)
            | Gesture::ResizingStart(_)
            | Gesture::ResizingEnd(_) => None,
        }
    }
}

/// What the preview box should show right now.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub kind: GestureKind,
    pub target: Option<OccurrenceId>,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub cross_day: bool,
}

/// A time range the user selected on empty grid space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateRequest {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    Created(CreateRequest),
    Moved {
        target: DragTarget,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    },
    Resized {
        target: DragTarget,
        start: NaiveTime,
        end: NaiveTime,
    },
    Duplicated {
        target: DragTarget,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    },
    /// Pressed and released on an event without dragging it
    Clicked(DragTarget),
    /// Released without a valid proposal; carries the abandoned gesture
    Aborted(Gesture),
}

pub struct GestureMachine {
    gesture: Gesture,
    geometry: GridGeometry,
    snap: SnapGrid,
    min_duration: i32,
    throttle: PointerThrottle,
}

impl Default for GestureMachine {
    fn default() -> Self {
        Self::new(SnapGrid::default(), MIN_DURATION_MINUTES, PointerThrottle::default())
    }
}

impl GestureMachine {
    pub fn new(snap: SnapGrid, min_duration: i32, throttle: PointerThrottle) -> Self {
        Self {
            gesture: Gesture::Idle,
            geometry: GridGeometry::default(),
            snap,
            min_duration: min_duration.max(1),
            throttle,
        }
    }

    pub fn from_settings(settings: &GridSettings) -> Self {
        Self::new(
            SnapGrid::from_settings(settings),
            settings.min_duration_minutes as i32,
            PointerThrottle::new(Duration::from_millis(settings.frame_interval_ms)),
        )
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_active(&self) -> bool {
        !self.gesture.is_idle()
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Replace the grid layout used to interpret pointer positions.
    pub fn set_geometry(&mut self, geometry: GridGeometry) {
        self.geometry = geometry;
    }

    pub fn snap_grid(&self) -> SnapGrid {
        self.snap
    }

    fn ensure_idle(&self) -> GridResult<()> {
        if self.is_active() {
            log::debug!(
                "Rejecting new gesture while {:?} is active",
                self.gesture.kind()
            );
            return Err(GridError::GestureActive);
        }
        Ok(())
    }

    fn enter(&mut self, gesture: Gesture) {
        log::debug!("Gesture started: {:?}", gesture.kind());
        self.throttle.reset();
        self.gesture = gesture;
    }

    /// Start selecting a range on empty grid space. Does nothing when `pos`
    /// is over no resolvable column.
    pub fn begin_range(&mut self, pos: Pos2) -> GridResult<()> {
        self.ensure_idle()?;
        let Some(date) = self.geometry.date_at(pos.x) else {
            log::debug!("Ignoring range start outside the grid at {:?}", pos);
            return Ok(());
        };
        let resolution = self.snap.resolution.max(1) as i32;
        let minutes = self.geometry.minutes_at(pos.y);
        let anchor = (minutes.div_euclid(resolution) * resolution).min(LATEST_ENDPOINT);
        self.enter(Gesture::RangeSelecting(RangeState {
            date,
            anchor,
            live: anchor,
        }));
        Ok(())
    }

    pub fn begin_move(&mut self, target: DragTarget, pos: Pos2) -> GridResult<()> {
        self.ensure_idle()?;
        self.enter(Gesture::Moving(DragState::new(target, pos)));
        Ok(())
    }

    /// Start dragging `clone`, a copy the caller has already added to the
    /// working set.
    pub fn begin_duplicate(&mut self, clone: DragTarget, pos: Pos2) -> GridResult<()> {
        self.ensure_idle()?;
        self.enter(Gesture::Duplicating(DragState::new(clone, pos)));
        Ok(())
    }

    pub fn begin_resize(
        &mut self,
        target: DragTarget,
        handle: ResizeHandle,
        pos: Pos2,
    ) -> GridResult<()> {
        self.ensure_idle()?;
        let state = |moving| ResizeState {
            moving,
            travelled: false,
            pointer_origin_y: pos.y,
            target: target.clone(),
        };
        let gesture = match handle {
            ResizeHandle::Top => Gesture::ResizingStart(state(target.start)),
            ResizeHandle::Bottom => Gesture::ResizingEnd(state(target.end)),
        };
        self.enter(gesture);
        Ok(())
    }

    /// Feed a pointer position. Returns true when the proposal changed this
    /// call; positions arriving faster than the frame interval are held back
    /// and picked up by [`tick`](Self::tick) or [`release`](Self::release).
    pub fn pointer_moved(&mut self, pos: Pos2, now: Instant) -> bool {
        if !self.is_active() {
            return false;
        }
        match self.throttle.offer(pos, now) {
            Some(pos) => {
                self.apply(pos);
                true
            }
            None => false,
        }
    }

    /// Apply a held-back position once its frame is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.is_active() {
            return false;
        }
        match self.throttle.poll(now) {
            Some(pos) => {
                self.apply(pos);
                true
            }
            None => false,
        }
    }

    pub fn has_pending_move(&self) -> bool {
        self.throttle.has_pending()
    }

    fn apply(&mut self, pos: Pos2) {
        let geometry = &self.geometry;
        let snap = self.snap;
        let min_duration = self.min_duration;

        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::RangeSelecting(state) => {
                let raw = geometry.minutes_at(pos.y);
                state.live = snap.snap_sticky(raw, Some(state.live)).clamp(0, LATEST_ENDPOINT);
            }
            Gesture::Moving(state) | Gesture::Duplicating(state) => {
                if !state.travelled {
                    if pos.distance(state.pointer_origin) < CLICK_SLOP {
                        return;
                    }
                    state.travelled = true;
                    state.proposed_start = snap.snap(state.target.start);
                }
                let delta = geometry.mapper.pixels_to_minutes(pos.y - state.pointer_origin.y);
                let raw = state.target.start + delta;
                let latest_start = floor_to(
                    (LATEST_ENDPOINT - state.target.duration()).max(0),
                    snap.resolution,
                );
                state.proposed_start = snap
                    .snap_sticky(raw, Some(state.proposed_start))
                    .clamp(0, latest_start);
                state.proposed_date = geometry.date_at(pos.x);
            }
            Gesture::ResizingStart(state) => {
                let travel = pos.y - state.pointer_origin_y;
                if !state.travelled {
                    if travel.abs() < CLICK_SLOP {
                        return;
                    }
                    state.travelled = true;
                    state.moving = snap.snap(state.target.start);
                }
                let raw = state.target.start + geometry.mapper.pixels_to_minutes(travel);
                state.moving = snap
                    .snap_sticky(raw, Some(state.moving))
                    .min(state.target.end - min_duration)
                    .max(0);
            }
            Gesture::ResizingEnd(state) => {
                let travel = pos.y - state.pointer_origin_y;
                if !state.travelled {
                    if travel.abs() < CLICK_SLOP {
                        return;
                    }
                    state.travelled = true;
                    state.moving = snap.snap(state.target.end);
                }
                let raw = state.target.end + geometry.mapper.pixels_to_minutes(travel);
                state.moving = snap
                    .snap_sticky(raw, Some(state.moving))
                    .min(LATEST_ENDPOINT)
                    .max(state.target.start + min_duration);
            }
        }
    }

    /// Live preview of the active gesture, `None` when idle or when the
    /// pointer is over no resolvable column.
    pub fn proposal(&self) -> Option<Proposal> {
        let resolution = self.snap.resolution.max(1) as i32;
        match &self.gesture {
            Gesture::Idle => None,
            Gesture::RangeSelecting(state) => {
                let (start, end) = normalize_range(state.anchor, state.live, resolution);
                Some(Proposal {
                    kind: GestureKind::RangeSelecting,
                    target: None,
                    date: state.date,
                    start: time_from_minutes(start),
                    end: time_from_minutes(end),
                    cross_day: false,
                })
            }
            Gesture::Moving(state) | Gesture::Duplicating(state) => {
                let date = state.proposed_date?;
                Some(Proposal {
                    kind: self.gesture.kind()?,
                    target: Some(state.target.occurrence.clone()),
                    date,
                    start: time_from_minutes(state.proposed_start),
                    end: time_from_minutes(state.proposed_start + state.target.duration()),
                    cross_day: state.is_cross_day(),
                })
            }
            Gesture::ResizingStart(state) => Some(Proposal {
                kind: GestureKind::ResizingStart,
                target: Some(state.target.occurrence.clone()),
                date: state.target.date,
                start: time_from_minutes(state.moving),
                end: time_from_minutes(state.target.end),
                cross_day: false,
            }),
            Gesture::ResizingEnd(state) => Some(Proposal {
                kind: GestureKind::ResizingEnd,
                target: Some(state.target.occurrence.clone()),
                date: state.target.date,
                start: time_from_minutes(state.target.start),
                end: time_from_minutes(state.moving),
                cross_day: false,
            }),
        }
    }

    /// Finish the gesture at `pos`, the final pointer position. Returns
    /// `None` when no gesture was active.
    pub fn release(&mut self, pos: Pos2) -> Option<GestureOutcome> {
        if !self.is_active() {
            return None;
        }
        self.throttle.reset();
        self.apply(pos);
        let proposal = self.proposal();
        let gesture = std::mem::take(&mut self.gesture);

        let outcome = match (gesture, proposal) {
            (Gesture::Moving(state), _) if !state.travelled => GestureOutcome::Clicked(state.target),
            (Gesture::ResizingStart(state), _) | (Gesture::ResizingEnd(state), _)
                if !state.travelled =>
            {
                GestureOutcome::Clicked(state.target)
            }
            (gesture, None) => GestureOutcome::Aborted(gesture),
            (Gesture::Idle, Some(_)) => return None,
            (Gesture::RangeSelecting(_), Some(p)) => GestureOutcome::Created(CreateRequest {
                date: p.date,
                start: p.start,
                end: p.end,
            }),
            (Gesture::Moving(state), Some(p)) => GestureOutcome::Moved {
                target: state.target,
                date: p.date,
                start: p.start,
                end: p.end,
            },
            (Gesture::Duplicating(state), Some(p)) => GestureOutcome::Duplicated {
                target: state.target,
                date: p.date,
                start: p.start,
                end: p.end,
            },
            (Gesture::ResizingStart(state), Some(p)) | (Gesture::ResizingEnd(state), Some(p)) => {
                GestureOutcome::Resized {
                    target: state.target,
                    start: p.start,
                    end: p.end,
                }
            }
        };

        match &outcome {
            GestureOutcome::Aborted(gesture) => {
                log::debug!("Gesture {:?} aborted: no valid drop target", gesture.kind())
            }
            other => log::debug!("Gesture released: {:?}", other),
        }
        Some(outcome)
    }

    /// Drop the active gesture without committing anything. Returns the
    /// abandoned state so the caller can undo side effects of its start.
    pub fn cancel(&mut self) -> Option<Gesture> {
        if !self.is_active() {
            return None;
        }
        self.throttle.reset();
        let gesture = std::mem::take(&mut self.gesture);
        log::debug!("Gesture cancelled: {:?}", gesture.kind());
        Some(gesture)
    }
}

/// Largest multiple of `resolution` not above `minutes`.
fn floor_to(minutes: i32, resolution: u32) -> i32 {
    if resolution == 0 {
        return minutes;
    }
    let r = resolution as i32;
    minutes.div_euclid(r) * r
}

/// Order a range so `start <= end`; a zero-length range becomes one slot.
fn normalize_range(anchor: i32, live: i32, resolution: i32) -> (i32, i32) {
    let (start, end) = if live < anchor {
        (live, anchor)
    } else {
        (anchor, live)
    };
    if start != end {
        return (start, end);
    }
    if start + resolution <= LATEST_ENDPOINT {
        (start, start + resolution)
    } else {
        (LATEST_ENDPOINT - resolution, LATEST_ENDPOINT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui_egui::time_mapper::TimeMapper;
    use egui::pos2;
    use pretty_assertions::assert_eq;

    /// One pixel per minute, seven 100px columns starting Monday 2025-01-13
    fn machine() -> GestureMachine {
        let mut machine = GestureMachine::default();
        let first = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        machine.set_geometry(GridGeometry::new(
            TimeMapper::new(60.0),
            Pos2::ZERO,
            100.0,
            first.iter_days().take(7).collect(),
        ));
        machine
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn target(day: u32, start: i32, end: i32) -> DragTarget {
        DragTarget {
            occurrence: OccurrenceId::new(DefinitionRef::Saved(1), date(day)),
            source: DefinitionRef::Saved(1),
            date: date(day),
            start,
            end,
        }
    }

    #[test]
    fn test_move_snaps_sixty_five_minutes_to_the_hour() {
        let mut machine = machine();
        machine.begin_move(target(14, 540, 600), pos2(150.0, 545.0)).unwrap();

        let outcome = machine.release(pos2(150.0, 545.0 + 65.0)).unwrap();
        assert_eq!(
            outcome,
            GestureOutcome::Moved {
                target: target(14, 540, 600),
                date: date(14),
                start: time(10, 0),
                end: time(11, 0),
            }
        );
        assert!(!machine.is_active());
    }

    #[test]
    fn test_press_on_off_grid_event_is_a_click() {
        let mut machine = machine();
        machine.begin_move(target(14, 542, 602), pos2(150.0, 570.0)).unwrap();

        let outcome = machine.release(pos2(151.0, 571.0)).unwrap();
        assert_eq!(outcome, GestureOutcome::Clicked(target(14, 542, 602)));
    }

    #[test]
    fn test_press_on_late_event_is_a_click() {
        let mut machine = machine();
        machine.begin_move(target(14, 1380, 1439), pos2(150.0, 1400.0)).unwrap();
        assert_eq!(machine.proposal().unwrap().end, time(23, 59));

        let outcome = machine.release(pos2(150.0, 1400.0)).unwrap();
        assert_eq!(outcome, GestureOutcome::Clicked(target(14, 1380, 1439)));
    }

    #[test]
    fn test_press_on_resize_handle_is_a_click() {
        let mut machine = machine();
        machine
            .begin_resize(target(14, 542, 602), ResizeHandle::Top, pos2(150.0, 545.0))
            .unwrap();

        let outcome = machine.release(pos2(150.0, 546.0)).unwrap();
        assert_eq!(outcome, GestureOutcome::Clicked(target(14, 542, 602)));
    }

    #[test]
    fn test_short_drag_of_off_grid_event_lands_on_grid() {
        let mut machine = machine();
        machine.begin_move(target(14, 542, 602), pos2(150.0, 570.0)).unwrap();
        assert!(machine.pointer_moved(pos2(150.0, 577.0), Instant::now()));

        let proposal = machine.proposal().unwrap();
        assert_eq!((proposal.start, proposal.end), (time(9, 0), time(10, 0)));
    }

    #[test]
    fn test_late_event_dragged_down_stops_on_grid() {
        let mut machine = machine();
        machine.begin_move(target(14, 1380, 1439), pos2(150.0, 1400.0)).unwrap();

        match machine.release(pos2(150.0, 1500.0)).unwrap() {
            GestureOutcome::Moved { start, end, .. } => {
                assert_eq!(start, time(22, 45));
                assert_eq!(end, time(23, 44));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_move_to_other_column_is_cross_day() {
        let mut machine = machine();
        let now = Instant::now();
        machine.begin_move(target(14, 540, 600), pos2(150.0, 545.0)).unwrap();
        assert!(machine.pointer_moved(pos2(350.0, 545.0), now));

        let proposal = machine.proposal().unwrap();
        assert_eq!(proposal.date, date(16));
        assert!(proposal.cross_day);
        assert_eq!(proposal.start, time(9, 0));
    }

    #[test]
    fn test_move_clamps_to_latest_endpoint() {
        let mut machine = machine();
        machine.begin_move(target(14, 1320, 1380), pos2(150.0, 1330.0)).unwrap();

        match machine.release(pos2(150.0, 5000.0)).unwrap() {
            GestureOutcome::Moved { start, end, .. } => {
                assert_eq!(start, time(22, 45));
                assert_eq!(end, time(23, 45));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_resize_end_enforces_minimum_duration() {
        let mut machine = machine();
        machine
            .begin_resize(target(14, 540, 600), ResizeHandle::Bottom, pos2(150.0, 600.0))
            .unwrap();

        match machine.release(pos2(150.0, 300.0)).unwrap() {
            GestureOutcome::Resized { start, end, .. } => {
                assert_eq!(start, time(9, 0));
                assert_eq!(end, time(9, 15));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_resize_start_keeps_end_fixed() {
        let mut machine = machine();
        machine
            .begin_resize(target(14, 540, 600), ResizeHandle::Top, pos2(150.0, 540.0))
            .unwrap();

        match machine.release(pos2(150.0, 480.0)).unwrap() {
            GestureOutcome::Resized { start, end, .. } => {
                assert_eq!(start, time(8, 0));
                assert_eq!(end, time(10, 0));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_resize_end_never_passes_latest_endpoint() {
        let mut machine = machine();
        machine
            .begin_resize(target(14, 1380, 1410), ResizeHandle::Bottom, pos2(150.0, 1410.0))
            .unwrap();
        machine.pointer_moved(pos2(150.0, 1600.0), Instant::now());
        assert_eq!(machine.proposal().unwrap().end, time(23, 45));
    }

    #[test]
    fn test_range_dragged_upward_is_normalized() {
        let mut machine = machine();
        machine.begin_range(pos2(50.0, 605.0)).unwrap();

        let outcome = machine.release(pos2(50.0, 480.0)).unwrap();
        assert_eq!(
            outcome,
            GestureOutcome::Created(CreateRequest {
                date: date(13),
                start: time(8, 0),
                end: time(10, 0),
            })
        );
    }

    #[test]
    fn test_click_selects_one_slot() {
        let mut machine = machine();
        machine.begin_range(pos2(50.0, 603.0)).unwrap();

        let outcome = machine.release(pos2(50.0, 603.0)).unwrap();
        assert_eq!(
            outcome,
            GestureOutcome::Created(CreateRequest {
                date: date(13),
                start: time(10, 0),
                end: time(10, 15),
            })
        );
    }

    #[test]
    fn test_click_in_last_slot_stays_within_the_day() {
        let mut machine = machine();
        machine.begin_range(pos2(50.0, 1435.0)).unwrap();
        let proposal = machine.proposal().unwrap();
        assert_eq!((proposal.start, proposal.end), (time(23, 30), time(23, 45)));
    }

    #[test]
    fn test_second_gesture_is_rejected() {
        let mut machine = machine();
        machine.begin_range(pos2(50.0, 100.0)).unwrap();

        let result = machine.begin_move(target(14, 540, 600), pos2(150.0, 545.0));
        assert!(matches!(result, Err(GridError::GestureActive)));
        assert!(matches!(machine.gesture(), Gesture::RangeSelecting(_)));
    }

    #[test]
    fn test_cancel_returns_to_idle_without_outcome() {
        let mut machine = machine();
        machine.begin_move(target(14, 540, 600), pos2(150.0, 545.0)).unwrap();

        let cancelled = machine.cancel().unwrap();
        assert_eq!(cancelled.kind(), Some(GestureKind::Moving));
        assert!(!machine.is_active());
        assert_eq!(machine.proposal(), None);
        assert_eq!(machine.release(pos2(150.0, 700.0)), None);
        assert_eq!(machine.cancel(), None);
    }

    #[test]
    fn test_unresolvable_column_aborts() {
        let mut machine = machine();
        machine.begin_move(target(14, 540, 600), pos2(150.0, 545.0)).unwrap();
        machine.set_geometry(GridGeometry::default());

        match machine.release(pos2(150.0, 600.0)).unwrap() {
            GestureOutcome::Aborted(gesture) => {
                assert_eq!(gesture.kind(), Some(GestureKind::Moving))
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(!machine.is_active());
    }

    #[test]
    fn test_duplicate_reports_clone_as_draft() {
        let mut machine = machine();
        let clone = DragTarget {
            occurrence: OccurrenceId::new(DefinitionRef::Draft(1), date(14)),
            source: DefinitionRef::Draft(1),
            ..target(14, 540, 600)
        };
        machine.begin_duplicate(clone.clone(), pos2(150.0, 545.0)).unwrap();
        assert_eq!(machine.gesture().draft(), Some(DefinitionRef::Draft(1)));

        let outcome = machine.release(pos2(250.0, 665.0)).unwrap();
        assert_eq!(
            outcome,
            GestureOutcome::Duplicated {
                target: clone,
                date: date(15),
                start: time(11, 0),
                end: time(12, 0),
            }
        );
    }

    #[test]
    fn test_moves_within_a_frame_coalesce_and_release_uses_final_position() {
        let mut machine = machine();
        let start = Instant::now();
        machine.begin_move(target(14, 540, 600), pos2(150.0, 540.0)).unwrap();

        assert!(machine.pointer_moved(pos2(150.0, 570.0), start));
        assert!(!machine.pointer_moved(pos2(150.0, 600.0), start + Duration::from_millis(5)));
        assert!(machine.has_pending_move());
        assert_eq!(machine.proposal().unwrap().start, time(9, 30));

        assert!(machine.tick(start + Duration::from_millis(20)));
        assert_eq!(machine.proposal().unwrap().start, time(10, 0));

        assert!(!machine.pointer_moved(pos2(150.0, 620.0), start + Duration::from_millis(25)));
        match machine.release(pos2(150.0, 660.0)).unwrap() {
            GestureOutcome::Moved { start, .. } => assert_eq!(start, time(11, 0)),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_range_outside_grid_stays_idle() {
        let mut machine = GestureMachine::default();
        machine.begin_range(pos2(10.0, 10.0)).unwrap();
        assert!(!machine.is_active());
    }
}
