//! The grid surface: owns the working definition set, routes pointer input
//! through the gesture machine and commits finished gestures to the store.
//!
//! The surface is the only writer of the working set. Commits go to the
//! store first; a failed commit restores the last known-good set and is
//! reported as [`GridError::Commit`]. Nothing is retried.

use std::time::Instant;

use chrono::{Days, NaiveDate};
use egui::{Pos2, Rect};

use super::gesture::{
    CreateRequest, DragTarget, Gesture, GestureMachine, GestureOutcome, Proposal,
};
use super::geometry::GridGeometry;
use super::resize::{HandleRects, ResizeHandle};
use super::time_mapper::minutes_of;
use super::views::overlap::{layout, LaneAssignment};
use super::views::palette::CategoryPalette;
use super::views::time_grid::{build_frame, GridFrame};
use crate::error::{GridError, GridResult};
use crate::models::event::{EventDefinition, EventPatch};
use crate::models::occurrence::{DefinitionRef, Occurrence, OccurrenceId};
use crate::models::settings::GridSettings;
use crate::services::event::recurrence::{expand_as, expand_in_range};
use crate::services::event::EventStore;

type CreateCallback = Box<dyn FnMut(&CreateRequest)>;
type ClickCallback = Box<dyn FnMut(&Occurrence)>;

/// A definition in the working set together with the identity its
/// occurrences are stamped with.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingDefinition {
    pub source: DefinitionRef,
    pub definition: EventDefinition,
}

/// An occurrence box under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub occurrence: Occurrence,
    pub rect: Rect,
    pub handle: Option<ResizeHandle>,
}

pub struct GridSurface<S: EventStore> {
    store: S,
    definitions: Vec<WorkingDefinition>,
    known_good: Vec<WorkingDefinition>,
    next_draft: u32,
    machine: GestureMachine,
    palette: CategoryPalette,
    on_create: Option<CreateCallback>,
    on_click: Option<ClickCallback>,
}

impl<S: EventStore> GridSurface<S> {
    pub fn new(store: S, settings: &GridSettings) -> Self {
        Self {
            store,
            definitions: Vec::new(),
            known_good: Vec::new(),
            next_draft: 1,
            machine: GestureMachine::from_settings(settings),
            palette: CategoryPalette::from_settings(&settings.palette),
            on_create: None,
            on_click: None,
        }
    }

    /// Called with the selected range after a create gesture.
    pub fn on_create(&mut self, callback: impl FnMut(&CreateRequest) + 'static) {
        self.on_create = Some(Box::new(callback));
    }

    /// Called when an occurrence is clicked without being moved.
    pub fn on_click(&mut self, callback: impl FnMut(&Occurrence) + 'static) {
        self.on_click = Some(Box::new(callback));
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn palette(&self) -> &CategoryPalette {
        &self.palette
    }

    /// Replace the working set with the store's read model. Any active
    /// gesture is cancelled first.
    pub fn reload(&mut self) -> GridResult<()> {
        self.cancel();
        let stored = self.store.list().map_err(GridError::Load)?;
        self.definitions = stored
            .into_iter()
            .filter_map(|definition| match definition.id {
                Some(id) => Some(WorkingDefinition {
                    source: DefinitionRef::Saved(id),
                    definition,
                }),
                None => {
                    log::warn!("Skipping stored definition without an id: {}", definition.title);
                    None
                }
            })
            .collect();
        self.known_good = self.definitions.clone();
        log::debug!("Loaded {} event definitions", self.definitions.len());
        Ok(())
    }

    pub fn definitions(&self) -> impl Iterator<Item = &WorkingDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn definition(&self, source: DefinitionRef) -> Option<&EventDefinition> {
        self.definitions
            .iter()
            .find(|working| working.source == source)
            .map(|working| &working.definition)
    }

    /// Occurrences dated `first..=last`, ordered by date, start and identity.
    pub fn occurrences_in(&self, first: NaiveDate, last: NaiveDate) -> Vec<Occurrence> {
        expand_in_range(
            self.definitions
                .iter()
                .map(|working| (&working.definition, working.source)),
            first,
            last,
        )
    }

    pub fn occurrences_on(&self, date: NaiveDate) -> Vec<Occurrence> {
        self.occurrences_in(date, date)
    }

    pub fn lanes_on(&self, date: NaiveDate) -> std::collections::HashMap<OccurrenceId, LaneAssignment> {
        layout(&self.occurrences_on(date))
    }

    pub fn set_geometry(&mut self, geometry: GridGeometry) {
        self.machine.set_geometry(geometry);
    }

    pub fn geometry(&self) -> &GridGeometry {
        self.machine.geometry()
    }

    pub fn gesture(&self) -> &Gesture {
        self.machine.gesture()
    }

    pub fn is_gesture_active(&self) -> bool {
        self.machine.is_active()
    }

    /// A throttled pointer position is waiting for its frame.
    pub fn has_pending_move(&self) -> bool {
        self.machine.has_pending_move()
    }

    pub fn proposal(&self) -> Option<Proposal> {
        self.machine.proposal()
    }

    /// Everything to paint for the current frame.
    pub fn frame(&self) -> GridFrame {
        let geometry = self.machine.geometry();
        let (Some(first), Some(last)) = (geometry.dates.first(), geometry.dates.last()) else {
            return GridFrame::default();
        };
        let (committed, drafts): (Vec<Occurrence>, Vec<Occurrence>) = self
            .occurrences_in(*first, *last)
            .into_iter()
            .partition(|occurrence| matches!(occurrence.source, DefinitionRef::Saved(_)));
        let proposal = self.machine.proposal();
        let preview_source = proposal
            .as_ref()
            .and_then(|proposal| proposal.target.as_ref())
            .and_then(|id| committed.iter().chain(&drafts).find(|o| &o.id == id));

        // A duplicate's draft is only ever shown as the preview
        build_frame(
            geometry,
            &committed,
            proposal.as_ref(),
            preview_source,
            self.machine.snap_grid().resolution,
            &self.palette,
        )
    }

    /// Topmost occurrence box under `pos`, with the resize handle it is on.
    pub fn hit_test(&self, pos: Pos2) -> Option<Hit> {
        let geometry = self.machine.geometry();
        if !geometry.contains(pos) {
            return None;
        }
        let date = geometry.date_at(pos.x)?;
        let occurrences = self.occurrences_on(date);
        let lanes = layout(&occurrences);

        occurrences.into_iter().rev().find_map(|occurrence| {
            let lane = lanes
                .get(&occurrence.id)
                .copied()
                .unwrap_or(LaneAssignment::FULL_WIDTH);
            let rect = geometry.box_rect(
                date,
                minutes_of(occurrence.start),
                minutes_of(occurrence.end),
                lane,
            )?;
            if !rect.contains(pos) {
                return None;
            }
            let handle = HandleRects::for_timed_event(rect).hit_test(pos);
            Some(Hit {
                occurrence,
                rect,
                handle,
            })
        })
    }

    /// Start a gesture at `pos`: resize from a handle, move (or duplicate
    /// when `duplicate` is held) from a box body, range-select elsewhere.
    pub fn pointer_down(&mut self, pos: Pos2, duplicate: bool) -> GridResult<()> {
        if self.machine.is_active() {
            return Err(GridError::GestureActive);
        }

        match self.hit_test(pos) {
            Some(hit) if duplicate => {
                let clone = self.add_draft_clone(&hit.occurrence)?;
                self.machine.begin_duplicate(clone, pos)
            }
            Some(Hit {
                occurrence,
                handle: Some(handle),
                ..
            }) => self
                .machine
                .begin_resize(DragTarget::from_occurrence(&occurrence), handle, pos),
            Some(hit) => self
                .machine
                .begin_move(DragTarget::from_occurrence(&hit.occurrence), pos),
            None => self.machine.begin_range(pos),
        }
    }

    pub fn pointer_moved(&mut self, pos: Pos2, now: Instant) -> bool {
        self.machine.pointer_moved(pos, now)
    }

    /// Apply a throttled pointer position once its frame is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.machine.tick(now)
    }

    /// Finish the active gesture at `pos` and commit its result.
    pub fn pointer_released(&mut self, pos: Pos2) -> GridResult<()> {
        let Some(outcome) = self.machine.release(pos) else {
            return Ok(());
        };

        match outcome {
            GestureOutcome::Created(request) => {
                if let Some(callback) = self.on_create.as_mut() {
                    callback(&request);
                }
                Ok(())
            }
            GestureOutcome::Moved {
                target,
                date,
                start,
                end,
            } => {
                if date == target.date && minutes_of(start) == target.start {
                    return Ok(());
                }
                self.commit_move(&target, date, EventPatch::reschedule(date, start, end))
            }
            GestureOutcome::Resized { target, start, end } => {
                if minutes_of(start) == target.start && minutes_of(end) == target.end {
                    return Ok(());
                }
                let id = self.saved_id(&target)?;
                self.commit(|store, definitions| {
                    let patch = EventPatch::retime(start, end);
                    store.update(id, &patch)?;
                    patch_working(definitions, DefinitionRef::Saved(id), &patch);
                    log::info!("Resized event {} to {}-{}", id, start, end);
                    Ok(())
                })
            }
            GestureOutcome::Duplicated {
                target,
                date,
                start,
                end,
            } => self.commit(|store, definitions| {
                let index = definitions
                    .iter()
                    .position(|working| working.source == target.source)
                    .ok_or_else(|| anyhow::anyhow!("Duplicate of {} vanished", target.occurrence))?;
                let mut clone = definitions[index].definition.clone();
                EventPatch::reschedule(date, start, end).apply_to(&mut clone);
                let stored = store.create(clone)?;
                let id = stored
                    .id
                    .ok_or_else(|| anyhow::anyhow!("Store returned a definition without an id"))?;
                log::info!("Duplicated {} as event {} on {}", target.occurrence, id, date);
                definitions[index] = WorkingDefinition {
                    source: DefinitionRef::Saved(id),
                    definition: stored,
                };
                Ok(())
            }),
            GestureOutcome::Clicked(target) => {
                self.click(&target);
                Ok(())
            }
            GestureOutcome::Aborted(gesture) => {
                self.discard(&gesture);
                Ok(())
            }
        }
    }

    /// Drop the active gesture without committing. A duplicate's clone is
    /// removed from the working set.
    pub fn cancel(&mut self) {
        if let Some(gesture) = self.machine.cancel() {
            self.discard(&gesture);
        }
    }

    /// Store a new definition, typically built from a [`CreateRequest`].
    pub fn create_event(&mut self, definition: EventDefinition) -> GridResult<EventDefinition> {
        self.commit(|store, definitions| {
            let stored = store.create(definition)?;
            let id = stored
                .id
                .ok_or_else(|| anyhow::anyhow!("Store returned a definition without an id"))?;
            log::info!("Created event {} '{}'", id, stored.title);
            definitions.push(WorkingDefinition {
                source: DefinitionRef::Saved(id),
                definition: stored.clone(),
            });
            Ok(stored)
        })
    }

    /// Delete a whole definition, every occurrence included.
    pub fn delete_definition(&mut self, id: i64) -> GridResult<()> {
        if self.definition(DefinitionRef::Saved(id)).is_none() {
            return Err(GridError::UnknownDefinition(id));
        }
        self.commit(|store, definitions| {
            store.delete(id)?;
            definitions.retain(|working| working.source != DefinitionRef::Saved(id));
            log::info!("Deleted event {}", id);
            Ok(())
        })
    }

    /// Delete one occurrence. Recurring series get an exception date,
    /// single events are deleted outright.
    pub fn delete_occurrence(&mut self, occurrence: &Occurrence) -> GridResult<()> {
        let target = DragTarget::from_occurrence(occurrence);
        let id = self.saved_id(&target)?;
        let definition = self
            .definition(target.source)
            .ok_or_else(|| GridError::UnknownOccurrence(occurrence.id.clone()))?;

        if !definition.is_recurring() {
            return self.delete_definition(id);
        }

        let mut exceptions = definition.exceptions.clone();
        if !exceptions.contains(&occurrence.date) {
            exceptions.push(occurrence.date);
            exceptions.sort();
        }
        let patch = EventPatch {
            exceptions: Some(exceptions),
            ..EventPatch::default()
        };
        self.commit(|store, definitions| {
            store.update(id, &patch)?;
            patch_working(definitions, DefinitionRef::Saved(id), &patch);
            log::info!("Removed occurrence {}", target.occurrence);
            Ok(())
        })
    }

    /// Recolor one occurrence. `None` restores the definition's color.
    pub fn set_occurrence_color(
        &mut self,
        occurrence: &Occurrence,
        color: Option<String>,
    ) -> GridResult<()> {
        let target = DragTarget::from_occurrence(occurrence);
        let id = self.saved_id(&target)?;
        let definition = self
            .definition(target.source)
            .ok_or_else(|| GridError::UnknownOccurrence(occurrence.id.clone()))?;

        let patch = if definition.is_recurring() {
            let mut overrides = definition.color_overrides.clone();
            match color {
                Some(color) => overrides.insert(occurrence.date, color),
                None => overrides.remove(&occurrence.date),
            };
            EventPatch {
                color_overrides: Some(overrides),
                ..EventPatch::default()
            }
        } else {
            EventPatch {
                color: Some(color),
                ..EventPatch::default()
            }
        };

        self.commit(|store, definitions| {
            store.update(id, &patch)?;
            patch_working(definitions, DefinitionRef::Saved(id), &patch);
            Ok(())
        })
    }

    fn commit_move(&mut self, target: &DragTarget, date: NaiveDate, mut patch: EventPatch) -> GridResult<()> {
        let id = self.saved_id(target)?;
        let definition = self
            .definition(target.source)
            .ok_or_else(|| GridError::UnknownOccurrence(target.occurrence.clone()))?;

        // Dragging one occurrence of a series shifts the whole series by the
        // same number of days.
        if let Some(rule) = definition.recurrence {
            let delta = date.signed_duration_since(target.date).num_days();
            let shift = |d: NaiveDate| shift_days(d, delta);
            let mut shifted = rule;
            shifted.until = shift(rule.until);
            patch.date = Some(shift(definition.date));
            patch.recurrence = Some(Some(shifted));
            patch.exceptions = Some(definition.exceptions.iter().copied().map(shift).collect());
            patch.color_overrides = Some(
                definition
                    .color_overrides
                    .iter()
                    .map(|(d, color)| (shift(*d), color.clone()))
                    .collect(),
            );
        }

        self.commit(|store, definitions| {
            store.update(id, &patch)?;
            patch_working(definitions, DefinitionRef::Saved(id), &patch);
            log::info!("Moved {} to {}", target.occurrence, date);
            Ok(())
        })
    }

    fn click(&mut self, target: &DragTarget) {
        let Some(definition) = self.definition(target.source) else {
            return;
        };
        let clicked = expand_as(definition, target.source)
            .into_iter()
            .find(|occurrence| occurrence.id == target.occurrence);
        if let (Some(occurrence), Some(callback)) = (clicked, self.on_click.as_mut()) {
            callback(&occurrence);
        }
    }

    /// Add a stand-alone copy of `occurrence`'s definition, dated on the
    /// occurrence, to the working set.
    fn add_draft_clone(&mut self, occurrence: &Occurrence) -> GridResult<DragTarget> {
        let original = self
            .definition(occurrence.source)
            .ok_or_else(|| GridError::UnknownOccurrence(occurrence.id.clone()))?;

        let mut clone = original.clone();
        clone.id = None;
        clone.date = occurrence.date;
        clone.color = occurrence.color.clone();
        clone.recurrence = None;
        clone.exceptions.clear();
        clone.color_overrides.clear();

        let source = DefinitionRef::Draft(self.next_draft);
        self.next_draft += 1;
        self.definitions.push(WorkingDefinition {
            source,
            definition: clone,
        });
        log::debug!("Created draft {} from {}", source, occurrence.id);

        Ok(DragTarget {
            occurrence: OccurrenceId::new(source, occurrence.date),
            source,
            ..DragTarget::from_occurrence(occurrence)
        })
    }

    fn discard(&mut self, gesture: &Gesture) {
        if let Some(draft) = gesture.draft() {
            self.definitions.retain(|working| working.source != draft);
            log::debug!("Discarded draft {}", draft);
        }
    }

    fn saved_id(&self, target: &DragTarget) -> GridResult<i64> {
        match target.source {
            DefinitionRef::Saved(id) if self.definition(target.source).is_some() => Ok(id),
            _ => Err(GridError::UnknownOccurrence(target.occurrence.clone())),
        }
    }

    /// Run a store call against the working set; on failure restore the last
    /// known-good set.
    fn commit<T>(
        &mut self,
        change: impl FnOnce(&S, &mut Vec<WorkingDefinition>) -> anyhow::Result<T>,
    ) -> GridResult<T> {
        match change(&self.store, &mut self.definitions) {
            Ok(value) => {
                self.known_good = self.definitions.clone();
                Ok(value)
            }
            Err(e) => {
                log::error!("Commit failed, rolling back: {:#}", e);
                self.definitions = self.known_good.clone();
                Err(GridError::Commit(e))
            }
        }
    }
}

fn patch_working(definitions: &mut [WorkingDefinition], source: DefinitionRef, patch: &EventPatch) {
    if let Some(working) = definitions.iter_mut().find(|working| working.source == source) {
        patch.apply_to(&mut working.definition);
    }
}

fn shift_days(date: NaiveDate, delta: i64) -> NaiveDate {
    let days = Days::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        date.checked_add_days(days)
    } else {
        date.checked_sub_days(days)
    };
    shifted.unwrap_or(date)
}
