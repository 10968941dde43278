//! Time grid frame building and painting.
//!
//! [`build_frame`] turns occurrences, lanes and the live proposal into plain
//! rectangles; [`paint_frame`] draws them. Keeping the two apart lets the
//! layout be tested without a UI context.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Rounding, Stroke};

use super::overlap::{layout, LaneAssignment};
use super::palette::{with_alpha, CategoryPalette, TimeGridPalette};
use crate::models::occurrence::{Occurrence, OccurrenceId};
use crate::ui_egui::geometry::GridGeometry;
use crate::ui_egui::gesture::{GestureKind, Proposal};
use crate::ui_egui::resize::{draw_handles, HandleRects, ResizeHandle};
use crate::ui_egui::time_mapper::{minutes_of, MINUTES_PER_DAY, MINUTES_PER_HOUR, SLOT_INTERVAL};

pub const TIME_LABEL_WIDTH: f32 = 50.0;

/// One background time slot in one column.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotBand {
    pub rect: Rect,
    pub date: NaiveDate,
    pub hour_start: bool,
}

/// A committed occurrence box.
#[derive(Debug, Clone, PartialEq)]
pub struct EventBox {
    pub occurrence: Occurrence,
    pub rect: Rect,
    pub lane: LaneAssignment,
    pub color: Color32,
    /// The occurrence is the target of the active gesture
    pub ghost: bool,
}

/// The live proposal box, drawn above everything else.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewBox {
    pub rect: Rect,
    pub color: Color32,
    pub label: String,
    pub cross_day: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridFrame {
    pub slots: Vec<SlotBand>,
    pub boxes: Vec<EventBox>,
    pub preview: Option<PreviewBox>,
    /// Column band the dragged event would land in
    pub drop_indicator: Option<Rect>,
}

/// Lay out one frame. `committed` must not contain working-set drafts;
/// `preview_source` is the occurrence the proposal acts on, if any.
pub fn build_frame(
    geometry: &GridGeometry,
    committed: &[Occurrence],
    proposal: Option<&Proposal>,
    preview_source: Option<&Occurrence>,
    resolution: u32,
    palette: &CategoryPalette,
) -> GridFrame {
    let mut frame = GridFrame {
        slots: slot_bands(geometry, resolution),
        ..GridFrame::default()
    };

    let mut by_date: BTreeMap<NaiveDate, Vec<Occurrence>> = BTreeMap::new();
    for occurrence in committed {
        by_date
            .entry(occurrence.date)
            .or_default()
            .push(occurrence.clone());
    }

    let target: Option<&OccurrenceId> = proposal.and_then(|p| p.target.as_ref());

    for (date, occurrences) in by_date {
        let lanes = layout(&occurrences);
        for occurrence in occurrences {
            let lane = lanes
                .get(&occurrence.id)
                .copied()
                .unwrap_or(LaneAssignment::FULL_WIDTH);
            let Some(rect) = geometry.box_rect(
                date,
                minutes_of(occurrence.start),
                minutes_of(occurrence.end),
                lane,
            ) else {
                continue;
            };
            frame.boxes.push(EventBox {
                ghost: target == Some(&occurrence.id),
                color: palette.color_for(&occurrence),
                occurrence,
                rect,
                lane,
            });
        }
    }

    if let Some(proposal) = proposal {
        let start = minutes_of(proposal.start);
        let end = minutes_of(proposal.end);
        frame.preview = geometry
            .box_rect(proposal.date, start, end, LaneAssignment::FULL_WIDTH)
            .map(|rect| PreviewBox {
                rect,
                color: preview_source
                    .map(|source| palette.color_for(source))
                    .unwrap_or_else(|| palette.default_color()),
                label: preview_label(proposal, preview_source),
                cross_day: proposal.cross_day,
            });

        if matches!(proposal.kind, GestureKind::Moving | GestureKind::Duplicating) {
            frame.drop_indicator = geometry.band_rect(proposal.date, start, end);
        }
    }

    frame
}

fn slot_bands(geometry: &GridGeometry, resolution: u32) -> Vec<SlotBand> {
    let step = (if resolution == 0 { SLOT_INTERVAL } else { resolution }) as i32;
    let mut slots = Vec::with_capacity(geometry.dates.len() * (MINUTES_PER_DAY / step) as usize);
    for date in &geometry.dates {
        let mut minute = 0;
        while minute < MINUTES_PER_DAY {
            if let Some(rect) = geometry.band_rect(*date, minute, minute + step) {
                slots.push(SlotBand {
                    rect,
                    date: *date,
                    hour_start: minute % MINUTES_PER_HOUR == 0,
                });
            }
            minute += step;
        }
    }
    slots
}

fn preview_label(proposal: &Proposal, source: Option<&Occurrence>) -> String {
    let range = format!(
        "{} - {}",
        proposal.start.format("%H:%M"),
        proposal.end.format("%H:%M")
    );
    match (proposal.kind, source) {
        (GestureKind::RangeSelecting, _) | (_, None) => range,
        (GestureKind::Duplicating, Some(source)) => format!("{} (copy)\n{}", source.title, range),
        (_, Some(source)) => format!("{}\n{}", source.title, range),
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Paint a frame. `hovered` is the box under the pointer and the handle it
/// is on, used to show resize affordances.
pub(crate) fn paint_frame(
    painter: &Painter,
    frame: &GridFrame,
    palette: &TimeGridPalette,
    hovered: Option<(&OccurrenceId, Option<ResizeHandle>)>,
) {
    for slot in &frame.slots {
        let fill = if is_weekend(slot.date) {
            palette.weekend_bg
        } else {
            palette.regular_bg
        };
        painter.rect_filled(slot.rect, Rounding::ZERO, fill);
        let line = if slot.hour_start {
            Stroke::new(1.0, palette.hour_line)
        } else {
            Stroke::new(0.5, palette.slot_line)
        };
        painter.line_segment([slot.rect.left_top(), slot.rect.right_top()], line);
        painter.line_segment(
            [slot.rect.left_top(), slot.rect.left_bottom()],
            Stroke::new(1.0, palette.divider),
        );
    }

    if let Some(indicator) = frame.drop_indicator {
        painter.rect_filled(indicator, Rounding::same(2.0), palette.drop_indicator);
    }

    for event in &frame.boxes {
        let fill = if event.ghost {
            with_alpha(event.color, 90)
        } else {
            event.color
        };
        painter.rect_filled(event.rect, Rounding::same(4.0), fill);
        paint_label(
            painter,
            event.rect,
            &event.occurrence.title,
            palette.event_text,
        );

        if let Some((id, handle)) = hovered {
            if *id == event.occurrence.id && !event.ghost {
                draw_handles(
                    painter,
                    &HandleRects::for_timed_event(event.rect),
                    handle,
                    event.color,
                );
            }
        }
    }

    if let Some(preview) = &frame.preview {
        let stroke = if preview.cross_day {
            Stroke::new(2.5, palette.cross_day_stroke)
        } else {
            Stroke::new(2.0, palette.preview_stroke)
        };
        painter.rect_filled(preview.rect, Rounding::same(4.0), with_alpha(preview.color, 200));
        painter.rect_stroke(preview.rect, Rounding::same(4.0), stroke);
        paint_label(painter, preview.rect, &preview.label, palette.event_text);
    }
}

fn paint_label(painter: &Painter, rect: Rect, text: &str, color: Color32) {
    if rect.height() < 12.0 || rect.width() < 16.0 {
        return;
    }
    let clipped = painter.with_clip_rect(rect.shrink(1.0));
    clipped.text(
        rect.left_top() + egui::vec2(4.0, 2.0),
        Align2::LEFT_TOP,
        text,
        FontId::proportional(11.0),
        color,
    );
}

/// Hour labels in the gutter left of the grid.
pub(crate) fn paint_time_labels(painter: &Painter, geometry: &GridGeometry, palette: &TimeGridPalette) {
    let gutter = Rect::from_min_max(
        Pos2::new(geometry.origin.x - TIME_LABEL_WIDTH, geometry.origin.y),
        Pos2::new(geometry.origin.x, geometry.origin.y + geometry.mapper.day_height()),
    );
    painter.rect_filled(gutter, Rounding::ZERO, palette.hour_bg);
    for hour in 0..24 {
        let y = geometry.origin.y + geometry.mapper.time_to_offset(hour, 0);
        painter.text(
            Pos2::new(geometry.origin.x - 5.0, y + 2.0),
            Align2::RIGHT_TOP,
            format!("{:02}:00", hour),
            FontId::proportional(12.0),
            palette.label,
        );
    }
}

/// Draw the current time indicator line across today's column.
pub(crate) fn draw_current_time_indicator(painter: &Painter, geometry: &GridGeometry, now: NaiveDateTime) {
    let Some(index) = geometry.column_of(now.date()) else {
        return;
    };
    let column = geometry.column_rect(index);
    let y = geometry.origin.y + geometry.mapper.naive_time_to_offset(now.time());
    let line_color = Color32::from_rgb(255, 100, 100);

    painter.circle_filled(Pos2::new(column.left() - 4.0, y), 3.0, line_color);
    painter.line_segment(
        [Pos2::new(column.left(), y), Pos2::new(column.right(), y)],
        Stroke::new(2.0, line_color),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventDefinition;
    use crate::models::occurrence::DefinitionRef;
    use crate::ui_egui::time_mapper::TimeMapper;
    use chrono::NaiveTime;
    use egui::pos2;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn geometry() -> GridGeometry {
        GridGeometry::new(
            TimeMapper::new(60.0),
            pos2(0.0, 0.0),
            100.0,
            date(13).iter_days().take(2).collect(),
        )
    }

    fn occurrence(id: i64, day: u32, start: (u32, u32), end: (u32, u32)) -> Occurrence {
        let def = EventDefinition::new(
            format!("Event {}", id),
            date(day),
            time(start.0, start.1),
            time(end.0, end.1),
        )
        .unwrap();
        Occurrence::from_definition(&def, DefinitionRef::Saved(id), date(day))
    }

    #[test]
    fn test_idle_frame_has_no_preview() {
        let events = vec![occurrence(1, 13, (9, 0), (10, 0))];
        let frame = build_frame(&geometry(), &events, None, None, 15, &CategoryPalette::default());

        assert_eq!(frame.slots.len(), 2 * 96);
        assert_eq!(frame.slots.iter().filter(|s| s.hour_start).count(), 2 * 24);
        assert_eq!(frame.boxes.len(), 1);
        assert!(frame.preview.is_none());
        assert!(frame.drop_indicator.is_none());
    }

    #[test]
    fn test_overlapping_boxes_split_the_column() {
        let events = vec![
            occurrence(1, 13, (9, 0), (10, 0)),
            occurrence(2, 13, (9, 30), (10, 30)),
            occurrence(3, 14, (9, 0), (10, 0)),
        ];
        let frame = build_frame(&geometry(), &events, None, None, 15, &CategoryPalette::default());

        let widths: Vec<f32> = frame.boxes.iter().map(|b| b.rect.width()).collect();
        assert_eq!(widths[0], widths[1]);
        assert!(widths[2] > widths[0] * 1.9);
        assert!(frame.boxes[0].rect.right() <= frame.boxes[1].rect.left());
    }

    #[test]
    fn test_move_has_one_preview_and_a_drop_indicator() {
        let source = occurrence(1, 13, (9, 0), (10, 0));
        let proposal = Proposal {
            kind: GestureKind::Moving,
            target: Some(source.id.clone()),
            date: date(14),
            start: time(11, 0),
            end: time(12, 0),
            cross_day: true,
        };
        let frame = build_frame(
            &geometry(),
            std::slice::from_ref(&source),
            Some(&proposal),
            Some(&source),
            15,
            &CategoryPalette::default(),
        );

        assert!(frame.boxes[0].ghost);
        let preview = frame.preview.unwrap();
        assert!(preview.cross_day);
        assert_eq!(preview.rect.top(), 660.0);
        assert!(preview.label.starts_with("Event 1"));
        let indicator = frame.drop_indicator.unwrap();
        assert_eq!(indicator.left(), 100.0);
        assert_eq!(indicator.width(), 100.0);
    }

    #[test]
    fn test_range_preview_uses_default_color() {
        let proposal = Proposal {
            kind: GestureKind::RangeSelecting,
            target: None,
            date: date(13),
            start: time(8, 0),
            end: time(9, 0),
            cross_day: false,
        };
        let palette = CategoryPalette::default();
        let frame = build_frame(&geometry(), &[], Some(&proposal), None, 15, &palette);

        let preview = frame.preview.unwrap();
        assert_eq!(preview.color, palette.default_color());
        assert_eq!(preview.label, "08:00 - 09:00");
        assert!(frame.drop_indicator.is_none());
    }
}
