//! Screen layout of the time grid for the current frame.
//!
//! The grid's top-left corner is midnight of the first visible date. Each
//! visible date owns one column of equal width.

use chrono::NaiveDate;
use egui::{pos2, vec2, Pos2, Rect};

use super::time_mapper::{column_for_x, TimeMapper};
use super::views::overlap::LaneAssignment;

/// Horizontal gap kept between event boxes and their column edges
pub const BOX_INSET: f32 = 2.0;
/// Boxes are never drawn shorter than this
pub const MIN_BOX_HEIGHT: f32 = 6.0;

#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    pub mapper: TimeMapper,
    pub origin: Pos2,
    pub column_width: f32,
    pub dates: Vec<NaiveDate>,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            mapper: TimeMapper::new(48.0),
            origin: Pos2::ZERO,
            column_width: 0.0,
            dates: Vec::new(),
        }
    }
}

impl GridGeometry {
    pub fn new(mapper: TimeMapper, origin: Pos2, column_width: f32, dates: Vec<NaiveDate>) -> Self {
        Self {
            mapper,
            origin,
            column_width,
            dates,
        }
    }

    pub fn column_at(&self, x: f32) -> Option<usize> {
        column_for_x(x, self.origin.x, self.column_width, self.dates.len())
    }

    /// Date of the column under `x`, if any column can be resolved.
    pub fn date_at(&self, x: f32) -> Option<NaiveDate> {
        self.column_at(x).and_then(|index| self.dates.get(index).copied())
    }

    /// Clamped minutes since midnight under `y`.
    pub fn minutes_at(&self, y: f32) -> i32 {
        self.mapper.offset_to_minutes(y - self.origin.y)
    }

    pub fn column_of(&self, date: NaiveDate) -> Option<usize> {
        self.dates.iter().position(|d| *d == date)
    }

    pub fn full_rect(&self) -> Rect {
        Rect::from_min_size(
            self.origin,
            vec2(
                self.column_width * self.dates.len() as f32,
                self.mapper.day_height(),
            ),
        )
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        self.full_rect().contains(pos)
    }

    pub fn column_rect(&self, index: usize) -> Rect {
        Rect::from_min_size(
            pos2(
                self.origin.x + index as f32 * self.column_width,
                self.origin.y,
            ),
            vec2(self.column_width, self.mapper.day_height()),
        )
    }

    /// Full-column band between two minute marks on `date`.
    pub fn band_rect(&self, date: NaiveDate, start: i32, end: i32) -> Option<Rect> {
        let column = self.column_rect(self.column_of(date)?);
        let top = self.origin.y + self.mapper.minutes_to_offset(start);
        let bottom = self.origin.y + self.mapper.minutes_to_offset(end);
        Some(Rect::from_x_y_ranges(
            column.x_range(),
            top..=bottom.max(top + MIN_BOX_HEIGHT),
        ))
    }

    /// Rectangle of an event box on `date`, narrowed to its lane.
    pub fn box_rect(
        &self,
        date: NaiveDate,
        start: i32,
        end: i32,
        lane: LaneAssignment,
    ) -> Option<Rect> {
        let band = self.band_rect(date, start, end)?;
        let inner_width = (band.width() - BOX_INSET * 2.0).max(0.0);
        let (offset, width) = lane.horizontal_span(inner_width);
        let left = band.left() + BOX_INSET + offset;
        Some(Rect::from_x_y_ranges(left..=left + width, band.y_range()))
    }
}
