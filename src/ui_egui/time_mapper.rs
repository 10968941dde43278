//! Time/pixel coordinate mapping for the time grid.
//!
//! Converts between time-of-day and vertical offsets, between horizontal
//! positions and day columns, and quantizes minutes onto the grid
//! resolution. Everything here is pure and total: out-of-range input is
//! clamped, never rejected.

use chrono::{NaiveTime, Timelike};

use crate::models::settings::GridSettings;

pub const MINUTES_PER_HOUR: i32 = 60;
pub const MINUTES_PER_DAY: i32 = 24 * MINUTES_PER_HOUR;
/// Default grid resolution in minutes
pub const SLOT_INTERVAL: u32 = 15;
/// Latest endpoint an interactive edit may produce (23:45)
pub const LATEST_ENDPOINT: i32 = MINUTES_PER_DAY - SLOT_INTERVAL as i32;

/// Linear mapping between time-of-day and vertical pixel offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeMapper {
    hour_height: f32,
}

impl TimeMapper {
    pub fn new(hour_height: f32) -> Self {
        Self { hour_height }
    }

    pub fn from_settings(settings: &GridSettings) -> Self {
        Self::new(settings.hour_height)
    }

    pub fn hour_height(&self) -> f32 {
        self.hour_height
    }

    pub fn day_height(&self) -> f32 {
        self.hour_height * 24.0
    }

    /// `(hour + minute / 60) * hour_height`
    pub fn time_to_offset(&self, hour: u32, minute: u32) -> f32 {
        (hour as f32 + minute as f32 / 60.0) * self.hour_height
    }

    pub fn minutes_to_offset(&self, minutes: i32) -> f32 {
        minutes as f32 / 60.0 * self.hour_height
    }

    pub fn naive_time_to_offset(&self, time: NaiveTime) -> f32 {
        self.time_to_offset(time.hour(), time.minute())
    }

    /// Inverse of [`time_to_offset`](Self::time_to_offset), clamped to `[00:00, 23:59]`.
    pub fn offset_to_time(&self, pixels: f32) -> (u32, u32) {
        let minutes = self.offset_to_minutes(pixels) as u32;
        (minutes / 60, minutes % 60)
    }

    /// Minutes since midnight under `pixels`, clamped to `[0, 1439]`.
    pub fn offset_to_minutes(&self, pixels: f32) -> i32 {
        self.pixels_to_minutes(pixels).clamp(0, MINUTES_PER_DAY - 1)
    }

    /// Unclamped conversion of a vertical distance to whole minutes.
    pub fn pixels_to_minutes(&self, pixels: f32) -> i32 {
        if !pixels.is_finite() || self.hour_height <= 0.0 {
            return 0;
        }
        (pixels / self.hour_height * 60.0).round() as i32
    }
}

/// Round `minutes` to the nearest multiple of `resolution` (halves round up).
pub fn snap(minutes: i32, resolution: u32) -> i32 {
    if resolution == 0 {
        return minutes;
    }
    let r = resolution as i32;
    (minutes + r / 2).div_euclid(r) * r
}

/// Grid quantization with a magnetic dead zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapGrid {
    pub resolution: u32,
    pub dead_zone: u32,
}

impl Default for SnapGrid {
    fn default() -> Self {
        Self {
            resolution: SLOT_INTERVAL,
            dead_zone: 5,
        }
    }
}

impl SnapGrid {
    pub fn new(resolution: u32, dead_zone: u32) -> Self {
        Self {
            resolution,
            dead_zone,
        }
    }

    pub fn from_settings(settings: &GridSettings) -> Self {
        Self::new(settings.snap_minutes, settings.dead_zone_minutes)
    }

    pub fn snap(&self, minutes: i32) -> i32 {
        snap(minutes, self.resolution)
    }

    /// Snap with hysteresis. A raw value within the dead zone of a grid line
    /// always lands on that line. Between those bands the previous result is
    /// kept as long as it is one of the two neighbouring lines, so a pointer
    /// hovering near the midpoint does not flip back and forth.
    pub fn snap_sticky(&self, raw: i32, current: Option<i32>) -> i32 {
        let nearest = self.snap(raw);
        if (raw - nearest).abs() <= self.dead_zone as i32 {
            return nearest;
        }
        match current {
            Some(current) if (raw - current).abs() < self.resolution as i32 => current,
            _ => nearest,
        }
    }
}

/// `floor((x - origin_x) / column_width)` clamped to the available columns.
///
/// Returns `None` only when the geometry cannot resolve any column at all
/// (no columns, non-positive width, or a non-finite coordinate).
pub fn column_for_x(x: f32, origin_x: f32, column_width: f32, column_count: usize) -> Option<usize> {
    if column_count == 0 || !(column_width > 0.0) || !x.is_finite() || !origin_x.is_finite() {
        return None;
    }
    let raw = ((x - origin_x) / column_width).floor();
    let max = (column_count - 1) as f32;
    Some(raw.clamp(0.0, max) as usize)
}

pub fn minutes_of(time: NaiveTime) -> i32 {
    (time.hour() * 60 + time.minute()) as i32
}

/// Clamp to `[00:00, 23:59]` and convert.
pub fn time_from_minutes(minutes: i32) -> NaiveTime {
    let minutes = minutes.clamp(0, MINUTES_PER_DAY - 1) as u32;
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap_or(NaiveTime::MIN)
}
