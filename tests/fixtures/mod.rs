// Test fixtures - reusable test data
// Definitions, an in-memory store and a grid geometry shared by the integration tests

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};
use egui::Pos2;

use plan_grid::models::event::EventDefinition;
use plan_grid::models::recurrence::RecurrenceRule;
use plan_grid::services::database::Database;
use plan_grid::ui_egui::geometry::GridGeometry;
use plan_grid::ui_egui::time_mapper::TimeMapper;

/// January 2025 date
pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn memory_database() -> Database {
    let db = Database::new(":memory:").expect("Failed to create database");
    db.initialize_schema().expect("Failed to initialize schema");
    db
}

/// One pixel per minute, seven 100px columns starting Monday 2025-01-13.
pub fn week_geometry() -> GridGeometry {
    GridGeometry::new(
        TimeMapper::new(60.0),
        Pos2::ZERO,
        100.0,
        date(13).iter_days().take(7).collect(),
    )
}

/// Sample definitions
pub mod events {
    use super::*;

    pub fn review() -> EventDefinition {
        EventDefinition::new("Review", date(14), time(9, 0), time(10, 0)).unwrap()
    }

    pub fn standup() -> EventDefinition {
        EventDefinition::new("Standup", date(14), time(9, 30), time(9, 45)).unwrap()
    }

    /// Weekly from Jan 1 until Jan 22: four occurrences
    pub fn weekly_sync() -> EventDefinition {
        EventDefinition::builder()
            .title("Weekly sync")
            .date(date(1))
            .start(time(14, 0))
            .end(time(15, 0))
            .recurrence(RecurrenceRule::weekly(date(22)))
            .build()
            .unwrap()
    }
}
