use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_event_definitions_table(conn)?;
    run_event_definition_migrations(conn)?;
    Ok(())
}

fn create_event_definitions_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS event_definitions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            event_date TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            color TEXT,
            tag_ids TEXT NOT NULL DEFAULT '[]',
            note TEXT,
            reminders TEXT NOT NULL DEFAULT '[]',
            recurrence_rule TEXT,
            recurrence_exceptions TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create event_definitions table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_event_definitions_date
            ON event_definitions (event_date, start_time)",
        [],
    )
    .context("Failed to create event_definitions index")?;

    Ok(())
}

/// Columns added after the first schema release.
fn run_event_definition_migrations(conn: &Connection) -> Result<()> {
    migrations::ensure_column(
        conn,
        "event_definitions",
        "color_overrides",
        "ALTER TABLE event_definitions ADD COLUMN color_overrides TEXT",
    )?;

    Ok(())
}
