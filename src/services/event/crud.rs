use super::shared::{
    deserialize_exceptions, deserialize_overrides, deserialize_rule, from_json,
    serialize_exceptions, serialize_overrides, serialize_rule, to_json,
};
use super::EventService;
use crate::models::event::{EventDefinition, EventPatch};
use anyhow::{anyhow, Context, Result};
use chrono::Local;
use rusqlite::{self, params, Row};

const SELECT_COLUMNS: &str = "SELECT id, title, event_date, start_time, end_time, color,
        tag_ids, note, reminders, recurrence_rule, recurrence_exceptions, color_overrides
     FROM event_definitions";

fn row_to_definition(row: &Row<'_>) -> rusqlite::Result<EventDefinition> {
    Ok(EventDefinition {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        date: row.get(2)?,
        start: row.get(3)?,
        end: row.get(4)?,
        color: row.get(5)?,
        tag_ids: from_json(row.get(6)?)?,
        note: row.get(7)?,
        reminders: from_json(row.get(8)?)?,
        recurrence: deserialize_rule(row.get(9)?),
        exceptions: deserialize_exceptions(row.get(10)?)?,
        color_overrides: deserialize_overrides(row.get(11)?)?,
    })
}

impl<'a> EventService<'a> {
    /// Create a new definition in the database.
    pub fn create(&self, mut event: EventDefinition) -> Result<EventDefinition> {
        event.validate().map_err(|e| anyhow!(e))?;

        let now = Local::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO event_definitions (
                    title, event_date, start_time, end_time, color, tag_ids, note,
                    reminders, recurrence_rule, recurrence_exceptions, color_overrides,
                    created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    event.title,
                    event.date,
                    event.start,
                    event.end,
                    event.color,
                    to_json(&event.tag_ids),
                    event.note,
                    to_json(&event.reminders),
                    serialize_rule(event.recurrence.as_ref()),
                    serialize_exceptions(&event.exceptions),
                    serialize_overrides(&event.color_overrides),
                    &now,
                    &now,
                ],
            )
            .context("Failed to insert event definition")?;

        event.id = Some(self.conn.last_insert_rowid());
        log::debug!("Created event definition {:?} \"{}\"", event.id, event.title);
        Ok(event)
    }

    /// Retrieve a definition by ID.
    pub fn get(&self, id: i64) -> Result<Option<EventDefinition>> {
        let result = self.conn.query_row(
            &format!("{} WHERE id = ?", SELECT_COLUMNS),
            [id],
            row_to_definition,
        );

        match result {
            Ok(event) => Ok(Some(event)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List every stored definition ordered by anchor date and start time.
    pub fn list_all(&self) -> Result<Vec<EventDefinition>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY event_date, start_time, id", SELECT_COLUMNS))
            .context("Failed to prepare definition query")?;
        let events = stmt
            .query_map([], row_to_definition)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read event definitions")?;
        Ok(events)
    }

    /// Overwrite an existing definition.
    pub fn update(&self, event: &EventDefinition) -> Result<()> {
        let id = event
            .id
            .ok_or_else(|| anyhow!("Event ID is required for update"))?;
        event.validate().map_err(|e| anyhow!(e))?;

        let rows_affected = self
            .conn
            .execute(
                "UPDATE event_definitions SET
                    title = ?, event_date = ?, start_time = ?, end_time = ?, color = ?,
                    tag_ids = ?, note = ?, reminders = ?, recurrence_rule = ?,
                    recurrence_exceptions = ?, color_overrides = ?, updated_at = ?
                 WHERE id = ?",
                params![
                    event.title,
                    event.date,
                    event.start,
                    event.end,
                    event.color,
                    to_json(&event.tag_ids),
                    event.note,
                    to_json(&event.reminders),
                    serialize_rule(event.recurrence.as_ref()),
                    serialize_exceptions(&event.exceptions),
                    serialize_overrides(&event.color_overrides),
                    Local::now().to_rfc3339(),
                    id,
                ],
            )
            .context("Failed to update event definition")?;

        if rows_affected == 0 {
            return Err(anyhow!("Event with id {} not found", id));
        }

        Ok(())
    }

    /// Apply a partial update to a stored definition.
    pub fn apply_patch(&self, id: i64, patch: &EventPatch) -> Result<()> {
        let mut event = self
            .get(id)?
            .ok_or_else(|| anyhow!("Event with id {} not found", id))?;
        patch.apply_to(&mut event);
        self.update(&event)
    }

    /// Delete a definition by ID.
    pub fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM event_definitions WHERE id = ?", [id])
            .context("Failed to delete event definition")?;

        if rows_affected == 0 {
            return Err(anyhow!("Event with id {} not found", id));
        }

        Ok(())
    }
}
