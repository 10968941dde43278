//! Event definition service entry point.
//! Provides the persistence boundary used by the grid, its SQLite-backed
//! implementation, and recurrence expansion helpers.

use anyhow::Result;
use rusqlite::Connection;

use crate::models::event::{EventDefinition, EventPatch};

pub mod crud;
pub mod recurrence;
mod shared;

/// The persistence collaborator the grid commits through.
///
/// Implementations own retries, caching and transport; callers treat every
/// error as final.
#[cfg_attr(test, mockall::automock)]
pub trait EventStore {
    /// Store a new definition and return it with its assigned id
    fn create(&self, definition: EventDefinition) -> Result<EventDefinition>;
    /// Apply a partial update to an existing definition
    fn update(&self, id: i64, patch: &EventPatch) -> Result<()>;
    fn delete(&self, id: i64) -> Result<()>;
    /// Read model: every definition currently stored
    fn list(&self) -> Result<Vec<EventDefinition>>;
}

/// Service for managing event definitions stored in SQLite.
pub struct EventService<'a> {
    pub(crate) conn: &'a Connection,
}

impl<'a> EventService<'a> {
    /// Create a new EventService with a database connection
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl EventStore for EventService<'_> {
    fn create(&self, definition: EventDefinition) -> Result<EventDefinition> {
        EventService::create(self, definition)
    }

    fn update(&self, id: i64, patch: &EventPatch) -> Result<()> {
        self.apply_patch(id, patch)
    }

    fn delete(&self, id: i64) -> Result<()> {
        EventService::delete(self, id)
    }

    fn list(&self) -> Result<Vec<EventDefinition>> {
        self.list_all()
    }
}
