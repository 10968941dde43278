//! Error types surfaced by the grid.

use thiserror::Error;

use crate::models::occurrence::OccurrenceId;

#[derive(Error, Debug)]
pub enum GridError {
    /// The persistence collaborator rejected a committed change. The working
    /// set has already been rolled back when this is returned.
    #[error("Failed to save change: {0:#}")]
    Commit(#[source] anyhow::Error),

    #[error("A gesture is already in progress")]
    GestureActive,

    #[error("Unknown occurrence: {0}")]
    UnknownOccurrence(OccurrenceId),

    #[error("Unknown event definition: {0}")]
    UnknownDefinition(i64),

    #[error("Failed to load events: {0:#}")]
    Load(#[source] anyhow::Error),
}

pub type GridResult<T> = Result<T, GridError>;
