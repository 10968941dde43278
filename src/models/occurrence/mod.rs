// Occurrence module
// Renderable, dated instances derived from event definitions

use chrono::{Duration, NaiveDate, NaiveTime};
use std::fmt;

use crate::models::event::EventDefinition;

/// Which definition an occurrence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionRef {
    /// A definition the persistence collaborator knows about
    Saved(i64),
    /// A working-set clone that has not been stored yet
    Draft(u32),
}

impl fmt::Display for DefinitionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionRef::Saved(id) => write!(f, "{}", id),
            DefinitionRef::Draft(n) => write!(f, "draft-{}", n),
        }
    }
}

/// Identity of one occurrence, synthesized from `{definition, isoDate}`.
/// Ordering is lexicographic on the textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OccurrenceId(String);

impl OccurrenceId {
    pub fn new(source: DefinitionRef, date: NaiveDate) -> Self {
        Self(format!("{}@{}", source, date.format("%Y-%m-%d")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub id: OccurrenceId,
    pub source: DefinitionRef,
    pub title: String,
    pub color: Option<String>,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub date: NaiveDate,
    pub tag_ids: Vec<i64>,
    pub note: Option<String>,
    pub reminders: Vec<u32>,
}

impl Occurrence {
    /// Build the occurrence of `definition` that falls on `date`.
    pub fn from_definition(
        definition: &EventDefinition,
        source: DefinitionRef,
        date: NaiveDate,
    ) -> Self {
        let color = definition
            .color_overrides
            .get(&date)
            .cloned()
            .or_else(|| definition.color.clone());
        Self {
            id: OccurrenceId::new(source, date),
            source,
            title: definition.title.clone(),
            color,
            start: definition.start,
            end: definition.end,
            date,
            tag_ids: definition.tag_ids.clone(),
            note: definition.note.clone(),
            reminders: definition.reminders.clone(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Half-open interval intersection on the same date
    pub fn overlaps(&self, other: &Occurrence) -> bool {
        self.date == other.date && self.start < other.end && other.start < self.end
    }
}
