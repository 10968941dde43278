// Event module
// Durable event definition plus the partial update used by grid commits

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::recurrence::RecurrenceRule;

/// The persisted record occurrences are derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub id: Option<i64>,
    pub title: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// Anchor date; the only date for non-recurring definitions
    pub date: NaiveDate,
    pub color: Option<String>,
    pub tag_ids: Vec<i64>,
    pub note: Option<String>,
    /// Reminder offsets in minutes before the start time
    pub reminders: Vec<u32>,
    pub recurrence: Option<RecurrenceRule>,
    /// Occurrence dates removed from a recurring series
    pub exceptions: Vec<NaiveDate>,
    /// Per-occurrence color overrides keyed by occurrence date
    pub color_overrides: BTreeMap<NaiveDate, String>,
}

impl EventDefinition {
    /// Create a new definition with required fields
    ///
    /// # Examples
    /// ```
    /// use plan_grid::models::event::EventDefinition;
    /// use chrono::{NaiveDate, NaiveTime};
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    /// let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    /// let end = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
    /// let event = EventDefinition::new("Standup", date, start, end).unwrap();
    /// assert_eq!(event.duration().num_minutes(), 60);
    /// ```
    pub fn new(
        title: impl Into<String>,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Self, String> {
        let event = Self {
            id: None,
            title: title.into(),
            start,
            end,
            date,
            color: None,
            tag_ids: Vec::new(),
            note: None,
            reminders: Vec::new(),
            recurrence: None,
            exceptions: Vec::new(),
            color_overrides: BTreeMap::new(),
        };
        event.validate()?;
        Ok(event)
    }

    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Event title cannot be empty".to_string());
        }

        if self.end <= self.start {
            return Err("Event end time must be after start time".to_string());
        }

        if let Some(ref color) = self.color {
            validate_hex_color(color)?;
        }
        for color in self.color_overrides.values() {
            validate_hex_color(color)?;
        }

        if let Some(ref rule) = self.recurrence {
            rule.validate(self.date)?;
        }

        Ok(())
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

fn validate_hex_color(color: &str) -> Result<(), String> {
    let valid_len = color.len() == 7 || color.len() == 4;
    let valid_digits = color
        .get(1..)
        .map(|digits| digits.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false);
    if !color.starts_with('#') || !valid_len || !valid_digits {
        return Err("Color must be in hex format (#RRGGBB or #RGB)".to_string());
    }
    Ok(())
}

/// Builder for creating definitions with optional fields
#[derive(Default)]
pub struct EventBuilder {
    title: Option<String>,
    date: Option<NaiveDate>,
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
    color: Option<String>,
    tag_ids: Vec<i64>,
    note: Option<String>,
    reminders: Vec<u32>,
    recurrence: Option<RecurrenceRule>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn start(mut self, start: NaiveTime) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: NaiveTime) -> Self {
        self.end = Some(end);
        self
    }

    /// Set the event color (hex format)
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn tag(mut self, tag_id: i64) -> Self {
        self.tag_ids.push(tag_id);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn reminder(mut self, minutes_before: u32) -> Self {
        self.reminders.push(minutes_before);
        self
    }

    pub fn recurrence(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence = Some(rule);
        self
    }

    pub fn build(self) -> Result<EventDefinition, String> {
        let title = self.title.ok_or("Event title is required")?;
        let date = self.date.ok_or("Event date is required")?;
        let start = self.start.ok_or("Event start time is required")?;
        let end = self.end.ok_or("Event end time is required")?;

        let event = EventDefinition {
            id: None,
            title,
            start,
            end,
            date,
            color: self.color,
            tag_ids: self.tag_ids,
            note: self.note,
            reminders: self.reminders,
            recurrence: self.recurrence,
            exceptions: Vec::new(),
            color_overrides: BTreeMap::new(),
        };

        event.validate()?;
        Ok(event)
    }
}

/// Partial definition sent to the persistence collaborator.
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub color: Option<Option<String>>,
    pub recurrence: Option<Option<RecurrenceRule>>,
    pub exceptions: Option<Vec<NaiveDate>>,
    pub color_overrides: Option<BTreeMap<NaiveDate, String>>,
}

impl EventPatch {
    /// Patch moving a definition to a new date and time window
    pub fn reschedule(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            date: Some(date),
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    /// Patch changing only the time window
    pub fn retime(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, event: &mut EventDefinition) {
        if let Some(ref title) = self.title {
            event.title = title.clone();
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(start) = self.start {
            event.start = start;
        }
        if let Some(end) = self.end {
            event.end = end;
        }
        if let Some(ref color) = self.color {
            event.color = color.clone();
        }
        if let Some(recurrence) = self.recurrence {
            event.recurrence = recurrence;
        }
        if let Some(ref exceptions) = self.exceptions {
            event.exceptions = exceptions.clone();
        }
        if let Some(ref overrides) = self.color_overrides {
            event.color_overrides = overrides.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recurrence::Frequency;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_new_event_success() {
        let event = EventDefinition::new("Meeting", date(2025, 1, 15), time(9, 0), time(10, 0))
            .unwrap();
        assert_eq!(event.title, "Meeting");
        assert!(event.id.is_none());
        assert!(!event.is_recurring());
        assert_eq!(event.duration(), Duration::hours(1));
    }

    #[test]
    fn test_new_event_empty_title() {
        let result = EventDefinition::new("   ", date(2025, 1, 15), time(9, 0), time(10, 0));
        assert_eq!(result.unwrap_err(), "Event title cannot be empty");
    }

    #[test]
    fn test_new_event_invalid_times() {
        let result = EventDefinition::new("Meeting", date(2025, 1, 15), time(10, 0), time(10, 0));
        assert_eq!(result.unwrap_err(), "Event end time must be after start time");
    }

    #[test]
    fn test_builder_with_optional_fields() {
        let event = EventDefinition::builder()
            .title("Deep work")
            .date(date(2025, 3, 3))
            .start(time(8, 0))
            .end(time(11, 30))
            .color("#FF5733")
            .tag(3)
            .tag(7)
            .note("phone off")
            .reminder(10)
            .build()
            .unwrap();

        assert_eq!(event.tag_ids, vec![3, 7]);
        assert_eq!(event.note.as_deref(), Some("phone off"));
        assert_eq!(event.reminders, vec![10]);
        assert_eq!(event.color.as_deref(), Some("#FF5733"));
    }

    #[test]
    fn test_builder_missing_date() {
        let result = EventDefinition::builder()
            .title("Meeting")
            .start(time(9, 0))
            .end(time(10, 0))
            .build();
        assert_eq!(result.unwrap_err(), "Event date is required");
    }

    #[test]
    fn test_validate_invalid_color() {
        let mut event =
            EventDefinition::new("Meeting", date(2025, 1, 15), time(9, 0), time(10, 0)).unwrap();
        event.color = Some("red".to_string());
        assert!(event.validate().unwrap_err().contains("hex format"));

        event.color = Some("#GG0000".to_string());
        assert!(event.validate().is_err());

        event.color = Some("#F57".to_string());
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_validate_recurrence_until_before_anchor() {
        let result = EventDefinition::builder()
            .title("Weekly")
            .date(date(2025, 2, 1))
            .start(time(9, 0))
            .end(time(10, 0))
            .recurrence(RecurrenceRule::new(Frequency::Weekly, date(2025, 1, 1)))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_apply_only_touches_set_fields() {
        let mut event =
            EventDefinition::new("Meeting", date(2025, 1, 15), time(9, 0), time(10, 0)).unwrap();
        event.color = Some("#112233".to_string());

        EventPatch::retime(time(13, 0), time(14, 15)).apply_to(&mut event);

        assert_eq!(event.start, time(13, 0));
        assert_eq!(event.end, time(14, 15));
        assert_eq!(event.date, date(2025, 1, 15));
        assert_eq!(event.color.as_deref(), Some("#112233"));
    }

    #[test]
    fn test_patch_can_clear_color() {
        let mut event =
            EventDefinition::new("Meeting", date(2025, 1, 15), time(9, 0), time(10, 0)).unwrap();
        event.color = Some("#112233".to_string());
        let patch = EventPatch {
            color: Some(None),
            ..EventPatch::default()
        };
        assert!(!patch.is_empty());
        patch.apply_to(&mut event);
        assert!(event.color.is_none());
    }
}
