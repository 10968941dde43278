use chrono::NaiveDate;

use crate::models::recurrence::{Frequency, RecurrenceRule};

/// Serialize a rule into the stored `FREQ=...;UNTIL=YYYYMMDD` form.
pub fn format_rule(rule: &RecurrenceRule) -> String {
    format!(
        "FREQ={};UNTIL={}",
        rule.frequency.as_str().to_ascii_uppercase(),
        rule.until.format("%Y%m%d")
    )
}

/// Parse a stored rule. Anything we cannot expand (unknown frequency,
/// missing or unreadable UNTIL) yields `None` so the definition renders as a
/// single occurrence.
pub fn parse_rule(rrule: &str) -> Option<RecurrenceRule> {
    let rrule = rrule.trim();
    if rrule.is_empty() || rrule.eq_ignore_ascii_case("none") {
        return None;
    }

    let Some(frequency) = parse_frequency(rrule) else {
        log::warn!("Unrecognized recurrence rule '{}', ignoring recurrence", rrule);
        return None;
    };
    let Some(until) = parse_until(rrule) else {
        log::warn!("Recurrence rule '{}' has no valid UNTIL, ignoring recurrence", rrule);
        return None;
    };

    Some(RecurrenceRule { frequency, until })
}

fn field<'a>(rrule: &'a str, name: &str) -> Option<&'a str> {
    rrule
        .split(';')
        .filter_map(|part| part.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim())
}

fn parse_frequency(rrule: &str) -> Option<Frequency> {
    field(rrule, "FREQ")?.parse::<Frequency>().ok()
}

fn parse_until(rrule: &str) -> Option<NaiveDate> {
    let date_str = field(rrule, "UNTIL")?;
    // Tolerate a trailing time component (20250122T235959Z)
    let date_part = date_str.get(..8)?;
    NaiveDate::parse_from_str(date_part, "%Y%m%d").ok()
}
