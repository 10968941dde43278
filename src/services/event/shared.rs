use chrono::NaiveDate;
use rusqlite::{self, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

use super::recurrence::{format_rule, parse_rule};
use crate::models::recurrence::RecurrenceRule;

pub(crate) fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Decode a JSON column. NULL or empty text decodes to the type's default.
pub(crate) fn from_json<T: DeserializeOwned + Default>(json: Option<String>) -> Result<T> {
    match json.as_deref().map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(text) => serde_json::from_str(text)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e))),
    }
}

pub(crate) fn serialize_exceptions(exceptions: &[NaiveDate]) -> String {
    let serialized: Vec<String> = exceptions
        .iter()
        .map(|date| date.format("%Y-%m-%d").to_string())
        .collect();
    to_json(&serialized)
}

pub(crate) fn deserialize_exceptions(json: Option<String>) -> Result<Vec<NaiveDate>> {
    let dates: Vec<String> = from_json(json)?;
    Ok(dates
        .into_iter()
        .filter_map(|value| NaiveDate::parse_from_str(&value, "%Y-%m-%d").ok())
        .collect())
}

pub(crate) fn serialize_overrides(overrides: &BTreeMap<NaiveDate, String>) -> String {
    let keyed: BTreeMap<String, &String> = overrides
        .iter()
        .map(|(date, color)| (date.format("%Y-%m-%d").to_string(), color))
        .collect();
    to_json(&keyed)
}

pub(crate) fn deserialize_overrides(json: Option<String>) -> Result<BTreeMap<NaiveDate, String>> {
    let keyed: BTreeMap<String, String> = from_json(json)?;
    Ok(keyed
        .into_iter()
        .filter_map(|(date, color)| {
            NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .ok()
                .map(|date| (date, color))
        })
        .collect())
}

pub(crate) fn serialize_rule(rule: Option<&RecurrenceRule>) -> Option<String> {
    rule.map(format_rule)
}

pub(crate) fn deserialize_rule(rrule: Option<String>) -> Option<RecurrenceRule> {
    rrule.as_deref().and_then(parse_rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_null_is_default() {
        let tags: Vec<i64> = from_json(None).unwrap();
        assert!(tags.is_empty());
        let tags: Vec<i64> = from_json(Some("  ".to_string())).unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn test_from_json_invalid_is_error() {
        let result: Result<Vec<i64>> = from_json(Some("{oops".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_skip_unreadable_dates() {
        let parsed =
            deserialize_overrides(Some(r##"{"2025-01-02":"#FFFFFF","soon":"#000000"}"##.to_string()))
                .unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
