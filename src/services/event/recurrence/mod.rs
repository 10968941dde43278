//! Recurrence expansion: turns event definitions into dated occurrences.
//!
//! Expansion runs on the render path, so it never fails. Rules it cannot
//! honour degrade to a single occurrence at the anchor date, and every
//! series is capped at [`MAX_OCCURRENCES`] instances.

use crate::models::event::EventDefinition;
use crate::models::occurrence::{DefinitionRef, Occurrence};
use crate::models::recurrence::MAX_OCCURRENCES;
use chrono::NaiveDate;

mod parser;
mod utils;

pub use parser::{format_rule, parse_rule};
use utils::{is_excepted, nth_date};

/// Expand a stored definition. Unsaved definitions are treated as draft 0.
pub fn expand(definition: &EventDefinition) -> Vec<Occurrence> {
    let source = definition
        .id
        .map(DefinitionRef::Saved)
        .unwrap_or(DefinitionRef::Draft(0));
    expand_as(definition, source)
}

/// Expand `definition`, stamping occurrence identities with `source`.
pub fn expand_as(definition: &EventDefinition, source: DefinitionRef) -> Vec<Occurrence> {
    let Some(rule) = definition.recurrence else {
        return vec![Occurrence::from_definition(definition, source, definition.date)];
    };

    if let Err(reason) = rule.validate(definition.date) {
        log::warn!(
            "Definition {} has a malformed recurrence ({}); rendering a single occurrence",
            source,
            reason
        );
        return vec![Occurrence::from_definition(definition, source, definition.date)];
    }

    let mut occurrences = Vec::new();
    let mut step = 0u32;

    while occurrences.len() < MAX_OCCURRENCES {
        let Some(date) = nth_date(definition.date, rule.frequency, step) else {
            break;
        };
        if date > rule.until {
            break;
        }
        if !is_excepted(definition, date) {
            occurrences.push(Occurrence::from_definition(definition, source, date));
        }
        step += 1;
    }

    if occurrences.len() == MAX_OCCURRENCES {
        log::debug!(
            "Recurrence for definition {} truncated at {} occurrences",
            source,
            MAX_OCCURRENCES
        );
    }

    occurrences
}

/// Expand a whole read model and keep occurrences dated within
/// `first..=last`, ordered by date, start time and identity.
pub fn expand_in_range<'a, I>(definitions: I, first: NaiveDate, last: NaiveDate) -> Vec<Occurrence>
where
    I: IntoIterator<Item = (&'a EventDefinition, DefinitionRef)>,
{
    let mut visible: Vec<Occurrence> = definitions
        .into_iter()
        .flat_map(|(definition, source)| expand_as(definition, source))
        .filter(|occurrence| occurrence.date >= first && occurrence.date <= last)
        .collect();

    visible.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.start.cmp(&b.start))
            .then_with(|| a.id.cmp(&b.id))
    });
    visible
}
