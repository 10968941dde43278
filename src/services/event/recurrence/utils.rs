use chrono::{Days, Months, NaiveDate};

use crate::models::event::EventDefinition;
use crate::models::recurrence::Frequency;

/// Date of the `step`-th repetition after `anchor`.
///
/// Monthly steps are measured from the anchor rather than chained, so a
/// series anchored on the 31st lands on the last day of shorter months and
/// returns to the 31st afterwards.
pub(super) fn nth_date(anchor: NaiveDate, frequency: Frequency, step: u32) -> Option<NaiveDate> {
    match frequency {
        Frequency::Daily => anchor.checked_add_days(Days::new(step as u64)),
        Frequency::Weekly => anchor.checked_add_days(Days::new(step as u64 * 7)),
        Frequency::Monthly => anchor.checked_add_months(Months::new(step)),
    }
}

pub(super) fn is_excepted(definition: &EventDefinition, date: NaiveDate) -> bool {
    definition.exceptions.contains(&date)
}
