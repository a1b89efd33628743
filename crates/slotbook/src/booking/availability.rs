use chrono::{Datelike, NaiveDate};

use super::domain::{Listing, WeekDay, WeeklySlot};

/// Weekday of a calendar date, Monday-first as published on the wire.
pub fn weekday_of(date: NaiveDate) -> WeekDay {
    WeekDay::from(date.weekday())
}

/// True when the listing's weekly template has at least one slot on the
/// date's weekday. A listing with no slots is bookable on no date.
pub fn is_date_bookable(listing: &Listing, date: NaiveDate) -> bool {
    let day = weekday_of(date);
    listing.slots.iter().any(|slot| slot.day == day)
}

/// The slots offered on a concrete date, each paired with its position in
/// the listing's full slot vector. Those positions are the indices callers
/// hand back when reserving, so they must survive the weekday filter intact.
pub fn slots_for(listing: &Listing, date: NaiveDate) -> Vec<(usize, WeeklySlot)> {
    let day = weekday_of(date);
    listing
        .slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.day == day)
        .map(|(index, slot)| (index, *slot))
        .collect()
}
