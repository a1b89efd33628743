use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use super::availability::weekday_of;
use super::domain::{Listing, ListingId, UserId, WeeklySlot};

/// Reasons a reservation attempt is refused before or during the
/// check-then-insert step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("requested date does not fall on the slot's weekday")]
    SlotDayMismatch,
    #[error("requested date is in the past")]
    PastDate,
    #[error("listing is closed for booking")]
    ListingClosed,
    #[error("providers cannot reserve their own listing")]
    SelfBooking,
    #[error("slot is already reserved for that date")]
    SlotAlreadyTaken { by_requester: bool },
}

/// Runs the cheap refusals in their published order and hands back a copy of
/// the targeted slot for the reservation snapshot.
///
/// An out-of-range slot index reads as a day mismatch: the index points at a
/// template revision the caller no longer holds.
pub(crate) fn admit(
    listing: &Listing,
    slot_index: usize,
    consumer_id: &UserId,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<WeeklySlot, ConflictError> {
    let slot = listing
        .slots
        .get(slot_index)
        .copied()
        .ok_or(ConflictError::SlotDayMismatch)?;
    if slot.day != weekday_of(date) {
        return Err(ConflictError::SlotDayMismatch);
    }
    if date < today {
        return Err(ConflictError::PastDate);
    }
    if !listing.is_available {
        return Err(ConflictError::ListingClosed);
    }
    if consumer_id == &listing.owner_id {
        return Err(ConflictError::SelfBooking);
    }
    Ok(slot)
}

const DEFAULT_STRIPES: usize = 64;

/// Striped locks serializing the check-then-insert window per reservation
/// tuple. Two attempts on the same `(listing, slot index, date)` always hash
/// to the same stripe, so at most one of them can pass the duplicate check.
pub struct TupleLocks {
    stripes: Vec<Mutex<()>>,
}

impl TupleLocks {
    pub fn new() -> Self {
        Self::with_stripes(DEFAULT_STRIPES)
    }

    pub fn with_stripes(count: usize) -> Self {
        let count = count.max(1);
        Self {
            stripes: (0..count).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Blocks until the stripe covering the tuple is free and holds it for
    /// the guard's lifetime.
    pub fn hold(
        &self,
        listing_id: &ListingId,
        slot_index: usize,
        date: NaiveDate,
    ) -> MutexGuard<'_, ()> {
        let mut hasher = DefaultHasher::new();
        listing_id.0.hash(&mut hasher);
        slot_index.hash(&mut hasher);
        date.hash(&mut hasher);
        let stripe = (hasher.finish() as usize) % self.stripes.len();
        self.stripes[stripe].lock().expect("tuple lock poisoned")
    }
}

impl Default for TupleLocks {
    fn default() -> Self {
        Self::new()
    }
}
