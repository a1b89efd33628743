use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::search::{self, SearchQuery};

use super::availability::{is_date_bookable, slots_for, weekday_of};
use super::domain::{
    Listing, ListingId, Reservation, ReservationId, ReservationStatus, UserId, WeekDay, WeeklySlot,
};
use super::guard::{self, ConflictError, TupleLocks};
use super::lifecycle::{self, InvalidTransition};
use super::slots::{self, SlotValidationError, SlotWarning};
use super::store::{
    EvaluationReceipt, EvaluationSink, ListingStore, NotificationSink, OwnerNotice,
    ReservationStore, StoreError,
};

/// Facade composing slot validation, availability matching, the booking
/// conflict guard, and the reservation lifecycle over pluggable stores.
pub struct BookingService<L, R, N, E> {
    listings: Arc<L>,
    reservations: Arc<R>,
    notifications: Arc<N>,
    evaluations: Arc<E>,
    clock: Arc<dyn Clock>,
    locks: TupleLocks,
    min_gap_minutes: u32,
}

static LISTING_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static RESERVATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_listing_id() -> ListingId {
    let id = LISTING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ListingId(format!("lst-{id:06}"))
}

fn next_reservation_id() -> ReservationId {
    let id = RESERVATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReservationId(format!("rsv-{id:06}"))
}

/// Provider input for publishing a new listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDraft {
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: Option<u32>,
    pub radius_km: Option<u32>,
}

/// One editor step: a time range applied to one or more weekdays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotBatch {
    pub days: Vec<WeekDay>,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// A persisted slot edit together with the advisory warnings it raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotUpdate {
    pub listing: Listing,
    pub warnings: Vec<SlotWarning>,
}

/// One bookable slot on a concrete date, carrying its stable position in the
/// listing's template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexedSlot {
    pub index: usize,
    pub day: WeekDay,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Availability of a listing on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateAvailability {
    pub date: NaiveDate,
    pub weekday: WeekDay,
    pub bookable: bool,
    pub slots: Vec<IndexedSlot>,
}

/// A recorded review and the reservation as it stands afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    pub reservation: Reservation,
    pub receipt: EvaluationReceipt,
}

impl<L, R, N, E> BookingService<L, R, N, E>
where
    L: ListingStore + 'static,
    R: ReservationStore + 'static,
    N: NotificationSink + 'static,
    E: EvaluationSink + 'static,
{
    pub fn new(
        listings: Arc<L>,
        reservations: Arc<R>,
        notifications: Arc<N>,
        evaluations: Arc<E>,
        min_gap_minutes: u32,
    ) -> Self {
        Self::with_clock(
            listings,
            reservations,
            notifications,
            evaluations,
            min_gap_minutes,
            Arc::new(SystemClock),
        )
    }

    pub fn with_clock(
        listings: Arc<L>,
        reservations: Arc<R>,
        notifications: Arc<N>,
        evaluations: Arc<E>,
        min_gap_minutes: u32,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            listings,
            reservations,
            notifications,
            evaluations,
            clock,
            locks: TupleLocks::new(),
            min_gap_minutes,
        }
    }

    /// Publish a new listing with an empty slot template, open for booking.
    pub fn publish_listing(&self, draft: ListingDraft) -> Result<Listing, BookingServiceError> {
        let listing = Listing {
            id: next_listing_id(),
            owner_id: draft.owner_id,
            title: draft.title,
            description: draft.description,
            category: draft.category,
            price: draft.price,
            radius_km: draft.radius_km,
            is_available: true,
            slots: Vec::new(),
        };
        let stored = self.listings.insert(listing)?;
        Ok(stored)
    }

    pub fn listing(&self, id: &ListingId) -> Result<Listing, BookingServiceError> {
        let listing = self.listings.get(id)?.ok_or(StoreError::NotFound)?;
        Ok(listing)
    }

    /// Validate one batch against the listing's current template and append
    /// the accepted slots. Blocking validation errors leave the template
    /// untouched.
    pub fn add_slots(
        &self,
        listing_id: &ListingId,
        batch: &SlotBatch,
    ) -> Result<SlotUpdate, BookingServiceError> {
        let listing = self.listings.get(listing_id)?.ok_or(StoreError::NotFound)?;
        let outcome = slots::validate_batch(
            &listing.slots,
            &batch.days,
            batch.start,
            batch.end,
            self.min_gap_minutes,
        )?;

        let mut template = listing.slots;
        template.extend(outcome.accepted.iter().copied());
        let listing = self.listings.save_slots(listing_id, template)?;
        Ok(SlotUpdate {
            listing,
            warnings: outcome.warnings,
        })
    }

    /// Replace the listing's template wholesale with the given batches,
    /// validating each against the set accumulated so far. The first blocking
    /// error aborts the edit with nothing written.
    ///
    /// Reservations taken against the old template keep their snapshots; an
    /// index into the new template is a fresh contract.
    pub fn replace_slots(
        &self,
        listing_id: &ListingId,
        batches: &[SlotBatch],
    ) -> Result<SlotUpdate, BookingServiceError> {
        self.listings.get(listing_id)?.ok_or(StoreError::NotFound)?;

        let mut template: Vec<WeeklySlot> = Vec::new();
        let mut warnings: Vec<SlotWarning> = Vec::new();
        for batch in batches {
            let outcome = slots::validate_batch(
                &template,
                &batch.days,
                batch.start,
                batch.end,
                self.min_gap_minutes,
            )?;
            template.extend(outcome.accepted.iter().copied());
            warnings.extend(outcome.warnings.iter().copied());
        }

        let listing = self.listings.save_slots(listing_id, template)?;
        Ok(SlotUpdate { listing, warnings })
    }

    /// Open or close a listing for new bookings. Closing never touches
    /// reservations already taken.
    pub fn set_listing_available(
        &self,
        listing_id: &ListingId,
        available: bool,
    ) -> Result<Listing, BookingServiceError> {
        let listing = self.listings.set_available(listing_id, available)?;
        Ok(listing)
    }

    /// Which slots a listing offers on one calendar date.
    pub fn availability(
        &self,
        listing_id: &ListingId,
        date: NaiveDate,
    ) -> Result<DateAvailability, BookingServiceError> {
        let listing = self.listings.get(listing_id)?.ok_or(StoreError::NotFound)?;
        let slots = slots_for(&listing, date)
            .into_iter()
            .map(|(index, slot)| IndexedSlot {
                index,
                day: slot.day,
                start: slot.start,
                end: slot.end,
            })
            .collect();
        Ok(DateAvailability {
            date,
            weekday: weekday_of(date),
            bookable: is_date_bookable(&listing, date),
            slots,
        })
    }

    /// Claim one slot of one listing for one date.
    ///
    /// The cheap refusals run first; the duplicate check and the insert then
    /// happen under a lock striped by the reservation tuple, so two racing
    /// requests for the same tuple cannot both observe "free".
    pub fn try_reserve(
        &self,
        listing_id: &ListingId,
        slot_index: usize,
        consumer_id: &UserId,
        date: NaiveDate,
    ) -> Result<Reservation, BookingServiceError> {
        // A deleted listing books like a closed one.
        let listing = self
            .listings
            .get(listing_id)?
            .ok_or(ConflictError::ListingClosed)?;
        let slot = guard::admit(&listing, slot_index, consumer_id, date, self.clock.today())?;

        let _held = self.locks.hold(listing_id, slot_index, date);

        if let Some(existing) = self
            .reservations
            .find_by_slot(listing_id, slot_index, date)?
        {
            return Err(ConflictError::SlotAlreadyTaken {
                by_requester: existing.consumer_id == *consumer_id,
            }
            .into());
        }

        let now = self.clock.now();
        let reservation = Reservation {
            id: next_reservation_id(),
            listing_id: listing_id.clone(),
            slot_index,
            slot,
            consumer_id: consumer_id.clone(),
            date,
            status: ReservationStatus::ToPay,
            created_at: now,
            updated_at: now,
        };

        match self.reservations.insert(reservation) {
            Ok(stored) => Ok(stored),
            // Store-level tuple constraint as backstop when the store is
            // shared with writers outside this process.
            Err(StoreError::Conflict) => {
                let by_requester = self
                    .reservations
                    .find_by_slot(listing_id, slot_index, date)?
                    .map(|existing| existing.consumer_id == *consumer_id)
                    .unwrap_or(false);
                Err(ConflictError::SlotAlreadyTaken { by_requester }.into())
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Payment capture callback: moves the reservation to `reserved` and
    /// tells the owner. Notification delivery is fire-and-forget; a failed
    /// send is logged and the reservation stays reserved.
    pub fn confirm_payment(
        &self,
        reservation_id: &ReservationId,
    ) -> Result<Reservation, BookingServiceError> {
        let updated = self.advance(reservation_id, ReservationStatus::Reserved)?;

        match self.listings.get(&updated.listing_id) {
            Ok(Some(listing)) => {
                let notice = OwnerNotice {
                    owner_id: listing.owner_id,
                    reservation_id: updated.id.clone(),
                    listing_id: updated.listing_id.clone(),
                    date: updated.date,
                };
                if let Err(err) = self.notifications.notify(notice) {
                    tracing::warn!(
                        reservation = %updated.id.0,
                        error = %err,
                        "owner notification dropped"
                    );
                }
            }
            Ok(None) => {
                tracing::warn!(
                    reservation = %updated.id.0,
                    "owner notification skipped, listing no longer exists"
                );
            }
            Err(err) => {
                tracing::warn!(
                    reservation = %updated.id.0,
                    error = %err,
                    "owner notification skipped, listing lookup failed"
                );
            }
        }

        Ok(updated)
    }

    /// Move every paid reservation whose service date has passed on to
    /// `to_evaluate`. Returns how many moved. Reservations racing another
    /// writer are skipped, not failed.
    pub fn sweep_due(&self) -> Result<usize, BookingServiceError> {
        let today = self.clock.today();
        let mut advanced = 0;
        for reservation in self
            .reservations
            .list_with_status(ReservationStatus::Reserved)?
        {
            if !lifecycle::is_due_for_evaluation(&reservation, today) {
                continue;
            }
            match self.reservations.update_status(
                &reservation.id,
                ReservationStatus::Reserved,
                ReservationStatus::ToEvaluate,
                self.clock.now(),
            ) {
                Ok(_) => advanced += 1,
                Err(StoreError::Conflict) => continue,
                Err(other) => return Err(other.into()),
            }
        }
        if advanced > 0 {
            tracing::info!(advanced, "reservations now awaiting evaluation");
        }
        Ok(advanced)
    }

    /// Record a consumer review. The first submission completes the
    /// reservation; a repeat submission updates the stored review and leaves
    /// the status alone.
    pub fn submit_evaluation(
        &self,
        reservation_id: &ReservationId,
        rating: u8,
        comment: &str,
    ) -> Result<EvaluationResult, BookingServiceError> {
        let current = self
            .reservations
            .get(reservation_id)?
            .ok_or(StoreError::NotFound)?;
        match current.status {
            ReservationStatus::ToEvaluate | ReservationStatus::Completed => {}
            other => {
                return Err(InvalidTransition {
                    from: other,
                    attempted: ReservationStatus::Completed,
                }
                .into())
            }
        }

        let receipt = self.evaluations.submit(reservation_id, rating, comment)?;
        let reservation = if receipt.first_submission
            && current.status == ReservationStatus::ToEvaluate
        {
            self.advance(reservation_id, ReservationStatus::Completed)?
        } else {
            current
        };

        Ok(EvaluationResult {
            reservation,
            receipt,
        })
    }

    pub fn reservation(
        &self,
        reservation_id: &ReservationId,
    ) -> Result<Reservation, BookingServiceError> {
        let reservation = self
            .reservations
            .get(reservation_id)?
            .ok_or(StoreError::NotFound)?;
        Ok(reservation)
    }

    pub fn reservations_for_consumer(
        &self,
        consumer_id: &UserId,
    ) -> Result<Vec<Reservation>, BookingServiceError> {
        let reservations = self.reservations.list_for_consumer(consumer_id)?;
        Ok(reservations)
    }

    pub fn reservations_for_listing(
        &self,
        listing_id: &ListingId,
    ) -> Result<Vec<Reservation>, BookingServiceError> {
        let reservations = self.reservations.list_for_listing(listing_id)?;
        Ok(reservations)
    }

    /// Rank the full catalogue against a search query.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<Listing>, BookingServiceError> {
        let listings = self.listings.list()?;
        Ok(search::rank(&listings, query))
    }

    /// One compare-and-set step along the lifecycle chain. A store conflict
    /// means another writer got there first; the fresh status is reported in
    /// the transition error.
    fn advance(
        &self,
        reservation_id: &ReservationId,
        to: ReservationStatus,
    ) -> Result<Reservation, BookingServiceError> {
        let current = self
            .reservations
            .get(reservation_id)?
            .ok_or(StoreError::NotFound)?;
        lifecycle::step(current.status, to)?;

        match self
            .reservations
            .update_status(reservation_id, current.status, to, self.clock.now())
        {
            Ok(updated) => Ok(updated),
            Err(StoreError::Conflict) => {
                let fresh = self
                    .reservations
                    .get(reservation_id)?
                    .ok_or(StoreError::NotFound)?;
                Err(InvalidTransition {
                    from: fresh.status,
                    attempted: to,
                }
                .into())
            }
            Err(other) => Err(other.into()),
        }
    }
}

/// Error raised by the booking service.
#[derive(Debug, thiserror::Error)]
pub enum BookingServiceError {
    #[error(transparent)]
    Validation(#[from] SlotValidationError),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error(transparent)]
    Store(#[from] StoreError),
}
