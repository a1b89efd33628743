use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde_json::Value;

use crate::booking::booking_router;
use crate::booking::domain::{
    Listing, ListingId, Reservation, ReservationId, ReservationStatus, UserId, WeekDay, WeeklySlot,
};
use crate::booking::service::{BookingService, ListingDraft, SlotBatch};
use crate::booking::store::{
    EvaluationReceipt, EvaluationSink, ListingStore, NotificationSink, NotifyError, OwnerNotice,
    ReservationStore, StoreError,
};
use crate::clock::FixedClock;

pub(super) const MIN_GAP_MINUTES: u32 = 30;

/// Thursday. All slot fixtures sit on Wednesdays around it.
pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 20).expect("valid date")
}

pub(super) fn wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 26).expect("valid date")
}

pub(super) fn following_wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 2).expect("valid date")
}

pub(super) fn past_wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 19).expect("valid date")
}

pub(super) fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

pub(super) fn slot(day: WeekDay, start: NaiveTime, end: NaiveTime) -> WeeklySlot {
    WeeklySlot { day, start, end }
}

/// Wednesday 14:00-15:00, the slot most scenarios book.
pub(super) fn wed_slot() -> WeeklySlot {
    slot(WeekDay::Wednesday, t(14, 0), t(15, 0))
}

pub(super) fn draft(owner: &str) -> ListingDraft {
    ListingDraft {
        owner_id: UserId(owner.to_string()),
        title: "Mobile bike repair".to_string(),
        description: "Tune-ups and flat fixes at your door".to_string(),
        category: "repair".to_string(),
        price: Some(45),
        radius_km: Some(10),
    }
}

pub(super) fn wed_batch() -> SlotBatch {
    SlotBatch {
        days: vec![WeekDay::Wednesday],
        start: t(14, 0),
        end: t(15, 0),
    }
}

pub(super) type MemoryService =
    BookingService<MemoryListings, MemoryReservations, MemoryNotices, MemoryEvaluations>;

pub(super) struct Harness {
    pub(super) service: Arc<MemoryService>,
    pub(super) listings: Arc<MemoryListings>,
    pub(super) reservations: Arc<MemoryReservations>,
    pub(super) notices: Arc<MemoryNotices>,
    pub(super) evaluations: Arc<MemoryEvaluations>,
    pub(super) clock: Arc<FixedClock>,
}

pub(super) fn harness() -> Harness {
    let listings = Arc::new(MemoryListings::default());
    let reservations = Arc::new(MemoryReservations::default());
    let notices = Arc::new(MemoryNotices::default());
    let evaluations = Arc::new(MemoryEvaluations::default());
    let clock = Arc::new(FixedClock::at(today()));
    let service = Arc::new(BookingService::with_clock(
        listings.clone(),
        reservations.clone(),
        notices.clone(),
        evaluations.clone(),
        MIN_GAP_MINUTES,
        clock.clone(),
    ));
    Harness {
        service,
        listings,
        reservations,
        notices,
        evaluations,
        clock,
    }
}

/// Publishes a listing for `owner` and installs the Wednesday slot.
pub(super) fn published_listing(harness: &Harness, owner: &str) -> Listing {
    let listing = harness
        .service
        .publish_listing(draft(owner))
        .expect("listing publishes");
    harness
        .service
        .add_slots(&listing.id, &wed_batch())
        .expect("slot installs")
        .listing
}

pub(super) fn booking_router_with_service(service: Arc<MemoryService>) -> axum::Router {
    booking_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[derive(Default, Clone)]
pub(super) struct MemoryListings {
    records: Arc<Mutex<Vec<Listing>>>,
}

impl ListingStore for MemoryListings {
    fn insert(&self, listing: Listing) -> Result<Listing, StoreError> {
        let mut guard = self.records.lock().expect("listing mutex poisoned");
        if guard.iter().any(|existing| existing.id == listing.id) {
            return Err(StoreError::Conflict);
        }
        guard.push(listing.clone());
        Ok(listing)
    }

    fn get(&self, id: &ListingId) -> Result<Option<Listing>, StoreError> {
        let guard = self.records.lock().expect("listing mutex poisoned");
        Ok(guard.iter().find(|listing| &listing.id == id).cloned())
    }

    fn save_slots(&self, id: &ListingId, slots: Vec<WeeklySlot>) -> Result<Listing, StoreError> {
        let mut guard = self.records.lock().expect("listing mutex poisoned");
        let listing = guard
            .iter_mut()
            .find(|listing| &listing.id == id)
            .ok_or(StoreError::NotFound)?;
        listing.slots = slots;
        Ok(listing.clone())
    }

    fn set_available(&self, id: &ListingId, available: bool) -> Result<Listing, StoreError> {
        let mut guard = self.records.lock().expect("listing mutex poisoned");
        let listing = guard
            .iter_mut()
            .find(|listing| &listing.id == id)
            .ok_or(StoreError::NotFound)?;
        listing.is_available = available;
        Ok(listing.clone())
    }

    fn list(&self) -> Result<Vec<Listing>, StoreError> {
        let guard = self.records.lock().expect("listing mutex poisoned");
        Ok(guard.clone())
    }
}

impl MemoryListings {
    /// Drops the listing outright, simulating an owner deletion that the
    /// external store cascades without telling the engine.
    pub(super) fn remove(&self, id: &ListingId) {
        let mut guard = self.records.lock().expect("listing mutex poisoned");
        guard.retain(|listing| &listing.id != id);
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryReservations {
    records: Arc<Mutex<Vec<Reservation>>>,
}

impl ReservationStore for MemoryReservations {
    fn insert(&self, reservation: Reservation) -> Result<Reservation, StoreError> {
        let mut guard = self.records.lock().expect("reservation mutex poisoned");
        let taken = guard.iter().any(|existing| {
            existing.id == reservation.id
                || (existing.listing_id == reservation.listing_id
                    && existing.slot_index == reservation.slot_index
                    && existing.date == reservation.date)
        });
        if taken {
            return Err(StoreError::Conflict);
        }
        guard.push(reservation.clone());
        Ok(reservation)
    }

    fn get(&self, id: &ReservationId) -> Result<Option<Reservation>, StoreError> {
        let guard = self.records.lock().expect("reservation mutex poisoned");
        Ok(guard.iter().find(|existing| &existing.id == id).cloned())
    }

    fn find_by_slot(
        &self,
        listing_id: &ListingId,
        slot_index: usize,
        date: NaiveDate,
    ) -> Result<Option<Reservation>, StoreError> {
        let guard = self.records.lock().expect("reservation mutex poisoned");
        Ok(guard
            .iter()
            .find(|existing| {
                &existing.listing_id == listing_id
                    && existing.slot_index == slot_index
                    && existing.date == date
            })
            .cloned())
    }

    fn update_status(
        &self,
        id: &ReservationId,
        expected: ReservationStatus,
        next: ReservationStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Reservation, StoreError> {
        let mut guard = self.records.lock().expect("reservation mutex poisoned");
        let record = guard
            .iter_mut()
            .find(|existing| &existing.id == id)
            .ok_or(StoreError::NotFound)?;
        if record.status != expected {
            return Err(StoreError::Conflict);
        }
        record.status = next;
        record.updated_at = updated_at;
        Ok(record.clone())
    }

    fn list_for_consumer(&self, consumer_id: &UserId) -> Result<Vec<Reservation>, StoreError> {
        let guard = self.records.lock().expect("reservation mutex poisoned");
        Ok(guard
            .iter()
            .filter(|existing| &existing.consumer_id == consumer_id)
            .cloned()
            .collect())
    }

    fn list_for_listing(&self, listing_id: &ListingId) -> Result<Vec<Reservation>, StoreError> {
        let guard = self.records.lock().expect("reservation mutex poisoned");
        Ok(guard
            .iter()
            .filter(|existing| &existing.listing_id == listing_id)
            .cloned()
            .collect())
    }

    fn list_with_status(&self, status: ReservationStatus) -> Result<Vec<Reservation>, StoreError> {
        let guard = self.records.lock().expect("reservation mutex poisoned");
        Ok(guard
            .iter()
            .filter(|existing| existing.status == status)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotices {
    notices: Arc<Mutex<Vec<OwnerNotice>>>,
}

impl MemoryNotices {
    pub(super) fn delivered(&self) -> Vec<OwnerNotice> {
        self.notices.lock().expect("notice mutex poisoned").clone()
    }
}

impl NotificationSink for MemoryNotices {
    fn notify(&self, notice: OwnerNotice) -> Result<(), NotifyError> {
        self.notices
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryEvaluations {
    records: Arc<Mutex<HashMap<ReservationId, (u8, String)>>>,
}

impl MemoryEvaluations {
    pub(super) fn stored(&self, id: &ReservationId) -> Option<(u8, String)> {
        self.records
            .lock()
            .expect("evaluation mutex poisoned")
            .get(id)
            .cloned()
    }
}

impl EvaluationSink for MemoryEvaluations {
    fn submit(
        &self,
        reservation_id: &ReservationId,
        rating: u8,
        comment: &str,
    ) -> Result<EvaluationReceipt, StoreError> {
        let mut guard = self.records.lock().expect("evaluation mutex poisoned");
        let first_submission = !guard.contains_key(reservation_id);
        guard.insert(reservation_id.clone(), (rating, comment.to_string()));
        Ok(EvaluationReceipt {
            reservation_id: reservation_id.clone(),
            rating,
            comment: comment.to_string(),
            first_submission,
        })
    }
}

/// Sink that always refuses, for notification fire-and-forget coverage.
#[derive(Default, Clone)]
pub(super) struct RefusingNotices;

impl NotificationSink for RefusingNotices {
    fn notify(&self, _notice: OwnerNotice) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("messaging offline".to_string()))
    }
}

/// Listing store that always reports the backend missing.
pub(super) struct UnavailableListings;

impl ListingStore for UnavailableListings {
    fn insert(&self, _listing: Listing) -> Result<Listing, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn get(&self, _id: &ListingId) -> Result<Option<Listing>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn save_slots(&self, _id: &ListingId, _slots: Vec<WeeklySlot>) -> Result<Listing, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn set_available(&self, _id: &ListingId, _available: bool) -> Result<Listing, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Listing>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}
