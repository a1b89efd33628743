use chrono::{DateTime, NaiveDate};
use metrics_exporter_prometheus::PrometheusHandle;
use slotbook::booking::{
    EvaluationReceipt, EvaluationSink, Listing, ListingId, ListingStore, NotificationSink,
    NotifyError, OwnerNotice, Reservation, ReservationId, ReservationStatus, ReservationStore,
    StoreError, UserId, WeeklySlot,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Vec-backed so `list` preserves publication order; a blank search query
/// returns the catalogue exactly as published.
#[derive(Default, Clone)]
pub(crate) struct InMemoryListingStore {
    records: Arc<Mutex<Vec<Listing>>>,
}

impl ListingStore for InMemoryListingStore {
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

#[derive(Default, Clone)]
pub(crate) struct InMemoryReservationStore {
    records: Arc<Mutex<Vec<Reservation>>>,
}

impl ReservationStore for InMemoryReservationStore {
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
        updated_at: DateTime<chrono::Utc>,
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
pub(crate) struct InMemoryNotificationSink {
    notices: Arc<Mutex<Vec<OwnerNotice>>>,
}

impl NotificationSink for InMemoryNotificationSink {
    fn notify(&self, notice: OwnerNotice) -> Result<(), NotifyError> {
        let mut guard = self.notices.lock().expect("notice mutex poisoned");
        guard.push(notice);
        Ok(())
    }
}

impl InMemoryNotificationSink {
    pub(crate) fn delivered(&self) -> Vec<OwnerNotice> {
        self.notices.lock().expect("notice mutex poisoned").clone()
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryEvaluationSink {
    records: Arc<Mutex<HashMap<ReservationId, (u8, String)>>>,
}

impl EvaluationSink for InMemoryEvaluationSink {
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

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
