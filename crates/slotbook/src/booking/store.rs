use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Listing, ListingId, Reservation, ReservationId, ReservationStatus, UserId, WeeklySlot,
};

/// Failures shared by every storage port.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage port for listings and their weekly slot templates.
pub trait ListingStore: Send + Sync {
    fn insert(&self, listing: Listing) -> Result<Listing, StoreError>;
    fn get(&self, id: &ListingId) -> Result<Option<Listing>, StoreError>;
    /// Replaces the listing's slot template wholesale.
    fn save_slots(&self, id: &ListingId, slots: Vec<WeeklySlot>) -> Result<Listing, StoreError>;
    fn set_available(&self, id: &ListingId, available: bool) -> Result<Listing, StoreError>;
    fn list(&self) -> Result<Vec<Listing>, StoreError>;
}

/// Storage port for reservations.
///
/// Implementations must refuse a second reservation for the same
/// `(listing, slot index, date)` tuple with [`StoreError::Conflict`], and
/// `update_status` must be an atomic compare-and-set on the current status.
pub trait ReservationStore: Send + Sync {
    fn insert(&self, reservation: Reservation) -> Result<Reservation, StoreError>;
    fn get(&self, id: &ReservationId) -> Result<Option<Reservation>, StoreError>;
    fn find_by_slot(
        &self,
        listing_id: &ListingId,
        slot_index: usize,
        date: NaiveDate,
    ) -> Result<Option<Reservation>, StoreError>;
    fn update_status(
        &self,
        id: &ReservationId,
        expected: ReservationStatus,
        next: ReservationStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Reservation, StoreError>;
    fn list_for_consumer(&self, consumer_id: &UserId) -> Result<Vec<Reservation>, StoreError>;
    fn list_for_listing(&self, listing_id: &ListingId) -> Result<Vec<Reservation>, StoreError>;
    fn list_with_status(&self, status: ReservationStatus) -> Result<Vec<Reservation>, StoreError>;
}

/// Owner-facing message emitted once a reservation is paid for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerNotice {
    pub owner_id: UserId,
    pub reservation_id: ReservationId,
    pub listing_id: ListingId,
    pub date: NaiveDate,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Outbound port for owner notifications. Delivery is fire-and-forget from
/// the booking side; failures never roll a reservation back.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: OwnerNotice) -> Result<(), NotifyError>;
}

/// What the evaluation subsystem reports back after recording a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationReceipt {
    pub reservation_id: ReservationId,
    pub rating: u8,
    pub comment: String,
    /// False when the consumer had already reviewed this reservation and the
    /// submission replaced the earlier text.
    pub first_submission: bool,
}

/// Outbound port for consumer reviews of completed work.
pub trait EvaluationSink: Send + Sync {
    fn submit(
        &self,
        reservation_id: &ReservationId,
        rating: u8,
        comment: &str,
    ) -> Result<EvaluationReceipt, StoreError>;
}
