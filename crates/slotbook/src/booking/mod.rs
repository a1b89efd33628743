//! Slot templates, availability matching, the booking conflict guard, and
//! the reservation lifecycle.
//!
//! Storage, notifications, and review recording are ports (see [`store`]);
//! the engine owns the rules and leaves persistence to the host process.

pub mod availability;
pub mod domain;
pub(crate) mod guard;
pub mod lifecycle;
pub mod router;
pub mod service;
pub mod slots;
pub mod store;

#[cfg(test)]
mod tests;

pub use availability::{is_date_bookable, slots_for, weekday_of};
pub use domain::{
    InvalidWeekDay, Listing, ListingId, Reservation, ReservationId, ReservationStatus, UserId,
    WeekDay, WeeklySlot,
};
pub use guard::{ConflictError, TupleLocks};
pub use lifecycle::InvalidTransition;
pub use router::booking_router;
pub use service::{
    BookingService, BookingServiceError, DateAvailability, EvaluationResult, IndexedSlot,
    ListingDraft, SlotBatch, SlotUpdate,
};
pub use slots::{validate_batch, SlotValidation, SlotValidationError, SlotWarning};
pub use store::{
    EvaluationReceipt, EvaluationSink, ListingStore, NotificationSink, NotifyError, OwnerNotice,
    ReservationStore, StoreError,
};
