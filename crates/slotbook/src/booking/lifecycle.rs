use chrono::NaiveDate;

use super::domain::{Reservation, ReservationStatus};

/// Raised when a reservation is asked to move anywhere but its single legal
/// successor status. Carries both ends so callers can report the stale state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("reservation cannot move from {} to {}", .from.label(), .attempted.label())]
pub struct InvalidTransition {
    pub from: ReservationStatus,
    pub attempted: ReservationStatus,
}

/// Checks one step of the payment and review chain. The chain is strictly
/// linear with no skips, no reversals, and no cancellation branch.
pub fn step(from: ReservationStatus, attempted: ReservationStatus) -> Result<(), InvalidTransition> {
    if from.next() == Some(attempted) {
        Ok(())
    } else {
        Err(InvalidTransition { from, attempted })
    }
}

/// A paid reservation becomes due for evaluation once its service date has
/// passed. The date itself stays reserved through the whole day.
pub fn is_due_for_evaluation(reservation: &Reservation, today: NaiveDate) -> bool {
    reservation.status == ReservationStatus::Reserved && reservation.date < today
}
