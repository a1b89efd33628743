use chrono::NaiveTime;
use serde::Serialize;

use super::domain::{WeekDay, WeeklySlot};

/// Blocking faults in a slot batch. The whole batch is rejected and nothing
/// is written when one of these fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SlotValidationError {
    #[error("no weekday selected")]
    NoDaySelected,
    #[error("slot start must come before slot end")]
    InvalidRange,
    #[error("every selected day already carries an identical slot")]
    Duplicate,
}

/// Non-blocking findings surfaced alongside an accepted batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotWarning {
    /// The new slot intersects an existing window on the same day.
    Overlap {
        day: WeekDay,
        existing_start: NaiveTime,
        existing_end: NaiveTime,
    },
    /// The nearest neighbour on the same day leaves less breathing room
    /// than the configured minimum. Back-to-back slots (gap of zero) pass
    /// without comment.
    TightGap { day: WeekDay, gap_minutes: u32 },
}

/// Outcome of a validated batch: the per-day slots that survived duplicate
/// filtering, plus any advisory warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotValidation {
    pub accepted: Vec<WeeklySlot>,
    pub warnings: Vec<SlotWarning>,
}

/// Validates one batch (a time range applied to several weekdays) against a
/// listing's existing slots.
///
/// Days whose identical slot already exists are dropped silently as long as
/// at least one selected day is fresh; only a batch that duplicates on every
/// day is rejected outright.
pub fn validate_batch(
    existing: &[WeeklySlot],
    days: &[WeekDay],
    start: NaiveTime,
    end: NaiveTime,
    min_gap_minutes: u32,
) -> Result<SlotValidation, SlotValidationError> {
    if days.is_empty() {
        return Err(SlotValidationError::NoDaySelected);
    }
    if start >= end {
        return Err(SlotValidationError::InvalidRange);
    }

    let fresh: Vec<WeekDay> = days
        .iter()
        .copied()
        .filter(|day| !is_duplicate(existing, *day, start, end))
        .collect();
    if fresh.is_empty() {
        return Err(SlotValidationError::Duplicate);
    }

    let mut accepted = Vec::with_capacity(fresh.len());
    let mut warnings = Vec::new();
    for day in fresh {
        let slot = WeeklySlot { day, start, end };
        if let Some(other) = existing.iter().find(|candidate| slot.overlaps(candidate)) {
            warnings.push(SlotWarning::Overlap {
                day,
                existing_start: other.start,
                existing_end: other.end,
            });
        } else if let Some(gap) = nearest_gap(existing, &slot) {
            if gap < min_gap_minutes {
                warnings.push(SlotWarning::TightGap {
                    day,
                    gap_minutes: gap,
                });
            }
        }
        accepted.push(slot);
    }

    Ok(SlotValidation { accepted, warnings })
}

fn is_duplicate(existing: &[WeeklySlot], day: WeekDay, start: NaiveTime, end: NaiveTime) -> bool {
    existing
        .iter()
        .any(|slot| slot.day == day && slot.start == start && slot.end == end)
}

/// Smallest positive distance in minutes between `slot` and any same-day
/// neighbour. Touching neighbours count as distance zero and are skipped.
fn nearest_gap(existing: &[WeeklySlot], slot: &WeeklySlot) -> Option<u32> {
    existing
        .iter()
        .filter(|candidate| candidate.day == slot.day)
        .filter_map(|candidate| {
            if candidate.end_minute() <= slot.start_minute() {
                Some(slot.start_minute() - candidate.end_minute())
            } else if candidate.start_minute() >= slot.end_minute() {
                Some(candidate.start_minute() - slot.end_minute())
            } else {
                None
            }
        })
        .filter(|gap| *gap > 0)
        .min()
}
