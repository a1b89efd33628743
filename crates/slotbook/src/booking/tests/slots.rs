use super::common::*;

use crate::booking::slots::{validate_batch, SlotValidationError, SlotWarning};
use crate::booking::{SlotBatch, WeekDay};

#[test]
fn rejects_empty_day_selection() {
    let result = validate_batch(&[], &[], t(9, 0), t(10, 0), MIN_GAP_MINUTES);
    assert_eq!(result.unwrap_err(), SlotValidationError::NoDaySelected);
}

#[test]
fn rejects_inverted_and_empty_ranges() {
    let days = [WeekDay::Monday];
    let inverted = validate_batch(&[], &days, t(10, 0), t(9, 0), MIN_GAP_MINUTES);
    assert_eq!(inverted.unwrap_err(), SlotValidationError::InvalidRange);

    let empty = validate_batch(&[], &days, t(10, 0), t(10, 0), MIN_GAP_MINUTES);
    assert_eq!(empty.unwrap_err(), SlotValidationError::InvalidRange);
}

#[test]
fn rejects_batch_only_when_every_day_duplicates() {
    let existing = vec![
        slot(WeekDay::Monday, t(9, 0), t(10, 0)),
        slot(WeekDay::Tuesday, t(9, 0), t(10, 0)),
    ];
    let result = validate_batch(
        &existing,
        &[WeekDay::Monday, WeekDay::Tuesday],
        t(9, 0),
        t(10, 0),
        MIN_GAP_MINUTES,
    );
    assert_eq!(result.unwrap_err(), SlotValidationError::Duplicate);
}

#[test]
fn keeps_fresh_days_when_some_duplicate() {
    let existing = vec![slot(WeekDay::Monday, t(9, 0), t(10, 0))];
    let outcome = validate_batch(
        &existing,
        &[WeekDay::Monday, WeekDay::Tuesday],
        t(9, 0),
        t(10, 0),
        MIN_GAP_MINUTES,
    )
    .expect("fresh day survives");

    assert_eq!(outcome.accepted, vec![slot(WeekDay::Tuesday, t(9, 0), t(10, 0))]);
    assert!(outcome.warnings.is_empty());
}

#[test]
fn overlap_is_a_warning_not_a_failure() {
    let existing = vec![slot(WeekDay::Monday, t(9, 0), t(10, 0))];
    let outcome = validate_batch(
        &existing,
        &[WeekDay::Monday],
        t(9, 30),
        t(10, 30),
        MIN_GAP_MINUTES,
    )
    .expect("overlapping slot still accepted");

    assert_eq!(outcome.accepted, vec![slot(WeekDay::Monday, t(9, 30), t(10, 30))]);
    assert_eq!(
        outcome.warnings,
        vec![SlotWarning::Overlap {
            day: WeekDay::Monday,
            existing_start: t(9, 0),
            existing_end: t(10, 0),
        }]
    );
}

#[test]
fn short_gap_is_a_warning_not_a_failure() {
    let existing = vec![slot(WeekDay::Monday, t(9, 0), t(10, 0))];
    let outcome = validate_batch(
        &existing,
        &[WeekDay::Monday],
        t(10, 5),
        t(11, 0),
        MIN_GAP_MINUTES,
    )
    .expect("tight slot still accepted");

    assert_eq!(
        outcome.warnings,
        vec![SlotWarning::TightGap {
            day: WeekDay::Monday,
            gap_minutes: 5,
        }]
    );
}

#[test]
fn comfortable_gap_raises_no_warning() {
    let existing = vec![slot(WeekDay::Monday, t(9, 0), t(10, 0))];
    let outcome = validate_batch(
        &existing,
        &[WeekDay::Monday],
        t(11, 0),
        t(12, 0),
        MIN_GAP_MINUTES,
    )
    .expect("distant slot accepted");

    assert!(outcome.warnings.is_empty());
}

#[test]
fn back_to_back_slots_pass_silently() {
    let existing = vec![slot(WeekDay::Monday, t(9, 0), t(10, 0))];
    let outcome = validate_batch(
        &existing,
        &[WeekDay::Monday],
        t(10, 0),
        t(11, 0),
        MIN_GAP_MINUTES,
    )
    .expect("adjacent slot accepted");

    assert!(outcome.warnings.is_empty());
}

#[test]
fn gap_measures_nearest_neighbour_in_both_directions() {
    let existing = vec![
        slot(WeekDay::Monday, t(9, 0), t(10, 0)),
        slot(WeekDay::Monday, t(12, 0), t(13, 0)),
    ];
    // 70 minutes after the morning slot, 10 minutes before the noon one.
    let outcome = validate_batch(
        &existing,
        &[WeekDay::Monday],
        t(11, 10),
        t(11, 50),
        MIN_GAP_MINUTES,
    )
    .expect("slot accepted");

    assert_eq!(
        outcome.warnings,
        vec![SlotWarning::TightGap {
            day: WeekDay::Monday,
            gap_minutes: 10,
        }]
    );
}

#[test]
fn warnings_only_consider_the_slot_day() {
    let existing = vec![slot(WeekDay::Tuesday, t(9, 0), t(10, 0))];
    let outcome = validate_batch(
        &existing,
        &[WeekDay::Monday],
        t(9, 30),
        t(10, 30),
        MIN_GAP_MINUTES,
    )
    .expect("different day accepted");

    assert!(outcome.warnings.is_empty());
}

#[test]
fn add_slots_persists_accepted_slots_and_surfaces_warnings() {
    let harness = harness();
    let listing = harness
        .service
        .publish_listing(draft("usr-owner"))
        .expect("listing publishes");

    let first = harness
        .service
        .add_slots(
            &listing.id,
            &SlotBatch {
                days: vec![WeekDay::Monday, WeekDay::Wednesday],
                start: t(9, 0),
                end: t(10, 0),
            },
        )
        .expect("first batch installs");
    assert_eq!(first.listing.slots.len(), 2);
    assert!(first.warnings.is_empty());

    let second = harness
        .service
        .add_slots(
            &listing.id,
            &SlotBatch {
                days: vec![WeekDay::Monday],
                start: t(9, 30),
                end: t(10, 30),
            },
        )
        .expect("overlapping batch installs");
    assert_eq!(second.listing.slots.len(), 3);
    assert_eq!(second.warnings.len(), 1);

    let stored = harness
        .service
        .listing(&listing.id)
        .expect("listing fetches");
    assert_eq!(stored.slots.len(), 3);
}

#[test]
fn blocking_error_leaves_template_untouched() {
    let harness = harness();
    let listing = published_listing(&harness, "usr-owner");
    let before = listing.slots.clone();

    let result = harness.service.add_slots(
        &listing.id,
        &SlotBatch {
            days: vec![WeekDay::Wednesday],
            start: t(15, 0),
            end: t(14, 0),
        },
    );
    match result {
        Err(crate::booking::BookingServiceError::Validation(
            SlotValidationError::InvalidRange,
        )) => {}
        other => panic!("expected invalid range, got {other:?}"),
    }

    let stored = harness
        .service
        .listing(&listing.id)
        .expect("listing fetches");
    assert_eq!(stored.slots, before);
}

#[test]
fn replace_slots_rebuilds_the_template_wholesale() {
    let harness = harness();
    let listing = published_listing(&harness, "usr-owner");
    assert_eq!(listing.slots, vec![wed_slot()]);

    let update = harness
        .service
        .replace_slots(
            &listing.id,
            &[
                SlotBatch {
                    days: vec![WeekDay::Friday],
                    start: t(8, 0),
                    end: t(9, 0),
                },
                SlotBatch {
                    days: vec![WeekDay::Friday],
                    start: t(9, 10),
                    end: t(10, 0),
                },
            ],
        )
        .expect("replacement installs");

    assert_eq!(update.listing.slots.len(), 2);
    assert!(update
        .listing
        .slots
        .iter()
        .all(|slot| slot.day == WeekDay::Friday));
    // The second batch sits ten minutes after the first.
    assert_eq!(update.warnings.len(), 1);
}
