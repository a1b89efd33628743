use crate::infra::{
    InMemoryEvaluationSink, InMemoryListingStore, InMemoryNotificationSink,
    InMemoryReservationStore,
};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::Args;
use slotbook::booking::{
    weekday_of, BookingService, Listing, ListingDraft, SlotBatch, UserId, WeekDay, WeeklySlot,
};
use slotbook::catalog::{CatalogImporter, ListingSeed};
use slotbook::clock::FixedClock;
use slotbook::error::AppError;
use slotbook::search::SearchQuery;
use std::path::PathBuf;
use std::sync::Arc;

const MIN_GAP_MINUTES: u32 = 30;

type DemoService = BookingService<
    InMemoryListingStore,
    InMemoryReservationStore,
    InMemoryNotificationSink,
    InMemoryEvaluationSink,
>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional catalogue seed CSV (owner,title,description,category,price,radius_km,days,start,end).
    #[arg(long)]
    pub(crate) seed_csv: Option<PathBuf>,
    /// Pin the walkthrough's starting date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { seed_csv, today } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    println!("Booking walkthrough (today pinned to {today})");

    let clock = Arc::new(FixedClock::at(today));
    let notifications = Arc::new(InMemoryNotificationSink::default());
    let service = Arc::new(BookingService::with_clock(
        Arc::new(InMemoryListingStore::default()),
        Arc::new(InMemoryReservationStore::default()),
        notifications.clone(),
        Arc::new(InMemoryEvaluationSink::default()),
        MIN_GAP_MINUTES,
        clock.clone(),
    ));

    let seeds = match seed_csv {
        Some(path) => CatalogImporter::from_path(path)?,
        None => built_in_seeds(),
    };

    println!("\nSeeding the catalogue");
    let published = apply_seeds(&service, seeds)?;
    if published.is_empty() {
        println!("  No listings seeded; nothing to demonstrate.");
        return Ok(());
    }
    let showcase = published[0].clone();
    let slot = match showcase.slots.first() {
        Some(slot) => *slot,
        None => {
            println!("  Showcase listing has no slots; nothing to reserve.");
            return Ok(());
        }
    };

    println!("\nSlot editor with a deliberate overlap");
    let overlap = SlotBatch {
        days: vec![slot.day],
        start: slot.start,
        end: slot.end + chrono::Duration::minutes(30),
    };
    match service.add_slots(&showcase.id, &overlap) {
        Ok(update) => {
            println!(
                "- Overlapping range accepted; template now holds {} slots",
                update.listing.slots.len()
            );
            match serde_json::to_string_pretty(&update.warnings) {
                Ok(json) => println!("  Warnings:\n{}", json),
                Err(err) => println!("  Warnings unavailable: {}", err),
            }
        }
        Err(err) => println!("  Overlapping range rejected: {}", err),
    }

    println!(
        "\nRanked search (category '{}', price floor {}, radius floor {})",
        showcase.category,
        label_opt(showcase.price),
        label_opt(showcase.radius_km)
    );
    let query = SearchQuery {
        keyword: None,
        category: Some(showcase.category.clone()),
        min_price: showcase.price,
        min_radius: showcase.radius_km,
        slot_filters: Vec::new(),
    };
    match service.search(&query) {
        Ok(results) => {
            for listing in &results {
                println!(
                    "- {} (price {}, radius_km {})",
                    listing.title,
                    label_opt(listing.price),
                    label_opt(listing.radius_km)
                );
            }
        }
        Err(err) => println!("  Search unavailable: {}", err),
    }

    let service_date = next_date_for(slot.day, today);
    let consumer = UserId("usr-consumer".to_string());

    println!("\nReserving '{}' for {}", showcase.title, service_date);
    let reservation = match service.try_reserve(&showcase.id, 0, &consumer, service_date) {
        Ok(reservation) => reservation,
        Err(err) => {
            println!("  Reservation rejected: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Reservation {} -> status {} ({} {}..{})",
        reservation.id.0,
        reservation.status.label(),
        reservation.slot.day.label(),
        reservation.slot.start,
        reservation.slot.end
    );

    let rival = UserId("usr-rival".to_string());
    match service.try_reserve(&showcase.id, 0, &rival, service_date) {
        Ok(_) => println!("  Rival booking unexpectedly accepted"),
        Err(err) => println!("- Rival booking refused: {}", err),
    }

    println!("\nPayment");
    let paid = match service.confirm_payment(&reservation.id) {
        Ok(paid) => paid,
        Err(err) => {
            println!("  Payment rejected: {}", err);
            return Ok(());
        }
    };
    println!("- Payment captured -> status {}", paid.status.label());
    for notice in notifications.delivered() {
        println!(
            "  Owner {} notified about {} on {}",
            notice.owner_id.0, notice.reservation_id.0, notice.date
        );
    }

    println!("\nTime passes");
    let after_service = service_date + chrono::Duration::days(1);
    clock.set_today(after_service);
    println!("- Today is now {}", after_service);
    match service.sweep_due() {
        Ok(moved) => println!("- Sweep moved {} reservation(s) into evaluation", moved),
        Err(err) => {
            println!("  Sweep failed: {}", err);
            return Ok(());
        }
    }

    println!("\nEvaluation");
    let outcome = match service.submit_evaluation(&reservation.id, 5, "Punctual and thorough") {
        Ok(outcome) => outcome,
        Err(err) => {
            println!("  Evaluation rejected: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Review recorded -> status {}",
        outcome.reservation.status.label()
    );
    match serde_json::to_string_pretty(&outcome.receipt) {
        Ok(json) => println!("  Receipt:\n{}", json),
        Err(err) => println!("  Receipt unavailable: {}", err),
    }

    let revised = match service.submit_evaluation(&reservation.id, 4, "Docking a star, arrived late") {
        Ok(revised) => revised,
        Err(err) => {
            println!("  Revised evaluation rejected: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Revised review kept status {} (first submission: {})",
        revised.reservation.status.label(),
        revised.receipt.first_submission
    );

    Ok(())
}

/// Publish each seed and install its weekly range. A rejected range keeps
/// the listing published with whatever slots it already has.
fn apply_seeds(service: &DemoService, seeds: Vec<ListingSeed>) -> Result<Vec<Listing>, AppError> {
    let mut published = Vec::new();
    for seed in seeds {
        let listing = service.publish_listing(seed.draft)?;
        let listing = match seed.slots.first() {
            Some(first) => {
                let batch = SlotBatch {
                    days: seed.slots.iter().map(|slot| slot.day).collect(),
                    start: first.start,
                    end: first.end,
                };
                match service.add_slots(&listing.id, &batch) {
                    Ok(update) => update.listing,
                    Err(err) => {
                        println!("  Seed '{}' slots rejected: {}", listing.title, err);
                        listing
                    }
                }
            }
            None => listing,
        };
        println!(
            "- Published '{}' with {} weekly slot(s)",
            listing.title,
            listing.slots.len()
        );
        published.push(listing);
    }
    Ok(published)
}

fn built_in_seeds() -> Vec<ListingSeed> {
    vec![
        ListingSeed {
            draft: ListingDraft {
                owner_id: UserId("usr-marta".to_string()),
                title: "Mobile bike repair".to_string(),
                description: "Tune-ups and flat fixes at your door".to_string(),
                category: "repair".to_string(),
                price: Some(45),
                radius_km: Some(10),
            },
            slots: vec![WeeklySlot {
                day: WeekDay::Wednesday,
                start: demo_time(14, 0),
                end: demo_time(16, 0),
            }],
        },
        ListingSeed {
            draft: ListingDraft {
                owner_id: UserId("usr-jonas".to_string()),
                title: "Phone and laptop repair".to_string(),
                description: "Screens, batteries and water damage".to_string(),
                category: "repair".to_string(),
                price: Some(60),
                radius_km: Some(12),
            },
            slots: vec![WeeklySlot {
                day: WeekDay::Saturday,
                start: demo_time(9, 0),
                end: demo_time(12, 0),
            }],
        },
        ListingSeed {
            draft: ListingDraft {
                owner_id: UserId("usr-ines".to_string()),
                title: "Dog walking".to_string(),
                description: "Morning rounds in the park".to_string(),
                category: "pets".to_string(),
                price: None,
                radius_km: Some(5),
            },
            slots: vec![
                WeeklySlot {
                    day: WeekDay::Monday,
                    start: demo_time(7, 30),
                    end: demo_time(8, 30),
                },
                WeeklySlot {
                    day: WeekDay::Friday,
                    start: demo_time(7, 30),
                    end: demo_time(8, 30),
                },
            ],
        },
    ]
}

/// First date strictly after `after` that falls on `day`.
fn next_date_for(day: WeekDay, after: NaiveDate) -> NaiveDate {
    let mut date = after + chrono::Duration::days(1);
    while weekday_of(date) != day {
        date += chrono::Duration::days(1);
    }
    date
}

fn demo_time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("demo times are in range")
}

fn label_opt(value: Option<u32>) -> String {
    value.map_or_else(|| "unset".to_string(), |value| value.to_string())
}
