use crate::booking::Listing;

use super::query::{SearchQuery, SlotFilter};

/// A listing paired with its match score and tie-break keys for one ranking
/// pass. Never persisted.
#[derive(Debug, Clone)]
struct ScoredListing {
    listing: Listing,
    score: u32,
    radius_key: u32,
    price_key: u32,
}

/// Filter and order the catalogue against a query.
///
/// Pure and deterministic: with no criteria requested the input order comes
/// back untouched, and full ties keep their original relative order.
pub fn rank(listings: &[Listing], query: &SearchQuery) -> Vec<Listing> {
    if !query.has_criteria() {
        return listings.to_vec();
    }

    let mut scored: Vec<ScoredListing> = listings
        .iter()
        .filter_map(|listing| score_listing(listing, query))
        .collect();

    // Stable sort: descending score, then nearest radius, then lowest price.
    // Listings without a radius or price sort after those with one.
    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.radius_key.cmp(&b.radius_key))
            .then_with(|| a.price_key.cmp(&b.price_key))
    });

    scored.into_iter().map(|entry| entry.listing).collect()
}

/// Score one listing, or drop it when a requested numeric floor excludes it.
fn score_listing(listing: &Listing, query: &SearchQuery) -> Option<ScoredListing> {
    let price_match = query
        .min_price
        .map(|floor| listing.price.is_some_and(|price| price >= floor));
    let radius_match = query
        .min_radius
        .map(|floor| listing.radius_km.is_some_and(|radius| radius >= floor));

    // Numeric floors are hard, but satisfying either one is enough to stay in.
    if price_match.is_some() || radius_match.is_some() {
        let floor_met = price_match.unwrap_or(false) || radius_match.unwrap_or(false);
        if !floor_met {
            return None;
        }
    }

    let mut score = 0;
    if let Some(keyword) = query.keyword.as_deref() {
        if keyword_matches(listing, keyword) {
            score += 1;
        }
    }
    if let Some(category) = query.category.as_deref() {
        if listing.category == category {
            score += 1;
        }
    }
    if price_match == Some(true) {
        score += 1;
    }
    if radius_match == Some(true) {
        score += 1;
    }
    if !query.slot_filters.is_empty() && slot_matches(listing, &query.slot_filters) {
        score += 1;
    }

    Some(ScoredListing {
        listing: listing.clone(),
        score,
        radius_key: listing.radius_km.unwrap_or(u32::MAX),
        price_key: listing.price.unwrap_or(u32::MAX),
    })
}

fn keyword_matches(listing: &Listing, keyword: &str) -> bool {
    let needle = keyword.to_lowercase();
    listing.title.to_lowercase().contains(&needle)
        || listing.description.to_lowercase().contains(&needle)
}

/// True when any requested window lands inside any of the listing's slots,
/// comparing by weekday and minute of day only.
fn slot_matches(listing: &Listing, filters: &[SlotFilter]) -> bool {
    filters.iter().any(|filter| {
        listing
            .slots
            .iter()
            .any(|slot| slot.day == filter.day && slot.covers(filter.time))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveTime;

    use crate::booking::{ListingId, UserId, WeekDay, WeeklySlot};

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
    }

    fn sample() -> Listing {
        Listing {
            id: ListingId("lst-000001".to_string()),
            owner_id: UserId("usr-owner".to_string()),
            title: "Mobile Bike Repair".to_string(),
            description: "Flat fixes at your door".to_string(),
            category: "repair".to_string(),
            price: Some(45),
            radius_km: Some(10),
            is_available: true,
            slots: vec![WeeklySlot {
                day: WeekDay::Wednesday,
                start: t(14, 0),
                end: t(15, 0),
            }],
        }
    }

    #[test]
    fn keywords_match_title_and_description_ignoring_case() {
        let listing = sample();
        assert!(keyword_matches(&listing, "BIKE"));
        assert!(keyword_matches(&listing, "flat fixes"));
        assert!(!keyword_matches(&listing, "plumbing"));
    }

    #[test]
    fn slot_filters_respect_the_half_open_window() {
        let listing = sample();
        let at = |time| {
            slot_matches(
                &listing,
                &[SlotFilter {
                    day: WeekDay::Wednesday,
                    time,
                }],
            )
        };

        assert!(at(t(14, 0)));
        assert!(at(t(14, 59)));
        assert!(!at(t(15, 0)));
        assert!(!slot_matches(
            &listing,
            &[SlotFilter {
                day: WeekDay::Thursday,
                time: t(14, 30),
            }]
        ));
    }

    #[test]
    fn scores_count_only_requested_criteria() {
        let listing = sample();
        let query = SearchQuery {
            keyword: Some("bike".to_string()),
            category: Some("repair".to_string()),
            min_price: Some(20),
            ..SearchQuery::default()
        };

        let scored = score_listing(&listing, &query).expect("listing survives the floor");
        assert_eq!(scored.score, 3);
        assert_eq!(scored.radius_key, 10);
        assert_eq!(scored.price_key, 45);
    }

    #[test]
    fn unmet_floors_drop_the_listing() {
        let listing = sample();
        let query = SearchQuery {
            min_price: Some(100),
            min_radius: Some(50),
            ..SearchQuery::default()
        };

        assert!(score_listing(&listing, &query).is_none());
    }
}
