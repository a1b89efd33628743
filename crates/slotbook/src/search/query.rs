use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::booking::WeekDay;

/// One requested attendance window: "I need the provider on this weekday at
/// this time of day".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotFilter {
    pub day: WeekDay,
    pub time: NaiveTime,
}

/// Per-request search criteria. Every field is optional; an absent field is
/// simply not requested and never penalizes a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_price: Option<u32>,
    #[serde(default)]
    pub min_radius: Option<u32>,
    #[serde(default)]
    pub slot_filters: Vec<SlotFilter>,
}

impl SearchQuery {
    /// True when at least one criterion is requested. A blank query keeps
    /// the catalogue in its original order.
    pub fn has_criteria(&self) -> bool {
        self.keyword.is_some()
            || self.category.is_some()
            || self.min_price.is_some()
            || self.min_radius.is_some()
            || !self.slot_filters.is_empty()
    }
}
