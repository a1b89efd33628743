use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for published listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingId(pub String);

/// Identifier wrapper for marketplace accounts, providers and consumers alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for reservations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservationId(pub String);

/// Day of week on the wire as 1 (Monday) through 7 (Sunday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum WeekDay {
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
    Sunday = 7,
}

impl WeekDay {
    pub const fn number(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            WeekDay::Monday => "monday",
            WeekDay::Tuesday => "tuesday",
            WeekDay::Wednesday => "wednesday",
            WeekDay::Thursday => "thursday",
            WeekDay::Friday => "friday",
            WeekDay::Saturday => "saturday",
            WeekDay::Sunday => "sunday",
        }
    }
}

/// Raised when a wire-level weekday number falls outside 1..=7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("weekday number must be 1 (Monday) through 7 (Sunday), got {0}")]
pub struct InvalidWeekDay(pub u8);

impl TryFrom<u8> for WeekDay {
    type Error = InvalidWeekDay;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(WeekDay::Monday),
            2 => Ok(WeekDay::Tuesday),
            3 => Ok(WeekDay::Wednesday),
            4 => Ok(WeekDay::Thursday),
            5 => Ok(WeekDay::Friday),
            6 => Ok(WeekDay::Saturday),
            7 => Ok(WeekDay::Sunday),
            other => Err(InvalidWeekDay(other)),
        }
    }
}

impl From<WeekDay> for u8 {
    fn from(day: WeekDay) -> u8 {
        day.number()
    }
}

impl From<Weekday> for WeekDay {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => WeekDay::Monday,
            Weekday::Tue => WeekDay::Tuesday,
            Weekday::Wed => WeekDay::Wednesday,
            Weekday::Thu => WeekDay::Thursday,
            Weekday::Fri => WeekDay::Friday,
            Weekday::Sat => WeekDay::Saturday,
            Weekday::Sun => WeekDay::Sunday,
        }
    }
}

/// Recurring availability window on a provider's weekly template.
///
/// The interval is half-open: a slot ending at 15:00 does not collide with
/// one starting at 15:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySlot {
    pub day: WeekDay,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl WeeklySlot {
    pub fn start_minute(&self) -> u32 {
        minute_of_day(self.start)
    }

    pub fn end_minute(&self) -> u32 {
        minute_of_day(self.end)
    }

    /// True when `time` falls inside the slot's half-open window.
    pub fn covers(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }

    /// True when both slots sit on the same weekday and their windows intersect.
    pub fn overlaps(&self, other: &WeeklySlot) -> bool {
        self.day == other.day && self.start < other.end && other.start < self.end
    }
}

pub(crate) fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// A published service offer with its weekly slot template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: Option<u32>,
    pub radius_km: Option<u32>,
    pub is_available: bool,
    pub slots: Vec<WeeklySlot>,
}

/// Progress of a reservation along the strictly linear payment and review chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    ToPay,
    Reserved,
    ToEvaluate,
    Completed,
}

impl ReservationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReservationStatus::ToPay => "to_pay",
            ReservationStatus::Reserved => "reserved",
            ReservationStatus::ToEvaluate => "to_evaluate",
            ReservationStatus::Completed => "completed",
        }
    }

    /// The only status this one may advance to, if any.
    pub const fn next(self) -> Option<ReservationStatus> {
        match self {
            ReservationStatus::ToPay => Some(ReservationStatus::Reserved),
            ReservationStatus::Reserved => Some(ReservationStatus::ToEvaluate),
            ReservationStatus::ToEvaluate => Some(ReservationStatus::Completed),
            ReservationStatus::Completed => None,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ReservationStatus::Completed)
    }
}

/// A consumer's claim on one listing slot for one concrete date.
///
/// `slot` is a snapshot taken at booking time; later edits to the listing's
/// weekly template never reshape an existing reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub listing_id: ListingId,
    pub slot_index: usize,
    pub slot: WeeklySlot,
    pub consumer_id: UserId,
    pub date: NaiveDate,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
