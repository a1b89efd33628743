//! Booking and availability engine for a local services marketplace.
//!
//! Providers publish listings with recurring weekly slots; consumers search
//! the catalogue, reserve a slot for a concrete date, pay, and evaluate the
//! service afterwards. This crate owns the rules of that flow: slot template
//! validation, weekday availability matching, the double-booking guard, the
//! linear reservation lifecycle, and search ranking. Persistence and
//! delivery channels stay behind the ports in [`booking::store`].

pub mod booking;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod search;
pub mod telemetry;

pub use config::AppConfig;
pub use error::AppError;
