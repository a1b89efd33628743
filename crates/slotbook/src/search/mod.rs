//! Catalogue search: multi-criterion filtering with a scored, deterministic
//! ordering.

pub mod query;
pub mod rank;

pub use query::{SearchQuery, SlotFilter};
pub use rank::rank;
