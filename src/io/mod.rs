//! Loaders for boundary and team datasets, and output writers.

pub mod boundaries;
pub mod output;
pub mod teams;

pub use boundaries::{load_store, read_features};
pub use teams::{load_teams, TeamSet, TierMatcher};
