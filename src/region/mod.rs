//! Region store and hierarchy builder.
//!
//! Loads one polygon layer per administrative level into an id-indexed
//! arena, precomputes containment data, and links adjacent levels by code
//! prefix, explicit attribute, or centroid containment.

mod boundary;
mod hierarchy;
mod index;
mod store;

#[cfg(test)]
pub(crate) mod fixtures;

pub use boundary::Region;
pub use hierarchy::{Hierarchy, LinkStats, ParentLink};
pub use index::LevelIndex;
pub use store::{LevelLayer, RegionFeature, RegionStore};
