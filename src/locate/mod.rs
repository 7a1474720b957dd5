//! Point location of teams in the region hierarchy.
//!
//! Descends level by level, testing only the children of the region found
//! one level up, and inverts the result into a `region -> teams` index.

mod placement;
mod service;

pub use placement::{LocateStats, Placement, RegionToTeams, TeamRegions};
pub use service::PointLocator;
