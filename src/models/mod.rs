//! Core data models for regions, teams and tiers.

pub mod region;
pub mod team;

pub use region::{LevelId, RegionArea, RegionId};
pub use team::{Team, TeamId, Tier};
