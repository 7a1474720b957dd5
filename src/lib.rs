//! Catchment - league territory partitioning over administrative regions
//!
//! Teams are located in a nested region hierarchy (countries, then finer
//! statistical regions). For each competition tier, every region is given to
//! the league whose teams hold it, contested regions are split through their
//! subdivisions or by nearest team, and the pieces are merged into one
//! territory per league.

pub mod config;
pub mod error;
pub mod io;
pub mod locate;
pub mod models;
pub mod region;
pub mod territory;

pub use config::Config;
pub use error::{ConfigError, DatasetError, GeometryError};
pub use locate::{Placement, PointLocator};
pub use models::{LevelId, RegionId, Team, TeamId, Tier};
pub use region::{Hierarchy, RegionStore};
pub use territory::{TerritoryService, TierTerritories};
