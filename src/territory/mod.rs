//! Territory partitioning of ranked tiers.
//!
//! Each tier starts at its entry level. A region whose teams all play in one
//! league goes to that league whole; a contested region is split among its
//! children, or tessellated by nearest team when it has none. Pieces are then
//! merged into one geometry per league.

mod entry;
mod merge;
pub mod ops;
mod ownership;
mod partition;
mod service;
mod voronoi;

pub use entry::{EntryConfig, EntryPolicy, EntryRule};
pub use merge::{GeometryMerger, LeagueTerritory, MergeOptions, Merged};
pub use ownership::{nearest_team, Ownership};
pub use partition::{Partition, PartitionStats, PieceKind, TerritoryPartitioner, TerritoryPiece};
pub use service::{TerritoryService, TierTerritories};
pub use voronoi::{bounded_voronoi, LeagueCells, VoronoiSplit};
