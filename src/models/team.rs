//! Team and tier records.

use geo::Point;
use serde::{Deserialize, Serialize};

/// A ranked competition level. Rank 1 is the top tier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Tier {
    pub rank: u32,
    pub name: String,
}

impl Tier {
    pub fn new(rank: u32, name: impl Into<String>) -> Self {
        Self {
            rank,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (tier {})", self.name, self.rank)
    }
}

/// Identifier of a team, unique across one loaded roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct TeamId(pub u32);

/// A geocoded team. Immutable input to the locator and partitioner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub league: String,
    pub tier: Tier,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league_url: Option<String>,
}

impl Team {
    pub fn new(
        id: TeamId,
        name: impl Into<String>,
        league: impl Into<String>,
        tier: Tier,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            league: league.into(),
            tier,
            latitude,
            longitude,
            url: None,
            address: None,
            league_url: None,
        }
    }

    /// Location as a planar point (x = longitude, y = latitude)
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}
