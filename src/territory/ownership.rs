//! Ownership decisions and the nearest-team fallback.

use std::collections::BTreeSet;

use geo::Point;

use crate::models::Team;

/// Who holds a region, judged from the teams located directly inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ownership {
    Owned(String),
    Contested(BTreeSet<String>),
    Empty,
}

impl Ownership {
    pub fn decide<'t>(teams: impl IntoIterator<Item = &'t Team>) -> Self {
        let mut leagues: BTreeSet<String> = teams.into_iter().map(|t| t.league.clone()).collect();

        match leagues.len() {
            0 => Ownership::Empty,
            1 => Ownership::Owned(leagues.pop_first().unwrap_or_default()),
            _ => Ownership::Contested(leagues),
        }
    }
}

/// The candidate closest to `target` (planar distance).
///
/// Ties go to the earliest candidate, so the result only depends on input order.
pub fn nearest_team<'t>(target: &Point<f64>, candidates: &[&'t Team]) -> Option<&'t Team> {
    let mut best: Option<(&'t Team, f64)> = None;

    for &team in candidates {
        let offset = team.point() - *target;
        let distance = offset.x().hypot(offset.y());
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((team, distance));
        }
    }

    best.map(|(team, _)| team)
}
