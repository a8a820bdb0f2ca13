//! Round-robin matchup enumeration.
//!
//! With a single pool every team meets every other team once. With several
//! pools teams only meet teams from their own pool; teams without a pool (or
//! with a pool number above the configured count) are left out.
//!
//! Output order is deterministic: pools ascending, then pairs `(i, j)` with
//! `i < j` in input order. The caller shuffles.

use serde::{Deserialize, Serialize};

use crate::models::Team;

/// An unordered pair of teams that must meet once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    /// First team.
    pub team1_id: String,
    /// Second team.
    pub team2_id: String,
    /// Pool, `None` for single-pool tournaments.
    pub pool: Option<u32>,
}

impl Matchup {
    /// Creates a matchup.
    pub fn new(team1_id: impl Into<String>, team2_id: impl Into<String>, pool: Option<u32>) -> Self {
        Self {
            team1_id: team1_id.into(),
            team2_id: team2_id.into(),
            pool,
        }
    }

    /// Whether `team_id` plays in this matchup.
    #[inline]
    pub fn involves(&self, team_id: &str) -> bool {
        self.team1_id == team_id || self.team2_id == team_id
    }
}

/// Enumerates every unique pairing.
pub fn generate_matchups(teams: &[Team], pools: u32) -> Vec<Matchup> {
    if pools <= 1 {
        return round_robin(teams.iter().collect(), None);
    }

    (1..=pools)
        .flat_map(|pool| {
            let members: Vec<&Team> = teams.iter().filter(|t| t.pool == Some(pool)).collect();
            round_robin(members, Some(pool))
        })
        .collect()
}

fn round_robin(teams: Vec<&Team>, pool: Option<u32>) -> Vec<Matchup> {
    let mut matchups = Vec::with_capacity(teams.len() * teams.len().saturating_sub(1) / 2);
    for (i, a) in teams.iter().enumerate() {
        for b in &teams[i + 1..] {
            matchups.push(Matchup::new(a.id.as_str(), b.id.as_str(), pool));
        }
    }
    matchups
}
