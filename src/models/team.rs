//! Team and referee models.
//!
//! Teams are the participants of matchups; referees are the officiating
//! resource attached to games. A referee may be affiliated with one team,
//! in which case it must never officiate while that team plays.

use serde::{Deserialize, Serialize};

/// A participating team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique team identifier.
    pub id: String,
    /// Display name (unique, case-insensitive).
    pub name: String,
    /// Pool number (1-based). `None` in single-pool tournaments.
    #[serde(default)]
    pub pool: Option<u32>,
    /// Display color (opaque to the engine).
    #[serde(default)]
    pub color: String,
}

impl Team {
    /// Creates a team without a pool.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pool: None,
            color: String::new(),
        }
    }

    /// Places the team in a pool.
    pub fn with_pool(mut self, pool: u32) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Sets the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// A referee available to officiate games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referee {
    /// Unique referee identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Team this referee belongs to, if any.
    #[serde(default)]
    pub team_id: Option<String>,
}

impl Referee {
    /// Creates an unaffiliated referee.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            team_id: None,
        }
    }

    /// Affiliates the referee with a team.
    pub fn with_team(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    /// Whether this referee belongs to `team_id`.
    #[inline]
    pub fn is_affiliated_with(&self, team_id: &str) -> bool {
        self.team_id.as_deref() == Some(team_id)
    }

    /// Whether this referee may officiate a game between `team1` and `team2`.
    #[inline]
    pub fn is_neutral_for(&self, team1: &str, team2: &str) -> bool {
        !self.is_affiliated_with(team1) && !self.is_affiliated_with(team2)
    }
}
