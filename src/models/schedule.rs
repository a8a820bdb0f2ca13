//! Game and schedule (solution) models.
//!
//! A schedule is the set of games placed on the (time slot × court) grid.
//! It has no identity beyond its games; the caller owns it and every edit
//! produces a new value.
//!
//! # Invariants
//! After generation and after every accepted edit:
//! 1. No two games share (court, time slot).
//! 2. No team plays twice in one time slot.
//! 3. No referee officiates twice in one time slot.
//! 4. No referee officiates while its own team plays in that slot.
//! 5. No game collides with a tournament break.
//! 6. Each unordered team pair meets at most once per pool.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use super::TimeSlot;

/// One matchup placed on a court at a time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Unique game identifier.
    pub id: String,
    /// First team.
    pub team1_id: String,
    /// Second team (never equal to `team1_id`).
    pub team2_id: String,
    /// Court number (1-based).
    pub court: u32,
    /// Start time.
    pub time_slot: TimeSlot,
    /// Pool the matchup belongs to, `None` for single-pool tournaments.
    #[serde(default)]
    pub pool: Option<u32>,
    /// Assigned referee.
    #[serde(default)]
    pub referee_id: Option<String>,
}

impl Game {
    /// Creates an unrefereed game.
    pub fn new(
        id: impl Into<String>,
        team1_id: impl Into<String>,
        team2_id: impl Into<String>,
        court: u32,
        time_slot: TimeSlot,
    ) -> Self {
        Self {
            id: id.into(),
            team1_id: team1_id.into(),
            team2_id: team2_id.into(),
            court,
            time_slot,
            pool: None,
            referee_id: None,
        }
    }

    /// Sets the pool.
    pub fn with_pool(mut self, pool: Option<u32>) -> Self {
        self.pool = pool;
        self
    }

    /// Sets the referee.
    pub fn with_referee(mut self, referee_id: impl Into<String>) -> Self {
        self.referee_id = Some(referee_id.into());
        self
    }

    /// Whether `team_id` plays in this game.
    #[inline]
    pub fn involves(&self, team_id: &str) -> bool {
        self.team1_id == team_id || self.team2_id == team_id
    }

    /// Whether this game and `other` have a team in common.
    #[inline]
    pub fn shares_team_with(&self, other: &Game) -> bool {
        other.involves(&self.team1_id) || other.involves(&self.team2_id)
    }

    /// Whether this game occupies the given cell.
    #[inline]
    pub fn is_at(&self, court: u32, time_slot: TimeSlot) -> bool {
        self.court == court && self.time_slot == time_slot
    }

    /// Order-independent key of the team pair.
    pub fn pair_key(&self) -> (&str, &str) {
        if self.team1_id <= self.team2_id {
            (&self.team1_id, &self.team2_id)
        } else {
            (&self.team2_id, &self.team1_id)
        }
    }
}

/// Subset selector used by schedule views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleFilter {
    /// Every game.
    #[default]
    All,
    /// Games a team plays in.
    Team(String),
    /// Games a referee officiates.
    Referee(String),
    /// Games without a referee.
    Unrefereed,
}

/// A complete tournament schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Placed games.
    pub games: Vec<Game>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a list of games.
    pub fn from_games(games: Vec<Game>) -> Self {
        Self { games }
    }

    /// Adds a game.
    pub fn add_game(&mut self, game: Game) {
        self.games.push(game);
    }

    /// Number of games.
    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// Whether the schedule has no games.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Finds a game by ID.
    pub fn game(&self, game_id: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.id == game_id)
    }

    /// Games starting at `time_slot`, in schedule order.
    pub fn games_at(&self, time_slot: TimeSlot) -> impl Iterator<Item = &Game> {
        self.games.iter().filter(move |g| g.time_slot == time_slot)
    }

    /// The first game occupying (court, time slot), if any.
    pub fn occupant(&self, court: u32, time_slot: TimeSlot) -> Option<&Game> {
        self.games.iter().find(|g| g.is_at(court, time_slot))
    }

    /// Games a team plays in.
    pub fn games_for_team(&self, team_id: &str) -> Vec<&Game> {
        self.games.iter().filter(|g| g.involves(team_id)).collect()
    }

    /// Games a referee officiates.
    pub fn games_for_referee(&self, referee_id: &str) -> Vec<&Game> {
        self.games
            .iter()
            .filter(|g| g.referee_id.as_deref() == Some(referee_id))
            .collect()
    }

    /// Distinct time slots in use, in tournament order relative to `start`.
    pub fn time_slots(&self, start: TimeSlot) -> Vec<TimeSlot> {
        let used: BTreeSet<(u32, TimeSlot)> = self
            .games
            .iter()
            .map(|g| (g.time_slot.offset_from(start), g.time_slot))
            .collect();
        used.into_iter().map(|(_, slot)| slot).collect()
    }

    /// Games matching `filter`.
    pub fn filtered(&self, filter: &ScheduleFilter) -> Vec<&Game> {
        self.games
            .iter()
            .filter(|g| match filter {
                ScheduleFilter::All => true,
                ScheduleFilter::Team(team_id) => g.involves(team_id),
                ScheduleFilter::Referee(referee_id) => {
                    g.referee_id.as_deref() == Some(referee_id.as_str())
                }
                ScheduleFilter::Unrefereed => g.referee_id.is_none(),
            })
            .collect()
    }

    /// Groups games by participating team (each game appears under both teams).
    pub fn games_by_team(&self) -> HashMap<&str, Vec<&Game>> {
        let mut by_team: HashMap<&str, Vec<&Game>> = HashMap::new();
        for g in &self.games {
            by_team.entry(g.team1_id.as_str()).or_default().push(g);
            by_team.entry(g.team2_id.as_str()).or_default().push(g);
        }
        by_team
    }

    /// Empty (court, slot) cells over the given playable slots.
    pub fn gap_count(&self, playable: &[TimeSlot], courts: u32) -> usize {
        playable
            .iter()
            .map(|&slot| {
                let used = (1..=courts)
                    .filter(|&c| self.occupant(c, slot).is_some())
                    .count();
                courts as usize - used
            })
            .sum()
    }
}

/// A rule violation found by a batch check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Violated rule.
    pub kind: ViolationKind,
    /// Time slot where it happens.
    pub time_slot: TimeSlot,
    /// Offending entity (team, referee, or court number).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Classification of batch violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A team plays more than one game in a slot.
    TeamDoubleBooked,
    /// A court hosts more than one game in a slot.
    CourtDoubleBooked,
    /// A referee officiates more than one game in a slot.
    RefereeDoubleBooked,
    /// A referee officiates a game of its own team.
    RefereeOwnTeam,
    /// A referee officiates while its own team plays elsewhere in the slot.
    RefereeTeamPlaying,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
