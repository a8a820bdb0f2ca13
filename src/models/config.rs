//! Tournament configuration.
//!
//! Read-only input to the engine: participants, officials, the court grid
//! and the clock. Can be built in code or loaded from TOML.
//!
//! ```
//! use u_tournament::models::TournamentConfig;
//!
//! let config = TournamentConfig::from_toml_str(r#"
//!     courts = 2
//!     start_time = "09:00"
//!     game_duration = 20
//!     break_between_games = 5
//!
//!     [[teams]]
//!     id = "a"
//!     name = "Sharks"
//!
//!     [[teams]]
//!     id = "b"
//!     name = "Owls"
//! "#).unwrap();
//!
//! assert_eq!(config.courts, 2);
//! assert_eq!(config.slot_step(), 25);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{Game, Referee, Team, TimeSlot, TournamentBreak};
use crate::error::ConfigError;
use crate::validation::validate_config;

/// Default number of slots in the initial horizon.
pub const DEFAULT_HORIZON: usize = 30;

/// Everything the engine needs to know about a tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    /// Tournament display name.
    pub name: String,
    /// Participating teams.
    pub teams: Vec<Team>,
    /// Available referees.
    pub referees: Vec<Referee>,
    /// Number of courts (≥ 1).
    pub courts: u32,
    /// Number of pools (≥ 1). With more than one pool, teams only meet
    /// teams from their own pool.
    pub pools: u32,
    /// First time slot.
    pub start_time: TimeSlot,
    /// Game length in minutes (≥ 1).
    pub game_duration: u32,
    /// Changeover between consecutive slots in minutes.
    pub break_between_games: u32,
    /// Scheduled pauses.
    pub breaks: Vec<TournamentBreak>,
    /// Number of slots generated up front before on-demand extension.
    pub horizon: usize,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            teams: Vec::new(),
            referees: Vec::new(),
            courts: 1,
            pools: 1,
            start_time: TimeSlot::from_hm(9, 0),
            game_duration: 20,
            break_between_games: 5,
            breaks: Vec::new(),
            horizon: DEFAULT_HORIZON,
        }
    }
}

impl TournamentConfig {
    /// Creates a configuration with default timing and no participants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads and validates a configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates a configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Runs input validation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_config(self).map_err(ConfigError::Invalid)
    }

    /// Sets the tournament name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a team.
    pub fn with_team(mut self, team: Team) -> Self {
        self.teams.push(team);
        self
    }

    /// Adds several teams.
    pub fn with_teams(mut self, teams: impl IntoIterator<Item = Team>) -> Self {
        self.teams.extend(teams);
        self
    }

    /// Adds a referee.
    pub fn with_referee(mut self, referee: Referee) -> Self {
        self.referees.push(referee);
        self
    }

    /// Sets the number of courts.
    pub fn with_courts(mut self, courts: u32) -> Self {
        self.courts = courts;
        self
    }

    /// Sets the number of pools.
    pub fn with_pools(mut self, pools: u32) -> Self {
        self.pools = pools;
        self
    }

    /// Sets the start time.
    pub fn with_start_time(mut self, start_time: TimeSlot) -> Self {
        self.start_time = start_time;
        self
    }

    /// Sets game length and changeover, both in minutes.
    pub fn with_timing(mut self, game_duration: u32, break_between_games: u32) -> Self {
        self.game_duration = game_duration;
        self.break_between_games = break_between_games;
        self
    }

    /// Adds a scheduled pause.
    pub fn with_break(mut self, tournament_break: TournamentBreak) -> Self {
        self.breaks.push(tournament_break);
        self
    }

    /// Sets the initial horizon length.
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Minutes between consecutive slot starts.
    #[inline]
    pub fn slot_step(&self) -> u32 {
        self.game_duration.saturating_add(self.break_between_games)
    }

    /// Finds a team by ID.
    pub fn team(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    /// Finds a referee by ID.
    pub fn referee(&self, referee_id: &str) -> Option<&Referee> {
        self.referees.iter().find(|r| r.id == referee_id)
    }

    /// Team display name, falling back to the ID for unknown teams.
    pub fn team_name<'a>(&'a self, team_id: &'a str) -> &'a str {
        self.team(team_id).map_or(team_id, |t| t.name.as_str())
    }

    /// Referee display name, falling back to the ID for unknown referees.
    pub fn referee_name<'a>(&'a self, referee_id: &'a str) -> &'a str {
        self.referee(referee_id).map_or(referee_id, |r| r.name.as_str())
    }

    /// `"Team A vs Team B"` label for a game.
    pub fn game_label(&self, game: &Game) -> String {
        format!(
            "{} vs {}",
            self.team_name(&game.team1_id),
            self.team_name(&game.team2_id)
        )
    }
}
