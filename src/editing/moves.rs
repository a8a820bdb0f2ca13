//! Interactive move validation.
//!
//! # Rules
//!
//! Checked in order; the first failure decides the outcome.
//!
//! 1. **Team conflict**: another game at the destination slot involves one of
//!    the moving game's teams.
//! 2. **Swap**: the destination cell is occupied, so the occupant would take
//!    the mover's origin cell. The occupant's teams must be free at the
//!    origin slot, no third game may sit in the origin cell, and both
//!    referees must stay valid at their new slots.
//! 3. **Referee**: the moving game's referee must not belong to a playing
//!    team, must not officiate another game in the destination slot, and its
//!    team must not play anywhere in that slot.
//!
//! [`MoveValidator::plan`] additionally repairs a plain move that only fails
//! because of its referee (own team or busy): the first referee neutral to
//! both teams and free in the destination slot takes over, or the game is
//! left without a referee. The repair does not look at back-to-back
//! officiating.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::models::{Game, Referee, Schedule, TimeSlot, TournamentConfig};

/// Why a move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// A moving team already plays at the destination slot.
    TeamConflict,
    /// A swapped-in team already plays at the origin slot.
    SwapDestinationConflict,
    /// The origin cell holds a third game.
    SwapCourtOccupied,
    /// The referee belongs to a playing team.
    RefTeamConflict,
    /// The referee already officiates in the destination slot.
    RefBusy,
    /// The referee's team plays in the destination slot.
    RefTeamPlaying,
    /// The moving game's referee would conflict after a swap.
    SwapRefConflictA,
    /// The occupant's referee would conflict after a swap.
    SwapRefConflictB,
    /// Anything else (unknown game, nonexistent court).
    Unknown,
}

impl RejectionReason {
    /// Stable reason code.
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::TeamConflict => "team_conflict",
            Self::SwapDestinationConflict => "swap_destination_conflict",
            Self::SwapCourtOccupied => "swap_court_occupied",
            Self::RefTeamConflict => "ref_team_conflict",
            Self::RefBusy => "ref_busy",
            Self::RefTeamPlaying => "ref_team_playing",
            Self::SwapRefConflictA => "swap_ref_conflict_a",
            Self::SwapRefConflictB => "swap_ref_conflict_b",
            Self::Unknown => "unknown",
        }
    }

    /// Whether a referee reassignment can rescue the move.
    pub fn is_repairable(&self) -> bool {
        matches!(self, Self::RefTeamConflict | Self::RefBusy)
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// The referee rule that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RefereeConflict {
    /// The referee belongs to one of the playing teams.
    OwnTeam { referee_team: String },
    /// The referee already officiates another game in the slot.
    Busy { busy_game: String, busy_court: u32 },
    /// The referee's team plays another game in the slot.
    TeamPlaying {
        referee_team: String,
        team_game: String,
        team_court: u32,
    },
}

impl RefereeConflict {
    fn describe(&self, referee_name: &str) -> String {
        match self {
            Self::OwnTeam { referee_team } => format!(
                "referee {referee_name} is affiliated with {referee_team}, which plays in this game"
            ),
            Self::Busy {
                busy_game,
                busy_court,
            } => format!(
                "referee {referee_name} is already officiating \"{busy_game}\" on court {busy_court}"
            ),
            Self::TeamPlaying {
                referee_team,
                team_game,
                team_court,
            } => format!(
                "referee {referee_name}'s team ({referee_team}) is playing \"{team_game}\" on court {team_court}"
            ),
        }
    }
}

/// Display-ready context for a rejection.
///
/// Teams and referees are given by name, games as `"A vs B"` labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionDetails {
    TeamConflict {
        moving_game: String,
        conflicting_team: String,
        conflict_game: String,
        conflict_court: u32,
        destination_time: TimeSlot,
        destination_court: u32,
    },
    SwapDestinationConflict {
        game_a: String,
        game_b: String,
        conflicting_team: String,
        conflict_game: String,
        conflict_time: TimeSlot,
        conflict_court: u32,
    },
    SwapCourtOccupied {
        game_a: String,
        game_b: String,
        occupied_court: u32,
        occupied_time: TimeSlot,
        occupying_game: String,
    },
    Referee {
        referee_name: String,
        game: String,
        time_slot: TimeSlot,
        conflict: RefereeConflict,
    },
    SwapReferee {
        game_a: String,
        game_b: String,
        referee_name: String,
        time_slot: TimeSlot,
        conflict: RefereeConflict,
    },
    Unknown {
        message: String,
    },
}

/// A rejected move: reason code plus details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRejection {
    /// Machine-readable reason.
    pub reason: RejectionReason,
    /// Context for rendering a message.
    pub details: RejectionDetails,
}

impl MoveRejection {
    fn unknown(message: impl Into<String>) -> Self {
        Self {
            reason: RejectionReason::Unknown,
            details: RejectionDetails::Unknown {
                message: message.into(),
            },
        }
    }
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            RejectionDetails::TeamConflict {
                moving_game,
                conflicting_team,
                conflict_game,
                conflict_court,
                destination_time,
                destination_court,
            } => write!(
                f,
                "Cannot move \"{moving_game}\" to {destination_time} court {destination_court}: \
                 {conflicting_team} is already playing \"{conflict_game}\" on court {conflict_court}"
            ),
            RejectionDetails::SwapDestinationConflict {
                game_a,
                game_b,
                conflicting_team,
                conflict_game,
                conflict_time,
                conflict_court,
            } => write!(
                f,
                "Cannot swap \"{game_a}\" with \"{game_b}\": {conflicting_team} would clash with \
                 \"{conflict_game}\" on court {conflict_court} at {conflict_time}"
            ),
            RejectionDetails::SwapCourtOccupied {
                game_a,
                game_b,
                occupied_court,
                occupied_time,
                occupying_game,
            } => write!(
                f,
                "Cannot swap \"{game_a}\" with \"{game_b}\": court {occupied_court} at \
                 {occupied_time} is occupied by \"{occupying_game}\""
            ),
            RejectionDetails::Referee {
                referee_name,
                game,
                time_slot,
                conflict,
            } => write!(
                f,
                "Cannot move \"{game}\" to {time_slot}: {}",
                conflict.describe(referee_name)
            ),
            RejectionDetails::SwapReferee {
                game_a,
                game_b,
                referee_name,
                time_slot,
                conflict,
            } => {
                let which = if self.reason == RejectionReason::SwapRefConflictB {
                    "second"
                } else {
                    "first"
                };
                write!(
                    f,
                    "Cannot swap \"{game_a}\" with \"{game_b}\": the {which} game's referee \
                     would conflict at {time_slot}, {}",
                    conflict.describe(referee_name)
                )
            }
            RejectionDetails::Unknown { message } => write!(f, "Invalid move: {message}"),
        }
    }
}

/// Result of [`MoveValidator::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    Valid,
    Invalid(MoveRejection),
}

impl MoveOutcome {
    /// Whether the move passed every rule.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The rejection, if any.
    pub fn rejection(&self) -> Option<&MoveRejection> {
        match self {
            Self::Valid => None,
            Self::Invalid(r) => Some(r),
        }
    }
}

/// What happens to the moving game's referee.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefereeUpdate {
    #[default]
    Unchanged,
    Replaced(String),
    Cleared,
}

/// A move that passed validation (possibly after referee repair).
///
/// Commit it with [`super::apply_move`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedMove {
    /// The moving game.
    pub game_id: String,
    /// Destination court.
    pub court: u32,
    /// Destination slot.
    pub time_slot: TimeSlot,
    /// Occupant of the destination cell, which moves to the mover's origin.
    pub swapped_with: Option<String>,
    /// Referee change on the moving game.
    pub referee: RefereeUpdate,
}

impl AcceptedMove {
    /// Whether this move swaps two games.
    pub fn is_swap(&self) -> bool {
        self.swapped_with.is_some()
    }
}

/// Result of [`MoveValidator::plan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePlan {
    Accepted(AcceptedMove),
    Rejected(MoveRejection),
}

struct RefereeIssue {
    reason: RejectionReason,
    referee_name: String,
    conflict: RefereeConflict,
}

/// Validates drag-and-drop moves against a live schedule.
///
/// # Example
///
/// ```
/// use u_tournament::editing::{MoveValidator, RejectionReason};
/// use u_tournament::models::{Game, Schedule, Team, TimeSlot, TournamentConfig};
///
/// let config = TournamentConfig::new()
///     .with_courts(2)
///     .with_teams(["A", "B", "C"].map(|id| Team::new(id, id)));
/// let nine = TimeSlot::from_hm(9, 0);
/// let schedule = Schedule::from_games(vec![
///     Game::new("1", "A", "B", 1, nine),
///     Game::new("2", "A", "C", 1, TimeSlot::from_hm(9, 25)),
/// ]);
///
/// let outcome = MoveValidator::new(&schedule, &config).validate("2", 2, nine);
/// assert_eq!(outcome.rejection().unwrap().reason, RejectionReason::TeamConflict);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MoveValidator<'a> {
    schedule: &'a Schedule,
    config: &'a TournamentConfig,
}

impl<'a> MoveValidator<'a> {
    /// Creates a validator over `schedule`.
    pub fn new(schedule: &'a Schedule, config: &'a TournamentConfig) -> Self {
        Self { schedule, config }
    }

    /// Checks moving `game_id` to (`court`, `time_slot`).
    pub fn validate(&self, game_id: &str, court: u32, time_slot: TimeSlot) -> MoveOutcome {
        match self.check(game_id, court, time_slot) {
            Ok(_) => MoveOutcome::Valid,
            Err(rejection) => MoveOutcome::Invalid(rejection),
        }
    }

    /// Validates and, for repairable referee failures, picks a new referee.
    pub fn plan(&self, game_id: &str, court: u32, time_slot: TimeSlot) -> MovePlan {
        let rejection = match self.check(game_id, court, time_slot) {
            Ok(occupant) => {
                return MovePlan::Accepted(AcceptedMove {
                    game_id: game_id.to_string(),
                    court,
                    time_slot,
                    swapped_with: occupant.map(|g| g.id.clone()),
                    referee: RefereeUpdate::Unchanged,
                })
            }
            Err(rejection) => rejection,
        };

        let game = match self.schedule.game(game_id) {
            Some(game) if rejection.reason.is_repairable() => game,
            _ => {
                debug!(event = "move_rejected", game = game_id, reason = rejection.reason.as_code());
                return MovePlan::Rejected(rejection);
            }
        };

        let referee = match self.repair_referee(game, time_slot) {
            Some(r) => RefereeUpdate::Replaced(r.id.clone()),
            None => RefereeUpdate::Cleared,
        };
        debug!(
            event = "referee_auto_repaired",
            game = game_id,
            reason = rejection.reason.as_code(),
            referee = ?referee,
        );

        MovePlan::Accepted(AcceptedMove {
            game_id: game_id.to_string(),
            court,
            time_slot,
            swapped_with: self
                .schedule
                .games_at(time_slot)
                .find(|g| g.id != game.id && g.court == court)
                .map(|g| g.id.clone()),
            referee,
        })
    }

    /// Runs the rules; `Ok` carries the swap occupant, if any.
    fn check(
        &self,
        game_id: &str,
        court: u32,
        time_slot: TimeSlot,
    ) -> Result<Option<&'a Game>, MoveRejection> {
        let schedule = self.schedule;
        let Some(game) = schedule.game(game_id) else {
            return Err(MoveRejection::unknown(format!("game '{game_id}' not found")));
        };
        if court == 0 || court > self.config.courts {
            return Err(MoveRejection::unknown(format!("court {court} does not exist")));
        }

        let others: Vec<&Game> = schedule
            .games_at(time_slot)
            .filter(|g| g.id != game.id)
            .collect();

        if let Some(conflict) = others.iter().find(|g| g.shares_team_with(game)) {
            let team = if conflict.involves(&game.team1_id) {
                &game.team1_id
            } else {
                &game.team2_id
            };
            return Err(MoveRejection {
                reason: RejectionReason::TeamConflict,
                details: RejectionDetails::TeamConflict {
                    moving_game: self.config.game_label(game),
                    conflicting_team: self.config.team_name(team).to_string(),
                    conflict_game: self.config.game_label(conflict),
                    conflict_court: conflict.court,
                    destination_time: time_slot,
                    destination_court: court,
                },
            });
        }

        if let Some(occupant) = others.iter().copied().find(|g| g.court == court) {
            self.check_swap(game, occupant)?;
            return Ok(Some(occupant));
        }

        if let Some(issue) = self.referee_issue(game, &others) {
            return Err(MoveRejection {
                reason: issue.reason,
                details: RejectionDetails::Referee {
                    referee_name: issue.referee_name,
                    game: self.config.game_label(game),
                    time_slot,
                    conflict: issue.conflict,
                },
            });
        }

        Ok(None)
    }

    fn check_swap(&self, game: &Game, occupant: &Game) -> Result<(), MoveRejection> {
        let origin = game.time_slot;
        let destination = occupant.time_slot;
        let excluded = |g: &&Game| g.id != game.id && g.id != occupant.id;
        let origin_others: Vec<&Game> = self.schedule.games_at(origin).filter(excluded).collect();
        let dest_others: Vec<&Game> = self.schedule.games_at(destination).filter(excluded).collect();

        let game_a = self.config.game_label(game);
        let game_b = self.config.game_label(occupant);

        if let Some(conflict) = origin_others.iter().find(|g| g.shares_team_with(occupant)) {
            let team = if conflict.involves(&occupant.team1_id) {
                &occupant.team1_id
            } else {
                &occupant.team2_id
            };
            return Err(MoveRejection {
                reason: RejectionReason::SwapDestinationConflict,
                details: RejectionDetails::SwapDestinationConflict {
                    game_a,
                    game_b,
                    conflicting_team: self.config.team_name(team).to_string(),
                    conflict_game: self.config.game_label(conflict),
                    conflict_time: origin,
                    conflict_court: conflict.court,
                },
            });
        }

        if let Some(third) = origin_others.iter().find(|g| g.court == game.court) {
            return Err(MoveRejection {
                reason: RejectionReason::SwapCourtOccupied,
                details: RejectionDetails::SwapCourtOccupied {
                    game_a,
                    game_b,
                    occupied_court: game.court,
                    occupied_time: origin,
                    occupying_game: self.config.game_label(third),
                },
            });
        }

        let issues = [
            (RejectionReason::SwapRefConflictA, game, destination, &dest_others),
            (RejectionReason::SwapRefConflictB, occupant, origin, &origin_others),
        ];
        for (reason, moving, slot, others) in issues {
            if let Some(issue) = self.referee_issue(moving, others) {
                return Err(MoveRejection {
                    reason,
                    details: RejectionDetails::SwapReferee {
                        game_a: game_a.clone(),
                        game_b: game_b.clone(),
                        referee_name: issue.referee_name,
                        time_slot: slot,
                        conflict: issue.conflict,
                    },
                });
            }
        }

        Ok(())
    }

    /// Referee validity of `game` next to the `others` in its new slot.
    ///
    /// Referees missing from the configuration are not checked.
    fn referee_issue(&self, game: &Game, others: &[&Game]) -> Option<RefereeIssue> {
        let referee_id = game.referee_id.as_deref()?;
        let referee = self.config.referee(referee_id)?;
        let issue = |reason, conflict| {
            Some(RefereeIssue {
                reason,
                referee_name: referee.name.clone(),
                conflict,
            })
        };
        let team_name = |team_id: &str| self.config.team_name(team_id).to_string();

        if let Some(team) = referee.team_id.as_deref().filter(|t| game.involves(t)) {
            return issue(
                RejectionReason::RefTeamConflict,
                RefereeConflict::OwnTeam {
                    referee_team: team_name(team),
                },
            );
        }

        if let Some(busy) = others
            .iter()
            .find(|g| g.referee_id.as_deref() == Some(referee_id))
        {
            return issue(
                RejectionReason::RefBusy,
                RefereeConflict::Busy {
                    busy_game: self.config.game_label(busy),
                    busy_court: busy.court,
                },
            );
        }

        let team = referee.team_id.as_deref()?;
        let playing = others.iter().find(|g| g.involves(team))?;
        issue(
            RejectionReason::RefTeamPlaying,
            RefereeConflict::TeamPlaying {
                referee_team: team_name(team),
                team_game: self.config.game_label(playing),
                team_court: playing.court,
            },
        )
    }

    fn repair_referee(&self, game: &Game, slot: TimeSlot) -> Option<&'a Referee> {
        let busy: HashSet<&str> = self
            .schedule
            .games_at(slot)
            .filter(|g| g.id != game.id)
            .filter_map(|g| g.referee_id.as_deref())
            .collect();
        self.config.referees.iter().find(|r| {
            r.is_neutral_for(&game.team1_id, &game.team2_id) && !busy.contains(r.id.as_str())
        })
    }
}
