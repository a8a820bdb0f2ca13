//! Pure schedule edits.
//!
//! Every function takes the current schedule by reference and returns a new
//! one; the input is never modified.

use tracing::debug;

use super::moves::{AcceptedMove, RefereeUpdate};
use crate::error::EditError;
use crate::models::{Game, Referee, Schedule, TimeSlot, TournamentConfig};

/// Commits a move produced by [`super::MoveValidator::plan`].
///
/// The mover takes the destination cell and, for a swap, the occupant takes
/// the mover's origin cell.
pub fn apply_move(schedule: &Schedule, accepted: &AcceptedMove) -> Result<Schedule, EditError> {
    let mover = schedule
        .game(&accepted.game_id)
        .ok_or_else(|| EditError::GameNotFound(accepted.game_id.clone()))?;
    let (origin_court, origin_slot) = (mover.court, mover.time_slot);

    if let Some(other) = &accepted.swapped_with {
        if schedule.game(other).is_none() {
            return Err(EditError::GameNotFound(other.clone()));
        }
    }

    let games = schedule
        .games
        .iter()
        .map(|g| {
            if g.id == accepted.game_id {
                let mut moved = Game {
                    court: accepted.court,
                    time_slot: accepted.time_slot,
                    ..g.clone()
                };
                match &accepted.referee {
                    RefereeUpdate::Unchanged => {}
                    RefereeUpdate::Replaced(id) => moved.referee_id = Some(id.clone()),
                    RefereeUpdate::Cleared => moved.referee_id = None,
                }
                moved
            } else if accepted.swapped_with.as_deref() == Some(g.id.as_str()) {
                Game {
                    court: origin_court,
                    time_slot: origin_slot,
                    ..g.clone()
                }
            } else {
                g.clone()
            }
        })
        .collect();

    debug!(
        event = "move_applied",
        game = %accepted.game_id,
        court = accepted.court,
        slot = %accepted.time_slot,
        swapped_with = ?accepted.swapped_with,
    );
    Ok(Schedule::from_games(games))
}

/// Assigns (or with `None`, removes) a game's referee.
///
/// Only affiliation is checked; slot-level conflicts are left to
/// [`crate::validation::validate_referees`].
pub fn set_referee(
    schedule: &Schedule,
    config: &TournamentConfig,
    game_id: &str,
    referee_id: Option<&str>,
) -> Result<Schedule, EditError> {
    let game = schedule
        .game(game_id)
        .ok_or_else(|| EditError::GameNotFound(game_id.to_string()))?;

    if let Some(referee_id) = referee_id {
        let referee = config
            .referee(referee_id)
            .ok_or_else(|| EditError::RefereeNotFound(referee_id.to_string()))?;
        if !referee.is_neutral_for(&game.team1_id, &game.team2_id) {
            return Err(EditError::RefereeIneligible {
                referee_id: referee_id.to_string(),
                game_id: game_id.to_string(),
            });
        }
    }

    let mut updated = schedule.clone();
    for g in updated.games.iter_mut().filter(|g| g.id == game_id) {
        g.referee_id = referee_id.map(str::to_string);
    }
    Ok(updated)
}

/// Removes one game.
pub fn remove_game(schedule: &Schedule, game_id: &str) -> Result<Schedule, EditError> {
    if schedule.game(game_id).is_none() {
        return Err(EditError::GameNotFound(game_id.to_string()));
    }
    Ok(Schedule::from_games(
        schedule
            .games
            .iter()
            .filter(|g| g.id != game_id)
            .cloned()
            .collect(),
    ))
}

/// Removes every game starting at `time_slot`.
pub fn remove_time_slot(schedule: &Schedule, time_slot: TimeSlot) -> Schedule {
    Schedule::from_games(
        schedule
            .games
            .iter()
            .filter(|g| g.time_slot != time_slot)
            .cloned()
            .collect(),
    )
}

/// Referees allowed to officiate `game`: everyone not affiliated with
/// either team, in configured order.
pub fn available_referees<'c>(game: &Game, config: &'c TournamentConfig) -> Vec<&'c Referee> {
    config
        .referees
        .iter()
        .filter(|r| r.is_neutral_for(&game.team1_id, &game.team2_id))
        .collect()
}
