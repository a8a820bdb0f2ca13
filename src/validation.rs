//! Input validation and batch schedule checks.
//!
//! Two families of checks live here:
//!
//! - [`validate_config`]: structural integrity of a [`TournamentConfig`]
//!   before scheduling (duplicate IDs, case-insensitive duplicate team names,
//!   pool membership, dangling referee affiliations, degenerate parameters,
//!   tournaments that do not fit within one day).
//! - [`validate_schedule`] / [`validate_referees`]: read-only diagnostics over
//!   a finished [`Schedule`]. They never fail; they return every violation
//!   found so the caller can decide whether to log, alert, or ignore.

use std::collections::{HashMap, HashSet};

use crate::models::{
    Schedule, TimeSlot, TournamentConfig, Violation, ViolationKind, MINUTES_PER_DAY,
};
use crate::scheduler::{generate_matchups, TimeSlotSequencer};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// Two teams share a name (case-insensitive).
    DuplicateName,
    /// A team's pool is missing or out of range.
    InvalidPool,
    /// A referee is affiliated with a team that doesn't exist.
    InvalidReference,
    /// A numeric parameter is out of range.
    InvalidParameter,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a tournament configuration.
///
/// Checks:
/// 1. courts, pools, game duration and horizon are positive
/// 2. every break has a positive duration
/// 3. no duplicate team, referee or break IDs
/// 4. no two team names equal ignoring case
/// 5. with more than one pool, every team sits in a pool within `1..=pools`
/// 6. every referee affiliation points to an existing team
/// 7. a slot (game plus changeover) is at most one day long, and every
///    matchup fits into the playable slots of one day
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_config(config: &TournamentConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.courts == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameter,
            "At least one court is required",
        ));
    }
    if config.pools == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameter,
            "At least one pool is required",
        ));
    }
    if config.game_duration == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameter,
            "Game duration must be at least one minute",
        ));
    }
    if config.horizon == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameter,
            "Horizon must contain at least one time slot",
        ));
    }
    if config.slot_step() > MINUTES_PER_DAY {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameter,
            format!(
                "Game duration plus changeover is {} minutes, longer than a day",
                config.slot_step()
            ),
        ));
    }

    let mut break_ids = HashSet::new();
    for b in &config.breaks {
        if !break_ids.insert(b.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate break ID: {}", b.id),
            ));
        }
        if b.duration == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidParameter,
                format!("Break '{}' has zero duration", b.id),
            ));
        }
    }

    let mut team_ids = HashSet::new();
    let mut team_names = HashSet::new();
    for team in &config.teams {
        if !team_ids.insert(team.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate team ID: {}", team.id),
            ));
        }
        if !team_names.insert(team.name.to_lowercase()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate team name: {}", team.name),
            ));
        }
        if config.pools > 1 {
            match team.pool {
                Some(p) if (1..=config.pools).contains(&p) => {}
                Some(p) => errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidPool,
                    format!(
                        "Team '{}' is in pool {p}, but only {} pools exist",
                        team.name, config.pools
                    ),
                )),
                None => errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidPool,
                    format!("Team '{}' has no pool", team.name),
                )),
            }
        }
    }

    let mut referee_ids = HashSet::new();
    for referee in &config.referees {
        if !referee_ids.insert(referee.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate referee ID: {}", referee.id),
            ));
        }
        if let Some(team_id) = &referee.team_id {
            if !team_ids.contains(team_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidReference,
                    format!(
                        "Referee '{}' references unknown team '{team_id}'",
                        referee.name
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        check_day_capacity(config, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Every tournament runs within 24 hours of its start time.
fn check_day_capacity(config: &TournamentConfig, errors: &mut Vec<ValidationError>) {
    let sequencer = TimeSlotSequencer::from_config(config);
    let playable = sequencer
        .playable(&sequencer.base(sequencer.day_slots()))
        .len();
    let matchups = generate_matchups(&config.teams, config.pools);

    let cells = playable * config.courts as usize;
    if matchups.len() > cells {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameter,
            format!(
                "{} games do not fit into the {cells} court slots available within one day",
                matchups.len()
            ),
        ));
    }

    let mut per_team: HashMap<&str, usize> = HashMap::new();
    for m in &matchups {
        *per_team.entry(m.team1_id.as_str()).or_default() += 1;
        *per_team.entry(m.team2_id.as_str()).or_default() += 1;
    }
    if let Some((team_id, games)) = per_team.into_iter().max_by_key(|&(_, n)| n) {
        if games > playable {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidParameter,
                format!(
                    "Team '{}' plays {games} games but only {playable} time slots fit within one day",
                    config.team_name(team_id)
                ),
            ));
        }
    }
}

/// Groups game indices by time slot, preserving schedule order within a slot.
fn games_by_slot(schedule: &Schedule) -> Vec<(TimeSlot, Vec<usize>)> {
    let mut order: Vec<TimeSlot> = Vec::new();
    let mut by_slot: HashMap<TimeSlot, Vec<usize>> = HashMap::new();
    for (idx, g) in schedule.games.iter().enumerate() {
        by_slot
            .entry(g.time_slot)
            .or_insert_with(|| {
                order.push(g.time_slot);
                Vec::new()
            })
            .push(idx);
    }
    order
        .into_iter()
        .map(|slot| {
            let games = by_slot.remove(&slot).unwrap_or_default();
            (slot, games)
        })
        .collect()
}

/// Checks team and court double-booking.
///
/// Reports a team appearing in two games of the same slot and a court
/// hosting two games in the same slot.
pub fn validate_schedule(schedule: &Schedule) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (slot, indices) in games_by_slot(schedule) {
        let mut teams_in_slot: HashSet<&str> = HashSet::new();
        let mut courts_in_slot: HashSet<u32> = HashSet::new();

        for idx in indices {
            let game = &schedule.games[idx];
            for team_id in [&game.team1_id, &game.team2_id] {
                if !teams_in_slot.insert(team_id.as_str()) {
                    violations.push(Violation {
                        kind: ViolationKind::TeamDoubleBooked,
                        time_slot: slot,
                        entity_id: team_id.clone(),
                        message: format!("Team {team_id} plays multiple games at {slot}"),
                    });
                }
            }
            if !courts_in_slot.insert(game.court) {
                violations.push(Violation {
                    kind: ViolationKind::CourtDoubleBooked,
                    time_slot: slot,
                    entity_id: game.court.to_string(),
                    message: format!("Court {} has multiple games at {slot}", game.court),
                });
            }
        }
    }

    violations
}

/// Checks referee assignments.
///
/// Reports a referee officiating two games in one slot, a referee
/// officiating its own team, and a referee working in a slot where its team
/// plays. A referee on its own team's game breaks both of the last two rules
/// and is reported twice.
pub fn validate_referees(schedule: &Schedule, config: &TournamentConfig) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (slot, indices) in games_by_slot(schedule) {
        let teams_playing: HashSet<&str> = indices
            .iter()
            .flat_map(|&i| {
                let g = &schedule.games[i];
                [g.team1_id.as_str(), g.team2_id.as_str()]
            })
            .collect();
        let mut refs_in_slot: HashSet<&str> = HashSet::new();

        for &idx in &indices {
            let game = &schedule.games[idx];
            let Some(referee_id) = game.referee_id.as_deref() else {
                continue;
            };
            let referee_name = config.referee_name(referee_id);

            if !refs_in_slot.insert(referee_id) {
                violations.push(Violation {
                    kind: ViolationKind::RefereeDoubleBooked,
                    time_slot: slot,
                    entity_id: referee_id.to_string(),
                    message: format!(
                        "Referee {referee_name} is assigned to multiple games at {slot}"
                    ),
                });
            }

            let Some(team_id) = config
                .referee(referee_id)
                .and_then(|r| r.team_id.as_deref())
            else {
                continue;
            };
            let team_name = config.team_name(team_id);

            if game.involves(team_id) {
                violations.push(Violation {
                    kind: ViolationKind::RefereeOwnTeam,
                    time_slot: slot,
                    entity_id: referee_id.to_string(),
                    message: format!(
                        "Referee {referee_name} is affiliated with team {team_name} but assigned to their game at {slot}"
                    ),
                });
            }
            if teams_playing.contains(team_id) {
                violations.push(Violation {
                    kind: ViolationKind::RefereeTeamPlaying,
                    time_slot: slot,
                    entity_id: referee_id.to_string(),
                    message: format!(
                        "Referee {referee_name}'s team ({team_name}) is playing at {slot}"
                    ),
                });
            }
        }
    }

    violations
}
