//! Schedule summary metrics (KPIs).
//!
//! Computes tournament-level indicators from a generated or edited schedule
//! and its configuration.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Playable cells | Courts × non-break slots from the start through the last used slot |
//! | Remaining gaps | Playable cells without a game |
//! | Court utilization | Games / playable cells |
//! | Back-to-back | Per team, pairs of successive games starting ≤ 30 min apart |
//! | Referee load | Games per referee, plus games with no referee |

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::greedy::CONSECUTIVE_WINDOW_MINUTES;
use super::slots::TimeSlotSequencer;
use crate::models::{Schedule, TimeSlot, TournamentConfig};

/// Schedule indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Number of games.
    pub game_count: usize,
    /// Distinct slots holding at least one game.
    pub slots_used: usize,
    /// Earliest slot in tournament order.
    pub first_slot: Option<TimeSlot>,
    /// Latest slot in tournament order.
    pub last_slot: Option<TimeSlot>,
    /// Courts × playable slots over the occupied span.
    pub playable_cells: usize,
    /// Playable cells left empty.
    pub remaining_gaps: usize,
    /// Fraction of playable cells in use (0.0..=1.0).
    pub court_utilization: f64,
    /// Games per team.
    pub games_by_team: HashMap<String, usize>,
    /// Back-to-back game pairs per team.
    pub back_to_back_by_team: HashMap<String, usize>,
    /// Games per referee.
    pub games_by_referee: HashMap<String, usize>,
    /// Games without a referee.
    pub unrefereed: usize,
}

impl ScheduleKpi {
    /// Computes KPIs for `schedule`.
    pub fn calculate(schedule: &Schedule, config: &TournamentConfig) -> Self {
        let sequencer = TimeSlotSequencer::from_config(config);
        let start = config.start_time;
        let courts = config.courts.max(1);

        let slots = schedule.time_slots(start);
        let span = sequencer.playable_span(schedule);
        let playable_cells = span.len() * courts as usize;
        let remaining_gaps = schedule.gap_count(&span, courts);

        let court_utilization = if playable_cells == 0 {
            0.0
        } else {
            (playable_cells - remaining_gaps) as f64 / playable_cells as f64
        };

        let mut games_by_team = HashMap::new();
        let mut back_to_back_by_team = HashMap::new();
        for (team_id, mut games) in schedule.games_by_team() {
            games.sort_by_key(|g| g.time_slot.offset_from(start));
            let b2b = games
                .windows(2)
                .filter(|w| w[0].time_slot.distance(w[1].time_slot) <= CONSECUTIVE_WINDOW_MINUTES)
                .count();
            games_by_team.insert(team_id.to_string(), games.len());
            back_to_back_by_team.insert(team_id.to_string(), b2b);
        }

        let mut games_by_referee: HashMap<String, usize> = HashMap::new();
        let mut unrefereed = 0;
        for g in &schedule.games {
            match &g.referee_id {
                Some(r) => *games_by_referee.entry(r.clone()).or_insert(0) += 1,
                None => unrefereed += 1,
            }
        }

        Self {
            game_count: schedule.game_count(),
            slots_used: slots.len(),
            first_slot: slots.first().copied(),
            last_slot: slots.last().copied(),
            playable_cells,
            remaining_gaps,
            court_utilization,
            games_by_team,
            back_to_back_by_team,
            games_by_referee,
            unrefereed,
        }
    }

    /// Largest back-to-back count of any team.
    pub fn max_back_to_back(&self) -> usize {
        self.back_to_back_by_team.values().copied().max().unwrap_or(0)
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_back_to_back: usize, min_utilization: f64) -> bool {
        self.max_back_to_back() <= max_back_to_back && self.court_utilization >= min_utilization
    }
}
