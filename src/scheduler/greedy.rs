//! Greedy slot/court assignment.
//!
//! # Algorithm
//!
//! 1. Take matchups in the given (shuffled) order.
//! 2. Scan the horizon from a rotating cursor that advances one slot after
//!    every matchup, wrapping at the end.
//! 3. In each playable slot where both teams are free, score every free
//!    court with a [`SlotScorer`]; keep the strictly best candidate (first
//!    found wins ties).
//! 4. If no legal cell exists, extend the horizon and place the matchup on
//!    court 1 of the new slot. The horizon never wraps past 24 hours from
//!    the start time; a matchup that finds no room within the day is
//!    returned in [`GreedyResult::unplaced`].
//!
//! A provisional referee is attached to every game; the final assignment is
//! recomputed by [`super::RefereeAssigner`].
//!
//! # Complexity
//! O(m · s · c) where m=matchups, s=slots, c=courts.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use tracing::{debug, warn};

use super::matchups::Matchup;
use super::slots::TimeSlotSequencer;
use crate::models::{Game, Referee, TimeSlot, TournamentConfig};

/// Two games whose starts are at most this far apart count as back-to-back.
pub const CONSECUTIVE_WINDOW_MINUTES: u32 = 30;

/// Per-team placement history, owned by one assigner run.
#[derive(Debug, Clone, Default)]
pub struct TeamHistory {
    last_slot: HashMap<String, TimeSlot>,
    streak: HashMap<String, u32>,
    court_games: HashMap<(String, u32), u32>,
}

impl TeamHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot of the team's most recently placed game.
    pub fn last_slot(&self, team_id: &str) -> Option<TimeSlot> {
        self.last_slot.get(team_id).copied()
    }

    /// Length of the team's current run of back-to-back games.
    pub fn streak(&self, team_id: &str) -> u32 {
        self.streak.get(team_id).copied().unwrap_or(0)
    }

    /// Games the team has played on `court`.
    pub fn court_games(&self, team_id: &str, court: u32) -> u32 {
        self.court_games
            .get(&(team_id.to_string(), court))
            .copied()
            .unwrap_or(0)
    }

    /// Whether a game at `slot` would be back-to-back with the team's last one.
    pub fn is_consecutive(&self, team_id: &str, slot: TimeSlot) -> bool {
        self.last_slot(team_id)
            .is_some_and(|last| last.distance(slot) <= CONSECUTIVE_WINDOW_MINUTES)
    }

    /// Records a placement.
    pub fn record(&mut self, team_id: &str, slot: TimeSlot, court: u32) {
        let streak = if self.is_consecutive(team_id, slot) {
            self.streak(team_id) + 1
        } else {
            1
        };
        self.streak.insert(team_id.to_string(), streak);
        self.last_slot.insert(team_id.to_string(), slot);
        *self
            .court_games
            .entry((team_id.to_string(), court))
            .or_insert(0) += 1;
    }
}

/// Scores a candidate cell for a matchup.
///
/// # Score Convention
/// **Higher score = better cell.** Scores may be negative.
pub trait SlotScorer: Send + Sync + Debug {
    /// Scorer name.
    fn name(&self) -> &'static str;

    /// Evaluates placing `matchup` at (`court`, `slot`).
    fn score(&self, matchup: &Matchup, slot: TimeSlot, court: u32, history: &TeamHistory) -> i32;
}

/// Default scorer: spreads each team's games out and rotates courts.
///
/// Starting from 100, for each team: −30 if the slot is back-to-back with
/// its previous game, −50 if it is already on a streak of two or more, and
/// −5 per earlier game on the same court.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalancedScorer;

impl BalancedScorer {
    const BASE: i32 = 100;
    const CONSECUTIVE_PENALTY: i32 = 30;
    const STREAK_PENALTY: i32 = 50;
    const STREAK_LIMIT: u32 = 2;
    const COURT_REPEAT_PENALTY: i32 = 5;
}

impl SlotScorer for BalancedScorer {
    fn name(&self) -> &'static str {
        "balanced"
    }

    fn score(&self, matchup: &Matchup, slot: TimeSlot, court: u32, history: &TeamHistory) -> i32 {
        let mut score = Self::BASE;
        for team_id in [&matchup.team1_id, &matchup.team2_id] {
            if history.is_consecutive(team_id, slot) {
                score -= Self::CONSECUTIVE_PENALTY;
            }
            if history.streak(team_id) >= Self::STREAK_LIMIT {
                score -= Self::STREAK_PENALTY;
            }
            score -= history.court_games(team_id, court) as i32 * Self::COURT_REPEAT_PENALTY;
        }
        score
    }
}

/// Output of a greedy run.
#[derive(Debug, Clone)]
pub struct GreedyResult {
    /// Placed games, in placement order.
    pub games: Vec<Game>,
    /// Final horizon (base plus extensions), in tournament order.
    pub slots: Vec<TimeSlot>,
    /// Number of horizon extensions performed.
    pub extensions: usize,
    /// Matchups that did not fit within one day.
    pub unplaced: Vec<Matchup>,
}

/// Places matchups on the grid. One instance per generation run.
#[derive(Debug)]
pub struct GreedyAssigner<'a> {
    courts: u32,
    referees: &'a [Referee],
    sequencer: TimeSlotSequencer<'a>,
    scorer: &'a dyn SlotScorer,
    slots: Vec<TimeSlot>,
    busy_teams: HashMap<TimeSlot, HashSet<String>>,
    busy_courts: HashMap<TimeSlot, HashSet<u32>>,
    busy_refs: HashMap<TimeSlot, HashSet<String>>,
    history: TeamHistory,
    cursor: usize,
    extensions: usize,
    games: Vec<Game>,
    unplaced: Vec<Matchup>,
}

impl<'a> GreedyAssigner<'a> {
    /// Creates an assigner over the configured base horizon.
    pub fn new(config: &'a TournamentConfig, scorer: &'a dyn SlotScorer) -> Self {
        let sequencer = TimeSlotSequencer::from_config(config);
        let slots = sequencer.base(config.horizon.max(1));
        Self {
            courts: config.courts.max(1),
            referees: &config.referees,
            sequencer,
            scorer,
            slots,
            busy_teams: HashMap::new(),
            busy_courts: HashMap::new(),
            busy_refs: HashMap::new(),
            history: TeamHistory::new(),
            cursor: 0,
            extensions: 0,
            games: Vec::new(),
            unplaced: Vec::new(),
        }
    }

    /// Places every matchup and returns the result.
    pub fn assign(mut self, matchups: &[Matchup]) -> GreedyResult {
        for matchup in matchups {
            match self.best_cell(matchup) {
                Some((slot, court)) => self.place(matchup, slot, court),
                None => match self.extend() {
                    Some(slot) => {
                        debug!(
                            event = "horizon_extended",
                            slot = %slot,
                            team1 = %matchup.team1_id,
                            team2 = %matchup.team2_id,
                        );
                        self.place(matchup, slot, 1);
                    }
                    None => {
                        warn!(
                            event = "matchup_unplaced",
                            team1 = %matchup.team1_id,
                            team2 = %matchup.team2_id,
                        );
                        self.unplaced.push(matchup.clone());
                    }
                },
            }
            self.cursor = (self.cursor + 1) % self.slots.len();
        }

        GreedyResult {
            games: self.games,
            slots: self.slots,
            extensions: self.extensions,
            unplaced: self.unplaced,
        }
    }

    fn best_cell(&self, matchup: &Matchup) -> Option<(TimeSlot, u32)> {
        let mut best: Option<(i32, TimeSlot, u32)> = None;
        let n = self.slots.len();

        for offset in 0..n {
            let slot = self.slots[(self.cursor + offset) % n];
            if self.sequencer.is_break(slot)
                || self.team_busy(slot, &matchup.team1_id)
                || self.team_busy(slot, &matchup.team2_id)
            {
                continue;
            }
            for court in 1..=self.courts {
                if self.court_busy(slot, court) {
                    continue;
                }
                let score = self.scorer.score(matchup, slot, court, &self.history);
                if best.map_or(true, |(s, _, _)| score > s) {
                    best = Some((score, slot, court));
                }
            }
        }

        best.map(|(_, slot, court)| (slot, court))
    }

    /// Appends the next playable slot to the horizon.
    ///
    /// Break slots met on the way are kept in the horizon but skipped.
    /// Returns `None` once the next slot would start a day after the start
    /// time: wrapped slots would reuse the keys of slots already in use.
    fn extend(&mut self) -> Option<TimeSlot> {
        let mut slot = *self.slots.last()?;
        while let Some(next) = self.sequencer.next_within_day(slot) {
            slot = next;
            self.slots.push(slot);
            self.extensions += 1;
            if !self.sequencer.is_break(slot) {
                return Some(slot);
            }
        }
        None
    }

    fn team_busy(&self, slot: TimeSlot, team_id: &str) -> bool {
        self.busy_teams
            .get(&slot)
            .is_some_and(|teams| teams.contains(team_id))
    }

    fn court_busy(&self, slot: TimeSlot, court: u32) -> bool {
        self.busy_courts
            .get(&slot)
            .is_some_and(|courts| courts.contains(&court))
    }

    fn provisional_referee(&self, matchup: &Matchup, slot: TimeSlot) -> Option<&'a Referee> {
        let busy = self.busy_refs.get(&slot);
        self.referees.iter().find(|r| {
            r.is_neutral_for(&matchup.team1_id, &matchup.team2_id)
                && !busy.is_some_and(|b| b.contains(&r.id))
        })
    }

    fn place(&mut self, matchup: &Matchup, slot: TimeSlot, court: u32) {
        let referee = self.provisional_referee(matchup, slot);
        let mut game = Game::new(
            (self.games.len() + 1).to_string(),
            matchup.team1_id.as_str(),
            matchup.team2_id.as_str(),
            court,
            slot,
        )
        .with_pool(matchup.pool);

        if let Some(r) = referee {
            game = game.with_referee(r.id.as_str());
            self.busy_refs.entry(slot).or_default().insert(r.id.clone());
        }

        let teams = self.busy_teams.entry(slot).or_default();
        teams.insert(matchup.team1_id.clone());
        teams.insert(matchup.team2_id.clone());
        self.busy_courts.entry(slot).or_default().insert(court);

        self.history.record(&matchup.team1_id, slot, court);
        self.history.record(&matchup.team2_id, slot, court);
        self.games.push(game);
    }
}
