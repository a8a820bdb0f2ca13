//! End-to-end schedule generation.
//!
//! # Pipeline
//!
//! 1. Enumerate matchups ([`generate_matchups`]) and shuffle them.
//! 2. Place them greedily ([`GreedyAssigner`]), extending the horizon as needed.
//! 3. Drop duplicate pairings within a pool.
//! 4. Compact the grid ([`GapEliminator`]).
//! 5. Recompute referees ([`RefereeAssigner`]).
//! 6. Run the batch validators and log whatever they find.
//!
//! Validation findings never fail generation; they are returned in
//! [`GenerationOutcome::violations`] and logged at `warn`.

use std::collections::HashSet;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::gaps::{GapEliminator, GapReport};
use super::greedy::{BalancedScorer, GreedyAssigner, SlotScorer};
use super::matchups::{generate_matchups, Matchup};
use super::referees::RefereeAssigner;
use super::slots::TimeSlotSequencer;
use crate::models::{Game, Schedule, TimeSlot, TournamentConfig, Violation};
use crate::validation::{validate_referees, validate_schedule};

/// Everything a generation run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    /// The generated schedule.
    pub schedule: Schedule,
    /// Slots considered during placement (base horizon plus extensions),
    /// break slots included.
    pub horizon: Vec<TimeSlot>,
    /// Gap elimination statistics.
    pub gap_report: GapReport,
    /// Batch validation findings on the final schedule.
    pub violations: Vec<Violation>,
    /// Matchups that did not fit within one day of the start time.
    pub unplaced: Vec<Matchup>,
}

/// Round-robin tournament scheduler.
///
/// Owns the randomness used to shuffle matchups; seed it for reproducible
/// output.
///
/// # Example
///
/// ```
/// use u_tournament::models::{Team, TournamentConfig};
/// use u_tournament::scheduler::TournamentScheduler;
///
/// let config = TournamentConfig::new()
///     .with_courts(2)
///     .with_teams(["A", "B", "C", "D"].map(|id| Team::new(id, id)));
///
/// let schedule = TournamentScheduler::with_seed(42).generate(&config);
/// assert_eq!(schedule.game_count(), 6);
/// ```
#[derive(Debug)]
pub struct TournamentScheduler<R: Rng = SmallRng> {
    rng: R,
    scorer: Box<dyn SlotScorer>,
}

impl TournamentScheduler<SmallRng> {
    /// Creates a scheduler seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_os_rng())
    }

    /// Creates a reproducible scheduler.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl Default for TournamentScheduler<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> TournamentScheduler<R> {
    /// Creates a scheduler drawing from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            scorer: Box::new(BalancedScorer),
        }
    }

    /// Replaces the placement scorer.
    pub fn with_scorer(mut self, scorer: impl SlotScorer + 'static) -> Self {
        self.scorer = Box::new(scorer);
        self
    }

    /// Generates a schedule.
    pub fn generate(&mut self, config: &TournamentConfig) -> Schedule {
        self.generate_with_report(config).schedule
    }

    /// Generates a schedule and reports how it was built.
    pub fn generate_with_report(&mut self, config: &TournamentConfig) -> GenerationOutcome {
        info!(
            event = "generation_started",
            teams = config.teams.len(),
            referees = config.referees.len(),
            courts = config.courts,
            pools = config.pools,
            scorer = self.scorer.name(),
        );

        let mut matchups = generate_matchups(&config.teams, config.pools);
        matchups.shuffle(&mut self.rng);

        let placed = GreedyAssigner::new(config, self.scorer.as_ref()).assign(&matchups);
        if placed.extensions > 0 {
            info!(event = "horizon_extended", extensions = placed.extensions);
        }
        if !placed.unplaced.is_empty() {
            warn!(event = "horizon_exhausted", unplaced = placed.unplaced.len());
        }

        let games = dedupe(placed.games);

        let sequencer = TimeSlotSequencer::from_config(config);
        let playable = sequencer.playable(&placed.slots);
        let (games, gap_report) = GapEliminator::new(config.courts, &playable).eliminate(games);
        info!(
            event = "gaps_eliminated",
            passes = gap_report.passes,
            filled = gap_report.gaps_filled,
            pushed = gap_report.pushed,
            remaining = gap_report.remaining_gaps,
        );

        let games = RefereeAssigner::from_config(config).assign(games);
        let schedule = Schedule::from_games(games);

        let mut violations = validate_schedule(&schedule);
        violations.extend(validate_referees(&schedule, config));
        for v in &violations {
            warn!(event = "schedule_violation", kind = ?v.kind, slot = %v.time_slot, "{}", v.message);
        }

        info!(
            event = "generation_finished",
            games = schedule.game_count(),
            unplaced = placed.unplaced.len(),
            slots = schedule.time_slots(config.start_time).len(),
            violations = violations.len(),
        );

        GenerationOutcome {
            schedule,
            horizon: placed.slots,
            gap_report,
            violations,
            unplaced: placed.unplaced,
        }
    }
}

/// Keeps the first game of every (pool, pair).
fn dedupe(games: Vec<Game>) -> Vec<Game> {
    let mut seen: HashSet<(Option<u32>, String, String)> = HashSet::new();
    let before = games.len();
    let kept: Vec<Game> = games
        .into_iter()
        .filter(|g| {
            let (a, b) = g.pair_key();
            seen.insert((g.pool, a.to_string(), b.to_string()))
        })
        .collect();
    if kept.len() < before {
        debug!(event = "duplicates_dropped", dropped = before - kept.len());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Referee, Team, TournamentBreak};
    use crate::scheduler::greedy::TeamHistory;
    use std::collections::HashSet;

    fn t(h: u32, m: u32) -> TimeSlot {
        TimeSlot::from_hm(h, m)
    }

    fn config(n_teams: usize, courts: u32) -> TournamentConfig {
        TournamentConfig::new()
            .with_courts(courts)
            .with_start_time(t(9, 0))
            .with_timing(20, 5)
            .with_teams((0..n_teams).map(|i| Team::new(format!("T{i}"), format!("Team {i}"))))
    }

    fn assert_invariants(schedule: &Schedule, config: &TournamentConfig) {
        let mut cells = HashSet::new();
        let mut team_slots = HashSet::new();
        let mut ref_slots = HashSet::new();
        for g in &schedule.games {
            assert!((1..=config.courts).contains(&g.court));
            assert!(cells.insert((g.court, g.time_slot)), "court clash at {}", g.time_slot);
            assert!(team_slots.insert((g.team1_id.clone(), g.time_slot)));
            assert!(team_slots.insert((g.team2_id.clone(), g.time_slot)));
            if let Some(r) = &g.referee_id {
                assert!(ref_slots.insert((r.clone(), g.time_slot)));
            }
            for b in &config.breaks {
                assert!(!b.overlaps(g.time_slot, config.game_duration));
            }
        }
    }

    #[test]
    fn test_full_round_robin_counts() {
        for n in 2..10usize {
            for courts in 1..4u32 {
                let c = config(n, courts);
                let s = TournamentScheduler::with_seed(n as u64).generate(&c);
                assert_eq!(s.game_count(), n * (n - 1) / 2, "n={n} courts={courts}");

                let pairs: HashSet<(String, String)> = s
                    .games
                    .iter()
                    .map(|g| {
                        let (a, b) = g.pair_key();
                        (a.to_string(), b.to_string())
                    })
                    .collect();
                assert_eq!(pairs.len(), s.game_count());
                assert_invariants(&s, &c);
            }
        }
    }

    #[test]
    fn test_four_team_example() {
        let c = config(4, 2);
        let outcome = TournamentScheduler::with_seed(1).generate_with_report(&c);
        let s = &outcome.schedule;

        assert_eq!(s.game_count(), 6);
        assert!(outcome.unplaced.is_empty());

        let at_nine: Vec<&Game> = s.games_at(t(9, 0)).collect();
        assert!(!at_nine.is_empty());
        let mut teams = HashSet::new();
        for g in at_nine {
            assert!(teams.insert(g.team1_id.as_str()));
            assert!(teams.insert(g.team2_id.as_str()));
        }
        assert!(outcome.violations.is_empty());
        assert!(outcome.gap_report.passes <= 100);
        assert_eq!(outcome.horizon[0], t(9, 0));
    }

    #[test]
    fn test_breaks_are_avoided() {
        let c = config(6, 2).with_break(TournamentBreak::new("lunch", t(10, 0), 15));
        for seed in 0..10 {
            let s = TournamentScheduler::with_seed(seed).generate(&c);
            assert_eq!(s.game_count(), 15);
            for g in &s.games {
                assert!(g.time_slot != t(9, 50), "game placed in break slot");
            }
            assert_invariants(&s, &c);
        }
    }

    #[test]
    fn test_affiliated_referee_never_on_own_team() {
        let c = config(6, 2)
            .with_referee(Referee::new("r1", "Rita").with_team("T0"))
            .with_referee(Referee::new("r2", "Ron"))
            .with_referee(Referee::new("r3", "Rae").with_team("T3"))
            .with_referee(Referee::new("r4", "Rob"));

        for seed in 0..10 {
            let outcome = TournamentScheduler::with_seed(seed).generate_with_report(&c);
            assert!(outcome.violations.is_empty(), "{:?}", outcome.violations);
            for g in outcome.schedule.games_for_referee("r1") {
                assert!(!g.involves("T0"));
            }
            assert!(validate_referees(&outcome.schedule, &c).is_empty());
        }
    }

    #[test]
    fn test_pools_stay_separate() {
        let c = TournamentConfig::new()
            .with_courts(2)
            .with_pools(2)
            .with_teams(
                ["A", "B", "C", "D"]
                    .into_iter()
                    .map(|id| Team::new(id, id).with_pool(1)),
            )
            .with_teams(["E", "F", "G"].into_iter().map(|id| Team::new(id, id).with_pool(2)));

        let s = TournamentScheduler::with_seed(3).generate(&c);
        assert_eq!(s.game_count(), 6 + 3);
        for g in &s.games {
            let p1 = c.team(&g.team1_id).and_then(|t| t.pool);
            let p2 = c.team(&g.team2_id).and_then(|t| t.pool);
            assert_eq!(p1, p2);
            assert_eq!(g.pool, p1);
        }
    }

    #[test]
    fn test_seed_reproducibility() {
        let c = config(7, 3).with_referee(Referee::new("r1", "Rita"));
        let a = TournamentScheduler::with_seed(99).generate(&c);
        let b = TournamentScheduler::with_seed(99).generate(&c);
        assert_eq!(a, b);
    }

    #[test]
    fn test_trivial_inputs() {
        let s = TournamentScheduler::with_seed(0).generate(&config(0, 2));
        assert!(s.is_empty());
        let s = TournamentScheduler::with_seed(0).generate(&config(1, 2));
        assert!(s.is_empty());
    }

    #[test]
    fn test_small_horizon_still_places_everything() {
        let c = config(6, 1).with_horizon(2);
        let outcome = TournamentScheduler::with_seed(5).generate_with_report(&c);
        assert_eq!(outcome.schedule.game_count(), 15);
        assert!(outcome.horizon.len() >= 15);
        assert_invariants(&outcome.schedule, &c);
    }

    #[test]
    fn test_horizon_never_wraps_past_one_day() {
        // Hour-long slots give 24 starts per day on one court; 45 games do not fit.
        let c = TournamentConfig::new()
            .with_courts(1)
            .with_start_time(t(9, 0))
            .with_timing(55, 5)
            .with_teams((0..10).map(|i| Team::new(format!("T{i}"), format!("Team {i}"))));
        let outcome = TournamentScheduler::with_seed(1).generate_with_report(&c);

        assert!(outcome.violations.is_empty(), "{:?}", outcome.violations);
        assert!(!outcome.unplaced.is_empty());
        assert_eq!(outcome.schedule.game_count() + outcome.unplaced.len(), 45);
        assert!(outcome.schedule.game_count() <= 24);
        assert!(outcome.horizon.len() <= 24);
        assert_invariants(&outcome.schedule, &c);
    }

    #[derive(Debug)]
    struct FlatScorer;

    impl SlotScorer for FlatScorer {
        fn name(&self) -> &'static str {
            "flat"
        }

        fn score(&self, _: &Matchup, _: TimeSlot, _: u32, _: &TeamHistory) -> i32 {
            -1
        }
    }

    #[test]
    fn test_custom_scorer() {
        let c = config(5, 2);
        let s = TournamentScheduler::with_seed(11)
            .with_scorer(FlatScorer)
            .generate(&c);
        assert_eq!(s.game_count(), 10);
        assert_invariants(&s, &c);
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let games = vec![
            Game::new("1", "A", "B", 1, t(9, 0)),
            Game::new("2", "B", "A", 2, t(9, 25)),
            Game::new("3", "A", "B", 1, t(9, 50)).with_pool(Some(2)),
        ];
        let kept = dedupe(games);
        let ids: Vec<&str> = kept.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
