//! Gap elimination (post-placement compaction).
//!
//! # Algorithm
//!
//! A gap is an empty (court, slot) cell among the playable slots of the
//! horizon, trailing slots included.
//!
//! 1. **Relocation passes** (at most [`MAX_PASSES`]): visit every gap in
//!    chronological order and search every other playable slot, also in
//!    chronological order, for a game whose two teams are both free at the
//!    gap's slot. Relocate the first such game (court and slot only). Stop
//!    when a pass moves nothing or no gap remains.
//! 2. **Compaction push**: if gaps remain, for each slot that is not full,
//!    in chronological order, pull games from later slots into its empty
//!    courts under the same team-availability rule.
//!
//! Relocation may move a game later as well as earlier, and the cell it
//! leaves becomes a gap for the slots still to be visited. The push is what
//! packs games toward the start; residual gaps are valid output.
//!
//! Referees are left stale; [`super::RefereeAssigner`] must run afterwards.
//! Relocation ignores the back-to-back spacing the placement scorer aims
//! for: full courts take priority.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use tracing::debug;

use crate::models::{Game, TimeSlot};

/// Upper bound on relocation passes.
pub const MAX_PASSES: usize = 100;

/// Statistics of one elimination run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapReport {
    /// Relocation passes executed.
    pub passes: usize,
    /// Relocations performed by the passes (one game moved per gap).
    pub gaps_filled: usize,
    /// Games moved by the compaction push.
    pub pushed: usize,
    /// Games whose final cell differs from their original one.
    pub games_moved: usize,
    /// Gaps left over.
    pub remaining_gaps: usize,
}

/// Compacts a placed schedule.
#[derive(Debug, Clone)]
pub struct GapEliminator<'a> {
    courts: u32,
    slots: &'a [TimeSlot],
    max_passes: usize,
}

impl<'a> GapEliminator<'a> {
    /// Creates an eliminator over `playable` slots (chronological, no breaks).
    pub fn new(courts: u32, playable: &'a [TimeSlot]) -> Self {
        Self {
            courts: courts.max(1),
            slots: playable,
            max_passes: MAX_PASSES,
        }
    }

    /// Overrides the pass cap.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Runs relocation passes and the compaction push.
    pub fn eliminate(&self, mut games: Vec<Game>) -> (Vec<Game>, GapReport) {
        let before: Vec<(u32, TimeSlot)> = games.iter().map(|g| (g.court, g.time_slot)).collect();
        let mut report = GapReport::default();
        let mut remaining = self.gap_count(&games);

        while remaining > 0 && report.passes < self.max_passes {
            report.passes += 1;
            let filled = self.relocation_pass(&mut games);
            report.gaps_filled += filled;
            remaining = self.gap_count(&games);

            debug!(
                event = "gap_pass",
                pass = report.passes,
                filled,
                remaining,
            );

            if filled == 0 {
                break;
            }
        }

        if remaining > 0 {
            report.pushed = self.compaction_push(&mut games);
        }
        report.games_moved = games
            .iter()
            .zip(&before)
            .filter(|(g, cell)| (g.court, g.time_slot) != **cell)
            .count();
        report.remaining_gaps = self.gap_count(&games);
        (games, report)
    }

    /// Empty cells over every playable slot.
    pub fn gap_count(&self, games: &[Game]) -> usize {
        self.slots
            .iter()
            .map(|&slot| {
                let used: HashSet<u32> = games
                    .iter()
                    .filter(|g| g.time_slot == slot)
                    .map(|g| g.court)
                    .collect();
                (self.courts as usize).saturating_sub(used.len())
            })
            .sum()
    }

    fn relocation_pass(&self, games: &mut [Game]) -> usize {
        let mut filled = 0;

        for &target in self.slots {
            let (mut courts_used, mut teams_busy) = occupancy(games, target);

            for court in 1..=self.courts {
                if courts_used.contains(&court) {
                    continue;
                }
                let candidate = self
                    .slots
                    .iter()
                    .filter(|&&source| source != target)
                    .find_map(|&source| {
                        games
                            .iter()
                            .position(|g| g.time_slot == source && is_free(g, &teams_busy))
                    });
                let Some(i) = candidate else {
                    continue;
                };

                let game = &mut games[i];
                debug!(
                    event = "game_relocated",
                    game = %game.id,
                    from = %game.time_slot,
                    to = %target,
                    court,
                );
                game.time_slot = target;
                game.court = court;
                courts_used.insert(court);
                teams_busy.insert(game.team1_id.clone());
                teams_busy.insert(game.team2_id.clone());
                filled += 1;
            }
        }

        filled
    }

    fn compaction_push(&self, games: &mut [Game]) -> usize {
        let mut pushed = 0;

        for target_idx in 0..self.slots.len() {
            let target = self.slots[target_idx];
            let (mut courts_used, mut teams_busy) = occupancy(games, target);
            if courts_used.len() >= self.courts as usize {
                continue;
            }

            'sources: for &source in &self.slots[target_idx + 1..] {
                for i in 0..games.len() {
                    if games[i].time_slot != source || !is_free(&games[i], &teams_busy) {
                        continue;
                    }
                    let Some(court) = (1..=self.courts).find(|c| !courts_used.contains(c)) else {
                        break 'sources;
                    };
                    let game = &mut games[i];
                    game.time_slot = target;
                    game.court = court;
                    courts_used.insert(court);
                    teams_busy.insert(game.team1_id.clone());
                    teams_busy.insert(game.team2_id.clone());
                    pushed += 1;

                    if courts_used.len() >= self.courts as usize {
                        break 'sources;
                    }
                }
            }
        }

        pushed
    }
}

fn occupancy(games: &[Game], slot: TimeSlot) -> (HashSet<u32>, HashSet<String>) {
    let mut courts = HashSet::new();
    let mut teams = HashSet::new();
    for g in games.iter().filter(|g| g.time_slot == slot) {
        courts.insert(g.court);
        teams.insert(g.team1_id.clone());
        teams.insert(g.team2_id.clone());
    }
    (courts, teams)
}

fn is_free(game: &Game, teams_busy: &HashSet<String>) -> bool {
    !teams_busy.contains(&game.team1_id) && !teams_busy.contains(&game.team2_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> TimeSlot {
        TimeSlot::from_hm(h, m)
    }

    fn slots() -> Vec<TimeSlot> {
        vec![t(9, 0), t(9, 25), t(9, 50), t(10, 15), t(10, 40)]
    }

    fn pairs(games: &[Game]) -> Vec<(String, String)> {
        let mut p: Vec<(String, String)> = games
            .iter()
            .map(|g| (g.team1_id.clone(), g.team2_id.clone()))
            .collect();
        p.sort();
        p
    }

    #[test]
    fn test_takes_first_free_game_in_slot_order() {
        let s = vec![t(9, 0), t(9, 25), t(9, 50)];
        let games = vec![
            Game::new("1", "A", "B", 1, t(9, 25)),
            Game::new("2", "C", "D", 1, t(9, 50)),
        ];
        let (out, report) = GapEliminator::new(1, &s).eliminate(games.clone());

        // Each pass moves "1" into 09:00 and back into 09:25, so the passes
        // run to the cap and the push packs the games from the front.
        assert_eq!(report.passes, MAX_PASSES);
        assert_eq!(report.gaps_filled, 2 * MAX_PASSES);
        assert_eq!(report.pushed, 2);
        assert_eq!(report.games_moved, 2);
        assert_eq!(report.remaining_gaps, 1);

        assert_eq!(pairs(&out), pairs(&games));
        let slot_of = |id: &str| out.iter().find(|g| g.id == id).unwrap().time_slot;
        assert_eq!(slot_of("1"), t(9, 0));
        assert_eq!(slot_of("2"), t(9, 25));
    }

    #[test]
    fn test_single_pass_searches_earlier_slots_too() {
        let s = vec![t(9, 0), t(9, 25), t(9, 50)];
        let mut games = vec![
            Game::new("1", "A", "B", 1, t(9, 0)),
            Game::new("2", "C", "D", 1, t(9, 25)),
            Game::new("3", "E", "F", 2, t(9, 25)),
            Game::new("4", "G", "H", 1, t(9, 50)),
        ];
        let eliminator = GapEliminator::new(2, &s);
        assert_eq!(eliminator.gap_count(&games), 2);

        // 09:00 court 2 takes "2" (09:25 is searched before 09:50), then
        // 09:25 court 1 takes "1" from 09:00 and 09:50 court 2 takes "2".
        let filled = eliminator.relocation_pass(&mut games);
        assert_eq!(filled, 3);
        let cell = |id: &str| {
            let g = games.iter().find(|g| g.id == id).unwrap();
            (g.court, g.time_slot)
        };
        assert_eq!(cell("1"), (1, t(9, 25)));
        assert_eq!(cell("2"), (2, t(9, 50)));
        assert_eq!(cell("3"), (2, t(9, 25)));
        assert_eq!(cell("4"), (1, t(9, 50)));
        assert_eq!(eliminator.gap_count(&games), 2);
    }

    #[test]
    fn test_one_pass_then_push() {
        let s = vec![t(9, 0), t(9, 25), t(9, 50)];
        let games = vec![
            Game::new("1", "A", "B", 1, t(9, 0)),
            Game::new("2", "C", "D", 1, t(9, 25)),
            Game::new("3", "E", "F", 2, t(9, 25)),
            Game::new("4", "G", "H", 1, t(9, 50)),
        ];
        let (out, report) = GapEliminator::new(2, &s)
            .with_max_passes(1)
            .eliminate(games);

        assert_eq!(report.passes, 1);
        assert_eq!(report.gaps_filled, 3);
        assert_eq!(report.pushed, 4);
        assert_eq!(report.games_moved, 2);
        // The empty 09:50 row still counts.
        assert_eq!(report.remaining_gaps, 2);

        let cell = |id: &str| {
            let g = out.iter().find(|g| g.id == id).unwrap();
            (g.court, g.time_slot)
        };
        assert_eq!(cell("1"), (1, t(9, 0)));
        assert_eq!(cell("3"), (2, t(9, 0)));
        assert_eq!(cell("2"), (1, t(9, 25)));
        assert_eq!(cell("4"), (2, t(9, 25)));
    }

    #[test]
    fn test_trailing_empty_slots_count_as_gaps() {
        let s = slots();
        let games = vec![
            Game::new("1", "A", "B", 1, t(9, 0)),
            Game::new("2", "C", "D", 2, t(9, 0)),
        ];
        let eliminator = GapEliminator::new(2, &s);
        assert_eq!(eliminator.gap_count(&games), 8);
        assert_eq!(eliminator.gap_count(&[]), 10);
    }

    #[test]
    fn test_respects_team_availability() {
        let s = slots();
        // Every game involves A, so nothing can share a slot.
        let games = vec![
            Game::new("1", "A", "B", 1, t(9, 0)),
            Game::new("2", "A", "C", 1, t(9, 50)),
        ];
        let (out, report) = GapEliminator::new(2, &s).eliminate(games);

        let mut seen = HashSet::new();
        for g in &out {
            assert!(seen.insert(g.time_slot), "A plays twice at {}", g.time_slot);
        }
        assert_eq!(seen, [t(9, 0), t(9, 25)].into_iter().collect());
        assert_eq!(report.remaining_gaps, 8);
    }

    #[test]
    fn test_never_changes_pairs_or_count() {
        let s = slots();
        let games = vec![
            Game::new("1", "A", "B", 1, t(9, 0)),
            Game::new("2", "C", "D", 2, t(9, 25)),
            Game::new("3", "A", "C", 1, t(10, 15)),
            Game::new("4", "B", "D", 2, t(10, 40)),
            Game::new("5", "A", "D", 1, t(10, 40)),
        ];
        let (out, report) = GapEliminator::new(2, &s).eliminate(games.clone());
        assert_eq!(pairs(&out), pairs(&games));
        assert!(report.passes <= MAX_PASSES);

        let mut cells = HashSet::new();
        let mut team_slots = HashSet::new();
        for g in &out {
            assert!(cells.insert((g.court, g.time_slot)));
            assert!(team_slots.insert((g.team1_id.clone(), g.time_slot)));
            assert!(team_slots.insert((g.team2_id.clone(), g.time_slot)));
        }
    }

    #[test]
    fn test_pass_cap() {
        let s = slots();
        let games = vec![
            Game::new("1", "A", "B", 1, t(10, 40)),
            Game::new("2", "C", "D", 1, t(10, 15)),
        ];
        let (_, report) = GapEliminator::new(1, &s)
            .with_max_passes(1)
            .eliminate(games);
        assert_eq!(report.passes, 1);
    }

    #[test]
    fn test_compaction_push_after_cap() {
        let s = slots();
        let games = vec![
            Game::new("1", "A", "B", 1, t(10, 40)),
            Game::new("2", "C", "D", 1, t(10, 15)),
        ];
        let (out, report) = GapEliminator::new(1, &s)
            .with_max_passes(0)
            .eliminate(games);
        assert_eq!(report.passes, 0);
        assert_eq!(report.pushed, 2);
        assert_eq!(report.remaining_gaps, 3);
        let used: HashSet<TimeSlot> = out.iter().map(|g| g.time_slot).collect();
        assert_eq!(used, [t(9, 0), t(9, 25)].into_iter().collect());
    }

    #[test]
    fn test_empty_schedule() {
        let s = slots();
        let (out, report) = GapEliminator::new(2, &s).eliminate(Vec::new());
        assert!(out.is_empty());
        assert_eq!(report.passes, 1);
        assert_eq!(report.gaps_filled, 0);
        assert_eq!(report.pushed, 0);
        assert_eq!(report.games_moved, 0);
        assert_eq!(report.remaining_gaps, 10);
    }
}
