//! Batch referee assignment.
//!
//! # Algorithm
//!
//! Every existing assignment is discarded. Occupied slots are processed in
//! tournament order and games within a slot in schedule order. A game gets
//! the first referee (in configured order) that:
//!
//! - is not affiliated with either playing team,
//! - has no other game in the same slot,
//! - did not officiate in the previous occupied slot,
//! - does not belong to a team playing anywhere in the slot.
//!
//! Games with no eligible referee stay unrefereed.

use std::collections::HashSet;

use tracing::warn;

use crate::models::{Game, Referee, Schedule, TimeSlot, TournamentConfig};

/// Recomputes referees for a whole schedule.
#[derive(Debug, Clone, Copy)]
pub struct RefereeAssigner<'a> {
    referees: &'a [Referee],
    start: TimeSlot,
}

impl<'a> RefereeAssigner<'a> {
    /// Creates an assigner; `start` anchors chronological slot order.
    pub fn new(referees: &'a [Referee], start: TimeSlot) -> Self {
        Self { referees, start }
    }

    /// Creates an assigner for a tournament.
    pub fn from_config(config: &'a TournamentConfig) -> Self {
        Self::new(&config.referees, config.start_time)
    }

    /// Returns `games` with freshly computed referees.
    pub fn assign(&self, mut games: Vec<Game>) -> Vec<Game> {
        for game in &mut games {
            game.referee_id = None;
        }

        let slots = Schedule::from_games(games.clone()).time_slots(self.start);
        let mut previous: HashSet<String> = HashSet::new();
        let mut unassigned = 0usize;

        for slot in slots {
            let playing: HashSet<String> = games
                .iter()
                .filter(|g| g.time_slot == slot)
                .flat_map(|g| [g.team1_id.clone(), g.team2_id.clone()])
                .collect();
            let mut used: HashSet<String> = HashSet::new();

            for game in games.iter_mut().filter(|g| g.time_slot == slot) {
                let pick = self.referees.iter().find(|r| {
                    r.is_neutral_for(&game.team1_id, &game.team2_id)
                        && !used.contains(&r.id)
                        && !previous.contains(&r.id)
                        && !r.team_id.as_ref().is_some_and(|t| playing.contains(t))
                });

                match pick {
                    Some(r) => {
                        used.insert(r.id.clone());
                        game.referee_id = Some(r.id.clone());
                    }
                    None => unassigned += 1,
                }
            }

            previous = used;
        }

        if unassigned > 0 && !self.referees.is_empty() {
            warn!(event = "referee_shortage", unassigned, referees = self.referees.len());
        }

        games
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_referees;

    fn t(h: u32, m: u32) -> TimeSlot {
        TimeSlot::from_hm(h, m)
    }

    fn refs() -> Vec<Referee> {
        vec![
            Referee::new("r1", "Rita").with_team("A"),
            Referee::new("r2", "Ron"),
            Referee::new("r3", "Rae"),
        ]
    }

    #[test]
    fn test_skips_affiliated_referee() {
        let referees = refs();
        let games = vec![Game::new("1", "A", "B", 1, t(9, 0))];
        let out = RefereeAssigner::new(&referees, t(9, 0)).assign(games);
        assert_eq!(out[0].referee_id.as_deref(), Some("r2"));
    }

    #[test]
    fn test_one_game_per_slot() {
        let referees = refs();
        let games = vec![
            Game::new("1", "C", "D", 1, t(9, 0)),
            Game::new("2", "E", "F", 2, t(9, 0)),
        ];
        let out = RefereeAssigner::new(&referees, t(9, 0)).assign(games);
        assert_eq!(out[0].referee_id.as_deref(), Some("r1"));
        assert_eq!(out[1].referee_id.as_deref(), Some("r2"));
    }

    #[test]
    fn test_no_back_to_back() {
        let referees = vec![Referee::new("r1", "Rita"), Referee::new("r2", "Ron")];
        let games = vec![
            Game::new("1", "A", "B", 1, t(9, 0)),
            Game::new("2", "C", "D", 1, t(9, 25)),
            Game::new("3", "A", "C", 1, t(9, 50)),
        ];
        let out = RefereeAssigner::new(&referees, t(9, 0)).assign(games);
        assert_eq!(out[0].referee_id.as_deref(), Some("r1"));
        assert_eq!(out[1].referee_id.as_deref(), Some("r2"));
        assert_eq!(out[2].referee_id.as_deref(), Some("r1"));
    }

    #[test]
    fn test_previous_slot_is_by_position() {
        // 09:25 is empty, so 09:50 follows 09:00 directly.
        let referees = vec![Referee::new("r1", "Rita"), Referee::new("r2", "Ron")];
        let games = vec![
            Game::new("1", "A", "B", 1, t(9, 0)),
            Game::new("2", "C", "D", 1, t(9, 50)),
        ];
        let out = RefereeAssigner::new(&referees, t(9, 0)).assign(games);
        assert_eq!(out[1].referee_id.as_deref(), Some("r2"));
    }

    #[test]
    fn test_own_team_playing_elsewhere() {
        let referees = vec![Referee::new("r1", "Rita").with_team("A"), Referee::new("r2", "Ron")];
        let games = vec![
            Game::new("1", "C", "D", 1, t(9, 0)),
            Game::new("2", "A", "B", 2, t(9, 0)),
        ];
        let out = RefereeAssigner::new(&referees, t(9, 0)).assign(games);
        assert_eq!(out[0].referee_id.as_deref(), Some("r2"));
        assert_eq!(out[1].referee_id, None);
    }

    #[test]
    fn test_discards_stale_assignments() {
        let referees = vec![Referee::new("r2", "Ron")];
        let games = vec![Game::new("1", "A", "B", 1, t(9, 0)).with_referee("gone")];
        let out = RefereeAssigner::new(&referees, t(9, 0)).assign(games);
        assert_eq!(out[0].referee_id.as_deref(), Some("r2"));

        let out = RefereeAssigner::new(&[], t(9, 0)).assign(out);
        assert_eq!(out[0].referee_id, None);
    }

    #[test]
    fn test_chronological_across_midnight() {
        let referees = vec![Referee::new("r1", "Rita"), Referee::new("r2", "Ron")];
        // Listed out of order; 23:55 precedes 00:20 for a 23:30 start.
        let games = vec![
            Game::new("1", "A", "B", 1, t(0, 20)),
            Game::new("2", "C", "D", 1, t(23, 55)),
        ];
        let out = RefereeAssigner::new(&referees, t(23, 30)).assign(games);
        assert_eq!(out[1].referee_id.as_deref(), Some("r1"));
        assert_eq!(out[0].referee_id.as_deref(), Some("r2"));
    }

    #[test]
    fn test_output_passes_referee_validation() {
        let config = TournamentConfig::new()
            .with_referee(Referee::new("r1", "Rita").with_team("A"))
            .with_referee(Referee::new("r2", "Ron").with_team("B"))
            .with_referee(Referee::new("r3", "Rae"));
        let games = vec![
            Game::new("1", "A", "B", 1, t(9, 0)),
            Game::new("2", "C", "D", 2, t(9, 0)),
            Game::new("3", "A", "C", 1, t(9, 25)),
            Game::new("4", "B", "D", 2, t(9, 25)),
        ];
        let out = RefereeAssigner::from_config(&config).assign(games);
        assert!(validate_referees(&Schedule::from_games(out), &config).is_empty());
    }
}
