//! Time slot sequencing.
//!
//! Slots start at the configured start time and advance by
//! `game_duration + break_between_games` minutes. The base horizon is
//! extended one slot at a time when the assigner runs out of room, up to
//! the last slot that starts within 24 hours of the start time.
//!
//! Break slots stay in the sequence (they are rendered as break rows) but
//! are never used for placement.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{
    is_during_breaks, Schedule, TimeSlot, TournamentBreak, TournamentConfig, MINUTES_PER_DAY,
};

/// Minimum number of rows in a rendered grid.
pub const MIN_GRID_ROWS: usize = 8;

/// One row of a rendered schedule grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRow {
    /// Row start time.
    pub time_slot: TimeSlot,
    /// Whether the row collides with a tournament break.
    pub is_break: bool,
}

/// Produces and classifies time slots for one tournament.
#[derive(Debug, Clone)]
pub struct TimeSlotSequencer<'a> {
    start: TimeSlot,
    step: u32,
    game_duration: u32,
    breaks: &'a [TournamentBreak],
}

impl<'a> TimeSlotSequencer<'a> {
    /// Creates a sequencer from explicit parameters.
    pub fn new(
        start: TimeSlot,
        game_duration: u32,
        break_between_games: u32,
        breaks: &'a [TournamentBreak],
    ) -> Self {
        Self {
            start,
            step: game_duration.saturating_add(break_between_games),
            game_duration,
            breaks,
        }
    }

    /// Creates a sequencer for a tournament.
    pub fn from_config(config: &'a TournamentConfig) -> Self {
        Self::new(
            config.start_time,
            config.game_duration,
            config.break_between_games,
            &config.breaks,
        )
    }

    /// First slot of the tournament.
    #[inline]
    pub fn start(&self) -> TimeSlot {
        self.start
    }

    /// Minutes between slot starts.
    #[inline]
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Number of slots that start within one day of the start time.
    pub fn day_slots(&self) -> usize {
        if self.step == 0 {
            1
        } else {
            MINUTES_PER_DAY.div_ceil(self.step) as usize
        }
    }

    /// The first `count` slots, capped at [`Self::day_slots`].
    pub fn base(&self, count: usize) -> Vec<TimeSlot> {
        std::iter::successors(Some(self.start), |&s| Some(self.next_after(s)))
            .take(count.min(self.day_slots()))
            .collect()
    }

    /// The slot following `slot`.
    #[inline]
    pub fn next_after(&self, slot: TimeSlot) -> TimeSlot {
        slot.add_minutes(i64::from(self.step))
    }

    /// The slot following `slot`, unless it would start a day or more after
    /// the tournament start.
    pub fn next_within_day(&self, slot: TimeSlot) -> Option<TimeSlot> {
        let next = self.next_after(slot);
        (self.step > 0 && next.offset_from(self.start) > slot.offset_from(self.start))
            .then_some(next)
    }

    /// The slot preceding `slot`.
    #[inline]
    pub fn previous_before(&self, slot: TimeSlot) -> TimeSlot {
        slot.add_minutes(-i64::from(self.step))
    }

    /// Whether a game starting at `slot` would collide with a break.
    #[inline]
    pub fn is_break(&self, slot: TimeSlot) -> bool {
        is_during_breaks(slot, self.breaks, self.game_duration)
    }

    /// The slots of `slots` that can host games, in the same order.
    pub fn playable(&self, slots: &[TimeSlot]) -> Vec<TimeSlot> {
        slots.iter().copied().filter(|&s| !self.is_break(s)).collect()
    }

    /// Playable slots from the start through the last slot that holds a game.
    ///
    /// This is the region over which gaps are counted.
    pub fn playable_span(&self, schedule: &Schedule) -> Vec<TimeSlot> {
        let Some(last) = schedule
            .games
            .iter()
            .map(|g| g.time_slot.offset_from(self.start))
            .max()
        else {
            return Vec::new();
        };
        if self.step == 0 {
            return self.playable(&[self.start]);
        }
        let count = (last / self.step) as usize + 1;
        self.playable(&self.base(count))
    }

    /// Rows of a schedule grid.
    ///
    /// The union of every slot holding a game, every break start and the
    /// caller's `extra` slots, in tournament order, padded by stepping from
    /// the last row to at least [`MIN_GRID_ROWS`] rows.
    pub fn grid_rows(&self, schedule: &Schedule, extra: &[TimeSlot]) -> Vec<GridRow> {
        let keyed: BTreeSet<(u32, TimeSlot)> = schedule
            .games
            .iter()
            .map(|g| g.time_slot)
            .chain(self.breaks.iter().map(|b| b.start_time))
            .chain(extra.iter().copied())
            .map(|s| (s.offset_from(self.start), s))
            .collect();
        let mut slots: Vec<TimeSlot> = keyed.into_iter().map(|(_, s)| s).collect();

        if slots.is_empty() {
            slots.push(self.start);
        }
        if self.step > 0 {
            while slots.len() < MIN_GRID_ROWS {
                let last = slots[slots.len() - 1];
                slots.push(self.next_after(last));
            }
        }

        slots
            .into_iter()
            .map(|time_slot| GridRow {
                time_slot,
                is_break: self.is_break(time_slot),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Game;

    fn t(h: u32, m: u32) -> TimeSlot {
        TimeSlot::from_hm(h, m)
    }

    #[test]
    fn test_base_sequence() {
        let seq = TimeSlotSequencer::new(t(9, 0), 20, 5, &[]);
        let slots = seq.base(4);
        let text: Vec<String> = slots.iter().map(|s| s.to_string()).collect();
        assert_eq!(text, vec!["09:00", "09:25", "09:50", "10:15"]);
        assert_eq!(seq.base(30).len(), 30);
    }

    #[test]
    fn test_base_stops_at_one_day() {
        let seq = TimeSlotSequencer::new(t(9, 0), 55, 5, &[]);
        assert_eq!(seq.day_slots(), 24);
        let slots = seq.base(30);
        assert_eq!(slots.len(), 24);
        assert_eq!(slots[23], t(8, 0));

        assert_eq!(seq.next_within_day(t(7, 0)), Some(t(8, 0)));
        assert_eq!(seq.next_within_day(t(8, 0)), None);

        let stalled = TimeSlotSequencer::new(t(9, 0), 0, 0, &[]);
        assert_eq!(stalled.base(5), vec![t(9, 0)]);
        assert_eq!(stalled.next_within_day(t(9, 0)), None);
    }

    #[test]
    fn test_extreme_timing_does_not_overflow() {
        let seq = TimeSlotSequencer::new(t(9, 0), u32::MAX, u32::MAX, &[]);
        assert_eq!(seq.step(), u32::MAX);
        assert_eq!(seq.day_slots(), 1);
        assert_eq!(seq.base(3), vec![t(9, 0)]);
    }

    #[test]
    fn test_extension_matches_base() {
        let seq = TimeSlotSequencer::new(t(9, 0), 20, 5, &[]);
        let base = seq.base(3);
        assert_eq!(seq.next_after(base[2]), seq.base(4)[3]);
        assert_eq!(seq.previous_before(base[1]), base[0]);
    }

    #[test]
    fn test_sequence_wraps_midnight() {
        let seq = TimeSlotSequencer::new(t(23, 30), 20, 5, &[]);
        let slots = seq.base(3);
        assert_eq!(slots[2].to_string(), "00:20");
    }

    #[test]
    fn test_break_slots_are_skipped() {
        // Break 10:00-10:15 with 20-minute games.
        let breaks = vec![TournamentBreak::new("b", t(10, 0), 15)];
        let seq = TimeSlotSequencer::new(t(9, 0), 20, 5, &breaks);
        let slots = seq.base(5);
        let playable = seq.playable(&slots);

        assert!(seq.is_break(t(9, 50)));
        assert!(!seq.is_break(t(10, 15)));
        assert_eq!(playable, vec![t(9, 0), t(9, 25), t(10, 15), t(10, 40)]);
    }

    #[test]
    fn test_playable_span() {
        let breaks = vec![TournamentBreak::new("b", t(9, 25), 10)];
        let seq = TimeSlotSequencer::new(t(9, 0), 20, 5, &breaks);
        let s = Schedule::from_games(vec![Game::new("1", "A", "B", 1, t(10, 15))]);
        assert_eq!(seq.playable_span(&s), vec![t(9, 0), t(9, 50), t(10, 15)]);
        assert!(seq.playable_span(&Schedule::new()).is_empty());
    }

    #[test]
    fn test_grid_rows_pad_and_flag_breaks() {
        let breaks = vec![TournamentBreak::new("lunch", t(9, 50), 25)];
        let seq = TimeSlotSequencer::new(t(9, 0), 20, 5, &breaks);
        let s = Schedule::from_games(vec![
            Game::new("1", "A", "B", 1, t(9, 0)),
            Game::new("2", "C", "D", 1, t(9, 25)),
        ]);
        let rows = seq.grid_rows(&s, &[t(10, 15)]);

        assert_eq!(rows.len(), MIN_GRID_ROWS);
        assert_eq!(rows[0].time_slot, t(9, 0));
        assert_eq!(rows[2].time_slot, t(9, 50));
        assert!(rows[2].is_break);
        assert_eq!(rows[3].time_slot, t(10, 15));
        assert!(!rows[3].is_break);
        assert_eq!(rows[4].time_slot, t(10, 40));
    }

    #[test]
    fn test_grid_rows_empty_schedule() {
        let seq = TimeSlotSequencer::new(t(9, 0), 20, 5, &[]);
        let rows = seq.grid_rows(&Schedule::new(), &[]);
        assert_eq!(rows.len(), MIN_GRID_ROWS);
        assert_eq!(rows[0].time_slot, t(9, 0));
    }
}
