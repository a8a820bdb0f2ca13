//! Time-of-day and tournament break models.
//!
//! # Time Model
//! A [`TimeSlot`] is a minute of the day in `0..1440`, written `"HH:MM"`.
//! Arithmetic wraps at 24:00. Within one tournament, "earlier" and "later"
//! are measured from the configured start time (see
//! [`TimeSlot::offset_from`]) so a schedule that runs past midnight still
//! orders correctly.
//!
//! # Breaks
//! A [`TournamentBreak`] blocks the interval `[start, start + duration)`.
//! A game starting at `s` occupies `[s, s + game_duration)`; the two conflict
//! when the game starts inside the break, ends inside the break, or spans it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TimeParseError;

/// Minutes in a day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A tick on the schedule grid, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot(u16);

impl TimeSlot {
    /// Creates a slot from minutes since midnight, wrapping at 24:00.
    pub fn from_minutes(minutes: u32) -> Self {
        Self((minutes % MINUTES_PER_DAY) as u16)
    }

    /// Creates a slot from hour and minute, wrapping at 24:00.
    pub fn from_hm(hour: u32, minute: u32) -> Self {
        Self::from_minutes(hour * 60 + minute)
    }

    /// Minutes since midnight.
    #[inline]
    pub fn minutes(&self) -> u32 {
        u32::from(self.0)
    }

    /// Hour component (0..24).
    #[inline]
    pub fn hour(&self) -> u32 {
        self.minutes() / 60
    }

    /// Minute component (0..60).
    #[inline]
    pub fn minute(&self) -> u32 {
        self.minutes() % 60
    }

    /// Shifts this slot by `delta` minutes (may be negative), wrapping at 24:00.
    pub fn add_minutes(&self, delta: i64) -> Self {
        let total = (i64::from(self.0) + delta).rem_euclid(i64::from(MINUTES_PER_DAY));
        Self(total as u16)
    }

    /// Minutes elapsed since `start`, assuming this slot is not before it.
    ///
    /// Used as the chronological sort key within a tournament.
    #[inline]
    pub fn offset_from(&self, start: TimeSlot) -> u32 {
        (self.minutes() + MINUTES_PER_DAY - start.minutes()) % MINUTES_PER_DAY
    }

    /// Shortest distance in minutes between two slots, across midnight if closer.
    pub fn distance(&self, other: TimeSlot) -> u32 {
        let d = self.minutes().abs_diff(other.minutes());
        d.min(MINUTES_PER_DAY - d)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeSlot {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| TimeParseError::new(s, "expected HH:MM"))?;
        let hour: u32 = h
            .parse()
            .map_err(|_| TimeParseError::new(s, "hour is not a number"))?;
        let minute: u32 = m
            .parse()
            .map_err(|_| TimeParseError::new(s, "minute is not a number"))?;
        if hour >= 24 {
            return Err(TimeParseError::new(s, "hour out of range"));
        }
        if minute >= 60 {
            return Err(TimeParseError::new(s, "minute out of range"));
        }
        Ok(Self::from_hm(hour, minute))
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

/// A scheduled pause during which no game may be played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentBreak {
    /// Unique break identifier.
    pub id: String,
    /// Break start.
    pub start_time: TimeSlot,
    /// Break length in minutes.
    pub duration: u32,
}

impl TournamentBreak {
    /// Creates a new break.
    pub fn new(id: impl Into<String>, start_time: TimeSlot, duration: u32) -> Self {
        Self {
            id: id.into(),
            start_time,
            duration,
        }
    }

    /// End of the break (exclusive).
    pub fn end_time(&self) -> TimeSlot {
        self.start_time.add_minutes(i64::from(self.duration))
    }

    /// Whether a game starting at `slot` and lasting `game_duration` minutes
    /// collides with this break.
    pub fn overlaps(&self, slot: TimeSlot, game_duration: u32) -> bool {
        let s = slot.minutes();
        let game_end = s.saturating_add(game_duration);
        let b = self.start_time.minutes();
        let break_end = b.saturating_add(self.duration);

        (s >= b && s < break_end)
            || (game_end > b && game_end <= break_end)
            || (s <= b && game_end >= break_end)
    }
}

/// Whether `slot` collides with any of `breaks`.
pub fn is_during_breaks(slot: TimeSlot, breaks: &[TournamentBreak], game_duration: u32) -> bool {
    breaks.iter().any(|b| b.overlaps(slot, game_duration))
}
