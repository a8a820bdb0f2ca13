//! Tournament domain models.
//!
//! Provides the data types the engine reads (configuration, teams,
//! referees, breaks) and produces (games, schedules, violations).
//!
//! # Domain Mappings
//!
//! | u-tournament | Generic scheduling |
//! |--------------|--------------------|
//! | Team | Task owner |
//! | Game | Activity |
//! | Court | Primary resource |
//! | Referee | Secondary (human) resource |
//! | TimeSlot | Discrete start time |
//! | TournamentBreak | Blocked period |

mod config;
mod schedule;
mod team;
mod time;

pub use config::{TournamentConfig, DEFAULT_HORIZON};
pub use schedule::{Game, Schedule, ScheduleFilter, Violation, ViolationKind};
pub use team::{Referee, Team};
pub use time::{is_during_breaks, TimeSlot, TournamentBreak, MINUTES_PER_DAY};
