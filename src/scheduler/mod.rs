//! Schedule generation and KPI evaluation.
//!
//! Builds a complete round-robin schedule from a [`TournamentConfig`] and
//! summarizes schedule quality.
//!
//! # Algorithm
//!
//! `TournamentScheduler` runs a fixed pipeline: matchup enumeration,
//! shuffle, greedy placement with a pluggable [`SlotScorer`], gap
//! elimination, referee assignment and batch validation. The greedy step is
//! not optimal; the compaction passes recover most of the empty cells it
//! leaves behind.
//!
//! # KPI
//!
//! `ScheduleKpi` reports court utilization, remaining gaps, back-to-back
//! games per team and referee load.
//!
//! [`TournamentConfig`]: crate::models::TournamentConfig

mod gaps;
mod generator;
mod greedy;
mod kpi;
mod matchups;
mod referees;
mod slots;

pub use gaps::{GapEliminator, GapReport, MAX_PASSES};
pub use generator::{GenerationOutcome, TournamentScheduler};
pub use greedy::{
    BalancedScorer, GreedyAssigner, GreedyResult, SlotScorer, TeamHistory,
    CONSECUTIVE_WINDOW_MINUTES,
};
pub use kpi::ScheduleKpi;
pub use matchups::{generate_matchups, Matchup};
pub use referees::RefereeAssigner;
pub use slots::{GridRow, TimeSlotSequencer, MIN_GRID_ROWS};
