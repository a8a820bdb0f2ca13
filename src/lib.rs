//! Round-robin tournament scheduling.
//!
//! Places every pairing of teams on a (time slot × court) grid, compacts the
//! grid, assigns neutral referees, and validates interactive edits.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Team`, `Referee`, `TimeSlot`,
//!   `TournamentBreak`, `TournamentConfig`, `Game`, `Schedule`, `Violation`
//! - **`scheduler`**: Generation pipeline (`TournamentScheduler`) and its
//!   stages, plus `ScheduleKpi`
//! - **`editing`**: Move validation with reason codes, referee auto-repair,
//!   and pure edit operations
//! - **`validation`**: Configuration checks and batch schedule/referee checks
//! - **`error`**: Error types for parsing, configuration loading and edits
//!
//! # Example
//!
//! ```
//! use u_tournament::models::{Referee, Team, TournamentConfig};
//! use u_tournament::scheduler::TournamentScheduler;
//! use u_tournament::validation::{validate_referees, validate_schedule};
//!
//! let config = TournamentConfig::new()
//!     .with_courts(2)
//!     .with_teams(["A", "B", "C", "D", "E"].map(|id| Team::new(id, id)))
//!     .with_referee(Referee::new("r1", "Rita").with_team("A"))
//!     .with_referee(Referee::new("r2", "Ron"));
//!
//! let schedule = TournamentScheduler::with_seed(7).generate(&config);
//! assert_eq!(schedule.game_count(), 10);
//! assert!(validate_schedule(&schedule).is_empty());
//! assert!(validate_referees(&schedule, &config).is_empty());
//! ```
//!
//! # References
//!
//! - Kendall et al. (2010), "Scheduling in sports: An annotated bibliography"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4

pub mod editing;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;
