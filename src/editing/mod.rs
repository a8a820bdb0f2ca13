//! Interactive schedule edits.
//!
//! A UI validates a drag-and-drop with [`MoveValidator`], renders any
//! [`MoveRejection`], and commits an [`AcceptedMove`] with [`apply_move`].
//! All edits return a new [`Schedule`](crate::models::Schedule); the one
//! passed in is never touched.
//!
//! Edits are expected one at a time: the validator reads a snapshot and
//! the caller applies the result to that same snapshot.

mod moves;
mod ops;

pub use moves::{
    AcceptedMove, MoveOutcome, MovePlan, MoveRejection, MoveValidator, RefereeConflict,
    RefereeUpdate, RejectionDetails, RejectionReason,
};
pub use ops::{apply_move, available_referees, remove_game, remove_time_slot, set_referee};
