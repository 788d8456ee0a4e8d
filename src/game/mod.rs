//! Game orchestration - wires the courier, city, weather and history together

pub mod action;
pub mod session;

pub use action::{Action, Command, SortKey};
pub use session::{ActionOutcome, EndReason, Game, GameEvent, GameOutcome};
