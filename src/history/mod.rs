//! History - undo ring, save slots and the leaderboard

pub mod leaderboard;
pub mod ledger;
pub mod snapshot;
pub mod store;

pub use leaderboard::{Leaderboard, ScoreEntry};
pub use ledger::HistoryLedger;
pub use snapshot::{SaveState, SavedPlayer, Snapshot};
pub use store::SaveStore;
