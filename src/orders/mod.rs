//! Orders - job records, the carried inventory, and the job board

pub mod board;
pub mod order;
pub mod queue;

pub use board::OrderBoard;
pub use order::{Order, OrderId};
pub use queue::{OrderQueue, DEFAULT_MAX_WEIGHT};
