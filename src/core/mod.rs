pub mod config;
pub mod error;
pub mod types;

pub use config::{GameConfig, ProviderConfig};
pub use error::{CourierError, Result};
pub use types::{Direction, GridPos, RunId, SlotId};
