//! Courier - the player-controlled delivery rider
//!
//! Tracks stamina, reputation and income, owns the order inventory, and
//! resolves deliveries against their deadlines.

pub mod delivery;
pub mod state;

pub use delivery::{DeliveryResult, DeliveryTiming};
pub use state::{Courier, CourierStats};
