//! Delivery orders as offered by the city job feed

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::{iso_timestamp, GridPos};

/// Unique identifier for orders, as issued by the job feed
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A delivery job. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub pickup: GridPos,
    pub dropoff: GridPos,
    pub payout: f64,
    #[serde(with = "iso_timestamp")]
    pub deadline: DateTime<Utc>,
    pub weight: f64,
    #[serde(default)]
    pub priority: u32,
    /// Simulated seconds after run start when the job is offered
    #[serde(default)]
    pub release_time: f64,
}

impl Order {
    /// Seconds left until the deadline; negative once late
    pub fn seconds_until_deadline(&self, now: DateTime<Utc>) -> f64 {
        (self.deadline - now).num_milliseconds() as f64 / 1000.0
    }

    /// Urgency key: earlier deadlines rank higher
    pub fn urgency(&self) -> i64 {
        -self.deadline.timestamp_millis()
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} prio {} ${:.0} w{} {} -> {} due {}",
            self.id,
            self.priority,
            self.payout,
            self.weight,
            self.pickup,
            self.dropoff,
            self.deadline.format("%H:%M:%S")
        )
    }
}
