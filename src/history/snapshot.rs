//! Point-in-time copies of the run state
//!
//! Snapshots feed the undo ring; `SaveState` is the durable save slot layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::{iso_timestamp, GridPos, RunId};
use crate::courier::{Courier, CourierStats};
use crate::orders::Order;
use crate::weather::WeatherCondition;

/// One undo step. Captured by value so later mutation cannot leak in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub courier: CourierStats,
    /// Carried orders in sequence order
    pub orders: Vec<Order>,
    pub elapsed_time: f64,
    pub weather: WeatherCondition,
}

impl Snapshot {
    pub fn capture(courier: &Courier, elapsed_time: f64, weather: &WeatherCondition) -> Self {
        Self {
            courier: courier.stats(),
            orders: courier.queue().orders().to_vec(),
            elapsed_time,
            weather: weather.clone(),
        }
    }

    pub fn position(&self) -> GridPos {
        self.courier.position
    }
}

/// Courier section of a save slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPlayer {
    pub x: i32,
    pub y: i32,
    pub stamina: f64,
    pub reputation: i32,
    pub total_income: f64,
    pub income_goal: f64,
    #[serde(default)]
    pub exhausted: bool,
    #[serde(default)]
    pub streak: u32,
    #[serde(default = "default_true")]
    pub forgiveness_available: bool,
}

fn default_true() -> bool {
    true
}

impl SavedPlayer {
    pub fn from_courier(courier: &Courier) -> Self {
        let stats = courier.stats();
        Self {
            x: stats.position.x,
            y: stats.position.y,
            stamina: stats.stamina,
            reputation: stats.reputation,
            total_income: stats.total_income,
            income_goal: courier.income_goal(),
            exhausted: stats.exhausted,
            streak: stats.streak,
            forgiveness_available: stats.forgiveness_available,
        }
    }

    pub fn stats(&self) -> CourierStats {
        CourierStats {
            position: GridPos::new(self.x, self.y),
            stamina: self.stamina,
            reputation: self.reputation,
            total_income: self.total_income,
            exhausted: self.exhausted,
            streak: self.streak,
            forgiveness_available: self.forgiveness_available,
        }
    }
}

/// Full save slot contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    pub player: SavedPlayer,
    pub inventory: Vec<Order>,
    pub elapsed_time: f64,
    pub weather_state: WeatherCondition,
    pub weather_timer: f64,
    #[serde(with = "iso_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub run_id: Option<RunId>,
}
