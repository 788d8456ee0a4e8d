//! Delivery outcome scoring
//!
//! Reputation moves with how a delivery lands against its deadline:
//! early and on-time deliveries build a streak, late ones cost more the
//! later they are.

use serde::{Deserialize, Serialize};

use crate::orders::order::Order;

pub const EARLY_BONUS: i32 = 5;
pub const ON_TIME_BONUS: i32 = 3;
pub const STREAK_BONUS: i32 = 2;
/// Consecutive on-time deliveries that earn the streak bonus
pub const STREAK_LENGTH: u32 = 3;

pub const SLIGHTLY_LATE_PENALTY: i32 = -2;
pub const LATE_PENALTY: i32 = -5;
pub const VERY_LATE_PENALTY: i32 = -10;
pub const CANCEL_PENALTY: i32 = -4;

/// Nominal time budget of an order, used for the "early" window
pub const ORDER_BASE_TIME_SECS: f64 = 600.0;
/// Share of the budget left at delivery that counts as early
pub const EARLY_FRACTION: f64 = 0.20;
pub const SLIGHTLY_LATE_SECS: f64 = 30.0;
pub const LATE_SECS: f64 = 120.0;

/// Minimum reputation for the one-time late forgiveness
pub const FORGIVENESS_MIN_REPUTATION: i32 = 85;
/// Reputation at which payouts and speed get a bonus
pub const HIGH_REPUTATION: i32 = 90;
pub const HIGH_REPUTATION_PAYOUT: f64 = 1.05;

/// How a delivery landed against its deadline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DeliveryTiming {
    Early,
    OnTime,
    Late { seconds: f64 },
}

impl DeliveryTiming {
    /// Classify from seconds left before the deadline (negative when late)
    pub fn classify(seconds_left: f64) -> Self {
        if seconds_left >= 0.0 {
            if seconds_left >= EARLY_FRACTION * ORDER_BASE_TIME_SECS {
                Self::Early
            } else {
                Self::OnTime
            }
        } else {
            Self::Late {
                seconds: -seconds_left,
            }
        }
    }

    pub fn is_late(&self) -> bool {
        matches!(self, Self::Late { .. })
    }

    /// Reputation change before forgiveness and streak adjustments
    pub fn base_reputation_change(&self) -> i32 {
        match *self {
            Self::Early => EARLY_BONUS,
            Self::OnTime => ON_TIME_BONUS,
            Self::Late { seconds } if seconds <= SLIGHTLY_LATE_SECS => SLIGHTLY_LATE_PENALTY,
            Self::Late { seconds } if seconds <= LATE_SECS => LATE_PENALTY,
            Self::Late { .. } => VERY_LATE_PENALTY,
        }
    }
}

/// Halve a penalty, rounding toward zero (-5 becomes -2)
pub fn forgive(penalty: i32) -> i32 {
    penalty / 2
}

/// Result of a completed delivery
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryResult {
    pub order: Order,
    /// Amount actually credited
    pub payout: f64,
    pub reputation_change: i32,
    pub timing: DeliveryTiming,
}
