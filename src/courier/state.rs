//! The courier: position, stamina, reputation, income and carried orders

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::config::GameConfig;
use crate::core::error::Result;
use crate::core::types::GridPos;
use crate::courier::delivery::{
    forgive, DeliveryResult, DeliveryTiming, CANCEL_PENALTY, FORGIVENESS_MIN_REPUTATION,
    HIGH_REPUTATION, HIGH_REPUTATION_PAYOUT, STREAK_BONUS, STREAK_LENGTH,
};
use crate::orders::{Order, OrderQueue};
use crate::weather::WeatherCondition;

pub const MAX_STAMINA: f64 = 100.0;
pub const MAX_REPUTATION: i32 = 100;
/// Stamina needed to shake off exhaustion, and below which speed drops
pub const TIRED_STAMINA: f64 = 30.0;

pub const STAMINA_COST_BASE: f64 = 0.5;
/// Carried weight that costs nothing extra
pub const FREE_CARRY_WEIGHT: f64 = 3.0;
pub const STAMINA_COST_PER_WEIGHT: f64 = 0.2;

pub const RECOVERY_IDLE: f64 = 5.0;
pub const RECOVERY_REST_POINT: f64 = 10.0;

/// Plain copy of the courier's numbers, for snapshots and saves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourierStats {
    pub position: GridPos,
    pub stamina: f64,
    pub reputation: i32,
    pub total_income: f64,
    pub exhausted: bool,
    pub streak: u32,
    pub forgiveness_available: bool,
}

#[derive(Debug, Clone)]
pub struct Courier {
    position: GridPos,
    stamina: f64,
    reputation: i32,
    total_income: f64,
    /// Set when stamina hits 0, cleared once it is back to TIRED_STAMINA
    exhausted: bool,
    /// Consecutive deliveries that were not late
    streak: u32,
    /// One-shot halving of the first late penalty of the run
    forgiveness_available: bool,
    income_goal: f64,
    base_speed: f64,
    defeat_reputation: i32,
    queue: OrderQueue,
}

impl Courier {
    pub fn new(position: GridPos, income_goal: f64) -> Self {
        Self::with_config(position, income_goal, &GameConfig::default())
    }

    pub fn with_config(position: GridPos, income_goal: f64, config: &GameConfig) -> Self {
        Self {
            position,
            stamina: config.starting_stamina.clamp(0.0, MAX_STAMINA),
            reputation: config.starting_reputation.clamp(0, MAX_REPUTATION),
            total_income: 0.0,
            exhausted: false,
            streak: 0,
            forgiveness_available: true,
            income_goal,
            base_speed: config.base_speed,
            defeat_reputation: config.defeat_reputation,
            queue: OrderQueue::new(config.max_carry_weight),
        }
    }

    // === MOVEMENT ===

    /// Tiles per second under the given weather multiplier and tile surface.
    ///
    /// The game passes the blended multiplier while the weather is changing.
    pub fn current_speed(&self, weather_multiplier: f64, surface_weight: f64) -> f64 {
        let weight_mult = (1.0 - 0.03 * self.queue.current_weight()).max(0.8);
        let reputation_mult = if self.reputation >= HIGH_REPUTATION { 1.03 } else { 1.0 };
        let stamina_mult = if self.stamina <= 0.0 {
            0.0
        } else if self.stamina < TIRED_STAMINA {
            0.8
        } else {
            1.0
        };

        self.base_speed
            * weather_multiplier
            * weight_mult
            * reputation_mult
            * stamina_mult
            * surface_weight
    }

    /// Speed under a settled weather condition
    pub fn speed_in(&self, condition: &WeatherCondition, surface_weight: f64) -> f64 {
        self.current_speed(condition.speed_multiplier(), surface_weight)
    }

    /// Stamina cost of one step at the current load
    pub fn step_cost(&self, condition: &WeatherCondition) -> f64 {
        let weight = self.queue.current_weight();
        let mut cost = STAMINA_COST_BASE;
        if weight > FREE_CARRY_WEIGHT {
            cost += STAMINA_COST_PER_WEIGHT * (weight - FREE_CARRY_WEIGHT);
        }
        cost + condition.stamina_surcharge()
    }

    pub fn consume_stamina(&mut self, condition: &WeatherCondition) {
        let cost = self.step_cost(condition);
        self.stamina = (self.stamina - cost).max(0.0);
        if self.stamina <= 0.0 && !self.exhausted {
            self.exhausted = true;
            tracing::info!("Courier exhausted at {}", self.position);
        }
    }

    pub fn recover_stamina(&mut self, at_rest_point: bool) {
        let recovery = if at_rest_point { RECOVERY_REST_POINT } else { RECOVERY_IDLE };
        self.stamina = (self.stamina + recovery).min(MAX_STAMINA);
        if self.exhausted && self.stamina >= TIRED_STAMINA {
            self.exhausted = false;
            tracing::info!("Courier recovered from exhaustion");
        }
    }

    /// Take one unit step.
    ///
    /// Returns false without touching anything when exhausted or when the
    /// delta is not a single orthogonal step. Blocked tiles are checked by
    /// the caller before stepping.
    pub fn move_by(&mut self, dx: i32, dy: i32, condition: &WeatherCondition) -> bool {
        if self.exhausted || dx.abs() + dy.abs() != 1 {
            return false;
        }
        self.position = self.position.offset(dx, dy);
        self.consume_stamina(condition);
        true
    }

    // === ORDERS ===

    /// Add an order to the inventory, reporting why it was refused
    pub fn try_accept(&mut self, order: Order) -> Result<()> {
        let id = order.id.clone();
        self.queue.add(order)?;
        tracing::info!(
            "Accepted order {} (load {}/{})",
            id,
            self.queue.current_weight(),
            self.queue.max_weight()
        );
        Ok(())
    }

    pub fn accept_order(&mut self, order: Order) -> bool {
        match self.try_accept(order) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Order refused: {}", e);
                false
            }
        }
    }

    /// Deliver the selected order at time `now`.
    ///
    /// Returns None when nothing is selected.
    pub fn complete_delivery(&mut self, now: DateTime<Utc>) -> Option<DeliveryResult> {
        let seconds_left = self.queue.current()?.seconds_until_deadline(now);
        let timing = DeliveryTiming::classify(seconds_left);

        let mut change = timing.base_reputation_change();
        if timing.is_late() {
            if self.forgiveness_available && self.reputation >= FORGIVENESS_MIN_REPUTATION {
                change = forgive(change);
                self.forgiveness_available = false;
                tracing::debug!("First late delivery forgiven, penalty halved to {}", change);
            }
            self.streak = 0;
        } else {
            self.streak += 1;
        }

        if self.streak >= STREAK_LENGTH {
            change += STREAK_BONUS;
            self.streak = 0;
        }

        self.reputation = (self.reputation + change).clamp(0, MAX_REPUTATION);

        let order = self.queue.complete_current().ok()?;
        let payout = if self.reputation >= HIGH_REPUTATION {
            order.payout * HIGH_REPUTATION_PAYOUT
        } else {
            order.payout
        };
        self.total_income += payout;

        tracing::info!(
            "Delivered {} ({:?}): +${:.2}, reputation {:+} -> {}",
            order.id,
            timing,
            payout,
            change,
            self.reputation
        );

        Some(DeliveryResult {
            order,
            payout,
            reputation_change: change,
            timing,
        })
    }

    /// Drop the selected order for a flat reputation penalty
    pub fn cancel_order(&mut self) -> bool {
        match self.queue.complete_current() {
            Ok(order) => {
                self.reputation = (self.reputation + CANCEL_PENALTY).max(0);
                self.streak = 0;
                tracing::info!("Cancelled {}, reputation now {}", order.id, self.reputation);
                true
            }
            Err(_) => false,
        }
    }

    // === RUN STATUS ===

    pub fn is_defeated(&self) -> bool {
        self.reputation < self.defeat_reputation
    }

    pub fn has_won(&self) -> bool {
        self.total_income >= self.income_goal
    }

    // === ACCESSORS ===

    pub fn position(&self) -> GridPos {
        self.position
    }

    pub fn stamina(&self) -> f64 {
        self.stamina
    }

    pub fn reputation(&self) -> i32 {
        self.reputation
    }

    pub fn total_income(&self) -> f64 {
        self.total_income
    }

    pub fn income_goal(&self) -> f64 {
        self.income_goal
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn forgiveness_available(&self) -> bool {
        self.forgiveness_available
    }

    pub fn queue(&self) -> &OrderQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut OrderQueue {
        &mut self.queue
    }

    /// Set stamina directly, clamped to [0, 100]. The exhausted flag is left alone.
    pub fn set_stamina(&mut self, stamina: f64) {
        self.stamina = stamina.clamp(0.0, MAX_STAMINA);
    }

    pub fn set_reputation(&mut self, reputation: i32) {
        self.reputation = reputation.clamp(0, MAX_REPUTATION);
    }

    pub fn stats(&self) -> CourierStats {
        CourierStats {
            position: self.position,
            stamina: self.stamina,
            reputation: self.reputation,
            total_income: self.total_income,
            exhausted: self.exhausted,
            streak: self.streak,
            forgiveness_available: self.forgiveness_available,
        }
    }

    /// Overwrite the courier's numbers and inventory from a snapshot or save
    pub fn restore(&mut self, stats: &CourierStats, orders: Vec<Order>) -> Result<()> {
        let queue = self.rebuild_queue(orders)?;
        self.restore_with(stats, queue);
        Ok(())
    }

    /// Build an inventory with this courier's weight cap without installing it
    pub fn rebuild_queue(&self, orders: Vec<Order>) -> Result<OrderQueue> {
        OrderQueue::from_orders(self.queue.max_weight(), orders)
    }

    /// Install already validated numbers and inventory
    pub fn restore_with(&mut self, stats: &CourierStats, queue: OrderQueue) {
        self.queue = queue;
        self.position = stats.position;
        self.stamina = stats.stamina.clamp(0.0, MAX_STAMINA);
        self.reputation = stats.reputation.clamp(0, MAX_REPUTATION);
        self.total_income = stats.total_income.max(0.0);
        self.exhausted = stats.exhausted;
        self.streak = stats.streak;
        self.forgiveness_available = stats.forgiveness_available;
    }
}
