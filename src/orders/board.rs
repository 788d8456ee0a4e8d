//! OrderBoard - jobs on offer to the courier
//!
//! Every job from the feed is held back until the run clock passes its
//! release time, then offered exactly once.

use ahash::AHashSet;

use crate::core::types::GridPos;
use crate::orders::order::{Order, OrderId};

#[derive(Debug, Clone, Default)]
pub struct OrderBoard {
    all: Vec<Order>,
    available: Vec<Order>,
    released: AHashSet<OrderId>,
}

impl OrderBoard {
    pub fn new(jobs: Vec<Order>) -> Self {
        Self {
            all: jobs,
            available: Vec::new(),
            released: AHashSet::new(),
        }
    }

    /// Offer every job whose release time has passed. Returns how many were released.
    pub fn update(&mut self, elapsed_secs: f64) -> usize {
        let mut count = 0;
        for job in &self.all {
            if job.release_time <= elapsed_secs && !self.released.contains(&job.id) {
                self.released.insert(job.id.clone());
                self.available.push(job.clone());
                count += 1;
            }
        }
        if count > 0 {
            tracing::debug!("{} new job(s) released at t={:.1}s", count, elapsed_secs);
        }
        count
    }

    /// Jobs currently on offer
    pub fn available(&self) -> &[Order] {
        &self.available
    }

    /// First offered job with its pickup at `pos`
    pub fn find_at(&self, pos: GridPos) -> Option<&Order> {
        self.available.iter().find(|o| o.pickup == pos)
    }

    /// Withdraw a job from the offer list (accepted by the courier)
    pub fn remove(&mut self, id: &OrderId) -> Option<Order> {
        let idx = self.available.iter().position(|o| &o.id == id)?;
        Some(self.available.remove(idx))
    }

    /// Put a job back on offer, e.g. after an undo drops it from the inventory
    pub fn reoffer(&mut self, order: Order) {
        if self.available.iter().any(|o| o.id == order.id) {
            return;
        }
        self.released.insert(order.id.clone());
        self.available.push(order);
    }

    /// Withdraw offered jobs that are not due yet at `elapsed_secs`.
    ///
    /// Used when the run clock goes backwards; `update` offers them again
    /// once the clock catches up.
    pub fn rewind(&mut self, elapsed_secs: f64) -> usize {
        let before = self.available.len();
        let released = &mut self.released;
        self.available.retain(|o| {
            let due = o.release_time <= elapsed_secs;
            if !due {
                released.remove(&o.id);
            }
            due
        });
        before - self.available.len()
    }

    /// Total number of jobs known to the board, released or not
    pub fn total_jobs(&self) -> usize {
        self.all.len()
    }

    pub fn is_released(&self, id: &OrderId) -> bool {
        self.released.contains(id)
    }
}
