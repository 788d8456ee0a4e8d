//! OrderQueue - the courier's carried inventory
//!
//! Orders are kept in contiguous storage in sequence order, with a cursor
//! index marking the current selection. Neighbour navigation is O(1) and
//! sorting is a stable in-place sort that keeps the cursor on the same order.

use crate::core::error::{CourierError, Result};
use crate::orders::order::{Order, OrderId};

/// Default carrying capacity
pub const DEFAULT_MAX_WEIGHT: f64 = 10.0;

/// Weight-bounded ordered inventory with a selection cursor
#[derive(Debug, Clone)]
pub struct OrderQueue {
    orders: Vec<Order>,
    /// Index of the selected order; None iff the queue is empty
    cursor: Option<usize>,
    max_weight: f64,
    current_weight: f64,
}

impl Default for OrderQueue {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WEIGHT)
    }
}

impl OrderQueue {
    pub fn new(max_weight: f64) -> Self {
        Self {
            orders: Vec::new(),
            cursor: None,
            max_weight,
            current_weight: 0.0,
        }
    }

    /// Rebuild a queue from a saved sequence, selecting the head
    pub fn from_orders(max_weight: f64, orders: Vec<Order>) -> Result<Self> {
        let mut queue = Self::new(max_weight);
        for order in orders {
            queue.add(order)?;
        }
        Ok(queue)
    }

    /// Append an order at the tail.
    ///
    /// Rejected without any change when the total weight would exceed the cap.
    pub fn add(&mut self, order: Order) -> Result<()> {
        let needed = self.current_weight + order.weight;
        if needed > self.max_weight {
            return Err(CourierError::CapacityExceeded {
                order_id: order.id.to_string(),
                needed,
                max: self.max_weight,
            });
        }

        self.orders.push(order);
        if self.cursor.is_none() {
            self.cursor = Some(self.orders.len() - 1);
        }
        self.refresh_weight();
        Ok(())
    }

    /// Move the cursor one step toward the tail. No-op at the end.
    pub fn select_next(&mut self) -> bool {
        match self.cursor {
            Some(idx) if idx + 1 < self.orders.len() => {
                self.cursor = Some(idx + 1);
                true
            }
            _ => false,
        }
    }

    /// Move the cursor one step toward the head. No-op at the start.
    pub fn select_previous(&mut self) -> bool {
        match self.cursor {
            Some(idx) if idx > 0 => {
                self.cursor = Some(idx - 1);
                true
            }
            _ => false,
        }
    }

    /// Remove the selected order.
    ///
    /// The cursor moves to the following order, or the preceding one when the
    /// removed order was the tail, or to nothing when the queue empties.
    pub fn complete_current(&mut self) -> Result<Order> {
        let idx = self.cursor.ok_or(CourierError::EmptySelection)?;
        let removed = self.orders.remove(idx);

        self.cursor = if idx < self.orders.len() {
            Some(idx)
        } else if !self.orders.is_empty() {
            Some(self.orders.len() - 1)
        } else {
            None
        };

        self.refresh_weight();
        Ok(removed)
    }

    /// Stable sort in descending key order. Ties keep their relative order.
    ///
    /// The cursor follows the order it pointed at before sorting.
    pub fn sort_descending_by<K, F>(&mut self, key: F)
    where
        K: Ord,
        F: Fn(&Order) -> K,
    {
        if self.orders.len() < 2 {
            return;
        }

        let selected = self.current().map(|o| o.id.clone());

        // sort_by is stable; comparing b to a gives descending order
        self.orders.sort_by(|a, b| key(b).cmp(&key(a)));

        self.cursor = match selected {
            Some(id) => self.position_of(&id),
            None => Some(0),
        };
        self.check_invariants();
    }

    /// The selected order, if any
    pub fn current(&self) -> Option<&Order> {
        self.cursor.and_then(|idx| self.orders.get(idx))
    }

    pub fn cursor_index(&self) -> Option<usize> {
        self.cursor
    }

    pub fn position_of(&self, id: &OrderId) -> Option<usize> {
        self.orders.iter().position(|o| &o.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Orders in sequence order
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn current_weight(&self) -> f64 {
        self.current_weight
    }

    pub fn max_weight(&self) -> f64 {
        self.max_weight
    }

    /// Weight still available before the cap is reached
    pub fn remaining_capacity(&self) -> f64 {
        (self.max_weight - self.current_weight).max(0.0)
    }

    fn refresh_weight(&mut self) {
        self.current_weight = self.orders.iter().map(|o| o.weight).sum();
        self.check_invariants();
    }

    fn check_invariants(&self) {
        debug_assert!(self.current_weight <= self.max_weight);
        debug_assert_eq!(self.cursor.is_none(), self.orders.is_empty());
        debug_assert!(self.cursor.map_or(true, |idx| idx < self.orders.len()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::GridPos;
    use chrono::{TimeZone, Utc};

    fn order(id: &str, weight: f64, priority: u32, minute: u32) -> Order {
        Order {
            id: OrderId::new(id),
            pickup: GridPos::new(1, 1),
            dropoff: GridPos::new(5, 5),
            payout: 100.0,
            deadline: Utc.with_ymd_and_hms(2025, 9, 29, 12, minute, 0).unwrap(),
            weight,
            priority,
            release_time: 0.0,
        }
    }

    fn ids(queue: &OrderQueue) -> Vec<&str> {
        queue.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn test_empty_queue() {
        let queue = OrderQueue::default();
        assert_eq!(queue.max_weight(), 10.0);
        assert_eq!(queue.current_weight(), 0.0);
        assert_eq!(queue.len(), 0);
        assert!(queue.current().is_none());
    }

    #[test]
    fn test_add_selects_first_order() {
        let mut queue = OrderQueue::default();
        queue.add(order("PED-001", 2.0, 0, 0)).unwrap();
        queue.add(order("PED-002", 3.0, 2, 30)).unwrap();

        assert_eq!(queue.current_weight(), 5.0);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.current().unwrap().id.as_str(), "PED-001");
    }

    #[test]
    fn test_add_rejected_over_capacity() {
        let mut queue = OrderQueue::new(5.0);
        queue.add(order("A", 2.0, 0, 0)).unwrap();
        queue.add(order("B", 3.0, 0, 0)).unwrap(); // exactly at cap is fine

        let err = queue.add(order("C", 1.0, 0, 0)).unwrap_err();
        assert!(matches!(err, CourierError::CapacityExceeded { .. }));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.current_weight(), 5.0);
    }

    #[test]
    fn test_navigation_stops_at_ends() {
        let mut queue = OrderQueue::default();
        for (i, id) in ["A", "B", "C"].iter().enumerate() {
            queue.add(order(id, 1.0, 0, i as u32)).unwrap();
        }

        assert!(!queue.select_previous());
        assert_eq!(queue.current().unwrap().id.as_str(), "A");

        assert!(queue.select_next());
        assert!(queue.select_next());
        assert!(!queue.select_next());
        assert_eq!(queue.current().unwrap().id.as_str(), "C");

        assert!(queue.select_previous());
        assert_eq!(queue.current().unwrap().id.as_str(), "B");
    }

    #[test]
    fn test_navigation_on_empty_is_noop() {
        let mut queue = OrderQueue::default();
        assert!(!queue.select_next());
        assert!(!queue.select_previous());
        assert!(queue.current().is_none());
    }

    #[test]
    fn test_complete_moves_cursor_forward_then_back() {
        let mut queue = OrderQueue::default();
        for id in ["A", "B", "C"] {
            queue.add(order(id, 1.0, 0, 0)).unwrap();
        }
        queue.select_next(); // B

        let done = queue.complete_current().unwrap();
        assert_eq!(done.id.as_str(), "B");
        assert_eq!(queue.current().unwrap().id.as_str(), "C");

        // C is the tail, so the cursor falls back to A
        queue.complete_current().unwrap();
        assert_eq!(queue.current().unwrap().id.as_str(), "A");

        queue.complete_current().unwrap();
        assert!(queue.current().is_none());
        assert_eq!(queue.current_weight(), 0.0);
        assert!(matches!(queue.complete_current(), Err(CourierError::EmptySelection)));
    }

    #[test]
    fn test_sort_by_priority_keeps_cursor_identity() {
        let mut queue = OrderQueue::default();
        queue.add(order("PED-001", 2.0, 0, 0)).unwrap();
        queue.add(order("PED-002", 3.0, 2, 30)).unwrap();
        queue.add(order("PED-003", 1.0, 1, 15)).unwrap();
        queue.select_next(); // PED-002

        queue.sort_descending_by(|o| o.priority);

        assert_eq!(ids(&queue), vec!["PED-002", "PED-003", "PED-001"]);
        assert_eq!(queue.current().unwrap().id.as_str(), "PED-002");
        assert_eq!(queue.cursor_index(), Some(0));
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut queue = OrderQueue::default();
        queue.add(order("A", 1.0, 1, 0)).unwrap();
        queue.add(order("B", 1.0, 5, 0)).unwrap();
        queue.add(order("C", 1.0, 1, 0)).unwrap();
        queue.add(order("D", 1.0, 5, 0)).unwrap();

        queue.sort_descending_by(|o| o.priority);
        assert_eq!(ids(&queue), vec!["B", "D", "A", "C"]);
    }

    #[test]
    fn test_sort_by_urgency_puts_earliest_deadline_first() {
        let mut queue = OrderQueue::default();
        queue.add(order("late", 1.0, 0, 30)).unwrap();
        queue.add(order("soon", 1.0, 0, 5)).unwrap();
        queue.add(order("mid", 1.0, 0, 15)).unwrap();

        queue.sort_descending_by(|o| o.urgency());
        assert_eq!(ids(&queue), vec!["soon", "mid", "late"]);
        assert_eq!(queue.current().unwrap().id.as_str(), "late");
    }

    #[test]
    fn test_from_orders_rejects_overweight_list() {
        let orders = vec![order("A", 6.0, 0, 0), order("B", 6.0, 0, 0)];
        assert!(OrderQueue::from_orders(10.0, orders).is_err());
    }
}
