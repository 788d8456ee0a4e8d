//! Weather Markov chain
//!
//! Each condition has a row of relative weights over its successors. The
//! table is validated when the process is built, so a missing row is a load
//! time configuration error rather than a mid-run failure.

use std::collections::BTreeMap;

use ahash::AHashMap;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::core::error::{CourierError, Result};
use crate::weather::condition::WeatherCondition;

/// Successor row: conditions with their relative weights, sorted by name
type TransitionRow = Vec<(WeatherCondition, f64)>;

#[derive(Debug, Clone)]
pub struct WeatherProcess {
    current: WeatherCondition,
    transitions: AHashMap<WeatherCondition, TransitionRow>,
}

impl WeatherProcess {
    /// Build a process from a name-keyed table as delivered by the city feed
    pub fn new(
        initial: WeatherCondition,
        table: &BTreeMap<String, BTreeMap<String, f64>>,
    ) -> Result<Self> {
        let mut transitions = AHashMap::new();
        for (from, row) in table {
            // BTreeMap iteration keeps rows in a stable order for seeded sampling
            let row: TransitionRow = row
                .iter()
                .map(|(to, weight)| (WeatherCondition::from(to.as_str()), *weight))
                .collect();
            transitions.insert(WeatherCondition::from(from.as_str()), row);
        }

        let process = Self {
            current: initial,
            transitions,
        };
        process.validate()?;
        Ok(process)
    }

    /// Every reachable condition must have a row with some positive weight
    fn validate(&self) -> Result<()> {
        if !self.transitions.contains_key(&self.current) {
            return Err(CourierError::UnknownCondition(self.current.to_string()));
        }

        for (from, row) in &self.transitions {
            if !row.iter().any(|(_, w)| *w > 0.0) || row.iter().any(|(_, w)| *w < 0.0) {
                return Err(CourierError::InvalidTransitionRow(from.to_string()));
            }
            for (to, _) in row {
                if !self.transitions.contains_key(to) {
                    return Err(CourierError::UnknownCondition(to.to_string()));
                }
            }
        }
        Ok(())
    }

    pub fn current(&self) -> &WeatherCondition {
        &self.current
    }

    /// Whether `condition` has a successor row in this chain
    pub fn has_row(&self, condition: &WeatherCondition) -> bool {
        self.transitions.contains_key(condition)
    }

    /// Force the current condition, e.g. when restoring a save
    pub fn set_current(&mut self, condition: WeatherCondition) -> Result<()> {
        if !self.has_row(&condition) {
            return Err(CourierError::UnknownCondition(condition.to_string()));
        }
        self.current = condition;
        Ok(())
    }

    /// Successor row of a condition
    pub fn successors(&self, condition: &WeatherCondition) -> Option<&[(WeatherCondition, f64)]> {
        self.transitions.get(condition).map(|row| row.as_slice())
    }

    /// Draw a successor of the current condition without committing to it
    pub fn sample_next<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<WeatherCondition> {
        let row = self
            .transitions
            .get(&self.current)
            .ok_or_else(|| CourierError::UnknownCondition(self.current.to_string()))?;

        let dist = WeightedIndex::new(row.iter().map(|(_, w)| *w))
            .map_err(|_| CourierError::InvalidTransitionRow(self.current.to_string()))?;
        Ok(row[dist.sample(rng)].0.clone())
    }

    /// Advance the chain one step and return the new condition
    pub fn next_state<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<WeatherCondition> {
        let next = self.sample_next(rng)?;
        self.current = next.clone();
        Ok(next)
    }
}
