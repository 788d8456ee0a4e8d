//! Timed weather changes with a linear blend window
//!
//! A countdown drawn from the configured interval triggers a change. The new
//! condition is sampled up front and the speed multiplier slides toward it
//! over the blend window; the chain commits to it when the blend finishes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::GameConfig;
use crate::core::error::Result;
use crate::weather::condition::WeatherCondition;
use crate::weather::process::WeatherProcess;

/// A change in progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blend {
    pub next: WeatherCondition,
    pub elapsed: f64,
}

/// Weather events for the run log
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherEvent {
    BlendStarted {
        from: WeatherCondition,
        to: WeatherCondition,
    },
    WeatherChanged {
        old: WeatherCondition,
        new: WeatherCondition,
    },
}

#[derive(Debug, Clone)]
pub struct WeatherCycle {
    process: WeatherProcess,
    /// Seconds until the next change begins
    timer: f64,
    blend: Option<Blend>,
    min_interval: f64,
    max_interval: f64,
    blend_secs: f64,
}

impl WeatherCycle {
    pub fn new<R: Rng + ?Sized>(process: WeatherProcess, config: &GameConfig, rng: &mut R) -> Self {
        let mut cycle = Self {
            process,
            timer: 0.0,
            blend: None,
            min_interval: config.weather_min_interval_secs,
            max_interval: config.weather_max_interval_secs,
            blend_secs: config.weather_blend_secs,
        };
        cycle.timer = cycle.draw_interval(rng);
        cycle
    }

    fn draw_interval<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max_interval > self.min_interval {
            rng.gen_range(self.min_interval..=self.max_interval)
        } else {
            self.min_interval
        }
    }

    /// Advance by `dt` seconds
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f64, rng: &mut R) -> Result<Vec<WeatherEvent>> {
        let mut events = Vec::new();
        self.timer -= dt;

        if let Some(blend) = self.blend.as_mut() {
            blend.elapsed += dt;
            if blend.elapsed >= self.blend_secs {
                let old = self.process.current().clone();
                let new = blend.next.clone();
                self.process.set_current(new.clone())?;
                self.blend = None;
                tracing::info!("Weather changed: {} -> {}", old, new);
                events.push(WeatherEvent::WeatherChanged { old, new });
            }
        }

        if self.timer <= 0.0 && self.blend.is_none() {
            let next = self.process.sample_next(rng)?;
            self.timer = self.draw_interval(rng);
            tracing::debug!(
                "Weather blending {} -> {} (next change in {:.1}s)",
                self.process.current(),
                next,
                self.timer
            );
            events.push(WeatherEvent::BlendStarted {
                from: self.process.current().clone(),
                to: next.clone(),
            });
            self.blend = Some(Blend { next, elapsed: 0.0 });
        }

        Ok(events)
    }

    /// Speed multiplier, interpolated while a blend is running
    pub fn effective_multiplier(&self) -> f64 {
        let current = self.process.current().speed_multiplier();
        match &self.blend {
            Some(blend) => {
                let progress = (blend.elapsed / self.blend_secs).min(1.0);
                current + (blend.next.speed_multiplier() - current) * progress
            }
            None => current,
        }
    }

    /// Condition currently in force (the old one until a blend completes)
    pub fn condition(&self) -> &WeatherCondition {
        self.process.current()
    }

    pub fn blend(&self) -> Option<&Blend> {
        self.blend.as_ref()
    }

    pub fn timer(&self) -> f64 {
        self.timer
    }

    pub fn process(&self) -> &WeatherProcess {
        &self.process
    }

    /// Put the cycle back into a saved state; any running blend is dropped
    pub fn restore(&mut self, condition: WeatherCondition, timer: f64) -> Result<()> {
        self.process.set_current(condition)?;
        self.timer = timer;
        self.blend = None;
        Ok(())
    }

    /// Roll the settled condition back without touching the timer.
    ///
    /// A running blend survives when the condition is unchanged, so the
    /// change it already sampled still lands.
    pub fn rewind_to(&mut self, condition: WeatherCondition) -> Result<()> {
        if &condition == self.process.current() {
            return Ok(());
        }
        self.process.set_current(condition)?;
        self.blend = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeMap;

    fn clear_to_storm() -> WeatherProcess {
        let mut table = BTreeMap::new();
        table.insert("clear".to_string(), BTreeMap::from([("storm".to_string(), 1.0)]));
        table.insert("storm".to_string(), BTreeMap::from([("clear".to_string(), 1.0)]));
        WeatherProcess::new(WeatherCondition::Clear, &table).unwrap()
    }

    #[test]
    fn test_timer_drawn_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..50 {
            let cycle = WeatherCycle::new(clear_to_storm(), &GameConfig::default(), &mut rng);
            assert!((45.0..=60.0).contains(&cycle.timer()));
        }
    }

    #[test]
    fn test_blend_interpolates_then_commits() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut cycle = WeatherCycle::new(clear_to_storm(), &GameConfig::default(), &mut rng);

        let wait = cycle.timer();
        let events = cycle.update(wait, &mut rng).unwrap();
        assert!(matches!(events.as_slice(), [WeatherEvent::BlendStarted { .. }]));
        assert_eq!(*cycle.condition(), WeatherCondition::Clear);
        assert_eq!(cycle.effective_multiplier(), 1.0);

        cycle.update(2.0, &mut rng).unwrap();
        // halfway between 1.00 and 0.75
        assert!((cycle.effective_multiplier() - 0.875).abs() < 1e-9);

        let events = cycle.update(2.0, &mut rng).unwrap();
        assert!(events.contains(&WeatherEvent::WeatherChanged {
            old: WeatherCondition::Clear,
            new: WeatherCondition::Storm,
        }));
        assert_eq!(*cycle.condition(), WeatherCondition::Storm);
        assert!(cycle.blend().is_none());
        assert_eq!(cycle.effective_multiplier(), 0.75);
    }

    #[test]
    fn test_restore_drops_blend() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut cycle = WeatherCycle::new(clear_to_storm(), &GameConfig::default(), &mut rng);
        let wait = cycle.timer();
        cycle.update(wait, &mut rng).unwrap();
        assert!(cycle.blend().is_some());

        cycle.restore(WeatherCondition::Storm, 12.5).unwrap();
        assert!(cycle.blend().is_none());
        assert_eq!(cycle.timer(), 12.5);
        assert_eq!(*cycle.condition(), WeatherCondition::Storm);
    }

    #[test]
    fn test_rewind_to_same_condition_keeps_pending_change() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut cycle = WeatherCycle::new(clear_to_storm(), &GameConfig::default(), &mut rng);
        let wait = cycle.timer();
        cycle.update(wait, &mut rng).unwrap();
        let timer = cycle.timer();

        cycle.rewind_to(WeatherCondition::Clear).unwrap();
        assert_eq!(cycle.blend().map(|b| b.next.clone()), Some(WeatherCondition::Storm));
        assert_eq!(cycle.timer(), timer);

        let events = cycle.update(4.0, &mut rng).unwrap();
        assert!(events.contains(&WeatherEvent::WeatherChanged {
            old: WeatherCondition::Clear,
            new: WeatherCondition::Storm,
        }));
    }

    #[test]
    fn test_rewind_to_other_condition_drops_blend() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut cycle = WeatherCycle::new(clear_to_storm(), &GameConfig::default(), &mut rng);
        let wait = cycle.timer();
        cycle.update(wait, &mut rng).unwrap();

        cycle.rewind_to(WeatherCondition::Storm).unwrap();
        assert!(cycle.blend().is_none());
        assert_eq!(*cycle.condition(), WeatherCondition::Storm);
    }
}
