//! Game - one courier run from start to final score
//!
//! Owns every subsystem and is the only place they meet. Time advances in
//! two ways: each step the courier takes costs `1 / speed` seconds, and the
//! player can wait. Both go through `tick`, which runs weather, job release,
//! idle recovery and the end-of-run checks in that order.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use ordered_float::OrderedFloat;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::city::CityMap;
use crate::core::config::GameConfig;
use crate::core::error::{CourierError, Result};
use crate::core::types::{Direction, GridPos, RunId, SlotId};
use crate::courier::{Courier, CourierStats, DeliveryResult};
use crate::game::action::{Action, SortKey};
use crate::history::{HistoryLedger, Leaderboard, SaveState, SaveStore, SavedPlayer, Snapshot};
use crate::orders::{Order, OrderBoard, OrderId, OrderQueue};
use crate::provider::ContentBundle;
use crate::weather::{WeatherCycle, WeatherEvent};

/// Where a fresh courier starts when that tile is walkable
pub const STARTING_POSITION: GridPos = GridPos { x: 1, y: 1 };

/// Largest slice of time a single tick covers while waiting
pub const WAIT_STEP_SECS: f64 = 0.5;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    GoalReached,
    ReputationLost,
    TimeUp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameOutcome {
    pub reason: EndReason,
    pub score: u64,
    pub income: f64,
    pub reputation: i32,
    pub elapsed: f64,
}

impl GameOutcome {
    pub fn is_victory(&self) -> bool {
        self.reason == EndReason::GoalReached
    }
}

/// Things that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Weather(WeatherEvent),
    JobsReleased(usize),
    Recovered { stamina: f64 },
    RunEnded(GameOutcome),
}

/// Result of applying one action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Moved { position: GridPos, at_dropoff: bool },
    Accepted(OrderId),
    Selected(Option<OrderId>),
    Sorted(SortKey),
    Delivered(DeliveryResult),
    Cancelled,
    Saved(PathBuf),
    Loaded(SlotId),
    Undone { position: GridPos },
    Waited { seconds: f64 },
    Rejected(String),
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Moved { position, at_dropoff } => {
                write!(f, "Moved to {}", position)?;
                if *at_dropoff {
                    write!(f, " - drop-off point, deliver now")?;
                }
                Ok(())
            }
            Self::Accepted(id) => write!(f, "Accepted order {}", id),
            Self::Selected(Some(id)) => write!(f, "Selected order {}", id),
            Self::Selected(None) => write!(f, "No orders carried"),
            Self::Sorted(key) => write!(f, "Sorted by {:?}", key),
            Self::Delivered(result) => write!(
                f,
                "Delivered {} ({:?}): +${:.0}, reputation {:+}",
                result.order.id, result.timing, result.payout, result.reputation_change
            ),
            Self::Cancelled => write!(f, "Order cancelled"),
            Self::Saved(path) => write!(f, "Saved to {}", path.display()),
            Self::Loaded(slot) => write!(f, "Loaded slot {}", slot),
            Self::Undone { position } => write!(f, "Undone, back at {}", position),
            Self::Waited { seconds } => write!(f, "Waited {:.1}s", seconds),
            Self::Rejected(reason) => write!(f, "{}", reason),
        }
    }
}

pub struct Game {
    config: GameConfig,
    run_id: RunId,
    player_name: String,
    courier: Courier,
    map: CityMap,
    board: OrderBoard,
    weather: WeatherCycle,
    history: HistoryLedger,
    saves: SaveStore,
    leaderboard: Leaderboard,
    rng: ChaCha8Rng,
    /// Simulated seconds since the run began
    elapsed: f64,
    /// Wall clock instant matching `elapsed == 0`
    run_start: DateTime<Utc>,
    /// Seconds since the courier last moved, less intervals already recovered
    idle_secs: f64,
    outcome: Option<GameOutcome>,
}

impl Game {
    pub fn new(
        config: GameConfig,
        bundle: ContentBundle,
        saves: SaveStore,
        leaderboard: Leaderboard,
        player_name: impl Into<String>,
    ) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let ContentBundle { map, jobs, weather } = bundle;
        let process = weather.into_process()?;
        let weather = WeatherCycle::new(process, &config, &mut rng);

        let start = map.nearest_walkable(STARTING_POSITION, &mut rng);
        let courier = Courier::with_config(start, map.goal(), &config);
        let run_start = map.start_time().unwrap_or_else(Utc::now);

        let mut board = OrderBoard::new(jobs);
        board.update(0.0);

        let mut game = Self {
            history: HistoryLedger::new(config.undo_depth),
            config,
            run_id: RunId::new(),
            player_name: player_name.into(),
            courier,
            map,
            board,
            weather,
            saves,
            leaderboard,
            rng,
            elapsed: 0.0,
            run_start,
            idle_secs: 0.0,
            outcome: None,
        };
        game.record_snapshot();

        tracing::info!(
            "Run {} started at {}: goal ${:.0}, {} jobs",
            game.run_id,
            start,
            game.courier.income_goal(),
            game.board.total_jobs()
        );
        Ok(game)
    }

    // === TIME ===

    /// Advance the run clock by `dt` seconds with the courier standing still
    pub fn tick(&mut self, dt: f64) -> Vec<GameEvent> {
        self.advance(dt, true)
    }

    fn advance(&mut self, dt: f64, idle: bool) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.outcome.is_some() || dt <= 0.0 {
            return events;
        }

        self.elapsed += dt;

        match self.weather.update(dt, &mut self.rng) {
            Ok(weather_events) => events.extend(weather_events.into_iter().map(GameEvent::Weather)),
            Err(e) => tracing::warn!("Weather update failed: {}", e),
        }

        let released = self.board.update(self.elapsed);
        if released > 0 {
            events.push(GameEvent::JobsReleased(released));
        }

        if idle {
            self.idle_secs += dt;
            let interval = self.config.idle_recovery_interval_secs;
            let at_rest = self.map.is_rest_point(self.courier.position());
            let mut recovered = false;
            while self.idle_secs >= interval {
                self.idle_secs -= interval;
                self.courier.recover_stamina(at_rest);
                recovered = true;
            }
            if recovered {
                events.push(GameEvent::Recovered {
                    stamina: self.courier.stamina(),
                });
            }
        }

        if let Some(outcome) = self.check_end() {
            events.push(GameEvent::RunEnded(outcome));
        }
        events
    }

    /// End the run if the goal, reputation floor or clock says so
    fn check_end(&mut self) -> Option<GameOutcome> {
        if self.outcome.is_some() {
            return None;
        }

        let reason = if self.courier.has_won() {
            EndReason::GoalReached
        } else if self.courier.is_defeated() {
            EndReason::ReputationLost
        } else if self.elapsed >= self.config.run_duration_secs {
            EndReason::TimeUp
        } else {
            return None;
        };

        let outcome = GameOutcome {
            reason,
            score: self.final_score(reason == EndReason::GoalReached),
            income: self.courier.total_income(),
            reputation: self.courier.reputation(),
            elapsed: self.elapsed,
        };

        tracing::info!(
            "Run {} over ({:?}) after {:.1}s: score {}",
            self.run_id,
            reason,
            self.elapsed,
            outcome.score
        );
        if let Err(e) = self.leaderboard.record(
            &self.player_name,
            outcome.score,
            outcome.income,
            outcome.reputation,
        ) {
            tracing::warn!("Could not record score: {}", e);
        }

        self.outcome = Some(outcome.clone());
        Some(outcome)
    }

    /// Income rounded down, plus the bonus for winning early
    pub fn final_score(&self, victory: bool) -> u64 {
        let base = self.courier.total_income().max(0.0).floor() as u64;
        let early = self.elapsed < self.config.run_duration_secs * self.config.early_victory_fraction;
        if victory && early {
            base + self.config.early_victory_bonus
        } else {
            base
        }
    }

    /// Run clock as a wall clock instant, for deadline checks
    pub fn now(&self) -> DateTime<Utc> {
        self.run_start + Duration::milliseconds((self.elapsed * 1000.0) as i64)
    }

    // === ACTIONS ===

    pub fn apply(&mut self, action: Action) -> ActionOutcome {
        if self.outcome.is_some() {
            return ActionOutcome::Rejected("The run is over".into());
        }

        let result = match action {
            Action::Move(direction) => self.step(direction),
            Action::Accept => self.accept_here(),
            Action::Next => {
                self.courier.queue_mut().select_next();
                Ok(self.selected())
            }
            Action::Previous => {
                self.courier.queue_mut().select_previous();
                Ok(self.selected())
            }
            Action::Sort(key) => {
                self.sort_inventory(key);
                Ok(ActionOutcome::Sorted(key))
            }
            Action::Deliver => self.deliver(),
            Action::Cancel => {
                if self.courier.cancel_order() {
                    self.check_end();
                    Ok(ActionOutcome::Cancelled)
                } else {
                    Err(CourierError::EmptySelection)
                }
            }
            Action::Save(slot) => self.save(slot).map(ActionOutcome::Saved),
            Action::Load(slot) => self.load(slot).map(|_| ActionOutcome::Loaded(slot)),
            Action::Undo(steps) => self.undo(steps),
            Action::Wait(seconds) => Ok(self.wait(seconds)),
        };

        result.unwrap_or_else(|e| ActionOutcome::Rejected(e.to_string()))
    }

    fn selected(&self) -> ActionOutcome {
        ActionOutcome::Selected(self.courier.queue().current().map(|o| o.id.clone()))
    }

    fn step(&mut self, direction: Direction) -> Result<ActionOutcome> {
        let (dx, dy) = direction.delta();
        let target = self.courier.position().offset(dx, dy);
        if self.map.is_blocked(target) {
            return Ok(ActionOutcome::Rejected(format!("Can't ride into {}", target)));
        }

        let speed = self
            .courier
            .current_speed(self.weather.effective_multiplier(), self.map.surface_weight(target));
        let condition = self.weather.condition().clone();
        if self.courier.is_exhausted() || self.courier.stamina() <= 0.0 {
            return Ok(ActionOutcome::Rejected("Exhausted! Rest to recover".into()));
        }
        if speed <= 0.0 {
            return Ok(ActionOutcome::Rejected(format!("Can't make headway onto {}", target)));
        }
        if !self.courier.move_by(dx, dy, &condition) {
            return Ok(ActionOutcome::Rejected("Exhausted! Rest to recover".into()));
        }

        self.idle_secs = 0.0;
        self.advance(1.0 / speed, false);
        self.record_snapshot();

        let position = self.courier.position();
        let at_dropoff = self.courier.queue().current().map_or(false, |o| o.dropoff == position);
        Ok(ActionOutcome::Moved { position, at_dropoff })
    }

    fn accept_here(&mut self) -> Result<ActionOutcome> {
        let order = match self.board.find_at(self.courier.position()) {
            Some(order) => order.clone(),
            None => return Ok(ActionOutcome::Rejected("No job to pick up here".into())),
        };

        let id = order.id.clone();
        self.courier.try_accept(order)?;
        self.board.remove(&id);
        Ok(ActionOutcome::Accepted(id))
    }

    fn sort_inventory(&mut self, key: SortKey) {
        let queue = self.courier.queue_mut();
        match key {
            SortKey::Priority => queue.sort_descending_by(|o| o.priority),
            SortKey::Deadline => queue.sort_descending_by(|o| o.urgency()),
            SortKey::Payout => queue.sort_descending_by(|o| OrderedFloat(o.payout)),
        }
    }

    fn deliver(&mut self) -> Result<ActionOutcome> {
        let dropoff = self
            .courier
            .queue()
            .current()
            .map(|o| o.dropoff)
            .ok_or(CourierError::EmptySelection)?;
        if dropoff != self.courier.position() {
            return Ok(ActionOutcome::Rejected(format!("Drop-off is at {}", dropoff)));
        }

        let now = self.now();
        let result = self
            .courier
            .complete_delivery(now)
            .ok_or(CourierError::EmptySelection)?;
        self.check_end();
        Ok(ActionOutcome::Delivered(result))
    }

    fn wait(&mut self, seconds: f64) -> ActionOutcome {
        let mut left = seconds;
        while left > 0.0 && self.outcome.is_none() {
            let dt = left.min(WAIT_STEP_SECS);
            self.tick(dt);
            left -= dt;
        }
        ActionOutcome::Waited {
            seconds: seconds - left.max(0.0),
        }
    }

    // === HISTORY ===

    fn record_snapshot(&mut self) {
        let snapshot = Snapshot::capture(&self.courier, self.elapsed, self.weather.condition());
        self.history.record(snapshot);
    }

    fn undo(&mut self, steps: usize) -> Result<ActionOutcome> {
        let snapshot = match self.history.peek_back(steps) {
            Some(snapshot) => snapshot.clone(),
            None => return Ok(ActionOutcome::Rejected("Nothing to undo".into())),
        };
        if !self.weather.process().has_row(&snapshot.weather) {
            return Err(CourierError::UnknownCondition(snapshot.weather.to_string()));
        }
        let queue = self.courier.rebuild_queue(snapshot.orders.clone())?;

        self.history.undo(steps);
        self.restore_run(&snapshot.courier, queue, snapshot.elapsed_time);
        self.weather.rewind_to(snapshot.weather)?;

        tracing::info!("Undid {} step(s), back at {}", steps, self.courier.position());
        Ok(ActionOutcome::Undone {
            position: self.courier.position(),
        })
    }

    /// Install restored courier state and clock, then bring the job board
    /// in line with both.
    ///
    /// Orders dropped from the inventory go back on offer, jobs not yet due
    /// at the restored time are withdrawn, and carried jobs are never offered.
    fn restore_run(&mut self, stats: &CourierStats, queue: OrderQueue, elapsed: f64) {
        let previous: Vec<Order> = self.courier.queue().orders().to_vec();
        self.courier.restore_with(stats, queue);
        self.elapsed = elapsed;
        self.idle_secs = 0.0;

        for order in previous {
            if self.courier.queue().position_of(&order.id).is_none() {
                self.board.reoffer(order);
            }
        }
        self.board.rewind(elapsed);
        self.board.update(elapsed);
        let carried: Vec<OrderId> = self.courier.queue().iter().map(|o| o.id.clone()).collect();
        for id in &carried {
            self.board.remove(id);
        }
    }

    pub fn save(&self, slot: SlotId) -> Result<PathBuf> {
        let state = SaveState {
            player: SavedPlayer::from_courier(&self.courier),
            inventory: self.courier.queue().orders().to_vec(),
            elapsed_time: self.elapsed,
            weather_state: self.weather.condition().clone(),
            weather_timer: self.weather.timer(),
            timestamp: Utc::now(),
            run_id: Some(self.run_id),
        };
        self.saves.save(slot, &state)
    }

    pub fn load(&mut self, slot: SlotId) -> Result<()> {
        let state = self.saves.load(slot)?;
        if !self.weather.process().has_row(&state.weather_state) {
            return Err(CourierError::UnknownCondition(state.weather_state.to_string()));
        }
        let queue = self.courier.rebuild_queue(state.inventory)?;

        self.restore_run(&state.player.stats(), queue, state.elapsed_time);
        self.weather.restore(state.weather_state, state.weather_timer)?;

        self.history.clear();
        self.record_snapshot();
        Ok(())
    }

    // === ACCESSORS ===

    pub fn courier(&self) -> &Courier {
        &self.courier
    }

    pub fn courier_mut(&mut self) -> &mut Courier {
        &mut self.courier
    }

    pub fn map(&self) -> &CityMap {
        &self.map
    }

    pub fn board(&self) -> &OrderBoard {
        &self.board
    }

    pub fn weather(&self) -> &WeatherCycle {
        &self.weather
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn remaining_secs(&self) -> f64 {
        (self.config.run_duration_secs - self.elapsed).max(0.0)
    }

    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}
