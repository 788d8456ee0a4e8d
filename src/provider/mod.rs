//! Content provider - map, jobs and weather for a run
//!
//! Every document is fetched live when possible, cached on success, and read
//! back from the cache (then the bundled data directory) when the API is
//! unreachable, slow or returns an error.

pub mod cache;
pub mod source;

pub use cache::DiskCache;
pub use source::{HttpSource, RemoteSource};

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::city::{CityMap, MapData};
use crate::core::error::Result;
use crate::orders::Order;
use crate::weather::{WeatherCondition, WeatherProcess};

pub const MAP_ENDPOINT: &str = "city/map";
pub const JOBS_ENDPOINT: &str = "city/jobs";
pub const WEATHER_ENDPOINT: &str = "city/weather";

pub const MAP_FILE: &str = "ciudad.json";
pub const JOBS_FILE: &str = "pedidos.json";
pub const WEATHER_FILE: &str = "weather.json";

/// Weather feed: starting condition plus the transition table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub initial_condition: WeatherCondition,
    pub transition: BTreeMap<String, BTreeMap<String, f64>>,
}

impl WeatherData {
    pub fn into_process(self) -> Result<WeatherProcess> {
        WeatherProcess::new(self.initial_condition, &self.transition)
    }
}

#[derive(Debug, Default, Deserialize)]
struct WeatherWire {
    #[serde(default)]
    initial: Option<InitialWire>,
    #[serde(default)]
    transition: BTreeMap<String, BTreeMap<String, f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct InitialWire {
    #[serde(default)]
    condition: Option<String>,
}

/// Everything a run needs, loaded up front
#[derive(Debug, Clone)]
pub struct ContentBundle {
    pub map: CityMap,
    pub jobs: Vec<Order>,
    pub weather: WeatherData,
}

/// Strip the optional `{"data": ...}` envelope
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut obj) if obj.contains_key("data") => {
            obj.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

pub struct ContentProvider<S: RemoteSource> {
    source: S,
    cache: DiskCache,
    offline: bool,
}

impl<S: RemoteSource> ContentProvider<S> {
    pub fn new(source: S, cache: DiskCache) -> Self {
        Self {
            source,
            cache,
            offline: false,
        }
    }

    /// Skip the live source entirely
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Check the API once and go offline if it does not answer
    pub async fn probe(&mut self) -> bool {
        if self.offline {
            return false;
        }
        let healthy = self.source.healthy().await;
        if !healthy {
            tracing::warn!("City API unavailable, switching to offline mode");
            self.offline = true;
        }
        healthy
    }

    async fn fetch_document(&self, endpoint: &str, file: &str) -> Result<Value> {
        if !self.offline {
            match self.source.get_json(endpoint).await {
                Ok(value) => {
                    if let Err(e) = self.cache.write(file, &value) {
                        tracing::warn!("Could not refresh cache for {}: {}", file, e);
                    }
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!("Live fetch of {} failed ({}), using cached copy", endpoint, e);
                }
            }
        }
        self.cache.read(file)
    }

    pub async fn fetch_map(&self) -> Result<MapData> {
        let raw = self.fetch_document(MAP_ENDPOINT, MAP_FILE).await?;
        Ok(serde_json::from_value(unwrap_data(raw))?)
    }

    /// Fetch jobs, moving any pickup or dropoff that sits on a blocked tile
    pub async fn fetch_jobs<R: Rng + ?Sized>(&self, map: &CityMap, rng: &mut R) -> Result<Vec<Order>> {
        let raw = self.fetch_document(JOBS_ENDPOINT, JOBS_FILE).await?;
        let mut jobs: Vec<Order> = serde_json::from_value(unwrap_data(raw))?;

        for job in &mut jobs {
            if map.is_blocked(job.pickup) {
                let fixed = map.nearest_walkable(job.pickup, rng);
                tracing::debug!("Job {} pickup moved {} -> {}", job.id, job.pickup, fixed);
                job.pickup = fixed;
            }
            if map.is_blocked(job.dropoff) {
                let fixed = map.nearest_walkable(job.dropoff, rng);
                tracing::debug!("Job {} dropoff moved {} -> {}", job.id, job.dropoff, fixed);
                job.dropoff = fixed;
            }
        }
        Ok(jobs)
    }

    pub async fn fetch_weather(&self) -> Result<WeatherData> {
        let raw = self.fetch_document(WEATHER_ENDPOINT, WEATHER_FILE).await?;
        let wire: WeatherWire = serde_json::from_value(unwrap_data(raw))?;

        let initial_condition = wire
            .initial
            .and_then(|i| i.condition)
            .map(WeatherCondition::from)
            .unwrap_or_default();

        Ok(WeatherData {
            initial_condition,
            transition: wire.transition,
        })
    }

    /// Load map, jobs and weather for a new run
    pub async fn load_all<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ContentBundle> {
        let map = CityMap::new(self.fetch_map().await?)?;
        let jobs = self.fetch_jobs(&map, rng).await?;
        let weather = self.fetch_weather().await?;

        tracing::info!(
            "Loaded {}x{} map, {} jobs, weather starting {}",
            map.width(),
            map.height(),
            jobs.len(),
            weather.initial_condition
        );
        Ok(ContentBundle { map, jobs, weather })
    }
}
