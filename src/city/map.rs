//! City map - the tile grid the courier rides across
//!
//! Tiles are symbols resolved through a legend. Anything off the grid or
//! missing from the legend is treated as blocked.

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{CourierError, Result};
use crate::core::types::GridPos;

/// Furthest ring searched around a blocked job position
pub const SPIRAL_SEARCH_RADIUS: i32 = 9;
/// Random probes before falling back to a linear scan
pub const RANDOM_PROBE_ATTEMPTS: usize = 100;

/// What a legend symbol means
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileKind {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default = "default_surface_weight")]
    pub surface_weight: f64,
    /// Standing still here recovers stamina faster
    #[serde(default)]
    pub rest_point: bool,
}

fn default_surface_weight() -> f64 {
    1.0
}

/// Map payload as delivered by the city feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapData {
    #[serde(default)]
    pub version: Option<String>,
    pub width: i32,
    pub height: i32,
    /// Rows of tile symbols, `tiles[y][x]`
    pub tiles: Vec<Vec<String>>,
    pub legend: AHashMap<String, TileKind>,
    /// Income needed to win the run
    pub goal: f64,
    /// Wall clock time the run starts at; job deadlines are measured against it
    #[serde(default, with = "crate::core::types::iso_timestamp_opt")]
    pub start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CityMap {
    data: MapData,
}

impl CityMap {
    pub fn new(data: MapData) -> Result<Self> {
        if data.width <= 0 || data.height <= 0 {
            return Err(CourierError::InvalidMap(format!(
                "dimensions must be positive, got {}x{}",
                data.width, data.height
            )));
        }
        if data.tiles.len() != data.height as usize {
            return Err(CourierError::InvalidMap(format!(
                "expected {} rows, found {}",
                data.height,
                data.tiles.len()
            )));
        }
        if let Some(y) = data.tiles.iter().position(|row| row.len() != data.width as usize) {
            return Err(CourierError::InvalidMap(format!(
                "row {} has {} tiles, expected {}",
                y,
                data.tiles[y].len(),
                data.width
            )));
        }
        Ok(Self { data })
    }

    pub fn width(&self) -> i32 {
        self.data.width
    }

    pub fn height(&self) -> i32 {
        self.data.height
    }

    pub fn goal(&self) -> f64 {
        self.data.goal
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.data.start_time
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.data.width && pos.y < self.data.height
    }

    /// Tile symbol at `pos`
    pub fn tile(&self, pos: GridPos) -> Option<&str> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.data.tiles[pos.y as usize]
            .get(pos.x as usize)
            .map(|s| s.as_str())
    }

    pub fn kind(&self, pos: GridPos) -> Option<&TileKind> {
        self.tile(pos).and_then(|t| self.data.legend.get(t))
    }

    pub fn is_blocked(&self, pos: GridPos) -> bool {
        self.kind(pos).map_or(true, |k| k.blocked)
    }

    pub fn surface_weight(&self, pos: GridPos) -> f64 {
        self.kind(pos).map_or(1.0, |k| k.surface_weight)
    }

    pub fn is_rest_point(&self, pos: GridPos) -> bool {
        self.kind(pos).map_or(false, |k| k.rest_point)
    }

    /// A walkable tile chosen at random, then by linear scan, then the origin
    pub fn random_walkable<R: Rng + ?Sized>(&self, rng: &mut R) -> GridPos {
        for _ in 0..RANDOM_PROBE_ATTEMPTS {
            let pos = GridPos::new(
                rng.gen_range(0..self.data.width),
                rng.gen_range(0..self.data.height),
            );
            if !self.is_blocked(pos) {
                return pos;
            }
        }
        self.first_walkable().unwrap_or_default()
    }

    /// First walkable tile in row-major order
    pub fn first_walkable(&self) -> Option<GridPos> {
        (0..self.data.height)
            .flat_map(|y| (0..self.data.width).map(move |x| GridPos::new(x, y)))
            .find(|pos| !self.is_blocked(*pos))
    }

    /// Closest walkable tile around `pos`, searching square rings outward.
    ///
    /// Returns `pos` itself when it is already walkable.
    pub fn nearest_walkable<R: Rng + ?Sized>(&self, pos: GridPos, rng: &mut R) -> GridPos {
        if !self.is_blocked(pos) {
            return pos;
        }
        for radius in 1..=SPIRAL_SEARCH_RADIUS {
            for dx in -radius..=radius {
                for dy in -radius..=radius {
                    // inner rings were already searched
                    if dx.abs() != radius && dy.abs() != radius {
                        continue;
                    }
                    let candidate = pos.offset(dx, dy);
                    if self.in_bounds(candidate) && !self.is_blocked(candidate) {
                        return candidate;
                    }
                }
            }
        }
        self.random_walkable(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn legend() -> AHashMap<String, TileKind> {
        let mut legend = AHashMap::new();
        legend.insert(
            "C".into(),
            TileKind { name: Some("street".into()), blocked: false, surface_weight: 1.0, rest_point: false },
        );
        legend.insert(
            "B".into(),
            TileKind { name: Some("building".into()), blocked: true, surface_weight: 1.0, rest_point: false },
        );
        legend.insert(
            "P".into(),
            TileKind { name: Some("park".into()), blocked: false, surface_weight: 0.95, rest_point: true },
        );
        legend
    }

    fn map(rows: &[&str]) -> CityMap {
        let tiles: Vec<Vec<String>> = rows
            .iter()
            .map(|r| r.chars().map(|c| c.to_string()).collect())
            .collect();
        CityMap::new(MapData {
            version: None,
            width: tiles[0].len() as i32,
            height: tiles.len() as i32,
            tiles,
            legend: legend(),
            goal: 1500.0,
            start_time: None,
        })
        .unwrap()
    }

    #[test]
    fn test_tile_lookup() {
        let m = map(&["CBP", "CCC"]);
        assert!(!m.is_blocked(GridPos::new(0, 0)));
        assert!(m.is_blocked(GridPos::new(1, 0)));
        assert!(m.is_rest_point(GridPos::new(2, 0)));
        assert_eq!(m.surface_weight(GridPos::new(2, 0)), 0.95);
    }

    #[test]
    fn test_off_grid_and_unknown_symbols_are_blocked() {
        let m = map(&["CX"]);
        assert!(m.is_blocked(GridPos::new(-1, 0)));
        assert!(m.is_blocked(GridPos::new(0, 5)));
        assert!(m.is_blocked(GridPos::new(1, 0)));
        assert_eq!(m.surface_weight(GridPos::new(1, 0)), 1.0);
    }

    #[test]
    fn test_nearest_walkable_finds_closest_ring() {
        let m = map(&["BBBBB", "BBBBB", "BBBBB", "BBBBC", "CBBBB"]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(m.nearest_walkable(GridPos::new(1, 1), &mut rng), GridPos::new(0, 4));
    }

    #[test]
    fn test_nearest_walkable_keeps_open_tile() {
        let m = map(&["CC"]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(m.nearest_walkable(GridPos::new(1, 0), &mut rng), GridPos::new(1, 0));
    }

    #[test]
    fn test_search_falls_back_beyond_radius() {
        let mut rows = vec!["B".repeat(25); 25];
        rows[24] = format!("{}C", "B".repeat(24));
        let row_refs: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
        let m = map(&row_refs);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        // (24, 24) is more than 9 rings away from the origin
        assert_eq!(m.nearest_walkable(GridPos::new(0, 0), &mut rng), GridPos::new(24, 24));
    }

    #[test]
    fn test_fully_blocked_map_yields_origin() {
        let m = map(&["BB", "BB"]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(m.random_walkable(&mut rng), GridPos::new(0, 0));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let data = MapData {
            version: None,
            width: 3,
            height: 1,
            tiles: vec![vec!["C".into(), "C".into()]],
            legend: legend(),
            goal: 10.0,
            start_time: None,
        };
        assert!(matches!(CityMap::new(data), Err(CourierError::InvalidMap(_))));
    }
}
