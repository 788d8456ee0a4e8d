//! Durable save slots
//!
//! Each slot is one JSON file, `slot{N}.json`, overwritten on every save.

use std::path::{Path, PathBuf};

use crate::core::error::{CourierError, Result};
use crate::core::types::SlotId;
use crate::history::snapshot::SaveState;

#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, slot: SlotId) -> PathBuf {
        self.dir.join(format!("slot{}.json", slot.0))
    }

    /// Write a slot, replacing whatever was there
    pub fn save(&self, slot: SlotId, state: &SaveState) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.slot_path(slot);
        let tmp = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;

        tracing::info!("Saved game to slot {} ({})", slot, path.display());
        Ok(path)
    }

    pub fn load(&self, slot: SlotId) -> Result<SaveState> {
        let path = self.slot_path(slot);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CourierError::SlotNotFound(slot));
            }
            Err(e) => return Err(e.into()),
        };
        let state = serde_json::from_str(&content)?;
        tracing::info!("Loaded game from slot {}", slot);
        Ok(state)
    }

    pub fn exists(&self, slot: SlotId) -> bool {
        self.slot_path(slot).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::GridPos;
    use crate::courier::Courier;
    use crate::history::snapshot::SavedPlayer;
    use crate::weather::WeatherCondition;
    use chrono::Utc;

    fn state(income: f64) -> SaveState {
        let courier = Courier::new(GridPos::new(2, 3), 900.0);
        let mut player = SavedPlayer::from_courier(&courier);
        player.total_income = income;
        SaveState {
            player,
            inventory: Vec::new(),
            elapsed_time: 42.0,
            weather_state: WeatherCondition::Fog,
            weather_timer: 17.5,
            timestamp: Utc::now(),
            run_id: None,
        }
    }

    #[test]
    fn test_missing_slot_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());
        assert!(matches!(store.load(SlotId(3)), Err(CourierError::SlotNotFound(SlotId(3)))));
        assert!(!store.exists(SlotId(3)));
    }

    #[test]
    fn test_save_overwrites_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("saves"));

        store.save(SlotId(1), &state(10.0)).unwrap();
        store.save(SlotId(1), &state(20.0)).unwrap();

        let loaded = store.load(SlotId(1)).unwrap();
        assert_eq!(loaded.player.total_income, 20.0);
        assert_eq!(loaded.weather_state, WeatherCondition::Fog);
        assert_eq!(loaded.player.x, 2);
    }
}
