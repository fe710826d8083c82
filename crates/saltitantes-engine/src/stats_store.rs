//! JSON file persistence for player statistics.

use std::path::PathBuf;

use saltitantes_core::collaborators::{StatsStore, StoreError};
use saltitantes_types::SessionStats;
use tracing::{debug, info};

/// [`StatsStore`] writing pretty JSON to a single file.
///
/// Saves go to a sibling temp file first and are renamed into place, so a
/// crash mid-write never leaves a truncated stats file behind.
#[derive(Debug, Clone)]
pub struct JsonStatsStore {
    path: PathBuf,
}

impl JsonStatsStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the stored statistics, or fresh ones for `player` if the file
    /// does not exist yet.
    pub fn load(&self, player: &str) -> Result<SessionStats, StoreError> {
        if !self.path.exists() {
            info!(path = %self.path.display(), player, "No stats file, starting fresh");
            return Ok(SessionStats::new(player));
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let stats: SessionStats = serde_json::from_str(&contents)?;
        info!(
            path = %self.path.display(),
            player = stats.player,
            simulations = stats.simulations,
            success_rate = stats.success_rate(),
            "Stats loaded"
        );
        Ok(stats)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StatsStore for JsonStatsStore {
    fn save(&mut self, stats: &SessionStats) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(stats)?;
        let temp = self.temp_path();
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;
        debug!(path = %self.path.display(), simulations = stats.simulations, "Stats saved");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("saltitantes-stats-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn missing_file_yields_fresh_stats() {
        let store = JsonStatsStore::new(scratch_path());
        let stats = store.load("ana").unwrap();
        assert_eq!(stats.player, "ana");
        assert_eq!(stats.simulations, 0);
    }

    #[test]
    fn saved_stats_load_back() {
        let path = scratch_path();
        let mut store = JsonStatsStore::new(&path);
        let mut stats = SessionStats::new("ana");
        stats.simulations = 5;
        stats.successful_simulations = 2;

        store.save(&stats).unwrap();
        let loaded = store.load("someone-else").unwrap();
        assert_eq!(loaded, stats);
        assert!(!store.temp_path().exists());

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let path = scratch_path();
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonStatsStore::new(&path);
        assert!(matches!(store.load("ana"), Err(StoreError::Json { .. })));
        std::fs::remove_file(path).unwrap();
    }
}
