//! Configuration loading and typed config structures for the Saltitantes simulation.
//!
//! The canonical configuration lives in `saltitantes-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads and validates the file.
//! Every field has a default, so an empty file (or no file) is valid.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an unusable simulation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `saltitantes-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Panel geometry used for bounds and the ground line.
    #[serde(default)]
    pub panel: PanelConfig,

    /// Gravity, bounce, fusion distance and the physics tick rate.
    #[serde(default)]
    pub physics: PhysicsConfig,

    /// Gold, score rewards and the logic tick rate.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Simulation boundary parameters.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where player statistics are stored.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for storage:
    /// - `SALTITANTES_STATS_PATH` overrides `storage.stats_path`
    /// - `SALTITANTES_PLAYER` overrides `storage.player`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.storage.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the simulation cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.panel.width <= self.panel.creature_size {
            return Err(invalid("panel.width must exceed panel.creature_size"));
        }
        if self.panel.height <= self.panel.creature_size.saturating_add(self.panel.ground_margin) {
            return Err(invalid(
                "panel.height must exceed panel.creature_size + panel.ground_margin",
            ));
        }
        if self.physics.fuse_distance == 0 {
            return Err(invalid("physics.fuse_distance must be at least 1"));
        }
        if self.physics.horizontal_speed <= 0 {
            return Err(invalid("physics.horizontal_speed must be positive"));
        }
        if self.physics.tick_interval_ms == 0 {
            return Err(invalid("physics.tick_interval_ms must be at least 1"));
        }
        if self.economy.logic_tick_interval_ms == 0 {
            return Err(invalid("economy.logic_tick_interval_ms must be at least 1"));
        }
        if !self.economy.starting_gold.is_finite() || self.economy.starting_gold < 0.0 {
            return Err(invalid("economy.starting_gold must be a non-negative number"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// Panel geometry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PanelConfig {
    /// Panel width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Panel height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Diameter / side length of every creature shape.
    #[serde(default = "default_creature_size")]
    pub creature_size: u32,

    /// Gap between the ground line and the bottom of the panel.
    #[serde(default = "default_ground_margin")]
    pub ground_margin: u32,
}

impl PanelConfig {
    /// The y coordinate creatures bounce off.
    pub fn ground_y(&self) -> i32 {
        let ground = self
            .height
            .saturating_sub(self.creature_size)
            .saturating_sub(self.ground_margin);
        i32::try_from(ground).unwrap_or(i32::MAX)
    }

    /// Largest legal x coordinate (`width - creature_size`).
    pub fn max_x(&self) -> i32 {
        let span = self.width.saturating_sub(self.creature_size);
        i32::try_from(span).unwrap_or(i32::MAX)
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            creature_size: default_creature_size(),
            ground_margin: default_ground_margin(),
        }
    }
}

/// Physics parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhysicsConfig {
    /// Added to every creature's vertical speed each physics tick.
    #[serde(default = "default_gravity")]
    pub gravity: i32,

    /// Vertical speed a creature receives when it hits the ground.
    #[serde(default = "default_jump_force")]
    pub jump_force: i32,

    /// Maximum horizontal gap for two creatures to be co-located.
    #[serde(default = "default_fuse_distance")]
    pub fuse_distance: u32,

    /// Horizontal step per movement turn for spawned creatures.
    #[serde(default = "default_horizontal_speed")]
    pub horizontal_speed: i32,

    /// Real-time milliseconds between physics ticks.
    #[serde(default = "default_physics_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            jump_force: default_jump_force(),
            fuse_distance: default_fuse_distance(),
            horizontal_speed: default_horizontal_speed(),
            tick_interval_ms: default_physics_tick_interval_ms(),
        }
    }
}

/// Economy and scoring parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EconomyConfig {
    /// Gold each normal creature starts with.
    #[serde(default = "default_starting_gold")]
    pub starting_gold: f64,

    /// Real-time milliseconds between logic (theft) ticks.
    #[serde(default = "default_logic_tick_interval_ms")]
    pub logic_tick_interval_ms: u64,

    /// Points credited for every successful theft.
    #[serde(default = "default_theft_points")]
    pub theft_points: f64,

    /// Points credited per member when a cluster is formed.
    #[serde(default = "default_merge_points_per_member")]
    pub merge_points_per_member: f64,

    /// Points credited for every cluster the guardian absorbs.
    #[serde(default = "default_absorption_points")]
    pub absorption_points: f64,

    /// Score at or above which a stopped simulation counts as a win.
    #[serde(default = "default_win_threshold")]
    pub win_threshold: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_gold: default_starting_gold(),
            logic_tick_interval_ms: default_logic_tick_interval_ms(),
            theft_points: default_theft_points(),
            merge_points_per_member: default_merge_points_per_member(),
            absorption_points: default_absorption_points(),
            win_threshold: default_win_threshold(),
        }
    }
}

/// Simulation boundary configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Physics ticks after which a running simulation stops (0 = unlimited).
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,

    /// Seed for the planner RNG. Unset means OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            seed: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Player statistics storage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the player's [`SessionStats`](saltitantes_types::SessionStats).
    #[serde(default = "default_stats_path")]
    pub stats_path: String,

    /// Player the statistics belong to.
    #[serde(default = "default_player")]
    pub player: String,
}

impl StorageConfig {
    /// Override storage settings with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SALTITANTES_STATS_PATH") {
            self.stats_path = val;
        }
        if let Ok(val) = std::env::var("SALTITANTES_PLAYER") {
            self.player = val;
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            stats_path: default_stats_path(),
            player: default_player(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_width() -> u32 {
    720
}

const fn default_height() -> u32 {
    480
}

const fn default_creature_size() -> u32 {
    50
}

const fn default_ground_margin() -> u32 {
    40
}

const fn default_gravity() -> i32 {
    1
}

const fn default_jump_force() -> i32 {
    -15
}

const fn default_fuse_distance() -> u32 {
    50
}

const fn default_horizontal_speed() -> i32 {
    1
}

const fn default_physics_tick_interval_ms() -> u64 {
    10
}

const fn default_starting_gold() -> f64 {
    1_000_000.0
}

const fn default_logic_tick_interval_ms() -> u64 {
    3_000
}

const fn default_theft_points() -> f64 {
    5.0
}

const fn default_merge_points_per_member() -> f64 {
    20.0
}

const fn default_absorption_points() -> f64 {
    50.0
}

const fn default_win_threshold() -> f64 {
    500.0
}

const fn default_max_iterations() -> u64 {
    100_000
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_stats_path() -> String {
    "saltitantes-stats.json".to_owned()
}

fn default_player() -> String {
    "player".to_owned()
}
