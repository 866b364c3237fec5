//! Tunables for a play session.
//!
//! Every field has a default matching the 800x600 reference canvas, and the
//! host may override any subset through JSON (missing keys keep the default).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Upper bound on particles emitted by a single jump or coin burst.
pub const MAX_PARTICLES_PER_BURST: usize = 64;

/// Physics, spawn cadence and scoring constants for one [`crate::Session`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // --- Play area -----------------------------------------------------------
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Distance from the bottom edge of the canvas to the ground line.
    pub ground_margin: f64,

    // --- Player ----------------------------------------------------------------
    pub player_x: f64,
    pub player_width: f64,
    pub player_height: f64,
    /// Added to vertical velocity every update (positive = downward).
    pub gravity: f64,
    /// Velocity set by a grounded jump (negative = upward).
    pub jump_impulse: f64,

    // --- World scroll --------------------------------------------------------
    pub scroll_speed: f64,
    /// Constant per-frame increase of `scroll_speed`.
    pub speed_ramp: f64,

    // --- Obstacles -------------------------------------------------------------
    pub obstacle_width: f64,
    pub obstacle_min_height: f64,
    pub obstacle_max_height: f64,
    /// A new obstacle spawns once the last one is this far left of the right edge.
    pub obstacle_spawn_threshold: f64,
    /// Extra random distance beyond the right edge for newly spawned obstacles.
    pub obstacle_min_gap: f64,
    pub obstacle_max_gap: f64,

    // --- Coins -------------------------------------------------------------------
    pub coin_size: f64,
    pub coin_spawn_threshold: f64,
    pub coin_min_offset: f64,
    pub coin_max_offset: f64,
    /// Highest (smallest y) a coin may spawn at.
    pub coin_min_y: f64,
    pub coin_bonus: u64,

    // --- Scoring / cosmetics -------------------------------------------------
    pub score_per_frame: u64,
    pub particle_count: usize,
    pub particle_gravity: f64,
    /// Fixed time step consumed by one `update()` (seconds). Only particles
    /// and the contrast cycle read it; physics is per-frame.
    pub frame_dt: f64,
    /// Seconds between contrast toggles in the web shell.
    pub contrast_period: f64,

    /// RNG seed. `None` lets the host pick one per page load.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            ground_margin: 100.0,

            player_x: 100.0,
            player_width: 40.0,
            player_height: 40.0,
            gravity: 0.8,
            jump_impulse: -18.0,

            scroll_speed: 3.0,
            speed_ramp: 0.001,

            obstacle_width: 30.0,
            obstacle_min_height: 60.0,
            obstacle_max_height: 60.0,
            obstacle_spawn_threshold: 300.0,
            obstacle_min_gap: 0.0,
            obstacle_max_gap: 0.0,

            coin_size: 20.0,
            coin_spawn_threshold: 200.0,
            coin_min_offset: 50.0,
            coin_max_offset: 200.0,
            coin_min_y: 200.0,
            coin_bonus: 50,

            score_per_frame: 1,
            particle_count: 5,
            particle_gravity: 0.2,
            frame_dt: 1.0 / 60.0,
            contrast_period: 15.0,

            seed: None,
        }
    }
}

impl GameConfig {
    /// Config for a canvas of the given size, keeping every other default.
    pub fn for_canvas(width: f64, height: f64) -> Self {
        Self {
            canvas_width: width,
            canvas_height: height,
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON override and validate the result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Resting feet position of the player.
    pub fn ground_line(&self) -> f64 {
        self.canvas_height - self.ground_margin
    }

    pub fn obstacle_heights(&self) -> RangeInclusive<f64> {
        self.obstacle_min_height..=self.obstacle_max_height
    }

    pub fn obstacle_gaps(&self) -> RangeInclusive<f64> {
        self.obstacle_min_gap..=self.obstacle_max_gap
    }

    pub fn coin_offsets(&self) -> RangeInclusive<f64> {
        self.coin_min_offset..=self.coin_max_offset
    }

    /// Vertical spawn band for coins; collapses to the top bound on tiny canvases.
    pub fn coin_heights(&self) -> RangeInclusive<f64> {
        let max_y = (self.ground_line() - 50.0).max(self.coin_min_y);
        self.coin_min_y..=max_y
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_width <= 0.0 || self.canvas_height <= 0.0 {
            return Err(ConfigError::Invalid("canvas dimensions must be positive"));
        }
        if self.ground_margin < 0.0 || self.ground_margin >= self.canvas_height {
            return Err(ConfigError::Invalid("ground margin must lie inside the canvas"));
        }
        if self.player_width <= 0.0 || self.player_height <= 0.0 {
            return Err(ConfigError::Invalid("player size must be positive"));
        }
        if self.player_height > self.ground_line() {
            return Err(ConfigError::Invalid("player does not fit above the ground line"));
        }
        if self.gravity <= 0.0 {
            return Err(ConfigError::Invalid("gravity must be positive (downward)"));
        }
        if self.jump_impulse >= 0.0 {
            return Err(ConfigError::Invalid("jump impulse must be negative (upward)"));
        }
        if self.scroll_speed <= 0.0 || self.speed_ramp < 0.0 {
            return Err(ConfigError::Invalid("scroll speed must be positive and non-decreasing"));
        }
        if self.obstacle_width <= 0.0 || self.obstacle_min_height <= 0.0 {
            return Err(ConfigError::Invalid("obstacle size must be positive"));
        }
        if self.obstacle_min_height > self.obstacle_max_height
            || self.obstacle_min_gap > self.obstacle_max_gap
            || self.coin_min_offset > self.coin_max_offset
        {
            return Err(ConfigError::Invalid("range minimum exceeds maximum"));
        }
        if self.obstacle_min_gap < 0.0 || self.coin_min_offset < 0.0 {
            return Err(ConfigError::Invalid("spawn offsets must not be negative"));
        }
        // A negative threshold spawns past the previous obstacle every frame.
        if self.obstacle_spawn_threshold < 0.0 || self.coin_spawn_threshold < 0.0 {
            return Err(ConfigError::Invalid("spawn thresholds must not be negative"));
        }
        if self.score_per_frame == 0 {
            return Err(ConfigError::Invalid("score per frame must be positive"));
        }
        if self.particle_count > MAX_PARTICLES_PER_BURST {
            return Err(ConfigError::Invalid("particle count exceeds the per-burst cap"));
        }
        if self.coin_size <= 0.0 {
            return Err(ConfigError::Invalid("coin size must be positive"));
        }
        if self.frame_dt <= 0.0 || self.contrast_period <= 0.0 {
            return Err(ConfigError::Invalid("time steps must be positive"));
        }
        Ok(())
    }
}

/// Why a host-supplied config was rejected.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "malformed config JSON: {e}"),
            ConfigError::Invalid(why) => write!(f, "invalid config: {why}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = GameConfig::default();
        assert!(cfg.validate().is_ok());
        assert!((cfg.ground_line() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = GameConfig::from_json(r#"{ "gravity": 1.2, "seed": 7 }"#).unwrap();
        assert!((cfg.gravity - 1.2).abs() < 1e-9);
        assert_eq!(cfg.seed, Some(7));
        assert!((cfg.jump_impulse - (-18.0)).abs() < 1e-9);
        assert_eq!(cfg.score_per_frame, 1);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = GameConfig::from_json("{ gravity: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_upward_gravity_rejected() {
        let err = GameConfig::from_json(r#"{ "gravity": -0.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("gravity"));
    }

    #[test]
    fn test_inverted_height_range_rejected() {
        let cfg = GameConfig {
            obstacle_min_height: 80.0,
            obstacle_max_height: 40.0,
            ..GameConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_negative_obstacle_threshold_rejected() {
        let err = GameConfig::from_json(
            r#"{ "obstacle_spawn_threshold": -200, "obstacle_max_gap": 150 }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("spawn thresholds"));
    }

    #[test]
    fn test_negative_coin_threshold_rejected() {
        let cfg = GameConfig { coin_spawn_threshold: -1.0, ..GameConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
        // Zero keeps spawning in order, so it stays allowed.
        let cfg = GameConfig { coin_spawn_threshold: 0.0, ..GameConfig::default() };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_score_per_frame_rejected() {
        let err = GameConfig::from_json(r#"{ "score_per_frame": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("score per frame"));
    }

    #[test]
    fn test_particle_count_capped() {
        let at_cap = GameConfig {
            particle_count: MAX_PARTICLES_PER_BURST,
            ..GameConfig::default()
        };
        assert!(at_cap.validate().is_ok());
        let err = GameConfig::from_json(r#"{ "particle_count": 100000 }"#).unwrap_err();
        assert!(err.to_string().contains("particle count"));
    }

    #[test]
    fn test_for_canvas_moves_ground() {
        let cfg = GameConfig::for_canvas(1280.0, 720.0);
        assert!((cfg.ground_line() - 620.0).abs() < 1e-9);
        let band = cfg.coin_heights();
        assert!((*band.start() - 200.0).abs() < 1e-9);
        assert!((*band.end() - 570.0).abs() < 1e-9);
    }
}
