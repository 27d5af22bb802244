//! Tunable gameplay settings, loadable from RON.
//!
//! Every section has defaults matching the shipped game, so a config file
//! only needs to list what it changes:
//!
//! ```ron
//! (
//!     follower: (speed: 8.0),
//!     spawner: (max_active_platforms: 4, seed: Some(7)),
//! )
//! ```

use std::path::Path;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration for a run.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub follower: FollowerSettings,
    pub spawner: SpawnerSettings,
    pub ball: BallSettings,
    pub camera: CameraSettings,
}

impl RunnerConfig {
    /// Parse a config from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Read and parse a RON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }
}

/// Movement along the track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowerSettings {
    /// World units per second while the forward key is held.
    pub speed: f32,
    /// Progress on the current platform at which the next one is requested.
    pub spawn_trigger: f32,
}

impl Default for FollowerSettings {
    fn default() -> Self {
        Self {
            speed: 5.0,
            spawn_trigger: 0.25,
        }
    }
}

/// Platform generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerSettings {
    /// Size of the window of live platforms; older ones are evicted first.
    pub max_active_platforms: usize,
    /// Extra distance left between the end of one platform and the next.
    pub connection_gap: f32,
    /// Log every connection and draw connection gizmos.
    pub debug_mode: bool,
    /// Seconds an evicted platform lingers before it is despawned.
    pub despawn_delay: f32,
    /// Follower progress at which it is handed to a freshly spawned platform.
    pub handoff_progress: f32,
    /// Seed for prefab selection. `None` seeds from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for SpawnerSettings {
    fn default() -> Self {
        Self {
            max_active_platforms: 3,
            connection_gap: 0.0,
            debug_mode: true,
            despawn_delay: 0.5,
            handoff_progress: 0.98,
            seed: None,
        }
    }
}

/// Visual rolling of the ball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallSettings {
    /// Scales how far the ball spins per unit travelled.
    pub rotation_multiplier: f32,
}

impl Default for BallSettings {
    fn default() -> Self {
        Self {
            rotation_multiplier: 1.0,
        }
    }
}

/// Chase camera placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Distance from the followed target.
    pub distance: f32,
    /// Elevation angle in radians.
    pub pitch: f32,
    /// How quickly the camera catches up with the target, per second.
    pub smoothing: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            distance: 10.0,
            pitch: 0.45,
            smoothing: 6.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = RunnerConfig::from_ron_str(
            "(follower: (speed: 8.0), spawner: (max_active_platforms: 4, seed: Some(7)))",
        )
        .unwrap();

        assert_eq!(config.follower.speed, 8.0);
        assert_eq!(config.follower.spawn_trigger, 0.25);
        assert_eq!(config.spawner.max_active_platforms, 4);
        assert_eq!(config.spawner.seed, Some(7));
        assert_eq!(config.ball, BallSettings::default());
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(RunnerConfig::from_ron_str("()").unwrap(), RunnerConfig::default());
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config = RunnerConfig::from_ron_str(include_str!("../runner.ron")).unwrap();
        assert_eq!(config, RunnerConfig::default());
    }

    #[test]
    fn malformed_config_is_a_parse_error() {
        let err = RunnerConfig::from_ron_str("(follower: (speed: \"fast\"))").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = RunnerConfig::load("does/not/exist.ron").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
