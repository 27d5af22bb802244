//! Error types for platform spawning and configuration loading.

use std::path::PathBuf;

use bevy::prelude::*;
use thiserror::Error;

/// Reasons a platform could not be spawned or connected.
#[derive(Debug, Error, PartialEq)]
pub enum SpawnError {
    /// The platform library has no prefabs to instantiate.
    #[error("platform library is empty")]
    EmptyLibrary,
    /// Another spawn is still being processed.
    #[error("a platform spawn is already in progress")]
    AlreadySpawning,
    /// The picked prefab index is not in the library.
    #[error("no prefab at index {0}")]
    UnknownPrefab(usize),
    /// The active window holds no platform to connect to.
    #[error("no current platform found")]
    NoCurrentPlatform,
    /// The platform entity exists but carries no spline.
    #[error("platform {0} is missing its spline")]
    MissingSpline(Entity),
    /// The spline has too few control points to provide end knots.
    #[error("invalid spline data on {0}")]
    InvalidSpline(String),
}

/// Failures while reading a [`RunnerConfig`](crate::config::RunnerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The config text is not valid RON for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}
