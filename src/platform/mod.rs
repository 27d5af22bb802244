//! Procedural platforms laid end to end.
//!
//! The spawner keeps a sliding window of live platforms. When a follower asks
//! for more track ([`SpawnNextPlatform`]) it picks a prefab, aligns the new
//! platform's first knot with the current platform's last knot, and hands
//! the follower over once it has nearly finished the current platform. The
//! oldest platforms are evicted once the window is full.
//!
//! # Usage
//!
//! ```ignore
//! use bevy::prelude::*;
//! use spline_runner::prelude::*;
//!
//! fn start(mut commands: Commands, mut starts: MessageWriter<StartRun>) {
//!     let player = commands
//!         .spawn((Transform::default(), TrackFollower::default()))
//!         .id();
//!     starts.write(StartRun { player });
//! }
//! ```
//!
//! # Prefab convention
//!
//! A [`PlatformPrefab`] spline starts at its first knot heading along local
//! -Z. The spawner only rotates about that heading, so a prefab that starts
//! sideways will be connected sideways.

mod alignment;
#[cfg(feature = "debug-draw")]
mod gizmos;
mod library;
mod mesh;
mod spawner;

pub use alignment::{connect, Connection};
pub use library::*;
pub use mesh::{deck_profile, extrude_along, PlatformVisuals, ProfileVertex};
pub use spawner::{clear_platforms, pick_prefab, PlatformSpawner, SpawnerRng};

use bevy::prelude::*;

use crate::config::SpawnerSettings;
use crate::follower::{FollowerSystems, TrackFollowPlugin};

/// A spawned platform.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Platform {
    /// Sequence number; the first platform of a run is 0.
    pub index: u32,
    /// Index of the prefab it was built from.
    pub prefab: usize,
}

/// A platform waiting for `follower` to finish the previous one.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingHandoff {
    /// The follower to move onto this platform.
    pub follower: Entity,
}

/// Despawns the entity when the timer finishes.
#[derive(Component, Debug, Clone)]
pub struct DespawnTimer(pub Timer);

impl DespawnTimer {
    /// A one-shot timer that runs out after `seconds`.
    pub fn new(seconds: f32) -> Self {
        Self(Timer::from_seconds(seconds, TimerMode::Once))
    }
}

/// Begin a run: lay the first platform and put `player` on it.
#[derive(Message, Debug, Clone, Copy)]
pub struct StartRun {
    /// Entity carrying a [`TrackFollower`](crate::follower::TrackFollower).
    pub player: Entity,
}

/// Emitted after a platform has been attached to the previous one.
#[derive(Message, Debug, Clone, Copy)]
pub struct PlatformConnected {
    /// The new platform.
    pub platform: Entity,
    /// The platform it was attached to.
    pub previous: Entity,
    /// World position of the previous platform's end.
    pub end: Vec3,
    /// Heading at that end.
    pub forward: Vec3,
    /// The new platform's start before it was moved into place.
    pub unaligned_start: Vec3,
}

/// Ordering of platform systems inside `Update`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformSystems {
    /// Build visuals and start runs.
    Start,
    /// Answer spawn requests.
    Spawn,
    /// Hand followers to new platforms.
    Handoff,
    /// Despawn evicted platforms.
    Despawn,
}

/// Plugin for endless, procedurally connected platforms.
///
/// Adds [`TrackFollowPlugin`] if it is not already present.
#[derive(Default)]
pub struct PlatformPlugin {
    /// Spawner tuning.
    pub settings: SpawnerSettings,
}

impl Plugin for PlatformPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<TrackFollowPlugin>() {
            app.add_plugins(TrackFollowPlugin);
        }

        app.register_type::<Platform>()
            .init_resource::<PlatformLibrary>()
            .insert_resource(PlatformSpawner::new(self.settings.clone()))
            .insert_resource(SpawnerRng::from_seed(self.settings.seed))
            .add_message::<StartRun>()
            .add_message::<PlatformConnected>()
            .configure_sets(
                Update,
                (
                    PlatformSystems::Start.before(FollowerSystems::ApplyCommands),
                    (
                        PlatformSystems::Spawn,
                        PlatformSystems::Handoff,
                        PlatformSystems::Despawn,
                    )
                        .chain()
                        .after(FollowerSystems::Advance),
                ),
            )
            .add_systems(
                Update,
                (
                    (
                        mesh::build_platform_visuals.run_if(
                            resource_exists::<Assets<Mesh>>
                                .and(resource_exists::<Assets<StandardMaterial>>)
                                .and(resource_changed::<PlatformLibrary>),
                        ),
                        spawner::spawn_first_platform,
                    )
                        .chain()
                        .in_set(PlatformSystems::Start),
                    spawner::spawn_next_platform.in_set(PlatformSystems::Spawn),
                    spawner::resolve_handoffs.in_set(PlatformSystems::Handoff),
                    spawner::tick_despawn_timers.in_set(PlatformSystems::Despawn),
                ),
            );

        #[cfg(feature = "debug-draw")]
        app.add_plugins(gizmos::ConnectionGizmosPlugin);
    }
}
