//! # spline_runner
//!
//! An endless runner on procedurally connected spline platforms.
//!
//! ## Features
//!
//! - Multiple spline types: Cubic Bézier, Catmull-Rom, B-Spline
//! - A player that follows the current platform while the forward key is held
//! - Platforms picked at random from a prefab library and joined end to end
//! - Seamless hand-off from one platform's spline to the next
//! - A ball that rolls to match the player's movement
//! - A main menu, a chase camera and RON configuration
//!
//! ## Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use spline_runner::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(RunnerPlugin::default())
//!         .run();
//! }
//! ```
//!
//! ## Plugins
//!
//! - [`SplinePlugin`]: Spline types and reflection (required)
//! - [`TrackFollowPlugin`]: Moves players along platform splines
//! - [`PlatformPlugin`]: Spawns, connects and evicts platforms
//! - [`BallPlugin`]: Rolls the player's ball
//! - [`MenuPlugin`]: Main menu and [`GameState`]
//! - [`ChaseCameraPlugin`]: Camera that trails the player
//! - [`RunnerPlugin`]: All of the above, wired to [`GameState`]

pub mod ball;
pub mod camera;
pub mod config;
pub mod error;
pub mod follower;
pub mod geometry;
pub mod menu;
pub mod platform;
pub mod spline;

pub use ball::BallPlugin;
pub use camera::ChaseCameraPlugin;
pub use follower::TrackFollowPlugin;
pub use menu::{GameState, MenuPlugin};
pub use platform::PlatformPlugin;
pub use spline::SplinePlugin;

use bevy::prelude::*;

use ball::BallRoller;
use camera::ChaseCamera;
use config::RunnerConfig;
use follower::TrackFollower;
use platform::{clear_platforms, StartRun};

/// Ball radius in world units.
const BALL_RADIUS: f32 = 0.5;

/// Marks the entity that runs along the platforms.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Plugin that assembles the whole game.
///
/// Entering [`GameState::Playing`] spawns the player and starts a run;
/// leaving it clears every platform and the player.
#[derive(Default)]
pub struct RunnerPlugin {
    pub config: RunnerConfig,
}

impl Plugin for RunnerPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .register_type::<Player>()
            .add_plugins((
                MenuPlugin,
                PlatformPlugin {
                    settings: self.config.spawner.clone(),
                },
                BallPlugin,
                ChaseCameraPlugin,
            ))
            .add_systems(OnEnter(GameState::Playing), spawn_player)
            .add_systems(OnExit(GameState::Playing), clear_platforms);
    }
}

fn spawn_player(
    mut commands: Commands,
    config: Res<RunnerConfig>,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
    mut cameras: Query<&mut ChaseCamera>,
    mut starts: MessageWriter<StartRun>,
) {
    let player = commands
        .spawn((
            Name::new("Player"),
            Player,
            TrackFollower::from_settings(&config.follower),
            Transform::default(),
            Visibility::default(),
            DespawnOnExit(GameState::Playing),
        ))
        .id();

    let mut ball = commands.spawn((
        Name::new("Ball"),
        BallRoller::from_settings(&config.ball),
        Transform::from_xyz(0.0, BALL_RADIUS, 0.0).with_scale(Vec3::splat(BALL_RADIUS * 2.0)),
        Visibility::default(),
        ChildOf(player),
    ));
    if let (Some(mut meshes), Some(mut materials)) = (meshes, materials) {
        ball.insert((
            Mesh3d(meshes.add(Sphere::new(0.5))),
            MeshMaterial3d(materials.add(Color::srgb(0.9, 0.35, 0.2))),
        ));
    }

    for mut camera in &mut cameras {
        camera.target = Some(player);
    }

    starts.write(StartRun { player });
    info!("Run started");
}

/// Convenient re-exports of commonly used types.
pub mod prelude {
    pub use crate::ball::{BallPlugin, BallRoller};
    pub use crate::camera::{ChaseCamera, ChaseCameraPlugin};
    pub use crate::config::{
        BallSettings, CameraSettings, FollowerSettings, RunnerConfig, SpawnerSettings,
    };
    pub use crate::error::{ConfigError, SpawnError};
    pub use crate::follower::{
        FollowerEvent, FollowerEventKind, FollowerState, SpawnNextPlatform, TrackCommand,
        TrackCommandKind, TrackFollowPlugin, TrackFollower,
    };
    pub use crate::menu::{GameState, MenuAction, MenuPlugin};
    pub use crate::platform::{
        Platform, PlatformConnected, PlatformLibrary, PlatformPlugin, PlatformPrefab,
        PlatformSpawner, StartRun,
    };
    pub use crate::spline::{Knot, Spline, SplineEvaluator, SplinePlugin, SplineType};
    pub use crate::{Player, RunnerPlugin};
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::{
        input::mouse::{MouseMotion, MouseWheel},
        state::app::StatesPlugin,
        time::TimeUpdateStrategy,
    };

    use super::prelude::*;
    use super::*;

    fn test_app() -> App {
        let mut app = App::new();
        let mut config = RunnerConfig::default();
        config.spawner.seed = Some(7);

        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<ButtonInput<MouseButton>>()
            .add_message::<MouseMotion>()
            .add_message::<MouseWheel>()
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(50)))
            .add_plugins(RunnerPlugin { config });
        app.update();
        app
    }

    fn count<F: bevy::ecs::query::QueryFilter>(app: &mut App) -> usize {
        let mut query = app.world_mut().query_filtered::<(), F>();
        query.iter(app.world()).count()
    }

    fn tap(app: &mut App, key: KeyCode) {
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(key);
        app.update();
        let mut keyboard = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keyboard.release(key);
        keyboard.clear();
    }

    #[test]
    fn playing_spawns_player_on_first_platform() {
        let mut app = test_app();
        let camera = app.world_mut().spawn(ChaseCamera::default()).id();

        tap(&mut app, KeyCode::Enter);
        app.update();
        app.update();

        assert_eq!(count::<With<Player>>(&mut app), 1);
        assert_eq!(count::<With<BallRoller>>(&mut app), 1);
        assert_eq!(count::<With<Platform>>(&mut app), 1);

        let mut players = app.world_mut().query_filtered::<(Entity, &TrackFollower), With<Player>>();
        let (player, follower) = players.single(app.world()).unwrap();
        let platform = app.world().resource::<PlatformSpawner>().current_platform();
        assert_eq!(follower.current_spline(), platform);
        assert_eq!(app.world().get::<ChaseCamera>(camera).unwrap().target, Some(player));
    }

    #[test]
    fn running_extends_track_and_escape_clears_it() {
        let mut app = test_app();
        tap(&mut app, KeyCode::Enter);
        app.update();

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyW);
        for _ in 0..40 {
            app.update();
        }
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .release(KeyCode::KeyW);
        assert!(count::<With<Platform>>(&mut app) >= 2);

        tap(&mut app, KeyCode::Escape);
        app.update();

        assert_eq!(
            *app.world().resource::<State<GameState>>().get(),
            GameState::MainMenu
        );
        assert_eq!(count::<With<Player>>(&mut app), 0);
        assert_eq!(count::<With<BallRoller>>(&mut app), 0);
        assert_eq!(count::<With<Platform>>(&mut app), 0);
        assert!(app.world().resource::<PlatformSpawner>().active.is_empty());
    }
}
