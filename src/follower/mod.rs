//! Moving the player along platform splines.
//!
//! A [`TrackFollower`] advances along the spline of the platform it is
//! assigned to while its forward key is held. It asks for the next platform
//! partway along, then waits near the end until a [`TrackCommand`] hands it
//! to the new spline.
//!
//! # Example
//!
//! ```rust,ignore
//! use bevy::prelude::*;
//! use spline_runner::prelude::*;
//!
//! fn setup(mut commands: Commands, mut tracks: MessageWriter<TrackCommand>) {
//!     let platform = commands
//!         .spawn((Transform::default(), PlatformLibrary::default().prefabs[0].spline.clone()))
//!         .id();
//!     let player = commands
//!         .spawn((Transform::default(), TrackFollower::default().with_speed(8.0)))
//!         .id();
//!
//!     tracks.write(TrackCommand {
//!         follower: player,
//!         spline: platform,
//!         kind: TrackCommandKind::Set,
//!     });
//! }
//! ```

mod components;
mod systems;

pub use components::*;
pub use systems::{closest_entry_t, place_on_track, HANDOFF_SAMPLES, HANDOFF_STEP};

use bevy::prelude::*;

use crate::spline::SplinePlugin;

/// Ordering of follower systems inside `Update`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowerSystems {
    /// Apply queued [`TrackCommand`]s.
    ApplyCommands,
    /// Move followers and emit spawn requests.
    Advance,
}

/// Plugin that moves [`TrackFollower`] entities along platform splines.
pub struct TrackFollowPlugin;

impl Plugin for TrackFollowPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<SplinePlugin>() {
            app.add_plugins(SplinePlugin);
        }

        app.register_type::<TrackFollower>()
            .register_type::<FollowerState>()
            .add_message::<TrackCommand>()
            .add_message::<SpawnNextPlatform>()
            .add_message::<FollowerEvent>()
            .configure_sets(
                Update,
                (FollowerSystems::ApplyCommands, FollowerSystems::Advance).chain(),
            )
            .add_systems(
                Update,
                (
                    systems::apply_track_commands.in_set(FollowerSystems::ApplyCommands),
                    systems::advance_followers.in_set(FollowerSystems::Advance),
                ),
            );
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::time::TimeUpdateStrategy;

    use super::*;
    use crate::spline::{Spline, SplineType};

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<ButtonInput<KeyCode>>()
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
            .add_plugins(TrackFollowPlugin);
        app
    }

    fn spawn_straight(app: &mut App, origin: Vec3) -> Entity {
        app.world_mut()
            .spawn((
                Name::new("Straight"),
                Transform::from_translation(origin),
                Spline::new(
                    SplineType::CubicBezier,
                    vec![
                        Vec3::ZERO,
                        Vec3::new(0.0, 0.0, -10.0 / 3.0),
                        Vec3::new(0.0, 0.0, -20.0 / 3.0),
                        Vec3::new(0.0, 0.0, -10.0),
                    ],
                ),
            ))
            .id()
    }

    fn command(app: &mut App, follower: Entity, spline: Entity, kind: TrackCommandKind) {
        app.world_mut()
            .write_message(TrackCommand {
                follower,
                spline,
                kind,
            });
    }

    fn drain_events(app: &mut App) -> Vec<FollowerEventKind> {
        app.world_mut()
            .resource_mut::<Messages<FollowerEvent>>()
            .drain()
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn follower_stays_put_without_input() {
        let mut app = test_app();
        let track = spawn_straight(&mut app, Vec3::ZERO);
        let player = app
            .world_mut()
            .spawn((Transform::default(), TrackFollower::default()))
            .id();
        command(&mut app, player, track, TrackCommandKind::Set);

        for _ in 0..5 {
            app.update();
        }

        let follower = app.world().get::<TrackFollower>(player).unwrap();
        assert_eq!(follower.current_spline(), Some(track));
        assert_eq!(follower.progress(), 0.0);
        assert_eq!(follower.state, FollowerState::Running);
    }

    #[test]
    fn holding_forward_requests_one_spawn_and_waits_at_end() {
        let mut app = test_app();
        let track = spawn_straight(&mut app, Vec3::ZERO);
        let player = app
            .world_mut()
            .spawn((Transform::default(), TrackFollower::default().with_speed(10.0)))
            .id();
        command(&mut app, player, track, TrackCommandKind::Set);
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyW);

        let mut requests = 0;
        let mut events = Vec::new();
        for _ in 0..30 {
            app.update();
            requests += app
                .world_mut()
                .resource_mut::<Messages<SpawnNextPlatform>>()
                .drain()
                .count();
            events.extend(drain_events(&mut app));
        }

        assert_eq!(requests, 1);
        assert_eq!(
            events,
            vec![
                FollowerEventKind::TrackSet,
                FollowerEventKind::SpawnTriggered,
                FollowerEventKind::ReachedEnd,
            ]
        );

        let follower = app.world().get::<TrackFollower>(player).unwrap();
        assert_eq!(follower.progress(), END_HOLD_T);
        let transform = app.world().get::<Transform>(player).unwrap();
        assert!(transform.translation.z < -9.0);
    }

    #[test]
    fn transition_continues_from_nearest_point() {
        let mut app = test_app();
        let first = spawn_straight(&mut app, Vec3::ZERO);
        // Next track starts half a unit behind where the first one ends.
        let second = spawn_straight(&mut app, Vec3::new(0.0, 0.0, -9.5));
        let player = app
            .world_mut()
            .spawn((Transform::from_xyz(0.0, 0.0, -9.9), TrackFollower::default()))
            .id();
        {
            let mut follower = app.world_mut().get_mut::<TrackFollower>(player).unwrap();
            follower.enter_track(first, END_HOLD_T);
            follower.has_triggered_spawn = true;
        }

        command(&mut app, player, second, TrackCommandKind::Transition);
        app.update();

        let follower = app.world().get::<TrackFollower>(player).unwrap();
        assert_eq!(follower.current_spline(), Some(second));
        assert!(!follower.has_triggered_spawn);
        // 0.4 units into a 10 unit straight.
        assert!((follower.progress() - 0.04).abs() < 1e-4);
        assert_eq!(drain_events(&mut app), vec![FollowerEventKind::Transitioned]);
    }

    #[test]
    fn commands_for_missing_tracks_are_ignored() {
        let mut app = test_app();
        let player = app
            .world_mut()
            .spawn((Transform::default(), TrackFollower::default()))
            .id();
        let not_a_track = app.world_mut().spawn_empty().id();
        command(&mut app, player, not_a_track, TrackCommandKind::Set);
        app.update();

        let follower = app.world().get::<TrackFollower>(player).unwrap();
        assert_eq!(follower.current_spline(), None);
        assert_eq!(follower.state, FollowerState::Idle);
    }
}
