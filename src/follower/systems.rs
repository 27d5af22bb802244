use bevy::prelude::*;

use crate::geometry::look_rotation;
use crate::spline::{Spline, DEFAULT_ARC_LENGTH_SAMPLES};

use super::{
    FollowerEvent, FollowerEventKind, SpawnNextPlatform, TrackCommand, TrackCommandKind,
    TrackFollower,
};

/// Number of parameters probed when looking for the entry point on a new track.
pub const HANDOFF_SAMPLES: usize = 10;

/// Spacing of the probed parameters.
pub const HANDOFF_STEP: f32 = 0.01;

/// Platform splines, seen from follower systems.
type Tracks<'w, 's> =
    Query<'w, 's, (&'static Spline, &'static Transform, Option<&'static Name>), Without<TrackFollower>>;

/// System that moves followers along their tracks while their key is held.
pub fn advance_followers(
    mut followers: Query<(Entity, &mut TrackFollower, &mut Transform)>,
    tracks: Tracks,
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut spawn_requests: MessageWriter<SpawnNextPlatform>,
    mut events: MessageWriter<FollowerEvent>,
) {
    let delta = time.delta_secs();

    for (entity, mut follower, mut transform) in &mut followers {
        let Some(track) = follower.spline else {
            continue;
        };

        if !keyboard.pressed(follower.forward_key) {
            continue;
        }

        let Ok((spline, platform, _)) = tracks.get(track) else {
            continue;
        };

        let length = spline.world_length(platform, DEFAULT_ARC_LENGTH_SAMPLES);
        let dt = if length > 0.0 {
            follower.speed / length * delta
        } else {
            0.0
        };

        let outcome = follower.step(dt);

        if outcome.triggered_spawn {
            info!("Triggering spawn at {:.1}% of spline", follower.t * 100.0);
            spawn_requests.write(SpawnNextPlatform { follower: entity });
            events.write(FollowerEvent {
                entity,
                kind: FollowerEventKind::SpawnTriggered,
            });
        }

        if outcome.reached_end {
            debug!("Follower {entity} waiting for the next platform");
            events.write(FollowerEvent {
                entity,
                kind: FollowerEventKind::ReachedEnd,
            });
        }

        place_on_track(follower.t, spline, platform, &mut transform);
    }
}

/// System that puts followers onto new tracks.
pub fn apply_track_commands(
    mut commands: MessageReader<TrackCommand>,
    mut followers: Query<(&mut TrackFollower, &mut Transform)>,
    tracks: Tracks,
    mut events: MessageWriter<FollowerEvent>,
) {
    for command in commands.read() {
        let Ok((mut follower, mut transform)) = followers.get_mut(command.follower) else {
            warn!("Track command for {} which has no TrackFollower", command.follower);
            continue;
        };

        let Ok((spline, platform, name)) = tracks.get(command.spline) else {
            warn!("Track command targets {} which has no spline", command.spline);
            continue;
        };
        let name = name.map(Name::as_str).unwrap_or("unnamed");

        let kind = match command.kind {
            TrackCommandKind::Set => {
                follower.enter_track(command.spline, 0.0);
                info!("Ball set to spline: {name}");
                FollowerEventKind::TrackSet
            }
            TrackCommandKind::Transition => {
                let t = closest_entry_t(spline, platform, transform.translation);
                follower.enter_track(command.spline, t);
                info!("Transitioned to spline: {name} at t={t:.3}");
                FollowerEventKind::Transitioned
            }
        };

        place_on_track(follower.t, spline, platform, &mut transform);
        events.write(FollowerEvent {
            entity: command.follower,
            kind,
        });
    }
}

/// Move `transform` onto the track at `t`, facing along the track.
///
/// A degenerate tangent leaves the rotation untouched.
pub fn place_on_track(t: f32, spline: &Spline, platform: &Transform, transform: &mut Transform) {
    if let Some(position) = spline.evaluate_world(platform, t) {
        transform.translation = position;
    }

    if let Some(rotation) = spline
        .tangent_world(platform, t)
        .and_then(|tangent| look_rotation(tangent, Vec3::Y))
    {
        transform.rotation = rotation;
    }
}

/// Find where to join a new track so the follower does not jump.
///
/// Probes the first [`HANDOFF_SAMPLES`] parameters of the track and returns
/// the one closest to `position`; the earliest wins ties.
pub fn closest_entry_t(spline: &Spline, platform: &Transform, position: Vec3) -> f32 {
    let mut closest_t = 0.0;
    let mut min_dist = f32::MAX;

    for i in 0..HANDOFF_SAMPLES {
        let t = i as f32 * HANDOFF_STEP;
        let Some(sample) = spline.evaluate_world(platform, t) else {
            continue;
        };
        let dist = sample.distance(position);
        if dist < min_dist {
            min_dist = dist;
            closest_t = t;
        }
    }

    closest_t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spline::SplineType;

    fn straight(length: f32) -> Spline {
        Spline::new(
            SplineType::CubicBezier,
            vec![
                Vec3::ZERO,
                Vec3::new(0.0, 0.0, -length / 3.0),
                Vec3::new(0.0, 0.0, -2.0 * length / 3.0),
                Vec3::new(0.0, 0.0, -length),
            ],
        )
    }

    #[test]
    fn entry_point_is_nearest_probe() {
        let spline = straight(100.0);
        let platform = Transform::IDENTITY;

        // 5 units in is t = 0.05 on a 100 unit straight.
        let t = closest_entry_t(&spline, &platform, Vec3::new(0.0, 0.0, -5.0));
        assert!((t - 0.05).abs() < 1e-4);

        // Behind the start snaps to the start.
        assert_eq!(closest_entry_t(&spline, &platform, Vec3::new(0.0, 0.0, 3.0)), 0.0);

        // Past the probed range clamps to the last probe.
        let t = closest_entry_t(&spline, &platform, Vec3::new(0.0, 0.0, -50.0));
        assert!((t - 0.09).abs() < 1e-4);
    }

    #[test]
    fn placement_faces_along_the_track() {
        let spline = straight(10.0);
        let platform = Transform::from_xyz(2.0, 0.0, 0.0)
            .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let mut transform = Transform::IDENTITY;

        place_on_track(0.5, &spline, &platform, &mut transform);

        // Track heads -Z locally, -X after the quarter turn.
        assert!(transform.translation.distance(Vec3::new(-3.0, 0.0, 0.0)) < 1e-3);
        assert!((transform.forward().as_vec3()).distance(Vec3::NEG_X) < 1e-3);
    }

    #[test]
    fn zero_tangent_keeps_rotation() {
        let point = Vec3::new(1.0, 2.0, 3.0);
        let spline = Spline::new(SplineType::CubicBezier, vec![point; 4]);
        let rotation = Quat::from_rotation_y(0.7);
        let mut transform = Transform::from_rotation(rotation);

        place_on_track(0.5, &spline, &Transform::IDENTITY, &mut transform);

        assert!(transform.translation.distance(point) < 1e-5);
        assert_eq!(transform.rotation, rotation);
    }
}
