//! Visual rolling of the ball under a moving player.
//!
//! The ball does not move itself; it is a child of the player and spins to
//! match how far the player travelled since the previous frame.

use bevy::prelude::*;

use crate::config::BallSettings;
use crate::follower::FollowerSystems;

/// Player movement below this distance does not spin the ball.
const MIN_ROLL_DISTANCE: f32 = 1e-4;

/// Spins a ball entity as its parent moves.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component, Default)]
pub struct BallRoller {
    /// Scales how far the ball spins per unit travelled.
    pub rotation_multiplier: f32,
    /// Cleared when the ball turns out to have no parent.
    pub enabled: bool,
    /// Parent translation seen on the previous frame.
    pub last_parent_position: Option<Vec3>,
}

impl Default for BallRoller {
    fn default() -> Self {
        Self::from_settings(&BallSettings::default())
    }
}

impl BallRoller {
    pub fn from_settings(settings: &BallSettings) -> Self {
        Self {
            rotation_multiplier: settings.rotation_multiplier,
            enabled: true,
            last_parent_position: None,
        }
    }
}

/// Rotation, in the parent's frame, that rolls a ball of `radius` along
/// `delta` (a world-space move of the parent).
///
/// `None` when the move is too small, the ball has no size, or the move is
/// vertical and gives no rolling axis.
pub fn roll_rotation(
    delta: Vec3,
    radius: f32,
    multiplier: f32,
    parent_rotation: Quat,
) -> Option<Quat> {
    let distance = delta.length();
    if distance <= MIN_ROLL_DISTANCE || radius <= 0.0 {
        return None;
    }

    let angle = distance / radius * multiplier;
    let world_axis = Vec3::Y.cross(delta / distance);
    let local_axis = Dir3::new(parent_rotation.inverse() * world_axis).ok()?;
    Some(Quat::from_axis_angle(local_axis.as_vec3(), angle))
}

/// System that spins balls to match their parent's movement.
pub fn roll_balls(
    mut balls: Query<(Entity, &mut BallRoller, &mut Transform, Option<&ChildOf>)>,
    parents: Query<&Transform, Without<BallRoller>>,
) {
    for (entity, mut roller, mut transform, child_of) in &mut balls {
        if !roller.enabled {
            continue;
        }

        let Some(parent) = child_of.and_then(|c| parents.get(c.parent()).ok()) else {
            error!("BallRoller on {entity}: ball must be a child of the player");
            roller.enabled = false;
            continue;
        };

        let position = parent.translation;
        let Some(last) = roller.last_parent_position.replace(position) else {
            continue;
        };

        let radius = transform.scale.x * 0.5;
        if let Some(rotation) =
            roll_rotation(position - last, radius, roller.rotation_multiplier, parent.rotation)
        {
            transform.rotation = rotation * transform.rotation;
        }
    }
}

/// Plugin that spins [`BallRoller`] entities.
pub struct BallPlugin;

impl Plugin for BallPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<BallRoller>()
            .add_systems(Update, roll_balls.after(FollowerSystems::Advance));
    }
}
