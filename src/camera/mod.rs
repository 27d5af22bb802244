mod chase;

pub use chase::{yaw_behind, ChaseCamera};

use bevy::prelude::*;

use crate::follower::FollowerSystems;

/// Plugin that drives [`ChaseCamera`] cameras.
///
/// # Usage
/// Add `ChaseCamera` to your camera entity and point its `target` at the
/// player. Only one chase camera is driven at a time.
///
/// # Controls
/// - Right mouse button + drag: Orbit around the player
/// - Scroll wheel: Zoom in/out
pub struct ChaseCameraPlugin;

impl Plugin for ChaseCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            chase::chase_camera
                .after(FollowerSystems::Advance)
                .run_if(resource_exists::<ButtonInput<MouseButton>>),
        );
    }
}
