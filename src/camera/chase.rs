use std::f32::consts::{FRAC_PI_2, PI, TAU};

use bevy::{
    input::mouse::{MouseMotion, MouseWheel},
    prelude::*,
};

use crate::config::CameraSettings;

/// Component for a camera that trails an entity.
#[derive(Component, Debug, Clone)]
pub struct ChaseCamera {
    /// The entity to follow.
    pub target: Option<Entity>,
    /// The point the camera looks at; eases toward the target.
    pub focus: Vec3,
    /// Distance from the focus point.
    pub distance: f32,
    /// Rotation around the Y axis (yaw).
    pub yaw: f32,
    /// Rotation around the X axis (pitch).
    pub pitch: f32,
    /// How quickly focus and yaw catch up, per second.
    pub smoothing: f32,
    /// Orbit sensitivity (radians per pixel).
    pub sensitivity: f32,
    /// Zoom sensitivity (units per scroll).
    pub zoom_sensitivity: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for ChaseCamera {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default())
    }
}

impl ChaseCamera {
    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self {
            target: None,
            focus: Vec3::ZERO,
            distance: settings.distance,
            yaw: 0.0,
            pitch: settings.pitch,
            smoothing: settings.smoothing,
            sensitivity: 0.005,
            zoom_sensitivity: 1.0,
            min_distance: 2.0,
            max_distance: 50.0,
            min_pitch: 0.05,
            max_pitch: FRAC_PI_2 - 0.1,
        }
    }

    /// Follow `target`.
    pub fn with_target(mut self, target: Entity) -> Self {
        self.target = Some(target);
        self
    }

    /// Calculate the camera position from current orbit parameters.
    pub fn calculate_position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.focus + Vec3::new(x, y, z)
    }

    /// Fraction of the remaining gap to close after `dt` seconds.
    fn catch_up(&self, dt: f32) -> f32 {
        1.0 - (-self.smoothing * dt).exp()
    }

    /// Move focus toward `target` and swing behind `heading`.
    pub fn ease_toward(&mut self, target: Vec3, heading: Option<Vec3>, dt: f32) {
        let alpha = self.catch_up(dt);
        self.focus = self.focus.lerp(target, alpha);

        if let Some(yaw) = heading.and_then(yaw_behind) {
            self.yaw += shortest_angle(self.yaw, yaw) * alpha;
        }
    }
}

/// Yaw that places the camera behind something moving along `heading`.
pub fn yaw_behind(heading: Vec3) -> Option<f32> {
    let flat = Vec3::new(heading.x, 0.0, heading.z);
    if flat.length_squared() < 1e-6 {
        return None;
    }
    Some((-flat.x).atan2(-flat.z))
}

/// Signed angle from `from` to `to`, in `[-PI, PI)`.
fn shortest_angle(from: f32, to: f32) -> f32 {
    (to - from + PI).rem_euclid(TAU) - PI
}

/// System to handle chase camera input and follow the target.
pub fn chase_camera(
    mut cameras: Query<(&mut ChaseCamera, &mut Transform)>,
    targets: Query<&Transform, Without<ChaseCamera>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: MessageReader<MouseMotion>,
    mut scroll: MessageReader<MouseWheel>,
    time: Res<Time>,
) {
    let Ok((mut chase, mut transform)) = cameras.single_mut() else {
        motion.clear();
        scroll.clear();
        return;
    };

    // Handle orbit rotation (right mouse button or middle mouse button)
    let dragging = mouse.pressed(MouseButton::Right) || mouse.pressed(MouseButton::Middle);
    if dragging {
        for ev in motion.read() {
            chase.yaw -= ev.delta.x * chase.sensitivity;
            chase.pitch += ev.delta.y * chase.sensitivity;
            chase.pitch = chase.pitch.clamp(chase.min_pitch, chase.max_pitch);
        }
    } else {
        motion.clear();
    }

    // Handle zoom (scroll wheel)
    for ev in scroll.read() {
        chase.distance -= ev.y * chase.zoom_sensitivity;
        chase.distance = chase.distance.clamp(chase.min_distance, chase.max_distance);
    }

    if let Some(target) = chase.target.and_then(|t| targets.get(t).ok()) {
        // Leave the yaw alone while the user is orbiting.
        let heading = (!dragging).then(|| target.forward().as_vec3());
        chase.ease_toward(target.translation, heading, time.delta_secs());
    }

    // Update transform
    transform.translation = chase.calculate_position();
    transform.look_at(chase.focus, Vec3::Y);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_position_is_behind_and_above() {
        let chase = ChaseCamera::default();
        let position = chase.calculate_position();
        assert!(position.y > 0.0);
        assert!(position.z > 0.0);
        assert!((position.length() - chase.distance).abs() < 1e-4);
    }

    #[test]
    fn yaw_behind_heading() {
        // Heading -Z puts the camera on +Z.
        assert!(yaw_behind(Vec3::NEG_Z).unwrap().abs() < 1e-6);

        let mut chase = ChaseCamera {
            pitch: 0.0,
            ..default()
        };
        chase.yaw = yaw_behind(Vec3::X).unwrap();
        let position = chase.calculate_position();
        assert!((position - Vec3::new(-chase.distance, 0.0, 0.0)).length() < 1e-4);

        assert!(yaw_behind(Vec3::Y).is_none());
    }

    #[test]
    fn shortest_angle_wraps() {
        assert!((shortest_angle(3.0, -3.0) - (TAU - 6.0)).abs() < 1e-5);
        assert!((shortest_angle(0.0, 1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn focus_eases_without_overshoot() {
        let mut chase = ChaseCamera::default();
        let target = Vec3::new(0.0, 0.0, -10.0);

        chase.ease_toward(target, None, 0.1);
        let first = chase.focus.distance(target);
        assert!(first < 10.0 && first > 0.0);

        for _ in 0..200 {
            chase.ease_toward(target, None, 0.1);
        }
        assert!(chase.focus.distance(target) < 1e-3);
    }
}
