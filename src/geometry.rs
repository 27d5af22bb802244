//! Geometry utilities for orienting things along splines.

use bevy::prelude::*;

/// Orthonormal axes at a point on a track: heading, right and up.
///
/// Used both to orient the player and to lay deck cross-sections.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateFrame {
    /// Direction of travel.
    pub tangent: Vec3,
    /// Points to the right of the direction of travel.
    pub right: Vec3,
    /// Up, squared off against `tangent`.
    pub up: Vec3,
}

impl CoordinateFrame {
    /// Frame for `tangent` with world Y as the preferred up.
    pub fn from_tangent(tangent: Vec3) -> Self {
        Self::from_tangent_with_up(tangent, Vec3::Y)
    }

    /// Build a coordinate frame from a tangent and preferred up direction.
    ///
    /// The actual up vector may differ from `preferred_up` to maintain
    /// orthogonality with the tangent. A tangent parallel to `preferred_up`
    /// falls back to X as the reference axis.
    pub fn from_tangent_with_up(tangent: Vec3, preferred_up: Vec3) -> Self {
        let tangent = tangent.normalize_or_zero();

        let right = tangent.cross(preferred_up).normalize_or_zero();
        let right = if right.length_squared() < 0.001 {
            tangent.cross(Vec3::X).normalize_or_zero()
        } else {
            right
        };
        let up = right.cross(tangent).normalize_or_zero();

        Self { tangent, right, up }
    }

    /// False when the tangent was zero and no axes could be built.
    pub fn is_valid(&self) -> bool {
        self.right.length_squared() > 0.001 && self.up.length_squared() > 0.001
    }

    /// Convert to a rotation quaternion.
    ///
    /// The rotation maps local -Z (Bevy's forward) onto `tangent`, local +Y
    /// onto `up` and local +X onto `right`.
    pub fn to_rotation(&self) -> Quat {
        if !self.is_valid() {
            return Quat::IDENTITY;
        }
        Quat::from_mat3(&Mat3::from_cols(self.right, self.up, -self.tangent))
    }

    /// Offset of a cross-section point `(local_x, local_y)` from the track.
    pub fn transform_profile_point(&self, local_x: f32, local_y: f32) -> Vec3 {
        self.right * local_x + self.up * local_y
    }
}

/// Rotation that makes an entity face `forward` with `up` as the preferred up.
///
/// Returns `None` for a zero-length `forward`, so callers can keep their
/// previous orientation.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
    if forward.length_squared() < 1e-12 {
        return None;
    }
    let frame = CoordinateFrame::from_tangent_with_up(forward, up);
    frame.is_valid().then(|| frame.to_rotation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tangent_basic() {
        let frame = CoordinateFrame::from_tangent(Vec3::Z);
        assert!(frame.is_valid());
        assert!((frame.tangent - Vec3::Z).length() < 0.001);
        assert!((frame.up - Vec3::Y).length() < 0.001);
        assert!((frame.right - Vec3::NEG_X).length() < 0.001);
    }

    #[test]
    fn test_from_tangent_degenerate() {
        // Tangent parallel to Y should still produce valid frame
        let frame = CoordinateFrame::from_tangent(Vec3::Y);
        assert!(frame.is_valid());
    }

    #[test]
    fn forward_heading_is_identity() {
        let rotation = look_rotation(Vec3::NEG_Z, Vec3::Y).unwrap();
        assert!(rotation.angle_between(Quat::IDENTITY) < 1e-4);
    }

    #[test]
    fn look_rotation_points_forward_axis() {
        let forward = Vec3::new(1.0, 0.0, -1.0).normalize();
        let rotation = look_rotation(forward, Vec3::Y).unwrap();
        assert!((rotation * Vec3::NEG_Z).distance(forward) < 1e-4);
        assert!((rotation * Vec3::Y).distance(Vec3::Y) < 1e-4);
    }

    #[test]
    fn zero_forward_has_no_rotation() {
        assert!(look_rotation(Vec3::ZERO, Vec3::Y).is_none());
    }
}
