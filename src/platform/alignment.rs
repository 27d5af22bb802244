//! Knot-to-knot placement of a new platform after the current one.

use bevy::prelude::*;

use crate::geometry::look_rotation;
use crate::spline::Knot;

/// Where a new platform goes, plus the points involved, for debugging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// Root transform for the new platform.
    pub transform: Transform,
    /// World position of the previous platform's last knot.
    pub end: Vec3,
    /// World heading leaving the previous platform (unit length, or zero).
    pub forward: Vec3,
    /// Where the new platform's first knot sat after rotation but before
    /// it was moved into place.
    pub unaligned_start: Vec3,
}

/// Place a platform so its first knot meets `end_knot` of the current one.
///
/// The new platform is turned so its local forward (-Z) follows the current
/// platform's outgoing tangent, with +Y kept up, then shifted so the knots
/// coincide. `gap` pushes it further along that heading. Only the rotation of
/// `current` is applied to the tangent; scale does not change a heading.
pub fn connect(end_knot: Knot, current: &Transform, start_knot: Knot, gap: f32) -> Connection {
    let end = current.transform_point(end_knot.position);
    let forward = (current.rotation * end_knot.tangent).normalize_or_zero();

    let rotation = look_rotation(forward, Vec3::Y).unwrap_or(Quat::IDENTITY);
    let unaligned_start = rotation * start_knot.position;

    let translation = end - unaligned_start + forward * gap;

    Connection {
        transform: Transform::from_translation(translation).with_rotation(rotation),
        end,
        forward,
        unaligned_start,
    }
}
