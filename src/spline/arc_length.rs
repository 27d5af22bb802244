//! Arc length approximation for splines.

use bevy::prelude::*;

/// Default number of samples for arc length calculations.
pub const DEFAULT_ARC_LENGTH_SAMPLES: usize = 128;

/// Approximate the length of a curve by summing chords between `samples`
/// evenly spaced parameters.
///
/// `point_at` maps a parameter in `[0, 1]` to a position; a `None` sample
/// repeats the previous point so gaps add no length.
pub fn approximate_arc_length(samples: usize, point_at: impl Fn(f32) -> Option<Vec3>) -> f32 {
    let mut length = 0.0;
    let mut prev_point = point_at(0.0).unwrap_or(Vec3::ZERO);

    for i in 1..=samples {
        let t = i as f32 / samples as f32;
        let point = point_at(t).unwrap_or(prev_point);
        length += (point - prev_point).length();
        prev_point = point;
    }

    length
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spline::{Spline, SplineType};

    #[test]
    fn straight_bezier_length() {
        let spline = Spline::new(
            SplineType::CubicBezier,
            vec![
                Vec3::ZERO,
                Vec3::new(0.0, 0.0, -4.0),
                Vec3::new(0.0, 0.0, -8.0),
                Vec3::new(0.0, 0.0, -12.0),
            ],
        );

        let length = spline.world_length(&Transform::IDENTITY, DEFAULT_ARC_LENGTH_SAMPLES);
        assert!((length - 12.0).abs() < 0.01);

        let scaled = spline.world_length(
            &Transform::from_scale(Vec3::splat(2.0)),
            DEFAULT_ARC_LENGTH_SAMPLES,
        );
        assert!((scaled - 24.0).abs() < 0.02);
    }

    #[test]
    fn missing_points_add_nothing() {
        assert_eq!(approximate_arc_length(16, |_| None), 0.0);
    }
}
