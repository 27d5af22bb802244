use bevy::prelude::*;

use super::arc_length::approximate_arc_length;
use super::types::{SplineEvaluator, SplineType};

/// One end of a spline: where the curve sits and which way it is heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knot {
    /// Position on the curve, in the spline's local space.
    pub position: Vec3,
    /// Tangent leaving the knot in the direction of travel. Not normalized.
    pub tangent: Vec3,
}

/// A 3D spline component, stored in the owning entity's local space.
#[derive(Component, Debug, Clone, Reflect, Default)]
#[reflect(Component)]
pub struct Spline {
    /// The type of spline interpolation.
    pub spline_type: SplineType,
    /// Control points defining the spline shape.
    pub control_points: Vec<Vec3>,
    /// Whether the spline forms a closed loop.
    pub closed: bool,
}

impl Spline {
    /// Create a new spline with the given type and control points.
    pub fn new(spline_type: SplineType, control_points: Vec<Vec3>) -> Self {
        Self {
            spline_type,
            control_points,
            closed: false,
        }
    }

    /// Evaluate the spline at parameter t (0.0 to 1.0).
    pub fn evaluate(&self, t: f32) -> Option<Vec3> {
        self.spline_type
            .evaluate(&self.control_points, t, self.closed)
    }

    /// Evaluate the tangent at parameter t.
    pub fn evaluate_tangent(&self, t: f32) -> Option<Vec3> {
        self.spline_type
            .evaluate_tangent(&self.control_points, t, self.closed)
    }

    /// Evaluate the spline at `t` and move the result into world space.
    pub fn evaluate_world(&self, transform: &Transform, t: f32) -> Option<Vec3> {
        self.evaluate(t).map(|p| transform.transform_point(p))
    }

    /// Evaluate the tangent at `t` and rotate/scale it into world space.
    pub fn tangent_world(&self, transform: &Transform, t: f32) -> Option<Vec3> {
        self.evaluate_tangent(t)
            .map(|v| transform.rotation * (transform.scale * v))
    }

    /// Get the number of segments in this spline.
    pub fn segment_count(&self) -> usize {
        self.spline_type
            .segment_count(&self.control_points, self.closed)
    }

    /// Check if the spline has enough points to be valid.
    pub fn is_valid(&self) -> bool {
        self.control_points.len() >= self.spline_type.min_points()
    }

    /// The knot the curve starts from.
    pub fn first_knot(&self) -> Option<Knot> {
        Some(Knot {
            position: self.evaluate(0.0)?,
            tangent: self.evaluate_tangent(0.0)?,
        })
    }

    /// The knot the curve ends on, with its outgoing tangent.
    pub fn last_knot(&self) -> Option<Knot> {
        Some(Knot {
            position: self.evaluate(1.0)?,
            tangent: self.evaluate_tangent(1.0)?,
        })
    }

    /// Approximate length of the curve after applying `transform`.
    pub fn world_length(&self, transform: &Transform, samples: usize) -> f32 {
        approximate_arc_length(samples, |t| self.evaluate_world(transform, t))
    }

    /// Sample the spline into a series of points for rendering.
    pub fn sample(&self, samples_per_segment: usize) -> Vec<Vec3> {
        let segment_count = self.segment_count();
        if segment_count == 0 || samples_per_segment == 0 {
            return Vec::new();
        }

        let total_samples = segment_count * samples_per_segment + 1;
        (0..total_samples)
            .filter_map(|i| self.evaluate(i as f32 / (total_samples - 1) as f32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quarter_turn() -> Spline {
        // Heads -Z, bends toward -X.
        Spline::new(
            SplineType::CubicBezier,
            vec![
                Vec3::ZERO,
                Vec3::new(0.0, 0.0, -3.0),
                Vec3::new(-2.0, 0.0, -5.0),
                Vec3::new(-5.0, 0.0, -5.0),
            ],
        )
    }

    #[test]
    fn knots_report_ends_and_directions() {
        let spline = quarter_turn();
        let first = spline.first_knot().unwrap();
        let last = spline.last_knot().unwrap();

        assert!(first.position.distance(Vec3::ZERO) < 1e-5);
        assert!(first.tangent.normalize().distance(Vec3::NEG_Z) < 1e-5);
        assert!(last.position.distance(Vec3::new(-5.0, 0.0, -5.0)) < 1e-5);
        assert!(last.tangent.normalize().distance(Vec3::NEG_X) < 1e-5);
    }

    #[test]
    fn world_evaluation_applies_transform() {
        let spline = quarter_turn();
        let transform = Transform::from_xyz(10.0, 1.0, 0.0)
            .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));

        let end = spline.evaluate_world(&transform, 1.0).unwrap();
        assert!(end.distance(transform.transform_point(Vec3::new(-5.0, 0.0, -5.0))) < 1e-4);

        // -X rotated a quarter turn about Y points toward +Z.
        let tangent = spline.tangent_world(&transform, 1.0).unwrap().normalize();
        assert!(tangent.distance(Vec3::Z) < 1e-4);
    }

    #[test]
    fn invalid_spline_has_no_knots() {
        let spline = Spline::new(SplineType::CubicBezier, vec![Vec3::ZERO, Vec3::X]);
        assert!(!spline.is_valid());
        assert!(spline.first_knot().is_none());
        assert!(spline.sample(8).is_empty());
    }
}
