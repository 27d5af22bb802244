use bevy::prelude::*;

/// The type of spline interpolation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Default)]
pub enum SplineType {
    /// Cubic Bézier spline - 4 control points per segment.
    /// Points 0 and 3 are on the curve, 1 and 2 are handles.
    #[default]
    CubicBezier,
    /// Catmull-Rom spline - passes through all control points.
    /// Requires at least 4 points, curve is defined between points 1 and n-2.
    CatmullRom,
    /// B-Spline - smooth curve with local control.
    /// Does not pass through its control points.
    BSpline,
}

impl SplineType {
    /// Get the display name for this spline type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CubicBezier => "Cubic Bézier",
            Self::CatmullRom => "Catmull-Rom",
            Self::BSpline => "B-Spline",
        }
    }

    /// Minimum number of control points required for this spline type.
    pub fn min_points(&self) -> usize {
        4
    }

    /// Locate the four control points of the segment containing `t`, plus
    /// the segment-local parameter.
    fn segment_at(&self, points: &[Vec3], t: f32, closed: bool) -> Option<([Vec3; 4], f32)> {
        let num_segments = self.segment_count(points, closed);
        if num_segments == 0 {
            return None;
        }

        let t_scaled = t.clamp(0.0, 1.0) * num_segments as f32;
        let segment = (t_scaled.floor() as usize).min(num_segments - 1);
        let local_t = t_scaled - segment as f32;

        let n = points.len();
        let window = match self {
            Self::CubicBezier => {
                let i = segment * 3;
                [points[i], points[i + 1], points[i + 2], points[i + 3]]
            }
            Self::CatmullRom if closed => [
                points[(segment + n - 1) % n],
                points[segment % n],
                points[(segment + 1) % n],
                points[(segment + 2) % n],
            ],
            Self::BSpline if closed => [
                points[segment % n],
                points[(segment + 1) % n],
                points[(segment + 2) % n],
                points[(segment + 3) % n],
            ],
            Self::CatmullRom | Self::BSpline => [
                points[segment],
                points[segment + 1],
                points[segment + 2],
                points[segment + 3],
            ],
        };

        Some((window, local_t))
    }
}

/// Trait for evaluating spline curves.
pub trait SplineEvaluator {
    /// Evaluate the spline at parameter t (0.0 to 1.0 across entire spline).
    fn evaluate(&self, points: &[Vec3], t: f32, closed: bool) -> Option<Vec3>;

    /// Evaluate the tangent at parameter t.
    fn evaluate_tangent(&self, points: &[Vec3], t: f32, closed: bool) -> Option<Vec3>;

    /// Get the number of segments in the spline.
    fn segment_count(&self, points: &[Vec3], closed: bool) -> usize;
}

impl SplineEvaluator for SplineType {
    fn evaluate(&self, points: &[Vec3], t: f32, closed: bool) -> Option<Vec3> {
        let ([p0, p1, p2, p3], u) = self.segment_at(points, t, closed)?;
        Some(match self {
            Self::CubicBezier => cubic_bezier(p0, p1, p2, p3, u),
            Self::CatmullRom => catmull_rom(p0, p1, p2, p3, u),
            Self::BSpline => bspline(p0, p1, p2, p3, u),
        })
    }

    fn evaluate_tangent(&self, points: &[Vec3], t: f32, closed: bool) -> Option<Vec3> {
        let ([p0, p1, p2, p3], u) = self.segment_at(points, t, closed)?;
        Some(match self {
            Self::CubicBezier => cubic_bezier_derivative(p0, p1, p2, p3, u),
            Self::CatmullRom => catmull_rom_derivative(p0, p1, p2, p3, u),
            Self::BSpline => bspline_derivative(p0, p1, p2, p3, u),
        })
    }

    fn segment_count(&self, points: &[Vec3], closed: bool) -> usize {
        if points.len() < self.min_points() {
            return 0;
        }
        match self {
            // Closed Bézier paths are evaluated as open ones.
            Self::CubicBezier => (points.len() - 1) / 3,
            Self::CatmullRom | Self::BSpline if closed => points.len(),
            Self::CatmullRom | Self::BSpline => points.len() - 3,
        }
    }
}

fn cubic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let mt = 1.0 - t;
    p0 * (mt * mt * mt) + p1 * (3.0 * mt * mt * t) + p2 * (3.0 * mt * t * t) + p3 * (t * t * t)
}

fn cubic_bezier_derivative(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let mt = 1.0 - t;
    (p1 - p0) * (3.0 * mt * mt) + (p2 - p1) * (6.0 * mt * t) + (p3 - p2) * (3.0 * t * t)
}

fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;

    0.5 * ((2.0 * p1)
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}

fn catmull_rom_derivative(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    0.5 * ((p2 - p0)
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * (2.0 * t)
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * (3.0 * t * t))
}

// Uniform cubic B-spline basis
fn bspline(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;

    ((1.0 - 3.0 * t + 3.0 * t2 - t3) * p0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * p1
        + (1.0 + 3.0 * t + 3.0 * t2 - 3.0 * t3) * p2
        + t3 * p3)
        / 6.0
}

fn bspline_derivative(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;

    ((-3.0 + 6.0 * t - 3.0 * t2) * p0
        + (-12.0 * t + 9.0 * t2) * p1
        + (3.0 + 6.0 * t - 9.0 * t2) * p2
        + 3.0 * t2 * p3)
        / 6.0
}
