use bevy::prelude::*;

use crate::spline::{Spline, SplineType};

/// A platform template: a path segment in its own local space.
///
/// The path must start at its first knot heading along local -Z; the
/// spawner rotates the whole platform so that direction lines up with the end
/// of the previous platform.
#[derive(Debug, Clone)]
pub struct PlatformPrefab {
    /// Display name, used in logs.
    pub name: String,
    /// The path the player follows, in platform-local coordinates.
    pub spline: Spline,
    /// Width of the generated deck mesh.
    pub width: f32,
}

impl PlatformPrefab {
    /// Create a prefab from a spline.
    pub fn new(name: impl Into<String>, spline: Spline) -> Self {
        Self {
            name: name.into(),
            spline,
            width: 3.0,
        }
    }

    /// Set the deck width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Build a prefab from Bézier anchors and handles.
    fn bezier(name: &str, points: &[[f32; 3]]) -> Self {
        Self::new(
            name,
            Spline::new(
                SplineType::CubicBezier,
                points.iter().copied().map(Vec3::from_array).collect(),
            ),
        )
    }

    /// A straight run.
    pub fn straight() -> Self {
        Self::bezier(
            "Straight",
            &[[0.0, 0.0, 0.0], [0.0, 0.0, -4.0], [0.0, 0.0, -8.0], [0.0, 0.0, -12.0]],
        )
    }

    /// Bends 45° to the left.
    pub fn left_bend() -> Self {
        Self::bezier(
            "LeftBend",
            &[[0.0, 0.0, 0.0], [0.0, 0.0, -5.0], [-1.17, 0.0, -9.17], [-4.0, 0.0, -12.0]],
        )
    }

    /// Bends 45° to the right.
    pub fn right_bend() -> Self {
        Self::bezier(
            "RightBend",
            &[[0.0, 0.0, 0.0], [0.0, 0.0, -5.0], [1.17, 0.0, -9.17], [4.0, 0.0, -12.0]],
        )
    }

    /// Jogs sideways and back, ending on the original heading.
    pub fn s_bend() -> Self {
        Self::bezier(
            "SBend",
            &[
                [0.0, 0.0, 0.0],
                [0.0, 0.0, -3.0],
                [2.0, 0.0, -7.0],
                [2.0, 0.0, -10.0],
                [2.0, 0.0, -13.0],
                [0.0, 0.0, -16.0],
                [0.0, 0.0, -20.0],
            ],
        )
    }

    /// Rises over a crest and comes back down level.
    pub fn hill() -> Self {
        Self::bezier(
            "Hill",
            &[
                [0.0, 0.0, 0.0],
                [0.0, 0.0, -3.0],
                [0.0, 2.5, -5.0],
                [0.0, 2.5, -8.0],
                [0.0, 2.5, -11.0],
                [0.0, 0.0, -13.0],
                [0.0, 0.0, -16.0],
            ],
        )
    }
}

/// The set of platforms the spawner picks from.
///
/// The first prefab always starts a run; later ones are picked at random.
#[derive(Resource, Debug, Clone)]
pub struct PlatformLibrary {
    pub prefabs: Vec<PlatformPrefab>,
}

impl Default for PlatformLibrary {
    fn default() -> Self {
        Self {
            prefabs: vec![
                PlatformPrefab::straight(),
                PlatformPrefab::left_bend(),
                PlatformPrefab::right_bend(),
                PlatformPrefab::s_bend(),
                PlatformPrefab::hill(),
            ],
        }
    }
}

impl PlatformLibrary {
    /// A library holding exactly `prefabs`.
    pub fn new(prefabs: Vec<PlatformPrefab>) -> Self {
        Self { prefabs }
    }

    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    pub fn get(&self, index: usize) -> Option<&PlatformPrefab> {
        self.prefabs.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_start_at_origin_heading_forward() {
        for prefab in PlatformLibrary::default().prefabs {
            let knot = prefab.spline.first_knot().unwrap();
            assert!(knot.position.length() < 1e-5, "{}", prefab.name);
            assert!(
                knot.tangent.normalize().distance(Vec3::NEG_Z) < 1e-4,
                "{}",
                prefab.name
            );
        }
    }

    #[test]
    fn builtins_end_where_expected() {
        let library = PlatformLibrary::default();
        let headings: Vec<Vec3> = library
            .prefabs
            .iter()
            .map(|p| p.spline.last_knot().unwrap().tangent.normalize())
            .collect();

        let diagonal = std::f32::consts::FRAC_1_SQRT_2;
        assert!(headings[0].distance(Vec3::NEG_Z) < 1e-4);
        assert!(headings[1].distance(Vec3::new(-diagonal, 0.0, -diagonal)) < 1e-2);
        assert!(headings[2].distance(Vec3::new(diagonal, 0.0, -diagonal)) < 1e-2);
        assert!(headings[3].distance(Vec3::NEG_Z) < 1e-4);
        assert!(headings[4].distance(Vec3::NEG_Z) < 1e-4);
    }
}
