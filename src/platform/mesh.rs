//! Deck meshes extruded along platform splines.
//!
//! Each prefab gets one mesh, built in the prefab's local space and shared by
//! every platform spawned from it.

use bevy::{
    mesh::{Indices, PrimitiveTopology},
    prelude::*,
};

use crate::geometry::CoordinateFrame;
use crate::spline::Spline;

use super::PlatformLibrary;

/// Extrusion steps per spline segment.
pub const SEGMENTS_PER_CURVE: usize = 16;

/// A vertex in a deck cross-section profile.
#[derive(Debug, Clone, Copy)]
pub struct ProfileVertex {
    /// Offset across the deck (x) and above the path (y).
    pub position: Vec2,
    /// Texture coordinate across the deck.
    pub u: f32,
}

/// Cross-section of a deck, left to right.
///
/// With `curb_height` and `curb_width` both positive, raised curbs line each
/// side; otherwise the deck is flat.
pub fn deck_profile(width: f32, curb_height: f32, curb_width: f32) -> Vec<ProfileVertex> {
    let hw = width / 2.0;
    let road_hw = hw - curb_width;

    let points = if curb_height > 0.0 && curb_width > 0.0 {
        vec![
            Vec2::new(-hw, curb_height),
            Vec2::new(-road_hw, curb_height),
            Vec2::new(-road_hw, 0.0),
            Vec2::new(road_hw, 0.0),
            Vec2::new(road_hw, curb_height),
            Vec2::new(hw, curb_height),
        ]
    } else {
        vec![Vec2::new(-hw, 0.0), Vec2::new(hw, 0.0)]
    };

    let last = (points.len() - 1) as f32;
    points
        .into_iter()
        .enumerate()
        .map(|(i, position)| ProfileVertex {
            position,
            u: i as f32 / last,
        })
        .collect()
}

/// Extrude `profile` along `spline`, in the spline's local space.
///
/// Returns `None` when the spline cannot be evaluated, the profile has fewer
/// than two vertices, or `segments` is zero.
pub fn extrude_along(
    spline: &Spline,
    profile: &[ProfileVertex],
    segments: usize,
    uv_tile_length: f32,
) -> Option<Mesh> {
    if profile.len() < 2 || segments == 0 {
        return None;
    }

    let profile_len = profile.len();
    let total_vertices = profile_len * (segments + 1);

    let mut positions = Vec::with_capacity(total_vertices);
    let mut normals = Vec::with_capacity(total_vertices);
    let mut uvs = Vec::with_capacity(total_vertices);

    for seg_idx in 0..=segments {
        let t = seg_idx as f32 / segments as f32;

        let position = spline.evaluate(t)?;
        let tangent = spline.evaluate_tangent(t).unwrap_or(Vec3::NEG_Z);
        let frame = CoordinateFrame::from_tangent(tangent);

        for vertex in profile {
            let world_pos =
                position + frame.transform_profile_point(vertex.position.x, vertex.position.y);
            positions.push(world_pos.to_array());
            normals.push(frame.up.to_array());
            uvs.push([vertex.u, t * uv_tile_length]);
        }
    }

    let mut indices = Vec::with_capacity(segments * (profile_len - 1) * 6);
    for seg_idx in 0..segments {
        let row_start = seg_idx * profile_len;
        let next_row_start = (seg_idx + 1) * profile_len;

        for i in 0..(profile_len - 1) {
            let a = (row_start + i) as u32;
            let b = (row_start + i + 1) as u32;
            let c = (next_row_start + i) as u32;
            let d = (next_row_start + i + 1) as u32;

            // Counter-clockwise seen from above
            indices.extend_from_slice(&[a, b, c]);
            indices.extend_from_slice(&[b, d, c]);
        }
    }

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh.compute_normals();

    Some(mesh)
}

/// Shared render assets for every prefab in the [`PlatformLibrary`].
#[derive(Resource, Debug, Clone)]
pub struct PlatformVisuals {
    /// Deck mesh per prefab, indexed like the library. `None` if it could
    /// not be generated.
    pub meshes: Vec<Option<Handle<Mesh>>>,
    /// Material shared by all decks.
    pub material: Handle<StandardMaterial>,
}

impl PlatformVisuals {
    /// Mesh and material for the prefab at `index`.
    pub fn for_prefab(&self, index: usize) -> Option<(Handle<Mesh>, Handle<StandardMaterial>)> {
        let mesh = self.meshes.get(index)?.clone()?;
        Some((mesh, self.material.clone()))
    }
}

/// System that (re)builds [`PlatformVisuals`] from the library.
pub fn build_platform_visuals(
    mut commands: Commands,
    library: Res<PlatformLibrary>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let generated = library
        .prefabs
        .iter()
        .map(|prefab| {
            let profile = deck_profile(prefab.width, 0.2, 0.25);
            let segments = prefab.spline.segment_count() * SEGMENTS_PER_CURVE;
            let mesh = extrude_along(&prefab.spline, &profile, segments, 4.0);
            if mesh.is_none() {
                warn!("Could not build a deck mesh for prefab {}", prefab.name);
            }
            mesh.map(|mesh| meshes.add(mesh))
        })
        .collect();

    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.45, 0.47, 0.5),
        perceptual_roughness: 0.8,
        ..default()
    });

    debug!("Built deck meshes for {} prefabs", library.len());
    commands.insert_resource(PlatformVisuals {
        meshes: generated,
        material,
    });
}
