//! Debug drawing of platform connections.

use bevy::{
    color::palettes::css::{AQUA, GRAY, LIME, MAGENTA, YELLOW},
    gizmos::config::GizmoConfigStore,
    prelude::*,
};

use crate::spline::Spline;

use super::{Platform, PlatformConnected, PlatformSpawner};

/// How long a connection trace stays on screen.
const TRACE_SECONDS: f32 = 5.0;

/// Radius of the spheres marking platform ends.
const KNOT_MARKER_RADIUS: f32 = 0.5;

/// Length of the heading ray drawn at a connection.
const HEADING_RAY_LENGTH: f32 = 5.0;

/// Curve resolution for platform paths.
const PATH_SAMPLES_PER_SEGMENT: usize = 16;

/// A recent connection, drawn until its timer runs out.
#[derive(Debug, Clone)]
struct ConnectionTrace {
    end: Vec3,
    unaligned_start: Vec3,
    forward: Vec3,
    timer: Timer,
}

#[derive(Resource, Debug, Default)]
struct ConnectionTraces(Vec<ConnectionTrace>);

pub(super) struct ConnectionGizmosPlugin;

impl Plugin for ConnectionGizmosPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ConnectionTraces>().add_systems(
            Update,
            (
                record_connections,
                (draw_connection_traces, draw_platform_links)
                    .run_if(resource_exists::<GizmoConfigStore>),
            )
                .chain()
                .after(super::PlatformSystems::Spawn),
        );
    }
}

/// Keep new connections and age out old ones.
fn record_connections(
    spawner: Res<PlatformSpawner>,
    time: Res<Time>,
    mut connected: MessageReader<PlatformConnected>,
    mut traces: ResMut<ConnectionTraces>,
) {
    for trace in &mut traces.0 {
        trace.timer.tick(time.delta());
    }
    traces.0.retain(|trace| !trace.timer.is_finished());

    for event in connected.read() {
        if !spawner.settings.debug_mode {
            continue;
        }
        traces.0.push(ConnectionTrace {
            end: event.end,
            unaligned_start: event.unaligned_start,
            forward: event.forward,
            timer: Timer::from_seconds(TRACE_SECONDS, TimerMode::Once),
        });
    }
}

/// Where each new platform started and which way it was turned.
fn draw_connection_traces(traces: Res<ConnectionTraces>, mut gizmos: Gizmos) {
    for trace in &traces.0 {
        gizmos.line(trace.end, trace.unaligned_start, MAGENTA);
        gizmos.ray(trace.end, trace.forward * HEADING_RAY_LENGTH, LIME);
    }
}

/// Live platform paths and the seams between them.
fn draw_platform_links(
    spawner: Res<PlatformSpawner>,
    platforms: Query<(&Spline, &Transform), With<Platform>>,
    mut gizmos: Gizmos,
) {
    if !spawner.settings.debug_mode {
        return;
    }

    for (spline, transform) in spawner.active.iter().filter_map(|&e| platforms.get(e).ok()) {
        let path = spline
            .sample(PATH_SAMPLES_PER_SEGMENT)
            .into_iter()
            .map(|p| transform.transform_point(p));
        gizmos.linestrip(path, GRAY);
    }

    for (&older, &newer) in spawner.active.iter().zip(spawner.active.iter().skip(1)) {
        let (Ok((previous, previous_tf)), Ok((next, next_tf))) =
            (platforms.get(older), platforms.get(newer))
        else {
            continue;
        };

        let (Some(end), Some(start)) = (
            previous.evaluate_world(previous_tf, 1.0),
            next.evaluate_world(next_tf, 0.0),
        ) else {
            continue;
        };

        gizmos.sphere(Isometry3d::from_translation(end), KNOT_MARKER_RADIUS, YELLOW);
        gizmos.sphere(Isometry3d::from_translation(start), KNOT_MARKER_RADIUS, LIME);
        gizmos.line(end, start, AQUA);
    }
}
