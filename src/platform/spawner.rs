use std::collections::VecDeque;

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::SpawnerSettings;
use crate::error::SpawnError;
use crate::follower::{SpawnNextPlatform, TrackCommand, TrackCommandKind, TrackFollower};
use crate::spline::Spline;

use super::alignment::connect;
use super::mesh::PlatformVisuals;
use super::{
    DespawnTimer, PendingHandoff, Platform, PlatformConnected, PlatformLibrary, PlatformPrefab,
    StartRun,
};

/// Spawner state: the window of live platforms and the bookkeeping needed to
/// extend it.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlatformSpawner {
    /// Tuning for this spawner.
    pub settings: SpawnerSettings,
    /// Live platforms, oldest first. The last one is the current platform.
    pub active: VecDeque<Entity>,
    /// The follower that drives this run.
    pub player: Option<Entity>,
    /// Prefab used for the most recent platform.
    pub last_prefab_index: Option<usize>,
    /// Sequence number for the next platform's name.
    pub platform_index: u32,
    /// Set while a spawn is being processed this frame.
    pub is_spawning: bool,
}

impl PlatformSpawner {
    /// A spawner with the given settings and an empty window.
    pub fn new(settings: SpawnerSettings) -> Self {
        Self {
            settings,
            ..default()
        }
    }

    /// The newest platform, which the follower will end up on.
    pub fn current_platform(&self) -> Option<Entity> {
        self.active.back().copied()
    }

    /// Forget the run without touching the world.
    pub fn reset(&mut self) {
        self.active.clear();
        self.player = None;
        self.last_prefab_index = None;
        self.platform_index = 0;
        self.is_spawning = false;
    }
}

/// Source of randomness for prefab selection.
#[derive(Resource, Debug, Clone)]
pub struct SpawnerRng(pub ChaCha8Rng);

impl SpawnerRng {
    /// Seeded from `seed`, or from the thread RNG when `None`.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(ChaCha8Rng::seed_from_u64(seed)),
            None => Self(ChaCha8Rng::from_rng(&mut rand::rng())),
        }
    }
}

/// Platform splines as the spawner sees them.
type PlatformTracks<'w, 's> = Query<
    'w,
    's,
    (&'static Spline, &'static Transform, Option<&'static Name>),
    (With<Platform>, Without<TrackFollower>),
>;

/// Pick a prefab index, avoiding `last` whenever there is a choice.
pub fn pick_prefab(rng: &mut impl Rng, count: usize, last: Option<usize>) -> usize {
    loop {
        let index = rng.random_range(0..count);
        if count <= 1 || Some(index) != last {
            return index;
        }
    }
}

fn spawn_platform(
    commands: &mut Commands,
    prefab: (usize, &PlatformPrefab),
    visuals: Option<&PlatformVisuals>,
    index: u32,
    transform: Transform,
) -> Entity {
    let (prefab, template) = prefab;
    let mut entity = commands.spawn((
        Name::new(format!("Platform_{index}")),
        Platform { index, prefab },
        template.spline.clone(),
        transform,
        Visibility::default(),
    ));

    if let Some((mesh, material)) = visuals.and_then(|v| v.for_prefab(prefab)) {
        entity.insert((Mesh3d(mesh), MeshMaterial3d(material)));
    }

    entity.id()
}

/// System that lays the first platform of a run and puts the player on it.
pub fn spawn_first_platform(
    mut commands: Commands,
    mut starts: MessageReader<StartRun>,
    mut spawner: ResMut<PlatformSpawner>,
    library: Res<PlatformLibrary>,
    visuals: Option<Res<PlatformVisuals>>,
    followers: Query<(), With<TrackFollower>>,
    mut tracks: MessageWriter<TrackCommand>,
) {
    for start in starts.read() {
        let Some(first) = library.get(0) else {
            warn!("Cannot start a run: {}", SpawnError::EmptyLibrary);
            continue;
        };

        if followers.get(start.player).is_err() {
            error!("Player {} must have a TrackFollower", start.player);
            continue;
        }

        if !spawner.active.is_empty() {
            warn!("Run already started; ignoring start for {}", start.player);
            continue;
        }

        let index = spawner.platform_index;
        let platform = spawn_platform(
            &mut commands,
            (0, first),
            visuals.as_deref(),
            index,
            Transform::IDENTITY,
        );

        spawner.active.push_back(platform);
        spawner.player = Some(start.player);
        spawner.last_prefab_index = Some(0);
        spawner.platform_index += 1;

        tracks.write(TrackCommand {
            follower: start.player,
            spline: platform,
            kind: TrackCommandKind::Set,
        });
        info!("First platform created and assigned to ball");
    }
}

/// System that answers [`SpawnNextPlatform`] requests.
///
/// One platform is spawned per frame; further requests in the same frame are
/// dropped, as the window cannot see the platform just queued.
#[allow(clippy::too_many_arguments)]
pub fn spawn_next_platform(
    mut commands: Commands,
    mut requests: MessageReader<SpawnNextPlatform>,
    mut spawner: ResMut<PlatformSpawner>,
    mut rng: ResMut<SpawnerRng>,
    library: Res<PlatformLibrary>,
    visuals: Option<Res<PlatformVisuals>>,
    platforms: PlatformTracks,
    mut connected: MessageWriter<PlatformConnected>,
) {
    for request in requests.read() {
        match extend_window(
            &mut commands,
            &mut spawner,
            &mut rng,
            &library,
            visuals.as_deref(),
            &platforms,
            request.follower,
        ) {
            Ok(event) => {
                info!("Platform spawned! Active platforms: {}", spawner.active.len());
                connected.write(event);
            }
            Err(SpawnError::AlreadySpawning) => {
                debug!("Spawn already in progress; dropping request from {}", request.follower);
            }
            Err(err) => error!("{err}"),
        }
    }

    spawner.is_spawning = false;
}

fn extend_window(
    commands: &mut Commands,
    spawner: &mut PlatformSpawner,
    rng: &mut SpawnerRng,
    library: &PlatformLibrary,
    visuals: Option<&PlatformVisuals>,
    platforms: &PlatformTracks,
    follower: Entity,
) -> Result<PlatformConnected, SpawnError> {
    if spawner.is_spawning {
        return Err(SpawnError::AlreadySpawning);
    }
    if library.is_empty() {
        return Err(SpawnError::EmptyLibrary);
    }

    debug!("=== SPAWNING NEXT PLATFORM ===");

    let current = spawner
        .current_platform()
        .ok_or(SpawnError::NoCurrentPlatform)?;
    let (current_spline, current_transform, current_name) = platforms
        .get(current)
        .map_err(|_| SpawnError::MissingSpline(current))?;
    let current_name = current_name.map(Name::as_str).unwrap_or("unnamed");
    let end_knot = current_spline
        .last_knot()
        .ok_or_else(|| SpawnError::InvalidSpline(current_name.to_string()))?;

    let prefab = pick_prefab(&mut rng.0, library.len(), spawner.last_prefab_index);
    let template = library.get(prefab).ok_or(SpawnError::UnknownPrefab(prefab))?;
    let start_knot = template
        .spline
        .first_knot()
        .ok_or_else(|| SpawnError::InvalidSpline(template.name.clone()))?;

    spawner.is_spawning = true;

    let connection = connect(
        end_knot,
        current_transform,
        start_knot,
        spawner.settings.connection_gap,
    );

    let index = spawner.platform_index;
    let platform = spawn_platform(
        commands,
        (prefab, template),
        visuals,
        index,
        connection.transform,
    );
    commands.entity(platform).insert(PendingHandoff { follower });

    if spawner.settings.debug_mode {
        info!("Connected Platform_{index} to {current_name}");
    }

    spawner.last_prefab_index = Some(prefab);
    spawner.active.push_back(platform);
    spawner.platform_index += 1;

    cleanup_old_platforms(commands, spawner, platforms);

    Ok(PlatformConnected {
        platform,
        previous: current,
        end: connection.end,
        forward: connection.forward,
        unaligned_start: connection.unaligned_start,
    })
}

/// Trim the window down to `max_active_platforms`, oldest first.
///
/// Evicted platforms linger for `despawn_delay` seconds.
fn cleanup_old_platforms(
    commands: &mut Commands,
    spawner: &mut PlatformSpawner,
    platforms: &PlatformTracks,
) {
    while spawner.active.len() > spawner.settings.max_active_platforms {
        let Some(old) = spawner.active.pop_front() else {
            break;
        };
        match platforms.get(old) {
            Ok((_, _, Some(name))) => info!("Removing old platform: {name}"),
            _ => info!("Removing old platform: {old}"),
        }
        commands
            .entity(old)
            .try_insert(DespawnTimer::new(spawner.settings.despawn_delay));
    }
}

/// System that moves followers onto their new platform once they are
/// nearly done with the old one.
pub fn resolve_handoffs(
    mut commands: Commands,
    spawner: Res<PlatformSpawner>,
    pending: Query<(Entity, &PendingHandoff)>,
    followers: Query<&TrackFollower>,
    mut tracks: MessageWriter<TrackCommand>,
) {
    for (platform, handoff) in &pending {
        let Ok(follower) = followers.get(handoff.follower) else {
            commands.entity(platform).remove::<PendingHandoff>();
            continue;
        };

        if follower.progress() < spawner.settings.handoff_progress {
            continue;
        }

        tracks.write(TrackCommand {
            follower: handoff.follower,
            spline: platform,
            kind: TrackCommandKind::Transition,
        });
        commands.entity(platform).remove::<PendingHandoff>();
    }
}

/// System that despawns evicted platforms once their delay runs out.
pub fn tick_despawn_timers(
    mut commands: Commands,
    time: Res<Time>,
    mut timers: Query<(Entity, &mut DespawnTimer)>,
) {
    for (entity, mut timer) in &mut timers {
        if timer.0.tick(time.delta()).is_finished() {
            commands.entity(entity).despawn();
        }
    }
}

/// Despawn every platform and forget the run.
pub fn clear_platforms(
    mut commands: Commands,
    mut spawner: ResMut<PlatformSpawner>,
    platforms: Query<Entity, With<Platform>>,
) {
    for entity in &platforms {
        commands.entity(entity).despawn();
    }
    spawner.reset();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_never_repeats_when_there_is_a_choice() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut last = Some(0);
        for _ in 0..200 {
            let index = pick_prefab(&mut rng, 3, last);
            assert!(index < 3);
            assert_ne!(Some(index), last);
            last = Some(index);
        }
    }

    #[test]
    fn single_prefab_repeats() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(pick_prefab(&mut rng, 1, Some(0)), 0);
    }

    #[test]
    fn seeded_rngs_agree() {
        let mut a = SpawnerRng::from_seed(Some(9));
        let mut b = SpawnerRng::from_seed(Some(9));
        let picks_a: Vec<usize> = (0..16).map(|_| pick_prefab(&mut a.0, 5, None)).collect();
        let picks_b: Vec<usize> = (0..16).map(|_| pick_prefab(&mut b.0, 5, None)).collect();
        assert_eq!(picks_a, picks_b);
    }

    #[test]
    fn reset_clears_the_window() {
        let mut spawner = PlatformSpawner::new(SpawnerSettings::default());
        spawner.active.push_back(Entity::PLACEHOLDER);
        spawner.last_prefab_index = Some(2);
        spawner.platform_index = 5;
        spawner.reset();
        assert!(spawner.current_platform().is_none());
        assert_eq!(spawner.platform_index, 0);
        assert_eq!(spawner.last_prefab_index, None);
    }
}
