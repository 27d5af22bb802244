use bevy::prelude::*;

use crate::config::FollowerSettings;

/// Parameter the follower is held at while it waits for the next platform.
pub const END_HOLD_T: f32 = 0.99;

/// Progress from which [`TrackFollower::is_near_end`] reports true.
pub const NEAR_END_T: f32 = 0.9;

/// Current state of a track follower.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Default)]
pub enum FollowerState {
    /// No track assigned yet.
    #[default]
    Idle,
    /// Moving along the current track.
    Running,
    /// Reached the end of the current track and waiting for a handoff.
    Waiting,
}

/// Component that moves the player along the current platform's spline.
///
/// The entity only advances while [`forward_key`](Self::forward_key) is held.
/// Once per track it requests the next platform with [`SpawnNextPlatform`]
/// when its progress passes [`spawn_trigger`](Self::spawn_trigger).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component, Default)]
pub struct TrackFollower {
    /// The platform whose spline is being followed.
    pub spline: Option<Entity>,

    /// Current parametric position on the spline (0.0 to 1.0).
    pub t: f32,

    /// Movement speed in world units per second.
    pub speed: f32,

    /// Key that drives the follower forward.
    pub forward_key: KeyCode,

    /// Progress at which the next platform is requested.
    pub spawn_trigger: f32,

    /// Whether the request for the current track has been sent.
    pub has_triggered_spawn: bool,

    /// Current state.
    pub state: FollowerState,
}

impl Default for TrackFollower {
    fn default() -> Self {
        Self::from_settings(&FollowerSettings::default())
    }
}

impl TrackFollower {
    /// Create a follower tuned by `settings`, not yet on any track.
    pub fn from_settings(settings: &FollowerSettings) -> Self {
        Self {
            spline: None,
            t: 0.0,
            speed: settings.speed,
            forward_key: KeyCode::KeyW,
            spawn_trigger: settings.spawn_trigger,
            has_triggered_spawn: false,
            state: FollowerState::Idle,
        }
    }

    /// Set the movement speed.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set the key that drives the follower.
    pub fn with_forward_key(mut self, key: KeyCode) -> Self {
        self.forward_key = key;
        self
    }

    /// Set the progress at which the next platform is requested.
    pub fn with_spawn_trigger(mut self, trigger: f32) -> Self {
        self.spawn_trigger = trigger;
        self
    }

    /// Progress along the current track.
    pub fn progress(&self) -> f32 {
        self.t
    }

    /// Whether the follower is in the last tenth of its track.
    pub fn is_near_end(&self) -> bool {
        self.t >= NEAR_END_T
    }

    /// The platform currently being followed.
    pub fn current_spline(&self) -> Option<Entity> {
        self.spline
    }

    /// Switch to `spline`, starting at parameter `t`, and re-arm the spawn trigger.
    pub(crate) fn enter_track(&mut self, spline: Entity, t: f32) {
        self.spline = Some(spline);
        self.t = t;
        self.has_triggered_spawn = false;
        self.state = FollowerState::Running;
    }

    /// Move forward by `dt` in parameter space.
    pub(crate) fn step(&mut self, dt: f32) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        self.t += dt;

        if !self.has_triggered_spawn && self.t >= self.spawn_trigger {
            self.has_triggered_spawn = true;
            outcome.triggered_spawn = true;
        }

        if self.t >= 1.0 {
            self.t = END_HOLD_T;
            if self.state != FollowerState::Waiting {
                self.state = FollowerState::Waiting;
                outcome.reached_end = true;
            }
        }

        outcome
    }
}

/// What happened during a single [`TrackFollower::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct StepOutcome {
    pub triggered_spawn: bool,
    pub reached_end: bool,
}

/// Request from a follower for the platform after the current one.
#[derive(Message, Debug, Clone, Copy)]
pub struct SpawnNextPlatform {
    /// The follower that asked.
    pub follower: Entity,
}

/// Instructions for moving a follower onto a platform's spline.
#[derive(Message, Debug, Clone, Copy)]
pub struct TrackCommand {
    /// The entity with the [`TrackFollower`] component.
    pub follower: Entity,
    /// The platform entity carrying the new spline.
    pub spline: Entity,
    /// How to enter the new spline.
    pub kind: TrackCommandKind,
}

/// How a follower enters a new spline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackCommandKind {
    /// Start at the beginning of the spline.
    Set,
    /// Continue from the sample nearest to the current position.
    Transition,
}

/// Message emitted when a follower reaches a significant point.
#[derive(Message, Debug, Clone)]
pub struct FollowerEvent {
    /// The entity with the TrackFollower component.
    pub entity: Entity,
    /// The type of event.
    pub kind: FollowerEventKind,
}

/// Types of follower events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowerEventKind {
    /// Follower was placed at the start of a track.
    TrackSet,
    /// Follower passed its spawn trigger.
    SpawnTriggered,
    /// Follower reached the end of its track and is waiting.
    ReachedEnd,
    /// Follower moved onto the next track.
    Transitioned,
}
