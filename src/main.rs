//! Endless runner game.
//!
//! Run with: `cargo run`
//!
//! Tuning is read from `runner.ron` in the working directory when present.

use std::path::Path;

use bevy::prelude::*;
use spline_runner::prelude::*;

const CONFIG_PATH: &str = "runner.ron";

fn main() {
    let mut app = App::new();
    app.add_plugins(DefaultPlugins);

    let config = load_config(Path::new(CONFIG_PATH));

    app.add_plugins(RunnerPlugin { config })
        .add_systems(Startup, setup)
        .add_systems(Update, show_help)
        .run();
}

fn load_config(path: &Path) -> RunnerConfig {
    if !path.exists() {
        info!("No {} found, using default settings", path.display());
        return RunnerConfig::default();
    }

    match RunnerConfig::load(path) {
        Ok(config) => {
            info!("Loaded settings from {}", path.display());
            config
        }
        Err(err) => {
            warn!("{err}; using default settings");
            RunnerConfig::default()
        }
    }
}

fn setup(mut commands: Commands, config: Res<RunnerConfig>) {
    // Camera trailing the player
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 5.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
        ChaseCamera::from_settings(&config.camera),
    ));

    // Ambient light
    commands.insert_resource(GlobalAmbientLight {
        color: Color::WHITE,
        brightness: 500.0,
        ..default()
    });

    // Directional light
    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn show_help(keyboard: Res<ButtonInput<KeyCode>>, state: Res<State<GameState>>) {
    if !keyboard.just_pressed(KeyCode::KeyH) {
        return;
    }

    info!("=== Spline Runner Help === ({:?})", state.get());
    info!("  Enter      - Play (menu)");
    info!("  Escape     - Quit (menu) / back to menu (playing)");
    info!("  W          - Run forward");
    info!("  RMB + drag - Orbit camera");
    info!("  Scroll     - Zoom");
    info!("  H          - Show this help");
}
