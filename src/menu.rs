//! Main menu and top-level game state.

use bevy::prelude::*;

const NORMAL_BUTTON: Color = Color::srgb(0.15, 0.15, 0.15);
const HOVERED_BUTTON: Color = Color::srgb(0.25, 0.25, 0.25);
const PRESSED_BUTTON: Color = Color::srgb(0.35, 0.75, 0.35);
const TEXT_COLOR: Color = Color::srgb(0.9, 0.9, 0.9);

/// Top-level screens, in play order.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    #[default]
    MainMenu,
    Playing,
}

impl GameState {
    /// The screen that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::MainMenu => Some(Self::Playing),
            Self::Playing => None,
        }
    }
}

/// A menu choice, carried by buttons and sent as a message when taken.
#[derive(Message, Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Play,
    Quit,
}

impl MenuAction {
    fn label(self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Quit => "Quit",
        }
    }
}

/// Advance to the screen after `current`.
pub fn play_game(current: GameState, next_state: &mut NextState<GameState>) {
    match current.next() {
        Some(next) => next_state.set(next),
        None => warn!("No screen after {current:?}"),
    }
}

/// Ask the app to exit.
pub fn quit_game(exit: &mut MessageWriter<AppExit>) {
    info!("Quit Game!");
    exit.write(AppExit::Success);
}

fn setup_menu(mut commands: Commands) {
    commands
        .spawn((
            Name::new("MainMenu"),
            DespawnOnExit(GameState::MainMenu),
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                row_gap: Val::Px(16.0),
                ..default()
            },
        ))
        .with_children(|parent| {
            for action in [MenuAction::Play, MenuAction::Quit] {
                parent
                    .spawn((
                        Button,
                        action,
                        Node {
                            width: Val::Px(240.0),
                            height: Val::Px(64.0),
                            align_items: AlignItems::Center,
                            justify_content: JustifyContent::Center,
                            ..default()
                        },
                        BackgroundColor(NORMAL_BUTTON),
                    ))
                    .with_child((Text::new(action.label()), TextColor(TEXT_COLOR)));
            }
        });
}

fn button_interactions(
    mut buttons: Query<
        (&Interaction, &MenuAction, &mut BackgroundColor),
        (Changed<Interaction>, With<Button>),
    >,
    mut actions: MessageWriter<MenuAction>,
) {
    for (interaction, action, mut color) in &mut buttons {
        *color = match interaction {
            Interaction::Pressed => {
                actions.write(*action);
                PRESSED_BUTTON.into()
            }
            Interaction::Hovered => HOVERED_BUTTON.into(),
            Interaction::None => NORMAL_BUTTON.into(),
        };
    }
}

fn menu_keys(keyboard: Res<ButtonInput<KeyCode>>, mut actions: MessageWriter<MenuAction>) {
    if keyboard.just_pressed(KeyCode::Enter) {
        actions.write(MenuAction::Play);
    } else if keyboard.just_pressed(KeyCode::Escape) {
        actions.write(MenuAction::Quit);
    }
}

fn handle_menu_actions(
    mut actions: MessageReader<MenuAction>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
    mut exit: MessageWriter<AppExit>,
) {
    // Only the first choice in a frame counts.
    let Some(action) = actions.read().next().copied() else {
        return;
    };
    actions.clear();

    match action {
        MenuAction::Play => play_game(*state.get(), &mut next_state),
        MenuAction::Quit => quit_game(&mut exit),
    }
}

fn back_to_menu(keyboard: Res<ButtonInput<KeyCode>>, mut next_state: ResMut<NextState<GameState>>) {
    if keyboard.just_pressed(KeyCode::Escape) {
        info!("Back to main menu");
        next_state.set(GameState::MainMenu);
    }
}

/// Plugin for the main menu and [`GameState`].
///
/// # Controls
/// - Enter: Play
/// - Escape: Quit from the menu, or return to the menu while playing
pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_message::<MenuAction>()
            .add_systems(OnEnter(GameState::MainMenu), setup_menu)
            .add_systems(
                Update,
                (
                    (button_interactions, menu_keys).run_if(in_state(GameState::MainMenu)),
                    handle_menu_actions,
                )
                    .chain(),
            )
            .add_systems(Update, back_to_menu.run_if(in_state(GameState::Playing)));
    }
}
