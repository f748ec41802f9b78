#![warn(missing_docs)]
//! Pointer-reactive hexagon grid backdrop.
//!
//! Tiles the window with faint hexagon outlines; cells near the pointer light
//! up and grow two light trails around their border from the edge the pointer
//! came closest to (or, with `--style fill`, fill with a radial glow). `T`
//! switches theme, `Tab` opens the inspector.

mod backdrop;
mod glow;
pub mod math;
mod theme;

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use backdrop::BackdropConfig;
use glow::GlowConfig;
use theme::ThemeConfig;

/// Application-wide state, used for system scheduling.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum GameState {
    /// Backdrop running normally.
    #[default]
    Running,
    /// Debug overlay active (Tab to toggle).
    Debugging,
}

/// Command-line overrides for the default configuration.
#[cfg(feature = "native")]
#[derive(clap::Parser, Debug)]
#[command(name = "hex-glow", version, about = "Pointer-reactive hexagon grid backdrop")]
struct Cli {
    /// Hexagon circumradius in logical pixels (at least 8).
    #[arg(long, value_parser = parse_hex_size)]
    hex_size: Option<f32>,

    /// Theme shown at startup.
    #[arg(long, value_enum)]
    theme: Option<theme::Theme>,

    /// Proximity radius as a multiple of the hex size.
    #[arg(long, value_parser = positive_f32)]
    proximity: Option<f32>,

    /// How glowing cells are painted.
    #[arg(long, value_enum)]
    style: Option<backdrop::GlowStyle>,
}

#[cfg(feature = "native")]
fn positive_f32(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{value} is not a positive number"))
    }
}

#[cfg(feature = "native")]
fn parse_hex_size(s: &str) -> Result<f32, String> {
    let value = positive_f32(s)?;
    if value >= glow::MIN_HEX_SIZE {
        Ok(value)
    } else {
        Err(format!(
            "{value} is below the smallest hex size ({})",
            glow::MIN_HEX_SIZE
        ))
    }
}

#[cfg(feature = "native")]
fn load_configs() -> (GlowConfig, ThemeConfig, BackdropConfig) {
    use clap::Parser;

    let cli = Cli::parse();
    let mut glow = GlowConfig::default();
    let mut theme = ThemeConfig::default();
    let mut backdrop = BackdropConfig::default();

    if let Some(size) = cli.hex_size {
        glow.grid.hex_size = size;
    }
    if let Some(mult) = cli.proximity {
        glow.glow.proximity_multiplier = mult;
    }
    if let Some(initial) = cli.theme {
        theme.initial = initial;
    }
    if let Some(style) = cli.style {
        backdrop.style = style;
    }
    (glow, theme, backdrop)
}

#[cfg(not(feature = "native"))]
fn load_configs() -> (GlowConfig, ThemeConfig, BackdropConfig) {
    (
        GlowConfig::default(),
        ThemeConfig::default(),
        BackdropConfig::default(),
    )
}

fn main() {
    let (glow_cfg, theme_cfg, backdrop_cfg) = load_configs();
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Hex Glow".into(),
            ..default()
        }),
        ..default()
    }))
    .register_type::<GameState>()
    .init_state::<GameState>()
    .add_plugins(bevy_egui::EguiPlugin::default())
    .add_plugins(theme::ThemePlugin(theme_cfg))
    .add_plugins(glow::GlowPlugin(glow_cfg))
    .add_plugins(backdrop::BackdropPlugin(backdrop_cfg))
    .add_systems(Update, exit_on_esc)
    .add_systems(Update, toggle_inspector)
    .add_plugins(WorldInspectorPlugin::new().run_if(in_state(GameState::Debugging)));

    app.run();
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        let new_state = match state.get() {
            GameState::Running => GameState::Debugging,
            GameState::Debugging => GameState::Running,
        };
        info!("Switching to {new_state:?}");
        next.set(new_state);
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
