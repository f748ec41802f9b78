use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::post_process::bloom::{Bloom, BloomCompositeMode};
use bevy::prelude::*;
use bevy::render::view::Hdr;

use super::BackdropConfig;
use super::entities::{BackdropCamera, CellFill, GradientQuad, OutlineGizmos};
use super::frame_plan;
use crate::theme::ActivePalette;

/// Spawns the 2D camera with HDR and bloom.
pub fn spawn_camera(mut commands: Commands, palette: Res<ActivePalette>) {
    commands.spawn((
        Name::new("BackdropCamera"),
        Camera2d,
        Hdr,
        // Palette colors are authored in display space; no curve on top.
        Tonemapping::None,
        Bloom {
            intensity: palette.current.bloom_intensity,
            composite_mode: BloomCompositeMode::Additive,
            ..Bloom::NATURAL
        },
        BackdropCamera,
    ));
    commands.insert_resource(ClearColor(palette.current.gradient[0].into()));
}

/// Spawns the gradient quad behind every gizmo stroke.
///
/// Starts at 1x1; `refresh_gradient` resizes it on the first frame the window
/// reports a size.
pub fn spawn_gradient(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    palette: Res<ActivePalette>,
    cfg: Res<BackdropConfig>,
) {
    let mesh = meshes.add(frame_plan::backdrop_mesh(Vec2::ONE, &palette.current));
    commands.spawn((
        Name::new("Gradient"),
        Mesh2d(mesh),
        MeshMaterial2d(materials.add(ColorMaterial::default())),
        Transform::from_xyz(0.0, 0.0, cfg.gradient_depth),
        GradientQuad,
    ));
}

/// Spawns the hidden cell fill mesh; `draw_fill` rewrites it in place.
pub fn spawn_fill(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    cfg: Res<BackdropConfig>,
) {
    commands.spawn((
        Name::new("CellFill"),
        Mesh2d(meshes.add(Rectangle::new(1.0, 1.0))),
        MeshMaterial2d(materials.add(ColorMaterial::default())),
        Transform::from_xyz(0.0, 0.0, cfg.gradient_depth + 1.0),
        Visibility::Hidden,
        CellFill,
    ));
}

/// Sets the outline width.
pub fn configure_gizmos(mut store: ResMut<GizmoConfigStore>, cfg: Res<BackdropConfig>) {
    let (outline, _) = store.config_mut::<OutlineGizmos>();
    outline.line.width = cfg.outline_width;
}
