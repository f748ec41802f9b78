use bevy::post_process::bloom::Bloom;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::entities::{
    BackdropCamera, CellFill, GradientQuad, OutlineGizmos, StrokePool, StrokeSlot, TrailSlot,
};
use super::frame_plan;
use super::{BackdropConfig, GlowStyle};
use crate::glow::{GlowConfig, HexField};
use crate::theme::{ActivePalette, Palette};

// ── Update: background ─────────────────────────────────────────────

/// Rebuilds the gradient quad when the window size or palette changes.
pub fn refresh_gradient(
    windows: Query<&Window, With<PrimaryWindow>>,
    palette: Res<ActivePalette>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut quads: Query<&mut Mesh2d, With<GradientQuad>>,
    mut clear: ResMut<ClearColor>,
    mut last: Local<Option<(Vec2, Palette)>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let size = window.size();
    if size.x <= 0.0 || size.y <= 0.0 {
        return;
    }
    let state = (size, palette.current);
    if last.as_ref() == Some(&state) {
        return;
    }

    for mut quad in &mut quads {
        quad.0 = meshes.add(frame_plan::backdrop_mesh(size, &palette.current));
    }
    clear.0 = palette.current.gradient[0].into();
    *last = Some(state);
}

/// Follows the palette's bloom strength.
pub fn sync_bloom(palette: Res<ActivePalette>, mut cameras: Query<&mut Bloom, With<BackdropCamera>>) {
    if !palette.is_changed() {
        return;
    }
    for mut bloom in &mut cameras {
        bloom.intensity = palette.current.bloom_intensity;
    }
}

// ── Update: glow ───────────────────────────────────────────────────

/// Draws every hexagon outline.
pub fn draw_outlines(
    field: Res<HexField>,
    palette: Res<ActivePalette>,
    cfg: Res<BackdropConfig>,
    mut outlines: Gizmos<OutlineGizmos>,
) {
    let viewport = field.grid.viewport();
    for cell in field.grid.cells() {
        let color = frame_plan::outline_color(&palette.current, cell.glow.intensity, &cfg);
        outlines.lineloop_2d(
            cell.vertices
                .iter()
                .map(|v| frame_plan::viewport_to_world(*v, viewport)),
            color,
        );
    }
}

/// Writes this frame's trail passes into the retained gizmo pool.
///
/// Every pass gets its own slot so each keeps its own width; slots are
/// spawned on demand and emptied when the frame needs fewer.
#[allow(clippy::too_many_arguments)]
pub fn draw_trails(
    mut commands: Commands,
    field: Res<HexField>,
    palette: Res<ActivePalette>,
    glow_cfg: Res<GlowConfig>,
    cfg: Res<BackdropConfig>,
    mut pool: ResMut<StrokePool>,
    mut assets: ResMut<Assets<GizmoAsset>>,
    mut gizmos: Query<&mut Gizmo, With<TrailSlot>>,
) {
    let passes = if cfg.style == GlowStyle::Trails {
        let strokes =
            frame_plan::plan_trails(&field.grid, &palette.current, &cfg, glow_cfg.trail.steps);
        frame_plan::stroke_passes(&strokes, field.grid.viewport(), &cfg)
    } else {
        Vec::new()
    };

    let pooled = pool.slots.len();
    for (i, pass) in passes.iter().enumerate() {
        if i == pool.slots.len() {
            let handle = assets.add(GizmoAsset::new());
            let entity = commands
                .spawn((
                    Name::new("TrailStroke"),
                    Gizmo {
                        handle: handle.clone(),
                        line_config: stroke_line(pass.width),
                        ..default()
                    },
                    TrailSlot,
                ))
                .id();
            pool.slots.push(StrokeSlot { entity, handle });
        }
        let slot = &pool.slots[i];
        if let Some(asset) = assets.get_mut(&slot.handle) {
            asset.clear();
            asset.linestrip_2d(pass.points.iter().copied(), pass.color);
        }
        if let Ok(mut gizmo) = gizmos.get_mut(slot.entity)
            && gizmo.line_config.width != pass.width
        {
            gizmo.line_config.width = pass.width;
        }
    }

    for slot in pool.slots.iter().skip(passes.len()) {
        let drawn = assets
            .get(&slot.handle)
            .is_some_and(|asset| !asset.strip_positions.is_empty());
        if !drawn {
            continue;
        }
        if let Some(asset) = assets.get_mut(&slot.handle) {
            asset.clear();
        }
    }

    if pool.slots.len() > pooled {
        debug!("Trail gizmo pool grew to {} slots", pool.slots.len());
    }
}

fn stroke_line(width: f32) -> GizmoLineConfig {
    GizmoLineConfig {
        width,
        joints: GizmoLineJoint::Round(4),
        ..default()
    }
}

/// Rewrites the cell fill mesh, hiding it when nothing glows.
pub fn draw_fill(
    field: Res<HexField>,
    palette: Res<ActivePalette>,
    cfg: Res<BackdropConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut fills: Query<(&Mesh2d, &mut Visibility), With<CellFill>>,
) {
    let Ok((handle, mut visibility)) = fills.single_mut() else {
        return;
    };
    let mesh = match cfg.style {
        GlowStyle::Fill => frame_plan::fill_mesh(&field.grid, &palette.current, &cfg),
        GlowStyle::Trails => None,
    };
    match mesh {
        Some(mesh) => {
            if let Some(target) = meshes.get_mut(&handle.0) {
                *target = mesh;
            }
            visibility.set_if_neq(Visibility::Inherited);
        }
        None => {
            visibility.set_if_neq(Visibility::Hidden);
        }
    }
}
