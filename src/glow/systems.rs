use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::egui;

use super::hex_grid_layout::MAX_CELLS;
use super::{FrameInput, GlowConfig, HexField, HexGridLayout, MIN_HEX_SIZE, Pointer};

// ── Update: grid sizing ────────────────────────────────────────────

/// Rebuilds the grid when the window size (or the configured hex size) changes.
///
/// A minimized window reports a zero size; the old grid is kept until the
/// window comes back.
pub fn fit_grid_to_window(
    windows: Query<&Window, With<PrimaryWindow>>,
    cfg: Res<GlowConfig>,
    mut field: ResMut<HexField>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let size = window.size();
    if size.x <= 0.0 || size.y <= 0.0 {
        return;
    }
    if field.grid.viewport() == size && field.grid.hex_size() == cfg.grid.hex_size {
        return;
    }

    field.grid = HexGridLayout::generate(size, cfg.grid.hex_size);
    if field.grid.is_empty() {
        warn!(
            "No hex grid for {}x{} at hex size {} (minimum size {}, at most {} cells)",
            size.x,
            size.y,
            cfg.grid.hex_size,
            MIN_HEX_SIZE,
            MAX_CELLS
        );
        return;
    }
    info!(
        "Hex grid rebuilt for {}x{}: {} cells",
        size.x,
        size.y,
        field.grid.len()
    );
}

// ── Update: pointer + glow ─────────────────────────────────────────

/// Copies the cursor into the pointer tracker; a cursor outside the window is a leave.
pub fn track_pointer(windows: Query<&Window, With<PrimaryWindow>>, mut pointer: ResMut<Pointer>) {
    let Ok(window) = windows.single() else {
        return;
    };
    match window.cursor_position() {
        Some(position) => pointer.0.move_to(position),
        None => pointer.0.leave(),
    }
}

/// Samples the pointer once and steps every cell that can change.
pub fn advance_glow(
    time: Res<Time>,
    cfg: Res<GlowConfig>,
    mut pointer: ResMut<Pointer>,
    mut field: ResMut<HexField>,
    mut last_active: Local<usize>,
) {
    if field.grid.is_empty() {
        return;
    }
    let dt_scale = cfg.glow.dt_scale(time.delta_secs());
    let sample = pointer.0.sample(dt_scale, cfg.glow.speed_smoothing);
    field.grid.advance(
        &FrameInput {
            pointer: sample,
            dt_scale,
        },
        &cfg,
    );

    let active = field.grid.active_len();
    if active != *last_active {
        debug!("{active} glowing cells (was {})", *last_active);
        *last_active = active;
    }
}

// ── Debug overlay ──────────────────────────────────────────────────

/// Labels every glowing cell with its coordinate, phase, and intensity.
pub fn draw_cell_labels(
    mut egui_ctx: Query<&mut bevy_egui::EguiContext>,
    field: Res<HexField>,
    pointer: Res<Pointer>,
    mut ready: Local<bool>,
) {
    // Egui fonts aren't available until after the first Context::run() in the render pass.
    if !*ready {
        *ready = true;
        return;
    }
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };
    let painter = ctx.get_mut().layer_painter(egui::LayerId::background());

    for cell in field.grid.active_cells() {
        painter.text(
            egui::pos2(cell.center.x, cell.center.y),
            egui::Align2::CENTER_CENTER,
            format!(
                "({},{})\n{:?} {:.2}",
                cell.id.x, cell.id.y, cell.glow.phase, cell.glow.intensity
            ),
            egui::FontId::monospace(11.0),
            egui::Color32::WHITE,
        );
    }

    if let Some(position) = pointer.0.position() {
        painter.text(
            egui::pos2(position.x + 14.0, position.y + 14.0),
            egui::Align2::LEFT_TOP,
            format!("{:.1} px/frame", pointer.0.speed()),
            egui::FontId::proportional(11.0),
            egui::Color32::LIGHT_BLUE,
        );
    }
}
