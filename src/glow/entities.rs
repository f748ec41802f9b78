use bevy::prelude::*;

use super::hex_grid_layout::HexGridLayout;
use super::pointer_tracker::PointerTracker;

/// The backdrop's hexagon grid and all per-cell glow state.
///
/// Replaced wholesale by [`super::systems::fit_grid_to_window`] whenever the
/// window size changes.
#[derive(Resource, Default)]
pub struct HexField {
    /// Cells, their geometry, and the active-cell index.
    pub grid: HexGridLayout,
}

/// Pointer state shared by the tracking and stepping systems.
#[derive(Resource, Default)]
pub struct Pointer(pub PointerTracker);
