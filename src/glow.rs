//! Pointer-reactive glow over a tessellated hexagon grid.
//!
//! Owns the grid (regenerated whenever the window size changes), the pointer
//! tracker, and the per-cell glow state machine. Drawing lives in
//! [`crate::backdrop`].

mod cell_glow;
mod entities;
mod hex_grid_layout;
mod pointer_tracker;
mod systems;

pub use cell_glow::{FrameInput, GlowPhase};
pub use entities::{HexField, Pointer};
pub use hex_grid_layout::{HexGridLayout, MIN_HEX_SIZE};
pub use pointer_tracker::PointerSample;

use bevy::prelude::*;

use crate::GameState;

/// Pipeline ordering for glow update systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GlowSet {
    /// Regenerates the grid when the viewport size changes.
    Fit,
    /// Reads the cursor into the pointer tracker.
    Track,
    /// Steps every relevant cell's glow state.
    Advance,
}

/// Nested configuration for the glow subsystem.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct GlowConfig {
    /// Grid generation settings.
    pub grid: GridSettings,
    /// Intensity state machine settings.
    pub glow: GlowSettings,
    /// Light trail growth and decay settings.
    pub trail: TrailSettings,
}

/// Grid layout parameters.
#[derive(Clone, Debug, Reflect)]
pub struct GridSettings {
    /// Hexagon circumradius in logical pixels.
    pub hex_size: f32,
}

/// Per-cell intensity parameters.
#[derive(Clone, Debug, Reflect)]
pub struct GlowSettings {
    /// Proximity radius as a multiple of `hex_size`.
    pub proximity_multiplier: f32,
    /// Weight of the distance term in the target intensity.
    pub proximity_weight: f32,
    /// Weight of the pointer-speed term in the target intensity.
    pub velocity_weight: f32,
    /// Speed (pixels per reference frame) that yields a velocity bonus of 1.
    pub velocity_divisor: f32,
    /// Upper bound of the velocity bonus before weighting.
    pub velocity_bonus_cap: f32,
    /// Hard ceiling for any cell's intensity.
    pub max_intensity: f32,
    /// Approach rate per reference frame while intensity rises.
    pub grow_rate: f32,
    /// Approach rate per reference frame while intensity falls.
    pub fade_rate: f32,
    /// Below this, a cell with no pending target snaps to dormant.
    pub epsilon: f32,
    /// Duration of one reference frame (seconds); rates are expressed per this frame.
    pub reference_frame_secs: f32,
    /// Weight of the previous speed in the pointer speed moving average.
    pub speed_smoothing: f32,
}

/// Light trail parameters. Offsets are fractions of the hexagon perimeter.
#[derive(Clone, Debug, Reflect)]
pub struct TrailSettings {
    /// Offset gained per reference frame with a still pointer.
    pub base_advance: f32,
    /// Extra offset per reference frame per unit of pointer speed.
    pub speed_advance: f32,
    /// Spread reachable at zero intensity and zero speed.
    pub spread_base: f32,
    /// Extra spread per unit of intensity.
    pub spread_intensity_gain: f32,
    /// Extra spread per unit of pointer speed.
    pub spread_speed_gain: f32,
    /// Absolute spread ceiling; 0.5 lets the two trails meet opposite the entry.
    pub spread_cap: f32,
    /// Fraction of each offset lost per reference frame once the pointer leaves.
    pub shrink_rate: f32,
    /// Polyline segments per drawn trail.
    pub steps: usize,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            grid: GridSettings { hex_size: 80.0 },
            glow: GlowSettings {
                proximity_multiplier: 1.2,
                proximity_weight: 0.8,
                velocity_weight: 1.0,
                velocity_divisor: 30.0,
                velocity_bonus_cap: 0.4,
                max_intensity: 0.6,
                grow_rate: 0.08,
                fade_rate: 0.03,
                epsilon: 0.01,
                reference_frame_secs: 1.0 / 60.0,
                speed_smoothing: 0.65,
            },
            trail: TrailSettings {
                base_advance: 0.003,
                speed_advance: 0.000_2,
                spread_base: 0.04,
                spread_intensity_gain: 0.15,
                spread_speed_gain: 0.004,
                spread_cap: 0.5,
                shrink_rate: 0.08,
                steps: 12,
            },
        }
    }
}

impl GlowSettings {
    /// Proximity radius in pixels for cells of `hex_size`.
    pub fn threshold(&self, hex_size: f32) -> f32 {
        hex_size * self.proximity_multiplier
    }

    /// Converts a frame duration into reference frames.
    ///
    /// Non-finite or non-positive durations count as one reference frame.
    pub fn dt_scale(&self, dt_secs: f32) -> f32 {
        if dt_secs.is_finite() && dt_secs > 0.0 && self.reference_frame_secs > 0.0 {
            dt_secs / self.reference_frame_secs
        } else {
            1.0
        }
    }
}

/// Grid generation, pointer tracking, and glow stepping.
pub struct GlowPlugin(pub GlowConfig);

impl Plugin for GlowPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<GlowConfig>()
            .register_type::<GlowPhase>()
            .insert_resource(self.0.clone())
            .init_resource::<HexField>()
            .init_resource::<Pointer>()
            .configure_sets(
                Update,
                (GlowSet::Fit, GlowSet::Track, GlowSet::Advance).chain(),
            )
            .add_systems(Update, systems::fit_grid_to_window.in_set(GlowSet::Fit))
            .add_systems(Update, systems::track_pointer.in_set(GlowSet::Track))
            .add_systems(Update, systems::advance_glow.in_set(GlowSet::Advance));

        app.add_systems(
            Update,
            systems::draw_cell_labels
                .after(GlowSet::Advance)
                .run_if(in_state(GameState::Debugging)),
        );
    }
}
