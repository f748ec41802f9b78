//! Draws the glow state: gradient quad, hexagon outlines, and either light
//! trails or radial cell fills.
//!
//! Reads [`crate::glow::HexField`] and the resolved palette; never mutates
//! glow state. Each trail is a retained gizmo with its own width: an
//! HDR-boosted core over a wide faint halo, so the camera's bloom adds the
//! soft glow.

mod entities;
mod frame_plan;
mod startup_systems;
mod systems;

use bevy::prelude::*;

use crate::glow::GlowSet;
use entities::{OutlineGizmos, StrokePool};

/// How glowing cells are painted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
#[cfg_attr(feature = "native", derive(clap::ValueEnum))]
pub enum GlowStyle {
    /// Two light trails run around the border from the entry point.
    #[default]
    Trails,
    /// A radial fill inside the cell; its outline brightens with the glow.
    Fill,
}

/// Stroke sizes and glow tuning for the renderer.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct BackdropConfig {
    /// How glowing cells are painted.
    pub style: GlowStyle,
    /// Static outline width (logical pixels).
    pub outline_width: f32,
    /// Extra outline alpha per unit of intensity in [`GlowStyle::Fill`].
    pub outline_glow_gain: f32,
    /// Trail width at zero intensity.
    pub trail_width: f32,
    /// Extra trail width per unit of intensity.
    pub trail_width_gain: f32,
    /// Halo width at zero intensity.
    pub glow_radius: f32,
    /// Extra halo width per unit of intensity.
    pub glow_radius_gain: f32,
    /// Halo alpha relative to the trail alpha.
    pub halo_alpha: f32,
    /// How far past 1.0 a full-intensity trail core is pushed for bloom.
    pub hdr_boost: f32,
    /// Fill alpha at the cell center per unit of intensity.
    pub fill_core_alpha: f32,
    /// Fill alpha halfway to the border per unit of intensity.
    pub fill_rim_alpha: f32,
    /// Z of the gradient quad; the fill sits just above it, gizmos above both.
    pub gradient_depth: f32,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            style: GlowStyle::Trails,
            outline_width: 1.0,
            outline_glow_gain: 0.15,
            trail_width: 2.0,
            trail_width_gain: 1.0,
            glow_radius: 6.0,
            glow_radius_gain: 8.0,
            halo_alpha: 0.25,
            hdr_boost: 3.0,
            fill_core_alpha: 0.3,
            fill_rim_alpha: 0.2,
            gradient_depth: -10.0,
        }
    }
}

/// Camera, gradient background, and glow drawing.
pub struct BackdropPlugin(pub BackdropConfig);

impl Plugin for BackdropPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<BackdropConfig>()
            .insert_resource(self.0.clone())
            .init_resource::<StrokePool>()
            .init_gizmo_group::<OutlineGizmos>()
            .add_systems(
                Startup,
                (
                    startup_systems::spawn_camera,
                    startup_systems::spawn_gradient,
                    startup_systems::spawn_fill,
                    startup_systems::configure_gizmos,
                ),
            )
            .add_systems(
                Update,
                (
                    systems::refresh_gradient,
                    systems::sync_bloom,
                    systems::draw_outlines,
                    systems::draw_trails,
                    systems::draw_fill,
                )
                    .after(GlowSet::Advance),
            );
    }
}
