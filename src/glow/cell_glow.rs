use bevy::prelude::*;

use super::{GlowConfig, GlowSettings, PointerSample, TrailSettings};
use crate::math;

/// Lifecycle of a cell's glow.
///
/// `Dormant` → `Entering` (pointer close, intensity climbing) → `Active`
/// (settled near its target) → `Fading` (pointer gone) → `Dormant`.
/// Re-entrant: a fading cell the pointer returns to goes straight back to
/// `Entering` or `Active`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum GlowPhase {
    /// Zero intensity, no entry point, no trails.
    #[default]
    Dormant,
    /// Pointer in proximity, intensity still well below target.
    Entering,
    /// Pointer in proximity, intensity settled at its target.
    Active,
    /// Pointer left; intensity and trails shrinking.
    Fading,
}

/// Animation state of one hexagon.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellGlow {
    /// Current intensity in `[0, max_intensity]`.
    pub intensity: f32,
    /// Intensity being approached.
    pub target: f32,
    /// Perimeter offset where the pointer first came close; `None` while dormant.
    pub entry: Option<f32>,
    /// Clockwise trail length from the entry point (fraction of the perimeter).
    pub clockwise: f32,
    /// Counter-clockwise trail length from the entry point.
    pub counter_clockwise: f32,
    /// Current lifecycle phase.
    pub phase: GlowPhase,
}

/// Everything a cell needs to know about the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInput {
    /// Pointer position and smoothed speed.
    pub pointer: PointerSample,
    /// Frame length in reference frames (1.0 at 60 Hz).
    pub dt_scale: f32,
}

impl CellGlow {
    /// `true` when the cell has nothing to animate or draw.
    pub fn is_dormant(&self) -> bool {
        self.phase == GlowPhase::Dormant
    }

    /// Steps the state machine by one frame for the cell at `center` with
    /// corners `vertices`.
    pub fn advance(
        &mut self,
        center: Vec2,
        vertices: &[Vec2; 6],
        frame: &FrameInput,
        cfg: &GlowConfig,
    ) {
        let g = &cfg.glow;
        let size = cfg.grid.hex_size;
        let threshold = g.threshold(size);
        let speed = frame.pointer.speed.max(0.0);

        let near = frame.pointer.position.and_then(|pointer| {
            let distance = pointer.distance(center);
            (distance < threshold || math::point_in_hexagon(pointer, center, size))
                .then_some((pointer, distance))
        });

        self.target = match near {
            Some((_, distance)) => target_intensity(distance, threshold, speed, g),
            None => 0.0,
        };

        let rate = if self.target > self.intensity {
            g.grow_rate
        } else {
            g.fade_rate
        };
        self.intensity += (self.target - self.intensity) * math::frame_blend(rate, frame.dt_scale);
        self.intensity = self.intensity.clamp(0.0, g.max_intensity.max(0.0));

        if self.intensity < g.epsilon && self.target < g.epsilon {
            *self = Self::default();
            return;
        }

        match near {
            Some((pointer, _)) => {
                if self.entry.is_none() {
                    self.entry = Some(math::nearest_edge_offset(pointer, vertices));
                }
                self.grow_trails(speed, frame.dt_scale, &cfg.trail);
                self.phase = if self.intensity < self.target - g.epsilon {
                    GlowPhase::Entering
                } else {
                    GlowPhase::Active
                };
            }
            None => {
                self.shrink_trails(frame.dt_scale, &cfg.trail);
                self.phase = GlowPhase::Fading;
            }
        }
    }

    /// Extends both trails towards the current spread limit. Never shortens them.
    fn grow_trails(&mut self, speed: f32, dt_scale: f32, trail: &TrailSettings) {
        let max_spread = trail.max_spread(speed, self.intensity);
        let advance = (trail.base_advance + speed * trail.speed_advance) * dt_scale.max(0.0);
        for offset in [&mut self.clockwise, &mut self.counter_clockwise] {
            if *offset < max_spread {
                *offset = (*offset + advance).min(max_spread);
            }
        }
    }

    fn shrink_trails(&mut self, dt_scale: f32, trail: &TrailSettings) {
        let keep = (1.0 - trail.shrink_rate.clamp(0.0, 1.0)).powf(dt_scale.max(0.0));
        self.clockwise *= keep;
        self.counter_clockwise *= keep;
    }
}

impl TrailSettings {
    /// Longest either trail may grow for the given pointer speed and cell intensity.
    pub fn max_spread(&self, speed: f32, intensity: f32) -> f32 {
        (self.spread_base + intensity * self.spread_intensity_gain + speed * self.spread_speed_gain)
            .clamp(0.0, self.spread_cap)
    }
}

/// Target intensity for a pointer `distance` pixels from the cell center.
///
/// Closer and faster pointers glow brighter; the result is capped at
/// `max_intensity`.
pub fn target_intensity(distance: f32, threshold: f32, speed: f32, g: &GlowSettings) -> f32 {
    let proximity = if threshold > 0.0 {
        1.0 - (distance / threshold).min(1.0)
    } else {
        0.0
    };
    let velocity_bonus = if g.velocity_divisor > 0.0 {
        (speed / g.velocity_divisor).min(g.velocity_bonus_cap)
    } else {
        0.0
    };
    (proximity * g.proximity_weight + velocity_bonus * g.velocity_weight)
        .clamp(0.0, g.max_intensity.max(0.0))
}
