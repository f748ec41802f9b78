//! Pure geometry and easing helpers.
//!
//! All functions in this module are free of Bevy ECS dependencies and operate
//! on plain numeric / `Vec2` inputs, making them straightforward to unit-test.
//! Hexagons are pointy-top, in viewport pixels with y pointing down, so
//! increasing perimeter offsets run clockwise on screen.

use bevy::prelude::Vec2;
use hexx::{HexLayout, VertexDirection};

/// Half-width of a pointy-top hexagon relative to its circumradius (`sqrt(3) / 2`).
pub const HALF_WIDTH_FACTOR: f32 = 0.866_025_4;

/// Corner offsets of a pointy-top hexagon of circumradius `size`, clockwise
/// on screen from the top corner.
///
/// `hexx` numbers corners from the upper-right one, so its list is rotated
/// to start at [`VertexDirection::POINTY_TOP`].
pub fn pointy_corners(size: f32) -> [Vec2; 6] {
    let corners = HexLayout::pointy()
        .with_hex_size(size)
        .center_aligned_hex_corners();
    let top = usize::from(VertexDirection::POINTY_TOP.index());
    std::array::from_fn(|i| corners[(i + top) % 6])
}

/// The six corners of a regular pointy-top hexagon.
///
/// Corner 0 is straight above `center`; the rest follow at 60° steps.
pub fn hex_vertices(center: Vec2, size: f32) -> [Vec2; 6] {
    pointy_corners(size).map(|c| center + c)
}

/// Whether `point` lies inside (or on the border of) the pointy-top hexagon
/// with the given `center` and circumradius `size`.
///
/// Rejects anything outside the axis-aligned bounding box first, then
/// evaluates the slanted-edge inequality on the folded quadrant.
pub fn point_in_hexagon(point: Vec2, center: Vec2, size: f32) -> bool {
    let dx = (point.x - center.x).abs();
    let dy = (point.y - center.y).abs();
    let half_width = size * HALF_WIDTH_FACTOR;
    if dx > half_width || dy > size {
        return false;
    }
    half_width * size - size * dx / 2.0 - half_width * dy >= 0.0
}

/// Normalized perimeter offset in `[0, 1)` of the perimeter point closest to `point`.
///
/// Each edge is tried in order with a clamped projection; the first edge
/// reaching the minimum distance wins.
pub fn nearest_edge_offset(point: Vec2, vertices: &[Vec2; 6]) -> f32 {
    let mut min_dist = f32::INFINITY;
    let mut closest = 0.0;

    for i in 0..6 {
        let a = vertices[i];
        let b = vertices[(i + 1) % 6];
        let edge = b - a;
        let len_sq = edge.length_squared();
        let t = if len_sq > 0.0 {
            ((point - a).dot(edge) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let dist = point.distance(a + edge * t);
        if dist < min_dist {
            min_dist = dist;
            closest = (i as f32 + t) / 6.0;
        }
    }

    wrap_unit(closest)
}

/// Point on the hexagon perimeter at the normalized `offset`.
///
/// Offsets wrap: `offset + 1` is the same point, negative values count back
/// from vertex 0.
pub fn point_on_perimeter(vertices: &[Vec2; 6], offset: f32) -> Vec2 {
    let side = vertices[0].distance(vertices[1]);
    if side <= 0.0 {
        return vertices[0];
    }
    let target = wrap_unit(offset) * side * 6.0;

    let mut accumulated = 0.0;
    for i in 0..6 {
        if accumulated + side >= target {
            let t = (target - accumulated) / side;
            return vertices[i].lerp(vertices[(i + 1) % 6], t);
        }
        accumulated += side;
    }
    vertices[0]
}

/// Wraps any finite value into `[0, 1)`.
pub fn wrap_unit(value: f32) -> f32 {
    let wrapped = value.rem_euclid(1.0);
    // rem_euclid rounds tiny negatives up to exactly 1.0
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

/// Blend factor for an exponential approach at `rate` per reference frame,
/// stretched over `dt_scale` reference frames.
///
/// Equals `rate` when `dt_scale == 1`, stays in `[0, 1]` for any frame length,
/// and composes: two half frames blend exactly like one full frame.
pub fn frame_blend(rate: f32, dt_scale: f32) -> f32 {
    let rate = rate.clamp(0.0, 1.0);
    1.0 - (1.0 - rate).powf(dt_scale.max(0.0))
}

/// Cubic ease-out curve: fast start, gentle deceleration.
///
/// `t` should be in `[0, 1]`. Returns `1 - (1 - t)^3`.
pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}
