use bevy::asset::RenderAssetUsages;
use bevy::color::ColorToComponents;
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;

use super::{BackdropConfig, GlowStyle};
use crate::glow::HexGridLayout;
use crate::math;
use crate::theme::Palette;

/// Trails shorter than this (fraction of the perimeter) are not drawn.
const MIN_VISIBLE_SPREAD: f32 = 1e-4;

/// Cells dimmer than this get no fill.
const MIN_FILL_INTENSITY: f32 = 0.01;

/// One light trail polyline, in viewport pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct TrailStroke {
    /// `steps + 1` samples from the entry point outward.
    pub points: Vec<Vec2>,
    /// Stroke color with intensity-scaled alpha.
    pub color: Srgba,
    /// Stroke width (logical pixels).
    pub width: f32,
    /// Halo width around the stroke (logical pixels).
    pub glow_radius: f32,
    /// Cell intensity the stroke was derived from.
    pub intensity: f32,
}

/// Viewport pixels (origin top-left, y down) to 2D world units of a camera
/// centered on the window.
pub fn viewport_to_world(point: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(point.x - viewport.x / 2.0, viewport.y / 2.0 - point.y)
}

/// Samples the perimeter from `entry` over a signed `spread`.
///
/// Positive spreads run clockwise, negative ones counter-clockwise.
pub fn trail_points(vertices: &[Vec2; 6], entry: f32, spread: f32, steps: usize) -> Vec<Vec2> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| math::point_on_perimeter(vertices, entry + spread * i as f32 / steps as f32))
        .collect()
}

/// Both light trails of every glowing cell, in grid order.
pub fn plan_trails(
    grid: &HexGridLayout,
    palette: &Palette,
    cfg: &BackdropConfig,
    steps: usize,
) -> Vec<TrailStroke> {
    let mut strokes = Vec::new();
    for cell in grid.active_cells() {
        let glow = &cell.glow;
        let Some(entry) = glow.entry else {
            continue;
        };
        if glow.intensity <= 0.0 {
            continue;
        }

        let color = palette
            .trail
            .with_alpha((glow.intensity * palette.trail_alpha).clamp(0.0, 1.0));
        let width = cfg.trail_width + glow.intensity * cfg.trail_width_gain;
        let glow_radius = cfg.glow_radius + glow.intensity * cfg.glow_radius_gain;

        for spread in [glow.clockwise, -glow.counter_clockwise] {
            if spread.abs() < MIN_VISIBLE_SPREAD {
                continue;
            }
            strokes.push(TrailStroke {
                points: trail_points(&cell.vertices, entry, spread, steps),
                color,
                width,
                glow_radius,
                intensity: glow.intensity,
            });
        }
    }
    strokes
}

/// One retained gizmo polyline, in world units.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokePass {
    pub points: Vec<Vec2>,
    pub color: LinearRgba,
    /// Line width of this pass alone (logical pixels).
    pub width: f32,
}

/// The halo pass then the core pass of every stroke.
///
/// Halos are as wide as the stroke's glow radius and dimmed by `halo_alpha`;
/// cores keep the stroke width with an HDR-boosted color.
pub fn stroke_passes(strokes: &[TrailStroke], viewport: Vec2, cfg: &BackdropConfig) -> Vec<StrokePass> {
    let mut passes = Vec::with_capacity(strokes.len() * 2);
    for stroke in strokes {
        let points: Vec<Vec2> = stroke
            .points
            .iter()
            .map(|p| viewport_to_world(*p, viewport))
            .collect();
        let halo = stroke
            .color
            .with_alpha(stroke.color.alpha * cfg.halo_alpha);
        passes.push(StrokePass {
            points: points.clone(),
            color: halo.into(),
            width: stroke.glow_radius,
        });
        passes.push(StrokePass {
            points,
            color: hdr_color(stroke.color, stroke.intensity, cfg.hdr_boost),
            width: stroke.width,
        });
    }
    passes
}

/// Outline color of a cell at `intensity`.
///
/// Only [`GlowStyle::Fill`] brightens outlines; trails leave them static.
pub fn outline_color(palette: &Palette, intensity: f32, cfg: &BackdropConfig) -> Srgba {
    match cfg.style {
        GlowStyle::Trails => palette.outline,
        GlowStyle::Fill => palette
            .outline
            .with_alpha((palette.outline.alpha + intensity * cfg.outline_glow_gain).clamp(0.0, 1.0)),
    }
}

/// Radial fill for every glowing cell, in world units; `None` when no cell is
/// bright enough.
///
/// Each cell is a fan of 13 vertices: the center in the core color, a ring
/// halfway to the corners in the rim color, and the corners fully
/// transparent.
pub fn fill_mesh(grid: &HexGridLayout, palette: &Palette, cfg: &BackdropConfig) -> Option<Mesh> {
    let viewport = grid.viewport();
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut colors: Vec<[f32; 4]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for cell in grid.active_cells() {
        let intensity = cell.glow.intensity;
        if intensity <= MIN_FILL_INTENSITY {
            continue;
        }
        let base = u32::try_from(positions.len()).ok()?;
        let center = viewport_to_world(cell.center, viewport);
        let corners = cell.vertices.map(|v| viewport_to_world(v, viewport));

        let core = palette.fill_core.with_alpha((intensity * cfg.fill_core_alpha).clamp(0.0, 1.0));
        let rim = palette.fill_rim.with_alpha((intensity * cfg.fill_rim_alpha).clamp(0.0, 1.0));
        let edge = palette.fill_rim.with_alpha(0.0);

        positions.push(center.extend(0.0).to_array());
        colors.push(LinearRgba::from(core).to_f32_array());
        for corner in corners {
            positions.push(center.lerp(corner, 0.5).extend(0.0).to_array());
            colors.push(LinearRgba::from(rim).to_f32_array());
        }
        for corner in corners {
            positions.push(corner.extend(0.0).to_array());
            colors.push(LinearRgba::from(edge).to_f32_array());
        }

        // Corners run clockwise on screen, so counter-clockwise in world space.
        for i in 0..6u32 {
            let j = (i + 1) % 6;
            let (ring_i, ring_j) = (base + 1 + i, base + 1 + j);
            let (edge_i, edge_j) = (base + 7 + i, base + 7 + j);
            indices.extend([base, ring_i, ring_j]);
            indices.extend([ring_i, edge_i, edge_j]);
            indices.extend([ring_i, edge_j, ring_j]);
        }
    }

    if positions.is_empty() {
        return None;
    }
    let count = positions.len();
    Some(
        Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
            .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, vec![[0.0, 0.0, 1.0]; count])
            .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, vec![[0.5, 0.5]; count])
            .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
            .with_inserted_indices(Indices::U32(indices)),
    )
}

/// Brightens a stroke color past 1.0 so the bloom pass picks it up.
pub fn hdr_color(color: Srgba, intensity: f32, boost: f32) -> LinearRgba {
    let linear = LinearRgba::from(color);
    let gain = 1.0 + intensity.max(0.0) * boost.max(0.0);
    LinearRgba::new(
        linear.red * gain,
        linear.green * gain,
        linear.blue * gain,
        linear.alpha,
    )
}

/// Gradient colors at the top-left, top-right, bottom-right, and bottom-left corners.
///
/// The middle stop sits on the anti-diagonal corners, so interpolating across
/// the quad yields the three-stop diagonal gradient.
pub fn corner_colors(palette: &Palette) -> [Srgba; 4] {
    let [start, middle, end] = palette.gradient;
    [start, middle, end, middle]
}

/// Full-viewport gradient quad centered on the origin.
pub fn backdrop_mesh(viewport: Vec2, palette: &Palette) -> Mesh {
    let half = viewport / 2.0;
    let positions = vec![
        [-half.x, half.y, 0.0],
        [half.x, half.y, 0.0],
        [half.x, -half.y, 0.0],
        [-half.x, -half.y, 0.0],
    ];
    let colors: Vec<[f32; 4]> = corner_colors(palette)
        .iter()
        .map(|c| LinearRgba::from(*c).to_f32_array())
        .collect();
    let normals = vec![[0.0, 0.0, 1.0]; 4];
    let uvs = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    // Split along the top-right/bottom-left diagonal, counter-clockwise.
    let indices = vec![0u16, 3, 1, 1, 3, 2];

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
    .with_inserted_indices(Indices::U16(indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glow::{FrameInput, GlowConfig, PointerSample};
    use crate::theme::Theme;

    const EPS: f32 = 1e-3;

    fn glowing_grid(frames: usize) -> HexGridLayout {
        let cfg = GlowConfig::default();
        let mut grid = HexGridLayout::generate(Vec2::new(800.0, 600.0), 80.0);
        let input = FrameInput {
            pointer: PointerSample {
                position: Some(Vec2::new(400.0, 300.0)),
                speed: 0.0,
            },
            dt_scale: 1.0,
        };
        for _ in 0..frames {
            grid.advance(&input, &cfg);
        }
        grid
    }

    // ── coordinates ─────────────────────────────────────────────────

    #[test]
    fn viewport_corners_map_to_world_corners() {
        let size = Vec2::new(800.0, 600.0);
        assert_eq!(viewport_to_world(Vec2::ZERO, size), Vec2::new(-400.0, 300.0));
        assert_eq!(viewport_to_world(size, size), Vec2::new(400.0, -300.0));
        assert_eq!(viewport_to_world(size / 2.0, size), Vec2::ZERO);
    }

    // ── trail sampling ──────────────────────────────────────────────

    #[test]
    fn trail_has_steps_plus_one_points_on_the_perimeter() {
        let center = Vec2::new(50.0, 50.0);
        let vertices = math::hex_vertices(center, 80.0);
        let points = trail_points(&vertices, 0.9, 0.2, 12);
        assert_eq!(points.len(), 13);
        assert!(points[0].distance(math::point_on_perimeter(&vertices, 0.9)) < EPS);
        assert!(points[12].distance(math::point_on_perimeter(&vertices, 0.1)) < EPS);
        for p in points {
            // On the border: not strictly inside a slightly smaller hexagon.
            assert!(!math::point_in_hexagon(p, center, 79.0));
            assert!(math::point_in_hexagon(p, center, 80.5));
        }
    }

    #[test]
    fn negative_spread_runs_the_other_way() {
        let vertices = math::hex_vertices(Vec2::ZERO, 80.0);
        let cw = trail_points(&vertices, 0.0, 1.0 / 6.0, 4);
        let ccw = trail_points(&vertices, 0.0, -1.0 / 6.0, 4);
        assert!(cw[4].distance(vertices[1]) < EPS);
        assert!(ccw[4].distance(vertices[5]) < EPS);
    }

    // ── planning ────────────────────────────────────────────────────

    #[test]
    fn dormant_grid_has_no_trails() {
        let grid = HexGridLayout::generate(Vec2::new(800.0, 600.0), 80.0);
        let palette = Theme::Dark.palette();
        assert!(plan_trails(&grid, &palette, &BackdropConfig::default(), 12).is_empty());
    }

    #[test]
    fn glowing_cells_get_two_trails_each() {
        let grid = glowing_grid(60);
        let palette = Theme::Dark.palette();
        let cfg = BackdropConfig::default();
        let strokes = plan_trails(&grid, &palette, &cfg, 12);
        let glowing = grid.active_cells().filter(|c| c.glow.entry.is_some()).count();
        assert!(glowing > 0);
        assert_eq!(strokes.len(), glowing * 2);

        for s in &strokes {
            assert_eq!(s.points.len(), 13);
            assert!((s.color.alpha - s.intensity).abs() < 1e-6);
            assert!((s.width - (2.0 + s.intensity)).abs() < 1e-6);
            assert!((s.glow_radius - (6.0 + 8.0 * s.intensity)).abs() < 1e-6);
        }
    }

    #[test]
    fn light_theme_dims_trail_alpha() {
        let grid = glowing_grid(60);
        let palette = Theme::Light.palette();
        let strokes = plan_trails(&grid, &palette, &BackdropConfig::default(), 12);
        for s in &strokes {
            assert!((s.color.alpha - s.intensity * 0.7).abs() < 1e-6);
        }
    }

    #[test]
    fn brighter_cells_get_wider_strokes() {
        let early = plan_trails(&glowing_grid(5), &Theme::Dark.palette(), &BackdropConfig::default(), 12);
        let late = plan_trails(&glowing_grid(120), &Theme::Dark.palette(), &BackdropConfig::default(), 12);
        let widest = |s: &[TrailStroke]| s.iter().map(|t| t.width).fold(0.0, f32::max);
        assert!(widest(&late) > widest(&early));
    }

    // ── stroke passes ───────────────────────────────────────────────

    #[test]
    fn each_pass_keeps_its_own_width() {
        let grid = glowing_grid(60);
        let cfg = BackdropConfig::default();
        let strokes = plan_trails(&grid, &Theme::Dark.palette(), &cfg, 12);
        let passes = stroke_passes(&strokes, grid.viewport(), &cfg);
        assert_eq!(passes.len(), strokes.len() * 2);

        for (stroke, pair) in strokes.iter().zip(passes.chunks(2)) {
            assert_eq!(pair[0].width, stroke.glow_radius);
            assert_eq!(pair[1].width, stroke.width);
            assert!(pair[0].color.alpha < pair[1].color.alpha);
            assert_eq!(pair[1].points[0], viewport_to_world(stroke.points[0], grid.viewport()));
        }
    }

    #[test]
    fn different_intensities_get_different_widths() {
        let grid = glowing_grid(60);
        let cfg = BackdropConfig::default();
        let strokes = plan_trails(&grid, &Theme::Dark.palette(), &cfg, 12);
        let passes = stroke_passes(&strokes, grid.viewport(), &cfg);

        let intensities: Vec<f32> = grid.active_cells().map(|c| c.glow.intensity).collect();
        let dimmest = intensities.iter().copied().fold(f32::MAX, f32::min);
        let brightest = intensities.iter().copied().fold(0.0, f32::max);
        assert!(brightest - dimmest > 0.01, "need two distinct intensities");

        let cores: Vec<f32> = passes.iter().skip(1).step_by(2).map(|p| p.width).collect();
        let halos: Vec<f32> = passes.iter().step_by(2).map(|p| p.width).collect();
        let spread = |w: &[f32]| w.iter().copied().fold(0.0, f32::max) - w.iter().copied().fold(f32::MAX, f32::min);
        assert!((spread(&cores) - (brightest - dimmest) * cfg.trail_width_gain).abs() < 1e-4);
        assert!((spread(&halos) - (brightest - dimmest) * cfg.glow_radius_gain).abs() < 1e-3);
    }

    // ── fill style ──────────────────────────────────────────────────

    #[test]
    fn outlines_brighten_only_in_fill_style() {
        let palette = Theme::Dark.palette();
        let trails = BackdropConfig::default();
        let fill = BackdropConfig {
            style: GlowStyle::Fill,
            ..default()
        };
        assert_eq!(outline_color(&palette, 0.6, &trails), palette.outline);
        assert_eq!(outline_color(&palette, 0.0, &fill), palette.outline);
        let lit = outline_color(&palette, 0.6, &fill);
        assert!((lit.alpha - (0.05 + 0.6 * 0.15)).abs() < 1e-6);
    }

    #[test]
    fn dormant_grid_has_no_fill() {
        let grid = HexGridLayout::generate(Vec2::new(800.0, 600.0), 80.0);
        assert!(fill_mesh(&grid, &Theme::Dark.palette(), &BackdropConfig::default()).is_none());
    }

    #[test]
    fn fill_fans_out_from_each_glowing_cell() {
        let grid = glowing_grid(60);
        let palette = Theme::Dark.palette();
        let cfg = BackdropConfig::default();
        let lit = grid
            .active_cells()
            .filter(|c| c.glow.intensity > MIN_FILL_INTENSITY)
            .count();
        assert!(lit > 0);

        let Some(mesh) = fill_mesh(&grid, &palette, &cfg) else {
            panic!("glowing cells should be filled");
        };
        assert_eq!(mesh.count_vertices(), lit * 13);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(lit * 18 * 3));
    }

    // ── colors ──────────────────────────────────────────────────────

    #[test]
    fn hdr_boost_scales_rgb_only() {
        let c = hdr_color(Srgba::new(0.5, 0.5, 0.5, 0.4), 0.5, 2.0);
        let base = LinearRgba::from(Srgba::new(0.5, 0.5, 0.5, 0.4));
        assert!((c.red - base.red * 2.0).abs() < 1e-6);
        assert!((c.alpha - 0.4).abs() < 1e-6);
    }

    #[test]
    fn gradient_middle_stop_sits_on_the_anti_diagonal() {
        let palette = Theme::Dark.palette();
        let [tl, tr, br, bl] = corner_colors(&palette);
        assert_eq!(tl, palette.gradient[0]);
        assert_eq!(br, palette.gradient[2]);
        assert_eq!(tr, palette.gradient[1]);
        assert_eq!(bl, palette.gradient[1]);
    }

    #[test]
    fn backdrop_mesh_spans_the_viewport() {
        let mesh = backdrop_mesh(Vec2::new(800.0, 600.0), &Theme::Light.palette());
        assert_eq!(mesh.count_vertices(), 4);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(6));
    }
}
