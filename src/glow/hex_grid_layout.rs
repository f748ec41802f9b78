use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use hexx::{Hex, HexLayout, HexOrientation, OffsetHexMode};

use super::cell_glow::CellGlow;
use super::{FrameInput, GlowConfig};
use crate::math;

/// Smallest hexagon circumradius a grid is generated for.
pub const MIN_HEX_SIZE: f32 = 8.0;

/// Upper bound on the number of cells in one grid, margin included.
pub const MAX_CELLS: usize = 250_000;

/// One hexagon of the backdrop.
#[derive(Clone, Debug)]
pub struct HexCell {
    /// Axial coordinate; unique within a grid.
    pub id: Hex,
    /// Center in viewport pixels.
    pub center: Vec2,
    /// Corners, clockwise from the top.
    pub vertices: [Vec2; 6],
    /// Animation state.
    pub glow: CellGlow,
}

/// Pointy-top hexagon tessellation covering a viewport plus a one-cell margin.
///
/// Cells come from odd-row offset coordinates placed by a [`HexLayout`] in
/// viewport pixels (y down), so rows are `1.5 * size` apart and odd rows sit
/// half a cell to the right. Cells are stored row-major from row -1,
/// column -1; the grid is rebuilt from scratch for a new viewport.
#[derive(Clone, Debug, Default)]
pub struct HexGridLayout {
    viewport: Vec2,
    hex_size: f32,
    layout: HexLayout,
    cells: Vec<HexCell>,
    index: HashMap<Hex, usize>,
    /// Sorted indices of cells that are not dormant.
    active: Vec<usize>,
}

impl HexGridLayout {
    /// Builds the grid for a `viewport` of logical pixels.
    ///
    /// Returns an empty grid for non-positive or non-finite inputs, for a
    /// `hex_size` below [`MIN_HEX_SIZE`], and when the grid would hold more
    /// than [`MAX_CELLS`] cells.
    pub fn generate(viewport: Vec2, hex_size: f32) -> Self {
        let empty = Self {
            viewport,
            hex_size,
            ..default()
        };
        let valid = viewport.is_finite()
            && viewport.x > 0.0
            && viewport.y > 0.0
            && hex_size.is_finite()
            && hex_size >= MIN_HEX_SIZE;
        if !valid {
            return empty;
        }

        let layout = HexLayout::pointy().with_hex_size(hex_size);
        let rect = layout.rect_size();
        let spacing = Vec2::new(rect.x, rect.y * 0.75);
        let Some((cols, rows, total)) = span(viewport, spacing) else {
            return empty;
        };

        let mut cells = Vec::with_capacity(total);
        let mut index = HashMap::with_capacity(total);

        for row in -1..=rows {
            for col in -1..=cols {
                let id = Hex::from_offset_coordinates(
                    [col, row],
                    OffsetHexMode::Odd,
                    HexOrientation::Pointy,
                );
                let center = layout.hex_to_world_pos(id);
                index.insert(id, cells.len());
                cells.push(HexCell {
                    id,
                    center,
                    vertices: math::hex_vertices(center, hex_size),
                    glow: CellGlow::default(),
                });
            }
        }

        Self {
            viewport,
            hex_size,
            layout,
            cells,
            index,
            active: Vec::new(),
        }
    }

    /// Viewport size the grid was built for.
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Hexagon circumradius.
    pub fn hex_size(&self) -> f32 {
        self.hex_size
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[HexCell] {
        &self.cells
    }

    /// Number of cells, margin included.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// `true` for a grid built from an empty viewport.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Non-dormant cells in grid order.
    pub fn active_cells(&self) -> impl Iterator<Item = &HexCell> {
        self.active.iter().map(|&i| &self.cells[i])
    }

    /// Number of non-dormant cells.
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Indices of cells whose center may lie within `radius` of `point`.
    ///
    /// Walks the hex range around the cell under `point`. Centers `k` steps
    /// away are at least `1.5 * k * size` from that cell's center, and the
    /// point is at most `size` from it, so `k` steps reach every center
    /// within `radius`.
    pub fn indices_near(&self, point: Vec2, radius: f32) -> Vec<usize> {
        if self.cells.is_empty() || !point.is_finite() {
            return Vec::new();
        }
        let steps = ((radius.max(0.0) + self.hex_size) / (1.5 * self.hex_size)).ceil();
        let reachable = 3.0 * steps * (steps + 1.0) + 1.0;
        if !reachable.is_finite() || reachable >= self.cells.len() as f32 {
            return (0..self.cells.len()).collect();
        }

        self.layout
            .world_pos_to_hex(point)
            .range(steps as u32)
            .filter_map(|hex| self.index.get(&hex).copied())
            .collect()
    }

    /// Steps the glow of every cell that can change this frame.
    ///
    /// Only cells near the pointer and cells already glowing are visited;
    /// every other cell is dormant and out of reach, so stepping it would be
    /// a no-op.
    pub fn advance(&mut self, frame: &FrameInput, cfg: &GlowConfig) {
        let mut candidates = std::mem::take(&mut self.active);
        if let Some(pointer) = frame.pointer.position {
            // point_in_hexagon can reach `hex_size` even below the threshold
            let reach = cfg.glow.threshold(self.hex_size).max(self.hex_size);
            candidates.extend(self.indices_near(pointer, reach));
        }
        candidates.sort_unstable();
        candidates.dedup();

        for &i in &candidates {
            let cell = &mut self.cells[i];
            cell.glow.advance(cell.center, &cell.vertices, frame, cfg);
        }

        candidates.retain(|&i| !self.cells[i].glow.is_dormant());
        self.active = candidates;
    }
}

/// Visible columns and rows (the last of each lies past the right and bottom
/// edges) plus the cell count with the margin, or `None` above [`MAX_CELLS`].
fn span(viewport: Vec2, spacing: Vec2) -> Option<(i32, i32, usize)> {
    let past = |extent: f32, step: f32| {
        let n = (extent / step).floor() + 1.0;
        if n * step > extent { n } else { n + 1.0 }
    };
    let cols = past(viewport.x, spacing.x);
    let rows = past(viewport.y, spacing.y);
    if !(cols.is_finite() && rows.is_finite()) || cols.max(rows) > MAX_CELLS as f32 {
        return None;
    }

    let (cols, rows) = (cols as usize, rows as usize);
    let total = (cols + 2).checked_mul(rows + 2)?;
    (total <= MAX_CELLS).then_some((cols as i32, rows as i32, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glow::PointerSample;

    const EPS: f32 = 1e-3;
    const SQRT_3: f32 = 1.732_050_8;

    fn grid(w: f32, h: f32) -> HexGridLayout {
        HexGridLayout::generate(Vec2::new(w, h), 80.0)
    }

    fn cell_by_id(g: &HexGridLayout, id: Hex) -> Option<&HexCell> {
        g.index.get(&id).map(|&i| &g.cells[i])
    }

    fn offset(col: i32, row: i32) -> Hex {
        Hex::from_offset_coordinates([col, row], OffsetHexMode::Odd, HexOrientation::Pointy)
    }

    fn frame(position: Option<Vec2>) -> FrameInput {
        FrameInput {
            pointer: PointerSample {
                position,
                speed: 0.0,
            },
            dt_scale: 1.0,
        }
    }

    fn extent(g: &HexGridLayout) -> (Vec2, Vec2) {
        g.cells().iter().fold(
            (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
            |(min, max), c| (min.min(c.center), max.max(c.center)),
        )
    }

    /// Viewports for `size`: exact multiples of the cell spacing and a few
    /// that are not.
    fn viewports(size: f32) -> Vec<Vec2> {
        let spacing = Vec2::new(size * SQRT_3, size * 1.5);
        let mut out: Vec<Vec2> = [(1.0, 1.0), (4.0, 3.0), (7.0, 5.0), (12.0, 9.0)]
            .iter()
            .map(|&(k, m)| spacing * Vec2::new(k, m))
            .collect();
        out.extend([
            Vec2::new(800.0, 600.0),
            Vec2::new(1920.0, 1080.0),
            Vec2::new(333.0, 777.0),
            Vec2::new(size * 0.5, size * 0.25),
        ]);
        out
    }

    const SIZES: [f32; 4] = [MIN_HEX_SIZE, 37.5, 80.0, 200.0];

    // ── generation ──────────────────────────────────────────────────

    #[test]
    fn vertices_are_equidistant_for_every_cell() {
        let g = grid(800.0, 600.0);
        for cell in g.cells() {
            for v in cell.vertices {
                assert!((v.distance(cell.center) - 80.0).abs() < EPS);
            }
        }
    }

    #[test]
    fn vertices_match_hexx_corners() {
        let g = grid(640.0, 480.0);
        for cell in g.cells() {
            let corners = g.layout.hex_corners(cell.id);
            for v in cell.vertices {
                assert!(corners.iter().any(|c| c.distance(v) < EPS));
            }
            assert!((cell.vertices[0] - cell.center + Vec2::new(0.0, 80.0)).length() < EPS);
        }
    }

    #[test]
    fn perimeters_are_uniform() {
        let g = grid(640.0, 480.0);
        for cell in g.cells() {
            let perimeter: f32 = (0..6)
                .map(|i| cell.vertices[i].distance(cell.vertices[(i + 1) % 6]))
                .sum();
            assert!((perimeter - 480.0).abs() < 1e-2);
        }
    }

    #[test]
    fn ids_are_unique() {
        let g = grid(1024.0, 768.0);
        assert_eq!(g.index.len(), g.len());
    }

    #[test]
    fn grid_covers_viewport_with_margin() {
        let g = grid(800.0, 600.0);
        let (min, max) = extent(&g);
        assert!(min.x < 0.0 && min.y < 0.0);
        assert!(max.x > 800.0 && max.y > 600.0);
    }

    #[test]
    fn margin_holds_for_every_size_and_viewport() {
        for size in SIZES {
            for viewport in viewports(size) {
                let g = HexGridLayout::generate(viewport, size);
                assert!(!g.is_empty(), "{size} {viewport:?}");
                let (min, max) = extent(&g);
                assert!(min.x < 0.0 && min.y < 0.0, "{size} {viewport:?}");
                assert!(
                    max.x > viewport.x && max.y > viewport.y,
                    "{size} {viewport:?}: last centers at {max:?}"
                );
            }
        }
    }

    #[test]
    fn bottom_and_right_edges_are_covered() {
        for size in SIZES {
            for viewport in viewports(size) {
                let g = HexGridLayout::generate(viewport, size);
                let step = size / 3.0;
                let along = |length: f32| {
                    let n = (length / step).ceil() as usize;
                    (0..=n).map(move |i| (i as f32 * step).min(length))
                };
                let bottom = along(viewport.x).map(|x| Vec2::new(x, viewport.y));
                let right = along(viewport.y).map(|y| Vec2::new(viewport.x, y));
                for p in bottom.chain(right).chain([Vec2::ZERO]) {
                    let hex = g.layout.world_pos_to_hex(p);
                    let cell = cell_by_id(&g, hex);
                    assert!(cell.is_some(), "{size} {viewport:?}: {p:?} not covered");
                    if let Some(cell) = cell {
                        assert!(math::point_in_hexagon(p, cell.center, size + EPS));
                    }
                }
            }
        }
    }

    #[test]
    fn every_viewport_point_is_inside_some_cell() {
        let g = grid(500.0, 400.0);
        for x in (0..=500).step_by(23) {
            for y in (0..=400).step_by(19) {
                let p = Vec2::new(x as f32, y as f32);
                let covered = g
                    .cells()
                    .iter()
                    .any(|c| math::point_in_hexagon(p, c.center, 80.0 + EPS));
                assert!(covered, "{p:?} not covered");
            }
        }
    }

    #[test]
    fn axial_neighbours_touch() {
        let g = grid(800.0, 600.0);
        let touching = 80.0 * SQRT_3;
        let mut checked = 0;
        for cell in g.cells() {
            for neighbour in cell.id.all_neighbors() {
                if let Some(other) = cell_by_id(&g, neighbour) {
                    assert!(
                        (cell.center.distance(other.center) - touching).abs() < EPS,
                        "{:?} and {:?} are not adjacent",
                        cell.id,
                        neighbour
                    );
                    checked += 1;
                }
            }
        }
        assert!(checked > g.len());
    }

    #[test]
    fn odd_rows_are_shifted_by_half_a_cell() {
        let g = grid(800.0, 600.0);
        let even = cell_by_id(&g, offset(0, 0)).map(|c| c.center);
        let odd = cell_by_id(&g, offset(0, 1)).map(|c| c.center);
        let (Some(even), Some(odd)) = (even, odd) else {
            panic!("origin cells missing");
        };
        assert!(even.length() < EPS);
        assert!((odd.x - even.x - 40.0 * SQRT_3).abs() < EPS);
        assert!((odd.y - even.y - 120.0).abs() < EPS);
    }

    #[test]
    fn empty_viewport_yields_empty_grid() {
        assert!(grid(0.0, 600.0).is_empty());
        assert!(HexGridLayout::generate(Vec2::new(800.0, 600.0), 0.0).is_empty());
        assert!(grid(f32::NAN, 10.0).is_empty());
    }

    #[test]
    fn tiny_hex_sizes_yield_empty_grid() {
        let viewport = Vec2::new(1920.0, 1080.0);
        for size in [1e-30, 0.001, 1.0, MIN_HEX_SIZE - 0.01] {
            let g = HexGridLayout::generate(viewport, size);
            assert!(g.is_empty(), "size {size}");
            assert_eq!(g.hex_size(), size);
            assert!(g.indices_near(Vec2::new(10.0, 10.0), 96.0).is_empty());
        }
    }

    #[test]
    fn oversized_grids_are_refused() {
        assert!(HexGridLayout::generate(Vec2::new(1e9, 1e9), 80.0).is_empty());
        assert!(HexGridLayout::generate(Vec2::new(f32::MAX, 10.0), 80.0).is_empty());
        assert!(HexGridLayout::generate(Vec2::new(1e7, 1e7), MIN_HEX_SIZE).is_empty());
    }

    #[test]
    fn smallest_size_fits_a_large_screen() {
        let g = HexGridLayout::generate(Vec2::new(3840.0, 2160.0), MIN_HEX_SIZE);
        assert!(!g.is_empty());
        assert!(g.len() <= MAX_CELLS);
    }

    #[test]
    fn resize_grows_cell_count_and_starts_dormant() {
        let mut small = grid(800.0, 600.0);
        small.advance(&frame(Some(Vec2::new(400.0, 300.0))), &GlowConfig::default());
        assert!(small.active_len() > 0);

        let large = grid(1600.0, 1200.0);
        assert!(large.len() > small.len());
        assert!(large.cells().iter().all(|c| c.glow == CellGlow::default()));
        assert_eq!(large.active_len(), 0);

        let mut previous = 0;
        for scale in 1..6 {
            let n = grid(320.0 * scale as f32, 240.0 * scale as f32).len();
            assert!(n > previous);
            previous = n;
        }
    }

    // ── spatial index ───────────────────────────────────────────────

    #[test]
    fn near_query_contains_every_close_cell() {
        for size in SIZES {
            let g = HexGridLayout::generate(Vec2::new(900.0, 700.0), size);
            let radius = size * 1.2;
            for (px, py) in [(0.0, 0.0), (450.0, 350.0), (899.0, 10.0), (37.0, 690.0), (-50.0, -50.0)] {
                let p = Vec2::new(px, py);
                let near = g.indices_near(p, radius);
                for (i, cell) in g.cells().iter().enumerate() {
                    if cell.center.distance(p) < radius {
                        assert!(near.contains(&i), "cell {:?} missed for {p:?}", cell.id);
                    }
                }
            }
        }
    }

    #[test]
    fn near_query_far_outside_is_empty() {
        let g = grid(800.0, 600.0);
        assert!(g.indices_near(Vec2::new(-5_000.0, -5_000.0), 96.0).is_empty());
        assert!(g.indices_near(Vec2::new(9_000.0, 300.0), 96.0).is_empty());
    }

    #[test]
    fn huge_query_radius_returns_every_cell() {
        let g = grid(800.0, 600.0);
        assert_eq!(g.indices_near(Vec2::new(400.0, 300.0), 1e6).len(), g.len());
        assert_eq!(g.indices_near(Vec2::ZERO, f32::INFINITY).len(), g.len());
    }

    #[test]
    fn indexed_advance_matches_full_scan() {
        let cfg = GlowConfig::default();
        let mut indexed = grid(800.0, 600.0);
        let mut full = indexed.clone();
        let path: Vec<Option<Vec2>> = (0..240)
            .map(|i| (i % 80 < 60).then(|| Vec2::new(i as f32 * 3.5, 300.0 + (i as f32 * 0.1).sin() * 120.0)))
            .collect();

        for position in path {
            let input = frame(position);
            indexed.advance(&input, &cfg);
            for cell in &mut full.cells {
                cell.glow.advance(cell.center, &cell.vertices, &input, &cfg);
            }
        }

        for (a, b) in indexed.cells().iter().zip(full.cells()) {
            assert_eq!(a.glow, b.glow, "cell {:?} diverged", a.id);
        }
    }

    #[test]
    fn active_cells_are_in_grid_order() {
        let cfg = GlowConfig::default();
        let mut g = grid(800.0, 600.0);
        g.advance(&frame(Some(Vec2::new(200.0, 200.0))), &cfg);
        g.advance(&frame(Some(Vec2::new(600.0, 400.0))), &cfg);
        let ids: Vec<usize> = g.active.clone();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
        assert!(ids.len() >= 2, "both pointer spots should glow");
    }

    #[test]
    fn pointer_leaving_lets_every_cell_fall_dormant() {
        let cfg = GlowConfig::default();
        let mut g = grid(800.0, 600.0);
        for _ in 0..120 {
            g.advance(&frame(Some(Vec2::new(400.0, 300.0))), &cfg);
        }
        assert!(g.active_len() > 0);
        for _ in 0..600 {
            g.advance(&frame(None), &cfg);
        }
        assert_eq!(g.active_len(), 0);
        assert!(g.cells().iter().all(|c| c.glow.is_dormant()));
    }
}
