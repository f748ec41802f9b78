use bevy::prelude::*;

/// Marker for the 2D camera that renders the backdrop.
#[derive(Component)]
pub struct BackdropCamera;

/// Marker for the full-viewport gradient quad.
#[derive(Component)]
pub struct GradientQuad;

/// Marker for the mesh holding every glowing cell's radial fill.
#[derive(Component)]
pub struct CellFill;

/// Marker for a retained gizmo entity owned by [`StrokePool`].
#[derive(Component)]
pub struct TrailSlot;

/// Static hexagon outlines.
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct OutlineGizmos;

/// One retained trail gizmo: the entity carrying the line config and the
/// asset holding its polyline.
pub struct StrokeSlot {
    pub entity: Entity,
    pub handle: Handle<GizmoAsset>,
}

/// Retained gizmo entities reused frame to frame, one per drawn stroke.
///
/// Grows to the busiest frame seen; idle slots are left empty.
#[derive(Resource, Default)]
pub struct StrokePool {
    pub slots: Vec<StrokeSlot>,
}
