use bevy::prelude::*;

/// Current and previous pointer position plus a smoothed speed.
///
/// `None` means the pointer is off the canvas; such a pointer is never close
/// to any cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointerTracker {
    current: Option<Vec2>,
    previous: Option<Vec2>,
    speed: f32,
}

/// What the glow step sees of the pointer for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSample {
    /// Pointer position, `None` when off canvas.
    pub position: Option<Vec2>,
    /// Smoothed speed in pixels per reference frame.
    pub speed: f32,
}

impl PointerTracker {
    /// Records a pointer move (viewport pixels).
    pub fn move_to(&mut self, position: Vec2) {
        self.current = Some(position);
    }

    /// Records the pointer leaving the canvas.
    pub fn leave(&mut self) {
        self.current = None;
    }

    /// Latest known position.
    pub fn position(&self) -> Option<Vec2> {
        self.current
    }

    /// Smoothed speed as of the last [`Self::sample`].
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Derives this frame's speed and rolls the previous position forward.
    ///
    /// The raw sample is the distance travelled since the last frame divided
    /// by `dt_scale`, so it reads in pixels per reference frame. It is zero
    /// whenever either end of the step is off canvas, so leaving and
    /// re-entering never registers as a huge jump. `smoothing` is the weight
    /// kept from the previous speed.
    pub fn sample(&mut self, dt_scale: f32, smoothing: f32) -> PointerSample {
        let raw = match (self.current, self.previous) {
            (Some(current), Some(previous)) => current.distance(previous) / dt_scale.max(1e-3),
            _ => 0.0,
        };
        let smoothing = smoothing.clamp(0.0, 1.0);
        self.speed = self.speed * smoothing + raw * (1.0 - smoothing);
        self.previous = self.current;

        PointerSample {
            position: self.current,
            speed: self.speed,
        }
    }
}
