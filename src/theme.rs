//! Light/dark theme and the colors each one paints the backdrop with.
//!
//! The renderer never reads [`Theme`] directly: it receives the resolved
//! [`Palette`] from [`ActivePalette`], which cross-fades between themes after
//! a toggle.

use bevy::color::Mix;
use bevy::prelude::*;

use crate::math;

/// Page theme, toggled at runtime with `T`.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
#[cfg_attr(feature = "native", derive(clap::ValueEnum))]
pub enum Theme {
    /// Near-black navy gradient with cyan light trails.
    #[default]
    Dark,
    /// Off-white gradient with blue light trails.
    Light,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Colors for this theme.
    pub fn palette(self) -> Palette {
        match self {
            Self::Dark => Palette {
                gradient: [
                    Srgba::rgb_u8(0x0B, 0x0F, 0x1A),
                    Srgba::rgb_u8(0x0E, 0x16, 0x24),
                    Srgba::rgb_u8(0x0B, 0x0F, 0x1A),
                ],
                outline: Srgba::new(1.0, 1.0, 1.0, 0.05),
                trail: Srgba::rgb_u8(56, 189, 248),
                trail_alpha: 1.0,
                fill_core: Srgba::rgb_u8(0, 212, 255),
                fill_rim: Srgba::rgb_u8(168, 85, 247),
                bloom_intensity: 0.3,
            },
            Self::Light => Palette {
                gradient: [
                    Srgba::rgb_u8(0xF8, 0xFA, 0xFC),
                    Srgba::rgb_u8(0xF1, 0xF5, 0xF9),
                    Srgba::rgb_u8(0xF8, 0xFA, 0xFC),
                ],
                outline: Srgba::rgba_u8(30, 58, 95, 20),
                trail: Srgba::rgb_u8(37, 99, 235),
                trail_alpha: 0.7,
                fill_core: Srgba::rgb_u8(37, 99, 235),
                fill_rim: Srgba::rgb_u8(124, 58, 237),
                bloom_intensity: 0.0,
            },
        }
    }
}

/// Resolved colors for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct Palette {
    /// Diagonal background gradient stops: top-left, middle, bottom-right.
    pub gradient: [Srgba; 3],
    /// Static hexagon outline color (alpha included).
    pub outline: Srgba,
    /// Light trail base color; alpha comes from the cell intensity.
    pub trail: Srgba,
    /// Multiplier applied to the cell intensity to get the trail alpha.
    pub trail_alpha: f32,
    /// Center color of the radial cell fill.
    pub fill_core: Srgba,
    /// Color of the fill halfway out, fading to transparent at the border.
    pub fill_rim: Srgba,
    /// Camera bloom strength.
    pub bloom_intensity: f32,
}

impl Palette {
    /// Linear blend towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub fn mix(&self, other: &Self, t: f32) -> Self {
        let lerp = |a: f32, b: f32| a + (b - a) * t;
        Self {
            gradient: std::array::from_fn(|i| self.gradient[i].mix(&other.gradient[i], t)),
            outline: self.outline.mix(&other.outline, t),
            trail: self.trail.mix(&other.trail, t),
            trail_alpha: lerp(self.trail_alpha, other.trail_alpha),
            fill_core: self.fill_core.mix(&other.fill_core, t),
            fill_rim: self.fill_rim.mix(&other.fill_rim, t),
            bloom_intensity: lerp(self.bloom_intensity, other.bloom_intensity),
        }
    }
}

/// The palette handed to the renderer, cross-fading after a theme switch.
///
/// Once a fade completes the value stops changing, so systems can rely on
/// change detection to skip work on settled frames.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct ActivePalette {
    target: Theme,
    from: Palette,
    elapsed: f32,
    /// Palette to paint this frame with.
    pub current: Palette,
}

impl ActivePalette {
    /// A palette already settled on `theme`.
    pub fn settled(theme: Theme) -> Self {
        let palette = theme.palette();
        Self {
            target: theme,
            from: palette,
            elapsed: f32::INFINITY,
            current: palette,
        }
    }

    /// Moves the cross-fade forward by `dt` seconds towards `theme`.
    ///
    /// A new target restarts the fade from whatever is currently shown.
    pub fn advance(&mut self, theme: Theme, dt: f32, fade_secs: f32) {
        if theme != self.target {
            self.target = theme;
            self.from = self.current;
            self.elapsed = 0.0;
        }
        if self.elapsed == f32::INFINITY {
            return;
        }
        self.elapsed += dt.max(0.0);
        let t = if fade_secs > 0.0 {
            (self.elapsed / fade_secs).min(1.0)
        } else {
            1.0
        };
        let to = self.target.palette();
        if t >= 1.0 {
            self.from = to;
            self.elapsed = f32::INFINITY;
            self.current = to;
        } else {
            self.current = self.from.mix(&to, math::ease_out_cubic(t));
        }
    }
}

/// Per-plugin configuration for theming.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct ThemeConfig {
    /// Theme shown at startup.
    pub initial: Theme,
    /// Cross-fade duration after a toggle (seconds).
    pub fade_secs: f32,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            initial: Theme::Dark,
            fade_secs: 0.35,
        }
    }
}

/// Theme resource, `T` toggle, and palette cross-fade.
pub struct ThemePlugin(pub ThemeConfig);

impl Plugin for ThemePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Theme>()
            .register_type::<ThemeConfig>()
            .insert_resource(self.0.clone())
            .insert_resource(self.0.initial)
            .insert_resource(ActivePalette::settled(self.0.initial))
            .add_systems(Update, (toggle_theme, blend_palette).chain());
    }
}

fn toggle_theme(keys: Res<ButtonInput<KeyCode>>, mut theme: ResMut<Theme>) {
    if keys.just_pressed(KeyCode::KeyT) {
        *theme = theme.toggled();
        info!("Theme switched to {:?}", *theme);
    }
}

fn blend_palette(
    time: Res<Time>,
    theme: Res<Theme>,
    cfg: Res<ThemeConfig>,
    mut active: ResMut<ActivePalette>,
) {
    let mut next = active.clone();
    next.advance(*theme, time.delta_secs(), cfg.fade_secs);
    active.set_if_neq(next);
}
