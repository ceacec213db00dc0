//! Grass configuration (the live-tunable parameter surface).
//!
//! `GrassConfig` is a plain value: the render loop reads it, a single
//! external controller mutates it between frames through the typed
//! setters on [`crate::grass::GrassSystem`]. Changing `blade_count` or
//! `segments` is destructive (topology rebuild); everything else is a
//! pure uniform update.

use glam::Vec2;

/// Wind driving the bend model.
#[derive(Clone, Copy, Debug)]
pub struct WindSettings {
    /// Strength in `[0, 2]`. Zero disables all bend displacement.
    pub strength: f32,
    /// Direction over the ground plane. Normalized before use; the
    /// magnitude never feeds into bend amount.
    pub direction: Vec2,
}

impl Default for WindSettings {
    fn default() -> Self {
        Self {
            strength: 0.3,
            direction: Vec2::new(1.0, 0.0),
        }
    }
}

/// Two base-to-tip gradients plus the variant threshold blending them.
#[derive(Clone, Copy, Debug)]
pub struct ColorSettings {
    pub base_dark: [f32; 3],
    pub tip_dark: [f32; 3],
    pub base_light: [f32; 3],
    pub tip_light: [f32; 3],
    /// `[min, max]` ramp over the per-blade variant value: below `min`
    /// fully dark gradient, above `max` fully light, linear between.
    pub color_step: [f32; 2],
}

impl Default for ColorSettings {
    fn default() -> Self {
        // 0x016f22, 0x70cc14, 0x68ad00, 0xd4f400
        Self {
            base_dark: [0.004, 0.435, 0.133],
            tip_dark: [0.439, 0.800, 0.078],
            base_light: [0.408, 0.678, 0.000],
            tip_light: [0.831, 0.957, 0.000],
            color_step: [0.0, 1.0],
        }
    }
}

/// Complete grass parameter surface.
///
/// Numeric ranges are the caller's responsibility (pre-validated input);
/// the renderer applies no clamping beyond the documented invariants.
#[derive(Clone, Copy, Debug)]
pub struct GrassConfig {
    /// Total blade instances in the patch. Destructive to change.
    pub blade_count: u32,
    /// Quads per blade, `>= 2`. Destructive to change.
    pub segments: u32,
    /// Half-extent of the square patch in world units.
    pub patch_size: f32,
    /// Blade width at the base in world units.
    pub blade_width: f32,
    /// Unjittered blade height in world units.
    pub blade_height: f32,
    pub wind: WindSettings,
    pub colors: ColorSettings,
}

impl Default for GrassConfig {
    fn default() -> Self {
        Self {
            blade_count: 32000,
            segments: 2,
            patch_size: 0.75,
            blade_width: 0.01,
            blade_height: 0.15,
            wind: WindSettings::default(),
            colors: ColorSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = GrassConfig::default();
        assert_eq!(cfg.blade_count, 32000);
        assert!(cfg.segments >= 2);
        assert!(cfg.colors.color_step[0] <= cfg.colors.color_step[1]);
    }

    #[test]
    fn test_default_wind_in_range() {
        let wind = WindSettings::default();
        assert!((0.0..=2.0).contains(&wind.strength));
    }
}
