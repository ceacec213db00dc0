//! GPU-ready grass uniform (112 bytes, 16-byte aligned).

use bytemuck::{Pod, Zeroable};
use crate::grass::config::GrassConfig;

/// GPU uniform for the grass draw. Must match `GrassUniforms` in grass.wgsl.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GrassUniforms {
    /// segments, patch_size, blade_width, blade_height
    pub blade_params: [f32; 4],
    // -- 16 bytes --
    pub wind_direction: [f32; 2],
    pub wind_strength: f32,
    pub time: f32,
    // -- 16 bytes --
    pub color_step: [f32; 2],
    pub _pad: [f32; 2],
    // -- 16 bytes --
    pub base_color_dark: [f32; 3],
    pub _pad1: f32,
    pub tip_color_dark: [f32; 3],
    pub _pad2: f32,
    pub base_color_light: [f32; 3],
    pub _pad3: f32,
    pub tip_color_light: [f32; 3],
    pub _pad4: f32,
    // -- 64 bytes --
    // Total: 112 bytes
}

impl GrassUniforms {
    /// Pack the current config plus accumulated simulation time.
    pub fn from_config(config: &GrassConfig, time: f32) -> Self {
        Self {
            blade_params: [
                config.segments as f32,
                config.patch_size,
                config.blade_width,
                config.blade_height,
            ],
            wind_direction: config.wind.direction.to_array(),
            wind_strength: config.wind.strength,
            time,
            color_step: config.colors.color_step,
            _pad: [0.0; 2],
            base_color_dark: config.colors.base_dark,
            _pad1: 0.0,
            tip_color_dark: config.colors.tip_dark,
            _pad2: 0.0,
            base_color_light: config.colors.base_light,
            _pad3: 0.0,
            tip_color_light: config.colors.tip_light,
            _pad4: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniforms_size() {
        assert_eq!(std::mem::size_of::<GrassUniforms>(), 112);
    }

    #[test]
    fn test_uniforms_alignment() {
        assert_eq!(std::mem::size_of::<GrassUniforms>() % 16, 0);
    }

    #[test]
    fn test_bytemuck_cast() {
        let u = GrassUniforms::zeroed();
        let bytes = bytemuck::bytes_of(&u);
        assert_eq!(bytes.len(), 112);
    }

    #[test]
    fn test_from_config() {
        let cfg = GrassConfig::default();
        let u = GrassUniforms::from_config(&cfg, 2.5);
        assert_eq!(u.blade_params[0], cfg.segments as f32);
        assert_eq!(u.blade_params[1], cfg.patch_size);
        assert_eq!(u.time, 2.5);
        assert_eq!(u.wind_strength, cfg.wind.strength);
    }
}
