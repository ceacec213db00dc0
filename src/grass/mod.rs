//! Procedural instanced grass system.
//!
//! One blade template ([`BladeTopology`]) is instanced `blade_count`
//! times; the shader derives every blade's placement, bend, and color
//! from its instance index plus the [`GrassUniforms`] for the frame.
//! [`GrassSystem`] owns the parameter surface and tracks which changes
//! force a topology rebuild.

pub mod config;
pub mod field;
pub mod params;
pub mod reference;
pub mod topology;

pub use config::{ColorSettings, GrassConfig, WindSettings};
pub use field::FieldNoise;
pub use params::GrassUniforms;
pub use topology::{BladeTopology, InstanceSet};

use glam::Vec2;

/// What a parameter change costs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rebuild {
    /// Uniform upload only.
    None,
    /// Index buffer and instance count must be regenerated before the
    /// next draw.
    Topology,
}

/// Owns the grass configuration and flags destructive changes.
///
/// A single external controller mutates this between frames; the render
/// loop drains [`GrassSystem::take_rebuild_request`] and performs at
/// most one synchronous rebuild before drawing, keeping the previous
/// buffers renderable until the swap.
pub struct GrassSystem {
    config: GrassConfig,
    rebuild_pending: bool,
}

impl GrassSystem {
    pub fn new(config: GrassConfig) -> Self {
        Self {
            config,
            rebuild_pending: false,
        }
    }

    pub fn config(&self) -> &GrassConfig {
        &self.config
    }

    /// Total instances drawn. Destructive: flags a topology rebuild.
    pub fn set_blade_count(&mut self, count: u32) -> Rebuild {
        if count != self.config.blade_count {
            self.config.blade_count = count;
            self.rebuild_pending = true;
            return Rebuild::Topology;
        }
        Rebuild::None
    }

    /// Blade curve resolution, `>= 2`. Destructive: flags a topology
    /// rebuild.
    pub fn set_segments(&mut self, segments: u32) -> Rebuild {
        if segments != self.config.segments {
            self.config.segments = segments;
            self.rebuild_pending = true;
            return Rebuild::Topology;
        }
        Rebuild::None
    }

    /// Patch half-extent. Uniform-only.
    pub fn set_patch_size(&mut self, patch_size: f32) -> Rebuild {
        self.config.patch_size = patch_size;
        Rebuild::None
    }

    /// Blade base width. Uniform-only.
    pub fn set_blade_width(&mut self, width: f32) -> Rebuild {
        self.config.blade_width = width;
        Rebuild::None
    }

    /// Blade height. Uniform-only.
    pub fn set_blade_height(&mut self, height: f32) -> Rebuild {
        self.config.blade_height = height;
        Rebuild::None
    }

    /// Wind strength in `[0, 2]`. Uniform-only.
    pub fn set_wind_strength(&mut self, strength: f32) -> Rebuild {
        self.config.wind.strength = strength;
        Rebuild::None
    }

    /// Wind direction over the ground plane. Uniform-only.
    pub fn set_wind_direction(&mut self, direction: Vec2) -> Rebuild {
        self.config.wind.direction = direction;
        Rebuild::None
    }

    /// Gradient colors and color step. Uniform-only.
    pub fn set_colors(&mut self, colors: ColorSettings) -> Rebuild {
        self.config.colors = colors;
        Rebuild::None
    }

    /// Drain the pending rebuild request, if any. Multiple destructive
    /// changes between frames coalesce into one rebuild.
    pub fn take_rebuild_request(&mut self) -> Option<(BladeTopology, InstanceSet)> {
        if !self.rebuild_pending {
            return None;
        }
        self.rebuild_pending = false;
        log::info!(
            "grass rebuild: {} blades, {} segments",
            self.config.blade_count,
            self.config.segments
        );
        Some(self.build_geometry())
    }

    /// Build topology and instance set for the current config.
    pub fn build_geometry(&self) -> (BladeTopology, InstanceSet) {
        (
            BladeTopology::generate(self.config.segments),
            InstanceSet::new(self.config.blade_count, self.config.patch_size),
        )
    }

    /// Pack the current config plus simulation time for GPU upload.
    pub fn build_uniforms(&self, time: f32) -> GrassUniforms {
        GrassUniforms::from_config(&self.config, time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_only_changes_skip_rebuild() {
        let mut sys = GrassSystem::new(GrassConfig::default());
        assert_eq!(sys.set_patch_size(2.0), Rebuild::None);
        assert_eq!(sys.set_wind_strength(1.0), Rebuild::None);
        assert_eq!(sys.set_blade_width(0.02), Rebuild::None);
        assert!(sys.take_rebuild_request().is_none());
    }

    #[test]
    fn test_blade_count_change_requests_one_rebuild() {
        let mut sys = GrassSystem::new(GrassConfig {
            blade_count: 16000,
            ..GrassConfig::default()
        });
        assert_eq!(sys.set_blade_count(32000), Rebuild::Topology);

        let (topo, set) = sys.take_rebuild_request().expect("rebuild expected");
        assert_eq!(set.count, 32000);
        assert_eq!(topo.segments, sys.config().segments);
        // Exactly one rebuild per change.
        assert!(sys.take_rebuild_request().is_none());
    }

    #[test]
    fn test_redundant_set_is_free() {
        let mut sys = GrassSystem::new(GrassConfig::default());
        let count = sys.config().blade_count;
        assert_eq!(sys.set_blade_count(count), Rebuild::None);
        assert!(sys.take_rebuild_request().is_none());
    }

    #[test]
    fn test_destructive_changes_coalesce() {
        let mut sys = GrassSystem::new(GrassConfig::default());
        sys.set_blade_count(1000);
        sys.set_segments(6);
        let (topo, set) = sys.take_rebuild_request().expect("rebuild expected");
        assert_eq!(topo.segments, 6);
        assert_eq!(set.count, 1000);
        assert!(sys.take_rebuild_request().is_none());
    }

    #[test]
    fn test_scenario_16000_blades_4_segments() {
        let mut sys = GrassSystem::new(GrassConfig::default());
        sys.set_blade_count(16000);
        sys.set_segments(4);
        sys.set_patch_size(0.5);
        let (topo, set) = sys.take_rebuild_request().expect("rebuild expected");
        assert_eq!(topo.indices.len(), 48);
        assert_eq!(set.count, 16000);
        assert_eq!(set.bounding_radius, 2.0);
    }

    #[test]
    fn test_build_uniforms_reflects_config() {
        let mut sys = GrassSystem::new(GrassConfig::default());
        sys.set_wind_strength(0.9);
        sys.set_wind_direction(Vec2::new(0.0, -1.0));
        let u = sys.build_uniforms(3.0);
        assert_eq!(u.wind_strength, 0.9);
        assert_eq!(u.wind_direction, [0.0, -1.0]);
        assert_eq!(u.time, 3.0);
    }
}
