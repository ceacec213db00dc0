//! CPU reference of the grass shader program.
//!
//! grass.wgsl and this module implement the same procedural model,
//! operation for operation, with the same integer hash and curve
//! constants. The GPU side exists for throughput; this side exists so
//! placement, bend, and shading are testable as plain functions. Keep
//! the two in lockstep when changing either.
//!
//! The model is stateless per instance: a blade is nothing but a pure
//! function of its index and the current uniforms, so no instance can
//! depend on another instance's result within a frame.

use glam::{Vec2, Vec3};

use crate::grass::config::{ColorSettings, GrassConfig};
use crate::grass::field::FieldNoise;

pub const TAU: f32 = std::f32::consts::TAU;

/// Maximum lean angle in radians at wind strength 1.
pub const LEAN_MAX: f32 = 0.9;
/// Lean floor/span: even the calmest spot of the field leans a little
/// once there is any wind, and the noisiest leans the full amount.
pub const LEAN_FLOOR: f32 = 0.15;
pub const LEAN_SPAN: f32 = 0.85;
/// Per-blade flutter amplitude (radians) and base frequency (Hz-ish).
pub const FLUTTER_AMP: f32 = 0.08;
pub const FLUTTER_FREQ: f32 = 4.0;
/// Field-noise scroll speed in uv units per second of simulation time.
pub const SCROLL_SPEED: f32 = 0.08;
/// World units to field-noise uv.
pub const FIELD_UV_SCALE: f32 = 0.25;
/// How much of the base width is gone at the tip.
pub const TIP_TAPER: f32 = 0.85;

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// PCG integer hash. Matches `hash_u32` in grass.wgsl; all arithmetic
/// wraps, so the result is bit-identical on CPU and GPU.
#[inline]
pub fn hash_u32(x: u32) -> u32 {
    let state = x.wrapping_mul(747796405).wrapping_add(2891336453);
    let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277803737);
    (word >> 22) ^ word
}

/// Top 24 hash bits as an exactly-representable float in `[0, 1)`.
#[inline]
pub fn hash_to_unit(h: u32) -> f32 {
    (h >> 8) as f32 / 16777216.0
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Deterministic per-instance placement derived from the instance index.
///
/// Re-hashing the previous lane chains six independent values out of one
/// index; no entropy beyond the index itself, so placement is
/// reproducible frame to frame and across platforms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BladePlacement {
    /// Offset over the ground plane within `[-patch, patch]^2`.
    pub offset: Vec2,
    /// Facing rotation around Y in `[0, 2PI)`.
    pub facing: f32,
    /// Height multiplier in `[0.75, 1.25]`.
    pub height_jitter: f32,
    /// Color variant selector in `[0, 1)`.
    pub variant: f32,
    /// Flutter frequency lane in `[0, 1)`.
    pub flutter: f32,
}

impl BladePlacement {
    pub fn from_index(instance: u32, patch_size: f32) -> Self {
        let s0 = hash_u32(instance);
        let s1 = hash_u32(s0);
        let s2 = hash_u32(s1);
        let s3 = hash_u32(s2);
        let s4 = hash_u32(s3);
        let s5 = hash_u32(s4);

        Self {
            offset: Vec2::new(
                (hash_to_unit(s0) * 2.0 - 1.0) * patch_size,
                (hash_to_unit(s1) * 2.0 - 1.0) * patch_size,
            ),
            facing: hash_to_unit(s2) * TAU,
            height_jitter: 0.75 + 0.5 * hash_to_unit(s3),
            variant: hash_to_unit(s4),
            flutter: hash_to_unit(s5),
        }
    }
}

// ---------------------------------------------------------------------------
// Bend model
// ---------------------------------------------------------------------------

/// Normalize the wind direction, or zero it out when degenerate.
///
/// The direction's magnitude never scales the bend; only `strength`
/// does.
#[inline]
pub fn wind_direction(direction: Vec2) -> Vec2 {
    let len = direction.length();
    if len > 1e-6 { direction / len } else { Vec2::ZERO }
}

/// Bend angle in radians for one blade at one instant.
///
/// `noise_value` is the field-noise sample in `[0, 1]` at the blade's
/// advected position; `flutter_lane` is the per-blade hash lane. Both
/// terms are gated by `strength`, so zero wind means a perfectly
/// straight blade no matter what the noise says. The flutter sine has
/// no phase offset, so at `time == 0` only the static field lean
/// remains.
#[inline]
pub fn bend_angle(strength: f32, noise_value: f32, flutter_lane: f32, time: f32) -> f32 {
    let lean = strength * LEAN_MAX * (LEAN_FLOOR + LEAN_SPAN * noise_value);
    let flutter =
        strength * FLUTTER_AMP * (time * FLUTTER_FREQ * (0.5 + flutter_lane)).sin();
    lean + flutter
}

/// Quadratic Bezier over the blade spine.
///
/// `p0` is the anchored base at the origin, `p1` the mid control point,
/// `p2` the tip.
#[inline]
pub fn bezier(h: f32, p1: Vec3, p2: Vec3) -> Vec3 {
    2.0 * h * (1.0 - h) * p1 + h * h * p2
}

/// Tangent of the quadratic Bezier at `h`.
#[inline]
pub fn bezier_tangent(h: f32, p1: Vec3, p2: Vec3) -> Vec3 {
    2.0 * (1.0 - h) * p1 + 2.0 * h * (p2 - p1)
}

/// Tip position of a blade of height `height` leaning by `theta` toward
/// `dir` (normalized ground direction).
#[inline]
pub fn bent_tip(height: f32, theta: f32, dir: Vec2) -> Vec3 {
    let (sin_t, cos_t) = theta.sin_cos();
    Vec3::new(
        height * sin_t * dir.x,
        height * cos_t,
        height * sin_t * dir.y,
    )
}

/// Displacement of the spine point at height fraction `h` relative to
/// the straight blade.
///
/// With `p1` on the straight spine, the whole bend collapses to
/// `h^2 * (tip_bent - tip_straight)`: the base stays anchored and the
/// displacement magnitude grows monotonically toward the tip.
#[inline]
pub fn bend_displacement(h: f32, height: f32, theta: f32, dir: Vec2) -> Vec3 {
    let straight = Vec3::new(0.0, height, 0.0);
    h * h * (bent_tip(height, theta, dir) - straight)
}

/// Rotate a vector around the Y axis. Matches `rotate_y` in grass.wgsl.
#[inline]
pub fn rotate_y(v: Vec3, angle: f32) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(v.x * c + v.z * s, v.y, -v.x * s + v.z * c)
}

// ---------------------------------------------------------------------------
// Shading
// ---------------------------------------------------------------------------

/// Ramp the variant value through the `[min, max]` color step.
///
/// Degenerate `min == max` (or inverted ranges) falls back to a hard
/// threshold instead of dividing by zero.
#[inline]
pub fn color_step_blend(variant: f32, step: [f32; 2]) -> f32 {
    let [min, max] = step;
    if max <= min {
        if variant < min { 0.0 } else { 1.0 }
    } else {
        ((variant - min) / (max - min)).clamp(0.0, 1.0)
    }
}

#[inline]
fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> Vec3 {
    Vec3::from(a) + (Vec3::from(b) - Vec3::from(a)) * t
}

/// Final blade color: base-to-tip lerp inside each gradient by height
/// fraction, then a color-step blend between the dark and light
/// gradients by the placement variant. `field_mod` multiplies the
/// result; pass 1.0 when no field texture is bound (neutral default).
pub fn shade(h: f32, variant: f32, colors: &ColorSettings, field_mod: f32) -> Vec3 {
    let sel = color_step_blend(variant, colors.color_step);
    let dark = lerp3(colors.base_dark, colors.tip_dark, h);
    let light = lerp3(colors.base_light, colors.tip_light, h);
    (dark + (light - dark) * sel) * field_mod
}

// ---------------------------------------------------------------------------
// Full per-vertex evaluation
// ---------------------------------------------------------------------------

/// One evaluated blade vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BladeVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
}

/// Field-noise sample for a blade, advected along the wind over time.
///
/// Without a field the bend falls back to the mid value 0.5 and color
/// modulation to 1.0.
pub fn field_sample(field: Option<&FieldNoise>, offset: Vec2, dir: Vec2, time: f32) -> f32 {
    match field {
        Some(f) => {
            let uv = offset * FIELD_UV_SCALE + Vec2::splat(0.5) + dir * (time * SCROLL_SPEED);
            f.sample(uv.x, uv.y)
        }
        None => 0.5,
    }
}

/// Evaluate one vertex of one instance: the CPU twin of the grass.wgsl
/// vertex + fragment stages.
///
/// `vertex_index` addresses the shared [`crate::grass::BladeTopology`]
/// layout: front sheet rows bottom-up two vertices at a time, then the
/// mirrored back sheet. Pure; identical inputs give identical output.
pub fn evaluate_vertex(
    vertex_index: u32,
    instance_index: u32,
    config: &GrassConfig,
    field: Option<&FieldNoise>,
    time: f32,
) -> BladeVertex {
    let segments = config.segments.max(2);
    let sheet = (segments + 1) * 2;
    let back = vertex_index >= sheet;
    let local = vertex_index % sheet;
    let row = local / 2;
    let side = local % 2;
    let h = row as f32 / segments as f32;

    let placement = BladePlacement::from_index(instance_index, config.patch_size);
    let height = config.blade_height * placement.height_jitter;

    let dir = wind_direction(config.wind.direction);
    let n = field_sample(field, placement.offset, dir, time);
    // A degenerate direction cannot bend the blade anywhere.
    let theta = if dir == Vec2::ZERO {
        0.0
    } else {
        bend_angle(config.wind.strength, n, placement.flutter, time)
    };

    // Spine: quadratic Bezier from the anchored base to the bent tip.
    let p2 = bent_tip(height, theta, dir);
    let p1 = Vec3::new(0.0, 0.5 * height, 0.0);
    let spine = bezier(h, p1, p2);

    // Ribbon cross-section, tapered toward the tip and rotated to the
    // blade's facing.
    let taper = 1.0 - TIP_TAPER * h * h;
    let side_x = (side as f32 - 0.5) * config.blade_width * taper;
    let side_axis = rotate_y(Vec3::X, placement.facing);

    let position = Vec3::new(placement.offset.x, 0.0, placement.offset.y)
        + side_axis * side_x
        + spine;

    // Normal from the bent spine tangent; the back sheet faces away.
    let tangent = bezier_tangent(h, p1, p2).normalize();
    let mut normal = side_axis.cross(tangent).normalize();
    if back {
        normal = -normal;
    }

    let field_mod = match field {
        Some(_) => 0.85 + 0.3 * n,
        None => 1.0,
    };
    let color = shade(h, placement.variant, &config.colors, field_mod);

    BladeVertex {
        position,
        normal,
        color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grass::config::WindSettings;

    fn test_config() -> GrassConfig {
        GrassConfig::default()
    }

    #[test]
    fn test_hash_avalanche() {
        // Consecutive indices must land far apart.
        let a = hash_u32(1);
        let b = hash_u32(2);
        assert_ne!(a, b);
        assert!((a ^ b).count_ones() > 4);
    }

    #[test]
    fn test_hash_to_unit_range() {
        for i in 0..10_000 {
            let v = hash_to_unit(hash_u32(i));
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_placement_deterministic() {
        let a = BladePlacement::from_index(1234, 0.75);
        let b = BladePlacement::from_index(1234, 0.75);
        assert_eq!(a, b);
    }

    #[test]
    fn test_placement_within_patch() {
        for i in 0..5000 {
            let p = BladePlacement::from_index(i, 0.5);
            assert!(p.offset.x.abs() <= 0.5);
            assert!(p.offset.y.abs() <= 0.5);
            assert!((0.0..TAU).contains(&p.facing));
            assert!((0.75..=1.25).contains(&p.height_jitter));
        }
    }

    #[test]
    fn test_placement_roughly_uniform() {
        // Quadrant counts of 40k hashed placements stay within 10% of
        // each other.
        let mut quads = [0u32; 4];
        for i in 0..40_000 {
            let p = BladePlacement::from_index(i, 1.0);
            let q = (p.offset.x >= 0.0) as usize * 2 + (p.offset.y >= 0.0) as usize;
            quads[q] += 1;
        }
        for &q in &quads {
            assert!((9000..=11000).contains(&q), "skewed quadrants: {quads:?}");
        }
    }

    #[test]
    fn test_wind_direction_normalizes() {
        let d = wind_direction(Vec2::new(3.0, 4.0));
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert_eq!(wind_direction(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_zero_strength_means_zero_displacement() {
        for noise_value in [0.0, 0.25, 0.5, 1.0] {
            for h in [0.0, 0.3, 0.7, 1.0] {
                let theta = bend_angle(0.0, noise_value, 0.9, 42.0);
                let d = bend_displacement(h, 0.15, theta, Vec2::new(1.0, 0.0));
                assert_eq!(d, Vec3::ZERO);
            }
        }
    }

    #[test]
    fn test_displacement_monotonic_in_height() {
        let dir = Vec2::new(1.0, 0.0);
        let theta = bend_angle(0.7, 0.8, 0.2, 3.1);
        let mut prev = -1.0f32;
        for step in 0..=20 {
            let h = step as f32 / 20.0;
            let mag = bend_displacement(h, 0.2, theta, dir).length();
            assert!(mag >= prev, "displacement shrank between heights");
            prev = mag;
        }
    }

    #[test]
    fn test_base_is_anchored() {
        let d = bend_displacement(0.0, 0.2, 1.0, Vec2::new(0.0, 1.0));
        assert_eq!(d, Vec3::ZERO);
    }

    #[test]
    fn test_flutter_silent_at_time_zero() {
        // At t=0 only the static field lean contributes.
        let static_only = 0.5 * LEAN_MAX * (LEAN_FLOOR + LEAN_SPAN * 0.6);
        let theta = bend_angle(0.5, 0.6, 0.37, 0.0);
        assert!((theta - static_only).abs() < 1e-7);
    }

    #[test]
    fn test_color_step_degenerate() {
        let colors = ColorSettings::default();
        for variant in [0.0, 0.29, 0.3, 0.31, 1.0] {
            let c = shade(1.0, variant, &ColorSettings {
                color_step: [0.3, 0.3],
                ..colors
            }, 1.0);
            assert!(c.is_finite());
            let is_dark = (c - Vec3::from(colors.tip_dark)).length() < 1e-6;
            let is_light = (c - Vec3::from(colors.tip_light)).length() < 1e-6;
            assert!(is_dark || is_light, "degenerate step must pick an endpoint");
        }
    }

    #[test]
    fn test_color_step_ramps() {
        let colors = ColorSettings {
            color_step: [0.2, 0.8],
            ..ColorSettings::default()
        };
        assert_eq!(color_step_blend(0.0, colors.color_step), 0.0);
        assert_eq!(color_step_blend(1.0, colors.color_step), 1.0);
        let mid = color_step_blend(0.5, colors.color_step);
        assert!((mid - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_evaluate_vertex_deterministic() {
        let cfg = test_config();
        let a = evaluate_vertex(5, 777, &cfg, None, 1.25);
        let b = evaluate_vertex(5, 777, &cfg, None, 1.25);
        assert_eq!(a, b);
    }

    #[test]
    fn test_evaluate_vertex_base_on_ground() {
        let cfg = test_config();
        for instance in [0, 9, 31999] {
            let v = evaluate_vertex(0, instance, &cfg, None, 2.0);
            assert!(v.position.y.abs() < 1e-6);
            assert!(v.position.x.abs() <= cfg.patch_size + cfg.blade_width);
            assert!(v.position.z.abs() <= cfg.patch_size + cfg.blade_width);
        }
    }

    #[test]
    fn test_evaluate_vertex_tip_reaches_height() {
        let mut cfg = test_config();
        cfg.wind.strength = 0.0;
        let segments = cfg.segments;
        // Tip row, left vertex of the front sheet.
        let tip_vertex = segments * 2;
        let v = evaluate_vertex(tip_vertex, 123, &cfg, None, 0.0);
        let placement = BladePlacement::from_index(123, cfg.patch_size);
        let expected = cfg.blade_height * placement.height_jitter;
        assert!((v.position.y - expected).abs() < 1e-5);
    }

    #[test]
    fn test_back_sheet_normal_flipped() {
        let cfg = test_config();
        let sheet = (cfg.segments + 1) * 2;
        let front = evaluate_vertex(2, 55, &cfg, None, 0.6);
        let back = evaluate_vertex(2 + sheet, 55, &cfg, None, 0.6);
        assert!((front.position - back.position).length() < 1e-6);
        assert!((front.normal + back.normal).length() < 1e-6);
    }

    #[test]
    fn test_normals_unit_length() {
        let cfg = test_config();
        for vid in 0..(cfg.segments + 1) * 4 {
            let v = evaluate_vertex(vid, 17, &cfg, None, 4.2);
            assert!((v.normal.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_normal_tracks_bend() {
        // A strongly bent blade's tip normal must tilt away from the
        // unbent normal; a stale upright normal is the silent bug the
        // model guards against.
        let mut cfg = test_config();
        cfg.wind = WindSettings {
            strength: 1.5,
            direction: Vec2::new(1.0, 0.0),
        };
        let field = FieldNoise::bake(3, 64);
        let tip_vertex = cfg.segments * 2;
        let bent = evaluate_vertex(tip_vertex, 8, &cfg, Some(&field), 0.0);

        cfg.wind.strength = 0.0;
        let straight = evaluate_vertex(tip_vertex, 8, &cfg, Some(&field), 0.0);

        let drift = bent.normal.dot(straight.normal);
        assert!(drift < 0.999, "normal ignored the bend: cos={drift}");
    }

    #[test]
    fn test_wind_gating_full_pipeline() {
        let mut cfg = test_config();
        cfg.wind.strength = 0.0;
        let field = FieldNoise::bake(9, 64);
        let tip_vertex = cfg.segments * 2;
        for t in [0.0, 1.0, 100.0] {
            let v = evaluate_vertex(tip_vertex, 40, &cfg, Some(&field), t);
            let placement = BladePlacement::from_index(40, cfg.patch_size);
            // Tip sits directly above the blade base: no displacement.
            assert!((v.position.x - placement.offset.x).abs() < cfg.blade_width);
            assert!((v.position.z - placement.offset.y).abs() < cfg.blade_width);
        }
    }

    #[test]
    fn test_time_zero_matches_static_lean() {
        // End-to-end version of scenario: wind 0.3 along +X, t = 0.
        // Evaluation at t=0 equals an evaluation whose flutter term is
        // forced off, i.e. the time-varying term contributes nothing.
        let cfg = test_config();
        let field = FieldNoise::bake(21, 64);
        let placement = BladePlacement::from_index(64, cfg.patch_size);
        let dir = wind_direction(cfg.wind.direction);
        let n = field_sample(Some(&field), placement.offset, dir, 0.0);

        let theta_t0 = bend_angle(cfg.wind.strength, n, placement.flutter, 0.0);
        let lean_only = cfg.wind.strength * LEAN_MAX * (LEAN_FLOOR + LEAN_SPAN * n);
        assert!((theta_t0 - lean_only).abs() < 1e-7);
    }
}
