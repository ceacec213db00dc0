//! Baked field noise shared by the shader and the CPU reference.
//!
//! The bend model varies wind effect across the patch by sampling one
//! smooth low-frequency scalar field. The field is baked once from
//! multi-octave Perlin noise into a square map; the GPU reads it as a
//! repeat-wrapped texture and the CPU reference samples the same map with
//! the matching bilinear wrap, so both sides see the same terrain of wind.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

/// Square scalar field in `[0, 1]`, wrap-around bilinear sampled.
#[derive(Clone, Debug)]
pub struct FieldNoise {
    size: u32,
    values: Vec<f32>,
}

impl FieldNoise {
    /// Bake a `size * size` map from `Fbm<Perlin>` noise.
    pub fn bake(seed: u32, size: u32) -> Self {
        let fbm = Fbm::<Perlin>::new(seed)
            .set_octaves(4)
            .set_frequency(3.0);

        let mut values = Vec::with_capacity((size * size) as usize);
        for y in 0..size {
            for x in 0..size {
                let nx = x as f64 / size as f64;
                let ny = y as f64 / size as f64;
                // Fbm output is roughly [-1, 1]; remap to [0, 1].
                let v = fbm.get([nx, ny]) as f32 * 0.5 + 0.5;
                values.push(v.clamp(0.0, 1.0));
            }
        }

        Self { size, values }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    fn texel(&self, x: i64, y: i64) -> f32 {
        let s = self.size as i64;
        let xi = x.rem_euclid(s) as usize;
        let yi = y.rem_euclid(s) as usize;
        self.values[yi * self.size as usize + xi]
    }

    /// Bilinear sample at texture coordinates, wrapping in both axes.
    ///
    /// Referentially transparent: identical `(u, v)` always yields the
    /// identical value, and nearby coordinates vary smoothly.
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        let x = u * self.size as f32 - 0.5;
        let y = v * self.size as f32 - 0.5;

        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;

        let x0 = x0 as i64;
        let y0 = y0 as i64;

        let t00 = self.texel(x0, y0);
        let t10 = self.texel(x0 + 1, y0);
        let t01 = self.texel(x0, y0 + 1);
        let t11 = self.texel(x0 + 1, y0 + 1);

        let a = t00 + (t10 - t00) * fx;
        let b = t01 + (t11 - t01) * fx;
        a + (b - a) * fy
    }

    /// Map data as `Rgba8Unorm` texels for GPU upload (value replicated
    /// into RGB, alpha opaque).
    pub fn texel_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.values.len() * 4);
        for &v in &self.values {
            let b = (v * 255.0).round() as u8;
            bytes.extend_from_slice(&[b, b, b, 255]);
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_in_range() {
        let field = FieldNoise::bake(7, 64);
        assert!(field.values.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_sample_deterministic() {
        let field = FieldNoise::bake(7, 64);
        let a = field.sample(0.31, 0.77);
        let b = field.sample(0.31, 0.77);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_bake_deterministic_for_seed() {
        let a = FieldNoise::bake(42, 32);
        let b = FieldNoise::bake(42, 32);
        assert_eq!(a.values, b.values);
    }

    #[test]
    fn test_sample_wraps() {
        let field = FieldNoise::bake(3, 32);
        let a = field.sample(0.25, 0.5);
        let b = field.sample(1.25, 0.5);
        let c = field.sample(-0.75, 2.5);
        assert!((a - b).abs() < 1e-6);
        assert!((a - c).abs() < 1e-5);
    }

    #[test]
    fn test_sample_continuity() {
        // Neighbouring samples must not jump; a tear here shows up as
        // neighbouring blades bending in unrelated directions.
        let field = FieldNoise::bake(11, 128);
        let step = 1.0 / 512.0;
        let mut u = 0.0f32;
        while u < 1.0 {
            let d = (field.sample(u + step, 0.4) - field.sample(u, 0.4)).abs();
            assert!(d < 0.1, "field noise discontinuity at u={u}: {d}");
            u += step;
        }
    }

    #[test]
    fn test_texel_bytes_layout() {
        let field = FieldNoise::bake(1, 16);
        let bytes = field.texel_bytes();
        assert_eq!(bytes.len(), 16 * 16 * 4);
        assert!(bytes.chunks(4).all(|c| c[3] == 255));
    }
}
