//! Blade template topology.
//!
//! Every grass instance shares one index buffer describing a two-sided
//! ribbon of `segments` stacked quads. There is no vertex buffer at all;
//! the vertex shader derives each vertex's row and side from its index.
//! The back face reuses a mirrored vertex range with reversed winding so
//! the blade renders double-sided without disabling backface culling.

/// Shared per-blade index topology.
///
/// Vertex layout: `(segments + 1) * 2` vertices for the front sheet
/// (two per row, base to tip), followed by the same count again for the
/// back sheet. Total `(segments + 1) * 4`.
#[derive(Clone, Debug)]
pub struct BladeTopology {
    pub segments: u32,
    pub vertex_count: u32,
    pub indices: Vec<u32>,
}

impl BladeTopology {
    /// Generate the index topology for a blade with `segments` quads.
    ///
    /// Pure and total for `segments >= 2`; emits `segments * 12` indices.
    /// Front-face triangles wind counter-clockwise, back-face triangles
    /// clockwise over the mirrored vertex range.
    pub fn generate(segments: u32) -> Self {
        debug_assert!(segments >= 2, "blade needs at least 2 segments");

        let sheet_vertices = (segments + 1) * 2;
        let vertex_count = sheet_vertices * 2;
        let mut indices = Vec::with_capacity(segments as usize * 12);

        for i in 0..segments {
            let vi = i * 2;

            // Front face (counter-clockwise)
            indices.push(vi);
            indices.push(vi + 1);
            indices.push(vi + 2);
            indices.push(vi + 2);
            indices.push(vi + 1);
            indices.push(vi + 3);

            // Back face (clockwise over the mirrored sheet)
            let fi = sheet_vertices + vi;
            indices.push(fi + 2);
            indices.push(fi + 1);
            indices.push(fi);
            indices.push(fi + 3);
            indices.push(fi + 1);
            indices.push(fi + 2);
        }

        Self {
            segments,
            vertex_count,
            indices,
        }
    }

    /// Index buffer size in bytes.
    pub fn index_bytes(&self) -> u64 {
        (self.indices.len() * std::mem::size_of::<u32>()) as u64
    }
}

/// Instance count plus the bounding volume covering the whole patch.
///
/// The radius stays ahead of the patch (`1 + 2 * patch_size`) so the one
/// instanced draw is never frustum-culled away as the patch grows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InstanceSet {
    pub count: u32,
    pub bounding_radius: f32,
}

impl InstanceSet {
    pub fn new(count: u32, patch_size: f32) -> Self {
        Self {
            count,
            bounding_radius: 1.0 + 2.0 * patch_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_count() {
        for segments in 2..=10 {
            let topo = BladeTopology::generate(segments);
            assert_eq!(topo.indices.len(), segments as usize * 12);
            assert_eq!(topo.vertex_count, (segments + 1) * 4);
        }
    }

    #[test]
    fn test_indices_in_bounds() {
        for segments in [2, 4, 7, 10] {
            let topo = BladeTopology::generate(segments);
            assert!(topo.indices.iter().all(|&i| i < topo.vertex_count));
        }
    }

    #[test]
    fn test_back_face_winding_reversed() {
        let topo = BladeTopology::generate(3);
        let half = topo.vertex_count / 2;
        for seg in 0..3usize {
            let front = &topo.indices[seg * 12..seg * 12 + 6];
            let back = &topo.indices[seg * 12 + 6..seg * 12 + 12];
            // First back triangle is the first front triangle reversed,
            // shifted onto the mirrored sheet.
            let expected: Vec<u32> = front[0..3].iter().rev().map(|&i| i + half).collect();
            assert_eq!(&back[0..3], expected.as_slice());
        }
    }

    #[test]
    fn test_four_segments_has_48_indices() {
        // 2 triangle pairs * 2 faces * 3 indices per triangle per segment
        let topo = BladeTopology::generate(4);
        assert_eq!(topo.indices.len(), 48);
    }

    #[test]
    fn test_deterministic() {
        let a = BladeTopology::generate(5);
        let b = BladeTopology::generate(5);
        assert_eq!(a.indices, b.indices);
    }

    #[test]
    fn test_instance_set_radius_covers_patch() {
        let set = InstanceSet::new(16000, 0.5);
        assert_eq!(set.count, 16000);
        assert!(set.bounding_radius >= 1.0 + 2.0 * 0.5);
    }
}
