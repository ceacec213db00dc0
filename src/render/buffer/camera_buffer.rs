//! GPU uniform buffer for camera data

use bytemuck::{Pod, Zeroable};
use crate::core::camera::Camera;

/// Camera uniform data for GPU (must match `Camera` in the shaders).
/// WGSL vec3 has 16-byte alignment, so padding is explicit.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    /// View-projection matrix (64 bytes, offset 0)
    pub view_proj: [[f32; 4]; 4],
    /// Camera position in world space (12 bytes, offset 64)
    pub position: [f32; 3],
    /// Padding after position for vec3 alignment (offset 76)
    pub _pos_pad: f32,
    /// Near clip plane (offset 80)
    pub near: f32,
    /// Far clip plane (offset 84)
    pub far: f32,
    /// Final padding to 96 bytes
    pub _pad: [f32; 2],
}

impl CameraUniform {
    /// Create uniform data from camera
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            position: camera.position.to_array(),
            _pos_pad: 0.0,
            near: camera.near,
            far: camera.far,
            _pad: [0.0; 2],
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: [[0.0; 4]; 4],
            position: [0.0; 3],
            _pos_pad: 0.0,
            near: 0.01,
            far: 1000.0,
            _pad: [0.0; 2],
        }
    }
}

/// GPU buffer for camera uniform
pub struct CameraBuffer {
    buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl CameraBuffer {
    /// Create new camera buffer
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera_uniform"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            bind_group_layout,
            bind_group,
        }
    }

    /// Update buffer with camera data
    pub fn update(&self, queue: &wgpu::Queue, camera: &Camera) {
        let uniform = CameraUniform::from_camera(camera);
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&uniform));
    }

    /// Get bind group layout
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Get bind group
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_uniform_size() {
        // Must match the WGSL struct layout exactly
        assert_eq!(std::mem::size_of::<CameraUniform>(), 96);
    }

    #[test]
    fn test_uniform_alignment() {
        assert_eq!(std::mem::size_of::<CameraUniform>() % 16, 0);
    }

    #[test]
    fn test_from_camera() {
        let camera = Camera::new(Vec3::new(1.0, 0.75, 1.0), 60.0, 16.0 / 9.0);
        let uniform = CameraUniform::from_camera(&camera);
        assert_eq!(uniform.near, 0.01);
        assert_eq!(uniform.far, 1000.0);
        assert_eq!(uniform.position, camera.position.to_array());
    }
}
