//! GPU buffer wrappers

pub mod camera_buffer;

pub use camera_buffer::{CameraBuffer, CameraUniform};
