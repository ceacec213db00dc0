//! Swale - procedural instanced grass renderer
//!
//! One small blade template is drawn tens of thousands of times with GPU
//! instancing; every blade is placed, bent, and colored on the GPU from
//! nothing but its instance index plus the current wind/time uniforms.
//! `grass::reference` is a CPU mirror of the shader program so the
//! procedural model is testable off-GPU.

pub mod core;
pub mod grass;
pub mod render;
