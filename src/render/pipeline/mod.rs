//! Render pipelines

pub mod grass;
pub mod ground;

pub use grass::GrassPipeline;
pub use ground::GroundPipeline;
