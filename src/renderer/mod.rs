//! WebGPU sprite renderer

pub mod pipeline;
pub mod texture;
pub mod vertex;

pub use pipeline::SpriteRenderState;
