//! wgpu render backend for the city viewer.
//!
//! Draws the ground, the boundary outline and the buildings with one lit
//! program, then the skybox with a cube-map program.
//!
//! # Invariants
//! - The renderer never mutates scene or viewer state.
//! - GPU resources are created once per scene and released on drop.
//! - Shader or pipeline validation errors at startup are fatal; per-frame
//!   errors are reported, not raised.

mod error;
mod gpu;
pub mod shaders;
mod texture;

pub use error::RenderError;
pub use gpu::{CityRenderer, SceneUpload};
pub use shaders::ShaderSources;
