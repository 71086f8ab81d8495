//! Rendering Adapter: renderer-agnostic city geometry and frame state.
//!
//! # Invariants
//! - Renderers never mutate the scene or viewer state.
//! - Per-frame uniforms derive only from the camera, the light and the aspect.
//! - Geometry is built once per scene; nothing here touches a GPU.

pub mod frame;
pub mod mesh;
mod renderer;
pub mod theme;

pub use frame::{DepthTest, FRAME_PASSES, FrameUniforms, PassKind, PassSpec, aspect_ratio};
pub use mesh::{CityMesh, MeshData, SKYBOX_VERTICES, Vertex};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use theme::{FacadeStyle, Theme};

pub fn crate_info() -> &'static str {
    "skyline-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
