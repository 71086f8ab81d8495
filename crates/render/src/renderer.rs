use crate::frame::{FrameUniforms, aspect_ratio};
use skyline_kernel::{Scene, ViewerState};
use std::fmt::Write;

/// Viewer state plus the output size it is rendered at.
#[derive(Debug, Clone, Copy)]
pub struct RenderView<'a> {
    pub viewer: &'a ViewerState,
    pub width: u32,
    pub height: u32,
}

impl<'a> RenderView<'a> {
    pub fn new(viewer: &'a ViewerState, width: u32, height: u32) -> Self {
        Self {
            viewer,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f32 {
        aspect_ratio(self.width, self.height)
    }

    pub fn uniforms(&self) -> FrameUniforms {
        FrameUniforms::compute(&self.viewer.camera, &self.viewer.light, self.aspect())
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and viewer state, then produces output. It
/// never mutates either; state changes only through viewer commands.
pub trait Renderer {
    type Output;

    fn render(&self, scene: &Scene, view: &RenderView<'_>) -> Self::Output;
}

/// Human-readable dump of what a frame would draw.
///
/// Used by the headless CLI and in tests; lists at most `max_buildings`
/// buildings.
#[derive(Debug)]
pub struct DebugTextRenderer {
    pub max_buildings: usize,
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self { max_buildings: 8 }
    }
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView<'_>) -> String {
        let camera = &view.viewer.camera;
        let light = &view.viewer.light;
        let frame = view.uniforms();
        let mut out = String::new();

        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "=== City (extent={}, buildings={}) ===",
            scene.plane.extent,
            scene.building_count()
        );
        let p = camera.position();
        let f = camera.forward();
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) forward=({:.3}, {:.3}, {:.3}) aspect={:.3}",
            p.x,
            p.y,
            p.z,
            f.x,
            f.y,
            f.z,
            view.aspect()
        );
        let lp = light.world_position();
        let _ = writeln!(
            out,
            "Light: pos=({:.2}, {:.2}, {:.2}) on={} view_pos=({:.2}, {:.2}, {:.2})",
            lp.x,
            lp.y,
            lp.z,
            light.is_on(),
            frame.light_position.x,
            frame.light_position.y,
            frame.light_position.z
        );
        for b in scene.buildings.iter().take(self.max_buildings) {
            let _ = writeln!(
                out,
                "  building x={} z={} half={} height={} texture={:?}",
                b.grid_x, b.grid_z, b.half_size, b.height, b.texture
            );
        }
        let hidden = scene.building_count().saturating_sub(self.max_buildings);
        if hidden > 0 {
            let _ = writeln!(out, "  ... {hidden} more");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use skyline_kernel::{Camera, SpinningLight};

    fn viewer() -> ViewerState {
        let light =
            SpinningLight::with_tangent(Vec3::ONE, Vec3::new(0.0, 30.0, 50.0), Vec3::ZERO, Vec3::Y)
                .unwrap();
        ViewerState::new(Camera::new(Vec3::new(0.0, 0.0, 3.0)), light)
    }

    #[test]
    fn debug_renderer_empty_city() {
        let scene = Scene::generate(0, 1);
        let viewer = viewer();
        let output = DebugTextRenderer::new().render(&scene, &RenderView::new(&viewer, 800, 600));
        assert!(output.contains("buildings=0"));
        assert!(output.contains("eye=(0.00, 0.00, 3.00)"));
        assert!(!output.contains("more"));
    }

    #[test]
    fn debug_renderer_truncates_building_list() {
        let scene = Scene::generate(12, 1);
        let viewer = viewer();
        let renderer = DebugTextRenderer { max_buildings: 5 };
        let output = renderer.render(&scene, &RenderView::new(&viewer, 800, 800));
        assert!(output.contains("buildings=18"));
        assert_eq!(output.matches("  building ").count(), 5);
        assert!(output.contains("... 13 more"));
        assert!(output.contains("aspect=1.000"));
    }

    #[test]
    fn render_view_uses_viewer_state() {
        let mut viewer = viewer();
        viewer.light.toggle();
        let view = RenderView::new(&viewer, 1920, 1080);
        assert_eq!(view.uniforms().light_color.truncate(), Vec3::ZERO);
        assert!((view.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }
}
