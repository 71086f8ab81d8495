use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec4};
use skyline_kernel::{Camera, SpinningLight};

/// Everything the shaders need for one frame, in view space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub projection: Mat4,
    pub model_view: Mat4,
    /// Inverse-transpose of `model_view`; transforms normals into view space.
    pub normal_matrix: Mat4,
    /// Light position in view space.
    pub light_position: Vec4,
    pub light_color: Vec4,
    /// `model_view` with translation stripped, so the skybox stays centered
    /// on the eye.
    pub skybox_view: Mat4,
}

impl FrameUniforms {
    /// Recompute from the current camera and light. The city geometry is
    /// already in world space, so the model matrix is identity.
    pub fn compute(camera: &Camera, light: &SpinningLight, aspect: f32) -> Self {
        let view = camera.view_matrix();
        let model_view = view * Mat4::IDENTITY;
        Self {
            projection: camera.projection_matrix(aspect),
            model_view,
            normal_matrix: model_view.transpose().inverse(),
            light_position: view * light.position(),
            light_color: light.color(),
            skybox_view: Mat4::from_mat3(Mat3::from_mat4(view)),
        }
    }

    pub fn lit(&self) -> LitUniforms {
        LitUniforms {
            model_view: self.model_view.to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
            normal_matrix: self.normal_matrix.to_cols_array_2d(),
            light_position: self.light_position.to_array(),
            light_color: self.light_color.to_array(),
        }
    }

    pub fn skybox(&self) -> SkyboxUniforms {
        SkyboxUniforms {
            view: self.skybox_view.to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
        }
    }
}

/// GPU layout of the lit program's uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LitUniforms {
    pub model_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub light_position: [f32; 4],
    pub light_color: [f32; 4],
}

/// GPU layout of the skybox program's uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SkyboxUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

/// Width over height. A minimized window reports a zero dimension; fall
/// back to square rather than produce an infinite or zero aspect.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

/// Depth comparison for a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthTest {
    Less,
    /// The skybox is drawn at the far plane and must pass where nothing
    /// else was drawn.
    LessEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    Ground,
    Buildings,
    Skybox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSpec {
    pub kind: PassKind,
    pub depth_test: DepthTest,
    pub depth_write: bool,
}

impl PassKind {
    /// Depth state the pass is drawn with.
    pub const fn spec(self) -> PassSpec {
        let (depth_test, depth_write) = match self {
            PassKind::Ground | PassKind::Buildings => (DepthTest::Less, true),
            PassKind::Skybox => (DepthTest::LessEqual, false),
        };
        PassSpec {
            kind: self,
            depth_test,
            depth_write,
        }
    }
}

/// Draw order within one frame. Each pass carries its own depth state, so
/// the next frame starts again from `Less`.
pub const FRAME_PASSES: [PassSpec; 3] = [
    PassKind::Ground.spec(),
    PassKind::Buildings.spec(),
    PassKind::Skybox.spec(),
];
