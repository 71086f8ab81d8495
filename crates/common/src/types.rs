use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Tolerance used when comparing accumulated floating-point geometry.
pub const EPSILON: f32 = 1e-5;

/// Which of the two facade textures a building is dressed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FacadeTexture {
    A,
    B,
}

impl FacadeTexture {
    pub const ALL: [FacadeTexture; 2] = [FacadeTexture::A, FacadeTexture::B];

    /// Slot index into per-texture tables.
    pub fn index(self) -> usize {
        match self {
            FacadeTexture::A => 0,
            FacadeTexture::B => 1,
        }
    }
}

/// Faces of the skybox cube, in GPU cube-map layer order (+X, -X, +Y, -Y, +Z, -Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkyboxFace {
    Right,
    Left,
    Top,
    Bottom,
    Back,
    Front,
}

impl SkyboxFace {
    pub const ALL: [SkyboxFace; 6] = [
        SkyboxFace::Right,
        SkyboxFace::Left,
        SkyboxFace::Top,
        SkyboxFace::Bottom,
        SkyboxFace::Back,
        SkyboxFace::Front,
    ];

    /// File stem the face image is stored under.
    pub fn stem(self) -> &'static str {
        match self {
            SkyboxFace::Right => "right",
            SkyboxFace::Left => "left",
            SkyboxFace::Top => "top",
            SkyboxFace::Bottom => "bottom",
            SkyboxFace::Back => "back",
            SkyboxFace::Front => "front",
        }
    }

    /// Cube-map array layer for this face.
    pub fn layer(self) -> u32 {
        self as u32
    }
}

/// Component-wise comparison within `tolerance`.
pub fn approx_eq_vec3(a: Vec3, b: Vec3, tolerance: f32) -> bool {
    (a - b).abs().max_element() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facade_indices_are_distinct() {
        assert_eq!(FacadeTexture::A.index(), 0);
        assert_eq!(FacadeTexture::B.index(), 1);
    }

    #[test]
    fn skybox_faces_follow_cube_layer_order() {
        let layers: Vec<u32> = SkyboxFace::ALL.iter().map(|f| f.layer()).collect();
        assert_eq!(layers, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(SkyboxFace::Right.stem(), "right");
        assert_eq!(SkyboxFace::Front.stem(), "front");
    }

    #[test]
    fn approx_eq_respects_tolerance() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        assert!(approx_eq_vec3(a, a + Vec3::splat(1e-6), EPSILON));
        assert!(!approx_eq_vec3(a, a + Vec3::new(0.0, 1e-3, 0.0), EPSILON));
    }
}
