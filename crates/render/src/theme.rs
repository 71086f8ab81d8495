use glam::{Vec3, Vec4};
use rand::Rng;
use skyline_kernel::plane::DEFAULT_EXTENT;
use skyline_kernel::{Camera, SceneError, SpinningLight, ViewerState};

/// How building faces are colored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FacadeStyle {
    /// Sides sample the building's facade texture; the roof is a flat color.
    Textured { wall: Vec4, roof: Vec4 },
    /// Every face has its own flat color and no texture.
    Flat {
        front: Vec4,
        right: Vec4,
        left: Vec4,
        back: Vec4,
        roof: Vec4,
    },
}

/// Look of a city: colors, light placement and which texture files to load.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub extent: i32,
    pub clear_color: Vec4,
    pub ground_color: Vec4,
    pub boundary_color: Vec4,
    pub facade: FacadeStyle,
    pub light_color: Vec3,
    pub light_position: Vec3,
    pub light_center: Vec3,
    pub camera_eye: Vec3,
    pub facade_files: [&'static str; 2],
    pub skybox_extension: &'static str,
}

const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);

fn gray(level: f32) -> Vec4 {
    Vec4::new(level, level, level, 1.0)
}

impl Default for Theme {
    fn default() -> Self {
        Self::textured()
    }
}

impl Theme {
    /// Textured facades on green ground under a white light.
    pub fn textured() -> Self {
        Self {
            name: "textured",
            extent: DEFAULT_EXTENT,
            clear_color: gray(0.1),
            ground_color: Vec4::new(0.0, 1.0, 0.0, 1.0),
            boundary_color: Vec4::new(0.0, 0.0, 1.0, 1.0),
            facade: FacadeStyle::Textured {
                wall: Vec4::ONE,
                roof: RED,
            },
            light_color: Vec3::ONE,
            light_position: Vec3::new(0.0, 30.0, 50.0),
            light_center: Vec3::ZERO,
            camera_eye: Vec3::new(0.0, 0.0, 3.0),
            facade_files: ["building.jpg", "building2.jpg"],
            skybox_extension: "tga",
        }
    }

    /// Flat-shaded gray city under a blue light.
    pub fn flat() -> Self {
        Self {
            name: "flat",
            ground_color: gray(0.412),
            boundary_color: Vec4::ONE,
            facade: FacadeStyle::Flat {
                front: RED,
                right: RED,
                left: gray(0.4),
                back: gray(0.3),
                roof: gray(0.6),
            },
            light_color: Vec3::new(0.0, 0.0, 1.0),
            light_position: Vec3::new(0.0, 5.0, 10.0),
            ..Self::textured()
        }
    }

    pub fn uses_facade_textures(&self) -> bool {
        matches!(self.facade, FacadeStyle::Textured { .. })
    }

    /// Starting camera and light. The light's tangent is drawn from `rng`.
    pub fn initial_viewer<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ViewerState, SceneError> {
        let camera = Camera::with_orientation(self.camera_eye, Vec3::NEG_Z, Vec3::Y)?;
        let light = SpinningLight::new(
            self.light_color,
            self.light_position,
            self.light_center,
            rng,
        )?;
        Ok(ViewerState::new(camera, light))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn themes_share_the_city_but_differ_in_look() {
        let textured = Theme::textured();
        let flat = Theme::flat();
        assert_eq!(textured.extent, 196);
        assert_eq!(flat.extent, textured.extent);
        assert_eq!(flat.camera_eye, textured.camera_eye);
        assert_ne!(flat.ground_color, textured.ground_color);
        assert!(textured.uses_facade_textures());
        assert!(!flat.uses_facade_textures());
    }

    #[test]
    fn initial_viewer_places_camera_and_light() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let viewer = Theme::flat().initial_viewer(&mut rng).unwrap();
        assert_eq!(viewer.camera.position(), Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(viewer.light.world_position(), Vec3::new(0.0, 5.0, 10.0));
        assert_eq!(viewer.light.color(), Vec4::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn degenerate_light_is_reported() {
        let theme = Theme {
            light_position: Vec3::ZERO,
            ..Theme::textured()
        };
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        assert!(matches!(
            theme.initial_viewer(&mut rng),
            Err(SceneError::DegenerateLight { .. })
        ));
    }
}
